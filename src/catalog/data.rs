//! Catalog records: devices, rate plans and subsidy entries

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Catalog records are shown on the storefront unless explicitly hidden
fn default_exposed() -> bool {
    true
}

/// Subscription acquisition channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JoinType {
    /// Device upgrade on the same carrier
    Change,
    /// Number port-in from another carrier
    Transfer,
    /// New line
    New,
}

impl JoinType {
    pub const ALL: [JoinType; 3] = [JoinType::Change, JoinType::Transfer, JoinType::New];

    pub fn as_str(&self) -> &'static str {
        match self {
            JoinType::Change => "change",
            JoinType::Transfer => "transfer",
            JoinType::New => "new",
        }
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JoinType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "change" => Ok(JoinType::Change),
            "transfer" => Ok(JoinType::Transfer),
            "new" => Ok(JoinType::New),
            other => Err(format!("Unknown join type: {}", other)),
        }
    }
}

/// A color option for a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorVariant {
    pub name: String,

    /// Swatch color, e.g. "#1f1f1f"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hex: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ColorVariant {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hex: None,
            image_url: None,
        }
    }
}

/// A handset sold on the storefront
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Unique device identifier (model + storage SKU)
    pub id: String,

    /// Manufacturer
    pub brand: String,

    /// Marketing model name
    pub model: String,

    /// Storage capacity in GB
    #[serde(rename = "storageGB")]
    pub storage_gb: u32,

    /// Factory list price in integer currency units
    pub list_price: u64,

    #[serde(default)]
    pub colors: Vec<ColorVariant>,

    /// Whether the device is visible on the storefront
    #[serde(default = "default_exposed")]
    pub exposed: bool,
}

/// A monthly rate plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub category_id: String,

    /// Undiscounted monthly fee in integer currency units
    pub base_price: u64,

    /// Data allowance descriptor, e.g. "110GB + 5Mbps"
    #[serde(default)]
    pub data: String,

    #[serde(default)]
    pub voice: String,

    #[serde(default)]
    pub sms: String,

    #[serde(default)]
    pub benefits: Vec<String>,

    #[serde(default = "default_exposed")]
    pub exposed: bool,
}

/// Subsidy amounts for one (device, plan) pair under one join type.
///
/// The join type is implied by which list of the [`SubsidyTable`] holds the entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsidyEntry {
    pub device_id: String,
    pub plan_id: String,

    /// Carrier's published device subsidy (subsidy-discount contracts)
    pub common_subsidy: u64,

    /// Store's additional subsidy (subsidy-discount contracts)
    pub additional_subsidy: u64,

    /// Device subsidy offered alongside a selective contract
    pub select_subsidy: u64,

    #[serde(default = "default_exposed")]
    pub exposed: bool,
}

impl SubsidyEntry {
    pub fn matches(&self, device_id: &str, plan_id: &str) -> bool {
        self.device_id == device_id && self.plan_id == plan_id
    }
}

/// Subsidy entries grouped by join type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsidyTable {
    pub change: Vec<SubsidyEntry>,
    pub transfer: Vec<SubsidyEntry>,
    pub new: Vec<SubsidyEntry>,
}

impl SubsidyTable {
    /// Entries recorded for a join type
    pub fn entries(&self, join_type: JoinType) -> &[SubsidyEntry] {
        match join_type {
            JoinType::Change => &self.change,
            JoinType::Transfer => &self.transfer,
            JoinType::New => &self.new,
        }
    }

    pub fn entries_mut(&mut self, join_type: JoinType) -> &mut Vec<SubsidyEntry> {
        match join_type {
            JoinType::Change => &mut self.change,
            JoinType::Transfer => &mut self.transfer,
            JoinType::New => &mut self.new,
        }
    }

    /// Add an entry under the given join type
    pub fn push(&mut self, join_type: JoinType, entry: SubsidyEntry) {
        self.entries_mut(join_type).push(entry);
    }

    /// Total number of entries across all join types
    pub fn len(&self) -> usize {
        JoinType::ALL.iter().map(|jt| self.entries(*jt).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over every entry paired with its join type
    pub fn iter(&self) -> impl Iterator<Item = (JoinType, &SubsidyEntry)> {
        JoinType::ALL
            .into_iter()
            .flat_map(move |jt| self.entries(jt).iter().map(move |e| (jt, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(device: &str, plan: &str) -> SubsidyEntry {
        SubsidyEntry {
            device_id: device.to_string(),
            plan_id: plan.to_string(),
            common_subsidy: 100_000,
            additional_subsidy: 15_000,
            select_subsidy: 0,
            exposed: true,
        }
    }

    #[test]
    fn test_join_type_parse() {
        assert_eq!("change".parse::<JoinType>(), Ok(JoinType::Change));
        assert_eq!("transfer".parse::<JoinType>(), Ok(JoinType::Transfer));
        assert_eq!("new".parse::<JoinType>(), Ok(JoinType::New));
        assert!("upgrade".parse::<JoinType>().is_err());
        assert!("Change".parse::<JoinType>().is_err());
    }

    #[test]
    fn test_subsidy_table_grouping() {
        let mut table = SubsidyTable::default();
        table.push(JoinType::Change, entry("s24", "5g-premium"));
        table.push(JoinType::New, entry("s24", "5g-basic"));
        table.push(JoinType::New, entry("iphone15", "5g-basic"));

        assert_eq!(table.len(), 3);
        assert_eq!(table.entries(JoinType::Change).len(), 1);
        assert!(table.entries(JoinType::Transfer).is_empty());
        assert_eq!(table.entries(JoinType::New).len(), 2);

        let joins: Vec<JoinType> = table.iter().map(|(jt, _)| jt).collect();
        assert_eq!(joins, vec![JoinType::Change, JoinType::New, JoinType::New]);
    }

    #[test]
    fn test_device_defaults_from_json() {
        let json = r#"{
            "id": "s24-256",
            "brand": "Samsung",
            "model": "Galaxy S24",
            "storageGB": 256,
            "listPrice": 1250000
        }"#;
        let device: Device = serde_json::from_str(json).unwrap();

        assert!(device.exposed);
        assert!(device.colors.is_empty());
        assert_eq!(device.storage_gb, 256);
        assert_eq!(device.list_price, 1_250_000);
    }
}

//! Catalog snapshot: devices, plans, subsidies and global settings
//!
//! A [`Catalog`] can only be built through [`Catalog::new`], which validates it, so the
//! pricing engine never sees a snapshot with dangling references or unusable settings.

mod data;
mod settings;
pub mod legacy;
pub mod loader;
pub mod repository;

pub use data::{ColorVariant, Device, JoinType, Plan, SubsidyEntry, SubsidyTable};
pub use settings::{
    BundleDiscountBase, BundleDiscountRates, BundleOption, GlobalSettings, Rounding,
    RoundingPolicy,
};
pub use loader::{load_catalog, load_catalog_from_reader, load_default_catalog, load_subsidies_csv};
pub use repository::{
    CacheConfig, CachedCatalogRepository, CatalogFormat, CatalogRepository, CatalogSource,
    FileCatalogSource,
};

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Default path to the catalog snapshot
pub const DEFAULT_CATALOG_PATH: &str = "data/catalog.json";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed catalog JSON: {0}")]
    Json(serde_json::Error),

    #[error("Failed to parse subsidy CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Catalog data integrity violation: {0}")]
    DataIntegrity(String),

    #[error("Catalog unavailable after {attempts} attempt(s): {last_error}")]
    Unavailable { attempts: u32, last_error: String },
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;

        // Well-formed JSON that doesn't fit the schema is a data problem, not a parse problem
        match err.classify() {
            Category::Io => CatalogError::Io(err.into()),
            Category::Data => CatalogError::DataIntegrity(err.to_string()),
            Category::Syntax | Category::Eof => CatalogError::Json(err),
        }
    }
}

/// Wire shape of a catalog, before validation
#[derive(Debug, Deserialize)]
struct RawCatalog {
    devices: Vec<Device>,
    plans: Vec<Plan>,
    subsidies: SubsidyTable,
    settings: GlobalSettings,
}

/// A validated, immutable catalog snapshot
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    devices: Vec<Device>,
    plans: Vec<Plan>,
    subsidies: SubsidyTable,
    settings: GlobalSettings,

    #[serde(skip)]
    device_index: HashMap<String, usize>,

    #[serde(skip)]
    plan_index: HashMap<String, usize>,
}

impl Catalog {
    /// Build and validate a catalog snapshot
    pub fn new(
        devices: Vec<Device>,
        plans: Vec<Plan>,
        subsidies: SubsidyTable,
        settings: GlobalSettings,
    ) -> Result<Self, CatalogError> {
        settings
            .validate()
            .map_err(|msg| CatalogError::DataIntegrity(format!("settings: {}", msg)))?;

        if devices.is_empty() {
            return Err(CatalogError::DataIntegrity("catalog has no devices".into()));
        }
        if plans.is_empty() {
            return Err(CatalogError::DataIntegrity("catalog has no plans".into()));
        }

        let device_index = build_index("device", devices.iter().map(|d| d.id.as_str()))?;
        let plan_index = build_index("plan", plans.iter().map(|p| p.id.as_str()))?;

        let mut seen = HashSet::new();
        for (join_type, entry) in subsidies.iter() {
            if !device_index.contains_key(&entry.device_id) {
                return Err(CatalogError::DataIntegrity(format!(
                    "{} subsidy references unknown device '{}'",
                    join_type, entry.device_id
                )));
            }
            if !plan_index.contains_key(&entry.plan_id) {
                return Err(CatalogError::DataIntegrity(format!(
                    "{} subsidy references unknown plan '{}'",
                    join_type, entry.plan_id
                )));
            }
            if !seen.insert((join_type, entry.device_id.as_str(), entry.plan_id.as_str())) {
                return Err(CatalogError::DataIntegrity(format!(
                    "duplicate {} subsidy for device '{}' and plan '{}'",
                    join_type, entry.device_id, entry.plan_id
                )));
            }
        }

        Ok(Self {
            devices,
            plans,
            subsidies,
            settings,
            device_index,
            plan_index,
        })
    }

    /// Parse a catalog from canonical JSON and validate it
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = serde_json::from_str(json)?;
        Self::new(raw.devices, raw.plans, raw.subsidies, raw.settings)
    }

    /// Parse a catalog from a reader of canonical JSON
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, CatalogError> {
        let raw: RawCatalog = serde_json::from_reader(reader)?;
        Self::new(raw.devices, raw.plans, raw.subsidies, raw.settings)
    }

    /// Load a catalog from a canonical JSON file
    pub fn from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self, CatalogError> {
        load_catalog(path)
    }

    /// Serialize back to canonical JSON
    pub fn to_json_pretty(&self) -> Result<String, CatalogError> {
        serde_json::to_string_pretty(self).map_err(CatalogError::Json)
    }

    /// Replace the subsidy table, re-validating the snapshot
    pub fn with_subsidies(self, subsidies: SubsidyTable) -> Result<Self, CatalogError> {
        Self::new(self.devices, self.plans, subsidies, self.settings)
    }

    /// Replace the settings, re-validating the snapshot
    pub fn with_settings(self, settings: GlobalSettings) -> Result<Self, CatalogError> {
        Self::new(self.devices, self.plans, self.subsidies, settings)
    }

    pub fn device(&self, id: &str) -> Option<&Device> {
        self.device_index.get(id).map(|&i| &self.devices[i])
    }

    pub fn plan(&self, id: &str) -> Option<&Plan> {
        self.plan_index.get(id).map(|&i| &self.plans[i])
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    pub fn subsidies(&self) -> &SubsidyTable {
        &self.subsidies
    }

    pub fn settings(&self) -> &GlobalSettings {
        &self.settings
    }
}

fn build_index<'a>(
    kind: &str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<HashMap<String, usize>, CatalogError> {
    let mut index = HashMap::new();
    for (i, id) in ids.enumerate() {
        if id.trim().is_empty() {
            return Err(CatalogError::DataIntegrity(format!("{} #{} has an empty id", kind, i)));
        }
        if index.insert(id.to_string(), i).is_some() {
            return Err(CatalogError::DataIntegrity(format!("duplicate {} id '{}'", kind, id)));
        }
    }
    Ok(index)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn device(id: &str, list_price: u64) -> Device {
        Device {
            id: id.to_string(),
            brand: "Samsung".to_string(),
            model: format!("Model {}", id),
            storage_gb: 256,
            list_price,
            colors: vec![ColorVariant::named("Onyx Black")],
            exposed: true,
        }
    }

    pub fn plan(id: &str, base_price: u64) -> Plan {
        Plan {
            id: id.to_string(),
            name: format!("Plan {}", id),
            category_id: "5g".to_string(),
            base_price,
            data: "unlimited".to_string(),
            voice: "unlimited".to_string(),
            sms: "basic".to_string(),
            benefits: vec![],
            exposed: true,
        }
    }

    pub fn subsidy(device: &str, plan: &str, common: u64, additional: u64, select: u64) -> SubsidyEntry {
        SubsidyEntry {
            device_id: device.to_string(),
            plan_id: plan.to_string(),
            common_subsidy: common,
            additional_subsidy: additional,
            select_subsidy: select,
            exposed: true,
        }
    }

    /// Catalog built around the reference pricing example:
    /// list 1,250,000 / plan 109,000 / common 300,000 / additional 100,000 / select 50,000
    pub fn reference_catalog() -> Catalog {
        let mut subsidies = SubsidyTable::default();
        subsidies.push(JoinType::Change, subsidy("s24", "premium", 300_000, 100_000, 50_000));
        subsidies.push(JoinType::Transfer, subsidy("s24", "premium", 450_000, 150_000, 80_000));
        subsidies.push(JoinType::Change, subsidy("a15", "premium", 200_000, 30_000, 0));
        subsidies.push(JoinType::Change, subsidy("fold", "premium", 500_000, 75_000, 100_000));
        subsidies.push(JoinType::Change, subsidy("s24", "basic", 100_000, 15_000, 20_000));

        Catalog::new(
            vec![device("s24", 1_250_000), device("a15", 199_100), device("fold", 2_229_700)],
            vec![plan("premium", 109_000), plan("basic", 55_000)],
            subsidies,
            GlobalSettings::default(),
        )
        .expect("reference catalog is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_catalog_lookup() {
        let catalog = reference_catalog();

        assert_eq!(catalog.device("s24").map(|d| d.list_price), Some(1_250_000));
        assert_eq!(catalog.plan("basic").map(|p| p.base_price), Some(55_000));
        assert!(catalog.device("missing").is_none());
        assert_eq!(catalog.subsidies().len(), 5);
    }

    #[test]
    fn test_duplicate_subsidy_rejected() {
        let mut subsidies = SubsidyTable::default();
        subsidies.push(JoinType::New, subsidy("s24", "premium", 1, 0, 0));
        subsidies.push(JoinType::New, subsidy("s24", "premium", 2, 0, 0));

        let result = Catalog::new(
            vec![device("s24", 1_000_000)],
            vec![plan("premium", 100_000)],
            subsidies,
            GlobalSettings::default(),
        );
        assert!(matches!(result, Err(CatalogError::DataIntegrity(msg)) if msg.contains("duplicate")));
    }

    #[test]
    fn test_same_pair_under_different_join_types_is_allowed() {
        let mut subsidies = SubsidyTable::default();
        subsidies.push(JoinType::New, subsidy("s24", "premium", 1, 0, 0));
        subsidies.push(JoinType::Change, subsidy("s24", "premium", 2, 0, 0));

        let result = Catalog::new(
            vec![device("s24", 1_000_000)],
            vec![plan("premium", 100_000)],
            subsidies,
            GlobalSettings::default(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_dangling_subsidy_rejected() {
        let mut subsidies = SubsidyTable::default();
        subsidies.push(JoinType::Change, subsidy("ghost", "premium", 1, 0, 0));

        let result = Catalog::new(
            vec![device("s24", 1_000_000)],
            vec![plan("premium", 100_000)],
            subsidies,
            GlobalSettings::default(),
        );
        assert!(matches!(result, Err(CatalogError::DataIntegrity(msg)) if msg.contains("ghost")));
    }

    #[test]
    fn test_duplicate_device_id_rejected() {
        let result = Catalog::new(
            vec![device("s24", 1_000_000), device("s24", 900_000)],
            vec![plan("premium", 100_000)],
            SubsidyTable::default(),
            GlobalSettings::default(),
        );
        assert!(matches!(result, Err(CatalogError::DataIntegrity(_))));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let result = Catalog::new(
            vec![],
            vec![plan("premium", 100_000)],
            SubsidyTable::default(),
            GlobalSettings::default(),
        );
        assert!(matches!(result, Err(CatalogError::DataIntegrity(_))));
    }

    #[test]
    fn test_missing_array_is_integrity_error() {
        // No "plans" array at all
        let json = r#"{
            "devices": [],
            "subsidies": { "change": [], "transfer": [], "new": [] },
            "settings": {
                "annualInterestRate": 0.059, "roundingUnit": 10, "selectiveDiscountRate": 0.25,
                "bundleDiscountRates": { "internet": 0.1, "internetTv": 0.15 },
                "allowedInstallmentMonths": [0, 12, 24, 36]
            }
        }"#;
        let err = Catalog::from_json_str(json).unwrap_err();
        assert!(matches!(err, CatalogError::DataIntegrity(msg) if msg.contains("plans")));
    }

    #[test]
    fn test_syntax_error_is_json_error() {
        let err = Catalog::from_json_str("{ \"devices\": [").unwrap_err();
        assert!(matches!(err, CatalogError::Json(_)));
    }

    #[test]
    fn test_json_roundtrip_preserves_catalog() {
        let catalog = reference_catalog();
        let json = catalog.to_json_pretty().unwrap();
        let reparsed = Catalog::from_json_str(&json).unwrap();

        assert_eq!(reparsed.devices(), catalog.devices());
        assert_eq!(reparsed.subsidies(), catalog.subsidies());
        assert_eq!(reparsed.settings(), catalog.settings());
    }
}

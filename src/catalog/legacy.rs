//! Adapter for the legacy Korean-keyed catalog export
//!
//! Older storefront builds stored the catalog with Korean keys, rates as percentages and
//! storage as display strings ("256GB", "1TB"). This module maps that shape onto the
//! canonical [`Catalog`]; nothing outside it knows the legacy keys exist.
//!
//! Legacy screens truncated installments to the rounding unit (절사), so converted
//! catalogs use [`RoundingPolicy::Floor`].

use super::{
    BundleDiscountBase, BundleDiscountRates, Catalog, CatalogError, ColorVariant, Device,
    GlobalSettings, JoinType, Plan, RoundingPolicy, SubsidyEntry, SubsidyTable,
};
use serde::Deserialize;
use std::path::Path;

fn default_exposed() -> bool {
    true
}

fn default_rounding_unit() -> u64 {
    10
}

fn default_months() -> Vec<i32> {
    vec![0, 12, 24, 36]
}

#[derive(Debug, Deserialize)]
pub struct LegacyCatalog {
    #[serde(rename = "기기목록")]
    devices: Vec<LegacyDevice>,
    #[serde(rename = "요금제목록")]
    plans: Vec<LegacyPlan>,
    #[serde(rename = "지원금")]
    subsidies: LegacySubsidies,
    #[serde(rename = "설정")]
    settings: LegacySettings,
}

#[derive(Debug, Deserialize)]
struct LegacyDevice {
    #[serde(rename = "기기코드")]
    id: String,
    #[serde(rename = "제조사")]
    brand: String,
    #[serde(rename = "모델명")]
    model: String,
    #[serde(rename = "용량")]
    storage: String,
    #[serde(rename = "출고가")]
    list_price: u64,
    #[serde(rename = "색상", default)]
    colors: Vec<String>,
    #[serde(rename = "노출", default = "default_exposed")]
    exposed: bool,
}

#[derive(Debug, Deserialize)]
struct LegacyPlan {
    #[serde(rename = "요금제코드")]
    id: String,
    #[serde(rename = "요금제명")]
    name: String,
    #[serde(rename = "카테고리")]
    category_id: String,
    #[serde(rename = "월정액")]
    base_price: u64,
    #[serde(rename = "데이터", default)]
    data: String,
    #[serde(rename = "음성", default)]
    voice: String,
    #[serde(rename = "문자", default)]
    sms: String,
    #[serde(rename = "혜택", default)]
    benefits: Vec<String>,
    #[serde(rename = "노출", default = "default_exposed")]
    exposed: bool,
}

#[derive(Debug, Deserialize)]
struct LegacySubsidies {
    #[serde(rename = "기기변경")]
    change: Vec<LegacySubsidy>,
    #[serde(rename = "번호이동")]
    transfer: Vec<LegacySubsidy>,
    #[serde(rename = "신규가입")]
    new: Vec<LegacySubsidy>,
}

#[derive(Debug, Deserialize)]
struct LegacySubsidy {
    #[serde(rename = "기기코드")]
    device_id: String,
    #[serde(rename = "요금제코드")]
    plan_id: String,
    #[serde(rename = "공시지원금")]
    common_subsidy: u64,
    #[serde(rename = "추가지원금", default)]
    additional_subsidy: u64,
    #[serde(rename = "선택약정지원금", default)]
    select_subsidy: u64,
    #[serde(rename = "노출", default = "default_exposed")]
    exposed: bool,
}

/// Legacy settings; every rate is a percentage (5.9 means 5.9%)
#[derive(Debug, Deserialize)]
struct LegacySettings {
    #[serde(rename = "연이자율")]
    annual_interest_pct: f64,
    #[serde(rename = "선택약정할인율")]
    selective_discount_pct: f64,
    #[serde(rename = "결합할인율", default)]
    bundle_discount_pct: LegacyBundleRates,
    #[serde(rename = "절사단위", default = "default_rounding_unit")]
    rounding_unit: u64,
    #[serde(rename = "할부개월", default = "default_months")]
    installment_months: Vec<i32>,
}

#[derive(Debug, Default, Deserialize)]
struct LegacyBundleRates {
    #[serde(rename = "인터넷", default)]
    internet: f64,
    #[serde(rename = "인터넷TV", default)]
    internet_tv: f64,
}

impl LegacyCatalog {
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, CatalogError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Map onto the canonical schema and validate
    pub fn into_catalog(self) -> Result<Catalog, CatalogError> {
        let devices = self
            .devices
            .into_iter()
            .map(LegacyDevice::into_device)
            .collect::<Result<Vec<_>, _>>()?;

        let plans = self.plans.into_iter().map(LegacyPlan::into_plan).collect();

        let mut subsidies = SubsidyTable::default();
        for (join_type, rows) in [
            (JoinType::Change, self.subsidies.change),
            (JoinType::Transfer, self.subsidies.transfer),
            (JoinType::New, self.subsidies.new),
        ] {
            for row in rows {
                subsidies.push(join_type, row.into_entry());
            }
        }

        let settings = self.settings.into_settings();
        Catalog::new(devices, plans, subsidies, settings)
    }
}

impl LegacyDevice {
    fn into_device(self) -> Result<Device, CatalogError> {
        let storage_gb = parse_storage(&self.storage).ok_or_else(|| {
            CatalogError::DataIntegrity(format!(
                "device '{}' has unreadable storage '{}'",
                self.id, self.storage
            ))
        })?;

        Ok(Device {
            id: self.id,
            brand: self.brand,
            model: self.model,
            storage_gb,
            list_price: self.list_price,
            colors: self.colors.into_iter().map(ColorVariant::named).collect(),
            exposed: self.exposed,
        })
    }
}

impl LegacyPlan {
    fn into_plan(self) -> Plan {
        Plan {
            id: self.id,
            name: self.name,
            category_id: self.category_id,
            base_price: self.base_price,
            data: self.data,
            voice: self.voice,
            sms: self.sms,
            benefits: self.benefits,
            exposed: self.exposed,
        }
    }
}

impl LegacySubsidy {
    fn into_entry(self) -> SubsidyEntry {
        SubsidyEntry {
            device_id: self.device_id,
            plan_id: self.plan_id,
            common_subsidy: self.common_subsidy,
            additional_subsidy: self.additional_subsidy,
            select_subsidy: self.select_subsidy,
            exposed: self.exposed,
        }
    }
}

impl LegacySettings {
    fn into_settings(self) -> GlobalSettings {
        let defaults = GlobalSettings::default();
        GlobalSettings {
            annual_interest_rate: self.annual_interest_pct / 100.0,
            rounding_unit: self.rounding_unit,
            rounding_policy: RoundingPolicy::Floor,
            selective_discount_rate: self.selective_discount_pct / 100.0,
            bundle_discount_rates: BundleDiscountRates {
                none: 0.0,
                internet: self.bundle_discount_pct.internet / 100.0,
                internet_tv: self.bundle_discount_pct.internet_tv / 100.0,
            },
            bundle_discount_base: BundleDiscountBase::BasePrice,
            allowed_installment_months: self.installment_months,
            comparison_horizon_months: defaults.comparison_horizon_months,
        }
    }
}

/// Parse "256GB", "256 GB", "1TB" or a bare number of GB
fn parse_storage(raw: &str) -> Option<u32> {
    let normalized = raw.trim().to_ascii_uppercase().replace(' ', "");
    if let Some(tb) = normalized.strip_suffix("TB") {
        return tb.parse::<u32>().ok().and_then(|n| n.checked_mul(1024));
    }
    normalized
        .strip_suffix("GB")
        .unwrap_or(&normalized)
        .parse()
        .ok()
}

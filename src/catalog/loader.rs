//! Load catalog snapshots from JSON and subsidy tables from the admin CSV export

use super::{Catalog, CatalogError, JoinType, SubsidyEntry, SubsidyTable, DEFAULT_CATALOG_PATH};
use csv::Reader;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Raw CSV row matching the subsidy export columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "joinType")]
    join_type: String,
    #[serde(rename = "deviceId")]
    device_id: String,
    #[serde(rename = "planId")]
    plan_id: String,
    #[serde(rename = "commonSubsidy")]
    common_subsidy: u64,
    #[serde(rename = "additionalSubsidy")]
    additional_subsidy: u64,
    #[serde(rename = "selectSubsidy")]
    select_subsidy: u64,
    #[serde(rename = "exposed", default = "default_exposed_cell")]
    exposed: String,
}

fn default_exposed_cell() -> String {
    "true".to_string()
}

impl CsvRow {
    fn to_entry(self, line: usize) -> Result<(JoinType, SubsidyEntry), CatalogError> {
        let join_type: JoinType = self
            .join_type
            .trim()
            .parse()
            .map_err(|e| CatalogError::DataIntegrity(format!("subsidy row {}: {}", line, e)))?;

        let exposed = match self.exposed.trim().to_ascii_lowercase().as_str() {
            "" | "true" | "y" | "1" => true,
            "false" | "n" | "0" => false,
            other => {
                return Err(CatalogError::DataIntegrity(format!(
                    "subsidy row {}: unknown exposed flag '{}'",
                    line, other
                )))
            }
        };

        Ok((
            join_type,
            SubsidyEntry {
                device_id: self.device_id.trim().to_string(),
                plan_id: self.plan_id.trim().to_string(),
                common_subsidy: self.common_subsidy,
                additional_subsidy: self.additional_subsidy,
                select_subsidy: self.select_subsidy,
                exposed,
            },
        ))
    }
}

/// Load and validate a catalog from a canonical JSON file
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog, CatalogError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let catalog = Catalog::from_reader(BufReader::new(file))?;

    log::info!(
        "Loaded catalog from {}: {} devices, {} plans, {} subsidy entries",
        path.display(),
        catalog.devices().len(),
        catalog.plans().len(),
        catalog.subsidies().len()
    );
    Ok(catalog)
}

/// Load and validate a catalog from any reader of canonical JSON
pub fn load_catalog_from_reader<R: std::io::Read>(reader: R) -> Result<Catalog, CatalogError> {
    Catalog::from_reader(reader)
}

/// Load the catalog from the default data/catalog.json location
pub fn load_default_catalog() -> Result<Catalog, CatalogError> {
    load_catalog(DEFAULT_CATALOG_PATH)
}

/// Load a subsidy table from a CSV file
pub fn load_subsidies_csv<P: AsRef<Path>>(path: P) -> Result<SubsidyTable, CatalogError> {
    let reader = Reader::from_path(path)?;
    read_subsidies(reader)
}

/// Load a subsidy table from any CSV reader (e.g., an upload buffer)
pub fn load_subsidies_from_reader<R: std::io::Read>(reader: R) -> Result<SubsidyTable, CatalogError> {
    read_subsidies(Reader::from_reader(reader))
}

fn read_subsidies<R: std::io::Read>(mut reader: Reader<R>) -> Result<SubsidyTable, CatalogError> {
    let mut table = SubsidyTable::default();

    for (i, result) in reader.deserialize().enumerate() {
        let row: CsvRow = result?;
        // Header is line 1
        let (join_type, entry) = row.to_entry(i + 2)?;
        table.push(join_type, entry);
    }

    log::debug!("Read {} subsidy rows", table.len());
    Ok(table)
}

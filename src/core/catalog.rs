use crate::domain::model::{VehicleCategory, VehicleRecord};
use crate::utils::error::{FillTripError, Result};
use std::io::Read;
use std::path::Path;

/// Philippine-market make/model averages shipped with the crate.
const EMBEDDED_CATALOG: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/data/vehicles_ph.csv"
));

#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub record: VehicleRecord,
    /// Lowercased `"{make} {model}"`, the text queries are matched against.
    pub search_text: String,
}

impl CatalogEntry {
    fn new(record: VehicleRecord) -> Self {
        let search_text = format!("{} {}", record.make, record.model).to_lowercase();
        Self {
            record,
            search_text,
        }
    }
}

/// Read-only vehicle reference data, cars and motorcycles in one indexed list.
#[derive(Debug, Clone, Default)]
pub struct VehicleCatalog {
    entries: Vec<CatalogEntry>,
}

impl VehicleCatalog {
    pub fn embedded() -> Result<Self> {
        Self::from_csv_reader(EMBEDDED_CATALOG.as_bytes())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let catalog = Self::from_csv_reader(file)?;
        tracing::info!(
            "Loaded {} vehicles from {}",
            catalog.len(),
            path.as_ref().display()
        );
        Ok(catalog)
    }

    /// Expects the header `id,make,model,typical_years,km_per_liter_avg,category`.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut records = Vec::new();
        for row in csv_reader.deserialize() {
            let record: VehicleRecord = row?;
            if !(record.km_per_liter_avg.is_finite() && record.km_per_liter_avg > 0.0) {
                return Err(FillTripError::Config {
                    message: format!(
                        "vehicle '{}' has non-positive km_per_liter_avg {}",
                        record.id, record.km_per_liter_avg
                    ),
                });
            }
            records.push(record);
        }
        Ok(Self::from_records(records))
    }

    /// Catalog order is kept; it is the matcher's tie-break.
    pub fn from_records(records: Vec<VehicleRecord>) -> Self {
        Self {
            entries: records.into_iter().map(CatalogEntry::new).collect(),
        }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&VehicleRecord> {
        self.entries
            .iter()
            .map(|e| &e.record)
            .find(|r| r.id == id)
    }

    pub fn by_category(
        &self,
        category: VehicleCategory,
    ) -> impl Iterator<Item = &VehicleRecord> + '_ {
        self.entries
            .iter()
            .map(|e| &e.record)
            .filter(move |r| r.category == category)
    }
}

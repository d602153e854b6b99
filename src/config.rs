use std::path::{Path, PathBuf};

pub const DATA_DIR: &str = "data";
pub const AREA_CODES_FILE: &str = "japan_area_codes.json";
pub const REGIONS_FILE: &str = "japan_regions.json";
pub const ESTAT_PARAMS_FILE: &str = "estat_api_params.json";
pub const MASTER_FILE: &str = "japan_regional_master.json";

pub const RAG_STORE_FILE: &str = "rag_store.sqlite3";
pub const KNOWLEDGE_DIR: &str = "knowledge";
pub const CLINIC_RECORDS_FILE: &str = "clinic_records.xlsx";
pub const MASTER_TABLE_FILE: &str = "japan_regional_master.parquet";

/// Input and output locations of the regional master merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePaths {
    pub area_codes: PathBuf,
    pub regions: PathBuf,
    pub estat_params: PathBuf,
    pub output: PathBuf,
}

impl MergePaths {
    /// All three inputs and the output live side by side in `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            area_codes: dir.join(AREA_CODES_FILE),
            regions: dir.join(REGIONS_FILE),
            estat_params: dir.join(ESTAT_PARAMS_FILE),
            output: dir.join(MASTER_FILE),
        }
    }
}

impl Default for MergePaths {
    fn default() -> Self {
        Self::in_dir(DATA_DIR)
    }
}

pub fn data_path(file: &str) -> PathBuf {
    Path::new(DATA_DIR).join(file)
}

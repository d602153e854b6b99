use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::config::MergePaths;
use crate::error::{Error, Result};
use crate::schema::{AreaCodes, EstatParams, RegionsDocument};

/// The three source documents of one merge run.
#[derive(Debug, Default)]
pub struct Sources {
    pub area_codes: AreaCodes,
    pub regions: RegionsDocument,
    pub estat: EstatParams,
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|err| Error::input_missing(path, err))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|err| Error::input_malformed(path, err))
}

/// Reads all three inputs; the first failure aborts the run.
pub fn load_sources(paths: &MergePaths) -> Result<Sources> {
    let area_codes: AreaCodes = read_json(&paths.area_codes)?;
    tracing::info!(
        path = %paths.area_codes.display(),
        prefectures = area_codes.prefectures.len(),
        "loaded area code catalog"
    );
    let regions: RegionsDocument = read_json(&paths.regions)?;
    tracing::info!(
        path = %paths.regions.display(),
        prefectures = regions.prefectures.len(),
        "loaded regional statistics"
    );
    let estat: EstatParams = read_json(&paths.estat_params)?;
    tracing::info!(path = %paths.estat_params.display(), "loaded e-Stat API parameters");
    Ok(Sources {
        area_codes,
        regions,
        estat,
    })
}

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::schema::Master;

/// Pretty JSON with 2-space indent; non-ASCII text is written verbatim.
pub fn render_master(master: &Master) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(master)
        .map_err(|err| Error::invariant(format!("master is not serializable ({})", err)))
}

/// Writes the master through a sibling temp file renamed into place.
///
/// A failed run leaves any previous output untouched; only the temp file
/// is removed (on drop).
pub fn write_master(path: &Path, master: &Master) -> Result<()> {
    let bytes = render_master(master)?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut staged =
        NamedTempFile::new_in(dir).map_err(|err| Error::output_unwritable(path, err))?;
    staged
        .write_all(&bytes)
        .and_then(|_| staged.as_file().sync_all())
        .map_err(|err| Error::output_unwritable(path, err))?;
    staged
        .persist(path)
        .map_err(|err| Error::output_unwritable(path, err.error))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote regional master");
    Ok(())
}

pub fn summary(path: &Path, master: &Master) -> String {
    format!(
        "Saved to {}\nprefectures: {}, cities: {}",
        path.display(),
        master.statistics.total_prefectures,
        master.statistics.total_cities
    )
}

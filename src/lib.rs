//! Administrative tooling around the clinic application's regional data.
//!
//! The core is the regional master merge: three source documents (area
//! code catalog, regional statistics, e-Stat API parameters) are fused
//! into `japan_regional_master.json`. The remaining modules back the small
//! helper binaries: RAG store management, a read-only RAG query helper, a
//! Parquet export of the master and a clinic-records diagnostic.

pub mod classify;
pub mod config;
pub mod error;
pub mod fallback;
pub mod logging;
pub mod master;
pub mod rag;
pub mod records;
pub mod schema;
pub mod source;
pub mod table;
pub mod writer;

pub use config::MergePaths;
pub use error::{Error, ErrorKind, Result};
pub use schema::Master;

/// Load, build, check and write in one pass.
///
/// Nothing is written unless the built tree passes the invariant check.
pub fn run_merge(paths: &MergePaths) -> Result<Master> {
    let sources = source::load_sources(paths)?;
    let master = master::build_master(&sources);
    master::check_invariants(&master)?;
    writer::write_master(&paths.output, &master)?;
    Ok(master)
}

use clap::Parser;
use regional_master::config::{self, MASTER_FILE, MASTER_TABLE_FILE};
use regional_master::{logging, table};
use std::path::PathBuf;
use std::process;

/// Export the regional master as one Parquet row per municipality.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Master document produced by build_regional_master.
    #[arg(long, default_value_os_t = config::data_path(MASTER_FILE))]
    master: PathBuf,
    /// Destination Parquet file.
    #[arg(long, default_value_os_t = config::data_path(MASTER_TABLE_FILE))]
    output: PathBuf,
}

pub fn main() {
    logging::init();
    let args = Args::parse();
    match table::export_master(&args.master, &args.output) {
        Ok(rows) => println!("Saved {} municipalities to {}", rows, args.output.display()),
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    }
}

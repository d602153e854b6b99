use clap::Parser;
use regional_master::config::{self, CLINIC_RECORDS_FILE};
use regional_master::{logging, records};
use std::path::PathBuf;
use std::process;

/// Print the layout of the clinic-records spreadsheet (.xlsx, or a .csv export).
#[derive(Parser)]
#[command(version)]
struct Args {
    #[arg(default_value_os_t = config::data_path(CLINIC_RECORDS_FILE))]
    path: PathBuf,
    /// Number of leading rows to print.
    #[arg(long, default_value_t = 5)]
    sample: usize,
}

pub fn main() {
    logging::init();
    let args = Args::parse();
    match records::inspect(&args.path, args.sample) {
        Ok(report) => println!("{}\n{}", args.path.display(), report),
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    }
}

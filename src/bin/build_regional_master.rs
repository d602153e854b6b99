use regional_master::{logging, run_merge, writer, MergePaths};
use std::process;

pub fn main() {
    logging::init();
    let paths = MergePaths::default();
    match run_merge(&paths) {
        Ok(master) => println!("{}", writer::summary(&paths.output, &master)),
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    }
}

//! Management front-end for the RAG store.
//!
//! ```bash
//! rag_admin init
//! rag_admin reload --knowledge data/knowledge
//! rag_admin status
//! ```

use clap::error::ErrorKind as ClapErrorKind;
use clap::{Parser, ValueEnum};
use regional_master::config::{self, KNOWLEDGE_DIR, RAG_STORE_FILE};
use regional_master::rag::RagStore;
use regional_master::{logging, Result};
use std::path::PathBuf;
use std::process;

#[derive(Clone, Copy, ValueEnum)]
enum Verb {
    /// Create the store file and schema.
    Init,
    /// Replace all documents with the knowledge directory contents.
    Reload,
    /// Print document counts and the last reload time.
    Status,
}

#[derive(Parser)]
#[command(version, about = "Initialize, reload, or inspect the RAG store")]
struct Args {
    #[arg(value_enum)]
    verb: Verb,
    /// SQLite file holding the store.
    #[arg(long, default_value_os_t = config::data_path(RAG_STORE_FILE))]
    db: PathBuf,
    /// Directory scanned by `reload`.
    #[arg(long, default_value_os_t = config::data_path(KNOWLEDGE_DIR))]
    knowledge: PathBuf,
}

fn run(args: &Args) -> Result<()> {
    match args.verb {
        Verb::Init => {
            RagStore::init(&args.db)?;
            println!("Initialized {}", args.db.display());
        }
        Verb::Reload => {
            let mut store = RagStore::init(&args.db)?;
            let count = store.reload(&args.knowledge)?;
            println!("Loaded {} documents into {}", count, args.db.display());
        }
        Verb::Status => {
            let store = RagStore::open_existing(&args.db)?;
            println!("{}", store.status()?);
        }
    }
    Ok(())
}

pub fn main() {
    logging::init();
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => err.exit(),
            _ => {
                let _ = err.print();
                process::exit(1);
            }
        },
    };
    if let Err(err) = run(&args) {
        eprintln!("{}", err);
        process::exit(1);
    }
}

use clap::Parser;
use regional_master::config::{self, RAG_STORE_FILE};
use regional_master::logging;
use regional_master::rag::QueryHelper;
use std::path::PathBuf;

/// Search the RAG store without writing to it.
#[derive(Parser)]
#[command(version)]
struct Args {
    term: String,
    #[arg(long, default_value_t = 5)]
    limit: usize,
    #[arg(long, default_value_os_t = config::data_path(RAG_STORE_FILE))]
    db: PathBuf,
}

pub fn main() {
    logging::init();
    let args = Args::parse();
    let helper = QueryHelper::new(&args.db);
    let hits = helper.search(&args.term, args.limit);
    if hits.is_empty() {
        println!(
            "No documents matched \"{}\" ({} documents searched)",
            args.term,
            helper.document_count()
        );
    }
    for hit in hits {
        println!("{} | {}\n    {}", hit.path, hit.title, hit.snippet);
    }
}

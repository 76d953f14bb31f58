use std::env;
use std::path::Path;
use std::process::ExitCode;

use helpdesk_cli::{init_logging, load_embedder, parse_ingest_args};
use helpdesk_core::chunker::Chunker;
use helpdesk_core::config::Config;
use helpdesk_rag::Ingestor;
use helpdesk_vector::LanceStore;

const USAGE: &str = "usage: helpdesk-ingest [--rebuild] [code|chat ...]";

fn main() -> anyhow::Result<ExitCode> {
    init_logging();
    let args: Vec<String> = env::args().skip(1).collect();
    let args = match parse_ingest_args(&args) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{e}\n{USAGE}");
            return Ok(ExitCode::FAILURE);
        }
    };
    let settings = Config::load()?.settings()?;

    let store = LanceStore::open(Path::new(&settings.data.lancedb_dir))?;
    let embedder = load_embedder(&settings)?;
    let ingestor = Ingestor::new(Chunker::new(settings.chunking.clone())?, embedder.clone(), settings.embedding.batch_size);

    let mut failed = 0usize;
    for corpus in args.corpora {
        let Some(source) = settings.retrieval.source_for(corpus) else {
            tracing::warn!("No retrieval source is configured for the {} corpus; skipping", corpus);
            continue;
        };
        if args.rebuild {
            store.clear(&source.table)?;
        }
        let writer = store.writer(corpus, &source.table, embedder.dim());
        let export = settings.data.export_for(corpus);
        match ingestor.ingest_file(corpus, Path::new(export), &writer) {
            Ok(report) => println!(
                "{}: {} documents, {} chunks, {} records -> {}",
                corpus, report.documents, report.chunks, report.records, source.table
            ),
            Err(e) => {
                tracing::error!("{:#}", anyhow::Error::from(e));
                failed += 1;
            }
        }
    }
    for source in &settings.retrieval.sources {
        if let Some(rows) = store.row_count(&source.table)? {
            tracing::info!("{} ({}): {} rows", source.name, source.table, rows);
        }
    }
    Ok(if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

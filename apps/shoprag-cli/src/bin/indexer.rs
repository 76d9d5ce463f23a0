use clap::Parser;
use std::path::PathBuf;

use shoprag_cli::init_tracing;
use shoprag_core::chunker::Chunker;
use shoprag_core::config::{expand_path, Config};
use shoprag_core::data_processor::DataProcessor;
use shoprag_embed::get_default_embedder;
use shoprag_vector::IndexWriter;

/// Build the vector index and metadata file from the product catalogue and FAQ document.
#[derive(Parser, Debug)]
#[command(name = "shoprag-indexer", version)]
struct Args {
    /// Product catalogue CSV (defaults to data.products_csv)
    #[arg(long)]
    products: Option<String>,
    /// FAQ document; skipped if missing (defaults to data.faqs_path)
    #[arg(long)]
    faqs: Option<String>,
    #[arg(long)]
    index_dir: Option<String>,
    #[arg(long)]
    meta: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;

    let pick = |arg: &Option<String>, default: PathBuf| arg.as_deref().map(expand_path).unwrap_or(default);
    let products = pick(&args.products, settings.data.products_csv());
    let faqs = pick(&args.faqs, settings.data.faqs_path());
    let index_dir = pick(&args.index_dir, settings.data.index_dir());
    let meta = pick(&args.meta, settings.data.meta_path());

    println!("Products: {}", products.display());
    println!("FAQs:     {}", faqs.display());
    let processor = DataProcessor::new(Chunker::from_config(&settings.chunking)?);
    let records = processor.process_sources(&products, &faqs)?;

    let embedder = get_default_embedder(&settings.embedding)?;
    let report = IndexWriter::new(&index_dir, &meta)
        .with_batch_size(settings.embedding.batch_size)
        .build(&records, &*embedder)
        .await?;

    println!("Index built with {} items", report.chunks);
    println!("  index:    {}", index_dir.display());
    println!("  metadata: {}", meta.display());
    println!("  embedder: {} (d{})", report.embedder_id, report.dim);
    Ok(())
}

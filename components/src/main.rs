use clap::Parser;
use ragflow_components::callbacks::{self, Context, LogCallbackConfig};
use ragflow_components::config::Config;
use ragflow_components::retriever::ragflow::{get_org_doc_name, Retriever};
use ragflow_components::retriever::{with_score_threshold, with_top_k, RetrieveOption};
use tracing::info;

/// Run one retrieval against a RAGFlow server.
#[derive(Debug, Parser)]
#[command(name = "ragflow-query", version)]
struct Args {
    /// Question to search for.
    query: String,

    /// Override the number of chunks engaged in vector computation.
    #[arg(long)]
    top_k: Option<usize>,

    /// Drop chunks scoring below this similarity.
    #[arg(long)]
    score_threshold: Option<f64>,

    /// Write the callback log to stdout instead of log/agent.log.
    #[arg(long)]
    stdout: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    let retriever = Retriever::new(config.retriever_config())?;
    info!("Retriever ready at {}", retriever.url());

    let handler = if args.stdout {
        callbacks::log_callback(Some(LogCallbackConfig {
            debug: std::env::var("DEBUG").map(|v| v == "true").unwrap_or(false),
            ..Default::default()
        }))
    } else {
        callbacks::new_log_callback()?
    };
    let ctx = Context::new().with_handler(handler);

    let mut opts: Vec<RetrieveOption> = Vec::new();
    if let Some(top_k) = args.top_k {
        opts.push(with_top_k(top_k));
    }
    if let Some(threshold) = args.score_threshold {
        opts.push(with_score_threshold(threshold));
    }

    let docs = retriever.retrieve(&ctx, &args.query, &opts).await?;
    info!("Retrieved {} documents", docs.len());

    for doc in &docs {
        println!(
            "{:.4}\t{}\t{}",
            doc.score(),
            get_org_doc_name(Some(doc)),
            doc.content.replace('\n', " ")
        );
    }

    Ok(())
}

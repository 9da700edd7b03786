use std::sync::Arc;

use clap::Parser;

mod cli;
mod config;
mod engine;
mod llm;
mod normalize;
mod scrape;
mod semantic;
mod web;

use config::Config;
use engine::{Engine, ScrapeSource};
use llm::LlmClient;
use semantic::EmbeddingModel;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newsrag=info,tower_http=info".into()),
        )
        .init();

    let args = cli::Args::parse();
    let config = Config::load();

    match args.command {
        cli::Command::Scrape {} => {
            let corpus = scrape::corpus::build_corpus(&config.scrape)?;
            println!("{corpus}");
            Ok(())
        }

        cli::Command::Ask { question } => {
            let engine = build_engine(&config)?;
            println!("{}", engine.answer(&question)?);
            Ok(())
        }

        cli::Command::Daemon {} => {
            let engine = Arc::new(build_engine(&config)?);
            web::start_daemon(engine, &config.listen);
            Ok(())
        }
    }
}

/// Wire the production pipeline: live scraper, local embedding model,
/// remote completion API.
fn build_engine(config: &Config) -> anyhow::Result<Engine> {
    let model = EmbeddingModel::new(
        &config.semantic.model,
        config.base_path().to_path_buf(),
        Some(std::time::Duration::from_secs(
            config.semantic.download_timeout_secs,
        )),
    )?;

    let llm = LlmClient::from_config(&config.llm)?;

    Ok(Engine::new(
        Box::new(ScrapeSource::new(config.scrape.clone())),
        Box::new(model),
        Box::new(llm),
    ))
}

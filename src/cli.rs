use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the web front end.
    Daemon {},

    /// Run the scrape pipeline once and print the raw corpus.
    Scrape {},

    /// Build the corpus and answer a single question.
    Ask {
        /// Free-text question about the scraped news
        question: String,
    },
}

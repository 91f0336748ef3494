use std::path::PathBuf;

use clap::{Parser, Subcommand};

use revsense_core::ReviewId;

/// Product review sentiment analysis.
///
/// Paths and the training seed come from REVSENSE_* environment variables.
#[derive(Parser, Debug)]
#[command(name = "revsense", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Train the sentiment model, or report the existing one.
    Train {
        /// Retrain even if a model is already stored.
        #[arg(long)]
        retrain: bool,
        /// JSON corpus (`[{"text", "label"}]`) instead of the built-in seed corpus.
        #[arg(long, value_name = "FILE")]
        corpus: Option<PathBuf>,
    },
    /// Analyze exported reviews into the results store.
    Backfill {
        /// JSON array of `{"review_id", "text"}`.
        #[arg(long, value_name = "FILE")]
        reviews: PathBuf,
        /// Re-analyze reviews that already have a result.
        #[arg(long)]
        force: bool,
        /// Process at most N reviews.
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },
    /// Analyze ad-hoc texts and print one JSON result per text.
    Analyze {
        #[arg(required = true, value_name = "TEXT")]
        texts: Vec<String>,
    },
    /// Print model status and artifact location.
    Info,
    /// Print the stored sentiment for one review.
    Show {
        review_id: ReviewId,
    },
    /// Print aggregate sentiment over all stored results.
    Summary,
}

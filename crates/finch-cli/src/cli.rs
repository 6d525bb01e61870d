//! CLI argument definitions

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "finch", version, about = "Explainable financial-wellness recommendations")]
pub struct Cli {
    /// Path to the database file (defaults to the platform data directory)
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Use an unencrypted database (not recommended outside development)
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Verbose logging (equivalent to RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Seed the five demo user profiles
    Seed,

    /// Assign a persona to a user
    Assign {
        /// User id to analyze
        #[arg(long)]
        user: String,
        /// Recompute even when a cached result exists
        #[arg(long)]
        force_refresh: bool,
        /// Print the full assignment as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate education items and partner offers for a user
    Recommend {
        /// User id to analyze
        #[arg(long)]
        user: String,
        /// Recompute even when a cached result exists
        #[arg(long)]
        force_refresh: bool,
        /// Print the full payload as JSON
        #[arg(long)]
        json: bool,
    },

    /// List decision traces in the review queue
    Traces {
        /// Filter by review status (pending, approved, flagged)
        #[arg(long)]
        status: Option<String>,
        /// Maximum number of traces to show
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },

    /// Resolve a decision trace in the review queue
    Review {
        /// Trace id
        #[arg(long)]
        id: i64,
        /// New status (approved or flagged)
        #[arg(long)]
        status: String,
        /// Optional reviewer note
        #[arg(long)]
        note: Option<String>,
    },

    /// Run the evaluation report over all stored users
    Report {
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the REST API server
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

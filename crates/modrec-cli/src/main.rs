//! modrec CLI
//!
//! Reconciles the `go.mod` of the current directory against a govendor
//! `vendor.json`

use clap::Parser;
use modrec_core::logging_facility::{self, Profile};

mod commands;
mod report;

#[derive(Debug, Parser)]
#[command(name = "modrec")]
#[command(
    about = "Compare go.mod requirements with the revisions pinned in a govendor vendor.json",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    diff: commands::diff::DiffArgs,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    log_json: bool,
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    logging_facility::init(if cli.log_json {
        Profile::Production
    } else {
        Profile::Development
    });

    if let Err(e) = commands::diff::execute(cli.diff) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

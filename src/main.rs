//! DFA URL Router CLI
//!
//! Loads a route table from TOML, compiles it and answers questions about it.
//!
//! ```text
//! dfa-router --config routes.toml check
//! dfa-router --config routes.toml match /products/42 --method GET
//! dfa-router --config routes.toml states
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use dfa_router::config::load_config;
use dfa_router::observability::{logging, metrics};
use dfa_router::routing::Router;

#[derive(Parser)]
#[command(name = "dfa-router")]
#[command(about = "Compile and query a DFA route table", long_about = None)]
struct Cli {
    /// Route table to load.
    #[arg(short, long, default_value = "routes.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and build the matcher
    Check,
    /// Match a request path and print the route values as JSON
    Match {
        path: String,
        #[arg(short, long, default_value = "GET")]
        method: String,
    },
    /// Print the compiled state table
    States,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    logging::init_logging(&config.observability);
    metrics::set_enabled(config.observability.metrics_enabled);

    tracing::info!(
        path = %cli.config.display(),
        routes = config.routes.len(),
        "Configuration loaded"
    );

    let router = Router::new(config.constraint_map());
    router.rebuild_from(&config)?;
    let matcher = router.current();

    match cli.command {
        Commands::Check => {
            println!(
                "ok: {} routes, {} states, {} candidates",
                config.routes.len(),
                matcher.state_count(),
                matcher.candidate_count()
            );
        }
        Commands::Match { path, method } => match matcher.match_path(&path, &method) {
            Some(found) => println!("{}", serde_json::to_string_pretty(&found)?),
            None => {
                eprintln!("no match for {} {}", method, path);
                return Ok(ExitCode::FAILURE);
            }
        },
        Commands::States => print!("{}", matcher),
    }

    Ok(ExitCode::SUCCESS)
}

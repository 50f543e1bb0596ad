//! har-replay CLI

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use har_replay::config::Config;
use har_replay::network::ReplayServer;
use har_replay::replay::{RecordedTraffic, ReplayCoordinator};
use har_replay::{har, Result};

#[tokio::main]
async fn main() {
    let config = match parse_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("Error: {message}");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    init_tracing(config.verbose);

    if let Err(e) = run(config).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(config: Config) -> Result<()> {
    config.validate()?;

    let document = har::load(&config.har_file)?;
    let traffic = Arc::new(RecordedTraffic::from_har(document));

    info!(
        "loaded {} entries from {}",
        traffic.len(),
        config.har_file.display()
    );

    let coordinator = ReplayCoordinator::new(traffic, config.verbose);
    let server = ReplayServer::new(coordinator);

    server.run(config.port).await
}

fn parse_args(mut args: impl Iterator<Item = String>) -> std::result::Result<Config, String> {
    let mut har_file: Option<PathBuf> = None;
    let mut port: u16 = 8080;
    let mut verbose = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--har-file" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--har-file requires a value".to_string())?;
                har_file = Some(PathBuf::from(value));
            }
            "--port" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--port requires a value".to_string())?;
                port = value
                    .parse()
                    .map_err(|_| format!("invalid port: {value}"))?;
            }
            "--verbose" => verbose = true,
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }

    let har_file = har_file.ok_or_else(|| "--har-file is required".to_string())?;

    Ok(Config {
        har_file,
        port,
        verbose,
    })
}

fn print_usage() {
    eprintln!("har-replay v{}", env!("CARGO_PKG_VERSION"));
    eprintln!();
    eprintln!("Usage: har-replay --har-file <path> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --har-file <path>  Path to the HAR file to replay (required)");
    eprintln!("  --port <port>      Port to listen on (default: 8080)");
    eprintln!("  --verbose          Emit per-request diagnostics");
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "har_replay=debug,info" } else { "info" };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use wellopt::{start_server, ModelDefaults, ReferenceData, ServerConfig, SolverBackend, SolverFactory};

/// gRPC server for the underground-well cooling optimizer
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:50051")]
    address: SocketAddr,

    /// LP backend used for every request
    #[arg(long, value_enum, default_value_t = SolverBackend::default())]
    solver: SolverBackend,

    /// Directory holding the reference CSV datasets
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// TOML file overriding the built-in scenario constants
    #[arg(long)]
    defaults: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let solver = SolverFactory::create_from_backend(args.solver)?;
    let defaults = match &args.defaults {
        Some(path) => ModelDefaults::from_path(path)?,
        None => ModelDefaults::default(),
    };
    let reference = ReferenceData::load_dir(&args.data_dir);

    let config = ServerConfig::new(args.address, solver)
        .with_reference(reference)
        .with_defaults(defaults);
    start_server(config).await?;

    Ok(())
}

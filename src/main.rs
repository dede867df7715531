//! k8s-crd-provider - External Secrets custom resources as Hemmer data sources

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use k8s_crd_provider::{
    init_logging_with_default, serve_on_with_options, serve_with_options, CrdProvider,
    ProviderService, ServeOptions,
};

/// Hemmer provider for Kubernetes custom resources
#[derive(Parser, Debug)]
#[command(name = "k8s-crd-provider", version, about, long_about = None)]
struct Cli {
    /// Default log level; RUST_LOG overrides it
    #[arg(long, global = true, env = "K8S_CRD_PROVIDER_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the provider over gRPC (default)
    Serve(ServeArgs),

    /// Print the provider schema as JSON and exit
    Schema,
}

#[derive(Parser, Debug, Default)]
struct ServeArgs {
    /// Address to listen on. An ephemeral localhost port when unset.
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// Seconds to wait for in-flight requests on shutdown
    #[arg(long, default_value = "30")]
    shutdown_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // kube's rustls client needs a process-wide crypto provider. Err means
    // one is already installed.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();
    init_logging_with_default(&cli.log_level);

    let provider = CrdProvider::new().map_err(|e| {
        error!(error = %e, "Failed to build data source catalogue");
        e
    })?;

    match cli.command {
        Some(Commands::Schema) => {
            println!("{}", serde_json::to_string_pretty(&provider.schema())?);
            Ok(())
        },
        Some(Commands::Serve(args)) => run_server(provider, args).await,
        None => {
            run_server(
                provider,
                ServeArgs {
                    shutdown_timeout: 30,
                    ..Default::default()
                },
            )
            .await
        },
    }
}

async fn run_server(provider: CrdProvider, args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = ServeOptions::new().with_shutdown_timeout(Duration::from_secs(args.shutdown_timeout));
    info!(
        data_sources = provider.registry().len(),
        version = env!("CARGO_PKG_VERSION"),
        "Starting k8s-crd-provider"
    );

    match args.listen {
        Some(addr) => serve_on_with_options(provider, addr, options).await,
        None => serve_with_options(provider, options).await,
    }
}

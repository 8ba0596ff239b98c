mod cli;

use castream::{
    config,
    server,
    streaming::{StreamerService, TracingKeepAlive},
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::sync::Arc;

async fn serve(
    file: &Path,
    name: Option<&str>,
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config::validate_config(&config)?;

    let streamer = Arc::new(StreamerService::new(Arc::new(TracingKeepAlive)));

    let session = streamer
        .set_stream_file(file, name)
        .with_context(|| format!("Failed to open media file: {:?}", file))?;

    tracing::info!(
        "Casting {} ({} bytes) at http://{}:{}/stream",
        session.name,
        session.length,
        config.server.host,
        config.server.port
    );

    server::start_server(config, streamer).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "castream=trace,castream_stream=trace,tower_http=debug".to_string()
        } else {
            "castream=info,castream_stream=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Serve {
            file,
            name,
            host,
            port,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(serve(
                &file,
                name.as_deref(),
                host,
                port,
                cli.config.as_deref(),
            ))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("castream {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Chunk size: {} bytes", config.stream.chunk_size);
            println!("  Channel depth: {}", config.stream.channel_depth);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
        }
    }

    Ok(())
}

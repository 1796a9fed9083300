use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use flexchat::{config, gateway, upload};

#[derive(Parser)]
#[command(name = "flexchat")]
#[command(about = "FLEXIBLE AI chat relay server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind to (overrides config)
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Bind address (overrides config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Print the snippet an upload of this file would produce
    Extract {
        /// Path to the file
        path: PathBuf,

        /// MIME type (guessed from the file name when omitted)
        #[arg(long)]
        mime: Option<String>,
    },

    /// Show resolved configuration
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, bind } => {
            let mut config = config::load()?;
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            config::validate(&config)?;
            gateway::run(config).await
        }
        Commands::Extract { path, mime } => {
            let name = path.to_string_lossy();
            let mime = upload::resolve_mime(mime.as_deref(), &name);
            let snippet = upload::extract(&path, &mime).await?;
            println!("{snippet}");
            Ok(())
        }
        Commands::Status => {
            let config = config::load()?;
            println!("flexchat v{}", env!("CARGO_PKG_VERSION"));
            println!("listen: {}:{}", config.server.bind, config.server.port);
            println!("uploads: {}", config.server.uploads_dir.display());
            println!(
                "client build: {} ({})",
                config.server.client_dist.display(),
                if config.server.client_dist.is_dir() {
                    "found"
                } else {
                    "missing"
                }
            );
            println!("model: {}", config.chat.model());
            println!("api base: {}", config.chat.api_base());
            println!(
                "api key: {}",
                if config.chat.api_key.is_some() {
                    "set"
                } else {
                    "not set"
                }
            );
            Ok(())
        }
    }
}

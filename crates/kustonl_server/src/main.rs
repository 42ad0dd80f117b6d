//! kustonl binary.
//!
//! - `serve` runs the HTTP service
//! - `ask` sends a question to a running service and prints the answer
//! - `generate` prints the KQL generated for a question without running it

use clap::{Parser, Subcommand};
use kustonl_models::{AzureOpenAiConfig, AzureOpenAiDriver, Completer};
use kustonl_server::{
    DEFAULT_SERVICE_URL, LoggingSettings, ServerSettings, ServiceClient, Settings, generate_query,
    init_tracing, serve,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "kustonl")]
#[command(about = "Ask Azure Data Explorer questions in plain language", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Cluster configuration file (overrides KUSTONL_CONFIG)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Listen address (overrides KUSTONL_BIND)
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// Ask a running service and print the answer as markdown
    Ask {
        /// The question, or hi/hello/help
        prompt: String,

        /// Service base URL
        #[arg(long, env = "KUSTONL_URL", default_value = DEFAULT_SERVICE_URL)]
        url: String,
    },

    /// Print the KQL generated for a question without running it
    Generate {
        /// The question
        prompt: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut logging = LoggingSettings::from_env();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    init_tracing(&logging)?;

    match cli.command {
        Commands::Serve { config, bind } => {
            let mut server = ServerSettings::from_env()?;
            if let Some(config) = config {
                server.config_path = config;
            }
            if let Some(bind) = bind {
                server.bind = bind;
            }
            let settings = Settings::with_server(server, |key| std::env::var(key).ok())?;
            serve(&settings).await?;
        }

        Commands::Ask { prompt, url } => {
            let answer = ServiceClient::new(url).ask(&prompt).await?;
            println!("{answer}");
        }

        Commands::Generate { prompt } => {
            let config = AzureOpenAiConfig::from_env()?;
            let completer = Completer::new(Arc::new(AzureOpenAiDriver::new(config.clone())))
                .with_default_model(config.deployment);
            let query = generate_query(&completer, &prompt).await?;
            println!("{query}");
        }
    }

    Ok(())
}

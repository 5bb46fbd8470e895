mod render_cmd;
mod setup;
mod terminal_output;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use chatmark_config::{config_dir, config_file_path, load_and_prepare};
use render_cmd::{BlocksFormat, OutputFormat, StreamOptions};

#[derive(Parser)]
#[command(name = "chatmark")]
#[command(about = "Render chat Markdown with copyable code blocks")]
#[command(version)]
struct Cli {
    /// Config file (defaults to config.yaml or config.toml in the config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a Markdown document
    Render {
        /// Input file; stdin when omitted or `-`
        file: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value = "html")]
        format: OutputFormat,

        /// Replay the input in chunks, printing a frame per chunk
        #[arg(long)]
        stream: bool,

        /// Characters per streamed chunk
        #[arg(long, default_value_t = 24)]
        chunk: usize,

        /// Delay between streamed chunks, in milliseconds
        #[arg(long, default_value_t = 40)]
        delay_ms: u64,
    },
    /// List the code blocks in a document
    Blocks {
        file: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value = "table")]
        format: BlocksFormat,
    },
    /// Copy one code block to the system clipboard
    Copy {
        /// Zero-based block index, as listed by `blocks`
        index: usize,

        file: Option<PathBuf>,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| config_file_path(&config_dir()));
    let config = load_and_prepare(&config_path)
        .await
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let level = cli.log_level.as_deref().unwrap_or(config.log_level());
    logging::init_logger(config.log_dir(), level);
    debug!(path = %config_path.display(), "Configuration ready");

    let options = setup::parse_options(&config);

    match cli.command {
        Commands::Render { file, format, stream, chunk, delay_ms } => {
            let text = render_cmd::read_input(file.as_deref()).await?;
            let stream = stream.then(|| StreamOptions {
                chunk_chars: chunk,
                delay: Duration::from_millis(delay_ms),
            });
            // Rendering never touches the clipboard.
            let view = setup::view_from_config(&config, Arc::new(setup::registry_from_config(&config)?), None);
            render_cmd::render(view, options, text, format, stream).await?;
        }
        Commands::Blocks { file, format } => {
            let text = render_cmd::read_input(file.as_deref()).await?;
            render_cmd::blocks(&text, options, format)?;
        }
        Commands::Copy { index, file } => {
            let text = render_cmd::read_input(file.as_deref()).await?;
            let registry = Arc::new(setup::registry_from_config(&config)?);
            let view = setup::view_from_config(&config, registry, setup::clipboard_from_config(&config));
            render_cmd::copy(view, &text, index).await?;
        }
        Commands::Config => {
            print!("{}", serde_yaml::to_string(&config)?);
        }
    }

    Ok(())
}

use std::path::PathBuf;

use clap::Parser;
use prompt_stream::client::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use prompt_stream::prompt::{DEFAULT_PREAMBLE, DEFAULT_PROMPT_FILE};
use prompt_stream::{GenerateOptions, PromptStreamer, StreamError, StreamerConfig};
use tracing_subscriber::EnvFilter;

/// Send a file to a local Ollama server and stream the reply to stdout.
#[derive(Debug, Parser)]
#[command(name = "prompt-stream", version, about)]
struct Cli {
    /// File whose contents are sent after the preamble.
    #[arg(short, long, env = "PROMPT_STREAM_FILE", default_value = DEFAULT_PROMPT_FILE)]
    file: PathBuf,

    /// Model identifier.
    #[arg(short, long, env = "PROMPT_STREAM_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Ollama base URL (`host:port` is accepted).
    #[arg(long, env = "OLLAMA_HOST", default_value = DEFAULT_BASE_URL)]
    host: String,

    /// Text placed before the file contents.
    #[arg(long, default_value = DEFAULT_PREAMBLE)]
    preamble: String,

    /// How long the server keeps the model loaded (e.g. "5m", "0").
    #[arg(long)]
    keep_alive: Option<String>,

    /// Sampling temperature.
    #[arg(long)]
    temperature: Option<f64>,

    /// Maximum number of tokens to generate.
    #[arg(long)]
    num_predict: Option<u32>,

    /// Context window size.
    #[arg(long)]
    num_ctx: Option<u32>,

    /// Random seed.
    #[arg(long)]
    seed: Option<i64>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). Logs go to stderr.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn into_config(self) -> StreamerConfig {
        StreamerConfig {
            prompt_file: self.file,
            preamble: self.preamble,
            model: self.model,
            base_url: self.host,
            keep_alive: self.keep_alive,
            options: GenerateOptions {
                temperature: self.temperature,
                num_predict: self.num_predict,
                num_ctx: self.num_ctx,
                seed: self.seed,
                ..Default::default()
            },
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run_cli(cli.into_config()).await {
        eprintln!("prompt-stream error: {}", error_chain(&err));
        std::process::exit(1);
    }
}

/// Render an error followed by each of its sources, outermost first.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !rendered.ends_with(&text) {
            rendered.push_str(": ");
            rendered.push_str(&text);
        }
        source = cause.source();
    }
    rendered
}

async fn run_cli(config: StreamerConfig) -> Result<(), StreamError> {
    tracing::info!(file = %config.prompt_file.display(), model = %config.model, "starting prompt stream");

    let streamer = PromptStreamer::new(config);
    let mut stdout = std::io::stdout().lock();
    let summary = streamer.run(&mut stdout).await?;

    tracing::info!(
        outcome = ?summary.outcome,
        fragments = summary.fragments,
        bytes = summary.bytes_written,
        "prompt stream finished"
    );
    Ok(())
}

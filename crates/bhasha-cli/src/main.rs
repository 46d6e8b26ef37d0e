use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use bhasha_capabilities::Capabilities;
use bhasha_core::config::{Config, LoggingConfig};
use bhasha_core::language::{self, Language};
use bhasha_core::types::{
    InputModality, MediaBlob, Operation, OutputModality, Payload, VoiceGender,
};
use bhasha_pipeline::{OperationResponse, PipelineExecutor, PipelineRequest};

#[derive(Parser)]
#[command(
    name = "bhasha-relay",
    about = "Language-aware relay for speech, text and image translation across Indian languages",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Port to listen on (default: 8000)
        #[arg(long)]
        port: Option<u16>,

        /// Address to bind (default: 127.0.0.1)
        #[arg(long)]
        host: Option<String>,
    },

    /// Run one pipeline and print the response as JSON
    Run {
        /// Input type: text, audio or image
        #[arg(long)]
        input_type: InputModality,

        /// Input text (for --input-type text)
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// Input file (for audio or image)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Source language code
        #[arg(long)]
        from: String,

        /// Target language code
        #[arg(long)]
        to: String,

        /// Output type: text or audio
        #[arg(long, default_value = "text")]
        output: OutputModality,

        /// Voice for synthesized audio: male or female
        #[arg(long)]
        gender: Option<String>,
    },

    /// Show which operations a request would run, without calling anything
    Plan {
        #[arg(long)]
        input_type: InputModality,

        #[arg(long, default_value = "text")]
        output: OutputModality,

        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,
    },

    /// List supported languages and translation pairs
    Languages,

    /// Show configuration status
    Status,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Get a specific config value
    Get { key: String },
    /// Check the configuration for problems
    Validate,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_logging(logging: &LoggingConfig, verbose: bool) {
    let level = if verbose {
        "debug"
    } else {
        logging.level.as_deref().unwrap_or("info")
    };
    let mut directives = level.to_string();
    for filter in &logging.filters {
        directives.push(',');
        directives.push_str(filter);
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(directives));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match (logging.format.as_str(), logging.output.as_str()) {
        ("json", "stdout") => builder.json().with_writer(std::io::stdout).init(),
        ("json", _) => builder.json().with_writer(std::io::stderr).init(),
        (_, "stdout") => builder.with_writer(std::io::stdout).init(),
        _ => builder.with_writer(std::io::stderr).init(),
    }
}

/// Read a local file into a blob, guessing its content type from the extension.
async fn read_blob(path: &Path) -> anyhow::Result<MediaBlob> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".into());
    let content_type = mime_guess::from_path(path).first_or_octet_stream().to_string();
    Ok(MediaBlob::new(data, file_name, content_type))
}

async fn build_payload(
    input_type: InputModality,
    text: Option<String>,
    file: Option<PathBuf>,
) -> anyhow::Result<Payload> {
    match (input_type, text, file) {
        (InputModality::Text, Some(text), _) => Ok(Payload::Text(text)),
        (InputModality::Text, None, _) => anyhow::bail!("--text is required for text input"),
        (InputModality::Audio, _, Some(path)) => Ok(Payload::Audio(read_blob(&path).await?)),
        (InputModality::Image, _, Some(path)) => Ok(Payload::Image(read_blob(&path).await?)),
        (kind, _, None) => anyhow::bail!("--file is required for {kind} input"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config
    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);

    let config = Config::load(&config_path)?;

    init_logging(&config.logging(), cli.verbose);

    match cli.command {
        Commands::Serve { port, host } => {
            let port = port.unwrap_or_else(|| config.server_port());
            let host = host.unwrap_or_else(|| config.server_host());

            let (warnings, errors) = config.validate();
            for w in &warnings {
                tracing::warn!("{w}");
            }
            if !errors.is_empty() {
                for e in &errors {
                    tracing::error!("{e}");
                }
                anyhow::bail!("Invalid configuration ({} errors)", errors.len());
            }

            #[allow(unused_mut)]
            let mut state = bhasha_gateway::GatewayState::new(Arc::new(config))?;

            #[cfg(feature = "metrics")]
            {
                match bhasha_gateway::metrics::install_prometheus_recorder() {
                    Ok(handle) => state.metrics_handle = Some(handle),
                    Err(e) => tracing::warn!("Metrics disabled: {e}"),
                }
            }

            tracing::info!("Starting Bhasha Relay gateway on {host}:{port}");
            bhasha_gateway::start_gateway(Arc::new(state), &host, port).await?;
        }
        Commands::Run {
            input_type,
            text,
            file,
            from,
            to,
            output,
            gender,
        } => {
            let payload = build_payload(input_type, text, file).await?;
            let capabilities = Capabilities::from_config(&config)?;
            let executor = PipelineExecutor::new(capabilities, config.limits());

            let request = PipelineRequest::new(payload, from, to, output)
                .with_gender(VoiceGender::from_loose(gender.as_deref()));
            let result = executor.run(request).await?;

            let json = serde_json::to_string_pretty(&OperationResponse::from_result(result))?;
            println!("{json}");
        }
        Commands::Plan {
            input_type,
            output,
            from,
            to,
        } => {
            let plan = bhasha_pipeline::plan_for_codes(input_type, output, &from, &to)?;
            if plan.is_passthrough() {
                println!("(no operations: input is returned as-is)");
            } else {
                println!("{}", plan.wire_names().join(" -> "));
            }
        }
        Commands::Languages => {
            println!("Supported languages:");
            for lang in language::supported() {
                println!("  {:<4} {}", lang.code(), lang.display_name());
            }
            println!();
            println!("Translation pairs:");
            for (source, target) in language::translation_pairs() {
                println!(
                    "  {}-{:<4} {}",
                    source.code(),
                    target.code(),
                    language::format_pair(source, target)
                );
            }
        }
        Commands::Status => {
            let provider = config.provider();
            let endpoints = &provider.endpoints;
            let count = |operation: Operation| {
                Language::ALL
                    .into_iter()
                    .filter(|l| endpoints.language_endpoint(operation, *l).is_some())
                    .count()
            };

            println!("Bhasha Relay v{}", env!("CARGO_PKG_VERSION"));
            println!("Config: {}", config_path.display());
            println!("Listen: {}:{}", config.server_host(), config.server_port());
            println!(
                "Access token: {}",
                if provider.resolve_api_key().is_some() {
                    "configured".to_string()
                } else {
                    format!("missing (set ${})", provider.api_key_env_name())
                }
            );
            println!("ASR endpoints: {}/{}", count(Operation::Recognize), Language::ALL.len());
            println!("OCR endpoints: {}/{}", count(Operation::Extract), Language::ALL.len());
            println!("TTS endpoints: {}/{}", count(Operation::Synthesize), Language::ALL.len());
            println!(
                "MT endpoints:  {}/{}",
                language::translation_pairs()
                    .into_iter()
                    .filter(|(s, t)| endpoints.translation_endpoint(*s, *t).is_some())
                    .count(),
                language::translation_pairs().len()
            );
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let json = serde_json::to_string_pretty(&config)?;
                println!("{json}");
            }
            ConfigAction::Get { key } => match config.get_path(&key) {
                Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                None => anyhow::bail!("No config value at '{key}'"),
            },
            ConfigAction::Validate => {
                let (warnings, errors) = config.validate();
                for w in &warnings {
                    println!("warning: {w}");
                }
                for e in &errors {
                    println!("error: {e}");
                }
                if !errors.is_empty() {
                    anyhow::bail!("Configuration has {} error(s)", errors.len());
                }
                println!("Configuration OK ({} warnings)", warnings.len());
            }
            ConfigAction::Init { force } => {
                if config_path.exists() && !force {
                    anyhow::bail!(
                        "{} already exists (use --force to overwrite)",
                        config_path.display()
                    );
                }
                let defaults = Config {
                    server: Some(Default::default()),
                    provider: Some(Default::default()),
                    limits: Some(Default::default()),
                    logging: Some(Default::default()),
                };
                defaults.save(&config_path)?;
                println!("Wrote {}", config_path.display());
            }
        },
    }

    Ok(())
}

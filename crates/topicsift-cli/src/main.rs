use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use topicsift_core::{ExtractionSettings, LlmConfig, OpenAiChat, TopicExtractor, config_file};
use topicsift_ingest::DocumentSource;

mod output;

use output::ColorMode;

/// topicsift - Extract a structured topic list from PDFs with an LLM
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract topics from a PDF (or form-feed separated .txt) file
    Extract {
        /// Path to the document
        file_path: PathBuf,

        /// What the document is about; steers importance ratings
        #[arg(short, long)]
        description: Option<String>,

        /// Chat model name
        #[arg(long)]
        model: Option<String>,

        /// API key for the completion endpoint
        #[arg(long)]
        api_key: Option<String>,

        /// Base URL of an OpenAI-compatible API
        #[arg(long)]
        base_url: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Sort topics by importance (high first) before printing
        #[arg(long)]
        sort: bool,

        /// Path to output file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Convert a JSON topic list to AMSL (YAML without importance)
    ToAmsl {
        /// Path to the JSON file
        json_path: PathBuf,

        /// Path to output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    /// AMSL: YAML without the importance field
    Yaml,
    Text,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.log_file.as_deref())?;

    match cli.command {
        Command::Extract {
            file_path,
            description,
            model,
            api_key,
            base_url,
            format,
            sort,
            output,
            no_color,
        } => {
            let file = config_file::load_config();
            let llm = resolve_llm_config(file.llm_config(), model, api_key, base_url);
            extract(
                file_path,
                description,
                llm,
                file.extraction_settings(),
                format,
                sort,
                output,
                no_color,
            )
            .await
        }
        Command::ToAmsl { json_path, output } => to_amsl(&json_path, output),
    }
}

/// Logs go to stderr (or `--log-file`) so stdout stays clean for results.
fn init_logging(
    log_file: Option<&Path>,
) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(path) = log_file {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let name = path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("invalid log file path: {}", path.display()))?;
        let appender = tracing_appender::rolling::never(dir, name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .init();
        Ok(Some(guard))
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        Ok(None)
    }
}

/// Resolve configuration: CLI flags > env vars > config file > defaults
fn resolve_llm_config(
    file: LlmConfig,
    model: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
) -> LlmConfig {
    let timeout_secs: u64 = std::env::var("TOPICSIFT_TIMEOUT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(file.timeout_secs);

    LlmConfig {
        api_key: api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .or(file.api_key),
        base_url: base_url
            .or_else(|| std::env::var("OPENAI_BASE_URL").ok())
            .unwrap_or(file.base_url),
        model: model
            .or_else(|| std::env::var("TOPICSIFT_MODEL").ok())
            .unwrap_or(file.model),
        timeout_secs,
    }
}

#[allow(clippy::too_many_arguments)]
async fn extract(
    file_path: PathBuf,
    description: Option<String>,
    llm: LlmConfig,
    settings: ExtractionSettings,
    format: Format,
    sort: bool,
    output: Option<PathBuf>,
    no_color: bool,
) -> anyhow::Result<()> {
    if !file_path.exists() {
        anyhow::bail!("File not found: {}", file_path.display());
    }
    if llm.api_key.is_none() && llm.base_url == topicsift_core::config::DEFAULT_BASE_URL {
        anyhow::bail!("No API key configured. Set OPENAI_API_KEY or pass --api-key.");
    }

    tracing::info!(?llm, file = %file_path.display(), "starting extraction");
    let backend = Arc::new(OpenAiChat::new(&llm)?);
    let extractor = TopicExtractor::new(backend, settings);
    let source = DocumentSource::new();

    let bar = progress_bar();
    let progress = {
        let bar = bar.clone();
        move |event: topicsift_core::ProgressEvent| update_progress(&bar, &event)
    };

    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file_path.display().to_string());

    // Dropping the extraction future on Ctrl+C abandons the in-flight request.
    let result = tokio::select! {
        r = extractor.extract_topics_with_progress(
            &file_path,
            description.as_deref(),
            &source,
            &progress,
        ) => r,
        _ = tokio::signal::ctrl_c() => {
            bar.abandon_with_message("cancelled");
            anyhow::bail!("Cancelled");
        }
    };
    let mut topics = match result {
        Ok(topics) => topics,
        Err(e) => {
            bar.abandon_with_message("failed");
            return Err(e.into());
        }
    };

    if sort {
        topicsift_core::sort_by_importance(&mut topics);
    }

    let color = ColorMode(!no_color && output.is_none() && format == Format::Text);
    let mut writer: Box<dyn Write> = if let Some(ref output_path) = output {
        Box::new(std::fs::File::create(output_path)?)
    } else {
        Box::new(std::io::stdout())
    };

    match format {
        Format::Json => writeln!(writer, "{}", serde_json::to_string_pretty(&topics)?)?,
        Format::Yaml => write!(writer, "{}", topicsift_amsl::topics_to_amsl(&topics)?)?,
        Format::Text => output::print_topics(&mut writer, &topics, color)?,
    }
    writer.flush()?;

    let mut stderr = std::io::stderr();
    output::print_summary(&mut stderr, &file_name, &topics, ColorMode(!no_color))?;

    Ok(())
}

fn progress_bar() -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
    use std::time::Duration;

    let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg} [{bar:40.cyan/dim}] {pos}/{len} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    bar.set_message("Reading document...");
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

fn update_progress(bar: &indicatif::ProgressBar, event: &topicsift_core::ProgressEvent) {
    use topicsift_core::ProgressEvent;

    match *event {
        ProgressEvent::ChunkStarted { index, total } => {
            if bar.length() != Some(total as u64) {
                bar.set_length(total as u64);
            }
            bar.set_message(format!("Chunk {}/{}", index + 1, total));
        }
        ProgressEvent::ChunkFinished { .. } => bar.inc(1),
        ProgressEvent::Finished {
            topics,
            content_items,
        } => {
            bar.finish_with_message(format!(
                "Extracted {} topics, {} content items",
                topics, content_items
            ));
        }
    }
}

fn to_amsl(json_path: &Path, output: Option<PathBuf>) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(json_path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", json_path.display(), e))?;
    let amsl = topicsift_amsl::json_to_amsl(&json)?;

    if let Some(path) = output {
        std::fs::write(&path, amsl)?;
        eprintln!("AMSL written to {}", path.display());
    } else {
        print!("{}", amsl);
    }
    Ok(())
}

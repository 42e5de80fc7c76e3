//! scenebridge - test-run event bridge CLI
//!
//! The `scenebridge` command reads domain events as JSON lines and writes the
//! reporter events an external test runner expects.
//!
//! ## Commands
//!
//! - `translate`: Translate a domain event stream into reporter events
//! - `thresholds`: Show the outcome severity table

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, Level};

use scenebridge_core::{
    drain, obs, wire, BridgeConfig, BridgeError, DomainEvent, JsonLinesSink, Notifier, OutcomeKind,
    OutputFormat, PrettySink, ReporterSink, RunnerKind, SuccessThreshold, WorkerSpan, METRICS,
};

/// Events buffered between the reader task and the notifier.
const CHANNEL_CAPACITY: usize = 256;

#[derive(Parser)]
#[command(name = "scenebridge")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bridge test-run domain events to a test runner's reporter", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate domain events (JSON lines) into reporter events
    ///
    /// Exits with the number of failed scenarios, capped at 255.
    Translate(TranslateArgs),

    /// Print outcome kinds with their severity rank and compatible code
    Thresholds,
}

#[derive(clap::Args, Debug, Default)]
struct TranslateArgs {
    /// Domain event stream to read (default: stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Where to write reporter events (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, env = "SCENEBRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Worker id stamped on every reporter event
    #[arg(long)]
    cid: Option<String>,

    /// Spec file handled by this worker (repeatable)
    #[arg(long = "spec")]
    specs: Vec<String>,

    /// Runner adapter: mocha, jasmine or cucumber
    #[arg(long)]
    runner: Option<RunnerKind>,

    /// Success threshold as an outcome kind or a numeric code
    #[arg(long)]
    threshold: Option<SuccessThreshold>,

    /// Output format: json-lines or pretty
    #[arg(long)]
    format: Option<OutputFormat>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    scenebridge_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Translate(args) => {
            let failures = cmd_translate(&args).await?;
            std::process::exit(exit_code(failures));
        }
        Commands::Thresholds => cmd_thresholds(),
    }
}

/// Failure counts above 255 would wrap in the process exit status.
fn exit_code(failures: usize) -> i32 {
    failures.min(255) as i32
}

/// Configuration file (if any) with command-line flags layered on top.
fn resolve_config(args: &TranslateArgs) -> Result<BridgeConfig> {
    let mut config = match &args.config {
        Some(path) => BridgeConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => BridgeConfig::default(),
    };

    if let Some(cid) = &args.cid {
        config.cid = cid.clone();
    }
    if !args.specs.is_empty() {
        config.specs = args.specs.clone();
    }
    if let Some(runner) = args.runner {
        config.runner = runner;
    }
    if let Some(threshold) = args.threshold {
        config.success_threshold = Some(threshold);
    }
    if let Some(format) = args.format {
        config.format = format;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn open_sink(config: &BridgeConfig, output: Option<&Path>) -> Result<Box<dyn ReporterSink + Send>> {
    let out: Box<dyn Write + Send> = match output {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout()),
    };

    Ok(match config.format {
        OutputFormat::JsonLines => Box::new(JsonLinesSink::new(out)),
        OutputFormat::Pretty => Box::new(PrettySink::new(&config.cid, out)),
    })
}

async fn open_input(input: Option<&Path>) -> Result<Box<dyn AsyncRead + Unpin + Send>> {
    Ok(match input {
        Some(path) => Box::new(
            tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open input file {}", path.display()))?,
        ),
        None => Box::new(tokio::io::stdin()),
    })
}

/// Decode every line of `reader` and forward it until EOF or until the
/// receiving side goes away. Returns the number of lines read.
async fn pump_events<R>(reader: R, tx: mpsc::Sender<DomainEvent>) -> Result<u64>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut line_no = 0u64;

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        line_no += 1;
        let Some(event) = wire::decode_line(&line)
            .with_context(|| format!("Malformed domain event on line {line_no}"))?
        else {
            continue;
        };
        if tx.send(event).await.is_err() {
            debug!(line = line_no, "notifier stopped, no longer reading input");
            break;
        }
    }

    Ok(line_no)
}

/// Wait for the reader task. A task that died without finishing the input
/// means the event stream was cut short.
async fn join_reader(task: JoinHandle<Result<u64>>) -> Result<u64> {
    match task.await {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "input reader ended abnormally");
            Err(BridgeError::ChannelClosed).context("Reader task ended abnormally")
        }
    }
}

/// Run one translation and return the failure count.
async fn translate_stream<R>(
    config: &BridgeConfig,
    reader: R,
    sink: Box<dyn ReporterSink + Send>,
) -> Result<usize>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let _span = WorkerSpan::enter(&config.cid);
    obs::emit_run_started(&config.cid);

    let mut notifier = Notifier::new(sink, config.notifier_config());
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let reader_task = tokio::spawn(pump_events(reader, tx));

    let drained = drain(rx, &mut notifier).await;
    if let Err(e) = drained {
        reader_task.abort();
        METRICS.flush();
        return Err(e).context("Translation aborted");
    }

    let lines = join_reader(reader_task).await?;
    debug!(lines, "input exhausted");

    let open_ids = notifier.open_correlation_ids();
    obs::emit_unfinished(&open_ids);
    obs::emit_run_finished(&config.cid, notifier.failure_count(), open_ids.len());
    METRICS.flush();

    Ok(notifier.failure_count())
}

async fn cmd_translate(args: &TranslateArgs) -> Result<usize> {
    let config = resolve_config(args)?;
    info!(
        cid = %config.cid,
        runner = %config.runner,
        threshold = %config.effective_threshold(),
        "Translating domain events"
    );

    let reader = open_input(args.input.as_deref()).await?;
    let sink = open_sink(&config, args.output.as_deref())?;
    translate_stream(&config, reader, sink).await
}

fn cmd_thresholds() -> Result<()> {
    println!("{:<24} {:>4} {:>6}", "KIND", "RANK", "CODE");
    for kind in OutcomeKind::ALL {
        println!("{:<24} {:>4} {:>6}", kind.as_str(), kind.rank(), kind.code());
    }
    Ok(())
}

//! GRC Core - Command Line Entry Point
//!
//! ```text
//! grc-core ingest-policy <file>
//! grc-core retrain <events.jsonl> [limit]
//! grc-core evaluate <events.jsonl>
//! grc-core ask <question...>
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use thiserror::Error;

use grc_core::constants;
use grc_core::logic::ai_bridge::{Embedder, GenerationError, OllamaClient, TextGenerator};
use grc_core::logic::escalation::{ComplianceEngine, EngineError, EvaluationCounters};
use grc_core::logic::model::ModelError;
use grc_core::logic::rag::{ingest_policy_text, PipelineError};
use grc_core::logic::report::{JsonlReportWriter, ReportError};
use grc_core::{LogEvent, ServiceConfig};

const USAGE: &str = "usage: grc-core <ingest-policy <file> | retrain <events.jsonl> [limit] | evaluate <events.jsonl> | ask <question...>>";

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Client(#[from] GenerationError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("output serialization failed: {0}")]
    Output(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Usage(msg)) => {
            eprintln!("{}\n{}", msg, USAGE);
            ExitCode::from(2)
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), CliError> {
    let (command, rest) = args
        .split_first()
        .ok_or_else(|| CliError::Usage("missing command".to_string()))?;

    let config = ServiceConfig::from_env();
    log::info!(
        "{} v{} (data dir: {})",
        constants::APP_NAME,
        constants::APP_VERSION,
        config.data_dir.display()
    );

    let client = Arc::new(OllamaClient::from_config(&config)?);
    let embedder: Arc<dyn Embedder> = client.clone();
    let generator: Arc<dyn TextGenerator> = client;

    match command.as_str() {
        "ingest-policy" => {
            let path = required_path(rest, "ingest-policy needs a policy text file")?;
            let text = read_file(&path)?;
            let engine = ComplianceEngine::from_config(config, embedder.clone(), generator, Arc::new(EvaluationCounters::new()))?;
            let added = ingest_policy_text(&text, embedder.as_ref(), engine.pipeline().store())?;
            log::info!("Ingested {} chunks from {} ({} rows total)", added, path.display(), engine.pipeline().store().len());
        }
        "retrain" => {
            let path = required_path(rest, "retrain needs an events file")?;
            let limit = match rest.get(1) {
                Some(raw) => raw
                    .parse::<usize>()
                    .map_err(|_| CliError::Usage(format!("invalid limit '{}'", raw)))?,
                None => constants::DEFAULT_RETRAIN_LIMIT,
            };
            let events = read_events(&path)?;
            let tail = &events[events.len().saturating_sub(limit)..];

            let engine = ComplianceEngine::from_config(config, embedder, generator, Arc::new(EvaluationCounters::new()))?;
            let summary = engine.retrain(tail)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        "evaluate" => {
            let path = required_path(rest, "evaluate needs an events file")?;
            let events = read_events(&path)?;

            let writer = Arc::new(JsonlReportWriter::new(config.reports_dir())?);
            let engine = ComplianceEngine::from_config(config, embedder, generator, Arc::new(EvaluationCounters::new()))?
                .with_sink(writer);

            for event in events {
                let evaluation = engine.evaluate(&event.stamped())?;
                println!("{}", serde_json::to_string(&evaluation)?);
            }
            log::info!("Evaluation finished: {:?}", engine.snapshot());
        }
        "ask" => {
            if rest.is_empty() {
                return Err(CliError::Usage("ask needs a question".to_string()));
            }
            let question = rest.join(" ");
            let engine = ComplianceEngine::from_config(config, embedder, generator, Arc::new(EvaluationCounters::new()))?;
            let top_k = engine.config().top_k;
            let report = engine.audit_report(&question, top_k)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        other => return Err(CliError::Usage(format!("unknown command '{}'", other))),
    }

    Ok(())
}

fn required_path(rest: &[String], msg: &str) -> Result<PathBuf, CliError> {
    rest.first()
        .map(PathBuf::from)
        .ok_or_else(|| CliError::Usage(msg.to_string()))
}

fn read_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// One JSON event per line; malformed lines are skipped with a warning
fn read_events(path: &Path) -> Result<Vec<LogEvent>, CliError> {
    let content = read_file(path)?;
    let mut events = Vec::new();

    for (n, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<LogEvent>(line) {
            Ok(event) => events.push(event),
            Err(e) => log::warn!("Skipping malformed event at {}:{}: {}", path.display(), n + 1, e),
        }
    }

    log::info!("Read {} events from {}", events.len(), path.display());
    Ok(events)
}

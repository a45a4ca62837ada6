//! CLI entrypoint for answer-critique
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use critique_application::{
    CritiqueAnswerUseCase, CritiqueEventLogger, FanoutCritiqueEvents, GenerationGateway,
    NoGeneration, ReviseAnswerUseCase,
};
use critique_domain::{Answer, OutputFormat, Question};
use critique_infrastructure::{
    ConfigLoader, FileConfig, FileLoggingConfig, JsonlCritiqueEventLogger, gateway_from_config,
};
use critique_presentation::{Cli, ConsoleFormatter, ProgressReporter, SimpleProgress};
use serde::Deserialize;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Input file: the answer to critique and what it was generated for.
#[derive(Debug, Deserialize)]
struct AnswerDocument {
    #[serde(default)]
    question: Option<String>,
    answer: Answer,
    #[serde(default)]
    reasoning: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    // === Configuration ===
    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };

    let _log_guard = init_logging(cli.verbose, &file_config.logging);
    info!("Starting answer-critique");

    let issues = file_config.validate();
    for issue in issues.iter().filter(|i| i.is_warning()) {
        warn!("Config: {}", issue);
    }
    let errors: Vec<String> = issues
        .iter()
        .filter(|i| !i.is_warning())
        .map(|i| i.to_string())
        .collect();
    if !errors.is_empty() {
        bail!("Invalid configuration:\n  {}", errors.join("\n  "));
    }

    if !file_config.output.color {
        colored::control::set_override(false);
    }

    // === Input ===
    let input_path = cli
        .input
        .as_deref()
        .context("An input file is required (use \"-\" for standard input)")?;
    let document = read_document(input_path).await?;
    let question = cli
        .question
        .clone()
        .or(document.question)
        .and_then(Question::try_new)
        .context("A question is required: put it in the input file or pass --question")?;

    let mut engine = file_config.to_engine_config();
    let mut policy = engine.revision().clone();
    if let Some(threshold) = cli.threshold {
        policy = policy.with_quality_threshold(threshold);
    }
    if let Some(max_attempts) = cli.max_attempts {
        policy = policy.with_max_attempts(max_attempts);
    }
    engine = engine.with_revision(policy);
    if cli.no_revise {
        engine = engine.critique_only();
    }

    // === Dependency Injection ===
    let gateway: Arc<dyn GenerationGateway> = if cli.no_revise {
        Arc::new(NoGeneration)
    } else {
        gateway_from_config(&file_config.generation)
            .context("Failed to set up the generation backend")?
    };
    info!("Generation backend: {}", gateway.name());

    let events = Arc::new(build_event_loggers(&cli, &file_config));
    let critic = Arc::new(CritiqueAnswerUseCase::new(&engine).with_event_logger(events));

    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; finishing with the best answer so far");
            signal_token.cancel();
        }
    });

    let use_case =
        ReviseAnswerUseCase::new(gateway, Arc::clone(&critic)).with_cancellation(token);
    let input = engine.to_revise_input(question.clone(), document.answer, document.reasoning);
    let outcome = use_case.execute(input).await;

    if let Ok(snapshot) = serde_json::to_string(&critic.metrics().snapshot()) {
        info!("Metrics: {}", snapshot);
    }

    // === Output ===
    let format: OutputFormat = cli
        .output
        .map(Into::into)
        .or(file_config.output.format)
        .unwrap_or_default();
    println!("{}", ConsoleFormatter::render(format, &question, &outcome));

    Ok(())
}

/// Install the stderr subscriber and, when `[logging] dir` is set, a
/// daily-rotated file layer. The guard must live until exit.
fn init_logging(verbose: u8, logging: &FileLoggingConfig) -> Option<WorkerGuard> {
    let filter = match verbose {
        0 => logging
            .filter
            .as_deref()
            .map(EnvFilter::new)
            .unwrap_or_else(|| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match &logging.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "answer-critique.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    guard
}

fn build_event_loggers(cli: &Cli, config: &FileConfig) -> FanoutCritiqueEvents {
    let mut events = FanoutCritiqueEvents::new();

    if let Some(path) = cli.events.as_ref().or(config.logging.events_file.as_ref()) {
        match JsonlCritiqueEventLogger::new(path) {
            Some(logger) => {
                info!("Critique events: {} (run {})", path.display(), logger.run_id());
                events = events.with(Arc::new(logger));
            }
            None => warn!("Cannot open event log {}; events are not recorded", path.display()),
        }
    }

    if !cli.quiet {
        let progress: Arc<dyn CritiqueEventLogger> = if std::io::stderr().is_terminal() {
            Arc::new(ProgressReporter::new())
        } else {
            Arc::new(SimpleProgress)
        };
        events = events.with(progress);
    }

    events
}

async fn read_document(path: &Path) -> Result<AnswerDocument> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("Failed to read standard input")?;
        buf
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?
    };
    parse_document(&raw)
}

fn parse_document(raw: &str) -> Result<AnswerDocument> {
    let document: AnswerDocument =
        serde_json::from_str(raw).context("Input is not a valid answer document")?;
    if document.answer.summary.trim().is_empty() {
        bail!("The answer summary is empty");
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let raw = r#"{
            "question": "Who wrote the fourth gospel?",
            "answer": {
                "summary": "Tradition names John [1].",
                "citations": [
                    { "index": 1, "osis": "John.21.24", "snippet": "This is the disciple which testifieth" }
                ]
            },
            "reasoning": "Internal evidence points to the beloved disciple."
        }"#;

        let document = parse_document(raw).unwrap();
        assert_eq!(document.question.as_deref(), Some("Who wrote the fourth gospel?"));
        assert_eq!(document.answer.citations.len(), 1);
        assert_eq!(document.answer.citations[0].osis, "John.21.24");
        assert!(document.reasoning.starts_with("Internal evidence"));
    }

    #[test]
    fn test_parse_document_optional_fields() {
        let document = parse_document(r#"{ "answer": { "summary": "No citations here." } }"#).unwrap();
        assert!(document.question.is_none());
        assert!(document.answer.citations.is_empty());
        assert!(document.reasoning.is_empty());
    }

    #[test]
    fn test_parse_document_rejects_empty_summary() {
        assert!(parse_document(r#"{ "answer": { "summary": "  " } }"#).is_err());
        assert!(parse_document("not json").is_err());
    }
}

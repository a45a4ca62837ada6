//! JSONL file writer for critique events.
//!
//! Each [`CritiqueEvent`] becomes one JSON line carrying its payload fields
//! plus `type`, `timestamp` and the `run` id of the logger that wrote it.
//! The file is opened in append mode so successive runs share one log.

use critique_application::ports::critique_events::{CritiqueEvent, CritiqueEventLogger};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSONL critique event logger.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every event and
/// on `Drop`.
pub struct JsonlCritiqueEventLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
    run_id: String,
}

impl JsonlCritiqueEventLogger {
    /// Open (or create) the log at `path`, creating parent directories.
    ///
    /// Returns `None` if the file cannot be opened; event logging is then
    /// skipped rather than failing the evaluation.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create critique event directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open critique event log {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
            run_id: chrono::Utc::now().format("%Y%m%dT%H%M%S%.3fZ").to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Identifier stamped on every event from this logger
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    fn record(&self, event: CritiqueEvent) -> Value {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let mut map = match event.payload {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        map.insert("type".to_string(), Value::String(event.event_type.to_string()));
        map.insert("timestamp".to_string(), Value::String(timestamp));
        map.insert("run".to_string(), Value::String(self.run_id.clone()));
        Value::Object(map)
    }
}

impl CritiqueEventLogger for JsonlCritiqueEventLogger {
    fn log(&self, event: CritiqueEvent) {
        let Ok(line) = serde_json::to_string(&self.record(event)) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlCritiqueEventLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use critique_application::ports::critique_events::{FALLACY_DETECTED, SCORE_COMPUTED};
    use std::fs;

    fn read_lines(path: &Path) -> Vec<Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_json_object_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let logger = JsonlCritiqueEventLogger::new(&path).unwrap();

        logger.log(CritiqueEvent::new(
            FALLACY_DETECTED,
            serde_json::json!({"fallacy_type": "ad_hominem", "occurrences": 2}),
        ));
        logger.log(CritiqueEvent::new(
            SCORE_COMPUTED,
            serde_json::json!({"quality_score": 77}),
        ));
        let run_id = logger.run_id().to_string();
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert!(line.get("timestamp").is_some());
            assert_eq!(line["run"], run_id.as_str());
        }
        assert_eq!(lines[0]["type"], "fallacy_detected");
        assert_eq!(lines[0]["occurrences"], 2);
        assert_eq!(lines[1]["type"], "score_computed");
        assert_eq!(lines[1]["quality_score"], 77);
    }

    #[test]
    fn test_non_object_payload_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let logger = JsonlCritiqueEventLogger::new(&path).unwrap();

        logger.log(CritiqueEvent::new(SCORE_COMPUTED, serde_json::json!(42)));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines[0]["type"], "score_computed");
        assert_eq!(lines[0]["data"], 42);
    }

    #[test]
    fn test_appends_across_loggers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("events.jsonl");

        for score in [10, 20] {
            let logger = JsonlCritiqueEventLogger::new(&path).unwrap();
            logger.log(CritiqueEvent::new(
                SCORE_COMPUTED,
                serde_json::json!({"quality_score": score}),
            ));
        }

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["quality_score"], 10);
        assert_eq!(lines[1]["quality_score"], 20);
    }

    #[test]
    fn test_unwritable_path_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file cannot be used as a parent directory
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        assert!(JsonlCritiqueEventLogger::new(blocker.join("events.jsonl")).is_none());
    }
}

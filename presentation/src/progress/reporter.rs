//! Progress reporting while an answer is critiqued and revised

use colored::Colorize;
use critique_application::ports::critique_events::{
    CritiqueEvent, CritiqueEventLogger, REVISION_ATTEMPT, REVISION_FINISHED, SCORE_COMPUTED,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Spinner on stderr that follows scoring and revision events
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(Self::spinner_style());
        bar.set_prefix("critique");
        bar.set_message("Evaluating answer...");
        bar.enable_steady_tick(Duration::from_millis(100));
        Self {
            bar: Mutex::new(Some(bar)),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock()
            && let Some(bar) = guard.as_ref()
        {
            f(bar);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CritiqueEventLogger for ProgressReporter {
    fn log(&self, event: CritiqueEvent) {
        match event.event_type {
            SCORE_COMPUTED => {
                let score = event.payload["quality_score"].as_u64().unwrap_or_default();
                self.with_bar(|bar| bar.set_message(format!("score {}", score)));
            }
            REVISION_ATTEMPT => {
                let attempt = event.payload["attempt"].as_u64().unwrap_or_default();
                let outcome = event.payload["outcome"].as_str().unwrap_or("unknown");
                self.with_bar(|bar| {
                    bar.println(format!("  {} attempt {}: {}", "->".cyan(), attempt, outcome));
                    bar.set_message("Evaluating revision...");
                });
            }
            REVISION_FINISHED => {
                if let Ok(mut guard) = self.bar.lock()
                    && let Some(bar) = guard.take()
                {
                    bar.finish_and_clear();
                }
            }
            _ => {}
        }
    }
}

/// Plain line-per-event progress (no spinner), for non-interactive stderr
pub struct SimpleProgress;

impl CritiqueEventLogger for SimpleProgress {
    fn log(&self, event: CritiqueEvent) {
        match event.event_type {
            SCORE_COMPUTED => {
                eprintln!(
                    "{} score {}",
                    "->".cyan(),
                    event.payload["quality_score"].as_u64().unwrap_or_default()
                );
            }
            REVISION_ATTEMPT => {
                eprintln!(
                    "  {} attempt {}: {}",
                    "->".cyan(),
                    event.payload["attempt"].as_u64().unwrap_or_default(),
                    event.payload["outcome"].as_str().unwrap_or("unknown")
                );
            }
            _ => {}
        }
    }
}

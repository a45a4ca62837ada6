//! Console output formatter for critique results

use colored::{ColoredString, Colorize};
use critique_domain::{
    AttemptOutcome, Critique, OutputFormat, Question, RevisionOutcome, RevisionState,
};

/// Formats critique and revision results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn render(format: OutputFormat, question: &Question, outcome: &RevisionOutcome) -> String {
        match format {
            OutputFormat::Full => Self::format(question, outcome),
            OutputFormat::Summary => Self::format_summary(question, outcome),
            OutputFormat::Json => Self::format_json(question, outcome),
        }
    }

    /// Format every finding and the revision trail
    pub fn format(question: &Question, outcome: &RevisionOutcome) -> String {
        let critique = &outcome.critique;
        let mut output = String::new();

        output.push_str(&Self::header("Answer Critique"));
        output.push('\n');
        output.push_str(&format!("{} {}\n", "Question:".cyan().bold(), question));
        output.push_str(&format!(
            "{} {} (initial {})\n",
            "Quality:".cyan().bold(),
            Self::score(critique.quality_score()),
            outcome.initial_score
        ));
        let b = critique.breakdown();
        output.push_str(&format!(
            "{}\n",
            format!(
                "  base {} - fallacies {} - citations {} - bias {}",
                b.base_score, b.fallacy_penalty, b.citation_penalty, b.bias_penalty
            )
            .dimmed()
        ));

        Self::push_findings(&mut output, critique);

        if !outcome.attempts.is_empty() {
            output.push_str(&Self::section_header("Revision Attempts"));
            for attempt in &outcome.attempts {
                let label = match &attempt.outcome {
                    AttemptOutcome::Improved => "improved".green(),
                    AttemptOutcome::NoImprovement => "no improvement".yellow(),
                    AttemptOutcome::GenerationFailed { error } => {
                        format!("failed: {}", error).red()
                    }
                };
                let score = attempt
                    .score()
                    .map(|s| format!(" (score {})", s))
                    .unwrap_or_default();
                output.push_str(&format!("  #{} {}{}\n", attempt.attempt_number, label, score));
            }
        }

        output.push_str(&Self::section_header("Answer"));
        output.push_str(&format!("{}\n", outcome.answer.summary));
        if !outcome.answer.citations.is_empty() {
            output.push('\n');
            for citation in &outcome.answer.citations {
                output.push_str(&format!(
                    "  [{}] {}\n",
                    citation.index,
                    citation.reference_label().dimmed()
                ));
            }
        }

        output.push_str(&format!(
            "\n{} {}\n",
            "Result:".cyan().bold(),
            Self::state(&outcome.final_state)
        ));
        output.push_str(&Self::footer());
        output
    }

    /// Format the score line, counts and the final answer
    pub fn format_summary(question: &Question, outcome: &RevisionOutcome) -> String {
        let critique = &outcome.critique;
        let mut output = String::new();

        output.push_str(&format!("{} {}\n", "Q:".bold(), question));
        let revised = if outcome.revised() {
            format!(" (revised from {})", outcome.initial_score)
        } else {
            String::new()
        };
        output.push_str(&format!(
            "{} {}{}  {}\n",
            "Score:".bold(),
            Self::score(critique.quality_score()),
            revised,
            Self::state(&outcome.final_state)
        ));
        output.push_str(&format!(
            "{}\n\n",
            format!(
                "{} fallacies, {} weak citations, {} bias warnings, {} revision attempts",
                critique.fallacies().len(),
                critique.weak_citations().len(),
                critique.bias_warnings().len(),
                outcome.attempts_made()
            )
            .dimmed()
        ));
        output.push_str(&outcome.answer.summary);
        output.push('\n');
        output
    }

    /// Format as JSON
    pub fn format_json(question: &Question, outcome: &RevisionOutcome) -> String {
        let value = serde_json::json!({
            "question": question,
            "revised": outcome.revised(),
            "outcome": outcome,
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    fn push_findings(output: &mut String, critique: &Critique) {
        if critique.is_clean() {
            output.push_str(&format!("\n{}\n", "No problems found.".green()));
        }

        if !critique.fallacies().is_empty() {
            output.push_str(&Self::section_header("Fallacies"));
            for warning in critique.fallacies() {
                let occurrences = if warning.occurrence_count > 1 {
                    format!(" x{}", warning.occurrence_count)
                } else {
                    String::new()
                };
                output.push_str(&format!(
                    "  {} {}{}\n    \"{}\"\n",
                    format!("[{}]", warning.severity).red().bold(),
                    warning.fallacy_type.display_name(),
                    occurrences,
                    warning.matched_span
                ));
            }
        }

        if !critique.weak_citations().is_empty() {
            output.push_str(&Self::section_header("Weak Citations"));
            for weak in critique.weak_citations() {
                output.push_str(&format!(
                    "  [{}] {}: {} (support {:.0}%)\n",
                    weak.index,
                    weak.reference.yellow(),
                    weak.reason.explanation(),
                    weak.support_ratio * 100.0
                ));
            }
        }

        if !critique.bias_warnings().is_empty() {
            output.push_str(&Self::section_header("Bias"));
            for warning in critique.bias_warnings() {
                let terms: Vec<&str> = warning.triggering_terms.iter().map(String::as_str).collect();
                output.push_str(&format!(
                    "  {} (strength {:.2}): {}\n",
                    warning.direction.as_str().magenta(),
                    warning.strength,
                    terms.join(", ")
                ));
            }
        }

        if !critique.degraded_detectors().is_empty() {
            let names: Vec<&str> = critique
                .degraded_detectors()
                .iter()
                .map(|d| d.as_str())
                .collect();
            output.push_str(&format!(
                "\n{} {}\n",
                "Degraded detectors:".red().bold(),
                names.join(", ")
            ));
        }
    }

    fn score(score: u8) -> ColoredString {
        let text = format!("{}/100", score);
        match score {
            80..=100 => text.green().bold(),
            50..=79 => text.yellow().bold(),
            _ => text.red().bold(),
        }
    }

    fn state(state: &RevisionState) -> ColoredString {
        match state {
            RevisionState::Accepted { .. } => state.to_string().green(),
            RevisionState::Exhausted { .. } => state.to_string().yellow(),
            _ => state.to_string().normal(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use critique_domain::{
        AcceptReason, Answer, Citation, ExhaustReason, FallacyType, FallacyWarning,
        PendingAttempt, ScoreBreakdown, Severity, WeakCitation, WeaknessReason,
    };

    fn outcome() -> RevisionOutcome {
        let answer = Answer::new(
            "Critics are simply ignorant [1].",
            vec![Citation::new(1, "In the beginning was the Word.").with_osis("John.1.1")],
        );
        let critique = Critique::new(
            80,
            vec![FallacyWarning {
                fallacy_type: FallacyType::AdHominem,
                severity: Severity::High,
                matched_span: "Critics are simply ignorant".to_string(),
                description: "Attacks people instead of arguments.".to_string(),
                occurrence_count: 2,
            }],
            vec![WeakCitation {
                index: 1,
                reference: "John.1.1".to_string(),
                reason: WeaknessReason::InsufficientSupport,
                support_ratio: 0.0,
            }],
            vec![],
            ScoreBreakdown {
                base_score: 100,
                fallacy_penalty: 15,
                citation_penalty: 5,
                bias_penalty: 0,
                total_penalty: 20,
            },
        );
        RevisionOutcome {
            attempts: vec![PendingAttempt::start(1, answer.clone()).failed("timed out")],
            answer,
            critique,
            initial_score: 80,
            final_state: RevisionState::Exhausted {
                reason: ExhaustReason::GenerationFailed,
            },
        }
    }

    #[test]
    fn test_full_lists_findings_and_attempts() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format(&Question::new("Who wrote John?"), &outcome());

        assert!(text.contains("Question: Who wrote John?"));
        assert!(text.contains("80/100"));
        assert!(text.contains("[high] ad hominem x2"));
        assert!(text.contains("[1] John.1.1"));
        assert!(text.contains("#1 failed: timed out"));
        assert!(text.contains("exhausted"));
    }

    #[test]
    fn test_summary_counts() {
        colored::control::set_override(false);
        let text =
            ConsoleFormatter::format_summary(&Question::new("Who wrote John?"), &outcome());
        assert!(text.contains("Score: 80/100"));
        assert!(text.contains("1 fallacies, 1 weak citations, 0 bias warnings, 1 revision attempts"));
        assert!(text.ends_with("Critics are simply ignorant [1].\n"));
    }

    #[test]
    fn test_json_is_parseable() {
        let mut outcome = outcome();
        outcome.final_state = RevisionState::Accepted {
            reason: AcceptReason::MetThreshold,
        };
        let text = ConsoleFormatter::render(
            OutputFormat::Json,
            &Question::new("Who wrote John?"),
            &outcome,
        );
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["question"], "Who wrote John?");
        assert_eq!(value["outcome"]["critique"]["quality_score"], 80);
        assert_eq!(value["outcome"]["final_state"]["state"], "accepted");
        assert_eq!(value["revised"], false);
    }
}

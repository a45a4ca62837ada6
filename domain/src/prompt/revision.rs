//! Revision prompt construction under a token budget.

use crate::answer::{Answer, Citation};
use crate::core::question::Question;
use crate::core::string::truncate;
use crate::critique::{BiasDirection, Critique, WeakCitation};
use std::collections::BTreeSet;

/// Rough chars-per-token ratio used for budgeting.
pub const CHARS_PER_TOKEN: usize = 4;

/// Weak-citation snippet lengths tried, longest first, when the budget is tight.
const WEAK_SNIPPET_STEPS: [usize; 4] = [600, 320, 160, 80];

/// Approximate token count of `text`.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// A rendered revision prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionPrompt {
    pub text: String,
    pub estimated_tokens: usize,
    /// Supported snippets were left out to fit the budget
    pub dropped_supported_snippets: bool,
    /// Weak snippets were cut to this many bytes
    pub weak_snippet_limit: Option<usize>,
    /// Even the most compact rendering exceeds the budget
    pub over_budget: bool,
}

impl RevisionPrompt {
    pub fn truncated(&self) -> bool {
        self.dropped_supported_snippets || self.weak_snippet_limit.is_some()
    }
}

/// Builds the prompt sent to the generation collaborator for one revision.
///
/// The question, the current answer and the index-preservation instruction
/// are always present. Citation snippets are cut to fit the budget:
/// supported snippets go first, then weak snippets get shorter.
#[derive(Debug, Clone)]
pub struct RevisionPromptBuilder {
    token_budget: usize,
}

impl RevisionPromptBuilder {
    pub fn new(token_budget: usize) -> Self {
        Self { token_budget }
    }

    pub fn token_budget(&self) -> usize {
        self.token_budget
    }

    /// System prompt for revision requests
    pub fn system() -> &'static str {
        r#"You are a careful theological writer revising an answer after review.
Keep every claim tied to the sources it cites and write in a neutral, scholarly register.
Return only the revised answer text, with no preamble or commentary."#
    }

    pub fn build(&self, question: &Question, answer: &Answer, critique: &Critique) -> RevisionPrompt {
        let citations = referenced_citations(answer);
        let weak: Vec<(&Citation, &WeakCitation)> = citations
            .iter()
            .filter_map(|c| {
                critique
                    .weak_citations()
                    .iter()
                    .find(|w| w.index == c.index)
                    .map(|w| (*c, w))
            })
            .collect();
        let supported: Vec<&Citation> = citations
            .iter()
            .copied()
            .filter(|c| !critique.is_weak(c.index))
            .collect();

        let attempt = |dropped: bool, weak_limit: Option<usize>| {
            let text = render(
                question,
                answer,
                critique,
                &weak,
                &supported,
                !dropped,
                weak_limit,
            );
            let estimated_tokens = estimate_tokens(&text);
            RevisionPrompt {
                text,
                estimated_tokens,
                dropped_supported_snippets: dropped && !supported.is_empty(),
                weak_snippet_limit: weak_limit,
                over_budget: estimated_tokens > self.token_budget,
            }
        };

        let mut prompt = attempt(false, None);
        let fallbacks = std::iter::once((true, None))
            .chain(WEAK_SNIPPET_STEPS.iter().map(|&limit| (true, Some(limit))));
        for (dropped, weak_limit) in fallbacks {
            if !prompt.over_budget {
                break;
            }
            prompt = attempt(dropped, weak_limit);
        }
        prompt
    }
}

impl Default for RevisionPromptBuilder {
    fn default() -> Self {
        Self::new(crate::revision::REVISION_TOKEN_BUDGET)
    }
}

/// Citations referenced by the answer text, first entry per index.
fn referenced_citations(answer: &Answer) -> Vec<&Citation> {
    let mut seen = BTreeSet::new();
    answer
        .referenced_citations()
        .into_iter()
        .filter(|c| c.index > 0 && seen.insert(c.index))
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn render(
    question: &Question,
    answer: &Answer,
    critique: &Critique,
    weak: &[(&Citation, &WeakCitation)],
    supported: &[&Citation],
    include_supported: bool,
    weak_limit: Option<usize>,
) -> String {
    let mut prompt = format!(
        r#"Revise the answer below so that it is better supported by its sources.

Question: {}

Current answer (quality score {}/100):
{}
"#,
        question.content(),
        critique.quality_score(),
        answer.summary.trim()
    );

    if !weak.is_empty() {
        prompt.push_str("\nWeakly supported citations (fix these first):\n");
        for (citation, warning) in weak {
            let snippet = match weak_limit {
                Some(limit) => truncate(citation.snippet.trim(), limit),
                None => citation.snippet.trim().to_string(),
            };
            let snippet = if snippet.is_empty() {
                "(empty excerpt)".to_string()
            } else {
                format!("\"{}\"", snippet)
            };
            prompt.push_str(&format!(
                "- [{}] {}: {}. Source excerpt: {}\n",
                citation.index,
                citation.reference_label(),
                warning.reason.explanation(),
                snippet
            ));
        }
    }

    if !critique.fallacies().is_empty() || !critique.bias_warnings().is_empty() {
        prompt.push_str("\nReasoning problems to address:\n");
        for fallacy in critique.fallacies() {
            prompt.push_str(&format!(
                "- {} ({} severity): {} For example: \"{}\"\n",
                fallacy.fallacy_type.display_name(),
                fallacy.severity,
                fallacy.description,
                fallacy.matched_span
            ));
        }
        for bias in critique.bias_warnings() {
            let lean = match bias.direction {
                BiasDirection::TendsApologetic => "toward apologetic advocacy",
                BiasDirection::TendsSkeptical => "toward skeptical dismissal",
            };
            let terms: Vec<&str> = bias.triggering_terms.iter().map(String::as_str).collect();
            prompt.push_str(&format!(
                "- The tone leans {} (strength {:.2}), signalled by: {}. Present the positions evenly.\n",
                lean,
                bias.strength,
                terms.join(", ")
            ));
        }
    }

    if !supported.is_empty() {
        prompt.push_str("\nWell-supported citations:\n");
        for citation in supported {
            if include_supported && !citation.snippet.trim().is_empty() {
                prompt.push_str(&format!(
                    "- [{}] {}: \"{}\"\n",
                    citation.index,
                    citation.reference_label(),
                    citation.snippet.trim()
                ));
            } else {
                prompt.push_str(&format!(
                    "- [{}] {}\n",
                    citation.index,
                    citation.reference_label()
                ));
            }
        }
    }

    prompt.push_str(
        r#"
Instructions:
1. Keep every citation marker number exactly as it is; do not renumber, add or invent citations.
2. Make each sentence that carries a marker reflect what its source excerpt actually says.
3. Remove or rephrase the reasoning problems listed above.
4. Return only the revised answer text."#,
    );

    prompt
}

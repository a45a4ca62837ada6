//! Negative-context guards for fallacy rules.
//!
//! A guard inspects the text around a raw pattern match and decides whether
//! the match should be suppressed, so that legitimate argumentation (quoting
//! an opponent, surveying parallel passages, valid modus ponens) is not
//! flagged.

use super::text::{content_tokens, contains_phrase, is_inside_quotes, sentence_bounds};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Range;

/// Phrases that mark the sentence as reporting someone else's reasoning.
const ATTRIBUTION_CUES: &[&str] = &[
    "according to",
    "argue that",
    "argued that",
    "argues that",
    "as one critic",
    "claim that",
    "claimed that",
    "claims that",
    "contend that",
    "contends that",
    "critics say",
    "insist that",
    "insists that",
    "objection",
    "objectors",
    "puts it",
    "quoted",
    "some say",
    "wrote that",
    "writes that",
];

/// Phrases that mark a citation run as a survey of parallels.
const SURVEY_CUES: &[&str] = &[
    "among others",
    "cf.",
    "compare",
    "e.g.",
    "echoed",
    "for example",
    "parallel",
    "parallels",
    "see also",
    "such as",
    "survey",
    "throughout",
];

/// Explanatory content words around a citation run at which the run is
/// treated as illustration rather than the sole premise.
const SURVEY_MIN_EXPLANATORY_TOKENS: usize = 8;

/// Share of the consequent's content words the following clause must repeat
/// to count as affirming it.
const CONSEQUENT_RESTATED_RATIO: f64 = 0.5;

const CONCLUSION_CUES: &[&str] = &["therefore", "thus", "hence", "it follows that"];

/// Negative-context predicate attached to a fallacy rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Guard {
    /// Never suppress
    None,
    /// Suppress inside quotations or after attribution language
    #[default]
    Attribution,
    /// Suppress citation runs used as a survey rather than sole premise
    CitationSurvey,
    /// Suppress if/then matches where the consequent is not restated
    ConsequentNotAffirmed,
}

impl Guard {
    /// Returns `true` when the match at `span` must be dropped.
    pub fn suppresses(&self, text: &str, span: Range<usize>) -> bool {
        match self {
            Guard::None => false,
            Guard::Attribution => is_attributed(text, span.start),
            Guard::CitationSurvey => is_attributed(text, span.start) || is_survey(text, span),
            Guard::ConsequentNotAffirmed => {
                is_attributed(text, span.start) || !affirms_consequent(&text[span])
            }
        }
    }
}

fn is_attributed(text: &str, pos: usize) -> bool {
    if is_inside_quotes(text, pos) {
        return true;
    }
    let (sentence_start, _) = sentence_bounds(text, pos);
    let prefix = text[sentence_start..pos].to_lowercase();
    ATTRIBUTION_CUES.iter().any(|cue| contains_phrase(&prefix, cue))
}

fn is_survey(text: &str, span: Range<usize>) -> bool {
    let (start, _) = sentence_bounds(text, span.start);
    let last_char = text[..span.end]
        .char_indices()
        .next_back()
        .map_or(span.start, |(i, _)| i);
    let (_, end) = sentence_bounds(text, last_char);
    let sentence = text[start..end].to_lowercase();
    if SURVEY_CUES.iter().any(|cue| contains_phrase(&sentence, cue)) {
        return true;
    }

    let outside = format!("{} {}", &text[start..span.start], &text[span.end..end]);
    content_tokens(&outside, 3).len() >= SURVEY_MIN_EXPLANATORY_TOKENS
}

/// Whether an `if A then B. ... therefore ...` passage restates `B` as a
/// premise before concluding.
fn affirms_consequent(passage: &str) -> bool {
    let lower = passage.to_lowercase();
    let Some(then_pos) = super::text::find_phrase(&lower, "then").first().copied() else {
        return false;
    };
    let after_then = &lower[then_pos + "then".len()..];
    let Some(stop) = after_then.find(['.', ';', '!', '?']) else {
        return false;
    };
    let consequent = &after_then[..stop];
    let remainder = &after_then[stop + 1..];
    let conclusion_at = CONCLUSION_CUES
        .iter()
        .filter_map(|cue| super::text::find_phrase(remainder, cue).first().copied())
        .min()
        .unwrap_or(remainder.len());
    let premise = &remainder[..conclusion_at];

    let wanted: HashSet<String> = content_tokens(consequent, 3).into_iter().collect();
    if wanted.is_empty() {
        return false;
    }
    let found: HashSet<String> = content_tokens(premise, 3).into_iter().collect();
    let restated = wanted.intersection(&found).count();
    restated as f64 / wanted.len() as f64 >= CONSEQUENT_RESTATED_RATIO
}

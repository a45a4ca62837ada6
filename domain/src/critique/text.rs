//! Text helpers shared by the detectors: word spans, content tokens,
//! sentence bounds and quotation handling.

/// English stopwords removed before comparing content tokens.
///
/// Kept sorted so lookups can binary search.
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "aren't", "as", "at", "be", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "can", "cannot", "could", "couldn't", "did", "didn't", "do", "does",
    "doesn't", "doing", "don't", "down", "during", "each", "either", "else", "even", "ever",
    "every", "few", "for", "from", "further", "had", "hadn't", "has", "hasn't", "have",
    "haven't", "having", "he", "her", "here", "hers", "herself", "him", "himself", "his", "how",
    "however", "i", "if", "in", "into", "is", "isn't", "it", "it's", "its", "itself", "just",
    "least", "less", "let", "like", "may", "me", "might", "more", "most", "much", "must", "my",
    "myself", "neither", "no", "nor", "not", "now", "of", "off", "on", "once", "one", "only",
    "or", "other", "otherwise", "ought", "our", "ours", "ourselves", "out", "over", "own",
    "per", "perhaps", "quite", "rather", "same", "shall", "she", "should", "shouldn't", "since",
    "so", "some", "such", "than", "that", "that's", "the", "thee", "their", "theirs", "them",
    "themselves", "then", "there", "therefore", "these", "they", "thine", "this", "those",
    "thou", "though", "through", "thus", "thy", "to", "too", "under", "until", "unto", "up",
    "upon", "us", "very", "via", "was", "wasn't", "we", "were", "weren't", "what", "when",
    "where", "whether", "which", "while", "who", "whom", "whose", "why", "will", "with",
    "within", "without", "would", "wouldn't", "ye", "yet", "you", "your", "yours", "yourself",
    "yourselves",
];

/// A word in the source text with its byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSpan<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.binary_search(&word).is_ok()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '\'' || c == '\u{2019}'
}

/// Split text into words (alphanumerics plus inner apostrophes).
pub fn words(text: &str) -> Vec<WordSpan<'_>> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;

    for (i, c) in text.char_indices() {
        match (is_word_char(c), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                push_word(text, s, i, &mut spans);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        push_word(text, s, text.len(), &mut spans);
    }

    spans
}

fn push_word<'a>(text: &'a str, start: usize, end: usize, spans: &mut Vec<WordSpan<'a>>) {
    let raw = &text[start..end];
    let trimmed = raw.trim_matches(|c| c == '\'' || c == '\u{2019}');
    if trimmed.is_empty() {
        return;
    }
    let offset = raw.find(trimmed).unwrap_or(0);
    spans.push(WordSpan {
        text: trimmed,
        start: start + offset,
        end: start + offset + trimmed.len(),
    });
}

/// Lowercase a word and fold possessives and simple plurals.
pub fn normalize_token(word: &str) -> String {
    let mut token = word.to_lowercase().replace('\u{2019}', "'");
    if let Some(stripped) = token.strip_suffix("'s") {
        token = stripped.to_string();
    }
    let token = token.trim_end_matches('\'').to_string();
    if token.chars().count() > 3
        && token.ends_with('s')
        && !token.ends_with("ss")
        && !token.ends_with("us")
        && !token.ends_with("is")
    {
        token[..token.len() - 1].to_string()
    } else {
        token
    }
}

/// Whether a normalized token carries content (not a stopword, long enough).
pub fn is_content_token(token: &str, min_len: usize) -> bool {
    token.chars().count() >= min_len
        && !is_stopword(token)
        && !token.chars().all(|c| c.is_ascii_digit())
}

/// Normalized content tokens of `text`, in order (duplicates kept).
pub fn content_tokens(text: &str, min_len: usize) -> Vec<String> {
    words(text)
        .into_iter()
        .filter(|w| !is_stopword(&w.text.to_lowercase()))
        .map(|w| normalize_token(w.text))
        .filter(|t| is_content_token(t, min_len))
        .collect()
}

fn is_sentence_end(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '\n')
}

/// Largest char boundary at or below `pos`.
pub fn floor_char_boundary(text: &str, pos: usize) -> usize {
    let mut pos = pos.min(text.len());
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Byte range of the sentence containing `pos`.
///
/// A sentence runs from just after the previous terminator (`.`, `!`, `?`
/// or newline) through the next one. A `pos` inside a multi-byte char
/// counts as that char.
pub fn sentence_bounds(text: &str, pos: usize) -> (usize, usize) {
    let pos = floor_char_boundary(text, pos);
    let start = text[..pos]
        .char_indices()
        .rev()
        .find(|(_, c)| is_sentence_end(*c))
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let end = text[pos..]
        .char_indices()
        .find(|(_, c)| is_sentence_end(*c))
        .map(|(i, c)| pos + i + c.len_utf8())
        .unwrap_or(text.len());
    (start, end)
}

/// Whether `pos` falls inside a double-quoted span.
pub fn is_inside_quotes(text: &str, pos: usize) -> bool {
    let before = &text[..floor_char_boundary(text, pos)];
    let straight = before.matches('"').count();
    let open = before.matches('\u{201C}').count();
    let close = before.matches('\u{201D}').count();
    straight % 2 == 1 || open > close
}

/// Remove quoted material: double-quoted spans and `>` block-quote lines.
///
/// Removed spans are replaced by a single space so surrounding words do not
/// fuse together.
pub fn strip_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for line in text.split_inclusive('\n') {
        if line.trim_start().starts_with('>') {
            out.push('\n');
            continue;
        }
        let mut depth_straight = false;
        let mut depth_curly = 0usize;
        for c in line.chars() {
            match c {
                '"' => {
                    depth_straight = !depth_straight;
                    out.push(' ');
                }
                '\u{201C}' => {
                    depth_curly += 1;
                    out.push(' ');
                }
                '\u{201D}' => {
                    depth_curly = depth_curly.saturating_sub(1);
                    out.push(' ');
                }
                _ if depth_straight || depth_curly > 0 => {}
                _ => out.push(c),
            }
        }
    }

    out
}

/// Byte offsets where `phrase` occurs in `haystack` on word boundaries.
///
/// Both arguments are expected lowercase already. Phrases ending in
/// punctuation (`cf.`) only need a boundary at the start.
pub fn find_phrase(haystack: &str, phrase: &str) -> Vec<usize> {
    let mut hits = Vec::new();
    if phrase.is_empty() {
        return hits;
    }
    let ends_in_word = phrase.chars().last().is_some_and(is_word_char);

    for (pos, _) in haystack.match_indices(phrase) {
        let before_ok = haystack[..pos]
            .chars()
            .next_back()
            .is_none_or(|c| !is_word_char(c));
        let after_ok = !ends_in_word
            || haystack[pos + phrase.len()..]
                .chars()
                .next()
                .is_none_or(|c| !is_word_char(c));
        if before_ok && after_ok {
            hits.push(pos);
        }
    }

    hits
}

/// Whether `phrase` occurs anywhere in `haystack` on word boundaries.
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    !find_phrase(haystack, phrase).is_empty()
}

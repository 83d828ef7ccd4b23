//! Local extractive summarizer used when the provider call fails.
//!
//! Everything here is pure and deterministic: no I/O, no clock, no
//! randomness. Output for identical inputs is byte-identical.

use std::collections::HashMap;

/// Sentences at or below this many characters (after trimming) are dropped.
const MIN_SENTENCE_CHARS: usize = 10;

/// Tokens at or below this many characters are never key phrases.
const MIN_PHRASE_CHARS: usize = 3;

const MAX_KEY_PHRASES: usize = 10;
const MAX_BULLETS: usize = 5;
const MAX_ACTION_ITEMS: usize = 5;
const NARRATIVE_SENTENCES: usize = 3;

const BULLET: &str = "• ";

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will", "would",
    "could", "should",
];

const ACTION_MARKERS: &[&str] = &["will", "should", "must", "need to"];

/// Shape of the fallback body, picked from the user's instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryMode {
    /// Top key phrases as a bullet list
    Bulleted,
    /// Sentences that read like commitments, under an "Action Items:" heading
    ActionItems,
    /// First few sentences as a paragraph
    Narrative,
}

/// A normalized token and how often it appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPhrase {
    pub text: String,
    pub count: usize,
}

/// Pick a rendering mode by keyword search on the instruction.
///
/// "bullet"/"points" wins over "action"; anything else is narrative.
pub fn classify_instruction(instruction: &str) -> SummaryMode {
    let lower = instruction.to_lowercase();

    if lower.contains("bullet") || lower.contains("points") {
        SummaryMode::Bulleted
    } else if lower.contains("action") {
        SummaryMode::ActionItems
    } else {
        SummaryMode::Narrative
    }
}

/// Split text on runs of `.`, `!` and `?`, keeping fragments longer than
/// ten characters once trimmed.
///
/// Fragments are returned untrimmed and in original order, so the
/// whitespace after each terminator carries into the rendered body.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .filter(|s| s.trim().chars().count() > MIN_SENTENCE_CHARS)
        .collect()
}

/// Most frequent non-trivial words, highest count first.
///
/// Ties keep first-occurrence order: tokens are recorded in the order they
/// are first seen and the sort is stable.
pub fn extract_key_phrases(text: &str) -> Vec<KeyPhrase> {
    let lower = text.to_lowercase();

    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for token in lower.split(|c: char| !is_word_char(c)) {
        if token.chars().count() <= MIN_PHRASE_CHARS || STOP_WORDS.contains(&token) {
            continue;
        }

        let count = counts.entry(token).or_insert(0);
        if *count == 0 {
            order.push(token);
        }
        *count += 1;
    }

    let mut phrases: Vec<KeyPhrase> = order
        .into_iter()
        .map(|token| KeyPhrase {
            text: token.to_string(),
            count: counts[token],
        })
        .collect();

    phrases.sort_by(|a, b| b.count.cmp(&a.count));
    phrases.truncate(MAX_KEY_PHRASES);
    phrases
}

/// Build a summary without calling any model.
///
/// Never fails. Empty inputs keep the heading structure without inventing
/// content: no key phrases gives an empty bulleted body, no commitments
/// gives a bare `Action Items:` line, and no qualifying sentences leaves
/// the narrative body as a lone `.`.
pub fn summarize_fallback(transcript: &str, instruction: &str) -> String {
    let mut summary = format!("Summary based on: \"{}\"\n\n", instruction);

    match classify_instruction(instruction) {
        SummaryMode::Bulleted => {
            let phrases = extract_key_phrases(transcript);
            let bullets: Vec<String> = phrases
                .iter()
                .take(MAX_BULLETS)
                .map(|p| format!("{BULLET}{}", p.text))
                .collect();
            summary.push_str(&bullets.join("\n"));
        }
        SummaryMode::ActionItems => {
            summary.push_str("Action Items:");
            for item in split_sentences(transcript)
                .into_iter()
                .filter(|s| is_action_item(s))
                .take(MAX_ACTION_ITEMS)
            {
                summary.push('\n');
                summary.push_str(BULLET);
                summary.push_str(item);
            }
        }
        SummaryMode::Narrative => {
            let sentences = split_sentences(transcript);
            let lead: Vec<&str> = sentences.into_iter().take(NARRATIVE_SENTENCES).collect();
            summary.push_str(&lead.join(". "));
            summary.push('.');
        }
    }

    summary
}

/// ASCII letters, digits and `_`; everything else separates tokens.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_action_item(sentence: &str) -> bool {
    let lower = sentence.to_lowercase();
    ACTION_MARKERS.iter().any(|marker| lower.contains(marker))
}

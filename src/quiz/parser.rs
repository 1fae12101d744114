// src/quiz/parser.rs

use std::sync::LazyLock;

use regex::Regex;

use crate::{models::question::Question, utils::normalize::normalize};

/// A line such as `"3. What does ..."`; blocks are split right before it.
static QUESTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\.\s*").expect("question regex is valid"));

static BLOCK_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\d+\.\s").expect("block regex is valid"));

const OPTION_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Converts loosely structured generated text into questions.
///
/// Never fails and never drops a block: missing parts degrade to empty
/// strings so the positional layout of options is preserved.
pub fn parse_quiz_text(raw: &str) -> Vec<Question> {
    split_blocks(raw.trim())
        .into_iter()
        .map(parse_block)
        .collect()
}

fn split_blocks(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut starts: Vec<usize> = BLOCK_START
        .find_iter(text)
        .map(|m| m.start())
        .filter(|&start| start > 0)
        .collect();
    starts.insert(0, 0);

    let mut blocks = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        blocks.push(&text[start..end]);
    }
    blocks
}

fn parse_block(block: &str) -> Question {
    let lines: Vec<&str> = block.trim().lines().map(str::trim).collect();

    let question = lines
        .iter()
        .find(|line| QUESTION_LINE.is_match(line))
        .map(|line| QUESTION_LINE.replace(line, "").trim().to_string())
        .unwrap_or_default();

    let options: Vec<String> = OPTION_LETTERS
        .iter()
        .map(|&letter| {
            lines
                .iter()
                .find_map(|line| option_text(line, letter))
                .unwrap_or_default()
        })
        .collect();

    let answer = lines
        .iter()
        .find_map(|line| prefixed_value(line, "answer"))
        .map(|raw| resolve_answer(&raw, &options))
        .unwrap_or_default();

    let explanation = lines
        .iter()
        .find_map(|line| prefixed_value(line, "explanation"));

    let topic = lines
        .iter()
        .find_map(|line| prefixed_value(line, "topic"))
        .filter(|topic| !topic.is_empty());

    Question {
        question,
        options,
        answer,
        explanation,
        topic,
    }
}

/// Text after `"B."` on a line starting with that option letter.
fn option_text(line: &str, letter: char) -> Option<String> {
    let rest = line.strip_prefix(letter)?.strip_prefix('.')?;
    Some(rest.trim().to_string())
}

/// Text after `"<Label>:"` (label matched case-insensitively).
fn prefixed_value(line: &str, label: &str) -> Option<String> {
    let head = line.get(..label.len())?;
    if !head.eq_ignore_ascii_case(label) {
        return None;
    }
    let rest = line[label.len()..].trim_start().strip_prefix(':')?;
    Some(rest.trim().to_string())
}

/// Resolves an `Answer:` value against the extracted options.
///
/// Order: option text match, then a bare letter A-D, then the raw text.
/// The raw fallback may match no option at all; such a question cannot be
/// answered correctly and is passed through as generated.
fn resolve_answer(raw: &str, options: &[String]) -> String {
    let wanted = normalize(raw);
    if let Some(option) = options
        .iter()
        .find(|opt| !opt.is_empty() && normalize(opt) == wanted)
    {
        return option.clone();
    }

    let letter = raw.trim().trim_end_matches(['.', ')']);
    if letter.len() == 1 {
        if let Some(pos) = OPTION_LETTERS
            .iter()
            .position(|l| letter.eq_ignore_ascii_case(&l.to_string()))
        {
            if let Some(option) = options.get(pos) {
                return option.clone();
            }
        }
    }

    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_block_with_letter_answer() {
        let raw = "1. What is 2+2?\nA. 3\nB. 4\nC. 5\nD. 6\nAnswer: B\nExplanation: Basic addition";
        let parsed = parse_quiz_text(raw);

        assert_eq!(parsed.len(), 1);
        let q = &parsed[0];
        assert_eq!(q.question, "What is 2+2?");
        assert_eq!(q.options, vec!["3", "4", "5", "6"]);
        assert_eq!(q.answer, "4");
        assert_eq!(q.explanation.as_deref(), Some("Basic addition"));
        assert_eq!(q.topic, None);
    }

    #[test]
    fn test_answer_text_resolves_to_exact_option() {
        let raw = "1. Which type holds true/false?\nA. String\nB. Boolean\nC. Integer\nD. Float\nAnswer:   boolean";
        let parsed = parse_quiz_text(raw);
        assert_eq!(parsed[0].answer, "Boolean");
    }

    #[test]
    fn test_unmatched_answer_falls_back_to_raw_text() {
        let raw = "1. Pick one\nA. x\nB. y\nC. z\nD. w\nAnswer: none of these";
        let parsed = parse_quiz_text(raw);
        assert_eq!(parsed[0].answer, "none of these");
    }

    #[test]
    fn test_missing_options_keep_positions() {
        let raw = "1. Partial\nA. first\nC. third\nAnswer: C";
        let parsed = parse_quiz_text(raw);
        assert_eq!(parsed[0].options, vec!["first", "", "third", ""]);
        assert_eq!(parsed[0].answer, "third");
        assert_eq!(parsed[0].explanation, None);
    }

    #[test]
    fn test_multiple_blocks_and_topics() {
        let raw = "Here is your quiz:\n\n\
                   1. Q one?\nTopic: Loops\nA. a\nB. b\nC. c\nD. d\nAnswer: a\n\n\
                   2. Q two?\nTopic: Data Types\nA. e\nB. f\nC. g\nD. h\nAnswer: D\nExplanation: because";
        let parsed = parse_quiz_text(raw);

        // The leading prose forms its own degraded block.
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].question, "");
        assert_eq!(parsed[0].options, vec!["", "", "", ""]);
        assert_eq!(parsed[1].question, "Q one?");
        assert_eq!(parsed[1].topic.as_deref(), Some("Loops"));
        assert_eq!(parsed[2].answer, "h");
        assert_eq!(parsed[2].topic.as_deref(), Some("Data Types"));
    }

    #[test]
    fn test_answer_keeps_text_after_first_colon() {
        let raw = "1. Ratio?\nA. 1:2\nB. 2:1\nAnswer: 2:1";
        let parsed = parse_quiz_text(raw);
        assert_eq!(parsed[0].answer, "2:1");
    }

    #[test]
    fn test_empty_input_yields_no_questions() {
        assert!(parse_quiz_text("   \n ").is_empty());
    }

    #[test]
    fn test_garbage_degrades_instead_of_failing() {
        let parsed = parse_quiz_text("the provider said something unexpected");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].question, "");
        assert_eq!(parsed[0].answer, "");
    }
}

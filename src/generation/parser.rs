// src/generation/parser.rs
//
// Turns the text-generation service's loosely structured reply into
// question records. The reply is expected to be blank-line separated
// blocks, each holding one question, four choice lines and one
// "Correct Answer:" line, but real replies drift from that shape, so
// classification runs through an ordered rule table and degrades to
// partial records instead of failing.

use regex::Regex;
use std::sync::OnceLock;

/// One multiple-choice item recovered from the raw reply.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedQuestion {
    pub question: String,
    pub choice_a: String,
    pub choice_b: String,
    pub choice_c: String,
    pub choice_d: String,
    pub subject: String,
    pub correct_answer: String,
}

impl ParsedQuestion {
    fn choice_slot(&mut self, letter: char) -> &mut String {
        match letter {
            'A' => &mut self.choice_a,
            'B' => &mut self.choice_b,
            'C' => &mut self.choice_c,
            _ => &mut self.choice_d,
        }
    }

    fn is_complete(&self) -> bool {
        !self.question.is_empty()
            && !self.choice_a.is_empty()
            && !self.choice_b.is_empty()
            && !self.choice_c.is_empty()
            && !self.choice_d.is_empty()
            && !self.correct_answer.is_empty()
    }

    fn is_empty(&self) -> bool {
        self.question.is_empty()
            && self.choice_a.is_empty()
            && self.choice_b.is_empty()
            && self.choice_c.is_empty()
            && self.choice_d.is_empty()
            && self.correct_answer.is_empty()
    }
}

/// What to do with blocks that did not yield a full record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserPolicy {
    /// Keep best-effort records with empty fields (matches the behavior the
    /// scoring path was built around).
    #[default]
    Lenient,
    /// Drop any block missing the question, a choice, or the correct answer.
    Strict,
}

fn block_split_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").unwrap())
}

fn correct_answer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)correct\s+answer\s*:\s*(.*)").unwrap())
}

/// Strips a restated choice label from a correct-answer value
/// ("B. 2x" / "B) 2x" / "B 2x" -> "2x").
fn answer_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Da-d](?:[.):]\s*|\s+)").unwrap())
}

/// Choice-line patterns in priority order. Emphasis markers are stripped
/// before splitting, so "**ChoiceA:** text" is matched by the first rule.
fn choice_rules() -> &'static [Regex] {
    static RULES: OnceLock<Vec<Regex>> = OnceLock::new();
    RULES.get_or_init(|| {
        vec![
            // choiceA: / ChoiceA. / choice A:
            Regex::new(r"(?i)^choice\s*([A-D])\s*[:.]\s*(.*)").unwrap(),
            // A. text / A) text / A: text
            Regex::new(r"^([A-Da-d])[.):]\s*(.*)").unwrap(),
            // bare "A text"
            Regex::new(r"^([A-Da-d])\s+(\S.*)").unwrap(),
        ]
    })
}

fn question_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(?:question\s*\d*\s*[:.]\s*|\d+\s*[.)]\s*)").unwrap())
}

/// Parses the raw reply into question records, tagging each with `subject`.
///
/// Blocks are separated by blank lines and classified line by line:
/// correct-answer rule first, then the choice rules, then the question rule.
/// Output order follows block order. Never fails; under the lenient policy
/// incomplete blocks come back with empty fields, which callers must treat
/// as a data-quality signal rather than an error.
pub fn parse_questions(raw: &str, subject: &str, policy: ParserPolicy) -> Vec<ParsedQuestion> {
    // Decorative emphasis and literal escape sequences confuse the
    // prefix rules, so they go first.
    let cleaned = raw
        .replace("\r\n", "\n")
        .replace("**", "")
        .replace("\\(", "")
        .replace("\\)", "");

    let mut records = Vec::new();

    for block in block_split_re().split(cleaned.trim()) {
        if block.trim().is_empty() {
            continue;
        }

        let record = parse_block(block, subject);

        let keep = match policy {
            ParserPolicy::Lenient => !record.is_empty(),
            ParserPolicy::Strict => record.is_complete(),
        };
        if keep {
            records.push(record);
        }
    }

    records
}

fn parse_block(block: &str, subject: &str) -> ParsedQuestion {
    let mut record = ParsedQuestion {
        subject: subject.to_string(),
        ..Default::default()
    };

    for line in block.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = correct_answer_re().captures(line) {
            let value = caps.get(1).map_or("", |m| m.as_str()).trim();
            record.correct_answer = answer_label_re().replace(value, "").trim().to_string();
            continue;
        }

        if let Some((letter, text)) = match_choice(line) {
            let slot = record.choice_slot(letter);
            if slot.is_empty() {
                *slot = text;
            }
            continue;
        }

        if record.question.is_empty() && (line.contains('?') || question_label_re().is_match(line))
        {
            record.question = question_label_re().replace(line, "").trim().to_string();
        }
    }

    record
}

fn match_choice(line: &str) -> Option<(char, String)> {
    for rule in choice_rules() {
        if let Some(caps) = rule.captures(line) {
            let letter = caps
                .get(1)?
                .as_str()
                .chars()
                .next()?
                .to_ascii_uppercase();
            let text = caps
                .get(2)
                .map_or("", |m| m.as_str())
                .trim()
                .trim_end_matches('.')
                .trim()
                .to_string();
            return Some((letter, text));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "What is the derivative of x^2?\nA. x\nB. 2x\nC. x^2\nD. 2\nCorrect Answer: 2x";

    #[test]
    fn parses_single_well_formed_block() {
        let records = parse_questions(WELL_FORMED, "Integral Calculus", ParserPolicy::Lenient);

        assert_eq!(records.len(), 1);
        let q = &records[0];
        assert_eq!(q.question, "What is the derivative of x^2?");
        assert_eq!(q.choice_a, "x");
        assert_eq!(q.choice_b, "2x");
        assert_eq!(q.choice_c, "x^2");
        assert_eq!(q.choice_d, "2");
        assert_eq!(q.correct_answer, "2x");
        assert_eq!(q.subject, "Integral Calculus");
    }

    #[test]
    fn parses_k_blocks_in_order() {
        let raw = "\
What is 1 + 1?\nA. 1\nB. 2\nC. 3\nD. 4\nCorrect Answer: 2\n\
\n\
What is 2 + 2?\nA. 2\nB. 3\nC. 4\nD. 5\nCorrect Answer: 4\n\
\n\
What is 3 + 3?\nA. 6\nB. 7\nC. 8\nD. 9\nCorrect Answer: 6";

        let records = parse_questions(raw, "Math", ParserPolicy::Lenient);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].question, "What is 1 + 1?");
        assert_eq!(records[2].correct_answer, "6");
        for q in &records {
            let choices = [&q.choice_a, &q.choice_b, &q.choice_c, &q.choice_d];
            assert!(choices.iter().all(|c| !c.is_empty()));
            assert!(choices.contains(&&q.correct_answer));
        }
    }

    #[test]
    fn strips_emphasis_and_escape_noise() {
        let raw = "**What is \\(the integral of 1 dx\\)?**\n**ChoiceA:** x\n**ChoiceB:** 1\n**ChoiceC:** 0\n**ChoiceD:** x^2\n**Correct Answer:** x";
        let records = parse_questions(raw, "Calculus", ParserPolicy::Lenient);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].question, "What is the integral of 1 dx?");
        assert_eq!(records[0].choice_a, "x");
        assert_eq!(records[0].correct_answer, "x");
    }

    #[test]
    fn handles_choice_label_variants() {
        let raw = "Which planet is red?\nchoiceA: Mars\nB) Venus\nC: Earth\nD Jupiter\nCorrect Answer: Mars";
        let records = parse_questions(raw, "Science", ParserPolicy::Lenient);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].choice_a, "Mars");
        assert_eq!(records[0].choice_b, "Venus");
        assert_eq!(records[0].choice_c, "Earth");
        assert_eq!(records[0].choice_d, "Jupiter");
    }

    #[test]
    fn strips_restated_label_from_correct_answer() {
        let raw = "What is 2 x 3?\nA. 5\nB. 6\nC. 7\nD. 8\nCorrect Answer: B. 6";
        let records = parse_questions(raw, "Math", ParserPolicy::Lenient);
        assert_eq!(records[0].correct_answer, "6");

        let raw = "What is 2 x 3?\nA. 5\nB. 6\nC. 7\nD. 8\nCorrect Answer: B 6";
        let records = parse_questions(raw, "Math", ParserPolicy::Lenient);
        assert_eq!(records[0].correct_answer, "6");
    }

    #[test]
    fn strips_question_numbering_and_labels() {
        let raw = "1. What is water made of?\nA. H2O\nB. CO2\nC. O2\nD. N2\nCorrect Answer: H2O";
        let records = parse_questions(raw, "Chemistry", ParserPolicy::Lenient);
        assert_eq!(records[0].question, "What is water made of?");

        let raw = "Question 4: Name the powerhouse of the cell?\nA. Ribosome\nB. Mitochondria\nC. Nucleus\nD. Golgi\nCorrect Answer: Mitochondria";
        let records = parse_questions(raw, "Biology", ParserPolicy::Lenient);
        assert_eq!(records[0].question, "Name the powerhouse of the cell?");
    }

    #[test]
    fn lenient_keeps_incomplete_block_with_empty_fields() {
        let raw = "What is entropy?\nA. Disorder\nB. Order\nCorrect Answer: Disorder";
        let records = parse_questions(raw, "Physics", ParserPolicy::Lenient);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].choice_a, "Disorder");
        assert_eq!(records[0].choice_c, "");
        assert_eq!(records[0].choice_d, "");
    }

    #[test]
    fn strict_drops_incomplete_blocks() {
        let raw = format!(
            "{}\n\nWhat is entropy?\nA. Disorder\nB. Order\nCorrect Answer: Disorder",
            WELL_FORMED
        );
        let records = parse_questions(&raw, "Mixed", ParserPolicy::Strict);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].question, "What is the derivative of x^2?");
    }

    #[test]
    fn ignores_preamble_blocks_without_question_content() {
        let raw = format!(
            "Here are your questions:\n\n{}",
            WELL_FORMED
        );
        let records = parse_questions(&raw, "Math", ParserPolicy::Strict);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn empty_input_yields_no_records() {
        assert!(parse_questions("", "Math", ParserPolicy::Lenient).is_empty());
        assert!(parse_questions("\n\n\n", "Math", ParserPolicy::Lenient).is_empty());
    }

    #[test]
    fn choice_line_with_question_mark_stays_a_choice() {
        let raw = "Which of these is a question word?\nA. Why?\nB. Table\nC. Run\nD. Blue\nCorrect Answer: Why?";
        let records = parse_questions(raw, "English", ParserPolicy::Lenient);

        assert_eq!(records[0].question, "Which of these is a question word?");
        assert_eq!(records[0].choice_a, "Why?");
    }
}

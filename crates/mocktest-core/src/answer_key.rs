//! Answer-key parsing.
//!
//! An answer key maps question numbers to raw tokens: a single option letter,
//! a comma-separated list of letters, or a numeric literal. Bad rows are
//! skipped with a diagnostic; they never fail the whole key.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;

use crate::model::CorrectAnswer;

/// Question number to keyed answer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerKey {
    entries: BTreeMap<u32, CorrectAnswer>,
}

/// A row that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line (or row) number in the source.
    pub line: usize,
    pub reason: String,
}

/// Outcome of parsing an answer-key source.
#[derive(Debug, Clone, Default)]
pub struct ParsedAnswerKey {
    pub key: AnswerKey,
    pub skipped: Vec<SkippedRow>,
}

impl AnswerKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `number`.
    pub fn insert(&mut self, number: u32, answer: CorrectAnswer) {
        self.entries.insert(number, answer);
    }

    pub fn get(&self, number: u32) -> Option<&CorrectAnswer> {
        self.entries.get(&number)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &CorrectAnswer)> {
        self.entries.iter().map(|(n, a)| (*n, a))
    }

    /// Interpret `(question number, answer)` pairs. Row numbers in
    /// diagnostics are 1-based positions in `rows`.
    pub fn from_rows<I, N, A>(rows: I) -> ParsedAnswerKey
    where
        I: IntoIterator<Item = (N, A)>,
        N: AsRef<str>,
        A: AsRef<str>,
    {
        let mut parsed = ParsedAnswerKey::default();
        for (idx, (number, answer)) in rows.into_iter().enumerate() {
            parsed.push_row(idx + 1, number.as_ref(), answer.as_ref());
        }
        parsed
    }

    /// Parse a question-number/answer table.
    ///
    /// Tab-delimited when the first non-blank line has a tab, comma-delimited
    /// otherwise. Only the first two columns are read. A leading header line
    /// is recognised by a non-numeric first column.
    pub fn parse_csv(text: &str) -> ParsedAnswerKey {
        let delimiter = match text.lines().find(|l| !l.trim().is_empty()) {
            Some(line) if line.contains('\t') => b'\t',
            _ => b',',
        };
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let mut parsed = ParsedAnswerKey::default();
        let mut seen_data = false;

        for (idx, result) in reader.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    let line = e
                        .position()
                        .map(|p| p.line() as usize)
                        .unwrap_or(idx + 1);
                    let reason = format!("unreadable row: {e}");
                    tracing::warn!("answer key row {line}: {reason}");
                    parsed.skipped.push(SkippedRow { line, reason });
                    continue;
                }
            };
            if record.iter().all(str::is_empty) {
                continue;
            }

            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 1);
            let number = record.get(0).unwrap_or_default();
            let answer = record.get(1).unwrap_or_default();

            if !seen_data && parse_question_number(number).is_err() {
                // Header row.
                seen_data = true;
                continue;
            }
            seen_data = true;
            parsed.push_row(line, number, answer);
        }

        parsed
    }

    /// Read and parse an answer-key file.
    pub fn load_csv(path: &Path) -> anyhow::Result<ParsedAnswerKey> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read answer key: {}", path.display()))?;
        Ok(Self::parse_csv(&content))
    }
}

impl ParsedAnswerKey {
    fn push_row(&mut self, line: usize, number: &str, answer: &str) {
        let number = match parse_question_number(number) {
            Ok(n) => n,
            Err(reason) => {
                tracing::warn!("answer key row {line}: {reason}");
                self.skipped.push(SkippedRow { line, reason });
                return;
            }
        };

        match interpret_answer(answer) {
            Some(parsed) => {
                tracing::debug!("answer key Q{number}: {parsed}");
                self.key.insert(number, parsed);
            }
            None => {
                let reason = format!("empty answer for question {number}");
                tracing::warn!("answer key row {line}: {reason}");
                self.skipped.push(SkippedRow { line, reason });
            }
        }
    }
}

/// Interpret a raw answer token.
///
/// A comma makes it a multi-correct set (trimmed, upper-cased, empty tokens
/// dropped); otherwise a finite number is numerical; otherwise the trimmed,
/// upper-cased token is a single option key. Blank input yields `None`.
pub fn interpret_answer(raw: &str) -> Option<CorrectAnswer> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.contains(',') {
        let keys: std::collections::BTreeSet<String> = raw
            .split(',')
            .map(|k| k.trim().to_uppercase())
            .filter(|k| !k.is_empty())
            .collect();
        return if keys.is_empty() {
            None
        } else {
            Some(CorrectAnswer::Multi(keys))
        };
    }

    if let Ok(value) = raw.parse::<f64>() {
        if value.is_finite() {
            return Some(CorrectAnswer::Numerical(value));
        }
    }

    Some(CorrectAnswer::Single(raw.to_uppercase()))
}

/// Spreadsheets often export integers as `12.0`; accept that, reject the rest.
fn parse_question_number(raw: &str) -> Result<u32, String> {
    let raw = raw.trim();
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("invalid question number '{raw}'"))?;
    if !value.is_finite() || value.fract() != 0.0 || value < 1.0 || value > u32::MAX as f64 {
        return Err(format!("invalid question number '{raw}'"));
    }
    Ok(value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interprets_each_answer_form() {
        assert_eq!(interpret_answer("b"), Some(CorrectAnswer::Single("B".into())));
        assert_eq!(
            interpret_answer(" a , c "),
            Some(CorrectAnswer::Multi(
                ["A", "C"].iter().map(|s| s.to_string()).collect()
            ))
        );
        assert_eq!(interpret_answer("25.50"), Some(CorrectAnswer::Numerical(25.5)));
        assert_eq!(interpret_answer("-3"), Some(CorrectAnswer::Numerical(-3.0)));
        assert_eq!(interpret_answer("   "), None);
        assert_eq!(interpret_answer(",,"), None);
    }

    #[test]
    fn non_finite_literals_are_option_keys() {
        assert_eq!(interpret_answer("nan"), Some(CorrectAnswer::Single("NAN".into())));
        assert_eq!(interpret_answer("inf"), Some(CorrectAnswer::Single("INF".into())));
    }

    #[test]
    fn parse_csv_skips_header_and_bad_rows() {
        let text = "Question,Answer\n1,B\n2,\"A,C\"\nx,D\n0,A\n3,12.5\n4,\n";
        let parsed = AnswerKey::parse_csv(text);

        assert_eq!(parsed.key.len(), 3);
        assert_eq!(parsed.key.get(1), Some(&CorrectAnswer::Single("B".into())));
        assert_eq!(parsed.key.get(2).map(|a| a.to_string()), Some("A,C".into()));
        assert_eq!(parsed.key.get(3), Some(&CorrectAnswer::Numerical(12.5)));

        let lines: Vec<usize> = parsed.skipped.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![4, 5, 7]);
        assert!(parsed.skipped[0].reason.contains("invalid question number"));
        assert!(parsed.skipped[2].reason.contains("empty answer"));
    }

    #[test]
    fn parse_csv_without_header_keeps_first_row() {
        let parsed = AnswerKey::parse_csv("1,A\n2,B\n");
        assert_eq!(parsed.key.len(), 2);
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn parse_tab_separated_with_unquoted_multi() {
        let parsed = AnswerKey::parse_csv("No\tAns\n21\tA,B,D\n22.0\tc\n");
        assert_eq!(parsed.key.get(21).map(|a| a.to_string()), Some("A,B,D".into()));
        assert_eq!(parsed.key.get(22), Some(&CorrectAnswer::Single("C".into())));
    }

    #[test]
    fn extra_columns_are_ignored() {
        let parsed = AnswerKey::parse_csv(
            "Question,Answer,Notes\n1,B,easy\n21,\"A,C\",tricky\n22,7.5,\"from, the key\"\n",
        );
        assert_eq!(parsed.key.len(), 3);
        assert!(parsed.skipped.is_empty());
        assert_eq!(parsed.key.get(1), Some(&CorrectAnswer::Single("B".into())));
        assert_eq!(parsed.key.get(21).map(|a| a.to_string()), Some("A,C".into()));
        assert_eq!(parsed.key.get(22), Some(&CorrectAnswer::Numerical(7.5)));
    }

    #[test]
    fn unquoted_extra_comma_starts_a_new_column() {
        let parsed = AnswerKey::parse_csv("5,A,B\n");
        assert_eq!(parsed.key.get(5), Some(&CorrectAnswer::Single("A".into())));
    }

    #[test]
    fn blank_lines_do_not_shift_line_numbers() {
        let parsed = AnswerKey::parse_csv("Q,A\n\n1,B\nbad,C\n");
        assert_eq!(parsed.key.len(), 1);
        assert_eq!(parsed.skipped.len(), 1);
        assert_eq!(parsed.skipped[0].line, 4);
    }

    #[test]
    fn later_rows_win() {
        let parsed = AnswerKey::from_rows(vec![("7", "A"), ("7", "D")]);
        assert_eq!(parsed.key.get(7), Some(&CorrectAnswer::Single("D".into())));
    }

    #[test]
    fn from_rows_reports_row_positions() {
        let parsed = AnswerKey::from_rows(vec![("1", "A"), ("-2", "B"), ("3.5", "C")]);
        assert_eq!(parsed.key.len(), 1);
        assert_eq!(
            parsed.skipped.iter().map(|s| s.line).collect::<Vec<_>>(),
            vec![2, 3]
        );
    }

    #[test]
    fn load_csv_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.csv");
        std::fs::write(&path, "Q,A\n1,A\n").unwrap();
        let parsed = AnswerKey::load_csv(&path).unwrap();
        assert_eq!(parsed.key.len(), 1);
        assert!(AnswerKey::load_csv(&dir.path().join("missing.csv")).is_err());
    }
}

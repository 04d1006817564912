//! Parser for the analyzer's machine output format.
//!
//! Each diagnostic is one line of eight pipe-separated fields:
//!
//! ```text
//! SEVERITY|TYPE|CODE|FILE|LINE|COLUMN|LENGTH|MESSAGE
//! ```
//!
//! A literal `|` inside a field is written as `\|` and a backslash as `\\`.

use super::docs::DocsResolver;
use super::types::{Finding, ParseError, Severity};

const SEVERITY: usize = 0;
const KIND: usize = 1;
const CODE: usize = 2;
const FILE: usize = 3;
const LINE: usize = 4;
const COLUMN: usize = 5;
const LENGTH: usize = 6;
const MESSAGE: usize = 7;

/// Parses analyzer output into findings.
pub struct AnalyzerParser<'a> {
    working_dir: &'a str,
    docs: &'a DocsResolver,
}

impl<'a> AnalyzerParser<'a> {
    pub fn new(working_dir: &'a str, docs: &'a DocsResolver) -> Self {
        Self { working_dir, docs }
    }

    /// Parse a single output line. `number` is 1-based and only used in errors.
    pub fn parse_line(&self, number: usize, line: &str) -> Result<Finding, ParseError> {
        let fields = split_fields(line);
        let field = |index: usize, name: &'static str| {
            fields
                .get(index)
                .map(String::as_str)
                .ok_or(ParseError::MissingField {
                    line: number,
                    field: name,
                    index,
                })
        };
        let number_field = |index: usize, name: &'static str| -> Result<usize, ParseError> {
            let raw = field(index, name)?;
            raw.trim().parse().map_err(|_| ParseError::InvalidNumber {
                line: number,
                field: name,
                value: raw.to_string(),
            })
        };

        let severity = field(SEVERITY, "severity")?;
        let kind = field(KIND, "type")?;
        let code = field(CODE, "code")?;
        let file = field(FILE, "file")?;
        let line_no = number_field(LINE, "line")?;
        let column = number_field(COLUMN, "column")?;
        // Length only feeds the JSON report; tolerate junk there.
        let length = field(LENGTH, "length")?.trim().parse().ok();
        let message = field(MESSAGE, "message")?;

        Ok(Finding {
            severity: Severity::from_token(severity),
            kind: kind.to_string(),
            code: code.to_string(),
            file: relativize(file, self.working_dir),
            line: line_no,
            column,
            length,
            message: message.to_string(),
            url: self.docs.url_for(code),
        })
    }
}

/// Split a trimmed tool output buffer into numbered, non-blank lines.
///
/// Handles both `\n` and `\r\n` line endings. Numbers are 1-based positions
/// in the trimmed buffer.
pub fn output_lines(output: &str) -> impl Iterator<Item = (usize, &str)> {
    output
        .trim()
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
}

/// Split a machine-format line on unescaped pipes, unescaping field values.
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::with_capacity(8);
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next @ ('|' | '\\')) => current.push(next),
                Some(other) => {
                    current.push('\\');
                    current.push(other);
                }
                None => current.push('\\'),
            },
            '|' => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Strip the working-directory prefix from an analyzer path.
///
/// The leading separator is kept, so `/work/lib/a.dart` under `/work`
/// becomes `/lib/a.dart`. Paths outside the working directory are returned
/// unchanged.
pub fn relativize(file: &str, working_dir: &str) -> String {
    if working_dir.is_empty() {
        return file.to_string();
    }
    file.strip_prefix(working_dir).unwrap_or(file).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(line: &str) -> Result<Finding, ParseError> {
        let docs = DocsResolver::default();
        AnalyzerParser::new("/work", &docs).parse_line(1, line)
    }

    #[test]
    fn test_parse_error_line() {
        let f = parse_one("ERROR|LINT|avoid_print|/work/lib/a.dart|10|5|7|Avoid print calls.")
            .unwrap();
        assert_eq!(f.severity, Severity::Error);
        assert_eq!(f.kind, "LINT");
        assert_eq!(f.code, "avoid_print");
        assert_eq!(f.file, "/lib/a.dart");
        assert_eq!(f.line, 10);
        assert_eq!(f.column, 5);
        assert_eq!(f.length, Some(7));
        assert_eq!(f.message, "Avoid print calls.");
        assert!(f.url.ends_with("/avoid_print.html"));
    }

    #[test]
    fn test_non_error_tokens_are_warnings() {
        for token in ["WARNING", "INFO", "HINT", "Error"] {
            let line = format!("{token}|LINT|avoid_print|/work/a.dart|1|1|1|msg");
            assert_eq!(parse_one(&line).unwrap().severity, Severity::Warning, "{token}");
        }
    }

    #[test]
    fn test_diagnostic_url() {
        let f = parse_one(
            "INFO|HINT|DEPRECATED_MEMBER_USE|/work/lib/b.dart|3|9|4|'foo' is deprecated.",
        )
        .unwrap();
        assert_eq!(
            f.url,
            "https://dart.dev/tools/diagnostic-messages#deprecated_member_use"
        );
    }

    #[test]
    fn test_escaped_pipe_in_message() {
        let f = parse_one(r"INFO|LINT|x|/work/a.dart|1|2|3|Use a \| b or c \\ d").unwrap();
        assert_eq!(f.message, r"Use a | b or c \ d");
    }

    #[test]
    fn test_missing_field() {
        let err = parse_one("ERROR|LINT|avoid_print").unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingField {
                line: 1,
                field: "file",
                index: 3
            }
        );

        let err = parse_one("ERROR|LINT|avoid_print|/work/a.dart|1|2|3").unwrap_err();
        assert!(matches!(err, ParseError::MissingField { field: "message", .. }));
    }

    #[test]
    fn test_invalid_line_number() {
        let err = parse_one("ERROR|LINT|x|/work/a.dart|ten|2|3|msg").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidNumber {
                line: 1,
                field: "line",
                value: "ten".to_string()
            }
        );
    }

    #[test]
    fn test_output_lines_trims_and_skips_blank() {
        let lines: Vec<_> = output_lines("\n  a\r\nb\r\n\r\nc\n\n").collect();
        assert_eq!(lines, vec![(1, "a"), (2, "b"), (4, "c")]);
        assert_eq!(output_lines("").count(), 0);
        assert_eq!(output_lines(" \r\n\t\n").count(), 0);
    }

    #[test]
    fn test_relativize() {
        assert_eq!(relativize("/work/lib/a.dart", "/work"), "/lib/a.dart");
        assert_eq!(relativize("/other/a.dart", "/work"), "/other/a.dart");
        assert_eq!(relativize("/work/a.dart", ""), "/work/a.dart");
    }

    #[test]
    fn test_line_numbers_in_errors() {
        let docs = DocsResolver::default();
        let parser = AnalyzerParser::new("/work", &docs);
        let output = "ERROR|LINT|a|/work/a.dart|1|1|1|first\n\nbroken\nERROR|LINT|b|/work/b.dart|1|1|1|third";
        let results: Vec<_> = output_lines(output)
            .map(|(number, line)| parser.parse_line(number, line))
            .collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(ParseError::MissingField { line: 3, .. })));
        assert!(results[2].is_ok());
    }
}

//! Parser for the formatter's dry-run output.
//!
//! In dry-run mode the formatter prints the path of every file it would
//! change, mixed with banners and summaries. Only lines naming a Dart
//! source file are findings.

use super::analyzer::output_lines;
use super::types::FormatIssue;

/// Suffix identifying a Dart source file.
pub const DART_SUFFIX: &str = ".dart";

/// Extract the files the formatter would rewrite.
pub fn parse_output<'a>(output: &'a str, url: &'a str) -> impl Iterator<Item = FormatIssue> + 'a {
    output_lines(output)
        .filter(|(_, line)| line.ends_with(DART_SUFFIX))
        .map(move |(_, line)| FormatIssue {
            file: line.to_string(),
            url: url.to_string(),
        })
}

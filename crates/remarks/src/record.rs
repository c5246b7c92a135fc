//! Optimization-record parsing
//!
//! Compilers persist remarks as a stream of `---`-delimited records tagged
//! `!Missed`, `!Passed` or `!Analysis`, each a set of `Key: Value` lines plus
//! an `Args:` sequence whose concatenated values reconstruct the human
//! message. This parser is deliberately not a full YAML implementation: it
//! scans record boundaries and extracts the handful of fields the engine
//! needs, best-effort. Malformed records are skipped, never fatal; a record
//! without a `Pass` field is dropped silently.
//!
//! The field extractor only accepts a `Field:` match when the preceding byte
//! is a newline, a space or `{`, which keeps it from matching `Pass:` inside
//! message bodies.

use std::path::Path;

use thiserror::Error;

use crate::{Remark, RemarkKind, SourceLocation};

/// An error reading a record file
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("cannot open remarks file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Parse a record file into remarks
pub fn parse_record_file(path: impl AsRef<Path>) -> Result<Vec<Remark>, RecordError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| RecordError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(parse_record_str(&content))
}

/// Parse record text into remarks
///
/// Never fails; records that cannot be understood are skipped.
pub fn parse_record_str(content: &str) -> Vec<Remark> {
    let mut remarks = Vec::new();
    let mut pos = 0;

    while pos < content.len() {
        let Some(found) = content[pos..].find("---") else {
            break;
        };
        let record_start = pos + found;
        let record_end = match content[record_start + 3..].find("\n---") {
            Some(next) => record_start + 3 + next + 1,
            None => content.len(),
        };
        let record = &content[record_start..record_end];
        pos = record_end;

        let kind = if record.starts_with("--- !Missed") {
            RemarkKind::Missed
        } else if record.starts_with("--- !Passed") {
            RemarkKind::Applied
        } else if record.starts_with("--- !Analysis") {
            RemarkKind::Analysis
        } else {
            continue;
        };

        let pass_name = extract_field(record, "Pass:");
        if pass_name.is_empty() {
            continue;
        }

        let mut remark = Remark {
            kind,
            pass_name,
            remark_name: extract_field(record, "Name:"),
            function_name: extract_field(record, "Function:"),
            loc: SourceLocation::default(),
            message: extract_args_message(record),
            args: Vec::new(),
            hotness: None,
            // The record format does not encode the machine-kind bit.
            is_machine: false,
        };

        if record.contains("DebugLoc:") {
            remark.loc.file = extract_field(record, "File:");
            if let Some(line) = parse_leading_u32(&extract_field(record, "Line:")) {
                remark.loc.line = line;
            }
            if let Some(column) = parse_leading_u32(&extract_field(record, "Column:")) {
                remark.loc.column = column;
            }
        }

        remarks.push(remark);
    }

    remarks
}

/// Parse the leading digit run of a value, tolerating trailing text
///
/// Inline `DebugLoc: { Line: 14, Column: 12 }` forms leave the rest of the
/// line attached to the extracted value.
fn parse_leading_u32(value: &str) -> Option<u32> {
    let digits: &str = {
        let end = value
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map_or(value.len(), |(i, _)| i);
        &value[..end]
    };
    digits.parse().ok()
}

/// Extract the value of a `Field:` line
///
/// A match counts only when it starts the record or follows a newline, a
/// space or `{`. Values quoted on both ends with `'` are unquoted; a value
/// with an opening quote and no closing quote yields the empty string.
fn extract_field(record: &str, field: &str) -> String {
    let bytes = record.as_bytes();
    let mut search = 0;
    let field_pos = loop {
        let Some(found) = record[search..].find(field) else {
            return String::new();
        };
        let pos = search + found;
        if pos == 0 || matches!(bytes[pos - 1], b'\n' | b' ' | b'{') {
            break pos;
        }
        search = pos + 1;
    };

    let line_end = record[field_pos..]
        .find('\n')
        .map_or(record.len(), |e| field_pos + e);
    let line = &record[field_pos + field.len()..line_end];

    let Some(quote_start) = line.find('\'') else {
        return line.trim().to_string();
    };
    let Some(quote_len) = line[quote_start + 1..].find('\'') else {
        return String::new();
    };
    line[quote_start + 1..quote_start + 1 + quote_len].to_string()
}

/// Reconstruct the human message from the `Args:` sequence
///
/// Each sequence item contributes the value of its `Key: Value` field, in
/// order. A single space is inserted between pieces iff the accumulated text
/// does not end with one and the incoming piece does not start with one.
fn extract_args_message(record: &str) -> String {
    let Some(args_pos) = record.find("Args:") else {
        return String::new();
    };

    let mut message = String::new();
    let mut search_start = args_pos + 5;
    while search_start < record.len() {
        let line_end = record[search_start..]
            .find('\n')
            .map_or(record.len(), |e| search_start + e);
        let line = &record[search_start..line_end];
        let trimmed = line.trim();

        if !trimmed.starts_with('-') && !trimmed.is_empty() && search_start > args_pos + 6 {
            break;
        }

        if let Some(val_pos) = line.find(": ") {
            let value = line[val_pos + 2..].trim();
            let piece = if value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2 {
                &value[1..value.len() - 1]
            } else {
                value
            };
            if !message.is_empty()
                && !message.ends_with(' ')
                && !piece.is_empty()
                && !piece.starts_with(' ')
            {
                message.push(' ');
            }
            message.push_str(piece);
        }
        search_start = line_end + 1;
    }

    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_missed_record_with_split_message() {
        let doc = "--- !Missed\n\
                   Pass: 'loop-vectorize'\n\
                   Name: 'MissedDetails'\n\
                   Function: 'f'\n\
                   Args:\n\
                   \x20 - String: 'loop not'\n\
                   \x20 - String: ' vectorized'\n\
                   ...\n";
        let remarks = parse_record_str(doc);
        assert_eq!(remarks.len(), 1);
        let remark = &remarks[0];
        assert_eq!(remark.kind, RemarkKind::Missed);
        assert_eq!(remark.pass_name, "loop-vectorize");
        assert_eq!(remark.remark_name, "MissedDetails");
        assert_eq!(remark.function_name, "f");
        assert_eq!(remark.message, "loop not vectorized");
        assert!(!remark.is_machine);
    }

    #[test]
    fn inserts_spaces_between_pieces_when_needed() {
        let doc = "--- !Missed\n\
                   Pass: inline\n\
                   Name: NoDefinition\n\
                   Args:\n\
                   \x20 - Callee: foo\n\
                   \x20 - String: 'will not be inlined'\n";
        let remarks = parse_record_str(doc);
        assert_eq!(remarks[0].message, "foo will not be inlined");
    }

    #[test]
    fn parses_debug_locations() {
        let doc = "--- !Passed\n\
                   Pass: 'inline'\n\
                   Name: 'Inlined'\n\
                   DebugLoc: { File: 'cases.c', Line: 14, Column: 12 }\n\
                   Function: 'use_square'\n";
        let remarks = parse_record_str(doc);
        assert_eq!(remarks[0].kind, RemarkKind::Applied);
        assert_eq!(remarks[0].loc.file, "cases.c");
        assert_eq!(remarks[0].loc.line, 14);
        assert_eq!(remarks[0].loc.column, 12);
    }

    #[test]
    fn drops_records_without_a_pass() {
        let doc = "--- !Missed\nName: 'Orphan'\nFunction: 'f'\n";
        assert!(parse_record_str(doc).is_empty());
    }

    #[test]
    fn skips_unknown_tags() {
        let doc = "--- !Unknown\nPass: 'x'\n\n--- !Analysis\nPass: 'gvn'\nName: 'LoadClobbered'\n";
        let remarks = parse_record_str(doc);
        assert_eq!(remarks.len(), 1);
        assert_eq!(remarks[0].pass_name, "gvn");
        assert_eq!(remarks[0].kind, RemarkKind::Analysis);
    }

    #[test]
    fn field_matches_require_a_clean_left_boundary() {
        // "Pass:" inside a message body must not shadow the real field.
        let doc = "--- !Missed\n\
                   SomePass: 'decoy'\n\
                   Pass: 'real'\n\
                   Name: 'N'\n";
        let remarks = parse_record_str(doc);
        assert_eq!(remarks[0].pass_name, "real");
    }

    #[test]
    fn unterminated_quote_yields_empty_value() {
        let doc = "--- !Missed\nPass: 'half\nName: 'N'\n";
        // Empty Pass drops the record.
        assert!(parse_record_str(doc).is_empty());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let error = parse_record_file("/nonexistent/remarks.opt.yaml").unwrap_err();
        assert!(matches!(error, RecordError::Io { .. }));
    }

    #[test]
    fn multiple_records_parse_in_order() {
        let doc = "--- !Missed\nPass: 'a'\nName: 'First'\n\
                   --- !Passed\nPass: 'b'\nName: 'Second'\n";
        let remarks = parse_record_str(doc);
        assert_eq!(remarks.len(), 2);
        assert_eq!(remarks[0].remark_name, "First");
        assert_eq!(remarks[1].remark_name, "Second");
    }
}

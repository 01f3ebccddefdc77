//! Strict quote validation for test files.
//!
//! The `csv` reader is lenient about quotes: a `"` inside an unquoted field,
//! text after a closing quote, and a quoted field running into end of input
//! all read without error. Test files are rejected on any of these, so the
//! raw bytes pass through [`normalize_quoting`] before they reach the reader.

use crate::error_handling::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Start of a field, before any non-blank byte
    FieldStart,
    Unquoted,
    Quoted,
    /// Just saw a `"` inside a quoted field: either an escape or the close
    QuoteInQuoted,
}

/// Validates quoting and drops blanks in front of each field.
///
/// Leading blanks are dropped so that ` "US"` reads as a quoted field.
/// Everything else passes through unchanged. Lines are counted from 1; an
/// unterminated field reports the line it was opened on.
pub(crate) fn normalize_quoting(input: &[u8]) -> Result<Vec<u8>, ParseError> {
    let mut out = Vec::with_capacity(input.len());
    let mut state = State::FieldStart;
    let mut line: u64 = 1;
    let mut opened_on: u64 = 1;

    for &byte in input {
        state = match (state, byte) {
            (State::FieldStart, b' ' | b'\t') => continue,
            (State::FieldStart, b'"') => {
                opened_on = line;
                State::Quoted
            }
            (State::Unquoted, b'"') => return Err(ParseError::BareQuote { line }),
            (State::FieldStart | State::Unquoted, b',' | b'\n' | b'\r') => State::FieldStart,
            (State::FieldStart | State::Unquoted, _) => State::Unquoted,
            (State::Quoted, b'"') => State::QuoteInQuoted,
            (State::Quoted, _) => State::Quoted,
            (State::QuoteInQuoted, b'"') => State::Quoted,
            (State::QuoteInQuoted, b',' | b'\n' | b'\r') => State::FieldStart,
            (State::QuoteInQuoted, _) => return Err(ParseError::ExtraneousQuote { line }),
        };
        if byte == b'\n' {
            line += 1;
        }
        out.push(byte);
    }

    if state == State::Quoted {
        return Err(ParseError::UnterminatedQuote { line: opened_on });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_input_passes_through() {
        let input = b"Agent,Country\n\"Browser\",\"a,b\"\r\nGooglebot,UK\n";
        assert_eq!(normalize_quoting(input).unwrap(), input.to_vec());
    }

    #[test]
    fn test_blanks_before_field_dropped() {
        let out = normalize_quoting(b"Browser,  \"US\",\tx\n").unwrap();
        assert_eq!(out, b"Browser,\"US\",x\n".to_vec());
    }

    #[test]
    fn test_doubled_quote_inside_quoted_field() {
        let input = b"a,\"say \"\"hi\"\"\"\n";
        assert_eq!(normalize_quoting(input).unwrap(), input.to_vec());
    }

    #[test]
    fn test_bare_quote_reports_line() {
        let err = normalize_quoting(b"Agent,Country\nBrow\"ser,US\n").unwrap_err();
        assert!(matches!(err, ParseError::BareQuote { line: 2 }), "{err:?}");
    }

    #[test]
    fn test_text_after_closing_quote() {
        let err = normalize_quoting(b"Agent,Country\n\"Browser\"x,US\n").unwrap_err();
        assert!(matches!(err, ParseError::ExtraneousQuote { line: 2 }), "{err:?}");

        // Trailing blanks after a closing quote count as text too
        let err = normalize_quoting(b"\"Browser\" ,US\n").unwrap_err();
        assert!(matches!(err, ParseError::ExtraneousQuote { line: 1 }), "{err:?}");
    }

    #[test]
    fn test_unterminated_quote_reports_opening_line() {
        let err = normalize_quoting(b"Agent,Result\nBrowser,\"No redirect\nmore\n").unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedQuote { line: 2 }), "{err:?}");
    }

    #[test]
    fn test_quoted_field_closed_at_end_of_input() {
        assert!(normalize_quoting(b"a,\"b\"").is_ok());
        assert!(normalize_quoting(b"").is_ok());
    }
}

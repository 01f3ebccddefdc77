//! Test definition loading.
//!
//! A test file is CSV with a header row and the columns
//! `Agent, Country, URL, ExpectedStatus, ExpectedResult`:
//!
//! ```text
//! Agent,Country,URL,ExpectedStatus,ExpectedResult
//! Browser,US,http://localhost:8080/,200,No redirect
//! Browser,UK,http://localhost:8080/,302,http://localhost:8080/uk/
//! Googlebot,UK,http://localhost:8080/,200,No redirect
//! ```

use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use log::debug;

use crate::config::{DEFAULT_EXPECTED_STATUS, GOOGLEBOT_AGENT, GOOGLEBOT_USER_AGENT, MIN_TEST_COLUMNS};
use crate::error_handling::{LoadError, ParseError};

mod quoting;

use quoting::normalize_quoting;

/// One row of the test definition file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Free-text agent label; `googlebot` (any case) selects the bot user agent
    pub agent: String,
    /// Country code as written in the file
    pub country: String,
    /// Absolute target URL
    pub url: String,
    /// Expected HTTP status
    pub expected_status: i32,
    /// `No redirect`, or a substring expected in the redirect target
    pub expected_result: String,
}

impl TestCase {
    /// User-Agent override for this case, if any.
    ///
    /// Any agent other than `googlebot` is a plain browser request that keeps
    /// the transport's default user agent.
    pub fn user_agent(&self) -> Option<&'static str> {
        self.agent
            .eq_ignore_ascii_case(GOOGLEBOT_AGENT)
            .then_some(GOOGLEBOT_USER_AGENT)
    }

    /// Country code as sent in the `X-Test-Country` header.
    pub fn country_header(&self) -> String {
        crate::probe::normalize_country(&self.country)
    }
}

/// Loads test cases from a CSV file.
///
/// # Errors
///
/// Returns `LoadError::Io` when the file cannot be read and
/// `LoadError::Parse` when it is not well-formed CSV. A file with only a
/// header (or no rows at all) loads as an empty list.
pub fn load_test_cases(path: &Path) -> Result<Vec<TestCase>, LoadError> {
    let content = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let cases = parse_test_cases(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Loaded {} test cases from {}", cases.len(), path.display());
    Ok(cases)
}

/// Parses test cases from CSV content.
///
/// - Quoting is strict: a bare `"`, text after a closing quote, or an
///   unterminated quoted field fails the whole parse
/// - The first row is a header and is always skipped
/// - Every field is trimmed
/// - Rows with fewer than five fields are skipped
/// - A row whose field count differs from the first row fails the whole parse
/// - A non-integer expected status becomes 200
pub fn parse_test_cases(content: &[u8]) -> Result<Vec<TestCase>, ParseError> {
    let content = normalize_quoting(content)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .flexible(false)
        .from_reader(content.as_slice());

    let mut cases = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if index == 0 || record.len() < MIN_TEST_COLUMNS {
            continue;
        }
        cases.push(test_case_from_record(&record));
    }
    Ok(cases)
}

fn test_case_from_record(record: &StringRecord) -> TestCase {
    // Callers guarantee at least MIN_TEST_COLUMNS fields
    let field = |i: usize| record[i].to_string();
    TestCase {
        agent: field(0),
        country: field(1),
        url: field(2),
        expected_status: field(3).parse().unwrap_or(DEFAULT_EXPECTED_STATUS),
        expected_result: field(4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write fixture");
        file
    }

    #[test]
    fn test_parse_rows_in_file_order() {
        let csv = "Agent,Country,URL,ExpectedStatus,ExpectedResult\n\
                   Browser,US,http://localhost:8080/,200,No redirect\n\
                   Googlebot,UK,http://localhost:8080/,200,No redirect\n\
                   Browser,DE,http://localhost:8080/,302,http://localhost:8080/de/\n";
        let cases = parse_test_cases(csv.as_bytes()).unwrap();
        assert_eq!(cases.len(), 3);
        assert_eq!(cases[0].country, "US");
        assert_eq!(cases[1].agent, "Googlebot");
        assert_eq!(cases[2].expected_status, 302);
        assert_eq!(cases[2].expected_result, "http://localhost:8080/de/");
    }

    #[test]
    fn test_header_row_skipped_regardless_of_content() {
        let csv = "Browser,US,http://a/,200,No redirect\n\
                   Browser,FR,http://b/,200,No redirect\n";
        let cases = parse_test_cases(csv.as_bytes()).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].country, "FR");
    }

    #[test]
    fn test_fields_trimmed_and_leading_space_tolerated() {
        let csv = "Agent, Country, URL, ExpectedStatus, ExpectedResult\n  \
                   Browser ,  us , http://localhost:8080/ , 302 , http://localhost:8080/us/ \n";
        let cases = parse_test_cases(csv.as_bytes()).unwrap();
        assert_eq!(
            cases[0],
            TestCase {
                agent: "Browser".into(),
                country: "us".into(),
                url: "http://localhost:8080/".into(),
                expected_status: 302,
                expected_result: "http://localhost:8080/us/".into(),
            }
        );
    }

    #[test]
    fn test_quoted_fields() {
        let csv = "Agent,Country,URL,ExpectedStatus,ExpectedResult\n\
                   \"Browser\",\"US\",\"http://localhost:8080/?a=1,2\",\"200\",\"No redirect\"\n";
        let cases = parse_test_cases(csv.as_bytes()).unwrap();
        assert_eq!(cases[0].url, "http://localhost:8080/?a=1,2");
        assert_eq!(cases[0].expected_status, 200);
    }

    #[test]
    fn test_leading_space_before_quoted_field() {
        let csv = "Agent,Country,URL,ExpectedStatus,ExpectedResult\n\
                   Browser, \"US\", http://a/,200, \"say \"\"hi\"\"\"\n";
        let cases = parse_test_cases(csv.as_bytes()).unwrap();
        assert_eq!(cases[0].country, "US");
        assert_eq!(cases[0].expected_result, "say \"hi\"");
    }

    #[test]
    fn test_bare_quote_in_field_fails() {
        let csv = "Agent,Country,URL,ExpectedStatus,ExpectedResult\n\
                   Brow\"ser,US,http://a/,200,No redirect\n";
        let err = parse_test_cases(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::BareQuote { line: 2 }), "{err:?}");
    }

    #[test]
    fn test_text_after_closing_quote_fails() {
        let csv = "Agent,Country,URL,ExpectedStatus,ExpectedResult\n\
                   \"Browser\"x,US,http://a/,200,No redirect\n";
        let err = parse_test_cases(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::ExtraneousQuote { line: 2 }), "{err:?}");
    }

    #[test]
    fn test_unterminated_quote_at_end_of_file_fails() {
        let csv = "Agent,Country,URL,ExpectedStatus,ExpectedResult\n\
                   Browser,US,http://a/,200,\"No redirect\n";
        let err = parse_test_cases(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedQuote { line: 2 }), "{err:?}");
    }

    #[test]
    fn test_invalid_status_defaults_to_200() {
        let csv = "Agent,Country,URL,ExpectedStatus,ExpectedResult\n\
                   Browser,US,http://example.com,invalid,No redirect\n";
        let cases = parse_test_cases(csv.as_bytes()).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].expected_status, 200);
    }

    #[test]
    fn test_short_rows_skipped_without_error() {
        // Every row has four fields, so the shape is consistent and each data
        // row is simply too short to be a test case.
        let csv = "Agent,Country,URL,ExpectedStatus\n\
                   Browser,US,http://a/,200\n\
                   Browser,DE,http://b/,302\n";
        let cases = parse_test_cases(csv.as_bytes()).unwrap();
        assert!(cases.is_empty());
    }

    #[test]
    fn test_inconsistent_field_count_fails_whole_file() {
        let csv = "Agent,Country,URL,ExpectedStatus,ExpectedResult\n\
                   Browser,US,http://a/,200,No redirect\n\
                   Browser,DE,http://b/\n";
        let err = parse_test_cases(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::Csv(_)), "{err:?}");
    }

    #[test]
    fn test_header_only_and_empty_files_yield_no_cases() {
        let header_only = "Agent,Country,URL,ExpectedStatus,ExpectedResult\n";
        assert!(parse_test_cases(header_only.as_bytes()).unwrap().is_empty());
        assert!(parse_test_cases("".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = load_test_cases(Path::new("/nonexistent/links.testing")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_load_malformed_file_is_parse_error() {
        let file = write_fixture("Agent,Country,URL,ExpectedStatus,ExpectedResult\na,b\n");
        let err = load_test_cases(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn test_load_bad_quoting_is_parse_error() {
        for body in [
            "Brow\"ser,US,http://a/,200,No redirect\n",
            "\"Browser\"x,US,http://a/,200,No redirect\n",
            "Browser,US,http://a/,200,\"No redirect",
        ] {
            let file = write_fixture(&format!(
                "Agent,Country,URL,ExpectedStatus,ExpectedResult\n{body}"
            ));
            let err = load_test_cases(file.path()).unwrap_err();
            assert!(
                matches!(err, LoadError::Parse { .. }),
                "{body:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_load_from_file() {
        let file = write_fixture(
            "Agent,Country,URL,ExpectedStatus,ExpectedResult\n\
             Browser,US,http://localhost:8080/,200,No redirect\n",
        );
        let cases = load_test_cases(file.path()).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].url, "http://localhost:8080/");
    }

    #[test]
    fn test_user_agent_selection() {
        let mut case = TestCase {
            agent: "GoogleBot".into(),
            country: "uk".into(),
            url: "http://localhost:8080/".into(),
            expected_status: 200,
            expected_result: "No redirect".into(),
        };
        assert_eq!(case.user_agent(), Some(GOOGLEBOT_USER_AGENT));
        assert_eq!(case.country_header(), "GB");

        case.agent = "Browser".into();
        assert_eq!(case.user_agent(), None);
    }
}

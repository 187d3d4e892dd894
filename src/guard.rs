//! Query guard.
//!
//! The language-model service is untrusted input: nothing it produces runs
//! against the store without passing this module first. The guard applies an
//! allow-list policy (one statement, SELECT only, parseable under the
//! engine's grammar) and is the single choke point between generated text
//! and execution. It deliberately does not resolve column names; the engine
//! already does that and reports unknown names as execution errors.

use std::fmt;

use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;
use tracing::debug;

use crate::error::GuardError;

/// A candidate query that passed every guard rule. Only constructible
/// through [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuery(String);

impl ValidatedQuery {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ValidatedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validate a candidate query string. Rules are checked in order and the
/// first failure wins:
///
/// 1. non-empty after trimming;
/// 2. exactly one statement: no `;` outside string literals, except a
///    single trailing terminator followed only by whitespace;
/// 3. begins with the `SELECT` keyword (case-insensitive);
/// 4. parses under SQLite's grammar (parse-only dry run, no execution).
pub fn validate(candidate: &str) -> Result<ValidatedQuery, GuardError> {
    let text = candidate.trim();
    if text.is_empty() {
        return Err(GuardError::Empty);
    }

    if has_extra_statement(text) {
        return Err(GuardError::MultipleStatements);
    }

    let keyword = leading_keyword(text);
    if !keyword.eq_ignore_ascii_case("select") {
        return Err(GuardError::NotReadOnly(keyword.to_string()));
    }

    let dialect = SQLiteDialect {};
    let statements =
        Parser::parse_sql(&dialect, text).map_err(|e| GuardError::Parse(e.to_string()))?;
    if statements.len() != 1 {
        return Err(GuardError::MultipleStatements);
    }

    let accepted = text.trim_end_matches(';').trim_end().to_string();
    debug!(sql = %accepted, "query accepted");
    Ok(ValidatedQuery(accepted))
}

/// Scan for a statement separator outside string literals and quoted
/// identifiers. A single trailing `;` is tolerated; a `;` with any content
/// after it means more than one statement.
fn has_extra_statement(text: &str) -> bool {
    let mut chars = text.char_indices().peekable();
    let mut in_string = false;
    let mut in_ident = false;

    while let Some((i, c)) = chars.next() {
        match c {
            '\'' if !in_ident => {
                if in_string {
                    // '' inside a literal is an escaped quote, not a close.
                    if matches!(chars.peek(), Some((_, '\''))) {
                        chars.next();
                    } else {
                        in_string = false;
                    }
                } else {
                    in_string = true;
                }
            }
            '"' if !in_string => in_ident = !in_ident,
            ';' if !in_string && !in_ident => {
                if !text[i + 1..].trim().is_empty() {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

/// The statement's leading keyword: its longest alphabetic prefix.
fn leading_keyword(text: &str) -> &str {
    let end = text
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(text.len());
    &text[..end]
}

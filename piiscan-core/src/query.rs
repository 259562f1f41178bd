//! Dialect-aware sample query construction.
//!
//! Builds the bounded `SELECT *` used by the content scanner. The row bound
//! is expressed in the limiting syntax of the target backend, and the table
//! identifier is always quoted structurally, never interpolated raw.

use crate::error::PiiScanError;
use crate::{Result, SAMPLE_WINDOW};
use std::fmt;

/// Row-limiting strategy of a SQL backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Trailing `LIMIT n` clause (PostgreSQL, MySQL, SQLite, ...)
    Generic,
    /// Row-number upper-bound predicate (`WHERE ROWNUM <= n`, Oracle)
    RowNumberBased,
}

impl Dialect {
    /// Selects the dialect for a backend identifier.
    ///
    /// # Errors
    /// Returns a configuration error for an unrecognized backend.
    pub fn from_hint(hint: &str) -> Result<Self> {
        match normalize_hint(hint)?.as_str() {
            "oracle" => Ok(Self::RowNumberBased),
            "postgres" | "postgresql" | "mysql" | "mariadb" | "sqlite" => Ok(Self::Generic),
            other => Err(PiiScanError::configuration(format!(
                "Unrecognized dialect '{}'",
                other
            ))),
        }
    }

    /// Builds a query returning at most `limit` rows of `table`.
    pub fn build_sample_query(self, table: &QuotedIdent, limit: u32) -> String {
        match self {
            Self::Generic => format!("SELECT * FROM {} LIMIT {}", table, limit),
            Self::RowNumberBased => format!("SELECT * FROM {} WHERE ROWNUM <= {}", table, limit),
        }
    }
}

/// Identifier quoting convention of a SQL backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    /// ANSI double quotes: `"name"`
    DoubleQuote,
    /// MySQL backticks: `` `name` ``
    Backtick,
}

impl QuoteStyle {
    /// Selects the quoting convention for a backend identifier.
    ///
    /// # Errors
    /// Returns a configuration error for an unrecognized backend.
    pub fn from_hint(hint: &str) -> Result<Self> {
        // Validates the hint the same way Dialect does.
        Dialect::from_hint(hint)?;
        match normalize_hint(hint)?.as_str() {
            "mysql" | "mariadb" => Ok(Self::Backtick),
            _ => Ok(Self::DoubleQuote),
        }
    }

    /// Quotes an identifier, doubling any embedded quote character.
    ///
    /// # Errors
    /// Returns a configuration error if the name is empty or contains NUL.
    pub fn quote(self, name: &str) -> Result<QuotedIdent> {
        if name.is_empty() {
            return Err(PiiScanError::configuration("Table name cannot be empty"));
        }
        if name.contains('\0') {
            return Err(PiiScanError::configuration(
                "Table name cannot contain NUL characters",
            ));
        }

        let quote = match self {
            Self::DoubleQuote => '"',
            Self::Backtick => '`',
        };
        let escaped = name.replace(quote, &format!("{quote}{quote}"));
        Ok(QuotedIdent(format!("{quote}{escaped}{quote}")))
    }
}

/// A SQL identifier that has already been quoted and escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotedIdent(String);

impl QuotedIdent {
    /// The quoted identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuotedIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds sample queries for one backend with a configurable row window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleQueryBuilder {
    dialect: Dialect,
    quote_style: QuoteStyle,
    window: u32,
}

impl SampleQueryBuilder {
    /// Creates a builder for a backend identifier using [`SAMPLE_WINDOW`].
    ///
    /// # Errors
    /// Returns a configuration error for an unrecognized backend.
    pub fn from_hint(hint: &str) -> Result<Self> {
        Ok(Self {
            dialect: Dialect::from_hint(hint)?,
            quote_style: QuoteStyle::from_hint(hint)?,
            window: SAMPLE_WINDOW,
        })
    }

    /// Builder method to set the row window.
    pub fn with_window(mut self, window: u32) -> Self {
        self.window = window;
        self
    }

    /// The dialect this builder targets.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The row window this builder applies.
    pub fn window(&self) -> u32 {
        self.window
    }

    /// Builds the bounded sample query for `table`.
    ///
    /// # Errors
    /// Returns a configuration error if the table name is empty or invalid.
    pub fn build(&self, table: &str) -> Result<String> {
        let quoted = self.quote_style.quote(table)?;
        Ok(self.dialect.build_sample_query(&quoted, self.window))
    }
}

/// Builds the sample query for `table` on the backend named by `hint`,
/// bounded by [`SAMPLE_WINDOW`].
///
/// # Example
/// ```rust
/// use piiscan_core::query::build_sample_query;
///
/// let query = build_sample_query("users", "oracle").unwrap();
/// assert_eq!(query, r#"SELECT * FROM "users" WHERE ROWNUM <= 1000"#);
/// ```
///
/// # Errors
/// Returns a configuration error if the table name is empty or the hint is
/// unrecognized.
pub fn build_sample_query(table: &str, hint: &str) -> Result<String> {
    SampleQueryBuilder::from_hint(hint)?.build(table)
}

/// Lower-cases a backend hint and strips any driver suffix
/// (`postgresql+psycopg2` becomes `postgresql`).
fn normalize_hint(hint: &str) -> Result<String> {
    let backend = hint
        .trim()
        .split('+')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    if backend.is_empty() {
        return Err(PiiScanError::configuration("Dialect hint cannot be empty"));
    }
    Ok(backend)
}

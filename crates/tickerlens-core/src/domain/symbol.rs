use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_SYMBOL_LEN: usize = 15;

/// Suffix Yahoo uses for B3 (Sao Paulo) listings.
pub const B3_SUFFIX: &str = ".SA";

/// Exchange-qualified ticker, normalized to uppercase. Used as the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Trim, upper-case and validate a ticker such as `petr4.sa` or `BRK-B`.
    ///
    /// Tickers start with a letter, hold only ASCII letters, digits, `.` and
    /// `-`, and never end on a separator.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_uppercase();

        let Some(first) = normalized.chars().next() else {
            return Err(ValidationError::EmptySymbol);
        };
        let len = normalized.chars().count();
        if len > MAX_SYMBOL_LEN {
            return Err(ValidationError::SymbolTooLong {
                len,
                max: MAX_SYMBOL_LEN,
            });
        }
        if !first.is_ascii_alphabetic() {
            return Err(ValidationError::SymbolInvalidStart { ch: first });
        }

        let invalid = normalized
            .chars()
            .enumerate()
            .find(|&(index, ch)| !is_ticker_char(ch) || (index == len - 1 && is_separator(ch)));
        if let Some((index, ch)) = invalid {
            return Err(ValidationError::SymbolInvalidChar { ch, index });
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for tickers listed on B3 (`PETR4.SA`).
    pub fn is_b3_listing(&self) -> bool {
        self.0.ends_with(B3_SUFFIX)
    }

    /// True when the ticker already carries an exchange or class qualifier.
    pub fn is_qualified(&self) -> bool {
        self.0.contains('.')
    }
}

fn is_separator(ch: char) -> bool {
    ch == '.' || ch == '-'
}

fn is_ticker_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || is_separator(ch)
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

//! Graham and Greenblatt value screens.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ValidationError, ValuationRatios};

/// Graham number ceiling for `P/L x P/VP`.
pub const GRAHAM_LIMIT: f64 = 22.5;
/// Greenblatt ceiling for P/L.
pub const GREENBLATT_MAX_PE: f64 = 15.0;
/// Greenblatt floor for ROE, as a fraction.
pub const GREENBLATT_MIN_ROE: f64 = 0.15;

/// Outcome of one screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Cheap,
    Expensive,
    /// A required ratio was missing or unusable.
    Unknown,
}

impl Verdict {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cheap => "cheap",
            Self::Expensive => "expensive",
            Self::Unknown => "unknown",
        }
    }

    pub const fn is_cheap(self) -> bool {
        matches!(self, Self::Cheap)
    }

    fn from_test(cheap: bool) -> Self {
        if cheap {
            Self::Cheap
        } else {
            Self::Expensive
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cheap" => Ok(Self::Cheap),
            "expensive" => Ok(Self::Expensive),
            "unknown" => Ok(Self::Unknown),
            _ => Err(ValidationError::InvalidVerdict {
                value: value.to_owned(),
            }),
        }
    }
}

/// Both screens for one ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationVerdict {
    pub graham: Verdict,
    pub greenblatt: Verdict,
}

impl ValuationVerdict {
    pub fn classify(ratios: &ValuationRatios) -> Self {
        Self {
            graham: graham(ratios.pe_ratio, ratios.price_to_book),
            greenblatt: greenblatt(ratios.pe_ratio, ratios.return_on_equity),
        }
    }

    /// Cheap on both screens.
    pub fn is_double_cheap(&self) -> bool {
        self.graham.is_cheap() && self.greenblatt.is_cheap()
    }
}

/// Cheap when `P/L x P/VP < 22.5`. Unknown when either ratio is missing or
/// not strictly positive.
pub fn graham(pe_ratio: Option<f64>, price_to_book: Option<f64>) -> Verdict {
    match (usable(pe_ratio), usable(price_to_book)) {
        (Some(pe), Some(pb)) if pe > 0.0 && pb > 0.0 => Verdict::from_test(pe * pb < GRAHAM_LIMIT),
        _ => Verdict::Unknown,
    }
}

/// Cheap when `P/L < 15` and `ROE > 0.15`. Unknown when either is missing.
///
/// A negative P/L passes the P/L test as a plain number.
pub fn greenblatt(pe_ratio: Option<f64>, return_on_equity: Option<f64>) -> Verdict {
    match (usable(pe_ratio), usable(return_on_equity)) {
        (Some(pe), Some(roe)) => {
            Verdict::from_test(pe < GREENBLATT_MAX_PE && roe > GREENBLATT_MIN_ROE)
        }
        _ => Verdict::Unknown,
    }
}

fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Symbol, UtcDateTime, ValidationError};

/// Company executive as listed by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Officer {
    pub name: Option<String>,
    pub title: Option<String>,
}

/// Descriptive company metadata. Every field may be missing upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub country: Option<String>,
    pub summary: Option<String>,
    /// Ordered as the provider lists them (most senior first).
    pub officers: Vec<Officer>,
}

/// Trailing valuation and profitability ratios.
///
/// Fractions stay fractions: a 20% ROE is `0.20`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationRatios {
    pub current_price: Option<f64>,
    /// Trailing price-to-earnings (P/L).
    pub pe_ratio: Option<f64>,
    /// Price-to-book (P/VP).
    pub price_to_book: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub return_on_assets: Option<f64>,
    pub ebitda_margin: Option<f64>,
    pub dividend_yield: Option<f64>,
}

impl ValuationRatios {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_optional_non_negative("current_price", self.current_price)?;
        validate_optional_finite("pe_ratio", self.pe_ratio)?;
        validate_optional_finite("price_to_book", self.price_to_book)?;
        validate_optional_finite("return_on_equity", self.return_on_equity)?;
        validate_optional_finite("return_on_assets", self.return_on_assets)?;
        validate_optional_finite("ebitda_margin", self.ebitda_margin)?;
        validate_optional_non_negative("dividend_yield", self.dividend_yield)?;
        Ok(())
    }
}

/// Fundamentals snapshot for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub symbol: Symbol,
    pub as_of: UtcDateTime,
    pub currency: Option<String>,
    pub ratios: ValuationRatios,
    pub profile: CompanyProfile,
}

impl Fundamentals {
    pub fn new(
        symbol: Symbol,
        as_of: UtcDateTime,
        currency: Option<String>,
        ratios: ValuationRatios,
        profile: CompanyProfile,
    ) -> Result<Self, ValidationError> {
        ratios.validate()?;

        Ok(Self {
            symbol,
            as_of,
            currency: currency
                .map(|code| code.trim().to_ascii_uppercase())
                .filter(|code| !code.is_empty()),
            ratios,
            profile,
        })
    }

    /// A record with nothing but the symbol, for providers that know the ticker
    /// but publish no figures for it.
    pub fn empty(symbol: Symbol, as_of: UtcDateTime) -> Self {
        Self {
            symbol,
            as_of,
            currency: None,
            ratios: ValuationRatios::default(),
            profile: CompanyProfile::default(),
        }
    }
}

/// Daily close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: Date,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: Date, close: f64) -> Result<Self, ValidationError> {
        validate_non_negative("close", close)?;
        Ok(Self { date, close })
    }
}

/// Close history ordered by strictly ascending date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: Symbol,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, rejecting out-of-order or duplicated dates.
    pub fn new(symbol: Symbol, points: Vec<PricePoint>) -> Result<Self, ValidationError> {
        if let Some(index) = points
            .windows(2)
            .position(|pair| pair[0].date >= pair[1].date)
        {
            return Err(ValidationError::UnorderedPriceSeries { index: index + 1 });
        }

        Ok(Self { symbol, points })
    }

    /// Sort provider rows by date; for a repeated date the later row wins
    /// (intraday updates of the current session arrive last).
    pub fn from_unordered(symbol: Symbol, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|point| point.date);

        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }

        Self {
            symbol,
            points: deduped,
        }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.close).collect()
    }

    pub fn dates(&self) -> Vec<Date> {
        self.points.iter().map(|point| point.date).collect()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Everything fetched for one ticker at one point in time. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSnapshot {
    pub symbol: Symbol,
    pub fundamentals: Fundamentals,
    pub prices: PriceSeries,
    pub fetched_at: UtcDateTime,
}

impl TickerSnapshot {
    /// Latest close, falling back to the quoted current price.
    pub fn last_price(&self) -> Option<f64> {
        self.prices
            .last()
            .map(|point| point.close)
            .or(self.fundamentals.ratios.current_price)
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

fn validate_optional_non_negative(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        validate_non_negative(field, value)?;
    }
    Ok(())
}

fn validate_optional_finite(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue { field });
        }
    }
    Ok(())
}

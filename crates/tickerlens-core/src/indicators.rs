//! Technical indicators over daily closes.
//!
//! | Function | Output | Minimum closes |
//! |----------|--------|----------------|
//! | [`rsi`] / [`rsi_series`] | Wilder RSI, 0..=100 | `period + 1` |
//! | [`ema_series`] | EMA seeded by the SMA of the first `period` values | `period` |
//! | [`macd`] / [`macd_series`] | MACD line, signal line, histogram | `slow + signal` |
//!
//! Everything here is pure: same input, same output, no shared state.
//! Series variants return one slot per input close so they line up with
//! [`PriceSeries::dates`](crate::PriceSeries::dates); warm-up slots are `None`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::PriceSeries;

pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_MACD_FAST: usize = 12;
pub const DEFAULT_MACD_SLOW: usize = 26;
pub const DEFAULT_MACD_SIGNAL: usize = 9;

pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;

/// Reasons an indicator could not be computed.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndicatorError {
    #[error("{indicator} needs at least {required} closes, got {available}")]
    InsufficientData {
        indicator: String,
        required: usize,
        available: usize,
    },
    #[error("{indicator}: {reason}")]
    InvalidPeriod { indicator: String, reason: String },
}

impl IndicatorError {
    fn insufficient(indicator: &str, required: usize, available: usize) -> Self {
        Self::InsufficientData {
            indicator: indicator.to_owned(),
            required,
            available,
        }
    }

    fn invalid_period(indicator: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPeriod {
            indicator: indicator.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Periods used by [`IndicatorResult::compute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: DEFAULT_RSI_PERIOD,
            macd_fast: DEFAULT_MACD_FAST,
            macd_slow: DEFAULT_MACD_SLOW,
            macd_signal: DEFAULT_MACD_SIGNAL,
        }
    }
}

/// One MACD observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdPoint {
    pub macd: f64,
    pub signal: f64,
    /// Always exactly `macd - signal`.
    pub histogram: f64,
}

impl MacdPoint {
    fn new(macd: f64, signal: f64) -> Self {
        Self {
            macd,
            signal,
            histogram: macd - signal,
        }
    }
}

/// RSI band relative to the 70/30 reference lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiZone {
    Overbought,
    Neutral,
    Oversold,
}

impl RsiZone {
    pub fn classify(rsi: f64) -> Self {
        if rsi >= RSI_OVERBOUGHT {
            Self::Overbought
        } else if rsi <= RSI_OVERSOLD {
            Self::Oversold
        } else {
            Self::Neutral
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overbought => "overbought",
            Self::Neutral => "neutral",
            Self::Oversold => "oversold",
        }
    }
}

/// Latest indicator values for one ticker.
///
/// An indicator that cannot be computed is left `None` and its reason is
/// recorded in `unavailable`; it never blocks the rest of the analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorResult {
    pub rsi: Option<f64>,
    pub rsi_zone: Option<RsiZone>,
    pub macd: Option<MacdPoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unavailable: Vec<IndicatorError>,
}

impl IndicatorResult {
    pub fn compute(series: &PriceSeries, config: &IndicatorConfig) -> Self {
        let closes = series.closes();
        let mut result = Self::default();

        match rsi(&closes, config.rsi_period) {
            Ok(value) => {
                result.rsi = Some(value);
                result.rsi_zone = Some(RsiZone::classify(value));
            }
            Err(error) => result.unavailable.push(error),
        }

        match macd(
            &closes,
            config.macd_fast,
            config.macd_slow,
            config.macd_signal,
        ) {
            Ok(point) => result.macd = Some(point),
            Err(error) => result.unavailable.push(error),
        }

        result
    }
}

/// Latest Wilder RSI.
///
/// # Errors
///
/// [`IndicatorError::InsufficientData`] with fewer than `period + 1` closes.
pub fn rsi(closes: &[f64], period: usize) -> Result<f64, IndicatorError> {
    rsi_series(closes, period)?
        .last()
        .copied()
        .flatten()
        .ok_or_else(|| IndicatorError::insufficient("rsi", period + 1, closes.len()))
}

/// Wilder RSI for every close; the first `period` slots are `None`.
///
/// The first average gain and loss are the simple means of the first
/// `period` deltas; each later delta is folded in with
/// `avg = (avg * (period - 1) + x) / period`. A zero average loss reads 100.
pub fn rsi_series(closes: &[f64], period: usize) -> Result<Vec<Option<f64>>, IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::invalid_period("rsi", "period must be > 0"));
    }
    if closes.len() < period + 1 {
        return Err(IndicatorError::insufficient(
            "rsi",
            period + 1,
            closes.len(),
        ));
    }

    let n = period as f64;
    let split = |delta: f64| {
        if delta > 0.0 {
            (delta, 0.0)
        } else {
            (0.0, -delta)
        }
    };
    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    let (mut avg_gain, mut avg_loss) = deltas[..period]
        .iter()
        .fold((0.0, 0.0), |(g, l), &delta| {
            let (gain, loss) = split(delta);
            (g + gain, l + loss)
        });
    avg_gain /= n;
    avg_loss /= n;

    let mut out = vec![None; period];
    out.push(Some(rsi_from_averages(avg_gain, avg_loss)));

    for &delta in &deltas[period..] {
        let (gain, loss) = split(delta);
        avg_gain = (avg_gain * (n - 1.0) + gain) / n;
        avg_loss = (avg_loss * (n - 1.0) + loss) / n;
        out.push(Some(rsi_from_averages(avg_gain, avg_loss)));
    }

    Ok(out)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}

/// EMA with `alpha = 2 / (period + 1)`, seeded by the SMA of the first
/// `period` values; the first `period - 1` slots are `None`.
pub fn ema_series(values: &[f64], period: usize) -> Result<Vec<Option<f64>>, IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::invalid_period("ema", "period must be > 0"));
    }
    if values.len() < period {
        return Err(IndicatorError::insufficient("ema", period, values.len()));
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;

    let mut out = vec![None; period - 1];
    out.push(Some(seed));

    let mut ema = seed;
    for &value in &values[period..] {
        ema = alpha * value + (1.0 - alpha) * ema;
        out.push(Some(ema));
    }

    Ok(out)
}

/// Latest MACD line, signal line and histogram.
///
/// # Errors
///
/// [`IndicatorError::InsufficientData`] with fewer than `slow + signal`
/// closes; [`IndicatorError::InvalidPeriod`] unless `0 < fast < slow` and
/// `signal > 0`.
pub fn macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> Result<MacdPoint, IndicatorError> {
    macd_series(closes, fast, slow, signal)?
        .last()
        .copied()
        .flatten()
        .ok_or_else(|| IndicatorError::insufficient("macd", slow + signal, closes.len()))
}

/// MACD for every close; slots before the signal line warms up are `None`.
pub fn macd_series(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> Result<Vec<Option<MacdPoint>>, IndicatorError> {
    if fast == 0 || signal == 0 {
        return Err(IndicatorError::invalid_period(
            "macd",
            "fast and signal periods must be > 0",
        ));
    }
    if fast >= slow {
        return Err(IndicatorError::invalid_period(
            "macd",
            format!("fast period {fast} must be below slow period {slow}"),
        ));
    }
    if closes.len() < slow + signal {
        return Err(IndicatorError::insufficient(
            "macd",
            slow + signal,
            closes.len(),
        ));
    }

    let fast_ema = ema_series(closes, fast)?;
    let slow_ema = ema_series(closes, slow)?;

    // MACD line exists from index slow - 1 onward.
    let line: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .filter_map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal_line = ema_series(&line, signal)?;

    let mut out = vec![None; slow - 1];
    out.extend(
        line.iter()
            .zip(signal_line)
            .map(|(&m, s)| s.map(|s| MacdPoint::new(m, s))),
    );

    Ok(out)
}

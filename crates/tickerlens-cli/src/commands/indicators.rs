use serde::Serialize;
use tickerlens_core::indicators::{macd_series, rsi_series};
use tickerlens_core::{IndicatorConfig, IndicatorError, MacdPoint, PriceSeries, Screener, Symbol};
use time::Date;

use crate::cli::IndicatorsArgs;
use crate::error::CliError;
use crate::output::{number, Table};

use super::CommandResult;

#[derive(Debug, Serialize)]
struct IndicatorsResponseData<'a> {
    symbol: &'a Symbol,
    config: IndicatorConfig,
    rows: &'a [IndicatorRow],
    unavailable: Vec<IndicatorError>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct IndicatorRow {
    date: Date,
    close: f64,
    rsi: Option<f64>,
    macd: Option<MacdPoint>,
}

pub async fn run(args: &IndicatorsArgs, screener: &Screener) -> Result<CommandResult, CliError> {
    let symbol = args.index.qualify(&args.symbol)?;
    let analysis = screener.analyze(&symbol).await?;
    let config = screener.config().indicators;

    let (rows, unavailable) = indicator_rows(&analysis.snapshot.prices, &config);
    let shown = tail(&rows, args.tail);

    let mut table = Table::new(vec!["DATE", "CLOSE", "RSI", "MACD", "SIGNAL", "HISTOGRAM"])
        .with_title(format!(
            "{symbol} RSI({}) MACD({},{},{})",
            config.rsi_period, config.macd_fast, config.macd_slow, config.macd_signal
        ));
    for row in shown {
        table.push_row(vec![
            row.date.to_string(),
            number(Some(row.close), 2),
            number(row.rsi, 1),
            number(row.macd.map(|p| p.macd), 4),
            number(row.macd.map(|p| p.signal), 4),
            number(row.macd.map(|p| p.histogram), 4),
        ]);
    }
    for missing in &unavailable {
        table.push_footer(format!("note: {missing}"));
    }

    let data = serde_json::to_value(IndicatorsResponseData {
        symbol: &symbol,
        config,
        rows: shown,
        unavailable,
    })?;

    Ok(CommandResult::new(data, table))
}

/// One row per close. An indicator without enough history stays `None`
/// for every row and its reason is returned alongside.
fn indicator_rows(
    prices: &PriceSeries,
    config: &IndicatorConfig,
) -> (Vec<IndicatorRow>, Vec<IndicatorError>) {
    let closes = prices.closes();
    let mut unavailable = Vec::new();

    let rsi = rsi_series(&closes, config.rsi_period).unwrap_or_else(|error| {
        unavailable.push(error);
        vec![None; closes.len()]
    });
    let macd = macd_series(
        &closes,
        config.macd_fast,
        config.macd_slow,
        config.macd_signal,
    )
    .unwrap_or_else(|error| {
        unavailable.push(error);
        vec![None; closes.len()]
    });

    let rows = prices
        .points()
        .iter()
        .zip(rsi)
        .zip(macd)
        .map(|((point, rsi), macd)| IndicatorRow {
            date: point.date,
            close: point.close,
            rsi,
            macd,
        })
        .collect();

    (rows, unavailable)
}

fn tail<T>(rows: &[T], count: Option<usize>) -> &[T] {
    match count {
        Some(count) => &rows[rows.len().saturating_sub(count)..],
        None => rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickerlens_core::PricePoint;
    use time::{Duration, Month};

    fn series(len: usize) -> PriceSeries {
        let start = Date::from_calendar_date(2024, Month::January, 1).expect("valid date");
        let points = (0..len)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.7).sin() * 5.0;
                PricePoint::new(start + Duration::days(i as i64), close).expect("valid point")
            })
            .collect();
        PriceSeries::new(Symbol::parse("PETR4.SA").expect("valid symbol"), points)
            .expect("valid series")
    }

    #[test]
    fn rows_align_with_closes() {
        let prices = series(60);
        let (rows, unavailable) = indicator_rows(&prices, &IndicatorConfig::default());

        assert!(unavailable.is_empty());
        assert_eq!(rows.len(), 60);
        assert!(rows[13].rsi.is_none());
        assert!(rows[14].rsi.is_some());
        assert!(rows[32].macd.is_none());
        assert!(rows[33].macd.is_some());
    }

    #[test]
    fn short_history_marks_macd_unavailable() {
        let prices = series(20);
        let (rows, unavailable) = indicator_rows(&prices, &IndicatorConfig::default());

        assert_eq!(rows.len(), 20);
        assert!(rows.iter().all(|row| row.macd.is_none()));
        assert!(rows[19].rsi.is_some());
        assert!(matches!(
            unavailable.as_slice(),
            [IndicatorError::InsufficientData { required: 35, available: 20, .. }]
        ));
    }

    #[test]
    fn tail_keeps_last_rows() {
        let rows = [1, 2, 3, 4];
        assert_eq!(tail(&rows, Some(2)), [3, 4]);
        assert_eq!(tail(&rows, Some(10)), [1, 2, 3, 4]);
        assert_eq!(tail(&rows, None), [1, 2, 3, 4]);
    }
}

use serde::Serialize;
use tickerlens_core::{
    Market, ScanFailure, ScanProgress, ScanSummary, ScreenFilter, Screener, Symbol,
    TickerAnalysis, UtcDateTime,
};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::cli::ScanArgs;
use crate::error::CliError;
use crate::output::{number, percent, text, Table};

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ScanResponseData<'a> {
    scan_id: Uuid,
    index: Market,
    started_at: UtcDateTime,
    elapsed_ms: u64,
    summary: ScanSummary,
    results: Vec<&'a TickerAnalysis>,
    failures: Vec<&'a ScanFailure>,
}

pub async fn run(args: &ScanArgs, screener: &Screener) -> Result<CommandResult, CliError> {
    let symbols = select_symbols(args)?;
    if symbols.is_empty() {
        return Err(CliError::Command(String::from("no tickers to scan")));
    }

    let report = if args.progress {
        let (sender, receiver) = mpsc::unbounded_channel();
        let printer = tokio::spawn(print_progress(receiver));
        let report = screener.scan_with_progress(&symbols, Some(sender)).await;
        // The sender is dropped with the scan, so the printer drains and exits.
        let _ = printer.await;
        report
    } else {
        screener.scan(&symbols).await
    };

    let filter = ScreenFilter {
        graham: args.graham,
        greenblatt: args.greenblatt,
        sort: args.sort,
        limit: args.limit,
    };
    let results = report.screen(&filter);
    let failures: Vec<&ScanFailure> = report.failures().collect();
    let summary = report.summary();

    let table = results_table(args.index, &results, &failures, &summary);
    let data = serde_json::to_value(ScanResponseData {
        scan_id: report.scan_id,
        index: args.index,
        started_at: report.started_at,
        elapsed_ms: report.elapsed_ms,
        summary,
        results,
        failures,
    })?;

    Ok(CommandResult::new(data, table))
}

fn select_symbols(args: &ScanArgs) -> Result<Vec<Symbol>, CliError> {
    if args.symbols.is_empty() {
        return Ok(args.index.symbols()?);
    }
    args.symbols
        .iter()
        .map(|raw| args.index.qualify(raw).map_err(CliError::from))
        .collect()
}

async fn print_progress(mut receiver: mpsc::UnboundedReceiver<ScanProgress>) {
    while let Some(progress) = receiver.recv().await {
        let status = if progress.ok { "ok" } else { "failed" };
        eprintln!(
            "[{}/{}] {} {status}",
            progress.completed, progress.total, progress.symbol
        );
    }
}

fn results_table(
    index: Market,
    results: &[&TickerAnalysis],
    failures: &[&ScanFailure],
    summary: &ScanSummary,
) -> Table {
    let mut table = Table::new(vec![
        "TICKER",
        "NAME",
        "PRICE",
        "P/L",
        "P/VP",
        "ROE",
        "RSI",
        "GRAHAM",
        "GREENBLATT",
    ])
    .with_title(format!("{} screen", index.display_name()));

    for analysis in results {
        let marker = if analysis.is_double_cheap() { "*" } else { "" };
        table.push_row(vec![
            format!("{}{marker}", analysis.symbol),
            text(analysis.name.as_deref()),
            number(analysis.last_price, 2),
            number(analysis.ratios.pe_ratio, 2),
            number(analysis.ratios.price_to_book, 2),
            percent(analysis.ratios.return_on_equity),
            number(analysis.indicators.rsi, 1),
            analysis.verdict.graham.to_string(),
            analysis.verdict.greenblatt.to_string(),
        ]);
    }

    table.push_footer(format!(
        "{} scanned, {} ok, {} failed | graham cheap {} | greenblatt cheap {} | both {} (*)",
        summary.total,
        summary.succeeded,
        summary.failed,
        summary.graham_cheap,
        summary.greenblatt_cheap,
        summary.both_cheap,
    ));
    for failure in failures {
        table.push_footer(format!(
            "  {} {}: {}",
            failure.symbol, failure.code, failure.message
        ));
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(index: Market, symbols: &[&str]) -> ScanArgs {
        ScanArgs {
            index,
            symbols: symbols.iter().map(|s| (*s).to_owned()).collect(),
            graham: None,
            greenblatt: None,
            sort: None,
            limit: None,
            progress: false,
        }
    }

    #[test]
    fn explicit_b3_tickers_are_qualified() {
        let symbols =
            select_symbols(&args(Market::Ibovespa, &["petr4", "VALE3.SA"])).expect("valid");

        let rendered: Vec<&str> = symbols.iter().map(Symbol::as_str).collect();
        assert_eq!(rendered, ["PETR4.SA", "VALE3.SA"]);
    }

    #[test]
    fn empty_ticker_list_means_whole_index() {
        let symbols = select_symbols(&args(Market::Sp500, &[])).expect("valid");
        assert_eq!(symbols.len(), Market::Sp500.tickers().len());
    }

    #[test]
    fn invalid_ticker_is_a_validation_error() {
        let error = select_symbols(&args(Market::Sp500, &["not a ticker"]))
            .expect_err("spaces are not allowed");
        assert_eq!(error.exit_code(), 2);
    }
}

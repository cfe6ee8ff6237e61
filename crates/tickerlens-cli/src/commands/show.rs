use serde::Serialize;
use tickerlens_core::{
    CompanyProfile, IndicatorResult, Officer, Screener, TickerAnalysis, UtcDateTime,
    ValuationRatios, ValuationVerdict,
};

use crate::cli::ShowArgs;
use crate::error::CliError;
use crate::output::{number, percent, text, Table};

use super::CommandResult;

const MAX_OFFICERS: usize = 5;

#[derive(Debug, Serialize)]
struct ShowResponseData<'a> {
    symbol: &'a str,
    currency: Option<&'a str>,
    last_price: Option<f64>,
    profile: ProfileView<'a>,
    ratios: &'a ValuationRatios,
    verdict: &'a ValuationVerdict,
    indicators: &'a IndicatorResult,
    fetched_at: UtcDateTime,
}

#[derive(Debug, Serialize)]
struct ProfileView<'a> {
    name: Option<&'a str>,
    sector: Option<&'a str>,
    industry: Option<&'a str>,
    website: Option<&'a str>,
    country: Option<&'a str>,
    summary: Option<&'a str>,
    officers: &'a [Officer],
}

impl<'a> ProfileView<'a> {
    fn new(profile: &'a CompanyProfile) -> Self {
        let shown = profile.officers.len().min(MAX_OFFICERS);
        Self {
            name: profile.name.as_deref(),
            sector: profile.sector.as_deref(),
            industry: profile.industry.as_deref(),
            website: profile.website.as_deref(),
            country: profile.country.as_deref(),
            summary: profile.summary.as_deref(),
            officers: &profile.officers[..shown],
        }
    }
}

pub async fn run(args: &ShowArgs, screener: &Screener) -> Result<CommandResult, CliError> {
    let symbol = args.index.qualify(&args.symbol)?;
    let analysis = screener.analyze(&symbol).await?;

    let profile = ProfileView::new(&analysis.snapshot.fundamentals.profile);
    let tables = detail_tables(&analysis, &profile);
    let data = serde_json::to_value(ShowResponseData {
        symbol: analysis.symbol.as_str(),
        currency: analysis.currency.as_deref(),
        last_price: analysis.last_price,
        profile,
        ratios: &analysis.ratios,
        verdict: &analysis.verdict,
        indicators: &analysis.indicators,
        fetched_at: analysis.fetched_at,
    })?;

    Ok(CommandResult { data, tables })
}

fn detail_tables(analysis: &TickerAnalysis, profile: &ProfileView<'_>) -> Vec<Table> {
    let title = match profile.name {
        Some(name) => format!("{} - {name}", analysis.symbol),
        None => analysis.symbol.to_string(),
    };

    let mut overview = Table::new(vec!["FIELD", "VALUE"]).with_title(title);
    let ratios = &analysis.ratios;
    let rows = [
        ("sector", text(profile.sector)),
        ("industry", text(profile.industry)),
        ("country", text(profile.country)),
        ("website", text(profile.website)),
        ("currency", text(analysis.currency.as_deref())),
        ("price", number(analysis.last_price, 2)),
        ("p/l", number(ratios.pe_ratio, 2)),
        ("p/vp", number(ratios.price_to_book, 2)),
        ("roe", percent(ratios.return_on_equity)),
        ("roa", percent(ratios.return_on_assets)),
        ("ebitda margin", percent(ratios.ebitda_margin)),
        ("dividend yield", percent(ratios.dividend_yield)),
        ("graham", analysis.verdict.graham.to_string()),
        ("greenblatt", analysis.verdict.greenblatt.to_string()),
        ("rsi", rsi_cell(&analysis.indicators)),
        ("macd", macd_cell(&analysis.indicators)),
        ("fetched at", analysis.fetched_at.to_string()),
    ];
    for (field, value) in rows {
        overview.push_row(vec![field.to_owned(), value]);
    }
    for missing in &analysis.indicators.unavailable {
        overview.push_footer(format!("note: {missing}"));
    }

    let mut tables = vec![overview];
    if !profile.officers.is_empty() {
        let mut officers = Table::new(vec!["OFFICER", "TITLE"]).with_title("Officers");
        for officer in profile.officers {
            officers.push_row(vec![
                text(officer.name.as_deref()),
                text(officer.title.as_deref()),
            ]);
        }
        tables.push(officers);
    }
    tables
}

fn rsi_cell(indicators: &IndicatorResult) -> String {
    match (indicators.rsi, indicators.rsi_zone) {
        (Some(value), Some(zone)) => format!("{value:.1} ({})", zone.as_str()),
        (value, _) => number(value, 1),
    }
}

fn macd_cell(indicators: &IndicatorResult) -> String {
    indicators.macd.map_or_else(
        || String::from("-"),
        |point| {
            format!(
                "{:.3} / signal {:.3} / hist {:.3}",
                point.macd, point.signal, point.histogram
            )
        },
    )
}

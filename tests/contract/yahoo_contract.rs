//! Yahoo payload contract: canned quoteSummary and chart bodies go through
//! the real adapter behind a scripted transport. No network access.

use std::sync::{Arc, Mutex};

use tickerlens_core::{
    HistoryRange, HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse, MarketDataSource,
    ScreenerConfig, Screener, SourceErrorKind, Symbol, ValuationVerdict, Verdict, YahooAdapter,
};

const DAY: i64 = 86_400;
// 2024-01-02 13:00 UTC
const FIRST_SESSION: i64 = 1_704_200_400;

const PETR4_SUMMARY: &str = r#"{
  "quoteSummary": {
    "result": [{
      "price": {
        "longName": "Petroleo Brasileiro S.A. - Petrobras",
        "shortName": "PETROBRAS PN",
        "currency": "BRL",
        "regularMarketPrice": {"raw": 38.5, "fmt": "38.50"}
      },
      "summaryDetail": {
        "trailingPE": {"raw": 4.2, "fmt": "4.20"},
        "dividendYield": {"raw": 0.12, "fmt": "12.00%"}
      },
      "defaultKeyStatistics": {
        "priceToBook": {"raw": 1.1, "fmt": "1.10"}
      },
      "financialData": {
        "currentPrice": {"raw": 38.42, "fmt": "38.42"},
        "returnOnEquity": {"raw": 0.31, "fmt": "31.00%"},
        "returnOnAssets": {},
        "ebitdaMargins": {"raw": "Infinity", "fmt": "Infinity"}
      },
      "assetProfile": {
        "sector": "Energy",
        "industry": "Oil & Gas Integrated",
        "country": "Brazil",
        "website": "https://petrobras.com.br",
        "longBusinessSummary": "Explores, produces and sells oil and gas.",
        "companyOfficers": [
          {"name": "Ms. Magda Chambriard", "title": "CEO", "age": 66},
          {"name": "Mr. Fernando Melgarejo", "title": "CFO"}
        ]
      }
    }],
    "error": null
  }
}"#;

const NOT_FOUND_SUMMARY: &str = r#"{
  "quoteSummary": {
    "result": null,
    "error": {"code": "Not Found", "description": "Quote not found for symbol: NOPE3.SA"}
  }
}"#;

/// Serves the session handshake and one canned body per endpoint.
struct CannedYahoo {
    summary: HttpResponse,
    chart: HttpResponse,
    urls: Mutex<Vec<String>>,
}

impl CannedYahoo {
    fn new(summary: HttpResponse, chart: HttpResponse) -> Self {
        Self {
            summary,
            chart,
            urls: Mutex::new(Vec::new()),
        }
    }
}

impl HttpClient for CannedYahoo {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        self.urls
            .lock()
            .expect("urls lock")
            .push(request.url.clone());

        let response = if request.url.contains("fc.yahoo.com") {
            Ok(HttpResponse::new(404, ""))
        } else if request.url.contains("getcrumb") {
            Ok(HttpResponse::ok_json("abc123crumb"))
        } else if request.url.contains("quoteSummary") {
            Ok(self.summary.clone())
        } else if request.url.contains("chart") {
            Ok(self.chart.clone())
        } else {
            Err(HttpError::new(format!("unexpected url {}", request.url)))
        };
        Box::pin(async move { response })
    }
}

fn chart_body(closes: &[Option<f64>]) -> String {
    let timestamps: Vec<i64> = (0..closes.len() as i64)
        .map(|i| FIRST_SESSION + i * DAY)
        .collect();
    serde_json::json!({
        "chart": {
            "result": [{
                "meta": {"currency": "BRL", "symbol": "PETR4.SA"},
                "timestamp": timestamps,
                "indicators": {"quote": [{"close": closes, "open": closes}]}
            }],
            "error": null
        }
    })
    .to_string()
}

fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid symbol")
}

#[tokio::test]
async fn quote_summary_maps_ratios_profile_and_officers() {
    let client = Arc::new(CannedYahoo::new(
        HttpResponse::ok_json(PETR4_SUMMARY),
        HttpResponse::ok_json(chart_body(&[])),
    ));
    let adapter = YahooAdapter::with_http_client(client.clone());

    let fundamentals = adapter
        .quote_summary(&symbol("PETR4.SA"))
        .await
        .expect("summary parses");

    assert_eq!(fundamentals.currency.as_deref(), Some("BRL"));
    let ratios = fundamentals.ratios;
    assert_eq!(ratios.current_price, Some(38.42));
    assert_eq!(ratios.pe_ratio, Some(4.2));
    assert_eq!(ratios.price_to_book, Some(1.1));
    assert_eq!(ratios.return_on_equity, Some(0.31));
    assert_eq!(ratios.dividend_yield, Some(0.12));
    assert_eq!(ratios.return_on_assets, None, "empty object reads as missing");
    assert_eq!(ratios.ebitda_margin, None, "Infinity reads as missing");

    let profile = fundamentals.profile;
    assert_eq!(
        profile.name.as_deref(),
        Some("Petroleo Brasileiro S.A. - Petrobras")
    );
    assert_eq!(profile.sector.as_deref(), Some("Energy"));
    assert_eq!(profile.officers.len(), 2);
    assert_eq!(profile.officers[1].title.as_deref(), Some("CFO"));

    let urls = client.urls.lock().expect("urls lock");
    let summary_url = urls
        .iter()
        .find(|url| url.contains("quoteSummary"))
        .expect("summary requested");
    assert!(summary_url.contains("PETR4.SA"));
    assert!(summary_url.contains("crumb=abc123crumb"));
}

#[tokio::test]
async fn negative_price_and_yield_read_as_missing_without_failing_the_ticker() {
    let summary = PETR4_SUMMARY
        .replace(
            r#""dividendYield": {"raw": 0.12, "fmt": "12.00%"}"#,
            r#""dividendYield": {"raw": -0.01, "fmt": "-1.00%"}"#,
        )
        .replace(
            r#""currentPrice": {"raw": 38.42, "fmt": "38.42"}"#,
            r#""currentPrice": {"raw": -1.0, "fmt": "-1.00"}"#,
        );
    assert!(summary.contains("-0.01") && summary.contains("-1.0"));
    let client = Arc::new(CannedYahoo::new(
        HttpResponse::ok_json(summary),
        HttpResponse::ok_json(chart_body(&[])),
    ));
    let adapter = YahooAdapter::with_http_client(client);

    let fundamentals = adapter
        .quote_summary(&symbol("PETR4.SA"))
        .await
        .expect("valuation inputs are intact");

    let ratios = &fundamentals.ratios;
    assert_eq!(ratios.dividend_yield, None);
    assert_eq!(ratios.current_price, Some(38.5), "falls back to the market price");
    assert_eq!((ratios.pe_ratio, ratios.price_to_book), (Some(4.2), Some(1.1)));
    assert_eq!(ratios.return_on_equity, Some(0.31));

    let verdict = ValuationVerdict::classify(ratios);
    assert_eq!(verdict.graham, Verdict::Cheap);
    assert_eq!(verdict.greenblatt, Verdict::Cheap);
}

#[tokio::test]
async fn chart_skips_null_closes_and_keeps_date_order() {
    let client = Arc::new(CannedYahoo::new(
        HttpResponse::ok_json(PETR4_SUMMARY),
        HttpResponse::ok_json(chart_body(&[Some(37.9), None, Some(38.1), Some(38.42)])),
    ));
    let adapter = YahooAdapter::with_http_client(client);

    let series = adapter
        .history(&symbol("PETR4.SA"), HistoryRange::SixMonths)
        .await
        .expect("chart parses");

    assert_eq!(series.closes(), vec![37.9, 38.1, 38.42]);
    let dates = series.dates();
    assert_eq!(dates[0].to_string(), "2024-01-02");
    assert_eq!(dates[2].to_string(), "2024-01-05");
}

#[tokio::test]
async fn unknown_ticker_is_not_found_with_or_without_http_404() {
    for status in [200, 404] {
        let client = Arc::new(CannedYahoo::new(
            HttpResponse::new(status, NOT_FOUND_SUMMARY),
            HttpResponse::ok_json(chart_body(&[])),
        ));
        let adapter = YahooAdapter::with_http_client(client);

        let error = adapter
            .quote_summary(&symbol("NOPE3.SA"))
            .await
            .expect_err("unknown ticker");

        assert_eq!(error.kind(), SourceErrorKind::NotFound, "status {status}");
        assert!(!error.retryable());
    }
}

#[tokio::test]
async fn malformed_body_is_an_invalid_response() {
    let client = Arc::new(CannedYahoo::new(
        HttpResponse::ok_json("<html>maintenance</html>"),
        HttpResponse::ok_json(chart_body(&[])),
    ));
    let adapter = YahooAdapter::with_http_client(client);

    let error = adapter
        .quote_summary(&symbol("PETR4.SA"))
        .await
        .expect_err("html is not json");

    assert_eq!(error.kind(), SourceErrorKind::InvalidResponse);
}

#[tokio::test]
async fn screener_classifies_a_canned_ticker_end_to_end() {
    let client = Arc::new(CannedYahoo::new(
        HttpResponse::ok_json(PETR4_SUMMARY),
        HttpResponse::ok_json(chart_body(&[Some(37.9), Some(38.1), Some(38.42)])),
    ));
    let adapter = Arc::new(YahooAdapter::with_http_client(client));
    let screener = Screener::from_config(
        adapter,
        ScreenerConfig::default().with_requests_per_second(0),
    );

    let analysis = screener
        .analyze(&symbol("PETR4.SA"))
        .await
        .expect("analysis succeeds");

    // 4.2 x 1.1 = 4.62 < 22.5; 4.2 < 15 and 31% > 15%.
    assert_eq!(analysis.verdict.graham, Verdict::Cheap);
    assert_eq!(analysis.verdict.greenblatt, Verdict::Cheap);
    assert!(analysis.is_double_cheap());
    assert_eq!(analysis.last_price, Some(38.42));
    // Three closes are not enough history for either indicator.
    assert_eq!(analysis.indicators.rsi, None);
    assert_eq!(analysis.indicators.macd, None);
    assert_eq!(analysis.indicators.unavailable.len(), 2);
}

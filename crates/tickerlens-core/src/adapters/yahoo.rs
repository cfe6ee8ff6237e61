use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::data_source::{MarketDataSource, SourceError, SourceFuture};
use crate::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
use crate::throttling::RequestThrottle;
use crate::{
    CompanyProfile, Fundamentals, HistoryRange, Officer, PricePoint, PriceSeries, Symbol,
    UtcDateTime, ValuationRatios,
};

const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URLS: [&str; 2] = [
    "https://query1.finance.yahoo.com/v1/test/getcrumb",
    "https://query2.finance.yahoo.com/v1/test/getcrumb",
];
const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const CHART_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const SUMMARY_MODULES: &str = "price,summaryDetail,defaultKeyStatistics,financialData,assetProfile";
const REFERER: &str = "https://finance.yahoo.com/";

// ============================================================================
// Yahoo Auth Manager - Handles cookie/crumb authentication
// ============================================================================

#[derive(Debug, Clone)]
struct CachedCrumb {
    value: String,
    obtained_at: Instant,
}

/// Manages Yahoo Finance cookie/crumb authentication.
///
/// Yahoo's unofficial API requires:
/// 1. Session cookie from fc.yahoo.com (kept by the client's cookie jar)
/// 2. Crumb token from /v1/test/getcrumb, appended to every query
///
/// The crumb lives behind an async mutex held across the refresh, so
/// concurrent workers never race to refresh it.
#[derive(Debug)]
pub struct YahooAuthManager {
    crumb: tokio::sync::Mutex<Option<CachedCrumb>>,
    ttl: Duration,
}

impl Default for YahooAuthManager {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600))
    }
}

impl YahooAuthManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            crumb: tokio::sync::Mutex::new(None),
            ttl,
        }
    }

    /// Current crumb, refreshing it if missing or older than the TTL. Each
    /// handshake request waits on `throttle` first.
    pub async fn crumb(
        &self,
        http_client: &dyn HttpClient,
        throttle: &RequestThrottle,
        timeout_ms: u64,
    ) -> Result<String, SourceError> {
        let mut slot = self.crumb.lock().await;
        if let Some(cached) = slot.as_ref() {
            if cached.obtained_at.elapsed() < self.ttl {
                return Ok(cached.value.clone());
            }
        }

        let value = fetch_crumb(http_client, throttle, timeout_ms).await?;
        *slot = Some(CachedCrumb {
            value: value.clone(),
            obtained_at: Instant::now(),
        });
        Ok(value)
    }

    /// Drop the cached crumb so the next call performs a fresh handshake.
    pub async fn invalidate(&self) {
        *self.crumb.lock().await = None;
    }
}

async fn fetch_crumb(
    http_client: &dyn HttpClient,
    throttle: &RequestThrottle,
    timeout_ms: u64,
) -> Result<String, SourceError> {
    debug!("refreshing yahoo session crumb");

    // The cookie endpoint answers 404 while still setting the session cookie.
    let cookie_request = HttpRequest::get(COOKIE_URL)
        .with_header("referer", REFERER)
        .with_timeout_ms(timeout_ms);
    throttle.acquire().await;
    http_client
        .execute(cookie_request)
        .await
        .map_err(|e| transport_error("yahoo cookie handshake", &e))?;

    for endpoint in CRUMB_URLS {
        let crumb_request = HttpRequest::get(endpoint)
            .with_header("referer", REFERER)
            .with_timeout_ms(timeout_ms);

        throttle.acquire().await;
        match http_client.execute(crumb_request).await {
            Ok(response) if response.status == 429 => {
                return Err(SourceError::rate_limited(
                    "yahoo rate limited while fetching crumb",
                ));
            }
            Ok(response) if response.is_success() => {
                let body = response.body.trim();
                if body.contains("<html") || body.contains("<!DOCTYPE") {
                    continue;
                }
                if body.to_ascii_lowercase().contains("too many requests") {
                    return Err(SourceError::rate_limited(
                        "yahoo rate limited while fetching crumb",
                    ));
                }
                if !body.is_empty() && body.len() < 100 && !body.contains(' ') {
                    return Ok(body.to_owned());
                }
            }
            Ok(_) => continue,
            Err(error) => {
                warn!(endpoint, error = %error, "yahoo crumb endpoint failed");
                continue;
            }
        }
    }

    Err(SourceError::unavailable(
        "failed to fetch yahoo crumb from all endpoints",
    ))
}

// ============================================================================
// Yahoo Adapter
// ============================================================================

/// Yahoo Finance adapter: `quoteSummary` for fundamentals, `chart` for closes.
///
/// Data requests are throttled by the caller. The session handshake happens
/// in here, so it waits on the adapter's own [`RequestThrottle`]; pass the
/// fetcher's throttle to [`YahooAdapter::with_throttle`] to share one budget.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    auth_manager: Arc<YahooAuthManager>,
    throttle: RequestThrottle,
    timeout_ms: u64,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()))
    }
}

impl YahooAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            auth_manager: Arc::new(YahooAuthManager::default()),
            throttle: RequestThrottle::unlimited(),
            timeout_ms: 10_000,
        }
    }

    pub fn with_throttle(mut self, throttle: RequestThrottle) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// GET `endpoint` with the session crumb appended. A rejected crumb (401)
    /// triggers one re-handshake and a second attempt; nothing else is retried.
    async fn get_with_crumb(&self, endpoint: &str) -> Result<HttpResponse, SourceError> {
        let mut refreshed = false;
        loop {
            let crumb = self
                .auth_manager
                .crumb(self.http_client.as_ref(), &self.throttle, self.timeout_ms)
                .await?;
            let separator = if endpoint.contains('?') { '&' } else { '?' };
            let url = format!("{endpoint}{separator}crumb={}", urlencoding::encode(&crumb));

            let request = HttpRequest::get(url)
                .with_header("referer", REFERER)
                .with_timeout_ms(self.timeout_ms);
            let response = self
                .http_client
                .execute(request)
                .await
                .map_err(|e| transport_error("yahoo", &e))?;

            if response.status == 401 && !refreshed {
                debug!(endpoint, "yahoo rejected crumb; refreshing session");
                self.auth_manager.invalidate().await;
                refreshed = true;
                continue;
            }

            return Ok(response);
        }
    }

    async fn fetch_quote_summary(&self, symbol: &Symbol) -> Result<Fundamentals, SourceError> {
        let endpoint = format!(
            "{QUOTE_SUMMARY_URL}/{}?modules={SUMMARY_MODULES}",
            urlencoding::encode(symbol.as_str())
        );
        let response = self.get_with_crumb(&endpoint).await?;
        check_status(&response, symbol)?;
        parse_quote_summary(symbol, &response.body)
    }

    async fn fetch_history(
        &self,
        symbol: &Symbol,
        range: HistoryRange,
    ) -> Result<PriceSeries, SourceError> {
        let endpoint = format!(
            "{CHART_URL}/{}?range={}&interval=1d&includeAdjustedClose=false",
            urlencoding::encode(symbol.as_str()),
            range.as_str()
        );
        let response = self.get_with_crumb(&endpoint).await?;
        check_status(&response, symbol)?;
        parse_chart(symbol, &response.body)
    }
}

impl MarketDataSource for YahooAdapter {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    fn quote_summary<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, Fundamentals> {
        Box::pin(self.fetch_quote_summary(symbol))
    }

    fn history<'a>(
        &'a self,
        symbol: &'a Symbol,
        range: HistoryRange,
    ) -> SourceFuture<'a, PriceSeries> {
        Box::pin(self.fetch_history(symbol, range))
    }
}

fn transport_error(context: &str, error: &HttpError) -> SourceError {
    let message = format!("{context}: {error}");
    if error.timed_out() {
        SourceError::timeout(message)
    } else {
        SourceError::unavailable(message)
    }
}

fn check_status(response: &HttpResponse, symbol: &Symbol) -> Result<(), SourceError> {
    match response.status {
        200..=299 => Ok(()),
        404 => Err(SourceError::not_found(
            api_error_description(&response.body)
                .unwrap_or_else(|| format!("yahoo has no data for '{symbol}'")),
        )),
        429 => Err(SourceError::rate_limited(format!(
            "yahoo rate limited request for '{symbol}'"
        ))),
        400..=499 => Err(SourceError::invalid_response(format!(
            "yahoo rejected request for '{symbol}' with status {}",
            response.status
        ))),
        status => Err(SourceError::unavailable(format!(
            "yahoo returned status {status} for '{symbol}'"
        ))),
    }
}

/// Pulls `description` out of either envelope's `error` object.
fn api_error_description(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["quoteSummary", "chart"].iter().find_map(|envelope| {
        value
            .get(envelope)?
            .get("error")?
            .get("description")?
            .as_str()
            .map(str::to_owned)
    })
}

fn classify_api_error(error: YahooApiError) -> SourceError {
    if error.code.eq_ignore_ascii_case("Not Found") {
        SourceError::not_found(error.description)
    } else {
        SourceError::unavailable(format!(
            "yahoo API error {}: {}",
            error.code, error.description
        ))
    }
}

fn parse_quote_summary(symbol: &Symbol, body: &str) -> Result<Fundamentals, SourceError> {
    let response: YahooQuoteSummaryResponse = serde_json::from_str(body).map_err(|e| {
        SourceError::invalid_response(format!("failed to parse yahoo quoteSummary: {e}"))
    })?;
    let summary = response.quote_summary;

    if let Some(error) = summary.error {
        return Err(classify_api_error(error));
    }

    let result = summary
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| SourceError::not_found(format!("quote not found for '{symbol}'")))?;

    let price = result.price.unwrap_or_default();
    let detail = result.summary_detail.unwrap_or_default();
    let stats = result.default_key_statistics.unwrap_or_default();
    let financial = result.financial_data.unwrap_or_default();
    let profile = result.asset_profile.unwrap_or_default();

    let ratios = ValuationRatios {
        current_price: non_negative(&financial.current_price)
            .or_else(|| non_negative(&price.regular_market_price)),
        pe_ratio: raw(&detail.trailing_pe),
        price_to_book: raw(&stats.price_to_book),
        return_on_equity: raw(&financial.return_on_equity),
        return_on_assets: raw(&financial.return_on_assets),
        ebitda_margin: raw(&financial.ebitda_margins),
        dividend_yield: non_negative(&detail.dividend_yield),
    };

    let officers = profile
        .company_officers
        .into_iter()
        .map(|officer| Officer {
            name: officer.name,
            title: officer.title,
        })
        .collect();

    let profile = CompanyProfile {
        name: price.long_name.or(price.short_name),
        sector: profile.sector,
        industry: profile.industry,
        website: profile.website,
        country: profile.country,
        summary: profile.long_business_summary,
        officers,
    };

    Fundamentals::new(
        symbol.clone(),
        UtcDateTime::now(),
        price.currency,
        ratios,
        profile,
    )
    .map_err(|e| SourceError::invalid_response(e.to_string()))
}

fn parse_chart(symbol: &Symbol, body: &str) -> Result<PriceSeries, SourceError> {
    let response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::invalid_response(format!("failed to parse yahoo chart: {e}")))?;
    let chart = response.chart;

    if let Some(error) = chart.error {
        return Err(classify_api_error(error));
    }

    let result = chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| SourceError::not_found(format!("no chart data for '{symbol}'")))?;

    // A listed ticker with no sessions in range comes back without timestamps.
    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|quote| quote.close)
        .unwrap_or_default();

    let points = timestamps
        .iter()
        .zip(closes)
        .filter_map(|(&ts, close)| {
            let date = UtcDateTime::from_unix_timestamp(ts)?.date();
            PricePoint::new(date, close?).ok()
        })
        .collect();

    Ok(PriceSeries::from_unordered(symbol.clone(), points))
}

fn raw(value: &Option<YahooRawValue>) -> Option<f64> {
    value.as_ref().and_then(YahooRawValue::to_option)
}

/// Prices and yields below zero are provider noise; they read as missing.
fn non_negative(value: &Option<YahooRawValue>) -> Option<f64> {
    raw(value).filter(|value| *value >= 0.0)
}

// ============================================================================
// Yahoo Finance API response structures
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
struct YahooApiError {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: YahooQuoteSummaryData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteSummaryData {
    #[serde(default)]
    result: Option<Vec<YahooQuoteSummaryResult>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteSummaryResult {
    #[serde(default)]
    price: Option<YahooPriceData>,
    #[serde(rename = "summaryDetail", default)]
    summary_detail: Option<YahooSummaryDetailData>,
    #[serde(rename = "defaultKeyStatistics", default)]
    default_key_statistics: Option<YahooDefaultKeyStatisticsData>,
    #[serde(rename = "financialData", default)]
    financial_data: Option<YahooFinancialData>,
    #[serde(rename = "assetProfile", default)]
    asset_profile: Option<YahooAssetProfile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooPriceData {
    #[serde(rename = "longName", default)]
    long_name: Option<String>,
    #[serde(rename = "shortName", default)]
    short_name: Option<String>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<YahooRawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooSummaryDetailData {
    #[serde(rename = "trailingPE", default)]
    trailing_pe: Option<YahooRawValue>,
    #[serde(rename = "dividendYield", default)]
    dividend_yield: Option<YahooRawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooDefaultKeyStatisticsData {
    #[serde(rename = "priceToBook", default)]
    price_to_book: Option<YahooRawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooFinancialData {
    #[serde(rename = "currentPrice", default)]
    current_price: Option<YahooRawValue>,
    #[serde(rename = "returnOnEquity", default)]
    return_on_equity: Option<YahooRawValue>,
    #[serde(rename = "returnOnAssets", default)]
    return_on_assets: Option<YahooRawValue>,
    #[serde(rename = "ebitdaMargins", default)]
    ebitda_margins: Option<YahooRawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooAssetProfile {
    #[serde(default)]
    sector: Option<String>,
    #[serde(default)]
    industry: Option<String>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(rename = "longBusinessSummary", default)]
    long_business_summary: Option<String>,
    #[serde(rename = "companyOfficers", default)]
    company_officers: Vec<YahooOfficer>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooOfficer {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

/// Yahoo wraps numbers as `{"raw": 1.5, "fmt": "1.50"}`; `raw` is sometimes
/// the string `"Infinity"` or missing altogether (`{}`).
#[derive(Debug, Clone, Deserialize)]
struct YahooRawValue {
    #[serde(default)]
    raw: Option<Value>,
}

impl YahooRawValue {
    /// Yahoo reports unknown ratios as 0; treat that, NaN and infinities as absent.
    fn to_option(&self) -> Option<f64> {
        self.raw
            .as_ref()
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite() && *v != 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::HttpFuture;
    use std::sync::Mutex;

    /// Answers by URL substring and records every URL it saw.
    #[derive(Debug, Default)]
    struct ScriptedHttpClient {
        routes: Mutex<Vec<(String, Vec<HttpResponse>)>>,
        requests: Mutex<Vec<String>>,
    }

    impl ScriptedHttpClient {
        fn route(self, needle: &str, responses: Vec<HttpResponse>) -> Self {
            self.routes
                .lock()
                .expect("routes lock")
                .push((needle.to_owned(), responses));
            self
        }

        fn with_session(self) -> Self {
            self.route("fc.yahoo.com", vec![HttpResponse::new(404, "")])
                .route("getcrumb", vec![HttpResponse::ok_json("crumb-1")])
        }

        fn requests_matching(&self, needle: &str) -> Vec<String> {
            self.requests
                .lock()
                .expect("requests lock")
                .iter()
                .filter(|url| url.contains(needle))
                .cloned()
                .collect()
        }
    }

    impl HttpClient for ScriptedHttpClient {
        fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
            self.requests
                .lock()
                .expect("requests lock")
                .push(request.url.clone());

            let mut routes = self.routes.lock().expect("routes lock");
            let response = routes
                .iter_mut()
                .find(|(needle, _)| request.url.contains(needle.as_str()))
                .map(|(_, responses)| {
                    // The last scripted response repeats once the script runs out.
                    if responses.len() > 1 {
                        responses.remove(0)
                    } else {
                        responses[0].clone()
                    }
                })
                .ok_or_else(|| HttpError::new(format!("unscripted url {}", request.url)));
            Box::pin(async move { response })
        }
    }

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    #[tokio::test]
    async fn crumb_is_fetched_once_and_appended_to_queries() {
        let client = Arc::new(ScriptedHttpClient::default().with_session().route(
            "/v8/finance/chart/",
            vec![HttpResponse::ok_json(
                r#"{"chart":{"result":[{"timestamp":[1709303400],"indicators":{"quote":[{"close":[37.5]}]}}],"error":null}}"#,
            )],
        ));
        let adapter = YahooAdapter::with_http_client(client.clone());

        adapter
            .history(&symbol("PETR4.SA"), HistoryRange::OneMonth)
            .await
            .expect("history");
        adapter
            .history(&symbol("PETR4.SA"), HistoryRange::OneMonth)
            .await
            .expect("history");

        assert_eq!(client.requests_matching("getcrumb").len(), 1);
        let charts = client.requests_matching("/v8/finance/chart/PETR4.SA");
        assert_eq!(charts.len(), 2);
        assert!(charts[0].contains("range=1mo"));
        assert!(charts[0].ends_with("&crumb=crumb-1"));
    }

    #[tokio::test]
    async fn rejected_crumb_triggers_one_rehandshake() {
        let client = Arc::new(ScriptedHttpClient::default().with_session().route(
            "/v8/finance/chart/",
            vec![
                HttpResponse::new(401, "Invalid Crumb"),
                HttpResponse::ok_json(
                    r#"{"chart":{"result":[{"timestamp":[],"indicators":{"quote":[{"close":[]}]}}]}}"#,
                ),
            ],
        ));
        let adapter = YahooAdapter::with_http_client(client.clone());

        let series = adapter
            .history(&symbol("AAPL"), HistoryRange::FiveDays)
            .await
            .expect("second attempt succeeds");

        assert!(series.is_empty());
        assert_eq!(client.requests_matching("getcrumb").len(), 2);
    }

    #[tokio::test]
    async fn session_handshake_spends_the_shared_request_budget() {
        let client = Arc::new(ScriptedHttpClient::default().with_session().route(
            "/v8/finance/chart/",
            vec![HttpResponse::ok_json(
                r#"{"chart":{"result":[{"timestamp":[],"indicators":{"quote":[{"close":[]}]}}]}}"#,
            )],
        ));
        let throttle = RequestThrottle::per_second(3);
        let adapter = YahooAdapter::with_http_client(client.clone()).with_throttle(throttle.clone());

        throttle.acquire().await;
        adapter
            .history(&symbol("ITSA4.SA"), HistoryRange::FiveDays)
            .await
            .expect("history");

        // One cell for the data call plus two for the cookie and crumb requests.
        assert_eq!(client.requests_matching("fc.yahoo.com").len(), 1);
        assert_eq!(client.requests_matching("getcrumb").len(), 1);
        assert!(!throttle.try_acquire());
    }

    #[tokio::test]
    async fn status_codes_map_to_source_error_kinds() {
        let cases = [
            (404, SourceErrorKind::NotFound),
            (429, SourceErrorKind::RateLimited),
            (400, SourceErrorKind::InvalidResponse),
            (503, SourceErrorKind::Unavailable),
        ];

        for (status, expected) in cases {
            let client = Arc::new(ScriptedHttpClient::default().with_session().route(
                "quoteSummary",
                vec![HttpResponse::new(status, "")],
            ));
            let adapter = YahooAdapter::with_http_client(client);

            let error = adapter
                .quote_summary(&symbol("MSFT"))
                .await
                .expect_err("non-2xx must fail");
            assert_eq!(error.kind(), expected, "status {status}");
        }
    }

    #[tokio::test]
    async fn transport_timeouts_are_reported_as_timeouts() {
        #[derive(Debug)]
        struct TimeoutClient;

        impl HttpClient for TimeoutClient {
            fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
                let response = if request.url.contains("getcrumb") {
                    Ok(HttpResponse::ok_json("crumb"))
                } else if request.url.contains("fc.yahoo.com") {
                    Ok(HttpResponse::new(404, ""))
                } else {
                    Err(HttpError::timeout("request timeout: deadline elapsed"))
                };
                Box::pin(async move { response })
            }
        }

        let adapter = YahooAdapter::with_http_client(Arc::new(TimeoutClient));
        let error = adapter
            .quote_summary(&symbol("WEGE3.SA"))
            .await
            .expect_err("must time out");

        assert_eq!(error.kind(), SourceErrorKind::Timeout);
        assert!(error.retryable());
    }

    #[test]
    fn raw_values_tolerate_strings_zero_and_empty_objects() {
        let parse = |json: &str| -> Option<f64> {
            serde_json::from_str::<YahooRawValue>(json)
                .expect("raw wrapper parses")
                .to_option()
        };

        assert_eq!(parse(r#"{"raw": 8.5, "fmt": "8.50"}"#), Some(8.5));
        assert_eq!(parse(r#"{"raw": "Infinity", "fmt": "∞"}"#), None);
        assert_eq!(parse(r#"{"raw": 0}"#), None);
        assert_eq!(parse("{}"), None);
    }
}

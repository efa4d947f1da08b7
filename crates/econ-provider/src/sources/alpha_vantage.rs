//! Alpha Vantage 실적 어댑터.
//!
//! EARNINGS 함수의 분기 실적(실제/예상 EPS, 서프라이즈)을 수집합니다.
//! Alpha Vantage는 rate limit 초과 시 200 응답에 "Note" 필드를 담아
//! 반환하므로 이를 프로바이더 에러 페이로드로 취급합니다.
//! 종목당 요청이 하나뿐이므로 호출 간 대기가 필요 없습니다.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use econ_core::{DateRange, EarningsRecord, FiscalPeriod, ProviderId};

use crate::adapter::ProviderAdapter;
use crate::error::ProviderError;

const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";

/// 종목당 수집할 최근 분기 수.
const QUARTER_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
struct AvEarningsResponse {
    #[serde(rename = "quarterlyEarnings")]
    quarterly_earnings: Option<Vec<AvQuarterlyEarning>>,
    /// rate limit 안내 (존재하면 실패로 취급)
    #[serde(rename = "Note")]
    note: Option<String>,
    /// 잘못된 요청 안내
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AvQuarterlyEarning {
    #[serde(rename = "fiscalDateEnding")]
    fiscal_date_ending: Option<String>,
    #[serde(rename = "reportedDate")]
    reported_date: Option<String>,
    /// 숫자 문자열, 미발표 시 "None"
    #[serde(rename = "reportedEPS")]
    reported_eps: Option<String>,
    #[serde(rename = "estimatedEPS")]
    estimated_eps: Option<String>,
    surprise: Option<String>,
    #[serde(rename = "surprisePercentage")]
    surprise_percentage: Option<String>,
}

/// 숫자 문자열 파싱 ("None"/"" → None).
fn parse_decimal(raw: Option<&str>) -> Option<Decimal> {
    raw.and_then(|s| s.trim().parse::<Decimal>().ok())
}

/// Alpha Vantage 어댑터.
pub struct AlphaVantageAdapter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AlphaVantageAdapter {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// 테스트용 base URL 교체.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_earnings(&self, symbol: &str) -> Result<AvEarningsResponse, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::MissingCredential("ALPHA_VANTAGE_API_KEY"));
        }

        let url = format!("{}/query", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("function", "EARNINGS"),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
            });
        }

        let body: AvEarningsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        if body.note.is_some() {
            return Err(ProviderError::RateLimited);
        }
        if let Some(msg) = body.error_message {
            return Err(ProviderError::Decode(msg));
        }
        Ok(body)
    }
}

#[async_trait]
impl ProviderAdapter<EarningsRecord> for AlphaVantageAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::AlphaVantage
    }

    async fn fetch(&self, entity: &str, _window: DateRange) -> Option<Vec<EarningsRecord>> {
        let body = match self.fetch_earnings(entity).await {
            Ok(b) => b,
            Err(e) => {
                warn!(symbol = entity, error = %e, "Alpha Vantage 실적 조회 실패");
                return None;
            }
        };

        let quarters = body.quarterly_earnings.unwrap_or_default();
        let mut records = Vec::new();

        for q in quarters.into_iter().take(QUARTER_LIMIT) {
            let Some(period_end) = q
                .fiscal_date_ending
                .as_deref()
                .and_then(|d| d.parse::<NaiveDate>().ok())
            else {
                continue;
            };

            let fiscal_period = FiscalPeriod::from_month(period_end.month());
            let mut record =
                EarningsRecord::new(entity, period_end.year(), fiscal_period, self.id());
            record.report_date = q
                .reported_date
                .as_deref()
                .and_then(|d| d.parse::<NaiveDate>().ok());
            record.eps = parse_decimal(q.reported_eps.as_deref());
            record.eps_estimated = parse_decimal(q.estimated_eps.as_deref());
            record.surprise = parse_decimal(q.surprise.as_deref());
            record.surprise_percent = parse_decimal(q.surprise_percentage.as_deref());
            records.push(record);
        }

        if records.is_empty() {
            return None;
        }
        debug!(symbol = entity, count = records.len(), "Alpha Vantage 수집 완료");
        Some(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn window() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        )
    }

    fn adapter(base_url: &str) -> AlphaVantageAdapter {
        AlphaVantageAdapter::new("key").with_base_url(base_url)
    }

    #[tokio::test]
    async fn test_fetch_parses_quarterly_earnings() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/query")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"symbol":"AAPL","quarterlyEarnings":[
                    {"fiscalDateEnding":"2024-03-31","reportedDate":"2024-05-02",
                     "reportedEPS":"1.53","estimatedEPS":"1.50",
                     "surprise":"0.03","surprisePercentage":"2.0"},
                    {"fiscalDateEnding":"2023-12-31","reportedDate":"2024-02-01",
                     "reportedEPS":"2.18","estimatedEPS":"None",
                     "surprise":"None","surprisePercentage":"None"}
                ]}"#,
            )
            .create_async()
            .await;

        let records = adapter(&server.url()).fetch("AAPL", window()).await.unwrap();
        assert_eq!(records.len(), 2);

        let q1 = &records[0];
        assert_eq!(q1.fiscal_year, 2024);
        assert_eq!(q1.fiscal_period, FiscalPeriod::Q1);
        assert_eq!(q1.eps, Some(dec!(1.53)));
        assert_eq!(q1.eps_estimated, Some(dec!(1.50)));

        // "None" 문자열은 부재로 처리
        let q4 = &records[1];
        assert_eq!(q4.fiscal_period, FiscalPeriod::Q4);
        assert!(q4.eps_estimated.is_none());
        assert!(q4.surprise.is_none());
    }

    #[tokio::test]
    async fn test_fetch_rate_limit_note_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/query")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"Note":"Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day."}"#)
            .create_async()
            .await;

        assert!(adapter(&server.url()).fetch("AAPL", window()).await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_without_key_is_none() {
        let adapter = AlphaVantageAdapter::new("");
        assert!(adapter.fetch("AAPL", window()).await.is_none());
    }

    #[test]
    fn test_parse_decimal_none_strings() {
        assert_eq!(parse_decimal(Some("1.25")), Some(dec!(1.25)));
        assert_eq!(parse_decimal(Some("None")), None);
        assert_eq!(parse_decimal(Some("")), None);
        assert_eq!(parse_decimal(None), None);
    }
}

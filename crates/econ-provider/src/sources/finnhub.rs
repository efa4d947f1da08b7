//! Finnhub 실적 어댑터.
//!
//! stock/earnings 엔드포인트에서 분기별 실제/예상 EPS를 수집합니다.
//! 종목당 요청이 하나뿐이므로 호출 간 대기가 필요 없습니다.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use econ_core::{DateRange, EarningsRecord, FiscalPeriod, ProviderId};

use crate::adapter::ProviderAdapter;
use crate::error::ProviderError;

const DEFAULT_BASE_URL: &str = "https://finnhub.io";

/// 종목당 수집할 최근 분기 수.
const QUARTER_LIMIT: usize = 8;

/// 수치 필드는 Decimal로 직접 역직렬화해 이진 부동소수점 잡음을 배제.
#[derive(Debug, Deserialize)]
struct FhEarning {
    /// 회계 기간 말일 (예: "2024-03-31")
    period: Option<String>,
    /// 분기 번호 (1~4)
    quarter: Option<u32>,
    year: Option<i32>,
    actual: Option<Decimal>,
    estimate: Option<Decimal>,
    surprise: Option<Decimal>,
    #[serde(rename = "surprisePercent")]
    surprise_percent: Option<Decimal>,
}

/// Finnhub 어댑터.
pub struct FinnhubAdapter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl FinnhubAdapter {
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

    async fn fetch_earnings(&self, symbol: &str) -> Result<Vec<FhEarning>, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::MissingCredential("FINNHUB_API_KEY"));
        }

        let url = format!("{}/api/v1/stock/earnings", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("limit", &QUARTER_LIMIT.to_string()),
                ("token", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<Vec<FhEarning>>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

/// 분기 번호 → FiscalPeriod.
fn quarter_to_period(quarter: u32) -> Option<FiscalPeriod> {
    match quarter {
        1 => Some(FiscalPeriod::Q1),
        2 => Some(FiscalPeriod::Q2),
        3 => Some(FiscalPeriod::Q3),
        4 => Some(FiscalPeriod::Q4),
        _ => None,
    }
}

#[async_trait]
impl ProviderAdapter<EarningsRecord> for FinnhubAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Finnhub
    }

    async fn fetch(&self, entity: &str, _window: DateRange) -> Option<Vec<EarningsRecord>> {
        let earnings = match self.fetch_earnings(entity).await {
            Ok(e) => e,
            Err(e) => {
                warn!(symbol = entity, error = %e, "Finnhub 실적 조회 실패");
                return None;
            }
        };

        let mut records = Vec::new();
        for item in earnings.into_iter().take(QUARTER_LIMIT) {
            let (Some(year), Some(fiscal_period)) =
                (item.year, item.quarter.and_then(quarter_to_period))
            else {
                continue;
            };

            let mut record = EarningsRecord::new(entity, year, fiscal_period, self.id());
            record.report_date = item
                .period
                .as_deref()
                .and_then(|d| d.parse::<NaiveDate>().ok());
            record.eps = item.actual;
            record.eps_estimated = item.estimate;
            record.surprise = item.surprise.map(|d| d.round_dp(4));
            record.surprise_percent = item.surprise_percent.map(|d| d.round_dp(2));
            records.push(record);
        }

        if records.is_empty() {
            return None;
        }
        debug!(symbol = entity, count = records.len(), "Finnhub 수집 완료");
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

    #[tokio::test]
    async fn test_fetch_parses_earnings() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/stock/earnings")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"period":"2024-03-31","quarter":1,"year":2024,
                     "actual":1.53,"estimate":1.50,
                     "surprise":0.03,"surprisePercent":2.0}]"#,
            )
            .create_async()
            .await;

        let adapter = FinnhubAdapter::new("key").with_base_url(server.url());
        let records = adapter.fetch("AAPL", window()).await.unwrap();

        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.fiscal_year, 2024);
        assert_eq!(rec.fiscal_period, FiscalPeriod::Q1);
        // JSON 숫자가 잡음 없이 그대로 읽혀야 함
        assert_eq!(rec.eps, Some(dec!(1.53)));
        assert_eq!(rec.eps.map(|e| e.to_string()), Some("1.53".to_string()));
        assert_eq!(rec.eps_estimated, Some(dec!(1.50)));
        assert_eq!(rec.surprise_percent, Some(dec!(2.00)));
    }

    #[tokio::test]
    async fn test_fetch_rate_limited_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/stock/earnings")
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .create_async()
            .await;

        let adapter = FinnhubAdapter::new("key").with_base_url(server.url());
        assert!(adapter.fetch("AAPL", window()).await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_without_key_is_none() {
        let adapter = FinnhubAdapter::new("");
        assert!(adapter.fetch("AAPL", window()).await.is_none());
    }

    #[test]
    fn test_quarter_to_period() {
        assert_eq!(quarter_to_period(1), Some(FiscalPeriod::Q1));
        assert_eq!(quarter_to_period(4), Some(FiscalPeriod::Q4));
        assert_eq!(quarter_to_period(5), None);
    }
}

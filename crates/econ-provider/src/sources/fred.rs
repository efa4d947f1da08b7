//! FRED (세인트루이스 연준) 매크로 지표 어댑터.
//!
//! 고정된 시리즈 유니버스를 순차 조회하며, 시리즈 간에는 주입된 Pacer로
//! 대기합니다. 시리즈 하나의 실패는 해당 시리즈만 건너뛰고 계속합니다.
//! FRED는 US 데이터만 제공하므로 다른 국가 요청에는 기여하지 않습니다.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use econ_core::{classify, DateRange, IndicatorRecord, ProviderId};

use crate::adapter::ProviderAdapter;
use crate::error::ProviderError;
use crate::pace::{FixedDelayPacer, Pacer};

const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org";

/// 수집 대상 시리즈: (시리즈 ID, 분류용 라벨, 계절조정 여부)
const FRED_SERIES: &[(&str, &str, bool)] = &[
    ("GDP", "GDP", true),
    ("CPIAUCSL", "CPI", true),
    ("UNRATE", "Unemployment Rate", true),
    ("FEDFUNDS", "Fed Funds Rate", false),
    ("PAYEMS", "Nonfarm Payrolls", true),
    ("INDPRO", "Industrial Production", true),
    ("UMCSENT", "Consumer Sentiment", false),
    ("HOUST", "Housing Starts", true),
    ("PPIACO", "PPI", false),
    ("RSAFS", "Retail Sales", true),
];

/// 관측치 응답.
#[derive(Debug, Deserialize)]
struct FredObservationsResponse {
    observations: Option<Vec<FredObservation>>,
    /// 에러 응답일 때만 존재
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FredObservation {
    date: String,
    /// 결측치는 "." 문자열로 표현됨
    value: String,
}

/// FRED 어댑터.
pub struct FredAdapter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    pacer: Arc<dyn Pacer>,
}

impl FredAdapter {
    /// 기본 설정으로 생성 (시리즈 간 300ms 대기).
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_pacer(api_key, Arc::new(FixedDelayPacer::from_millis(300)))
    }

    /// Pacer 주입 생성.
    pub fn with_pacer(api_key: impl Into<String>, pacer: Arc<dyn Pacer>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            pacer,
        }
    }

    /// 테스트용 base URL 교체.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 단일 시리즈 관측치 조회.
    async fn fetch_series(
        &self,
        series_id: &str,
        window: DateRange,
    ) -> Result<Vec<FredObservation>, ProviderError> {
        let url = format!("{}/fred/series/observations", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("observation_start", &window.from.to_string()),
                ("observation_end", &window.to.to_string()),
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

        let body: FredObservationsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        if let Some(msg) = body.error_message {
            return Err(ProviderError::Decode(msg));
        }

        Ok(body.observations.unwrap_or_default())
    }
}

#[async_trait]
impl ProviderAdapter<IndicatorRecord> for FredAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Fred
    }

    async fn fetch(&self, entity: &str, window: DateRange) -> Option<Vec<IndicatorRecord>> {
        if entity != "US" {
            debug!(country = entity, "FRED는 US 전용, 건너뜀");
            return None;
        }
        if self.api_key.is_empty() {
            warn!(
                error = %ProviderError::MissingCredential("FRED_API_KEY"),
                "건너뜀"
            );
            return None;
        }

        let mut records = Vec::new();

        for (i, (series_id, label, seasonally_adjusted)) in FRED_SERIES.iter().enumerate() {
            if i > 0 {
                self.pacer.pause().await;
            }

            let observations = match self.fetch_series(series_id, window).await {
                Ok(obs) => obs,
                Err(e) => {
                    warn!(series = series_id, error = %e, "FRED 시리즈 조회 실패, 건너뜀");
                    continue;
                }
            };

            let meta = classify(label);
            for obs in observations {
                // 결측치("." 또는 파싱 불가)는 제외
                let Ok(value) = obs.value.parse::<Decimal>() else {
                    continue;
                };
                let Ok(period_date) = obs.date.parse::<NaiveDate>() else {
                    continue;
                };
                if !window.contains(period_date) {
                    continue;
                }

                let mut record = IndicatorRecord::new(
                    meta.standard_code.clone(),
                    "US",
                    period_date,
                    self.id(),
                );
                record.display_name = Some(meta.display_name.clone());
                record.unit = Some(meta.unit.clone());
                record.frequency = Some(meta.frequency);
                record.period_type = Some(meta.period_type);
                record.importance = Some(meta.importance);
                record.market_impact = Some(meta.market_impact);
                record.seasonally_adjusted = Some(*seasonally_adjusted);
                record.value = Some(value);
                records.push(record);
            }
        }

        if records.is_empty() {
            return None;
        }
        debug!(count = records.len(), "FRED 수집 완료");
        Some(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pace::NoopPacer;
    use rust_decimal_macros::dec;

    fn window() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        )
    }

    fn adapter(base_url: &str) -> FredAdapter {
        FredAdapter::with_pacer("test-key", Arc::new(NoopPacer)).with_base_url(base_url)
    }

    #[tokio::test]
    async fn test_fetch_parses_and_filters_observations() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/fred/series/observations")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"observations":[
                    {"date":"2024-01-01","value":"2.5"},
                    {"date":"2024-04-01","value":"."},
                    {"date":"2023-10-01","value":"2.1"}
                ]}"#,
            )
            .expect_at_least(1)
            .create_async()
            .await;

        let records = adapter(&server.url()).fetch("US", window()).await.unwrap();
        mock.assert_async().await;

        // 시리즈당 유효 관측치 1개: "."은 결측, 2023-10-01은 기간 밖
        assert_eq!(records.len(), FRED_SERIES.len());
        assert!(records.iter().all(|r| r.value == Some(dec!(2.5))));
        assert!(records.iter().all(|r| r.country == "US"));
        assert!(records.iter().all(|r| r.provenance == vec![ProviderId::Fred]));
        // 분류기가 시리즈 라벨을 표준 코드로 매핑
        assert!(records.iter().any(|r| r.indicator_code == "GDP"));
        assert!(records.iter().any(|r| r.indicator_code == "CPI"));
    }

    #[tokio::test]
    async fn test_fetch_returns_none_when_all_series_fail() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/fred/series/observations")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        assert!(adapter(&server.url()).fetch("US", window()).await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_skips_non_us_entity() {
        let adapter = FredAdapter::with_pacer("key", Arc::new(NoopPacer));
        assert!(adapter.fetch("KR", window()).await.is_none());
    }
}

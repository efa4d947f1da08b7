//! Trading Economics 매크로 지표 어댑터.
//!
//! 국가별 historical 엔드포인트를 지표마다 순차 조회합니다.
//! 응답의 Frequency/Category 라벨을 표준 분류로 매핑합니다.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use econ_core::{classify, DateRange, Frequency, IndicatorRecord, ProviderId};

use crate::adapter::ProviderAdapter;
use crate::error::ProviderError;
use crate::pace::{FixedDelayPacer, Pacer};

const DEFAULT_BASE_URL: &str = "https://api.tradingeconomics.com";

/// 수집 대상 지표 (TE 카테고리 이름).
const TE_INDICATORS: &[&str] = &[
    "GDP Growth Rate",
    "Inflation Rate",
    "Unemployment Rate",
    "Interest Rate",
    "Balance of Trade",
    "Retail Sales MoM",
    "Industrial Production",
    "Consumer Confidence",
];

/// historical 응답 항목.
#[derive(Debug, Deserialize)]
struct TeObservation {
    #[serde(rename = "Country")]
    country: Option<String>,
    #[serde(rename = "Category")]
    category: Option<String>,
    #[serde(rename = "DateTime")]
    date_time: Option<String>,
    /// Decimal로 직접 역직렬화 (이진 부동소수점 잡음 배제)
    #[serde(rename = "Value")]
    value: Option<Decimal>,
    #[serde(rename = "Frequency")]
    frequency: Option<String>,
}

/// Trading Economics 어댑터.
pub struct TradingEconomicsAdapter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    pacer: Arc<dyn Pacer>,
}

impl TradingEconomicsAdapter {
    /// 기본 설정으로 생성 (지표 간 500ms 대기).
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_pacer(api_key, Arc::new(FixedDelayPacer::from_millis(500)))
    }

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

    /// 국가 코드 → TE 국가 이름.
    fn country_name(country: &str) -> Option<&'static str> {
        match country {
            "US" => Some("united states"),
            "KR" => Some("south korea"),
            "JP" => Some("japan"),
            "CN" => Some("china"),
            "DE" => Some("germany"),
            "GB" => Some("united kingdom"),
            _ => None,
        }
    }

    async fn fetch_indicator(
        &self,
        country_name: &str,
        indicator: &str,
        window: DateRange,
    ) -> Result<Vec<TeObservation>, ProviderError> {
        let url = format!(
            "{}/historical/country/{}/indicator/{}",
            self.base_url,
            country_name.replace(' ', "%20"),
            indicator.replace(' ', "%20"),
        );
        let response = self
            .client
            .get(&url)
            .query(&[
                ("c", self.api_key.as_str()),
                ("format", "json"),
                ("d1", &window.from.to_string()),
                ("d2", &window.to.to_string()),
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
            .json::<Vec<TeObservation>>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

/// "Monthly"/"Quarterly" 등 TE 주기 라벨 파싱.
fn parse_frequency(raw: &str) -> Option<Frequency> {
    match raw.trim().to_lowercase().as_str() {
        "daily" => Some(Frequency::Daily),
        "weekly" => Some(Frequency::Weekly),
        "monthly" => Some(Frequency::Monthly),
        "quarterly" => Some(Frequency::Quarterly),
        "yearly" | "annual" => Some(Frequency::Annual),
        _ => None,
    }
}

#[async_trait]
impl ProviderAdapter<IndicatorRecord> for TradingEconomicsAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::TradingEconomics
    }

    async fn fetch(&self, entity: &str, window: DateRange) -> Option<Vec<IndicatorRecord>> {
        let Some(country_name) = Self::country_name(entity) else {
            debug!(country = entity, "Trading Economics 미지원 국가, 건너뜀");
            return None;
        };
        if self.api_key.is_empty() {
            warn!(
                error = %ProviderError::MissingCredential("TRADING_ECONOMICS_API_KEY"),
                "건너뜀"
            );
            return None;
        }

        let mut records = Vec::new();

        for (i, indicator) in TE_INDICATORS.iter().enumerate() {
            if i > 0 {
                self.pacer.pause().await;
            }

            let observations = match self.fetch_indicator(country_name, indicator, window).await {
                Ok(obs) => obs,
                Err(e) => {
                    warn!(indicator = indicator, error = %e, "TE 지표 조회 실패, 건너뜀");
                    continue;
                }
            };

            for obs in observations {
                // 요청한 국가와 다른 응답 행은 제외
                if let Some(obs_country) = obs.country.as_deref() {
                    if !obs_country.eq_ignore_ascii_case(country_name) {
                        warn!(
                            requested = country_name,
                            returned = obs_country,
                            "응답 국가 불일치, 관측치 제외"
                        );
                        continue;
                    }
                }
                let Some(value) = obs.value else {
                    continue;
                };
                // DateTime: "2024-01-01T00:00:00", 날짜 부분만 사용
                let Some(period_date) = obs
                    .date_time
                    .as_deref()
                    .and_then(|d| d.get(..10))
                    .and_then(|d| d.parse::<NaiveDate>().ok())
                else {
                    continue;
                };
                if !window.contains(period_date) {
                    continue;
                }

                let label = obs.category.as_deref().unwrap_or(indicator);
                let meta = classify(label);

                let mut record = IndicatorRecord::new(
                    meta.standard_code.clone(),
                    entity,
                    period_date,
                    self.id(),
                );
                record.display_name = Some(meta.display_name.clone());
                record.unit = Some(meta.unit.clone());
                record.importance = Some(meta.importance);
                record.market_impact = Some(meta.market_impact);
                record.period_type = Some(meta.period_type);
                // 응답의 주기 라벨이 우선, 없으면 분류 규칙 값
                record.frequency = obs
                    .frequency
                    .as_deref()
                    .and_then(parse_frequency)
                    .or(Some(meta.frequency));
                record.value = Some(value);
                records.push(record);
            }
        }

        if records.is_empty() {
            return None;
        }
        debug!(count = records.len(), country = entity, "TE 수집 완료");
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

    #[tokio::test]
    async fn test_fetch_maps_category_to_standard_code() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Regex("^/historical/country/.*".to_string()))
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"Country":"United States","Category":"Inflation Rate",
                     "DateTime":"2024-02-01T00:00:00","Value":3.2,"Frequency":"Monthly"}]"#,
            )
            .create_async()
            .await;

        let adapter = TradingEconomicsAdapter::with_pacer("key", Arc::new(NoopPacer))
            .with_base_url(server.url());
        let records = adapter.fetch("US", window()).await.unwrap();

        assert!(!records.is_empty());
        let rec = &records[0];
        assert_eq!(rec.indicator_code, "CPI");
        // JSON 숫자가 잡음 없이 그대로 읽혀야 함
        assert_eq!(rec.value, Some(dec!(3.2)));
        assert_eq!(rec.value.map(|v| v.to_string()), Some("3.2".to_string()));
        assert_eq!(rec.frequency, Some(Frequency::Monthly));
    }

    #[tokio::test]
    async fn test_fetch_skips_mismatched_country_rows() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Regex("^/historical/country/.*".to_string()))
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"Country":"Mexico","Category":"Inflation Rate",
                     "DateTime":"2024-02-01T00:00:00","Value":4.4,"Frequency":"Monthly"},
                    {"Country":"United States","Category":"Inflation Rate",
                     "DateTime":"2024-02-01T00:00:00","Value":3.2,"Frequency":"Monthly"}]"#,
            )
            .create_async()
            .await;

        let adapter = TradingEconomicsAdapter::with_pacer("key", Arc::new(NoopPacer))
            .with_base_url(server.url());
        let records = adapter.fetch("US", window()).await.unwrap();

        // 지표당 US 행 하나만 남아야 함
        assert!(records.iter().all(|r| r.value == Some(dec!(3.2))));
    }

    #[tokio::test]
    async fn test_fetch_unsupported_country_is_none() {
        let adapter = TradingEconomicsAdapter::with_pacer("key", Arc::new(NoopPacer));
        assert!(adapter.fetch("ZZ", window()).await.is_none());
    }

    #[test]
    fn test_parse_frequency() {
        assert_eq!(parse_frequency("Monthly"), Some(Frequency::Monthly));
        assert_eq!(parse_frequency("quarterly"), Some(Frequency::Quarterly));
        assert_eq!(parse_frequency("Yearly"), Some(Frequency::Annual));
        assert_eq!(parse_frequency("???"), None);
    }
}

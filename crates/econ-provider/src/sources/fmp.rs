//! Financial Modeling Prep 실적 어댑터.
//!
//! 분기 손익계산서에서 EPS, 매출, 순이익, 영업이익을 수집합니다.
//! 종목 기준 소스이므로 기간 필터 대신 최근 8개 분기로 제한합니다.
//! 종목당 요청이 하나뿐이므로 호출 간 대기가 필요 없습니다.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use econ_core::{DateRange, EarningsRecord, FiscalPeriod, ProviderId};

use crate::adapter::ProviderAdapter;
use crate::error::ProviderError;

const DEFAULT_BASE_URL: &str = "https://financialmodelingprep.com";

/// 종목당 수집할 최근 분기 수.
const QUARTER_LIMIT: usize = 8;

/// 분기 손익계산서 항목.
///
/// 금액 필드는 Decimal로 직접 역직렬화해 이진 부동소수점 잡음이
/// 관측값에 섞이지 않게 합니다.
#[derive(Debug, Deserialize)]
struct FmpIncomeStatement {
    /// 회계 기간 말일 (예: "2024-03-30")
    date: Option<String>,
    /// 공시일
    #[serde(rename = "fillingDate")]
    filing_date: Option<String>,
    /// "Q1".."Q4" 또는 "FY"
    period: Option<String>,
    #[serde(rename = "calendarYear")]
    calendar_year: Option<String>,
    #[serde(rename = "reportedCurrency")]
    reported_currency: Option<String>,
    eps: Option<Decimal>,
    revenue: Option<Decimal>,
    #[serde(rename = "netIncome")]
    net_income: Option<Decimal>,
    #[serde(rename = "operatingIncome")]
    operating_income: Option<Decimal>,
}

/// FMP 어댑터.
pub struct FmpAdapter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl FmpAdapter {
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

    async fn fetch_income_statements(
        &self,
        symbol: &str,
    ) -> Result<Vec<FmpIncomeStatement>, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::MissingCredential("FMP_API_KEY"));
        }

        let url = format!("{}/api/v3/income-statement/{}", self.base_url, symbol);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("period", "quarter"),
                ("limit", &QUARTER_LIMIT.to_string()),
                ("apikey", self.api_key.as_str()),
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
            .json::<Vec<FmpIncomeStatement>>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ProviderAdapter<EarningsRecord> for FmpAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Fmp
    }

    async fn fetch(&self, entity: &str, _window: DateRange) -> Option<Vec<EarningsRecord>> {
        let statements = match self.fetch_income_statements(entity).await {
            Ok(s) => s,
            Err(e) => {
                warn!(symbol = entity, error = %e, "FMP 손익계산서 조회 실패");
                return None;
            }
        };

        let mut records = Vec::new();
        for stmt in statements.into_iter().take(QUARTER_LIMIT) {
            // 키 필드(연도, 기간)가 없으면 해당 항목은 제외
            let Some(fiscal_year) = stmt
                .calendar_year
                .as_deref()
                .and_then(|y| y.parse::<i32>().ok())
            else {
                continue;
            };
            let Some(fiscal_period) = stmt.period.as_deref().and_then(FiscalPeriod::parse) else {
                continue;
            };

            let mut record = EarningsRecord::new(entity, fiscal_year, fiscal_period, self.id());
            record.report_date = stmt
                .filing_date
                .as_deref()
                .or(stmt.date.as_deref())
                .and_then(|d| d.get(..10))
                .and_then(|d| d.parse::<NaiveDate>().ok());
            record.currency = stmt.reported_currency;
            record.eps = stmt.eps;
            record.revenue = stmt.revenue;
            record.net_income = stmt.net_income;
            record.operating_income = stmt.operating_income;
            records.push(record);
        }

        if records.is_empty() {
            return None;
        }
        debug!(symbol = entity, count = records.len(), "FMP 수집 완료");
        Some(records)
    }
}

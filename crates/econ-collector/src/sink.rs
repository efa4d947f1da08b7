//! 영속화 싱크.
//!
//! 자연 키 + 결합 프로바이더 태그를 충돌 대상으로 하는 멱등 upsert를
//! 제공합니다. `COALESCE(EXCLUDED.col, table.col)` 패턴으로 저장 단계에서도
//! 채워진 컬럼이 NULL로 퇴행하지 않습니다. 쓰기 실패는 에러로 보고될 뿐
//! 이미 커밋된 이전 배치를 롤백하지 않습니다.

use async_trait::async_trait;
use econ_core::{EarningsRecord, IndicatorRecord};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use crate::Result;

/// INSERT 문당 바인딩 한도를 고려한 배치 크기.
const UPSERT_BATCH_SIZE: usize = 500;

/// 정규 레코드 영속화 계약.
#[async_trait]
pub trait RecordSink<T>: Send + Sync {
    /// 레코드 배치를 멱등 upsert. 반영된 행 수를 반환.
    async fn upsert(&self, records: &[T]) -> Result<usize>;
}

/// 매크로 지표 Postgres 싱크.
///
/// 충돌 키: `(indicator_code, country, period_date, data_provider)`
pub struct PgIndicatorSink {
    pool: PgPool,
}

impl PgIndicatorSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordSink<IndicatorRecord> for PgIndicatorSink {
    async fn upsert(&self, records: &[IndicatorRecord]) -> Result<usize> {
        let mut affected = 0usize;

        for chunk in records.chunks(UPSERT_BATCH_SIZE) {
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
                r#"
                INSERT INTO economic_indicator (
                    indicator_code, country, period_date, data_provider,
                    display_name, unit, currency, frequency, period_type,
                    importance, market_impact, seasonally_adjusted, status,
                    revision_count, value, estimated_value, previous_value,
                    change_value, change_percent, yoy_change, updated_at
                )
                "#,
            );

            qb.push_values(chunk, |mut b, rec| {
                b.push_bind(&rec.indicator_code)
                    .push_bind(&rec.country)
                    .push_bind(rec.period_date)
                    .push_bind(rec.provider_tag())
                    .push_bind(&rec.display_name)
                    .push_bind(&rec.unit)
                    .push_bind(&rec.currency)
                    .push_bind(rec.frequency.map(|f| f.as_str()))
                    .push_bind(rec.period_type.map(|p| p.as_str()))
                    .push_bind(rec.importance.map(|i| i as i16))
                    .push_bind(rec.market_impact.map(|m| m.as_str()))
                    .push_bind(rec.seasonally_adjusted)
                    .push_bind(rec.status.map(|s| s.as_str()))
                    .push_bind(rec.revision_count)
                    .push_bind(rec.value)
                    .push_bind(rec.estimated_value)
                    .push_bind(rec.previous_value)
                    .push_bind(rec.change_value)
                    .push_bind(rec.change_percent)
                    .push_bind(rec.yoy_change)
                    .push("NOW()");
            });

            qb.push(
                r#"
                ON CONFLICT (indicator_code, country, period_date, data_provider)
                DO UPDATE SET
                    display_name = COALESCE(EXCLUDED.display_name, economic_indicator.display_name),
                    unit = COALESCE(EXCLUDED.unit, economic_indicator.unit),
                    currency = COALESCE(EXCLUDED.currency, economic_indicator.currency),
                    frequency = COALESCE(EXCLUDED.frequency, economic_indicator.frequency),
                    period_type = COALESCE(EXCLUDED.period_type, economic_indicator.period_type),
                    importance = COALESCE(EXCLUDED.importance, economic_indicator.importance),
                    market_impact = COALESCE(EXCLUDED.market_impact, economic_indicator.market_impact),
                    seasonally_adjusted = COALESCE(EXCLUDED.seasonally_adjusted, economic_indicator.seasonally_adjusted),
                    status = COALESCE(EXCLUDED.status, economic_indicator.status),
                    revision_count = COALESCE(EXCLUDED.revision_count, economic_indicator.revision_count),
                    value = COALESCE(EXCLUDED.value, economic_indicator.value),
                    estimated_value = COALESCE(EXCLUDED.estimated_value, economic_indicator.estimated_value),
                    previous_value = COALESCE(EXCLUDED.previous_value, economic_indicator.previous_value),
                    change_value = COALESCE(EXCLUDED.change_value, economic_indicator.change_value),
                    change_percent = COALESCE(EXCLUDED.change_percent, economic_indicator.change_percent),
                    yoy_change = COALESCE(EXCLUDED.yoy_change, economic_indicator.yoy_change),
                    updated_at = NOW()
                "#,
            );

            let result = qb.build().execute(&self.pool).await?;
            affected += result.rows_affected() as usize;
        }

        debug!(records = records.len(), affected = affected, "지표 upsert 완료");
        Ok(affected)
    }
}

/// 기업 실적 Postgres 싱크.
///
/// 충돌 키: `(symbol, fiscal_year, fiscal_quarter, data_provider)`
pub struct PgEarningsSink {
    pool: PgPool,
}

impl PgEarningsSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordSink<EarningsRecord> for PgEarningsSink {
    async fn upsert(&self, records: &[EarningsRecord]) -> Result<usize> {
        let mut affected = 0usize;

        for chunk in records.chunks(UPSERT_BATCH_SIZE) {
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
                r#"
                INSERT INTO company_earnings (
                    symbol, fiscal_year, fiscal_quarter, data_provider,
                    report_date, currency, status, eps, eps_estimated,
                    revenue, revenue_estimated, net_income, operating_income,
                    surprise, surprise_percent, beat_miss_met,
                    operating_margin, net_margin, eps_change, eps_change_percent,
                    updated_at
                )
                "#,
            );

            qb.push_values(chunk, |mut b, rec| {
                b.push_bind(&rec.symbol)
                    .push_bind(rec.fiscal_year)
                    .push_bind(rec.fiscal_period.as_str())
                    .push_bind(rec.provider_tag())
                    .push_bind(rec.report_date)
                    .push_bind(&rec.currency)
                    .push_bind(rec.status.map(|s| s.as_str()))
                    .push_bind(rec.eps)
                    .push_bind(rec.eps_estimated)
                    .push_bind(rec.revenue)
                    .push_bind(rec.revenue_estimated)
                    .push_bind(rec.net_income)
                    .push_bind(rec.operating_income)
                    .push_bind(rec.surprise)
                    .push_bind(rec.surprise_percent)
                    .push_bind(rec.beat_miss_met.map(|b| b.as_str()))
                    .push_bind(rec.operating_margin)
                    .push_bind(rec.net_margin)
                    .push_bind(rec.eps_change)
                    .push_bind(rec.eps_change_percent)
                    .push("NOW()");
            });

            qb.push(
                r#"
                ON CONFLICT (symbol, fiscal_year, fiscal_quarter, data_provider)
                DO UPDATE SET
                    report_date = COALESCE(EXCLUDED.report_date, company_earnings.report_date),
                    currency = COALESCE(EXCLUDED.currency, company_earnings.currency),
                    status = COALESCE(EXCLUDED.status, company_earnings.status),
                    eps = COALESCE(EXCLUDED.eps, company_earnings.eps),
                    eps_estimated = COALESCE(EXCLUDED.eps_estimated, company_earnings.eps_estimated),
                    revenue = COALESCE(EXCLUDED.revenue, company_earnings.revenue),
                    revenue_estimated = COALESCE(EXCLUDED.revenue_estimated, company_earnings.revenue_estimated),
                    net_income = COALESCE(EXCLUDED.net_income, company_earnings.net_income),
                    operating_income = COALESCE(EXCLUDED.operating_income, company_earnings.operating_income),
                    surprise = COALESCE(EXCLUDED.surprise, company_earnings.surprise),
                    surprise_percent = COALESCE(EXCLUDED.surprise_percent, company_earnings.surprise_percent),
                    beat_miss_met = COALESCE(EXCLUDED.beat_miss_met, company_earnings.beat_miss_met),
                    operating_margin = COALESCE(EXCLUDED.operating_margin, company_earnings.operating_margin),
                    net_margin = COALESCE(EXCLUDED.net_margin, company_earnings.net_margin),
                    eps_change = COALESCE(EXCLUDED.eps_change, company_earnings.eps_change),
                    eps_change_percent = COALESCE(EXCLUDED.eps_change_percent, company_earnings.eps_change_percent),
                    updated_at = NOW()
                "#,
            );

            let result = qb.build().execute(&self.pool).await?;
            affected += result.rows_affected() as usize;
        }

        debug!(records = records.len(), affected = affected, "실적 upsert 완료");
        Ok(affected)
    }
}

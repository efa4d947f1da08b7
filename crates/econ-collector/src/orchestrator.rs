//! 어댑터 병렬 디스패치 오케스트레이터.
//!
//! 엔티티마다 설정된 모든 어댑터를 동시에 디스패치하고 settle-all
//! 의미론으로 전부 완료될 때까지 기다립니다. 느리거나 실패한 어댑터는
//! 해당 프로바이더의 기여를 `None`으로 강등할 뿐 형제 어댑터를 취소하지
//! 않습니다. 어댑터별 타임아웃만 적용하며 배치 전체 데드라인은 없습니다.
//!
//! fold 순서는 어댑터 등록 순서로 고정됩니다 (`join_all`은 입력 순서를
//! 보존하므로 프로바이더 가용성이 같으면 결과가 재현됩니다).

use std::sync::Arc;
use std::time::Duration;

use econ_core::{DateRange, ProviderId};
use econ_provider::ProviderAdapter;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::stats::{EntityOutcome, EntityStatus};

/// 보고용 엔티티별 결과 상한.
const MAX_ENTITY_OUTCOMES: usize = 50;

/// 한 엔티티에 대한 settle 결과.
#[derive(Debug)]
pub struct DispatchResult<T> {
    /// 등록 순서대로 이어 붙인 부분 레코드
    pub partials: Vec<T>,
    /// 기여한 프로바이더
    pub succeeded: Vec<ProviderId>,
    /// 실패/무기여 프로바이더
    pub failed: Vec<ProviderId>,
}

/// 전체 실행 결과.
#[derive(Debug)]
pub struct RunOutcome<T> {
    /// 모든 엔티티의 부분 레코드 (병합 입력)
    pub partials: Vec<T>,
    /// 엔티티별 결과 (상한 적용)
    pub entity_outcomes: Vec<EntityOutcome>,
    /// 처리 엔티티 수
    pub processed: usize,
    /// 성공 엔티티 수
    pub succeeded: usize,
    /// 실패 엔티티 수
    pub failed: usize,
}

/// 어댑터 디스패치 오케스트레이터.
pub struct FetchOrchestrator<T> {
    adapters: Vec<Arc<dyn ProviderAdapter<T>>>,
    adapter_timeout: Duration,
    batch_size: usize,
    batch_delay: Duration,
}

impl<T: Send + 'static> FetchOrchestrator<T> {
    /// 기본 설정으로 생성 (타임아웃 30초, 배치 5개, 배치 간 3초).
    pub fn new(adapters: Vec<Arc<dyn ProviderAdapter<T>>>) -> Self {
        Self {
            adapters,
            adapter_timeout: Duration::from_secs(30),
            batch_size: 5,
            batch_delay: Duration::from_millis(3000),
        }
    }

    /// 어댑터별 타임아웃 변경.
    pub fn with_adapter_timeout(mut self, timeout: Duration) -> Self {
        self.adapter_timeout = timeout;
        self
    }

    /// 배치 크기/딜레이 변경.
    pub fn with_batching(mut self, batch_size: usize, batch_delay: Duration) -> Self {
        self.batch_size = batch_size.max(1);
        self.batch_delay = batch_delay;
        self
    }

    /// 등록된 어댑터 수.
    pub fn adapter_count(&self) -> usize {
        self.adapters.len()
    }

    /// 한 엔티티에 대해 모든 어댑터를 동시 디스패치하고 settle 대기.
    pub async fn dispatch(&self, entity: &str, window: DateRange) -> DispatchResult<T> {
        let futures = self.adapters.iter().map(|adapter| {
            let id = adapter.id();
            async move {
                match tokio::time::timeout(self.adapter_timeout, adapter.fetch(entity, window))
                    .await
                {
                    Ok(result) => (id, result),
                    Err(_) => {
                        warn!(provider = %id, entity = entity, "어댑터 타임아웃, 기여 없음으로 처리");
                        (id, None)
                    }
                }
            }
        });

        let settled = join_all(futures).await;

        let mut result = DispatchResult {
            partials: Vec::new(),
            succeeded: Vec::new(),
            failed: Vec::new(),
        };
        for (id, records) in settled {
            match records {
                Some(mut records) if !records.is_empty() => {
                    result.partials.append(&mut records);
                    result.succeeded.push(id);
                }
                _ => result.failed.push(id),
            }
        }
        debug!(
            entity = entity,
            succeeded = result.succeeded.len(),
            failed = result.failed.len(),
            records = result.partials.len(),
            "어댑터 settle 완료"
        );
        result
    }

    /// 엔티티 목록을 배치로 나눠 순차 처리.
    ///
    /// 배치 내 엔티티는 동시에 처리하고 (엔티티마다 어댑터 fan-out),
    /// 배치 사이에는 정중함 딜레이를 둡니다. 엔티티 하나의 실패는
    /// 결과 목록에 기록될 뿐 배치나 다른 엔티티를 중단시키지 않습니다.
    pub async fn run(&self, entities: &[String], window: DateRange) -> RunOutcome<T> {
        let mut outcome = RunOutcome {
            partials: Vec::new(),
            entity_outcomes: Vec::new(),
            processed: 0,
            succeeded: 0,
            failed: 0,
        };

        for (batch_idx, batch) in entities.chunks(self.batch_size).enumerate() {
            if batch_idx > 0 {
                tokio::time::sleep(self.batch_delay).await;
            }
            debug!(batch = batch_idx + 1, size = batch.len(), "배치 처리 시작");

            let dispatches = batch.iter().map(|entity| async {
                let result = self.dispatch(entity, window).await;
                (entity.clone(), result)
            });

            for (entity, result) in join_all(dispatches).await {
                outcome.processed += 1;

                let (status, message) = if result.succeeded.is_empty() {
                    outcome.failed += 1;
                    (
                        EntityStatus::Failed,
                        "모든 프로바이더 실패 또는 데이터 없음".to_string(),
                    )
                } else {
                    outcome.succeeded += 1;
                    (
                        EntityStatus::Success,
                        format!(
                            "{}개 프로바이더 기여 ({})",
                            result.succeeded.len(),
                            result
                                .succeeded
                                .iter()
                                .map(|p| p.as_str())
                                .collect::<Vec<_>>()
                                .join(",")
                        ),
                    )
                };

                if outcome.entity_outcomes.len() < MAX_ENTITY_OUTCOMES {
                    outcome.entity_outcomes.push(EntityOutcome {
                        entity,
                        status,
                        message,
                        records: result.partials.len(),
                    });
                }

                outcome.partials.extend(result.partials);
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use econ_core::{merge, IndicatorRecord};
    use rust_decimal_macros::dec;

    /// 고정 응답을 반환하는 테스트 어댑터.
    struct StubAdapter {
        id: ProviderId,
        records: Option<Vec<IndicatorRecord>>,
        delay: Option<Duration>,
    }

    impl StubAdapter {
        fn ok(id: ProviderId, records: Vec<IndicatorRecord>) -> Arc<Self> {
            Arc::new(Self {
                id,
                records: Some(records),
                delay: None,
            })
        }

        fn failing(id: ProviderId) -> Arc<Self> {
            Arc::new(Self {
                id,
                records: None,
                delay: None,
            })
        }

        fn slow(id: ProviderId, delay: Duration, records: Vec<IndicatorRecord>) -> Arc<Self> {
            Arc::new(Self {
                id,
                records: Some(records),
                delay: Some(delay),
            })
        }
    }

    #[async_trait]
    impl ProviderAdapter<IndicatorRecord> for StubAdapter {
        fn id(&self) -> ProviderId {
            self.id
        }

        async fn fetch(&self, _entity: &str, _window: DateRange) -> Option<Vec<IndicatorRecord>> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.records.clone()
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn window() -> DateRange {
        DateRange::new(date(2024, 1, 1), date(2024, 6, 30))
    }

    fn gdp_record(provider: ProviderId, value: rust_decimal::Decimal) -> IndicatorRecord {
        let mut rec = IndicatorRecord::new("GDP", "US", date(2024, 1, 1), provider);
        rec.value = Some(value);
        rec
    }

    #[tokio::test]
    async fn test_dispatch_tolerates_partial_failure() {
        // 5개 어댑터 중 2개 실패 → 성공한 3개의 레코드만 수집
        let orchestrator: FetchOrchestrator<IndicatorRecord> = FetchOrchestrator::new(vec![
            StubAdapter::ok(ProviderId::Fred, vec![gdp_record(ProviderId::Fred, dec!(100))]) as _,
            StubAdapter::failing(ProviderId::TradingEconomics) as _,
            StubAdapter::ok(ProviderId::Fmp, vec![gdp_record(ProviderId::Fmp, dec!(100))]) as _,
            StubAdapter::failing(ProviderId::AlphaVantage) as _,
            StubAdapter::ok(
                ProviderId::Finnhub,
                vec![gdp_record(ProviderId::Finnhub, dec!(100))],
            ) as _,
        ]);

        let result = orchestrator.dispatch("US", window()).await;
        assert_eq!(
            result.succeeded,
            vec![ProviderId::Fred, ProviderId::Fmp, ProviderId::Finnhub]
        );
        assert_eq!(
            result.failed,
            vec![ProviderId::TradingEconomics, ProviderId::AlphaVantage]
        );
        assert_eq!(result.partials.len(), 3);

        // 병합 결과의 출처는 성공한 프로바이더만 참조
        let merged = merge(result.partials);
        assert_eq!(merged.len(), 1);
        assert_eq!(
            merged[0].provenance,
            vec![ProviderId::Fred, ProviderId::Fmp, ProviderId::Finnhub]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_times_out_slow_adapter_without_cancelling_siblings() {
        let orchestrator = FetchOrchestrator::new(vec![
            StubAdapter::slow(
                ProviderId::Fred,
                Duration::from_secs(600),
                vec![gdp_record(ProviderId::Fred, dec!(1))],
            ) as _,
            StubAdapter::ok(
                ProviderId::TradingEconomics,
                vec![gdp_record(ProviderId::TradingEconomics, dec!(2))],
            ) as _,
        ])
        .with_adapter_timeout(Duration::from_secs(30));

        let result = orchestrator.dispatch("US", window()).await;
        assert_eq!(result.failed, vec![ProviderId::Fred]);
        assert_eq!(result.succeeded, vec![ProviderId::TradingEconomics]);
        assert_eq!(result.partials.len(), 1);
    }

    #[tokio::test]
    async fn test_fold_order_follows_registry_order() {
        // 등록 순서가 병합 우선순위: 첫 어댑터 값이 시드가 됨
        let mut first = gdp_record(ProviderId::Fred, dec!(100));
        first.unit = Some("Percent".to_string());
        let second = gdp_record(ProviderId::TradingEconomics, dec!(999));

        let orchestrator: FetchOrchestrator<IndicatorRecord> = FetchOrchestrator::new(vec![
            StubAdapter::ok(ProviderId::Fred, vec![first]) as _,
            StubAdapter::ok(ProviderId::TradingEconomics, vec![second]) as _,
        ]);

        let result = orchestrator.dispatch("US", window()).await;
        let merged = merge(result.partials);
        assert_eq!(merged[0].value, Some(dec!(100)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_batches_entities_with_delay() {
        let orchestrator = FetchOrchestrator::new(vec![StubAdapter::ok(
            ProviderId::Fred,
            vec![gdp_record(ProviderId::Fred, dec!(1))],
        ) as _])
        .with_batching(2, Duration::from_millis(3000));

        let entities: Vec<String> = ["A", "B", "C", "D", "E"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let start = tokio::time::Instant::now();
        let outcome = orchestrator.run(&entities, window()).await;

        // 3개 배치 → 2회의 배치 간 딜레이
        assert!(start.elapsed() >= Duration::from_millis(6000));
        assert_eq!(outcome.processed, 5);
        assert_eq!(outcome.succeeded, 5);
        assert_eq!(outcome.entity_outcomes.len(), 5);
    }

    #[tokio::test]
    async fn test_run_records_entity_failure_without_aborting_batch() {
        let orchestrator =
            FetchOrchestrator::new(vec![StubAdapter::failing(ProviderId::Fred) as _]);

        let entities = vec!["AAPL".to_string(), "MSFT".to_string()];
        let outcome = orchestrator.run(&entities, window()).await;

        assert_eq!(outcome.processed, 2);
        assert_eq!(outcome.failed, 2);
        assert!(outcome
            .entity_outcomes
            .iter()
            .all(|o| o.status == crate::stats::EntityStatus::Failed));
        assert!(outcome.partials.is_empty());
    }
}

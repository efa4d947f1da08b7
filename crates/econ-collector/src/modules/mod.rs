//! 동기화 파이프라인 모듈.
//!
//! 각 파이프라인은 어댑터 구성 → 오케스트레이터 실행 → 병합 → upsert의
//! 동일한 골격을 공유합니다. 엔티티/프로바이더 단위 실패는 요약에
//! 기록될 뿐 실행 전체를 중단시키지 않고, 저장 실패만 요약을 실패로
//! 표시합니다.

pub mod earnings_sync;
pub mod indicator_sync;

pub use earnings_sync::sync_earnings;
pub use indicator_sync::sync_indicators;

use std::time::Instant;

use econ_core::{DateRange, Reconcilable};
use tracing::{error, info};

use crate::orchestrator::FetchOrchestrator;
use crate::sink::RecordSink;
use crate::stats::RunSummary;

/// 공통 파이프라인 골격: 수집 → 병합 → 저장 → 요약.
pub(crate) async fn run_pipeline<T: Reconcilable + Send + 'static>(
    operation: &str,
    orchestrator: &FetchOrchestrator<T>,
    entities: &[String],
    window: DateRange,
    sink: &dyn RecordSink<T>,
) -> RunSummary {
    let started = Instant::now();
    let mut summary = RunSummary {
        date_range: Some(window),
        ..Default::default()
    };

    if entities.is_empty() {
        info!(operation = operation, "대상 엔티티가 없어 건너뜁니다");
        summary.success = true;
        summary.elapsed = started.elapsed();
        return summary;
    }
    if orchestrator.adapter_count() == 0 {
        summary
            .errors
            .push("활성화된 프로바이더가 없습니다".to_string());
        summary.elapsed = started.elapsed();
        summary.log_summary(operation);
        return summary;
    }

    let outcome = orchestrator.run(entities, window).await;
    summary.processed = outcome.processed;
    summary.succeeded = outcome.succeeded;
    summary.failed = outcome.failed;
    summary.per_entity = outcome.entity_outcomes;

    let merged = econ_core::merge(outcome.partials);
    info!(
        operation = operation,
        merged = merged.len(),
        "병합 완료, 저장 시작"
    );

    match sink.upsert(&merged).await {
        Ok(affected) => {
            summary.total_records = affected;
            summary.success = affected > 0 || summary.failed == 0;
        }
        Err(e) => {
            error!(operation = operation, error = %e, "저장 실패");
            summary.errors.push(format!("저장 실패: {e}"));
        }
    }

    summary.elapsed = started.elapsed();
    summary.log_summary(operation);
    summary
}

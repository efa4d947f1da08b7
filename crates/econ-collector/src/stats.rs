//! 실행 결과 요약 구조체.

use std::time::Duration;

use econ_core::DateRange;
use serde::{Deserialize, Serialize};

/// 엔티티별 처리 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    /// 1개 이상 프로바이더가 기여
    Success,
    /// 모든 프로바이더가 실패/무기여
    Failed,
}

/// 엔티티별 처리 결과 (보고용, 상한 개수까지만 유지).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityOutcome {
    /// 엔티티 (국가 코드 또는 종목 코드)
    pub entity: String,
    /// 처리 상태
    pub status: EntityStatus,
    /// 상태 메시지
    pub message: String,
    /// 수집된 부분 레코드 수
    pub records: usize,
}

/// 한 번의 동기화 실행 요약.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// 전체 성공 여부 (1개 이상 저장 시 true)
    pub success: bool,
    /// 조회 기간
    pub date_range: Option<DateRange>,
    /// 처리 대상 엔티티 수
    pub processed: usize,
    /// 성공 엔티티 수
    pub succeeded: usize,
    /// 실패 엔티티 수
    pub failed: usize,
    /// 병합 후 저장된 레코드 수
    pub total_records: usize,
    /// 에러 메시지 목록
    pub errors: Vec<String>,
    /// 엔티티별 결과 (상한 적용)
    pub per_entity: Vec<EntityOutcome>,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl RunSummary {
    /// 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            success = self.success,
            processed = self.processed,
            succeeded = self.succeeded,
            failed = self.failed,
            total_records = self.total_records,
            errors = self.errors.len(),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "동기화 완료"
        );
    }
}

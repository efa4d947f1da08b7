//! API 호출 간 정중함(politeness) 대기 스케줄러.
//!
//! 어댑터 내부의 순차 API 호출 사이에 주입식으로 사용합니다.
//! 고정 sleep 호출 대신 트레이트로 분리하여 테스트에서 대기 없이
//! 검증할 수 있고, 프로바이더별 제한을 코드 수정 없이 조정할 수 있습니다.

use std::time::Duration;

use async_trait::async_trait;

/// 호출 간 대기 계약.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// 다음 API 호출 전 대기.
    async fn pause(&self);
}

/// 고정 지연 Pacer (운영 기본값).
#[derive(Debug, Clone)]
pub struct FixedDelayPacer {
    delay: Duration,
}

impl FixedDelayPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// 밀리초 단위 생성 헬퍼.
    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }
}

#[async_trait]
impl Pacer for FixedDelayPacer {
    async fn pause(&self) {
        tokio::time::sleep(self.delay).await;
    }
}

/// 대기 없는 Pacer (테스트용).
#[derive(Debug, Clone, Default)]
pub struct NoopPacer;

#[async_trait]
impl Pacer for NoopPacer {
    async fn pause(&self) {}
}

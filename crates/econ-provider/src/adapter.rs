//! 프로바이더 어댑터 트레이트.

use async_trait::async_trait;
use econ_core::{DateRange, ProviderId};

/// 외부 프로바이더에서 한 엔티티의 데이터를 조회하는 계약.
///
/// `T`는 부분 정규 레코드 타입 (`IndicatorRecord` 또는 `EarningsRecord`).
///
/// # 실패 의미론
/// 구현체는 어떤 실패도 호출자에게 전파하지 않습니다. 개별 하위 호출
/// 실패는 건너뛰고 나머지를 계속하며, 호출 전체가 실패했거나 레코드가
/// 하나도 없으면 `None`을 반환합니다. 오케스트레이터는 `None`을
/// "프로바이더 실패"로 기록하고 병합 입력에서 제외합니다.
#[async_trait]
pub trait ProviderAdapter<T>: Send + Sync {
    /// 프로바이더 식별자. 등록 순서가 병합 fold 순서를 결정합니다.
    fn id(&self) -> ProviderId;

    /// 엔티티(지표 국가 코드 또는 종목 코드)의 기간 내 데이터 조회.
    async fn fetch(&self, entity: &str, window: DateRange) -> Option<Vec<T>>;
}

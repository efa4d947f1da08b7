//! 다중 소스 경제 데이터 정규화 코어.
//!
//! 여러 외부 프로바이더가 반환한 부분 레코드를 자연 키 기준으로 병합하여
//! 엔티티당 하나의 정규 레코드를 만드는 순수 로직을 제공합니다.
//! 네트워크/DB I/O는 포함하지 않습니다 (econ-provider, econ-collector 담당).
//!
//! # 모듈 구성
//! - [`domain`]: 정규 레코드 타입, 자연 키, 분류 메타데이터
//! - [`merge`]: 필드 단위 병합 엔진 (first-non-null-wins)
//! - [`derive`]: 파생 지표 계산 (변동률, 서프라이즈, 마진)

pub mod derive;
pub mod domain;
pub mod merge;

pub use domain::classify::{classify, ClassifiedMetadata};
pub use domain::record::{
    BeatMissMet, DateRange, EarningsRecord, FiscalPeriod, Frequency, IndicatorRecord,
    MarketImpact, PeriodType, ProviderId, Reconcilable, ReleaseStatus,
};
pub use merge::merge;

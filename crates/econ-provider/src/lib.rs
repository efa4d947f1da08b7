//! 외부 데이터 프로바이더 어댑터.
//!
//! 프로바이더마다 하나의 어댑터가 존재하며, 원시 응답을 방어적인 전용
//! 스키마로 디코딩한 뒤 정규 레코드로 변환합니다. 정규 형태로의 변환은
//! 어댑터 경계에서만 일어나고, 모든 실패는 어댑터 내부에서 흡수되어
//! `None`(기여 없음)으로 표현됩니다. 호출자에게 에러가 전파되지 않습니다.
//!
//! # 어댑터 목록
//! - 매크로 지표: [`FredAdapter`], [`TradingEconomicsAdapter`]
//! - 기업 실적: [`FmpAdapter`], [`AlphaVantageAdapter`], [`FinnhubAdapter`]

pub mod adapter;
pub mod error;
pub mod pace;
pub mod sources;

pub use adapter::ProviderAdapter;
pub use error::ProviderError;
pub use pace::{FixedDelayPacer, NoopPacer, Pacer};
pub use sources::alpha_vantage::AlphaVantageAdapter;
pub use sources::finnhub::FinnhubAdapter;
pub use sources::fmp::FmpAdapter;
pub use sources::fred::FredAdapter;
pub use sources::trading_economics::TradingEconomicsAdapter;

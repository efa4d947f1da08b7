//! 다중 소스 경제 데이터 수집기.
//!
//! 프로바이더 어댑터를 settle-all 방식으로 병렬 디스패치하고, 수집된
//! 부분 레코드를 병합한 뒤 Postgres에 멱등 upsert합니다.

pub mod config;
pub mod error;
pub mod modules;
pub mod orchestrator;
pub mod sink;
pub mod stats;

pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use orchestrator::FetchOrchestrator;
pub use sink::RecordSink;
pub use stats::{EntityOutcome, EntityStatus, RunSummary};

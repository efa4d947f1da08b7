//! 도메인 타입 정의.

pub mod classify;
pub mod record;

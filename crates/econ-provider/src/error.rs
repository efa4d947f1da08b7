//! 프로바이더 에러 타입.

use thiserror::Error;

/// 프로바이더 어댑터 내부 에러.
///
/// 어댑터 밖으로 전파되지 않고 `None`(기여 없음)으로 변환됩니다.
/// 로그 메시지 생성을 위해서만 사용합니다.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP 요청 실패: {0}")]
    Http(#[from] reqwest::Error),

    #[error("비정상 응답 상태: {status}")]
    Status { status: u16 },

    #[error("응답 파싱 실패: {0}")]
    Decode(String),

    #[error("Rate limit 초과")]
    RateLimited,

    #[error("API 키 미설정: {0}")]
    MissingCredential(&'static str),
}

//! 환경변수 기반 설정 모듈.

use std::time::Duration;

use crate::Result;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 데이터베이스 URL
    pub database_url: String,
    /// 데이터 프로바이더 설정
    pub providers: DataProviderConfig,
    /// 매크로 지표 동기화 설정
    pub indicator_sync: IndicatorSyncConfig,
    /// 실적 동기화 설정
    pub earnings_sync: EarningsSyncConfig,
    /// 어댑터별 타임아웃 (초)
    pub adapter_timeout_secs: u64,
    /// 데몬 모드 설정
    pub daemon: DaemonConfig,
}

/// 데이터 프로바이더 설정
///
/// 각 프로바이더의 활성화 여부와 인증 키를 제어합니다.
/// 키가 비어 있으면 해당 어댑터는 기여 없이 건너뜁니다.
#[derive(Debug, Clone)]
pub struct DataProviderConfig {
    /// FRED 활성화 (매크로, US)
    pub fred_enabled: bool,
    /// FRED API 키
    pub fred_api_key: String,
    /// Trading Economics 활성화 (매크로)
    pub trading_economics_enabled: bool,
    /// Trading Economics API 키
    pub trading_economics_api_key: String,
    /// FMP 활성화 (실적)
    pub fmp_enabled: bool,
    /// FMP API 키
    pub fmp_api_key: String,
    /// Alpha Vantage 활성화 (실적)
    pub alpha_vantage_enabled: bool,
    /// Alpha Vantage API 키
    pub alpha_vantage_api_key: String,
    /// Finnhub 활성화 (실적)
    pub finnhub_enabled: bool,
    /// Finnhub API 키
    pub finnhub_api_key: String,
    /// 프로바이더 내부 호출 간 딜레이 (밀리초)
    pub request_delay_ms: u64,
}

/// 매크로 지표 동기화 설정
#[derive(Debug, Clone)]
pub struct IndicatorSyncConfig {
    /// 대상 국가 목록 (예: ["US", "KR"])
    pub countries: Vec<String>,
    /// 조회 기간 (일)
    pub window_days: i64,
}

/// 실적 동기화 설정
#[derive(Debug, Clone)]
pub struct EarningsSyncConfig {
    /// 대상 종목 목록
    pub symbols: Vec<String>,
    /// 배치당 종목 수
    pub batch_size: usize,
    /// 배치 간 딜레이 (밀리초)
    pub batch_delay_ms: u64,
}

/// 데몬 모드 설정
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// 워크플로우 실행 주기 (분 단위)
    pub interval_minutes: u64,
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL").map_err(|_| {
            crate::error::CollectorError::Config(
                "DATABASE_URL 환경변수가 설정되지 않았습니다".to_string(),
            )
        })?;

        Ok(Self {
            database_url,
            providers: DataProviderConfig {
                fred_enabled: env_var_bool("PROVIDER_FRED_ENABLED", true),
                fred_api_key: std::env::var("FRED_API_KEY").unwrap_or_default(),
                trading_economics_enabled: env_var_bool("PROVIDER_TRADING_ECONOMICS_ENABLED", true),
                trading_economics_api_key: std::env::var("TRADING_ECONOMICS_API_KEY")
                    .unwrap_or_default(),
                fmp_enabled: env_var_bool("PROVIDER_FMP_ENABLED", true),
                fmp_api_key: std::env::var("FMP_API_KEY").unwrap_or_default(),
                alpha_vantage_enabled: env_var_bool("PROVIDER_ALPHA_VANTAGE_ENABLED", true),
                alpha_vantage_api_key: std::env::var("ALPHA_VANTAGE_API_KEY").unwrap_or_default(),
                finnhub_enabled: env_var_bool("PROVIDER_FINNHUB_ENABLED", true),
                finnhub_api_key: std::env::var("FINNHUB_API_KEY").unwrap_or_default(),
                request_delay_ms: env_var_parse("PROVIDER_REQUEST_DELAY_MS", 300),
            },
            indicator_sync: IndicatorSyncConfig {
                countries: env_var_list_or_default(
                    "INDICATOR_COUNTRIES",
                    vec!["US".to_string()],
                ),
                window_days: env_var_parse("INDICATOR_WINDOW_DAYS", 365),
            },
            earnings_sync: EarningsSyncConfig {
                symbols: env_var_list("EARNINGS_SYMBOLS"),
                batch_size: env_var_parse("EARNINGS_BATCH_SIZE", 5),
                batch_delay_ms: env_var_parse("EARNINGS_BATCH_DELAY_MS", 3000),
            },
            adapter_timeout_secs: env_var_parse("ADAPTER_TIMEOUT_SECS", 30),
            daemon: DaemonConfig {
                interval_minutes: env_var_parse("DAEMON_INTERVAL_MINUTES", 60),
            },
        })
    }
}

impl EarningsSyncConfig {
    /// 배치 간 딜레이를 Duration으로 반환
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

impl DaemonConfig {
    /// 워크플로우 실행 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// 환경변수에서 bool 값 파싱
fn env_var_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

/// 환경변수에서 쉼표로 구분된 리스트 파싱
fn env_var_list(key: &str) -> Vec<String> {
    std::env::var(key)
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// 환경변수에서 리스트 파싱 (기본값 지원)
fn env_var_list_or_default(key: &str, default: Vec<String>) -> Vec<String> {
    std::env::var(key)
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or(default)
}

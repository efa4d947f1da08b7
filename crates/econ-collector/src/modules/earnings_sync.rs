//! 기업 실적 동기화 파이프라인.
//!
//! 설정된 종목 목록을 배치로 나눠 FMP, Alpha Vantage, Finnhub 어댑터를
//! 병렬 디스패치하고, 부분 레코드를 병합해 `company_earnings` 테이블에
//! upsert합니다. 배치 사이에는 정중함 딜레이를 둡니다.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use econ_core::{DateRange, EarningsRecord};
use econ_provider::{AlphaVantageAdapter, FinnhubAdapter, FmpAdapter, ProviderAdapter};
use tracing::info;

use crate::config::CollectorConfig;
use crate::modules::run_pipeline;
use crate::orchestrator::FetchOrchestrator;
use crate::sink::RecordSink;
use crate::stats::RunSummary;

/// 실적 조회 기간 (일). 분기 8개를 넉넉히 덮는 2년.
const EARNINGS_WINDOW_DAYS: i64 = 730;

/// 설정에서 실적 어댑터 목록 구성.
///
/// 비활성화되었거나 키가 비어 있는 프로바이더는 건너뜁니다.
/// 실적 어댑터는 종목당 요청이 하나라 Pacer 없이 배치 딜레이만으로
/// 정중함을 유지합니다.
pub fn build_earnings_adapters(
    config: &CollectorConfig,
) -> Vec<Arc<dyn ProviderAdapter<EarningsRecord>>> {
    let providers = &config.providers;
    let mut adapters: Vec<Arc<dyn ProviderAdapter<EarningsRecord>>> = Vec::new();

    if providers.fmp_enabled && !providers.fmp_api_key.is_empty() {
        adapters.push(Arc::new(FmpAdapter::new(providers.fmp_api_key.clone())));
    }
    if providers.alpha_vantage_enabled && !providers.alpha_vantage_api_key.is_empty() {
        adapters.push(Arc::new(AlphaVantageAdapter::new(
            providers.alpha_vantage_api_key.clone(),
        )));
    }
    if providers.finnhub_enabled && !providers.finnhub_api_key.is_empty() {
        adapters.push(Arc::new(FinnhubAdapter::new(
            providers.finnhub_api_key.clone(),
        )));
    }

    adapters
}

/// 기업 실적 동기화 실행.
pub async fn sync_earnings(
    config: &CollectorConfig,
    sink: &dyn RecordSink<EarningsRecord>,
) -> RunSummary {
    let symbols = &config.earnings_sync.symbols;
    let today = Utc::now().date_naive();
    let window = DateRange {
        from: today - chrono::Duration::days(EARNINGS_WINDOW_DAYS),
        to: today,
    };

    info!(
        symbols = symbols.len(),
        batch_size = config.earnings_sync.batch_size,
        "실적 동기화 시작"
    );

    let orchestrator = FetchOrchestrator::new(build_earnings_adapters(config))
        .with_adapter_timeout(Duration::from_secs(config.adapter_timeout_secs))
        .with_batching(
            config.earnings_sync.batch_size,
            config.earnings_sync.batch_delay(),
        );

    run_pipeline("earnings_sync", &orchestrator, symbols, window, sink).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        DaemonConfig, DataProviderConfig, EarningsSyncConfig, IndicatorSyncConfig,
    };

    fn test_config() -> CollectorConfig {
        CollectorConfig {
            database_url: "postgres://localhost/test".to_string(),
            providers: DataProviderConfig {
                fred_enabled: true,
                fred_api_key: String::new(),
                trading_economics_enabled: true,
                trading_economics_api_key: String::new(),
                fmp_enabled: true,
                fmp_api_key: "fmp-key".to_string(),
                alpha_vantage_enabled: true,
                alpha_vantage_api_key: "av-key".to_string(),
                finnhub_enabled: false,
                finnhub_api_key: "fh-key".to_string(),
                request_delay_ms: 0,
            },
            indicator_sync: IndicatorSyncConfig {
                countries: Vec::new(),
                window_days: 365,
            },
            earnings_sync: EarningsSyncConfig {
                symbols: vec!["AAPL".to_string(), "MSFT".to_string()],
                batch_size: 5,
                batch_delay_ms: 0,
            },
            adapter_timeout_secs: 30,
            daemon: DaemonConfig {
                interval_minutes: 60,
            },
        }
    }

    #[test]
    fn test_build_adapters_respects_enabled_flag() {
        // Finnhub은 키가 있어도 비활성화 상태면 제외
        let adapters = build_earnings_adapters(&test_config());
        assert_eq!(adapters.len(), 2);
    }
}

//! 매크로 지표 동기화 파이프라인.
//!
//! 설정된 국가 목록에 대해 FRED와 Trading Economics 어댑터를 병렬
//! 디스패치하고, 부분 레코드를 병합해 `economic_indicator` 테이블에
//! upsert합니다.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use econ_core::{DateRange, IndicatorRecord};
use econ_provider::{
    FixedDelayPacer, FredAdapter, Pacer, ProviderAdapter, TradingEconomicsAdapter,
};
use tracing::info;

use crate::config::CollectorConfig;
use crate::modules::run_pipeline;
use crate::orchestrator::FetchOrchestrator;
use crate::sink::RecordSink;
use crate::stats::RunSummary;

/// 설정에서 지표 어댑터 목록 구성.
///
/// 비활성화되었거나 키가 비어 있는 프로바이더는 건너뜁니다.
pub fn build_indicator_adapters(
    config: &CollectorConfig,
) -> Vec<Arc<dyn ProviderAdapter<IndicatorRecord>>> {
    let providers = &config.providers;
    let pacer: Arc<dyn Pacer> =
        Arc::new(FixedDelayPacer::from_millis(providers.request_delay_ms));
    let mut adapters: Vec<Arc<dyn ProviderAdapter<IndicatorRecord>>> = Vec::new();

    if providers.fred_enabled && !providers.fred_api_key.is_empty() {
        adapters.push(Arc::new(FredAdapter::with_pacer(
            providers.fred_api_key.clone(),
            pacer.clone(),
        )));
    }
    if providers.trading_economics_enabled && !providers.trading_economics_api_key.is_empty() {
        adapters.push(Arc::new(TradingEconomicsAdapter::with_pacer(
            providers.trading_economics_api_key.clone(),
            pacer.clone(),
        )));
    }

    adapters
}

/// 매크로 지표 동기화 실행.
pub async fn sync_indicators(
    config: &CollectorConfig,
    sink: &dyn RecordSink<IndicatorRecord>,
) -> RunSummary {
    let countries = &config.indicator_sync.countries;
    let today = Utc::now().date_naive();
    let window = DateRange {
        from: today - chrono::Duration::days(config.indicator_sync.window_days),
        to: today,
    };

    info!(
        countries = countries.len(),
        from = %window.from,
        to = %window.to,
        "매크로 지표 동기화 시작"
    );

    let orchestrator = FetchOrchestrator::new(build_indicator_adapters(config))
        .with_adapter_timeout(Duration::from_secs(config.adapter_timeout_secs));

    run_pipeline("indicator_sync", &orchestrator, countries, window, sink).await
}

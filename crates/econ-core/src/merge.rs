//! 필드 단위 병합 엔진.
//!
//! 여러 프로바이더가 반환한 부분 레코드를 자연 키로 그룹화하여 엔티티당
//! 하나의 정규 레코드로 접습니다. 첫 번째 레코드가 시드가 되고, 이후
//! 레코드는 비어 있는 필드만 채웁니다 (first-non-null-wins). fold 순서는
//! 도착 순서(= 어댑터 등록 순서)로 고정되어 결과가 재현 가능합니다.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::record::Reconcilable;

/// 부분 레코드 집합을 정규 레코드 목록으로 병합.
///
/// 1. 키 필드가 누락된 레코드 제거
/// 2. 자연 키로 그룹화, 도착 순서대로 fold (빈 필드만 채움, 출처 누적)
/// 3. 기본값 적용 및 레코드 내부 파생 필드 보강
/// 4. 기간/보고일 내림차순 정렬
/// 5. 기간 제외 키로 재그룹화해 최신→과거 순회하며 바로 이전 기간
///    레코드로 변동치 보강 (기준값 부재·0이면 건너뜀)
pub fn merge<T: Reconcilable>(partials: Vec<T>) -> Vec<T> {
    let total = partials.len();

    // 1~2. 자연 키 기준 fold (첫 등장 순서 보존)
    let mut key_order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, T> = HashMap::new();
    let mut discarded = 0usize;

    for partial in partials {
        let Some(key) = partial.natural_key() else {
            discarded += 1;
            continue;
        };
        match groups.get_mut(&key) {
            Some(seed) => seed.absorb(&partial),
            None => {
                key_order.push(key.clone());
                groups.insert(key, partial);
            }
        }
    }

    if discarded > 0 {
        debug!(total = total, discarded = discarded, "키 필드 누락 레코드 제거");
    }

    let mut merged: Vec<T> = key_order
        .iter()
        .filter_map(|k| groups.remove(k))
        .collect();

    // 3. 기본값 및 내부 파생 필드
    for record in merged.iter_mut() {
        record.apply_defaults();
        record.enrich();
    }

    // 4. 기간/보고일 내림차순 정렬 (안정 정렬로 동률 시 fold 순서 유지)
    merged.sort_by(|a, b| b.order_date().cmp(&a.order_date()));

    // 5. 시리즈별 최신→과거 순회하며 변동치 보강
    let mut series: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, record) in merged.iter().enumerate() {
        series.entry(record.series_key()).or_default().push(idx);
    }

    for indices in series.values() {
        for window in indices.windows(2) {
            let (newer, older) = (window[0], window[1]);
            let baseline = merged[older].clone();
            merged[newer].fill_change_from(&baseline);
        }
        // 전년 동기 레코드가 있으면 YoY 보강
        for i in 0..indices.len() {
            for j in (i + 1)..indices.len() {
                if merged[indices[i]].is_year_prior(&merged[indices[j]]) {
                    let prior = merged[indices[j]].clone();
                    merged[indices[i]].fill_yoy_from(&prior);
                    break;
                }
            }
        }
    }

    merged
}

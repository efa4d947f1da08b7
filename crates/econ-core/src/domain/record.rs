//! 정규 레코드 및 자연 키 타입.
//!
//! 프로바이더별 어댑터가 반환하는 부분 레코드와 병합 결과인 정규 레코드는
//! 동일한 타입을 사용합니다. 필드의 부재는 `Option::None`으로만 표현하며,
//! `Some(0)`은 채워진 값으로 취급합니다 (덮어쓰기/기본값 대상 아님).

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 데이터 프로바이더 식별자.
///
/// 환경변수 기반 동적 레지스트리 대신 명시적 열거형으로 고정합니다.
/// 어댑터 등록 순서가 곧 병합 fold 순서이므로 결과가 재현 가능합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderId {
    /// FRED (세인트루이스 연준)
    Fred,
    /// Trading Economics
    TradingEconomics,
    /// Financial Modeling Prep
    Fmp,
    /// Alpha Vantage
    AlphaVantage,
    /// Finnhub
    Finnhub,
}

impl ProviderId {
    /// 영속화/로그용 식별 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fred => "FRED",
            Self::TradingEconomics => "TRADING_ECONOMICS",
            Self::Fmp => "FMP",
            Self::AlphaVantage => "ALPHA_VANTAGE",
            Self::Finnhub => "FINNHUB",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 조회 기간 (닫힌 날짜 구간).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// 시작일 (포함)
    pub from: NaiveDate,
    /// 종료일 (포함)
    pub to: NaiveDate,
}

impl DateRange {
    /// 새 기간 생성.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// 날짜가 기간에 포함되는지 확인.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }
}

/// 발표 주기.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annual,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
        }
    }
}

/// 관측 기간 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    Monthly,
    Quarterly,
    Annual,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
        }
    }
}

/// 시장 영향도.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketImpact {
    Low,
    Medium,
    High,
}

impl MarketImpact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// 발표 상태 (잠정치/확정치).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseStatus {
    Preliminary,
    Final,
}

impl ReleaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preliminary => "preliminary",
            Self::Final => "final",
        }
    }
}

/// 실적 대비 컨센서스 분류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeatMissMet {
    Beat,
    Miss,
    Met,
}

impl BeatMissMet {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beat => "beat",
            Self::Miss => "miss",
            Self::Met => "met",
        }
    }
}

/// 회계 기간 (분기 또는 연간).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FiscalPeriod {
    Q1,
    Q2,
    Q3,
    Q4,
    /// 연간 실적 (FY)
    Annual,
}

impl FiscalPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::Q4 => "Q4",
            Self::Annual => "FY",
        }
    }

    /// "Q1"/"Q2"/"FY" 등 문자열에서 파싱. 인식 불가 시 None.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "Q1" | "1" => Some(Self::Q1),
            "Q2" | "2" => Some(Self::Q2),
            "Q3" | "3" => Some(Self::Q3),
            "Q4" | "4" => Some(Self::Q4),
            "FY" | "ANNUAL" => Some(Self::Annual),
            _ => None,
        }
    }

    /// 달(month)에서 해당 분기 도출.
    pub fn from_month(month: u32) -> Self {
        match month {
            1..=3 => Self::Q1,
            4..=6 => Self::Q2,
            7..=9 => Self::Q3,
            _ => Self::Q4,
        }
    }

    /// 회계 기간 말일 (정렬용 대체 날짜).
    pub fn period_end(&self, fiscal_year: i32) -> NaiveDate {
        let (month, day) = match self {
            Self::Q1 => (3, 31),
            Self::Q2 => (6, 30),
            Self::Q3 => (9, 30),
            Self::Q4 | Self::Annual => (12, 31),
        };
        // 위 조합은 항상 유효한 날짜
        NaiveDate::from_ymd_opt(fiscal_year, month, day)
            .unwrap_or(NaiveDate::MIN)
    }
}

impl std::fmt::Display for FiscalPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 병합 엔진이 요구하는 레코드 계약.
///
/// 인디케이터/실적 두 파이프라인이 이 트레이트를 통해 하나의
/// [`crate::merge::merge`] 구현을 공유합니다.
pub trait Reconcilable: Clone {
    /// 자연 키 (키 필드 누락 시 None → 병합에서 제외).
    fn natural_key(&self) -> Option<String>;

    /// 기간을 제외한 시리즈 키 (전기 대비 변동 계산 그룹).
    fn series_key(&self) -> String;

    /// 정렬 기준 날짜 (보고일/기간일, 내림차순 정렬).
    fn order_date(&self) -> NaiveDate;

    /// 다른 부분 레코드에서 비어 있는 필드만 채워 넣고 출처를 누적.
    /// 이미 채워진 필드는 절대 덮어쓰지 않습니다.
    fn absorb(&mut self, other: &Self);

    /// 끝까지 채워지지 않은 필드의 기본값 적용.
    fn apply_defaults(&mut self);

    /// 레코드 내부 값만으로 계산 가능한 파생 필드 보강.
    fn enrich(&mut self);

    /// 같은 시리즈의 바로 이전 기간 레코드로 변동치 보강.
    fn fill_change_from(&mut self, older: &Self);

    /// `older`가 이 레코드의 정확히 1년 전 기간인지 판정.
    /// 전년 동기 대비 계산 대상이 없는 타입은 false를 반환합니다.
    fn is_year_prior(&self, older: &Self) -> bool {
        let _ = older;
        false
    }

    /// 전년 동기 레코드로 YoY 변동 보강. 기본 구현은 아무것도 하지 않음.
    fn fill_yoy_from(&mut self, year_prior: &Self) {
        let _ = year_prior;
    }

    /// 기여한 프로바이더 목록 (항상 1개 이상).
    fn provenance(&self) -> &[ProviderId];
}

/// 비어 있는 필드만 채우는 병합 헬퍼.
fn fill<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
    if dst.is_none() {
        if let Some(v) = src {
            *dst = Some(v.clone());
        }
    }
}

/// 출처 목록에 중복 없이 추가 (순서 유지).
fn append_provenance(dst: &mut Vec<ProviderId>, src: &[ProviderId]) {
    for p in src {
        if !dst.contains(p) {
            dst.push(*p);
        }
    }
}

/// 매크로 경제 지표 정규 레코드.
///
/// 자연 키: `(indicator_code, country, period_date)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRecord {
    /// 표준 지표 코드 (예: GDP, CPI)
    pub indicator_code: String,
    /// 국가 코드 (예: US, KR)
    pub country: String,
    /// 관측 기간 날짜
    pub period_date: NaiveDate,

    /// 표시 이름
    pub display_name: Option<String>,
    /// 단위 (Percent, Index 등)
    pub unit: Option<String>,
    /// 통화
    pub currency: Option<String>,
    /// 발표 주기
    pub frequency: Option<Frequency>,
    /// 관측 기간 유형
    pub period_type: Option<PeriodType>,
    /// 중요도 (1=낮음 ~ 3=높음)
    pub importance: Option<u8>,
    /// 시장 영향도
    pub market_impact: Option<MarketImpact>,
    /// 계절조정 여부
    pub seasonally_adjusted: Option<bool>,
    /// 발표 상태
    pub status: Option<ReleaseStatus>,
    /// 수정 발표 횟수
    pub revision_count: Option<i32>,

    /// 관측값
    pub value: Option<Decimal>,
    /// 컨센서스 예상치
    pub estimated_value: Option<Decimal>,
    /// 직전 기간 값
    pub previous_value: Option<Decimal>,

    /// 전기 대비 변동 (절대값)
    pub change_value: Option<Decimal>,
    /// 전기 대비 변동률 (%)
    pub change_percent: Option<Decimal>,
    /// 전년 동기 대비 변동률 (%)
    pub yoy_change: Option<Decimal>,

    /// 기여 프로바이더 (fold 순서, 중복 제거)
    pub provenance: Vec<ProviderId>,
}

impl IndicatorRecord {
    /// 키 필드와 출처만 채운 빈 레코드 생성.
    pub fn new(
        indicator_code: impl Into<String>,
        country: impl Into<String>,
        period_date: NaiveDate,
        provider: ProviderId,
    ) -> Self {
        Self {
            indicator_code: indicator_code.into(),
            country: country.into(),
            period_date,
            display_name: None,
            unit: None,
            currency: None,
            frequency: None,
            period_type: None,
            importance: None,
            market_impact: None,
            seasonally_adjusted: None,
            status: None,
            revision_count: None,
            value: None,
            estimated_value: None,
            previous_value: None,
            change_value: None,
            change_percent: None,
            yoy_change: None,
            provenance: vec![provider],
        }
    }

    /// 영속화용 결합 프로바이더 태그 (예: "FRED,TRADING_ECONOMICS").
    pub fn provider_tag(&self) -> String {
        provider_tag(&self.provenance)
    }
}

impl Reconcilable for IndicatorRecord {
    fn natural_key(&self) -> Option<String> {
        if self.indicator_code.is_empty() || self.country.is_empty() {
            return None;
        }
        Some(format!(
            "{}|{}|{}",
            self.indicator_code, self.country, self.period_date
        ))
    }

    fn series_key(&self) -> String {
        format!("{}|{}", self.indicator_code, self.country)
    }

    fn order_date(&self) -> NaiveDate {
        self.period_date
    }

    fn absorb(&mut self, other: &Self) {
        fill(&mut self.display_name, &other.display_name);
        fill(&mut self.unit, &other.unit);
        fill(&mut self.currency, &other.currency);
        fill(&mut self.frequency, &other.frequency);
        fill(&mut self.period_type, &other.period_type);
        fill(&mut self.importance, &other.importance);
        fill(&mut self.market_impact, &other.market_impact);
        fill(&mut self.seasonally_adjusted, &other.seasonally_adjusted);
        fill(&mut self.status, &other.status);
        fill(&mut self.revision_count, &other.revision_count);
        fill(&mut self.value, &other.value);
        fill(&mut self.estimated_value, &other.estimated_value);
        fill(&mut self.previous_value, &other.previous_value);
        fill(&mut self.change_value, &other.change_value);
        fill(&mut self.change_percent, &other.change_percent);
        fill(&mut self.yoy_change, &other.yoy_change);
        append_provenance(&mut self.provenance, &other.provenance);
    }

    fn apply_defaults(&mut self) {
        if self.period_type.is_none() {
            self.period_type = Some(PeriodType::Monthly);
        }
        if self.status.is_none() {
            self.status = Some(ReleaseStatus::Final);
        }
        if self.revision_count.is_none() {
            self.revision_count = Some(0);
        }
    }

    fn enrich(&mut self) {
        if self.change_value.is_none() || self.change_percent.is_none() {
            if let (Some(cur), Some(prev)) = (self.value, self.previous_value) {
                if let Some((delta, pct)) = crate::derive::change(cur, prev) {
                    if self.change_value.is_none() {
                        self.change_value = Some(delta);
                    }
                    if self.change_percent.is_none() {
                        self.change_percent = Some(pct);
                    }
                }
            }
        }
    }

    fn fill_change_from(&mut self, older: &Self) {
        if self.change_value.is_some() && self.change_percent.is_some() {
            return;
        }
        let (Some(cur), Some(base)) = (self.value, older.value) else {
            return;
        };
        if let Some((delta, pct)) = crate::derive::change(cur, base) {
            if self.change_value.is_none() {
                self.change_value = Some(delta);
            }
            if self.change_percent.is_none() {
                self.change_percent = Some(pct);
            }
            if self.previous_value.is_none() {
                self.previous_value = Some(base);
            }
        }
    }

    fn is_year_prior(&self, older: &Self) -> bool {
        older.period_date.year() + 1 == self.period_date.year()
            && older.period_date.month() == self.period_date.month()
    }

    fn fill_yoy_from(&mut self, year_prior: &Self) {
        if self.yoy_change.is_some() {
            return;
        }
        if let (Some(cur), Some(base)) = (self.value, year_prior.value) {
            if let Some((_, pct)) = crate::derive::change(cur, base) {
                self.yoy_change = Some(pct);
            }
        }
    }

    fn provenance(&self) -> &[ProviderId] {
        &self.provenance
    }
}

/// 기업 실적 정규 레코드.
///
/// 자연 키: `(symbol, fiscal_year, fiscal_period)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsRecord {
    /// 종목 코드
    pub symbol: String,
    /// 회계 연도
    pub fiscal_year: i32,
    /// 회계 기간 (Q1~Q4 또는 FY)
    pub fiscal_period: FiscalPeriod,

    /// 실적 발표일
    pub report_date: Option<NaiveDate>,
    /// 통화
    pub currency: Option<String>,
    /// 발표 상태
    pub status: Option<ReleaseStatus>,

    /// 주당순이익 (실제)
    pub eps: Option<Decimal>,
    /// 주당순이익 (컨센서스)
    pub eps_estimated: Option<Decimal>,
    /// 매출액
    pub revenue: Option<Decimal>,
    /// 매출액 (컨센서스)
    pub revenue_estimated: Option<Decimal>,
    /// 순이익
    pub net_income: Option<Decimal>,
    /// 영업이익
    pub operating_income: Option<Decimal>,

    /// EPS 서프라이즈 (실제 - 예상)
    pub surprise: Option<Decimal>,
    /// EPS 서프라이즈 비율 (%)
    pub surprise_percent: Option<Decimal>,
    /// 컨센서스 대비 분류
    pub beat_miss_met: Option<BeatMissMet>,
    /// 영업이익률 (영업이익/매출)
    pub operating_margin: Option<Decimal>,
    /// 순이익률 (순이익/매출)
    pub net_margin: Option<Decimal>,
    /// 전분기 대비 EPS 변동
    pub eps_change: Option<Decimal>,
    /// 전분기 대비 EPS 변동률 (%)
    pub eps_change_percent: Option<Decimal>,

    /// 기여 프로바이더 (fold 순서, 중복 제거)
    pub provenance: Vec<ProviderId>,
}

impl EarningsRecord {
    /// 키 필드와 출처만 채운 빈 레코드 생성.
    pub fn new(
        symbol: impl Into<String>,
        fiscal_year: i32,
        fiscal_period: FiscalPeriod,
        provider: ProviderId,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            fiscal_year,
            fiscal_period,
            report_date: None,
            currency: None,
            status: None,
            eps: None,
            eps_estimated: None,
            revenue: None,
            revenue_estimated: None,
            net_income: None,
            operating_income: None,
            surprise: None,
            surprise_percent: None,
            beat_miss_met: None,
            operating_margin: None,
            net_margin: None,
            eps_change: None,
            eps_change_percent: None,
            provenance: vec![provider],
        }
    }

    /// 영속화용 결합 프로바이더 태그.
    pub fn provider_tag(&self) -> String {
        provider_tag(&self.provenance)
    }
}

impl Reconcilable for EarningsRecord {
    fn natural_key(&self) -> Option<String> {
        if self.symbol.is_empty() {
            return None;
        }
        Some(format!(
            "{}|{}|{}",
            self.symbol, self.fiscal_year, self.fiscal_period
        ))
    }

    fn series_key(&self) -> String {
        self.symbol.clone()
    }

    fn order_date(&self) -> NaiveDate {
        // 보고일이 없으면 회계 기간 말일로 대체 (정렬 가능성 보장)
        self.report_date
            .unwrap_or_else(|| self.fiscal_period.period_end(self.fiscal_year))
    }

    fn absorb(&mut self, other: &Self) {
        fill(&mut self.report_date, &other.report_date);
        fill(&mut self.currency, &other.currency);
        fill(&mut self.status, &other.status);
        fill(&mut self.eps, &other.eps);
        fill(&mut self.eps_estimated, &other.eps_estimated);
        fill(&mut self.revenue, &other.revenue);
        fill(&mut self.revenue_estimated, &other.revenue_estimated);
        fill(&mut self.net_income, &other.net_income);
        fill(&mut self.operating_income, &other.operating_income);
        fill(&mut self.surprise, &other.surprise);
        fill(&mut self.surprise_percent, &other.surprise_percent);
        fill(&mut self.beat_miss_met, &other.beat_miss_met);
        fill(&mut self.operating_margin, &other.operating_margin);
        fill(&mut self.net_margin, &other.net_margin);
        fill(&mut self.eps_change, &other.eps_change);
        fill(&mut self.eps_change_percent, &other.eps_change_percent);
        append_provenance(&mut self.provenance, &other.provenance);
    }

    fn apply_defaults(&mut self) {
        if self.status.is_none() {
            self.status = Some(ReleaseStatus::Final);
        }
        if self.currency.is_none() {
            self.currency = Some("USD".to_string());
        }
    }

    fn enrich(&mut self) {
        // 서프라이즈: 실제/예상 모두 있고 예상이 0이 아닐 때만
        if self.surprise.is_none() || self.surprise_percent.is_none() {
            if let (Some(actual), Some(estimate)) = (self.eps, self.eps_estimated) {
                if let Some((diff, pct)) = crate::derive::surprise(actual, estimate) {
                    if self.surprise.is_none() {
                        self.surprise = Some(diff);
                    }
                    if self.surprise_percent.is_none() {
                        self.surprise_percent = Some(pct);
                    }
                }
            }
        }
        if self.beat_miss_met.is_none() {
            if let Some(s) = self.surprise {
                self.beat_miss_met = Some(crate::derive::classify_surprise(s));
            }
        }
        if self.operating_margin.is_none() {
            if let (Some(oi), Some(rev)) = (self.operating_income, self.revenue) {
                self.operating_margin = crate::derive::margin(oi, rev);
            }
        }
        if self.net_margin.is_none() {
            if let (Some(ni), Some(rev)) = (self.net_income, self.revenue) {
                self.net_margin = crate::derive::margin(ni, rev);
            }
        }
    }

    fn fill_change_from(&mut self, older: &Self) {
        if self.eps_change.is_some() && self.eps_change_percent.is_some() {
            return;
        }
        let (Some(cur), Some(base)) = (self.eps, older.eps) else {
            return;
        };
        if let Some((delta, pct)) = crate::derive::change(cur, base) {
            if self.eps_change.is_none() {
                self.eps_change = Some(delta);
            }
            if self.eps_change_percent.is_none() {
                self.eps_change_percent = Some(pct);
            }
        }
    }

    fn provenance(&self) -> &[ProviderId] {
        &self.provenance
    }
}

/// 출처 목록을 쉼표로 결합한 영속화용 태그.
pub fn provider_tag(provenance: &[ProviderId]) -> String {
    provenance
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

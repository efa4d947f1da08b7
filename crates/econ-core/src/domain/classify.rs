//! 메타데이터 분류기.
//!
//! 프로바이더별 원시 코드/라벨을 표준 분류 체계로 매핑합니다.
//! 순서가 있는 부분 문자열 규칙을 위에서부터 적용하며 (첫 일치 우선),
//! 어떤 규칙에도 걸리지 않으면 보수적인 기본값으로 폴백합니다.
//! 순수 함수이며 I/O가 없습니다.

use crate::domain::record::{Frequency, MarketImpact, PeriodType};

/// 분류 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedMetadata {
    /// 표준 지표 코드
    pub standard_code: String,
    /// 표시 이름
    pub display_name: String,
    /// 중요도 (1=낮음 ~ 3=높음)
    pub importance: u8,
    /// 시장 영향도
    pub market_impact: MarketImpact,
    /// 단위
    pub unit: String,
    /// 발표 주기
    pub frequency: Frequency,
    /// 관측 기간 유형
    pub period_type: PeriodType,
}

/// 분류 규칙: 패턴 중 하나라도 포함되면 일치.
struct Rule {
    patterns: &'static [&'static str],
    standard_code: &'static str,
    display_name: &'static str,
    importance: u8,
    market_impact: MarketImpact,
    unit: &'static str,
    frequency: Frequency,
    period_type: PeriodType,
}

/// 순서 보장 규칙 테이블. 위에서부터 첫 일치가 승리합니다.
const RULES: &[Rule] = &[
    Rule {
        patterns: &["GDP", "GROSS DOMESTIC"],
        standard_code: "GDP",
        display_name: "Gross Domestic Product",
        importance: 3,
        market_impact: MarketImpact::High,
        unit: "Percent",
        frequency: Frequency::Quarterly,
        period_type: PeriodType::Quarterly,
    },
    Rule {
        patterns: &["CPI", "INFLATION", "CONSUMER PRICE"],
        standard_code: "CPI",
        display_name: "Consumer Price Index",
        importance: 3,
        market_impact: MarketImpact::High,
        unit: "Percent",
        frequency: Frequency::Monthly,
        period_type: PeriodType::Monthly,
    },
    Rule {
        patterns: &["NONFARM", "NON-FARM", "PAYROLL"],
        standard_code: "NFP",
        display_name: "Non-Farm Payrolls",
        importance: 3,
        market_impact: MarketImpact::High,
        unit: "Thousands",
        frequency: Frequency::Monthly,
        period_type: PeriodType::Monthly,
    },
    Rule {
        patterns: &["UNEMPLOYMENT", "JOBLESS"],
        standard_code: "UNEMPLOYMENT_RATE",
        display_name: "Unemployment Rate",
        importance: 3,
        market_impact: MarketImpact::High,
        unit: "Percent",
        frequency: Frequency::Monthly,
        period_type: PeriodType::Monthly,
    },
    Rule {
        patterns: &["FED FUNDS", "FEDFUNDS", "INTEREST RATE", "POLICY RATE"],
        standard_code: "INTEREST_RATE",
        display_name: "Interest Rate Decision",
        importance: 3,
        market_impact: MarketImpact::High,
        unit: "Percent",
        frequency: Frequency::Monthly,
        period_type: PeriodType::Monthly,
    },
    Rule {
        patterns: &["PPI", "PRODUCER PRICE"],
        standard_code: "PPI",
        display_name: "Producer Price Index",
        importance: 2,
        market_impact: MarketImpact::Medium,
        unit: "Percent",
        frequency: Frequency::Monthly,
        period_type: PeriodType::Monthly,
    },
    Rule {
        patterns: &["PMI", "PURCHASING MANAGERS"],
        standard_code: "PMI",
        display_name: "Purchasing Managers Index",
        importance: 2,
        market_impact: MarketImpact::Medium,
        unit: "Index",
        frequency: Frequency::Monthly,
        period_type: PeriodType::Monthly,
    },
    Rule {
        patterns: &["RETAIL SALES", "RETAIL"],
        standard_code: "RETAIL_SALES",
        display_name: "Retail Sales",
        importance: 2,
        market_impact: MarketImpact::Medium,
        unit: "Percent",
        frequency: Frequency::Monthly,
        period_type: PeriodType::Monthly,
    },
    Rule {
        patterns: &["TRADE BALANCE", "BALANCE OF TRADE"],
        standard_code: "TRADE_BALANCE",
        display_name: "Trade Balance",
        importance: 2,
        market_impact: MarketImpact::Medium,
        unit: "Billions",
        frequency: Frequency::Monthly,
        period_type: PeriodType::Monthly,
    },
    Rule {
        patterns: &["INDUSTRIAL PRODUCTION"],
        standard_code: "INDUSTRIAL_PRODUCTION",
        display_name: "Industrial Production",
        importance: 2,
        market_impact: MarketImpact::Medium,
        unit: "Percent",
        frequency: Frequency::Monthly,
        period_type: PeriodType::Monthly,
    },
    Rule {
        patterns: &["CONSUMER CONFIDENCE", "CONSUMER SENTIMENT"],
        standard_code: "CONSUMER_CONFIDENCE",
        display_name: "Consumer Confidence",
        importance: 2,
        market_impact: MarketImpact::Medium,
        unit: "Index",
        frequency: Frequency::Monthly,
        period_type: PeriodType::Monthly,
    },
    Rule {
        patterns: &["HOUSING START", "BUILDING PERMIT", "HOUSING"],
        standard_code: "HOUSING_STARTS",
        display_name: "Housing Starts",
        importance: 2,
        market_impact: MarketImpact::Medium,
        unit: "Thousands",
        frequency: Frequency::Monthly,
        period_type: PeriodType::Monthly,
    },
];

/// 원시 코드/라벨을 표준 분류로 매핑.
///
/// 폴백: 코드 대문자화, 이름 휴머나이즈, 중요도 1, Index 단위, 월간 주기.
pub fn classify(raw: &str) -> ClassifiedMetadata {
    let upper = raw.to_uppercase();

    for rule in RULES {
        if rule.patterns.iter().any(|p| upper.contains(p)) {
            return ClassifiedMetadata {
                standard_code: rule.standard_code.to_string(),
                display_name: rule.display_name.to_string(),
                importance: rule.importance,
                market_impact: rule.market_impact,
                unit: rule.unit.to_string(),
                frequency: rule.frequency,
                period_type: rule.period_type,
            };
        }
    }

    ClassifiedMetadata {
        standard_code: upper.replace([' ', '-'], "_"),
        display_name: humanize(raw),
        importance: 1,
        market_impact: MarketImpact::Low,
        unit: "Index".to_string(),
        frequency: Frequency::Monthly,
        period_type: PeriodType::Monthly,
    }
}

/// 코드 문자열을 사람이 읽을 이름으로 변환.
/// 예: "retail_sales_mom" → "Retail Sales Mom"
fn humanize(raw: &str) -> String {
    raw.split(|c: char| c == '_' || c == '-' || c == ' ')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_gdp() {
        let meta = classify("Real GDP Growth");
        assert_eq!(meta.standard_code, "GDP");
        assert_eq!(meta.importance, 3);
        assert_eq!(meta.market_impact, MarketImpact::High);
        assert_eq!(meta.frequency, Frequency::Quarterly);
    }

    #[test]
    fn test_classify_gdp_substring_anywhere() {
        assert_eq!(classify("gdp").standard_code, "GDP");
        assert_eq!(classify("US_GDP_QOQ").standard_code, "GDP");
    }

    #[test]
    fn test_classify_cpi_and_inflation_same_code() {
        assert_eq!(classify("CPIAUCSL").standard_code, "CPI");
        assert_eq!(classify("Inflation Rate YoY").standard_code, "CPI");
    }

    #[test]
    fn test_classify_first_match_wins() {
        // "GDP"가 "RETAIL"보다 먼저이므로 둘 다 포함 시 GDP로 분류
        let meta = classify("GDP RETAIL COMPOSITE");
        assert_eq!(meta.standard_code, "GDP");
    }

    #[test]
    fn test_classify_unknown_falls_back() {
        let meta = classify("obscure_regional_metric");
        assert_eq!(meta.standard_code, "OBSCURE_REGIONAL_METRIC");
        assert_eq!(meta.display_name, "Obscure Regional Metric");
        assert_eq!(meta.importance, 1);
        assert_eq!(meta.market_impact, MarketImpact::Low);
        assert_eq!(meta.unit, "Index");
        assert_eq!(meta.frequency, Frequency::Monthly);
    }

    #[test]
    fn test_classify_deterministic() {
        assert_eq!(classify("PMI Services"), classify("PMI Services"));
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("retail_sales_mom"), "Retail Sales Mom");
        assert_eq!(humanize("fed-funds-rate"), "Fed Funds Rate");
    }
}

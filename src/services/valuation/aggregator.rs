//! 基金估值汇总
//!
//! 按持仓权重加权各股票涨跌幅，再根据披露覆盖度决定是否外推到全部净值：
//! - 权重合计 > 阈值：估值 = 加权和 / 权重合计 × 100 × 仓位系数
//! - 权重合计 ≤ 阈值：直接使用加权和，不做放大
//!
//! 缺失行情一律按 0 计

use std::collections::HashMap;

use crate::config::ValuationConfig;
use crate::models::{Fund, HoldingDetail, InstrumentId, QuoteQuality, QuoteResult};

use super::symbol::instrument_id;

/// 单只基金的汇总结果（未分类）
#[derive(Debug, Clone, PartialEq)]
pub struct FundEstimate {
    pub fund_id: String,
    /// 估算涨跌幅（百分比）
    pub estimate: f64,
    pub weighted_sum: f64,
    pub total_weight: f64,
    pub holdings: Vec<HoldingDetail>,
}

/// 覆盖度修正
pub fn corrected_estimate(
    weighted_sum: f64,
    total_weight: f64,
    has_overseas: bool,
    policy: &ValuationConfig,
) -> f64 {
    if total_weight > policy.coverage_threshold {
        let ratio = if has_overseas {
            policy.overseas_ratio
        } else {
            policy.domestic_ratio
        };
        weighted_sum / total_weight * 100.0 * ratio
    } else {
        weighted_sum
    }
}

/// 汇总单只基金
pub fn aggregate(
    fund: &Fund,
    quotes: &HashMap<InstrumentId, QuoteResult>,
    policy: &ValuationConfig,
) -> FundEstimate {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    let mut has_overseas = false;
    let mut holdings = Vec::with_capacity(fund.holdings.len());

    for holding in &fund.holdings {
        let quote = instrument_id(holding).and_then(|id| quotes.get(&id));
        let (percent_change, quality) = match quote {
            Some(q) if q.quality == QuoteQuality::Ok => (q.percent_change, QuoteQuality::Ok),
            _ => (0.0, QuoteQuality::Missing),
        };

        weighted_sum += percent_change * (holding.weight / 100.0);
        total_weight += holding.weight;
        has_overseas |= holding.market.is_some_and(|m| m.is_overseas());

        holdings.push(HoldingDetail {
            code: holding.code.clone(),
            name: holding.name.clone(),
            market: holding.market,
            weight: holding.weight,
            percent_change,
            quality,
        });
    }

    if total_weight > 100.0 {
        log::warn!(
            "基金 {} 持仓权重合计 {:.2}% 超过 100%，估值可能偏大",
            fund.id,
            total_weight
        );
    }

    FundEstimate {
        fund_id: fund.id.clone(),
        estimate: corrected_estimate(weighted_sum, total_weight, has_overseas, policy),
        weighted_sum,
        total_weight,
        holdings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Holding, Market, Provenance};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn holding(code: &str, market: Option<Market>, weight: f64) -> Holding {
        Holding {
            code: code.to_string(),
            name: format!("股票{}", code),
            market,
            weight,
        }
    }

    fn fund(holdings: Vec<Holding>) -> Fund {
        Fund {
            id: "110011".to_string(),
            display_name: "测试基金".to_string(),
            provenance: Provenance::Scraped,
            holdings,
        }
    }

    #[test]
    fn test_corrected_estimate_domestic() {
        let policy = ValuationConfig::default();
        let estimate = corrected_estimate(4.0, 80.0, false, &policy);
        assert!(approx(estimate, 4.4));
    }

    #[test]
    fn test_corrected_estimate_overseas() {
        let policy = ValuationConfig::default();
        let estimate = corrected_estimate(4.0, 80.0, true, &policy);
        assert!(approx(estimate, 4.75));
    }

    #[test]
    fn test_corrected_estimate_sparse() {
        let policy = ValuationConfig::default();
        assert!(approx(corrected_estimate(1.2, 30.0, false, &policy), 1.2));
        // 恰好等于阈值不外推
        assert!(approx(corrected_estimate(1.2, 50.0, true, &policy), 1.2));
    }

    /// 测试完整汇总：两只股票各 40%，涨跌 +5% / +5%
    #[test]
    fn test_aggregate_domestic_fund() {
        let f = fund(vec![
            holding("600519", Some(Market::Sh), 40.0),
            holding("000001", Some(Market::Sz), 40.0),
        ]);
        let mut quotes = HashMap::new();
        for id in [
            InstrumentId::new(Market::Sh, "600519"),
            InstrumentId::new(Market::Sz, "000001"),
        ] {
            quotes.insert(id.clone(), QuoteResult::ok(id, 5.0));
        }

        let result = aggregate(&f, &quotes, &ValuationConfig::default());
        assert!(approx(result.weighted_sum, 4.0));
        assert!(approx(result.total_weight, 80.0));
        assert!(approx(result.estimate, 4.4));
        assert!(result.holdings.iter().all(|h| h.quality == QuoteQuality::Ok));
    }

    /// 测试缺失行情按 0 计，且仍计入权重
    #[test]
    fn test_aggregate_missing_quotes() {
        let f = fund(vec![
            holding("00700", Some(Market::Hk), 30.0),
            holding("AAPL", Some(Market::Us), 20.0),
            holding("UNKNOWN", None, 10.0),
        ]);
        let mut quotes = HashMap::new();
        let hk = InstrumentId::new(Market::Hk, "00700");
        quotes.insert(hk.clone(), QuoteResult::ok(hk, -2.0));
        let us = InstrumentId::new(Market::Us, "aapl");
        quotes.insert(us.clone(), QuoteResult::missing(us));

        let result = aggregate(&f, &quotes, &ValuationConfig::default());
        assert!(approx(result.total_weight, 60.0));
        assert!(approx(result.weighted_sum, -0.6));
        // -0.6 / 60 * 100 * 0.95
        assert!(approx(result.estimate, -0.95));
        assert_eq!(result.holdings[1].quality, QuoteQuality::Missing);
        assert_eq!(result.holdings[2].quality, QuoteQuality::Missing);
        assert_eq!(result.holdings[2].percent_change, 0.0);
    }

    #[test]
    fn test_aggregate_empty_fund() {
        let result = aggregate(&fund(Vec::new()), &HashMap::new(), &ValuationConfig::default());
        assert_eq!(result.estimate, 0.0);
        assert_eq!(result.total_weight, 0.0);
    }
}

//! 估值结果分类与分组

use crate::models::{
    Fund, HoldingDetail, Market, PassStats, ValuationBoard, ValuationResult, ValuationTag,
};

use super::aggregator::FundEstimate;
use super::common::format_signed_pct;

/// 分类时需要的展示参数
#[derive(Debug, Clone, Copy)]
pub struct ClassifyContext {
    /// 重仓透视展示的持仓数
    pub detail_limit: usize,
    /// 计算时美股是否处于交易时段
    pub us_session_open: bool,
}

/// 基金类型：含美股 > 含港股 > A 股
pub fn classify_tag(fund: &Fund) -> ValuationTag {
    let has = |market: Market| fund.holdings.iter().any(|h| h.market == Some(market));

    if has(Market::Us) {
        ValuationTag::OverseasUs
    } else if has(Market::Hk) {
        ValuationTag::OverseasHk
    } else {
        ValuationTag::Domestic
    }
}

/// 重仓透视文字，如 `贵州茅台+1.23%, (港)腾讯控股-0.50%`
pub fn detail_text(
    holdings: &[HoldingDetail],
    tag: ValuationTag,
    provenance_tag: Option<&str>,
    ctx: &ClassifyContext,
) -> String {
    let mut text = holdings
        .iter()
        .take(ctx.detail_limit)
        .map(|h| {
            let market_tag = h.market.map(|m| m.detail_tag()).unwrap_or_default();
            format!("{}{}{}", market_tag, h.name, format_signed_pct(h.percent_change))
        })
        .collect::<Vec<_>>()
        .join(", ");

    if tag == ValuationTag::OverseasUs && !ctx.us_session_open {
        text = format!("(美股休市中) {}", text);
    }
    if let Some(label) = provenance_tag {
        text = format!("{} [{}]", text, label);
    }
    text
}

/// 为汇总结果打上类型与来源标记
pub fn classify(estimate: FundEstimate, fund: &Fund, ctx: &ClassifyContext) -> ValuationResult {
    let tag = classify_tag(fund);
    let provenance_tag = fund.provenance.label();
    let detail_text = detail_text(&estimate.holdings, tag, provenance_tag, ctx);

    ValuationResult {
        fund_id: estimate.fund_id,
        display_name: fund.display_name.clone(),
        estimated_percent_change: estimate.estimate,
        tag,
        provenance: fund.provenance,
        provenance_tag: provenance_tag.map(str::to_string),
        total_weight: estimate.total_weight,
        weighted_sum: estimate.weighted_sum,
        detail_text,
        holdings: estimate.holdings,
    }
}

/// 排序并分组
///
/// 按估算涨跌幅降序（稳定排序），再拆出上涨、下跌、海外三组
pub fn build_board(mut results: Vec<ValuationResult>, stats: PassStats) -> ValuationBoard {
    results.sort_by(|a, b| {
        b.estimated_percent_change
            .total_cmp(&a.estimated_percent_change)
    });

    let pick = |pred: &dyn Fn(&ValuationResult) -> bool| -> Vec<ValuationResult> {
        results.iter().filter(|r| pred(r)).cloned().collect()
    };
    let gainers = pick(&|r| r.estimated_percent_change > 0.0);
    let losers = pick(&|r| r.estimated_percent_change < 0.0);
    let overseas = pick(&|r| r.tag.is_overseas());

    ValuationBoard {
        all: results,
        gainers,
        losers,
        overseas,
        stats,
    }
}

//! 行情代码转换
//!
//! 把持仓的 (市场, 代码) 转换成新浪行情查询代码，并保留反向映射，
//! 同一只股票无论被多少基金持有，每次估值只查询一次

use std::collections::BTreeMap;

use crate::models::{Fund, Holding, InstrumentId, Market, QuoteFeed};

/// 美股代码规整：去掉 `.` 之后的后缀并转小写，如 `AAPL.US` -> `aapl`
pub fn normalize_us_code(code: &str) -> String {
    code.trim()
        .split('.')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// 持仓的内部标识
///
/// 市场无法识别或代码为空时返回 None
pub fn instrument_id(holding: &Holding) -> Option<InstrumentId> {
    let market = holding.market?;
    let code = match market {
        Market::Us => normalize_us_code(&holding.code),
        _ => holding.code.trim().to_string(),
    };
    if code.is_empty() {
        return None;
    }
    Some(InstrumentId::new(market, code))
}

/// 内部标识 -> 新浪查询代码
///
/// - 沪深：sh600519 / sz000001
/// - 北交所：bj830799
/// - 港股：rt_hk00700
/// - 美股：gb_aapl
pub fn to_query_symbol(id: &InstrumentId) -> String {
    match id.market {
        Market::Sh | Market::Sz | Market::Bj => format!("{}{}", id.market.code(), id.code),
        Market::Hk => format!("rt_hk{}", id.code),
        Market::Us => format!("gb_{}", normalize_us_code(&id.code)),
    }
}

/// 持仓 -> 新浪查询代码
pub fn translate(holding: &Holding) -> Option<String> {
    instrument_id(holding).map(|id| to_query_symbol(&id))
}

/// 引用某个查询代码的持仓位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldingRef {
    pub fund_id: String,
    pub index: usize,
}

/// 查询代码对应的证券及其引用方
#[derive(Debug, Clone)]
pub struct SymbolEntry {
    pub id: InstrumentId,
    pub refs: Vec<HoldingRef>,
}

/// 一次估值涉及的全部查询代码
#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: BTreeMap<String, SymbolEntry>,
    skipped: usize,
}

impl SymbolTable {
    /// 根据基金持仓构建代码表（去重）
    pub fn build(funds: &[Fund]) -> Self {
        let mut table = SymbolTable::default();

        for fund in funds {
            for (index, holding) in fund.holdings.iter().enumerate() {
                let Some(id) = instrument_id(holding) else {
                    log::debug!(
                        "跳过无法识别市场的持仓: {} {} ({})",
                        fund.id,
                        holding.code,
                        holding.name
                    );
                    table.skipped += 1;
                    continue;
                };

                let symbol = to_query_symbol(&id);
                table
                    .entries
                    .entry(symbol)
                    .or_insert_with(|| SymbolEntry { id, refs: Vec::new() })
                    .refs
                    .push(HoldingRef {
                        fund_id: fund.id.clone(),
                        index,
                    });
            }
        }

        table
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 被排除在查询之外的持仓数
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// 查询代码 -> 证券
    pub fn lookup(&self, symbol: &str) -> Option<&SymbolEntry> {
        self.entries.get(symbol)
    }

    pub fn ids(&self) -> impl Iterator<Item = &InstrumentId> {
        self.entries.values().map(|e| &e.id)
    }

    /// 按数据板块分组的查询代码（各组内有序）
    pub fn symbols_by_feed(&self) -> BTreeMap<QuoteFeed, Vec<String>> {
        let mut groups: BTreeMap<QuoteFeed, Vec<String>> = BTreeMap::new();
        for (symbol, entry) in &self.entries {
            groups
                .entry(entry.id.market.feed())
                .or_default()
                .push(symbol.clone());
        }
        groups
    }
}

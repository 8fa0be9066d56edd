//! 批次划分
//!
//! 新浪行情的 list 参数有长度上限，每个板块的代码按固定大小切分

use std::collections::BTreeMap;

use crate::models::QuoteFeed;

/// 一次行情请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteBatch {
    pub feed: QuoteFeed,
    /// 该板块内的批次序号，从 0 开始
    pub index: usize,
    pub symbols: Vec<String>,
}

/// 把各板块的代码切分为不超过 `batch_size` 的连续批次
///
/// 每个板块产生 ceil(N / batch_size) 个批次；`batch_size` 为 0 时按 1 处理
pub fn plan_batches(groups: &BTreeMap<QuoteFeed, Vec<String>>, batch_size: usize) -> Vec<QuoteBatch> {
    let size = batch_size.max(1);

    groups
        .iter()
        .flat_map(|(feed, symbols)| {
            symbols
                .chunks(size)
                .enumerate()
                .map(move |(index, chunk)| QuoteBatch {
                    feed: *feed,
                    index,
                    symbols: chunk.to_vec(),
                })
        })
        .collect()
}

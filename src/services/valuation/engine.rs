//! 估值流程编排
//!
//! 代码转换 -> 批次划分 -> 并发请求 -> 解析 -> 汇总 -> 分类，
//! 每次调用完整执行一遍，不缓存结果

use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};

use crate::config::{QuoteConfig, ValuationConfig};
use crate::models::{Fund, InstrumentId, PassStats, QuoteFeed, QuoteResult, ValuationBoard};

use super::aggregator::aggregate;
use super::batch::{plan_batches, QuoteBatch};
use super::classifier::{build_board, classify, ClassifyContext};
use super::common::{get_beijing_time, us_session_open};
use super::fetcher::{FetchError, QuoteSource};
use super::parser::parse_response;
use super::symbol::SymbolTable;

/// 单个批次的处理结果
#[derive(Debug)]
pub enum BatchOutcome {
    Fetched {
        feed: QuoteFeed,
        index: usize,
        quotes: Vec<QuoteResult>,
    },
    Failed {
        feed: QuoteFeed,
        index: usize,
        symbols: Vec<String>,
        error: FetchError,
    },
}

/// 行情汇总结果
#[derive(Debug, Default)]
pub struct QuoteSet {
    pub quotes: HashMap<InstrumentId, QuoteResult>,
    pub distinct_symbols: usize,
    pub batches: usize,
    pub failed_batches: usize,
    /// 成功取得行情的证券数
    pub received: usize,
}

/// 基金估值引擎
pub struct ValuationEngine {
    source: Box<dyn QuoteSource>,
    quote: QuoteConfig,
    policy: ValuationConfig,
}

impl ValuationEngine {
    pub fn new(source: Box<dyn QuoteSource>, quote: QuoteConfig, policy: ValuationConfig) -> Self {
        Self {
            source,
            quote,
            policy,
        }
    }

    /// 请求并解析单个批次，超过 timeout_secs 记为超时
    async fn fetch_batch(&self, batch: &QuoteBatch, table: &SymbolTable) -> BatchOutcome {
        let deadline = Duration::from_secs(self.quote.timeout_secs);
        let fetched = tokio::time::timeout(deadline, self.source.fetch(batch))
            .await
            .unwrap_or(Err(FetchError::Timeout));

        match fetched {
            Ok(text) => BatchOutcome::Fetched {
                feed: batch.feed,
                index: batch.index,
                quotes: parse_response(batch.feed, &text, table),
            },
            Err(error) => BatchOutcome::Failed {
                feed: batch.feed,
                index: batch.index,
                symbols: batch.symbols.clone(),
                error,
            },
        }
    }

    /// 获取全部持仓涉及的行情
    ///
    /// 各批次并发执行，结果先按批次保存再合并；
    /// 请求过但没有拿到行情的证券记为缺失
    pub async fn fetch_quotes(&self, funds: &[Fund]) -> QuoteSet {
        let table = SymbolTable::build(funds);
        if table.skipped() > 0 {
            log::debug!("{} 项持仓市场无法识别，不参与行情查询", table.skipped());
        }
        let batches = plan_batches(&table.symbols_by_feed(), self.quote.batch_size);

        let outcomes: Vec<BatchOutcome> = stream::iter(batches.iter())
            .map(|batch| self.fetch_batch(batch, &table))
            .buffer_unordered(self.quote.max_concurrency.max(1))
            .collect()
            .await;

        let mut set = QuoteSet {
            distinct_symbols: table.len(),
            batches: batches.len(),
            ..QuoteSet::default()
        };

        for outcome in outcomes {
            match outcome {
                BatchOutcome::Fetched { feed, index, quotes } => {
                    log::debug!("{}行情第 {} 批解析到 {} 条", feed.name(), index + 1, quotes.len());
                    for quote in quotes {
                        set.quotes.insert(quote.id.clone(), quote);
                    }
                }
                BatchOutcome::Failed {
                    feed,
                    index,
                    symbols,
                    error,
                } => {
                    let affected: BTreeSet<&str> = symbols
                        .iter()
                        .filter_map(|s| table.lookup(s))
                        .flat_map(|entry| entry.refs.iter().map(|r| r.fund_id.as_str()))
                        .collect();
                    log::warn!(
                        "{}行情第 {} 批请求失败: {}，{} 个代码按缺失处理，影响 {} 只基金",
                        feed.name(),
                        index + 1,
                        error,
                        symbols.len(),
                        affected.len()
                    );
                    set.failed_batches += 1;
                }
            }
        }

        set.received = set.quotes.len();
        for id in table.ids() {
            set.quotes
                .entry(id.clone())
                .or_insert_with(|| QuoteResult::missing(id.clone()));
        }

        set
    }

    /// 执行一次完整估值
    pub async fn run_pass(&self, funds: &[Fund]) -> ValuationBoard {
        self.run_pass_at(funds, Utc::now()).await
    }

    /// 以指定时间执行估值（时间只影响美股休市提示）
    pub async fn run_pass_at(&self, funds: &[Fund], now: DateTime<Utc>) -> ValuationBoard {
        let started = Instant::now();
        let set = self.fetch_quotes(funds).await;

        let ctx = ClassifyContext {
            detail_limit: self.policy.detail_limit,
            us_session_open: us_session_open(now),
        };
        let results = funds
            .iter()
            .map(|fund| classify(aggregate(fund, &set.quotes, &self.policy), fund, &ctx))
            .collect();

        let stats = PassStats {
            funds: funds.len(),
            distinct_symbols: set.distinct_symbols,
            batches: set.batches,
            failed_batches: set.failed_batches,
            quotes: set.received,
            elapsed_ms: started.elapsed().as_millis() as u64,
            generated_at: get_beijing_time(),
        };
        log::info!(
            "估值完成: {} 只基金, {} 个代码, {} 个批次 (失败 {}), 取得 {} 条行情, 耗时 {} ms",
            stats.funds,
            stats.distinct_symbols,
            stats.batches,
            stats.failed_batches,
            stats.quotes,
            stats.elapsed_ms
        );

        build_board(results, stats)
    }
}

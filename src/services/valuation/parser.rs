//! 新浪行情解析
//!
//! 返回数据每行一个赋值语句：
//! `var hq_str_<代码>="字段1,字段2,...";`
//!
//! 三个板块字段布局不同：
//! - A股/北交所: 0名称 1今开 2昨收 3现价 ...，涨跌幅需自行计算
//! - 港股: 0英文名 1名称 2今开 3昨收 4最高 5最低 6现价 7涨跌额 8涨跌幅 ...
//! - 美股: 0名称 1现价 2涨跌幅 ...
//!
//! 单行解析失败只跳过该行，不影响同批次其它行

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::models::{QuoteFeed, QuoteResult};

use super::common::HQ_VAR_MARKER;
use super::symbol::SymbolTable;

/// 行级解析错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LineError {
    #[error("缺少 hq_str_ 标记")]
    NoMarker,
    #[error("赋值语句格式错误")]
    Malformed,
    #[error("返回数据为空（代码可能无效或已退市）")]
    EmptyPayload,
    #[error("字段不足: 需要 {need} 个，实际 {got} 个")]
    TooFewFields { need: usize, got: usize },
    #[error("字段 {index} 不是有效数字: {value}")]
    NotNumeric { index: usize, value: String },
    #[error("昨收价无效: {0}")]
    NoPreviousClose(f64),
    #[error("未请求的代码: {0}")]
    UnknownSymbol(String),
}

/// 单行解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    /// 新浪代码，如 sh600519
    pub symbol: String,
    /// 涨跌幅（百分比）
    pub percent_change: f64,
}

fn line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"hq_str_([A-Za-z0-9_$.]+)="([^"]*)""#).unwrap())
}

fn numeric_field(fields: &[&str], index: usize) -> Result<f64, LineError> {
    let raw = fields.get(index).map(|s| s.trim()).unwrap_or_default();
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(LineError::NotNumeric {
            index,
            value: raw.to_string(),
        }),
    }
}

fn require_fields(fields: &[&str], need: usize) -> Result<(), LineError> {
    if fields.len() < need {
        return Err(LineError::TooFewFields {
            need,
            got: fields.len(),
        });
    }
    Ok(())
}

/// 按板块格式计算涨跌幅
fn extract_percent_change(feed: QuoteFeed, fields: &[&str]) -> Result<f64, LineError> {
    match feed {
        QuoteFeed::AShare => {
            require_fields(fields, 4)?;
            let prev_close = numeric_field(fields, 2)?;
            let mut current = numeric_field(fields, 3)?;

            // 停牌或集合竞价前现价为 0，按平盘处理
            if current == 0.0 && prev_close > 0.0 {
                current = prev_close;
            }
            if prev_close <= 0.0 {
                return Err(LineError::NoPreviousClose(prev_close));
            }
            Ok((current - prev_close) / prev_close * 100.0)
        }
        QuoteFeed::HongKong => {
            require_fields(fields, 9)?;
            numeric_field(fields, 8)
        }
        QuoteFeed::Us => {
            require_fields(fields, 3)?;
            numeric_field(fields, 2)
        }
    }
}

/// 解析单行行情
pub fn parse_line(feed: QuoteFeed, line: &str) -> Result<ParsedLine, LineError> {
    if !line.contains(HQ_VAR_MARKER) {
        return Err(LineError::NoMarker);
    }

    let caps = line_regex().captures(line).ok_or(LineError::Malformed)?;
    let symbol = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let payload = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

    if payload.trim().is_empty() {
        return Err(LineError::EmptyPayload);
    }

    let fields: Vec<&str> = payload.split(',').collect();
    let percent_change = extract_percent_change(feed, &fields)?;

    Ok(ParsedLine {
        symbol: symbol.to_string(),
        percent_change,
    })
}

/// 解析整批返回数据，并通过代码表映射回内部标识
///
/// 解析失败的行记录日志后跳过
pub fn parse_response(feed: QuoteFeed, text: &str, table: &SymbolTable) -> Vec<QuoteResult> {
    let mut results = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let parsed = parse_line(feed, line).and_then(|parsed| {
            table
                .lookup(&parsed.symbol)
                .map(|entry| QuoteResult::ok(entry.id.clone(), parsed.percent_change))
                .ok_or(LineError::UnknownSymbol(parsed.symbol))
        });

        match parsed {
            Ok(quote) => results.push(quote),
            Err(e) => log::debug!("跳过{}行情行: {} | {}", feed.name(), e, line),
        }
    }

    results
}

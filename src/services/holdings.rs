//! 持仓快照加载
//!
//! 读取持仓采集任务生成的 holdings.json：
//! `{ "基金代码": { "name": ..., "source": ..., "holdings": [{code, name, market, weight}] } }`

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::{Fund, Holding, Market, Provenance};
use crate::services::valuation::normalize_us_code;

#[derive(Debug, Deserialize)]
struct SnapshotFund {
    #[serde(default)]
    name: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    holdings: Vec<SnapshotHolding>,
}

#[derive(Debug, Deserialize)]
struct SnapshotHolding {
    code: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    market: String,
    #[serde(default)]
    weight: f64,
}

/// 根据原始证券代码判断市场
///
/// - 5 位数字：港股
/// - 非纯数字：美股（去掉 `.` 后缀并转小写）
/// - 6 位数字：8/4/9 开头北交所，6 开头上交所，其余深交所
pub fn detect_market(raw_code: &str) -> (Market, String) {
    let code = raw_code.trim();
    let all_digits = !code.is_empty() && code.chars().all(|c| c.is_ascii_digit());

    if all_digits && code.len() == 5 {
        return (Market::Hk, code.to_string());
    }
    if !all_digits {
        return (Market::Us, normalize_us_code(code));
    }
    if code.len() == 6 {
        if code.starts_with(&['8', '4', '9'][..]) {
            return (Market::Bj, code.to_string());
        }
        if code.starts_with('6') {
            return (Market::Sh, code.to_string());
        }
    }
    (Market::Sz, code.to_string())
}

/// 解析数据来源
///
/// 支持 scraped / proxy / manual，以及采集任务写入的中文描述：
/// `手动兜底` 为手动录入，`网络爬虫 (代码)` 中代码与基金代码不同为替身
pub fn parse_provenance(source: &str, fund_id: &str) -> Provenance {
    let source = source.trim();
    match source.to_ascii_lowercase().as_str() {
        "scraped" => return Provenance::Scraped,
        "proxy" => return Provenance::Proxy,
        "manual" => return Provenance::Manual,
        _ => {}
    }

    if source.starts_with("手动") {
        return Provenance::Manual;
    }

    let target = source
        .split_once(&['(', '（'][..])
        .map(|(_, rest)| rest.trim_end_matches(&[')', '）'][..]).trim());
    match target {
        Some(code) if !code.is_empty() && code != fund_id => Provenance::Proxy,
        _ => Provenance::Scraped,
    }
}

/// 权重应在 0 ~ 100 之间，越界时记录警告，数值原样保留
pub fn weight_in_range(fund_id: &str, holding: &Holding) -> bool {
    let ok = (0.0..=100.0).contains(&holding.weight);
    if !ok {
        log::warn!(
            "基金 {} 持仓 {} 权重 {} 超出 0~100 范围",
            fund_id,
            holding.code,
            holding.weight
        );
    }
    ok
}

fn to_holding(raw: SnapshotHolding) -> Holding {
    let (market, code) = if raw.market.trim().is_empty() {
        let (market, code) = detect_market(&raw.code);
        (Some(market), code)
    } else {
        (Market::from_code(&raw.market), raw.code)
    };

    Holding {
        code,
        name: raw.name,
        market,
        weight: raw.weight,
    }
}

/// 解析快照内容，基金按代码排序
pub fn parse_snapshot(content: &str) -> Result<Vec<Fund>> {
    let raw: BTreeMap<String, SnapshotFund> =
        serde_json::from_str(content).context("持仓快照格式错误")?;

    Ok(raw
        .into_iter()
        .map(|(id, fund)| {
            let display_name = if fund.name.trim().is_empty() {
                format!("基金{}", id)
            } else {
                fund.name
            };
            let holdings: Vec<Holding> = fund.holdings.into_iter().map(to_holding).collect();
            for holding in &holdings {
                weight_in_range(&id, holding);
            }
            Fund {
                provenance: parse_provenance(&fund.source, &id),
                holdings,
                display_name,
                id,
            }
        })
        .collect())
}

/// 从文件加载持仓快照
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<Vec<Fund>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("无法读取持仓快照 {}，请先运行持仓采集", path.display()))?;
    let funds = parse_snapshot(&content)?;
    log::debug!("从 {} 加载 {} 只基金", path.display(), funds.len());
    Ok(funds)
}

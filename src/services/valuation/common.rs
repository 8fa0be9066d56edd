//! 公共常量和辅助函数

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use chrono_tz::America::New_York;
use chrono_tz::Asia::Shanghai;

// ==================== 新浪行情 API 常量 ====================

/// 新浪实时行情 API
pub const SINA_QUOTE_API: &str = "https://hq.sinajs.cn";
/// 新浪行情要求的来源页
pub const SINA_REFERER: &str = "https://finance.sina.com.cn/";
/// 浏览器标识
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/97.0.4692.71 Safari/537.36";
/// 返回数据中每行变量名的前缀
pub const HQ_VAR_MARKER: &str = "hq_str_";

// ==================== 估值策略默认值 ====================

/// 单次请求的最大代码数（超过后新浪会截断查询串）
pub const DEFAULT_BATCH_SIZE: usize = 80;
/// 单批请求超时（秒），不重试
pub const DEFAULT_TIMEOUT_SECS: u64 = 3;
/// 同时进行的批次请求数
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;
/// 权重合计超过该值时按仓位外推
pub const DEFAULT_COVERAGE_THRESHOLD: f64 = 50.0;
/// A 股基金仓位修正系数
pub const DEFAULT_DOMESTIC_RATIO: f64 = 0.88;
/// 港股 / QDII 基金仓位修正系数
pub const DEFAULT_OVERSEAS_RATIO: f64 = 0.95;
/// 重仓透视展示的持仓数
pub const DEFAULT_DETAIL_LIMIT: usize = 10;

/// 获取北京时间字符串（ISO 8601 格式，带+08:00时区）
pub fn get_beijing_time() -> String {
    Utc::now().with_timezone(&Shanghai).to_rfc3339()
}

/// 判断美股常规交易时段（纽约时间周一至周五 09:30-16:00）
///
/// 不考虑美国节假日
pub fn us_session_open(now: DateTime<Utc>) -> bool {
    let ny = now.with_timezone(&New_York);
    if matches!(ny.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }
    let minutes = ny.hour() * 60 + ny.minute();
    (9 * 60 + 30..16 * 60).contains(&minutes)
}

/// 格式化带符号的百分比，如 +1.23%
pub fn format_signed_pct(value: f64) -> String {
    format!("{:+.2}%", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_get_beijing_time() {
        let time = get_beijing_time();
        assert!(time.contains("+08:00"));
    }

    #[test]
    fn test_us_session_open() {
        // 2024-03-13 周三 14:30 UTC = 纽约 10:30 (夏令时)
        let open = Utc.with_ymd_and_hms(2024, 3, 13, 14, 30, 0).unwrap();
        assert!(us_session_open(open));

        // 同日 02:00 UTC = 纽约前一日 22:00
        let night = Utc.with_ymd_and_hms(2024, 3, 13, 2, 0, 0).unwrap();
        assert!(!us_session_open(night));

        // 2024-03-16 周六
        let weekend = Utc.with_ymd_and_hms(2024, 3, 16, 15, 0, 0).unwrap();
        assert!(!us_session_open(weekend));
    }

    #[test]
    fn test_format_signed_pct() {
        assert_eq!(format_signed_pct(1.234), "+1.23%");
        assert_eq!(format_signed_pct(-0.5), "-0.50%");
        assert_eq!(format_signed_pct(0.0), "+0.00%");
    }
}

// ==========================================
// 种植批次规则引擎 - 日期解析
// ==========================================
// 职责: 统一解析 ISO-8601 日期(纯日期 / RFC 3339 时间戳)
// 口径: 时间戳一律换算到 UTC 后取日历日
// ==========================================

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// 解析 ISO-8601 日期字符串
///
/// # 支持格式
/// - `2026-01-18`
/// - `2026-01-18T08:00:00Z` / `2026-01-18T08:00:00+08:00`
/// - `2026-01-18T08:00:00`(无时区, 按 UTC 处理)
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    let trimmed = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc).date_naive());
    }

    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f").map(|ts| ts.date())
}

/// serde: 必填日期字段
pub fn deserialize_iso_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_iso_date(&raw)
        .map_err(|e| serde::de::Error::custom(format!("invalid date '{}': {}", raw, e)))
}

/// serde: 可选日期字段(null / 空字符串 → None)
pub fn deserialize_opt_iso_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        Some(s) if !s.trim().is_empty() => parse_iso_date(&s)
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid date '{}': {}", s, e))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_date() {
        let d = parse_iso_date("2026-01-18").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 1, 18).unwrap());
    }

    #[test]
    fn test_parse_rfc3339_converts_to_utc() {
        // 东八区凌晨 → UTC 前一天
        let d = parse_iso_date("2026-01-18T03:00:00+08:00").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 1, 17).unwrap());

        let d = parse_iso_date("2026-01-18T23:59:59.123Z").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 1, 18).unwrap());
    }

    #[test]
    fn test_parse_naive_timestamp() {
        let d = parse_iso_date("2026-02-01T10:15:00").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_iso_date("18/01/2026").is_err());
        assert!(parse_iso_date("").is_err());
    }
}

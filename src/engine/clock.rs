// ==========================================
// 种植批次规则引擎 - 时钟抽象
// ==========================================
// 职责: 为"今天"提供可注入的来源
// 红线: 校验器内部不得直接读取系统时钟
// ==========================================

use chrono::{NaiveDate, Utc};

/// 日期来源
///
/// 生产环境使用 [`SystemClock`]; 测试与回放使用 [`FixedClock`]。
pub trait Clock: Send + Sync {
    /// 当前日历日(UTC)
    fn today(&self) -> NaiveDate;
}

/// 系统时钟(UTC)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// 固定日期时钟
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// 两个日历日之间的整天数(to - from, 可为负)
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

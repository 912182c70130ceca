//! 日期规则服务 - 业务能力层
//!
//! 把用户填写的日期表达式解析成有效的观察日期列表。
//!
//! 支持两种写法：
//! - 区间：`dd/mm/yyyy - dd/mm/yyyy`，起止日期都必须是指定的星期几
//! - 列表：`dd/mm/yyyy, dd/mm/yyyy, ...`
//!
//! 解析结果中的每个日期都落在指定的星期几、不晚于"今天"，且每周最多一个。

use chrono::{Datelike, Days, NaiveDate, Weekday};
use tracing::{debug, warn};

use crate::error::DateRuleError;

/// 日期格式（日/月/年）
pub const DATE_FORMAT: &str = "%d/%m/%Y";
const RANGE_SEPARATOR: char = '-';
const LIST_SEPARATOR: char = ',';
const DAYS_PER_WEEK: u64 = 7;

/// 解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateResolution {
    /// 有效日期
    pub dates: Vec<NaiveDate>,
    /// 列表模式下被跳过的日期及原因（区间模式恒为空）
    pub rejected: Vec<DateRuleError>,
}

/// 日期规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRules {
    weekday: Weekday,
}

impl Default for DateRules {
    fn default() -> Self {
        Self {
            weekday: Weekday::Fri,
        }
    }
}

/// 用默认规则（周五）解析
pub fn resolve_dates(expression: &str, today: NaiveDate) -> Result<DateResolution, DateRuleError> {
    DateRules::default().resolve(expression, today)
}

impl DateRules {
    /// 使用自定义的观察日
    pub fn new(weekday: Weekday) -> Self {
        Self { weekday }
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    /// 解析日期表达式
    ///
    /// # 参数
    /// - `expression`: 用户填写的日期表达式
    /// - `today`: 运行当天，晚于它的日期视为未来日期
    ///
    /// # 返回
    /// 同样的输入和 `today` 总是得到同样的结果
    pub fn resolve(
        &self,
        expression: &str,
        today: NaiveDate,
    ) -> Result<DateResolution, DateRuleError> {
        if expression.contains(RANGE_SEPARATOR) {
            debug!("Parsing date range {} to days to observe", expression);
            let dates = self.resolve_range(expression, today)?;
            Ok(DateResolution {
                dates,
                rejected: Vec::new(),
            })
        } else if expression.contains(LIST_SEPARATOR) {
            debug!("Parsing specific dates {} to days to observe", expression);
            Ok(self.resolve_list(expression, today))
        } else {
            Err(DateRuleError::InvalidFormat {
                expression: expression.to_string(),
            })
        }
    }

    /// 区间模式
    ///
    /// 从起始日期开始每 7 天取一个日期，不包含结束日期本身。
    /// 起止日期在同一周时只返回起始日期。
    fn resolve_range(
        &self,
        expression: &str,
        today: NaiveDate,
    ) -> Result<Vec<NaiveDate>, DateRuleError> {
        let tokens: Vec<&str> = expression.split(RANGE_SEPARATOR).map(str::trim).collect();
        let [start_token, end_token] = tokens[..] else {
            return Err(DateRuleError::InvalidFormat {
                expression: expression.to_string(),
            });
        };

        let start = parse_date(start_token)?;
        let end = parse_date(end_token)?;

        if start > today {
            return Err(DateRuleError::FutureDate {
                token: start_token.to_string(),
            });
        }
        if end > today {
            return Err(DateRuleError::FutureDate {
                token: end_token.to_string(),
            });
        }
        if start > end {
            return Err(DateRuleError::OrderError {
                start: start_token.to_string(),
                end: end_token.to_string(),
            });
        }
        for (date, token) in [(start, start_token), (end, end_token)] {
            if date.weekday() != self.weekday {
                return Err(DateRuleError::WeekdayMismatch {
                    token: token.to_string(),
                    weekday: self.weekday,
                });
            }
        }

        if same_week(start, end) {
            warn!(
                "Start date ({}) is in the same week as end date ({}), only the start date will be observed",
                start_token, end_token
            );
            return Ok(vec![start]);
        }

        let whole_weeks = (end - start).num_days().unsigned_abs() / DAYS_PER_WEEK;
        let mut observe_days = Vec::new();
        let mut next = start;
        while (observe_days.len() as u64) < whole_weeks && next < end {
            debug!("Adding {} to days to observe", next);
            observe_days.push(next);
            match next.checked_add_days(Days::new(DAYS_PER_WEEK)) {
                Some(date) => next = date,
                None => break,
            }
        }

        if observe_days.is_empty() {
            return Err(DateRuleError::NoDatesProduced {
                expression: expression.to_string(),
            });
        }
        Ok(observe_days)
    }

    /// 列表模式
    ///
    /// 每个日期单独校验，不合格的日期记录原因后跳过，不影响其他日期。
    fn resolve_list(&self, expression: &str, today: NaiveDate) -> DateResolution {
        let mut resolution = DateResolution {
            dates: Vec::new(),
            rejected: Vec::new(),
        };

        for token in expression.split(LIST_SEPARATOR).map(str::trim) {
            if token.is_empty() {
                continue;
            }
            match self.check_list_date(token, today, &resolution.dates) {
                Ok(date) => resolution.dates.push(date),
                Err(reason) => {
                    warn!("{}. Skipping...", reason);
                    resolution.rejected.push(reason);
                }
            }
        }

        resolution
    }

    fn check_list_date(
        &self,
        token: &str,
        today: NaiveDate,
        accepted: &[NaiveDate],
    ) -> Result<NaiveDate, DateRuleError> {
        let date = parse_date(token)?;

        if date > today {
            return Err(DateRuleError::FutureDate {
                token: token.to_string(),
            });
        }
        if date.weekday() != self.weekday {
            return Err(DateRuleError::WeekdayMismatch {
                token: token.to_string(),
                weekday: self.weekday,
            });
        }
        if accepted.iter().any(|existing| same_week(*existing, date)) {
            return Err(DateRuleError::DuplicateWeek {
                token: token.to_string(),
            });
        }
        Ok(date)
    }
}

fn parse_date(token: &str) -> Result<NaiveDate, DateRuleError> {
    NaiveDate::parse_from_str(token.trim(), DATE_FORMAT).map_err(|_| DateRuleError::InvalidDate {
        token: token.trim().to_string(),
    })
}

/// 两个日期是否在同一个自然周（周日开始）
pub fn same_week(a: NaiveDate, b: NaiveDate) -> bool {
    week_start(a) == week_start(b)
}

fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_sunday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

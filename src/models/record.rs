use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 一位教师的周考勤记录（来自表格的一行）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherRecord {
    pub code: String,
    pub name: String,
    pub term: String,
    pub lessons_taught: String,
    pub lessons_recovered: String,
    pub to_be_taught: String,
    pub remarks: String,
    /// 原始日期表达式，尚未解析
    pub dates: String,
}

impl fmt::Display for TeacherRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.name, self.code)
    }
}

/// 日期解析完成后的考勤记录
///
/// 创建后不再修改，提交时以只读方式共享。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub teacher: TeacherRecord,
    pub dates: Vec<NaiveDate>,
}

impl AttendanceRecord {
    pub fn new(teacher: TeacherRecord, dates: Vec<NaiveDate>) -> Self {
        Self { teacher, dates }
    }
}

/// 表格中的原始一行
///
/// 每个字段都可以是字符串或数字，缺失字段在校验阶段统一报告。
/// 列名沿用考勤表格的写法（`lessonsTaught`、`tobeTaught` 等），也接受 snake_case。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTeacherRow {
    #[serde(default, deserialize_with = "deserialize_text")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub term: Option<String>,
    #[serde(
        default,
        rename = "lessonsTaught",
        alias = "lessons_taught",
        deserialize_with = "deserialize_text"
    )]
    pub lessons_taught: Option<String>,
    #[serde(
        default,
        rename = "lessonsRecovered",
        alias = "lessons_recovered",
        deserialize_with = "deserialize_text"
    )]
    pub lessons_recovered: Option<String>,
    #[serde(
        default,
        rename = "tobeTaught",
        alias = "toBeTaught",
        alias = "to_be_taught",
        deserialize_with = "deserialize_text"
    )]
    pub to_be_taught: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub dates: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub remarks: Option<String>,
}

impl RawTeacherRow {
    /// 转换为 [`TeacherRecord`]，失败时返回缺失的列名
    pub fn into_record(self) -> Result<TeacherRecord, Vec<&'static str>> {
        let mut missing = Vec::new();
        let mut take = |value: Option<String>, column: &'static str| {
            value.unwrap_or_else(|| {
                missing.push(column);
                String::new()
            })
        };

        let record = TeacherRecord {
            code: take(self.code, "code"),
            name: take(self.name, "name"),
            term: take(self.term, "term"),
            lessons_taught: take(self.lessons_taught, "lessonsTaught"),
            lessons_recovered: take(self.lessons_recovered, "lessonsRecovered"),
            to_be_taught: take(self.to_be_taught, "tobeTaught"),
            remarks: take(self.remarks, "remarks"),
            dates: take(self.dates, "dates"),
        };

        if missing.is_empty() {
            Ok(record)
        } else {
            Err(missing)
        }
    }
}

// Helper function to deserialize a cell as either string or number
fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;

    struct TextVisitor;

    impl<'de> Visitor<'de> for TextVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or number")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            let value = value.trim();
            if value.is_empty() {
                Ok(None)
            } else {
                Ok(Some(value.to_string()))
            }
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            // 表格里的整数常以浮点数读出
            if value.fract() == 0.0 && value.abs() < 1e15 {
                Ok(Some(format!("{}", value as i64)))
            } else {
                Ok(Some(value.to_string()))
            }
        }

        fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            deserializer.deserialize_any(TextVisitor)
        }
    }

    deserializer.deserialize_any(TextVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_cells_become_text() {
        let row: RawTeacherRow = toml::from_str(
            r#"
            code = 4521
            name = "Jane Wanjiru"
            term = 1
            lessonsTaught = 18
            lessonsRecovered = 2.0
            tobeTaught = "20"
            dates = "05/01/2024 - 19/01/2024"
            remarks = "Good progress"
            "#,
        )
        .unwrap();

        let record = row.into_record().unwrap();
        assert_eq!(record.code, "4521");
        assert_eq!(record.term, "1");
        assert_eq!(record.lessons_recovered, "2");
        assert_eq!(record.to_be_taught, "20");
        assert_eq!(record.to_string(), "Jane Wanjiru, 4521");
    }

    #[test]
    fn test_missing_and_blank_cells_are_reported() {
        let row: RawTeacherRow = toml::from_str(
            r#"
            code = "4521"
            name = "Jane Wanjiru"
            term = "1"
            lessons_taught = "18"
            lessons_recovered = "2"
            to_be_taught = "20"
            dates = "   "
            "#,
        )
        .unwrap();

        let missing = row.into_record().unwrap_err();
        assert_eq!(missing, vec!["remarks", "dates"]);
    }
}

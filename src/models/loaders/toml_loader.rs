use crate::error::FileError;
use crate::models::loaders::validate_rows;
use crate::models::record::{RawTeacherRow, TeacherRecord};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// TOML 考勤文件结构
///
/// ```toml
/// [[teacher]]
/// code = "4521"
/// name = "Jane Wanjiru"
/// ...
/// ```
#[derive(Debug, Default, Deserialize)]
struct RecordsFile {
    #[serde(default, rename = "teacher")]
    teachers: Vec<RawTeacherRow>,
}

/// 从 TOML 文件加载考勤记录
pub async fn load_toml_records(toml_file_path: &Path) -> Result<Vec<TeacherRecord>, FileError> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|source| FileError::ReadFailed {
            path: toml_file_path.display().to_string(),
            source,
        })?;

    let file: RecordsFile =
        toml::from_str(&content).map_err(|source| FileError::TomlParseFailed {
            path: toml_file_path.display().to_string(),
            source,
        })?;

    validate_rows(toml_file_path, file.teachers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_toml_records() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[[teacher]]
code = 4521
name = "Jane Wanjiru"
term = 1
lessonsTaught = 18
lessonsRecovered = 2
tobeTaught = 20
dates = "05/01/2024 - 19/01/2024"
remarks = "Good progress"

[[teacher]]
code = "4522"
name = "Peter Otieno"
term = "1"
lessons_taught = "10"
lessons_recovered = "0"
to_be_taught = "12"
dates = "05/01/2024, 12/01/2024"
remarks = "Needs support"
"#
        )
        .unwrap();

        let records = load_toml_records(file.path()).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].code, "4521");
        assert_eq!(records[0].to_be_taught, "20");
        assert_eq!(records[1].name, "Peter Otieno");
        assert_eq!(records[1].dates, "05/01/2024, 12/01/2024");
    }

    #[tokio::test]
    async fn test_empty_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "# nothing here").unwrap();

        let err = load_toml_records(file.path()).await.unwrap_err();
        assert!(matches!(err, FileError::Empty { .. }));
    }
}

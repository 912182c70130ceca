use crate::error::FileError;
use crate::models::loaders::validate_rows;
use crate::models::record::{RawTeacherRow, TeacherRecord};
use std::path::Path;
use tokio::fs;

/// 从 CSV 文件加载考勤记录（表格导出为 CSV 后使用）
pub async fn load_csv_records(csv_file_path: &Path) -> Result<Vec<TeacherRecord>, FileError> {
    let content = fs::read_to_string(csv_file_path)
        .await
        .map_err(|source| FileError::ReadFailed {
            path: csv_file_path.display().to_string(),
            source,
        })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let rows = reader
        .deserialize::<RawTeacherRow>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| FileError::CsvParseFailed {
            path: csv_file_path.display().to_string(),
            source,
        })?;

    validate_rows(csv_file_path, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_csv_records() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(
            file,
            "code,name,term,lessonsTaught,lessonsRecovered,tobeTaught,dates,remarks\n\
             4521,Jane Wanjiru,1,18,2,20,05/01/2024 - 19/01/2024,Good progress\n\
             4522,Peter Otieno,1,10,0,12,\"05/01/2024, 12/01/2024\",Needs support\n"
        )
        .unwrap();

        let records = load_csv_records(file.path()).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].code, "4521");
        assert_eq!(records[0].dates, "05/01/2024 - 19/01/2024");
        assert_eq!(records[1].dates, "05/01/2024, 12/01/2024");
        assert_eq!(records[1].remarks, "Needs support");
    }

    #[tokio::test]
    async fn test_blank_cells_are_missing_fields() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(
            file,
            "code,name,term,lessonsTaught,lessonsRecovered,tobeTaught,dates,remarks\n\
             4521,Jane Wanjiru,1,18,2,20,,Good progress\n"
        )
        .unwrap();

        match load_csv_records(file.path()).await.unwrap_err() {
            FileError::MissingFields { rows, .. } => {
                assert_eq!(rows, vec!["row 1: missing dates".to_string()]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}

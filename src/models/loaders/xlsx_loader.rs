use crate::error::FileError;
use crate::models::loaders::validate_rows;
use crate::models::record::{RawTeacherRow, TeacherRecord};
use calamine::{open_workbook_auto, RangeDeserializerBuilder, Reader};
use std::path::Path;

/// 从 Excel 工作簿加载考勤记录
///
/// 工作簿必须只有一个工作表，首行为列名。
pub async fn load_xlsx_records(xlsx_file_path: &Path) -> Result<Vec<TeacherRecord>, FileError> {
    let owned = xlsx_file_path.to_path_buf();
    let rows = tokio::task::spawn_blocking(move || read_rows(&owned))
        .await
        .map_err(|e| parse_failed(xlsx_file_path, e))??;

    validate_rows(xlsx_file_path, rows)
}

fn read_rows(path: &Path) -> Result<Vec<RawTeacherRow>, FileError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| parse_failed(path, e))?;
    let sheet = single_sheet(path, workbook.sheet_names())?;

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| parse_failed(path, e))?;

    RangeDeserializerBuilder::new()
        .from_range(&range)
        .map_err(|e| parse_failed(path, e))?
        .collect::<Result<Vec<RawTeacherRow>, _>>()
        .map_err(|e| parse_failed(path, e))
}

/// 只接受恰好一个工作表
fn single_sheet(path: &Path, mut sheets: Vec<String>) -> Result<String, FileError> {
    match sheets.len() {
        0 => Err(FileError::NoSheets {
            path: path.display().to_string(),
        }),
        1 => Ok(sheets.remove(0)),
        _ => Err(FileError::MultipleSheets {
            path: path.display().to_string(),
            sheets,
        }),
    }
}

fn parse_failed(path: &Path, err: impl std::fmt::Display) -> FileError {
    FileError::SpreadsheetParseFailed {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_single_sheet_is_selected() {
        let sheet = single_sheet(Path::new("term1.xlsx"), vec!["Week 3".to_string()]).unwrap();
        assert_eq!(sheet, "Week 3");
    }

    #[test]
    fn test_workbook_without_sheets() {
        let err = single_sheet(Path::new("term1.xlsx"), Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "No sheets found in term1.xlsx");
    }

    #[test]
    fn test_workbook_with_several_sheets() {
        let err = single_sheet(
            Path::new("term1.xlsx"),
            vec!["Sheet1".to_string(), "Sheet2".to_string()],
        )
        .unwrap_err();
        assert!(matches!(err, FileError::MultipleSheets { .. }));
        assert_eq!(
            err.to_string(),
            "term1.xlsx has more than one sheet: Sheet1, Sheet2"
        );
    }

    #[tokio::test]
    async fn test_corrupt_workbook_is_a_parse_error() {
        let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        writeln!(file, "code,name\n4521,Jane Wanjiru").unwrap();

        let err = load_xlsx_records(file.path()).await.unwrap_err();
        assert!(matches!(err, FileError::SpreadsheetParseFailed { .. }));
    }
}

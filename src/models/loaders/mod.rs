//! 考勤表格加载
//!
//! 支持 Excel 工作簿（`.xlsx` / `.xls` / `.xlsb` / `.ods`，唯一的工作表首行为列名）、
//! `.toml`（`[[teacher]]` 表数组）和 `.csv`（首行为列名）。

pub mod csv_loader;
pub mod toml_loader;
pub mod xlsx_loader;

use std::path::Path;

use tracing::info;

use crate::error::FileError;
use crate::models::record::{RawTeacherRow, TeacherRecord};

pub use csv_loader::load_csv_records;
pub use toml_loader::load_toml_records;
pub use xlsx_loader::load_xlsx_records;

/// 按扩展名加载考勤记录
pub async fn load_records(path: &Path) -> Result<Vec<TeacherRecord>, FileError> {
    if !path.exists() {
        return Err(FileError::NotFound {
            path: path.display().to_string(),
        });
    }

    info!("📁 Reading attendance records from {}", path.display());

    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("toml") => load_toml_records(path).await,
        Some("csv") => load_csv_records(path).await,
        Some("xlsx" | "xlsm" | "xls" | "xlsb" | "ods") => load_xlsx_records(path).await,
        _ => Err(FileError::UnsupportedFormat {
            path: path.display().to_string(),
        }),
    }
}

/// 校验所有行，缺失字段的行一次性全部报告
pub(crate) fn validate_rows(
    path: &Path,
    rows: Vec<RawTeacherRow>,
) -> Result<Vec<TeacherRecord>, FileError> {
    if rows.is_empty() {
        return Err(FileError::Empty {
            path: path.display().to_string(),
        });
    }

    let mut records = Vec::with_capacity(rows.len());
    let mut problems = Vec::new();

    for (index, row) in rows.into_iter().enumerate() {
        match row.into_record() {
            Ok(record) => records.push(record),
            Err(missing) => problems.push(format!(
                "row {}: missing {}",
                index + 1,
                missing.join(", ")
            )),
        }
    }

    if !problems.is_empty() {
        return Err(FileError::MissingFields {
            path: path.display().to_string(),
            rows: problems,
        });
    }

    info!("✓ Loaded {} attendance record(s)", records.len());
    Ok(records)
}

//! 登录页解析
//!
//! 登录成功后的首页标题区域（`row page-titles`）里有一个用户信息表格：
//!
//! | 第 1 列            | 第 2 列          |
//! |--------------------|------------------|
//! | 机构名称            | `Code: <机构代码>` |
//! | 问候语              | 用户姓名          |
//!
//! 这里只需要机构代码，其余内容用于日志。

use regex::Regex;

use crate::error::SessionError;
use crate::models::LoginProfile;

const TITLE_SECTION_MARKER: &str = "page-titles";

fn pattern(source: &str) -> Result<Regex, SessionError> {
    Regex::new(source).map_err(|e| SessionError::parse(format!("invalid pattern: {}", e)))
}

/// 解析登录后的页面
///
/// # 返回
/// 用户信息和机构代码；找不到用户信息表格或机构代码为空时返回 `SessionParseError`
pub fn parse_landing_page(html: &str) -> Result<LoginProfile, SessionError> {
    let section_start = html
        .find(TITLE_SECTION_MARKER)
        .ok_or_else(|| SessionError::parse("user details section not found, login may have been rejected"))?;
    let section = &html[section_start..];

    let table_re = pattern(r"(?is)<table[^>]*>(.*?)</table>")?;
    let row_re = pattern(r"(?is)<tr[^>]*>(.*?)</tr>")?;
    let cell_re = pattern(r"(?is)<t[dh][^>]*>(.*?)</t[dh]>")?;
    let tag_re = pattern(r"(?s)<[^>]*>")?;

    let table = table_re
        .captures(section)
        .and_then(|c| c.get(1))
        .ok_or_else(|| SessionError::parse("user details table not found"))?
        .as_str();

    let rows: Vec<Vec<String>> = row_re
        .captures_iter(table)
        .filter_map(|row| row.get(1))
        .map(|row| {
            cell_re
                .captures_iter(row.as_str())
                .filter_map(|cell| cell.get(1))
                .map(|cell| clean_text(&tag_re, cell.as_str()))
                .collect()
        })
        .collect();

    let cell = |row: usize, col: usize| rows.get(row).and_then(|r| r.get(col)).cloned();

    let code_cell = cell(0, 1).ok_or_else(|| SessionError::parse("institution code cell not found"))?;
    let institution_id = code_cell
        .rsplit(':')
        .next()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    if institution_id.is_empty() {
        return Err(SessionError::parse(format!(
            "institution code is empty in `{}`",
            code_cell
        )));
    }

    let details = [cell(0, 0), Some(code_cell), cell(1, 1), cell(1, 0)]
        .into_iter()
        .flatten()
        .filter(|text| !text.is_empty())
        .collect();

    Ok(LoginProfile {
        details,
        institution_id,
        html: html.to_string(),
    })
}

/// 去掉标签、解码常见实体并合并空白
fn clean_text(tag_re: &Regex, fragment: &str) -> String {
    let text = tag_re.replace_all(fragment, " ");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&#039;", "'")
        .replace("&quot;", "\"");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

//! 表格导入服务 - 业务能力层
//!
//! 读取阅卷人填好的工作簿，按 `Candidate ID` 分组成每个考生的成绩。
//!
//! - 只读第一个工作表，第一行是表头，按列名定位（允许多余列、列顺序变化）
//! - 分组按考生首次出现的顺序，组内题目按文件中的行顺序
//! - `Update Marks` 原样透传，不做数值校验

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, Xlsx};
use tracing::{debug, info};

use crate::error::{AppError, AppResult, ParseError, ValidationError};
use crate::models::{AssessmentResult, MarkResponse};
use crate::services::workbook_export::{COL_CANDIDATE_ID, COL_QUESTION_ID, COL_UPDATE_MARKS};

/// 读取上传的文件并解析
///
/// 没有选择文件时直接返回 `EmptyFile`，不做任何 I/O
pub async fn parse_workbook(path: Option<&Path>) -> AppResult<Vec<AssessmentResult>> {
    let path = path.ok_or(ValidationError::EmptyFile)?;
    debug!("读取上传文件: {}", path.display());

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
    parse_workbook_bytes(&bytes)
}

/// 解析 xlsx 字节
pub fn parse_workbook_bytes(bytes: &[u8]) -> AppResult<Vec<AssessmentResult>> {
    let mut workbook = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ParseError::NoSheet)??;

    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(cells) => cells.iter().map(cell_text).collect(),
        None => return Err(ValidationError::NoRows.into()),
    };
    let body: Vec<Vec<String>> = rows
        .map(|cells| cells.iter().map(cell_text).collect())
        .collect();

    let results = group_rows(&header, &body)?;
    info!("📥 解析完成: {} 个考生, {} 行", results.len(), body.len());
    Ok(results)
}

/// 按考生分组
///
/// 分组结果为空（空表、缺少 `Candidate ID` 列、该列全空）时返回 `NoRows`
pub fn group_rows(
    header: &[String],
    rows: &[Vec<String>],
) -> Result<Vec<AssessmentResult>, ValidationError> {
    let column = |name: &str| {
        header
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };
    let candidate_col = column(COL_CANDIDATE_ID).ok_or(ValidationError::NoRows)?;
    let question_col = column(COL_QUESTION_ID);
    let marks_col = column(COL_UPDATE_MARKS);

    let cell = |row: &[String], col: Option<usize>| -> String {
        col.and_then(|c| row.get(c)).cloned().unwrap_or_default()
    };

    let mut results: Vec<AssessmentResult> = Vec::new();
    let mut index_by_candidate: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let candidate_id = cell(row, Some(candidate_col));
        if candidate_id.is_empty() {
            continue;
        }

        let index = *index_by_candidate
            .entry(candidate_id.clone())
            .or_insert_with(|| {
                results.push(AssessmentResult::new(candidate_id.clone()));
                results.len() - 1
            });

        results[index].responses.push(MarkResponse {
            question: cell(row, question_col),
            marks_obtained: cell(row, marks_col),
        });
    }

    if results.is_empty() {
        return Err(ValidationError::NoRows);
    }
    Ok(results)
}

/// 单元格转文本，整数形式的浮点数不带小数点
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

//! 表格导出服务 - 业务能力层
//!
//! 把勾选的考生 × 题库题目展开成一张待打分的工作表。
//!
//! ## 表格格式
//! - 单个工作表 `Candidates`
//! - 列：`Candidate ID`、`Enrollment No`、`Name`、`Question Id`、`Max Marks`、`Update Marks`
//! - 行顺序：考生按拉取顺序，每个考生下题目按题库顺序
//! - 列宽：该列最长内容（含表头）的字符数 + 2，不小于 10

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook};
use tracing::{debug, info};

use crate::error::{AppError, AppResult, ValidationError};
use crate::models::{AssessmentType, Candidate, Question, SelectionSet};

pub const SHEET_NAME: &str = "Candidates";

pub const COL_CANDIDATE_ID: &str = "Candidate ID";
pub const COL_ENROLLMENT_NO: &str = "Enrollment No";
pub const COL_NAME: &str = "Name";
pub const COL_QUESTION_ID: &str = "Question Id";
pub const COL_MAX_MARKS: &str = "Max Marks";
pub const COL_UPDATE_MARKS: &str = "Update Marks";

pub const HEADERS: [&str; 6] = [
    COL_CANDIDATE_ID,
    COL_ENROLLMENT_NO,
    COL_NAME,
    COL_QUESTION_ID,
    COL_MAX_MARKS,
    COL_UPDATE_MARKS,
];

pub const MIN_COLUMN_WIDTH: usize = 10;
const COLUMN_PADDING: usize = 2;

/// 导出表格中的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub candidate_id: String,
    pub enrollment_no: String,
    pub name: String,
    pub question_id: String,
    pub max_marks: String,
    /// 留给阅卷人填写，导出时为空
    pub update_marks: String,
}

impl ExportRow {
    fn new(candidate: &Candidate, question: &Question) -> Self {
        Self {
            candidate_id: candidate.id.clone(),
            enrollment_no: candidate.enrollment_no.clone(),
            name: candidate.name.clone(),
            question_id: question.id.clone(),
            max_marks: question.max_marks.clone(),
            update_marks: String::new(),
        }
    }

    /// 按列顺序排列的单元格内容
    pub fn cells(&self) -> [&str; 6] {
        [
            &self.candidate_id,
            &self.enrollment_no,
            &self.name,
            &self.question_id,
            &self.max_marks,
            &self.update_marks,
        ]
    }
}

/// 生成好的工作簿内容
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedWorkbook {
    /// `candidates_<type>.xlsx`
    pub file_name: String,
    pub rows: Vec<ExportRow>,
    pub column_widths: [usize; 6],
}

/// 导出文件名
pub fn file_name_for(assessment: AssessmentType) -> String {
    format!("candidates_{}.xlsx", assessment.as_str())
}

/// 展开 考生 × 题目
///
/// 没有勾选任何考生时返回 `NoSelection`
pub fn build_rows(
    candidates: &[Candidate],
    selection: &SelectionSet,
    bank: &[Question],
) -> Result<Vec<ExportRow>, ValidationError> {
    let selected = selection.selected_in(candidates);
    if selected.is_empty() {
        return Err(ValidationError::NoSelection);
    }

    Ok(selected
        .into_iter()
        .flat_map(|candidate| bank.iter().map(move |q| ExportRow::new(candidate, q)))
        .collect())
}

/// 计算每列宽度：最长内容 + 2，下限 10
pub fn column_widths(rows: &[ExportRow]) -> [usize; 6] {
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = (*width).max(cell.chars().count());
        }
    }
    widths.map(|w| (w + COLUMN_PADDING).max(MIN_COLUMN_WIDTH))
}

/// 生成导出内容
pub fn export_workbook(
    candidates: &[Candidate],
    selection: &SelectionSet,
    bank: &[Question],
    assessment: AssessmentType,
) -> AppResult<ExportedWorkbook> {
    if !assessment.uses_workbook() {
        return Err(ValidationError::UnsupportedTab(assessment.to_string()).into());
    }

    let rows = build_rows(candidates, selection, bank)?;
    let column_widths = column_widths(&rows);
    info!(
        "📄 导出 {} 表格: {} 行 ({} 道题)",
        assessment,
        rows.len(),
        bank.len()
    );

    Ok(ExportedWorkbook {
        file_name: file_name_for(assessment),
        rows,
        column_widths,
    })
}

impl ExportedWorkbook {
    /// 序列化为 xlsx 字节
    pub fn to_buffer(&self) -> AppResult<Vec<u8>> {
        let mut workbook = Workbook::new();
        let header_format = Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap()
            .set_background_color(Color::RGB(0xFFFF00));

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        for (col, header) in HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
        }

        for (index, row) in self.rows.iter().enumerate() {
            let row_num = (index + 1) as u32;
            for (col, cell) in row.cells().into_iter().enumerate() {
                let col = col as u16;
                if cell.is_empty() {
                    continue;
                }
                // 满分写成数字，其余按文本写入，保证 ID 原样回读
                match (col, cell.parse::<f64>()) {
                    (4, Ok(number)) => {
                        worksheet.write_number(row_num, col, number)?;
                    }
                    _ => {
                        worksheet.write_string(row_num, col, cell)?;
                    }
                }
            }
        }

        for (col, width) in self.column_widths.iter().enumerate() {
            worksheet.set_column_width(col as u16, *width as f64)?;
        }

        let buffer = workbook.save_to_buffer()?;
        debug!("工作簿大小: {} 字节", buffer.len());
        Ok(buffer)
    }

    /// 保存到目录下，返回完整路径
    pub async fn save_to_dir(&self, dir: &Path) -> AppResult<PathBuf> {
        let buffer = self.to_buffer()?;
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, buffer)
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        Ok(path)
    }
}

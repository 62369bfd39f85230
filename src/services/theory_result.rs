//! 理论成绩服务 - 业务能力层
//!
//! 把操作员录入的百分比、WPM 和开考时间合并成提交记录

use std::collections::HashMap;

use chrono::{DateTime, Local, NaiveDateTime};

use crate::models::{Candidate, SelectionSet, TheoryResult};

/// 页面 datetime 输入框的格式
const LOCAL_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// 每个考生的录入缓存
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TheoryEdits {
    pub percentages: HashMap<String, String>,
    pub wpm: HashMap<String, String>,
    /// 单独修改过的开考时间，未修改的沿用批次开始时间
    pub start_dates: HashMap<String, String>,
}

impl TheoryEdits {
    pub fn clear(&mut self) {
        self.percentages.clear();
        self.wpm.clear();
        self.start_dates.clear();
    }
}

/// 为每个勾选的考生生成一条理论成绩
pub fn build_theory_results(
    candidates: &[Candidate],
    selection: &SelectionSet,
    edits: &TheoryEdits,
    batch_start: Option<&str>,
) -> Vec<TheoryResult> {
    selection
        .selected_in(candidates)
        .into_iter()
        .map(|candidate| TheoryResult {
            id: candidate.id.clone(),
            percentage: edits.percentages.get(&candidate.id).cloned(),
            wpm: edits.wpm.get(&candidate.id).cloned(),
            start_time: edits
                .start_dates
                .get(&candidate.id)
                .cloned()
                .or_else(|| batch_start.map(|s| s.to_string())),
        })
        .collect()
}

/// 把保存的开考时间转成本地时间 `YYYY-MM-DDTHH:MM`
///
/// 空值或无法解析时返回空字符串
pub fn format_local_datetime(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format(LOCAL_INPUT_FORMAT).to_string();
    }

    // 已经是本地时间（输入框原样回填的值）
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.format(LOCAL_INPUT_FORMAT).to_string())
        .unwrap_or_default()
}

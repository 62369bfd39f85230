use std::str::FromStr;

use super::batch::Batch;

/// 考核类型（页面上的标签页）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentType {
    /// 理论
    Theory,
    /// 实操
    Practical,
    /// 口试
    Viva,
}

impl AssessmentType {
    pub const ALL: [AssessmentType; 3] = [
        AssessmentType::Theory,
        AssessmentType::Practical,
        AssessmentType::Viva,
    ];

    /// 接口路径和文件名中使用的小写名称
    pub fn as_str(self) -> &'static str {
        match self {
            AssessmentType::Theory => "theory",
            AssessmentType::Practical => "practical",
            AssessmentType::Viva => "viva",
        }
    }

    /// 是否通过表格导入导出分数
    pub fn uses_workbook(self) -> bool {
        !matches!(self, AssessmentType::Theory)
    }

    /// 批次是否提供该类型的题库
    pub fn is_offered_by(self, batch: &Batch) -> bool {
        let bank = match self {
            AssessmentType::Theory => &batch.theory_question_bank,
            AssessmentType::Practical => &batch.practical_question_bank,
            AssessmentType::Viva => &batch.viva_question_bank,
        };
        bank.as_ref().map(|v| !v.is_null()).unwrap_or(false)
    }

    /// 批次提供的全部标签页，按固定顺序
    pub fn offered(batch: &Batch) -> Vec<AssessmentType> {
        Self::ALL
            .into_iter()
            .filter(|t| t.is_offered_by(batch))
            .collect()
    }
}

impl FromStr for AssessmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "theory" => Ok(AssessmentType::Theory),
            "practical" => Ok(AssessmentType::Practical),
            "viva" => Ok(AssessmentType::Viva),
            other => Err(format!("unknown assessment type: {}", other)),
        }
    }
}

impl std::fmt::Display for AssessmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

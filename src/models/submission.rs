use serde::{Deserialize, Serialize};

/// 理论成绩，一条对应一个考生
///
/// 百分比和 WPM 原样透传，未填写的字段不发送
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TheoryResult {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wpm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
}

/// 单题得分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkResponse {
    /// 题目 ID
    pub question: String,
    /// 得分，不做数值校验
    pub marks_obtained: String,
}

/// 实操 / 口试成绩，一条对应一个考生
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub candidate_id: String,
    pub responses: Vec<MarkResponse>,
}

impl AssessmentResult {
    pub fn new(candidate_id: impl Into<String>) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            responses: Vec::new(),
        }
    }
}

/// `POST batches/{id}/theory` 的请求体
#[derive(Debug, Serialize)]
pub struct TheorySubmission<'a> {
    pub candidates: &'a [TheoryResult],
}

/// `POST batches/{id}/practical|viva` 的请求体
#[derive(Debug, Serialize)]
pub struct AssessmentSubmission<'a> {
    pub result: &'a [AssessmentResult],
}

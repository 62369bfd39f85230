use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 考生
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "enrollmentNo", default)]
    pub enrollment_no: String,
    #[serde(default)]
    pub name: String,
}

/// 题库中的一道题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, alias = "question")]
    pub title: String,
    /// 满分，后端可能返回数字或字符串
    #[serde(rename = "maxMarks", default, deserialize_with = "deserialize_marks")]
    pub max_marks: String,
}

/// 批次
///
/// 三个题库引用只关心有没有，后端可能给 id 也可能给展开后的对象
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub theory_question_bank: Option<Value>,
    #[serde(default)]
    pub practical_question_bank: Option<Value>,
    #[serde(default)]
    pub viva_question_bank: Option<Value>,
}

/// `GET batches/{batchId}/candidates` 的响应
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCandidates {
    #[serde(default)]
    pub batch: Batch,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub practical_questions: Vec<Question>,
    #[serde(default)]
    pub viva_questions: Vec<Question>,
}

// 分数既可能是字符串也可能是数字
fn deserialize_marks<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct MarksVisitor;

    impl<'de> Visitor<'de> for MarksVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or number representing marks")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(MarksVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_batch_response_deserializes_with_missing_banks() {
        let body = json!({
            "batch": { "_id": "B100", "startDate": "2024-05-01T04:00:00.000Z", "practicalQuestionBank": "pb1" },
            "candidates": [
                { "_id": "c1", "enrollmentNo": "EN001", "name": "Asha" }
            ],
            "practicalQuestions": [
                { "_id": "q1", "title": "Wiring", "maxMarks": 10 },
                { "_id": "q2", "question": "Safety", "maxMarks": "7.5" }
            ]
        });

        let parsed: BatchCandidates = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.batch.id, "B100");
        assert!(parsed.batch.viva_question_bank.is_none());
        assert_eq!(parsed.candidates[0].enrollment_no, "EN001");
        assert_eq!(parsed.practical_questions[0].max_marks, "10");
        assert_eq!(parsed.practical_questions[1].title, "Safety");
        assert_eq!(parsed.practical_questions[1].max_marks, "7.5");
        assert!(parsed.viva_questions.is_empty());
    }
}

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use result_desk::error::BackendError;
use result_desk::models::{
    AssessmentResult, AssessmentType, Batch, BatchCandidates, Candidate, Question, TheoryResult,
};
use result_desk::ExamBackend;
use serde_json::json;

pub const TOKEN: &str = "tok-123";

/// 内存假后端，记录每次调用
#[derive(Default)]
pub struct FakeBackend {
    batches: Mutex<HashMap<String, BatchCandidates>>,
    failures: Mutex<HashMap<&'static str, BackendError>>,
    calls: Mutex<Vec<String>>,
    pub theory_submissions: Mutex<Vec<(String, Vec<TheoryResult>)>>,
    pub assessment_submissions: Mutex<Vec<(String, AssessmentType, Vec<AssessmentResult>)>>,
    submit_delay: Option<Duration>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch(self, batch_id: &str, data: BatchCandidates) -> Self {
        self.batches
            .lock()
            .unwrap()
            .insert(batch_id.to_string(), data);
        self
    }

    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = Some(delay);
        self
    }

    /// 让某个接口失败；`message` 为 None 表示后端没有给 message
    pub fn fail(&self, op: &'static str, message: Option<&str>) {
        self.failures.lock().unwrap().insert(
            op,
            BackendError::response(op, 400, message.map(|m| m.to_string())),
        );
    }

    pub fn recover(&self, op: &'static str) {
        self.failures.lock().unwrap().remove(op);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str) -> Result<(), BackendError> {
        self.calls.lock().unwrap().push(op.to_string());
        match self.failures.lock().unwrap().get(op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn delay(&self) {
        if let Some(delay) = self.submit_delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ExamBackend for FakeBackend {
    async fn request_otp(&self, _email: &str) -> Result<(), BackendError> {
        self.record("login")
    }

    async fn verify_otp(&self, _email: &str, otp: &str) -> Result<String, BackendError> {
        self.record("verify-otp")?;
        if otp == "000000" {
            return Err(BackendError::response("verify-otp", 401, Some("Invalid OTP".to_string())));
        }
        Ok(TOKEN.to_string())
    }

    async fn fetch_batch(
        &self,
        token: &str,
        batch_id: &str,
    ) -> Result<BatchCandidates, BackendError> {
        self.record("candidates")?;
        assert_eq!(token, TOKEN);
        self.batches
            .lock()
            .unwrap()
            .get(batch_id)
            .cloned()
            .ok_or_else(|| {
                BackendError::response("candidates", 404, Some("Batch not found".to_string()))
            })
    }

    async fn submit_theory(
        &self,
        _token: &str,
        batch_id: &str,
        results: &[TheoryResult],
    ) -> Result<(), BackendError> {
        self.delay().await;
        self.record("theory")?;
        self.theory_submissions
            .lock()
            .unwrap()
            .push((batch_id.to_string(), results.to_vec()));
        Ok(())
    }

    async fn submit_assessment(
        &self,
        _token: &str,
        batch_id: &str,
        assessment: AssessmentType,
        results: &[AssessmentResult],
    ) -> Result<(), BackendError> {
        self.delay().await;
        self.record("assessment")?;
        self.assessment_submissions.lock().unwrap().push((
            batch_id.to_string(),
            assessment,
            results.to_vec(),
        ));
        Ok(())
    }
}

pub fn candidate(id: &str, enrollment_no: &str, name: &str) -> Candidate {
    Candidate {
        id: id.to_string(),
        enrollment_no: enrollment_no.to_string(),
        name: name.to_string(),
    }
}

pub fn question(id: &str, title: &str, max_marks: &str) -> Question {
    Question {
        id: id.to_string(),
        title: title.to_string(),
        max_marks: max_marks.to_string(),
    }
}

/// 批次 B100：2 名考生，实操 3 题，口试 2 题
pub fn batch_b100() -> BatchCandidates {
    BatchCandidates {
        batch: Batch {
            id: "B100".to_string(),
            start_date: Some("2024-05-01T04:00:00.000Z".to_string()),
            theory_question_bank: Some(json!("tb1")),
            practical_question_bank: Some(json!("pb1")),
            viva_question_bank: Some(json!({ "_id": "vb1" })),
        },
        candidates: vec![
            candidate("c1", "EN001", "Asha Kulkarni"),
            candidate("c2", "EN002", "Ravi Menon"),
        ],
        practical_questions: vec![
            question("q1", "Wiring", "10"),
            question("q2", "Safety checks", "5"),
            question("q3", "Fault finding", "15"),
        ],
        viva_questions: vec![question("v1", "Theory recall", "10"), question("v2", "Tools", "10")],
    }
}

/// 批次 B200：只有实操题库，考生 c2 与 B100 重复
pub fn batch_b200() -> BatchCandidates {
    BatchCandidates {
        batch: Batch {
            id: "B200".to_string(),
            start_date: None,
            practical_question_bank: Some(json!("pb2")),
            ..Default::default()
        },
        candidates: vec![
            candidate("c2", "EN002", "Ravi Menon"),
            candidate("c9", "EN009", "Neha Singh"),
        ],
        practical_questions: vec![question("p1", "Assembly", "20")],
        viva_questions: vec![],
    }
}

/// 生成一个待上传的工作簿
pub fn upload_workbook(header: &[&str], rows: &[Vec<UploadCell>]) -> Vec<u8> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in header.iter().enumerate() {
        sheet.write_string(0, col as u16, *name).unwrap();
    }
    for (r, row) in rows.iter().enumerate() {
        for (col, cell) in row.iter().enumerate() {
            let (row_num, col) = ((r + 1) as u32, col as u16);
            match cell {
                UploadCell::Text(text) => {
                    sheet.write_string(row_num, col, *text).unwrap();
                }
                UploadCell::Number(number) => {
                    sheet.write_number(row_num, col, *number).unwrap();
                }
                UploadCell::Blank => {}
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

pub enum UploadCell {
    Text(&'static str),
    Number(f64),
    Blank,
}

/// 考务后端 API 客户端
///
/// 封装所有与考务后端相关的调用逻辑
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppResult, BackendError, ConfigError};
use crate::models::{
    AssessmentResult, AssessmentSubmission, AssessmentType, BatchCandidates, TheoryResult,
    TheorySubmission,
};

/// 后端能力
///
/// 所有失败（非 2xx 或网络错误）统一返回 `BackendError`
#[async_trait]
pub trait ExamBackend: Send + Sync {
    /// `POST login`，触发发送 OTP
    async fn request_otp(&self, email: &str) -> Result<(), BackendError>;

    /// `POST verify-otp`，返回会话 token
    async fn verify_otp(&self, email: &str, otp: &str) -> Result<String, BackendError>;

    /// `GET batches/{batchId}/candidates`
    async fn fetch_batch(&self, token: &str, batch_id: &str)
        -> Result<BatchCandidates, BackendError>;

    /// `POST batches/{batchId}/theory`
    async fn submit_theory(
        &self,
        token: &str,
        batch_id: &str,
        results: &[TheoryResult],
    ) -> Result<(), BackendError>;

    /// `POST batches/{batchId}/practical` 或 `.../viva`
    async fn submit_assessment(
        &self,
        token: &str,
        batch_id: &str,
        assessment: AssessmentType,
        results: &[AssessmentResult],
    ) -> Result<(), BackendError>;
}

/// 基于 reqwest 的后端客户端
pub struct ExamClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    token: String,
}

impl ExamClient {
    /// 创建新的后端客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// 发送请求，成功时返回状态码和响应体
    async fn send(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<(u16, String), BackendError> {
        let response = request.send().await.map_err(|e| {
            warn!("请求失败 ({}): {}", endpoint, e);
            BackendError::transport(endpoint)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!("读取响应失败 ({}): {}", endpoint, e);
            BackendError::transport(endpoint)
        })?;

        if !status.is_success() {
            warn!("接口返回错误 ({}): {} {}", endpoint, status, body);
            return Err(BackendError::response(
                endpoint,
                status.as_u16(),
                extract_message(&body),
            ));
        }

        debug!("接口返回成功 ({}): {} 字节", endpoint, body.len());
        Ok((status.as_u16(), body))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, BackendError> {
        let (status, body) = self.send(endpoint, request).await?;
        decode_body(endpoint, status, &body)
    }
}

#[async_trait]
impl ExamBackend for ExamClient {
    async fn request_otp(&self, email: &str) -> Result<(), BackendError> {
        let endpoint = "login";
        let request = self
            .client
            .post(self.url(endpoint))
            .json(&json!({ "email": email }));
        self.send(endpoint, request).await.map(|_| ())
    }

    async fn verify_otp(&self, email: &str, otp: &str) -> Result<String, BackendError> {
        let endpoint = "verify-otp";
        let request = self
            .client
            .post(self.url(endpoint))
            .json(&json!({ "email": email, "otp": otp }));
        let body: TokenBody = self.send_json(endpoint, request).await?;
        Ok(body.token)
    }

    async fn fetch_batch(
        &self,
        token: &str,
        batch_id: &str,
    ) -> Result<BatchCandidates, BackendError> {
        let endpoint = format!("batches/{}/candidates", batch_id);
        let request = self.client.get(self.url(&endpoint)).bearer_auth(token);
        self.send_json(&endpoint, request).await
    }

    async fn submit_theory(
        &self,
        token: &str,
        batch_id: &str,
        results: &[TheoryResult],
    ) -> Result<(), BackendError> {
        let endpoint = format!("batches/{}/theory", batch_id);
        let request = self
            .client
            .post(self.url(&endpoint))
            .bearer_auth(token)
            .json(&TheorySubmission {
                candidates: results,
            });
        self.send(&endpoint, request).await.map(|_| ())
    }

    async fn submit_assessment(
        &self,
        token: &str,
        batch_id: &str,
        assessment: AssessmentType,
        results: &[AssessmentResult],
    ) -> Result<(), BackendError> {
        let endpoint = format!("batches/{}/{}", batch_id, assessment.as_str());
        let request = self
            .client
            .post(self.url(&endpoint))
            .bearer_auth(token)
            .json(&AssessmentSubmission { result: results });
        self.send(&endpoint, request).await.map(|_| ())
    }
}

/// 解析成功响应的 JSON，失败时带上实际状态码
fn decode_body<T: DeserializeOwned>(
    endpoint: &str,
    status: u16,
    body: &str,
) -> Result<T, BackendError> {
    serde_json::from_str(body).map_err(|e| {
        warn!("响应 JSON 解析失败 ({}): {}", endpoint, e);
        BackendError::response(endpoint, status, None)
    })
}

/// 从错误响应体中提取 `message` 字段
pub fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|v| v.as_str())
        .filter(|m| !m.trim().is_empty())
        .map(|m| m.to_string())
}

//! 登录服务 - 业务能力层
//!
//! 邮箱 → OTP → 已登录 的两步登录流程。
//!
//! 每一步失败都停留在原状态，不自动重试；token 没有本地过期检查，
//! 直到后端拒绝为止都视为有效。

use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::{info, warn};

use crate::clients::ExamBackend;
use crate::error::{AppResult, ValidationError};
use crate::infrastructure::{SessionStore, PENDING_EMAIL_KEY, TOKEN_KEY};

/// 登录状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    /// 初始状态，等待输入邮箱
    AwaitingEmail,
    /// OTP 已发送
    AwaitingOtp { email: String },
    /// 已拿到 token
    Authenticated,
}

/// 登录流程
pub struct SessionGate {
    backend: Arc<dyn ExamBackend>,
    store: Arc<dyn SessionStore>,
    state: GateState,
}

impl SessionGate {
    /// 从初始状态开始
    pub fn new(backend: Arc<dyn ExamBackend>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            backend,
            store,
            state: GateState::AwaitingEmail,
        }
    }

    /// 根据已保存的会话恢复状态
    ///
    /// 有 token 视为已登录；否则有待验证的邮箱则继续等待 OTP。
    pub fn restore(backend: Arc<dyn ExamBackend>, store: Arc<dyn SessionStore>) -> AppResult<Self> {
        let state = if store.get(TOKEN_KEY)?.is_some() {
            GateState::Authenticated
        } else if let Some(email) = store.get(PENDING_EMAIL_KEY)? {
            GateState::AwaitingOtp { email }
        } else {
            GateState::AwaitingEmail
        };

        Ok(Self {
            backend,
            store,
            state,
        })
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == GateState::Authenticated
    }

    /// 请求发送 OTP
    pub async fn request_otp(&mut self, email: &str) -> AppResult<()> {
        let email = email.trim();
        validate_email(email)?;

        info!("📧 正在向 {} 发送 OTP...", email);
        self.backend.request_otp(email).await.map_err(|e| {
            warn!("⚠️ 发送 OTP 失败: {}", e);
            e
        })?;

        // 重新登录时清除旧 token
        self.store.remove(TOKEN_KEY)?;
        self.store.set(PENDING_EMAIL_KEY, email)?;
        self.state = GateState::AwaitingOtp {
            email: email.to_string(),
        };
        info!("✓ OTP sent to your email!");
        Ok(())
    }

    /// 校验 OTP，成功后保存 token
    pub async fn verify_otp(&mut self, otp: &str) -> AppResult<()> {
        let email = match &self.state {
            GateState::AwaitingOtp { email } => email.clone(),
            _ => return Err(ValidationError::NoPendingOtp.into()),
        };
        let otp = otp.trim();
        if otp.is_empty() {
            return Err(ValidationError::OtpRequired.into());
        }

        let token = self.backend.verify_otp(&email, otp).await.map_err(|e| {
            warn!("⚠️ OTP 校验失败: {}", e);
            e
        })?;

        self.store.set(TOKEN_KEY, &token)?;
        self.store.remove(PENDING_EMAIL_KEY)?;
        self.state = GateState::Authenticated;
        info!("✓ Login successful!");
        Ok(())
    }

    /// 退出登录，不需要请求后端
    pub fn logout(&mut self) -> AppResult<()> {
        self.state = GateState::AwaitingEmail;
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(PENDING_EMAIL_KEY)?;
        info!("👋 已退出登录");
        Ok(())
    }
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\S+@\S+\.\S+").expect("valid email pattern"))
}

/// 邮箱格式校验：非空，且形如 `x@y.z`
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if !email_pattern().is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

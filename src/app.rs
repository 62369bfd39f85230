//! 应用入口 - 编排层
//!
//! 每个 CLI 子命令对应页面上的一个操作员动作。CLI 每次调用都是新进程，
//! 批次数据每次重新拉取，只有会话文件跨调用保留。

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::clients::{ExamBackend, ExamClient};
use crate::config::Config;
use crate::infrastructure::{FileSessionStore, SessionStore};
use crate::models::AssessmentType;
use crate::services::{format_local_datetime, GateState, SessionGate};
use crate::utils::logging;
use crate::workflow::{DeskState, ResultDesk};

/// 导出时勾选哪些考生
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidatePick {
    /// 点一次全选
    All,
    /// 逐个勾选
    Ids(Vec<String>),
}

/// 一个考生的理论成绩录入：`id=percentage,wpm[,startTime]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TheoryEntry {
    pub candidate_id: String,
    pub percentage: String,
    pub wpm: String,
    pub start_time: Option<String>,
}

impl FromStr for TheoryEntry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (candidate_id, values) = s
            .split_once('=')
            .ok_or_else(|| format!("expected id=percentage,wpm[,startTime], got '{}'", s))?;
        let mut parts = values.splitn(3, ',').map(str::trim);
        let percentage = parts.next().unwrap_or_default();
        let wpm = parts
            .next()
            .ok_or_else(|| format!("missing wpm for candidate '{}'", candidate_id))?;
        let start_time = parts.next().filter(|v| !v.is_empty()).map(str::to_string);

        let candidate_id = candidate_id.trim();
        if candidate_id.is_empty() {
            return Err(format!("missing candidate id in '{}'", s));
        }

        Ok(Self {
            candidate_id: candidate_id.to_string(),
            percentage: percentage.to_string(),
            wpm: wpm.to_string(),
            start_time,
        })
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    backend: Arc<dyn ExamBackend>,
    store: Arc<dyn SessionStore>,
}

impl App {
    /// 初始化应用：HTTP 客户端 + 会话文件
    pub fn initialize(config: Config) -> Result<Self> {
        logging::log_startup(&config);

        let backend = ExamClient::new(&config).context("无法创建后端客户端")?;
        let store = FileSessionStore::new(&config.session_file);

        Ok(Self::with_parts(config, Arc::new(backend), Arc::new(store)))
    }

    /// 使用指定的后端和存储创建
    pub fn with_parts(
        config: Config,
        backend: Arc<dyn ExamBackend>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            config,
            backend,
            store,
        }
    }

    fn gate(&self) -> Result<SessionGate> {
        SessionGate::restore(self.backend.clone(), self.store.clone())
            .context("无法读取会话")
    }

    fn desk(&self) -> Result<ResultDesk> {
        Ok(ResultDesk::from_store(
            self.backend.clone(),
            self.store.as_ref(),
        )?)
    }

    /// 当前登录状态
    pub fn status(&self) -> Result<GateState> {
        Ok(self.gate()?.state().clone())
    }

    /// 第一步：发送 OTP
    pub async fn login(&self, email: &str) -> Result<()> {
        let mut gate = self.gate()?;
        gate.request_otp(email).await?;
        Ok(())
    }

    /// 第二步：校验 OTP
    pub async fn verify(&self, otp: &str) -> Result<()> {
        let mut gate = self.gate()?;
        gate.verify_otp(otp).await?;
        Ok(())
    }

    pub fn logout(&self) -> Result<()> {
        self.gate()?.logout()?;
        Ok(())
    }

    /// 拉取批次并打印考生列表
    pub async fn fetch(&self, batch_id: &str) -> Result<DeskState> {
        let desk = self.desk()?;
        desk.load_batch(batch_id).await?;

        let state = desk.snapshot();
        let rows: Vec<(String, String)> = state
            .data
            .candidates
            .iter()
            .map(|c| (c.enrollment_no.clone(), c.name.clone()))
            .collect();
        logging::log_candidates(batch_id, &rows);
        info!(
            "🕘 批次开始时间: {}",
            format_local_datetime(state.data.batch.start_date.as_deref().unwrap_or_default())
        );
        Ok(state)
    }

    /// 拉取批次、勾选考生并导出表格
    pub async fn export(
        &self,
        batch_id: &str,
        tab: AssessmentType,
        pick: &CandidatePick,
        output_dir: Option<&Path>,
    ) -> Result<PathBuf> {
        let desk = self.desk()?;
        desk.load_batch(batch_id).await?;
        desk.select_tab(tab)?;
        apply_pick(&desk, pick)?;

        let dir = output_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(&self.config.output_dir));
        Ok(desk.export_results(&dir).await?)
    }

    /// 拉取批次并导入阅卷后的表格
    pub async fn import(
        &self,
        batch_id: &str,
        tab: AssessmentType,
        file: Option<&Path>,
    ) -> Result<usize> {
        let desk = self.desk()?;
        desk.load_batch(batch_id).await?;
        desk.select_tab(tab)?;
        Ok(desk.import_results(file).await?)
    }

    /// 拉取批次并提交理论成绩
    pub async fn theory(&self, batch_id: &str, entries: &[TheoryEntry]) -> Result<usize> {
        let desk = self.desk()?;
        desk.load_batch(batch_id).await?;

        for entry in entries {
            desk.select_candidate(&entry.candidate_id, true)?;
            desk.set_percentage(&entry.candidate_id, &entry.percentage)?;
            desk.set_wpm(&entry.candidate_id, &entry.wpm)?;
            if let Some(start_time) = &entry.start_time {
                desk.set_start_date(&entry.candidate_id, start_time)?;
            }
        }

        Ok(desk.submit_theory().await?)
    }
}

fn apply_pick(desk: &ResultDesk, pick: &CandidatePick) -> Result<()> {
    match pick {
        CandidatePick::All => {
            desk.toggle_select_all();
        }
        CandidatePick::Ids(ids) => {
            for id in ids {
                desk.select_candidate(id, true)?;
            }
        }
    }
    Ok(())
}

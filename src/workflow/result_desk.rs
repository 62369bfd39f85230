//! 成绩录入台 - 流程层
//!
//! 核心职责：持有一次会话内的全部页面状态，并编排每个操作员动作
//!
//! - 拉取批次：整体替换批次、考生、题库，不清空勾选和录入缓存
//! - 理论成绩提交、表格导出、表格导入：各自带一个进行中标记，
//!   同类动作未结束时再次触发直接拒绝
//! - 任何动作失败都不改动已有状态

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{info, warn};

use crate::clients::ExamBackend;
use crate::error::{AppResult, ValidationError};
use crate::infrastructure::SessionStore;
use crate::models::{AssessmentType, BatchCandidates, Question, SelectionSet};
use crate::services::{
    build_theory_results, export_workbook, parse_workbook, ExportedWorkbook, TheoryEdits,
};
use crate::workflow::desk_ctx::DeskCtx;

/// 页面状态
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeskState {
    /// 最近一次成功拉取的批次 ID
    pub batch_id: Option<String>,
    pub data: BatchCandidates,
    pub selection: SelectionSet,
    pub edits: TheoryEdits,
    pub active_tab: Option<AssessmentType>,
}

impl DeskState {
    /// 某个标签页对应的题库
    pub fn bank(&self, tab: AssessmentType) -> &[Question] {
        match tab {
            AssessmentType::Practical => &self.data.practical_questions,
            AssessmentType::Viva => &self.data.viva_questions,
            AssessmentType::Theory => &[],
        }
    }

    fn require_batch(&self) -> Result<&str, ValidationError> {
        self.batch_id.as_deref().ok_or(ValidationError::NoBatchLoaded)
    }

    fn require_candidate(&self, candidate_id: &str) -> Result<(), ValidationError> {
        if self.data.candidates.iter().any(|c| c.id == candidate_id) {
            Ok(())
        } else {
            Err(ValidationError::UnknownCandidate(candidate_id.to_string()))
        }
    }

    fn workbook_tab(&self) -> Result<AssessmentType, ValidationError> {
        self.require_batch()?;
        match self.active_tab {
            Some(tab) if tab.uses_workbook() => Ok(tab),
            Some(tab) => Err(ValidationError::UnsupportedTab(tab.to_string())),
            None => Err(ValidationError::NoActiveTab),
        }
    }

    fn ctx(&self) -> DeskCtx {
        DeskCtx {
            batch_id: self.batch_id.clone(),
            tab: self.active_tab,
        }
    }
}

/// 进行中标记，离开作用域时自动释放
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool, action: &str) -> Result<Self, ValidationError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| BusyGuard(flag))
            .map_err(|_| ValidationError::Busy(action.to_string()))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// 成绩录入台
pub struct ResultDesk {
    backend: Arc<dyn ExamBackend>,
    token: String,
    state: Mutex<DeskState>,
    theory_busy: AtomicBool,
    export_busy: AtomicBool,
    import_busy: AtomicBool,
}

impl ResultDesk {
    pub fn new(backend: Arc<dyn ExamBackend>, token: impl Into<String>) -> Self {
        Self {
            backend,
            token: token.into(),
            state: Mutex::new(DeskState::default()),
            theory_busy: AtomicBool::new(false),
            export_busy: AtomicBool::new(false),
            import_busy: AtomicBool::new(false),
        }
    }

    /// 使用已保存的 token 创建，未登录时返回 `NotAuthenticated`
    pub fn from_store(backend: Arc<dyn ExamBackend>, store: &dyn SessionStore) -> AppResult<Self> {
        let token = store.token()?.ok_or(ValidationError::NotAuthenticated)?;
        Ok(Self::new(backend, token))
    }

    fn state(&self) -> MutexGuard<'_, DeskState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 当前状态的副本
    pub fn snapshot(&self) -> DeskState {
        self.state().clone()
    }

    pub fn ctx(&self) -> DeskCtx {
        self.state().ctx()
    }

    /// 清空全部状态（相当于刷新页面）
    pub fn reset(&self) {
        let mut state = self.state();
        state.batch_id = None;
        state.data = BatchCandidates::default();
        state.selection.clear();
        state.edits.clear();
        state.active_tab = None;
    }

    // ========== 批次 ==========

    /// 拉取批次并整体替换考生和题库，返回考生数量
    pub async fn load_batch(&self, batch_id: &str) -> AppResult<usize> {
        let batch_id = batch_id.trim();
        if batch_id.is_empty() {
            return Err(ValidationError::BatchIdRequired.into());
        }

        info!("📦 正在拉取批次 {} 的考生...", batch_id);
        let data = self
            .backend
            .fetch_batch(&self.token, batch_id)
            .await
            .map_err(|e| {
                warn!("⚠️ 拉取批次 {} 失败: {}", batch_id, e);
                e
            })?;

        let offered = AssessmentType::offered(&data.batch);
        let count = data.candidates.len();

        let mut state = self.state();
        if state.batch_id.as_deref().is_some_and(|id| id != batch_id)
            && state.selection.selected_count(&data.candidates) > 0
        {
            // 上一个批次的勾选仍然保留，ID 相同的考生会被带入新批次
            warn!("⚠️ 切换到批次 {} 时沿用了上一个批次的勾选", batch_id);
        }
        state.data = data;
        state.batch_id = Some(batch_id.to_string());
        state.active_tab = match state.active_tab {
            Some(tab) if offered.contains(&tab) => Some(tab),
            _ => offered.first().copied(),
        };

        info!(
            "{} ✓ 共 {} 名考生, 可用标签页: {:?}",
            state.ctx(),
            count,
            offered
        );
        Ok(count)
    }

    /// 切换标签页
    pub fn select_tab(&self, tab: AssessmentType) -> AppResult<()> {
        let mut state = self.state();
        state.require_batch()?;
        if !tab.is_offered_by(&state.data.batch) {
            return Err(ValidationError::TabNotOffered(tab.to_string()).into());
        }
        state.active_tab = Some(tab);
        Ok(())
    }

    // ========== 勾选 ==========

    /// 切换单个考生的勾选，返回切换后的状态
    pub fn toggle_candidate(&self, candidate_id: &str) -> AppResult<bool> {
        let mut state = self.state();
        state.require_candidate(candidate_id)?;
        Ok(state.selection.toggle(candidate_id))
    }

    /// 直接设置单个考生的勾选状态，重复设置结果不变
    pub fn select_candidate(&self, candidate_id: &str, selected: bool) -> AppResult<()> {
        let mut state = self.state();
        state.require_candidate(candidate_id)?;
        state.selection.set(candidate_id, selected);
        Ok(())
    }

    /// 切换全选，返回全选框的新状态
    pub fn toggle_select_all(&self) -> bool {
        let mut state = self.state();
        let DeskState {
            data, selection, ..
        } = &mut *state;
        selection.toggle_all(&data.candidates)
    }

    // ========== 理论成绩录入 ==========

    pub fn set_percentage(&self, candidate_id: &str, value: &str) -> AppResult<()> {
        let mut state = self.state();
        state.require_candidate(candidate_id)?;
        state
            .edits
            .percentages
            .insert(candidate_id.to_string(), value.to_string());
        Ok(())
    }

    pub fn set_wpm(&self, candidate_id: &str, value: &str) -> AppResult<()> {
        let mut state = self.state();
        state.require_candidate(candidate_id)?;
        state
            .edits
            .wpm
            .insert(candidate_id.to_string(), value.to_string());
        Ok(())
    }

    /// 单独修改某个考生的开考时间
    pub fn set_start_date(&self, candidate_id: &str, value: &str) -> AppResult<()> {
        let mut state = self.state();
        state.require_candidate(candidate_id)?;
        state
            .edits
            .start_dates
            .insert(candidate_id.to_string(), value.to_string());
        Ok(())
    }

    /// 提交理论成绩，返回提交的考生数量
    pub async fn submit_theory(&self) -> AppResult<usize> {
        let _busy = BusyGuard::acquire(&self.theory_busy, "theory")?;

        let (ctx, batch_id, results) = {
            let state = self.state();
            let batch_id = state.require_batch()?.to_string();
            let results = build_theory_results(
                &state.data.candidates,
                &state.selection,
                &state.edits,
                state.data.batch.start_date.as_deref(),
            );
            (state.ctx(), batch_id, results)
        };
        if results.is_empty() {
            return Err(ValidationError::NoSelection.into());
        }

        info!("{} 📤 提交 {} 条理论成绩...", ctx, results.len());
        self.backend
            .submit_theory(&self.token, &batch_id, &results)
            .await
            .map_err(|e| {
                warn!("{} ⚠️ 理论成绩提交失败: {}", ctx, e);
                e
            })?;

        info!("{} ✓ Results updated successfully", ctx);
        Ok(results.len())
    }

    // ========== 表格导入导出 ==========

    /// 生成当前标签页的导出内容
    pub fn prepare_export(&self) -> AppResult<ExportedWorkbook> {
        let state = self.state();
        let tab = state.workbook_tab()?;
        export_workbook(
            &state.data.candidates,
            &state.selection,
            state.bank(tab),
            tab,
        )
    }

    /// 导出当前标签页的表格到目录，返回文件路径
    pub async fn export_results(&self, dir: &Path) -> AppResult<PathBuf> {
        let _busy = BusyGuard::acquire(&self.export_busy, "export")?;

        let ctx = self.ctx();
        let exported = self.prepare_export()?;
        let path = exported.save_to_dir(dir).await.map_err(|e| {
            warn!("{} ⚠️ 导出失败: {}", ctx, e);
            e
        })?;

        info!("{} ✓ 已导出: {}", ctx, path.display());
        Ok(path)
    }

    /// 导入阅卷后的表格并提交到当前标签页，返回提交的考生数量
    pub async fn import_results(&self, file: Option<&Path>) -> AppResult<usize> {
        let file = file.ok_or(ValidationError::EmptyFile)?;
        let _busy = BusyGuard::acquire(&self.import_busy, "import")?;

        let (ctx, batch_id, tab) = {
            let state = self.state();
            let tab = state.workbook_tab()?;
            (state.ctx(), state.require_batch()?.to_string(), tab)
        };

        let results = parse_workbook(Some(file)).await?;

        info!("{} 📤 提交 {} 名考生的 {} 成绩...", ctx, results.len(), tab);
        self.backend
            .submit_assessment(&self.token, &batch_id, tab, &results)
            .await
            .map_err(|e| {
                warn!("{} ⚠️ 成绩提交失败: {}", ctx, e);
                e
            })?;

        info!("{} ✓ Results uploaded successfully", ctx);
        Ok(results.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_guard_releases_on_drop() {
        let flag = AtomicBool::new(false);
        {
            let _guard = BusyGuard::acquire(&flag, "export").unwrap();
            assert_eq!(
                BusyGuard::acquire(&flag, "export").err(),
                Some(ValidationError::Busy("export".to_string()))
            );
        }
        assert!(BusyGuard::acquire(&flag, "export").is_ok());
    }
}

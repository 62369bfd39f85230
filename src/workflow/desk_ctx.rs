//! 操作上下文
//!
//! 封装"我正在处理哪个批次的哪个标签页"这一信息，只用于日志

use std::fmt::Display;

use crate::models::AssessmentType;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeskCtx {
    /// 批次 ID
    pub batch_id: Option<String>,
    /// 当前标签页
    pub tab: Option<AssessmentType>,
}

impl Display for DeskCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let batch = self.batch_id.as_deref().unwrap_or("-");
        match self.tab {
            Some(tab) => write!(f, "[批次 {} | {}]", batch, tab),
            None => write!(f, "[批次 {}]", batch),
        }
    }
}

/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则默认 info，详细模式下为 debug
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("result_desk={}", default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 成绩录入台启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🌐 后端地址: {}", config.api_base_url);
    info!("{}", "=".repeat(60));
}

/// 记录批次加载信息
///
/// # 参数
/// - `batch_id`: 批次ID
/// - `rows`: (报名号, 姓名) 列表
pub fn log_candidates(batch_id: &str, rows: &[(String, String)]) {
    info!("\n{}", "─".repeat(60));
    info!("📋 批次 {} 共 {} 名考生", batch_id, rows.len());
    for (enrollment_no, name) in rows {
        info!("  {:<16} {}", enrollment_no, truncate_text(name, 32));
    }
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("Asha", 10), "Asha");
        assert_eq!(truncate_text("Shreya Venkataraman", 6), "Shreya...");
        assert_eq!(truncate_text("चन्द्रशेखर", 3), "चन्...");
    }
}

/// 程序配置
use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, AppResult, ConfigError};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 后端接口根地址，以 `/` 结尾
    pub api_base_url: String,
    /// 会话文件（保存 token）
    pub session_file: String,
    /// 导出表格的存放目录
    pub output_dir: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api/".to_string(),
            session_file: ".result_desk_session.toml".to_string(),
            output_dir: ".".to_string(),
            request_timeout_secs: 30,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量读取配置，未设置的项使用默认值
    pub fn from_env() -> AppResult<Self> {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件读取配置，再用环境变量覆盖
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })?;
        config.with_env_overrides()
    }

    fn with_env_overrides(self) -> AppResult<Self> {
        Ok(Self {
            api_base_url: normalize_base_url(
                std::env::var("RESULT_DESK_API_BASE_URL").unwrap_or(self.api_base_url),
            ),
            session_file: std::env::var("RESULT_DESK_SESSION_FILE").unwrap_or(self.session_file),
            output_dir: std::env::var("RESULT_DESK_OUTPUT_DIR").unwrap_or(self.output_dir),
            request_timeout_secs: parse_env("RESULT_DESK_REQUEST_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.request_timeout_secs),
            verbose_logging: parse_env("RESULT_DESK_VERBOSE", "bool")?
                .unwrap_or(self.verbose_logging),
        })
    }
}

/// 读取并解析环境变量；未设置返回 None，无法解析返回错误
fn parse_env<T: std::str::FromStr>(var_name: &str, expected_type: &str) -> AppResult<Option<T>> {
    match std::env::var(var_name) {
        Ok(value) => value.trim().parse().map(Some).map_err(|_| {
            ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }
            .into()
        }),
        Err(_) => Ok(None),
    }
}

fn normalize_base_url(url: String) -> String {
    if url.ends_with('/') {
        url
    } else {
        format!("{}/", url)
    }
}

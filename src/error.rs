//! 错误类型
//!
//! 分为三类面向操作员的错误：输入校验（发请求前就能发现）、后端错误、表格解析错误；
//! 另有文件和配置两类供 CLI 使用。
//!
//! `Validation` 和 `Backend` 的 Display 直接就是提示给操作员的文案。

use thiserror::Error;

/// 后端没有给出 `message` 字段时使用的兜底提示
pub const GENERIC_FAILURE: &str = "Something went wrong";

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 输入校验错误
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// 后端调用错误
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// 表格解析错误
    #[error("表格解析失败: {0}")]
    Parse(#[from] ParseError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 输入校验错误，在任何网络请求之前抛出
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Email is required")]
    EmailRequired,
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("OTP is required")]
    OtpRequired,
    /// 不在等待 OTP 的状态下调用了 verify
    #[error("Request an OTP before verifying")]
    NoPendingOtp,
    /// 本地没有保存 token
    #[error("Not logged in")]
    NotAuthenticated,
    #[error("Batch ID is required")]
    BatchIdRequired,
    /// 还没有加载任何批次
    #[error("Fetch a batch first")]
    NoBatchLoaded,
    /// 导出时没有勾选任何考生
    #[error("No candidates selected")]
    NoSelection,
    /// 导入时没有选择文件
    #[error("Please choose a file to upload")]
    EmptyFile,
    /// 导入的表格分组后一个考生都没有
    #[error("no candidates selected")]
    NoRows,
    /// 当前批次没有这个题库
    #[error("Batch has no {0} question bank")]
    TabNotOffered(String),
    /// 理论考试不走表格导入导出
    #[error("{0} results cannot be exchanged as a workbook")]
    UnsupportedTab(String),
    /// 导入导出前需要先选中实操或口试标签页
    #[error("Select a practical or viva tab first")]
    NoActiveTab,
    /// 同类批量操作正在进行中
    #[error("A {0} action is already in progress")]
    Busy(String),
    #[error("Unknown candidate: {0}")]
    UnknownCandidate(String),
}

/// 后端错误：非 2xx 响应或网络层失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    /// 请求的接口
    pub endpoint: String,
    /// HTTP 状态码，网络层失败时为 None
    pub status: Option<u16>,
    /// 后端返回的 message，或兜底文案
    pub message: String,
}

impl BackendError {
    /// 网络层失败（没有拿到响应）
    pub fn transport(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            status: None,
            message: GENERIC_FAILURE.to_string(),
        }
    }

    /// 后端返回了错误响应
    ///
    /// `message` 为 None 时使用兜底文案
    pub fn response(endpoint: impl Into<String>, status: u16, message: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            status: Some(status),
            message: message.unwrap_or_else(|| GENERIC_FAILURE.to_string()),
        }
    }
}

/// 表格解析错误
#[derive(Debug, Error)]
pub enum ParseError {
    /// 文件不是可读的 xlsx
    #[error("无法读取工作簿: {0}")]
    Unreadable(String),
    /// 工作簿里一个工作表都没有
    #[error("工作簿中没有工作表")]
    NoSheet,
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 生成 xlsx 失败
    #[error("生成工作簿失败: {0}")]
    WorkbookWrite(#[from] rust_xlsxwriter::XlsxError),
    /// 会话文件格式错误
    #[error("会话文件格式错误 ({path}): {message}")]
    SessionCorrupted { path: String, message: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 无法构建 HTTP 客户端
    #[error("无法构建 HTTP 客户端: {0}")]
    HttpClient(String),
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 是否属于输入校验错误
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        AppError::File(FileError::WorkbookWrite(err))
    }
}

impl From<calamine::XlsxError> for AppError {
    fn from(err: calamine::XlsxError) -> Self {
        AppError::Parse(ParseError::Unreadable(err.to_string()))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_falls_back_to_generic_message() {
        let err = BackendError::response("login", 500, None);
        assert_eq!(err.to_string(), GENERIC_FAILURE);

        let err = BackendError::response("login", 400, Some("User not found".to_string()));
        assert_eq!(err.to_string(), "User not found");
        assert_eq!(err.status, Some(400));
    }

    #[test]
    fn test_validation_message_is_operator_facing() {
        let err: AppError = ValidationError::NoRows.into();
        assert_eq!(err.to_string(), "no candidates selected");
        assert!(err.is_validation());
    }
}

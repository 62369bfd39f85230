//! 会话存储 - 基础设施层
//!
//! 持有 token 的持久化位置，只暴露 get / set / remove 能力

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::error::{AppError, AppResult, FileError};

/// 会话 token 的键
pub const TOKEN_KEY: &str = "token";
/// 已发送 OTP、等待验证的邮箱
pub const PENDING_EMAIL_KEY: &str = "pending_email";

/// 键值存储
///
/// 职责：
/// - 保存会话 token
/// - 不关心登录流程
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> AppResult<()>;
    fn remove(&self, key: &str) -> AppResult<()>;

    /// 读取当前 token
    fn token(&self) -> AppResult<Option<String>> {
        self.get(TOKEN_KEY)
    }
}

/// 基于 TOML 文件的存储，CLI 每次调用之间保持登录状态
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> AppResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let path = self.path.display().to_string();
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| AppError::file_read_failed(path.clone(), e))?;
        toml::from_str(&content).map_err(|e| {
            FileError::SessionCorrupted {
                path,
                message: e.to_string(),
            }
            .into()
        })
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> AppResult<()> {
        let path = self.path.display().to_string();
        if entries.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).map_err(|e| AppError::file_write_failed(path, e))?;
            }
            return Ok(());
        }
        let content = toml::to_string(entries).map_err(|e| FileError::SessionCorrupted {
            path: path.clone(),
            message: e.to_string(),
        })?;
        write_private(&self.path, &content).map_err(|e| AppError::file_write_failed(path, e))
    }
}

/// 写入只有当前用户可读写的文件（unix 下 0o600）
fn write_private(path: &Path, content: &str) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    // mode 只在新建时生效，已存在的文件需要单独收紧
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(content.as_bytes())
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        debug!("写入会话文件: {} ({})", self.path.display(), key);
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            debug!("清除会话键: {}", key);
            self.save(&entries)?;
        }
        Ok(())
    }
}

/// 内存存储，进程结束即丢失
#[derive(Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }
}

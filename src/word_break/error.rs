//! 分词换行模块统一错误处理
//!
//! 提供结构化错误类型和错误处理机制

use std::fmt;

use thiserror::Error;

/// 分词换行错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WordBreakError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 分词器初始化失败
    #[error("分词器初始化失败: {0}")]
    TokenizerInitError(String),

    /// 分词失败
    #[error("分词失败: {0}")]
    TokenizeError(String),

    /// DOM修改失败
    #[error("DOM修改失败: {0}")]
    MutationError(String),

    /// 超时错误
    #[error("操作超时: {0}")]
    TimeoutError(String),

    /// 解析错误
    #[error("解析错误: {0}")]
    ParseError(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    SerializationError(String),

    /// IO错误
    #[error("IO错误: {0}")]
    IoError(String),

    /// 内部错误
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl WordBreakError {
    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            WordBreakError::ConfigError(_) => ErrorSeverity::Critical,
            WordBreakError::TokenizerInitError(_) => ErrorSeverity::Critical,
            WordBreakError::TokenizeError(_) => ErrorSeverity::Error,
            WordBreakError::MutationError(_) => ErrorSeverity::Error,
            WordBreakError::TimeoutError(_) => ErrorSeverity::Warning,
            WordBreakError::ParseError(_) => ErrorSeverity::Error,
            WordBreakError::SerializationError(_) => ErrorSeverity::Error,
            WordBreakError::IoError(_) => ErrorSeverity::Error,
            WordBreakError::InternalError(_) => ErrorSeverity::Critical,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            WordBreakError::ConfigError(_) => ErrorCategory::Configuration,
            WordBreakError::TokenizerInitError(_) => ErrorCategory::Initialization,
            WordBreakError::TokenizeError(_) => ErrorCategory::Processing,
            WordBreakError::MutationError(_) => ErrorCategory::Processing,
            WordBreakError::TimeoutError(_) => ErrorCategory::Timeout,
            WordBreakError::ParseError(_) => ErrorCategory::Parsing,
            WordBreakError::SerializationError(_) => ErrorCategory::Serialization,
            WordBreakError::IoError(_) => ErrorCategory::Io,
            WordBreakError::InternalError(_) => ErrorCategory::Internal,
        }
    }

    /// 创建带上下文的错误
    pub fn with_context<T: fmt::Display>(mut self, context: T) -> Self {
        let current_msg = self.to_string();
        let new_msg = format!("{} (上下文: {})", current_msg, context);

        match &mut self {
            WordBreakError::ConfigError(msg)
            | WordBreakError::TokenizerInitError(msg)
            | WordBreakError::TokenizeError(msg)
            | WordBreakError::MutationError(msg)
            | WordBreakError::TimeoutError(msg)
            | WordBreakError::ParseError(msg)
            | WordBreakError::SerializationError(msg)
            | WordBreakError::IoError(msg)
            | WordBreakError::InternalError(msg) => *msg = new_msg,
        }

        self
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Initialization,
    Processing,
    Timeout,
    Parsing,
    Serialization,
    Io,
    Internal,
}

/// 标准错误转换
impl From<std::io::Error> for WordBreakError {
    fn from(error: std::io::Error) -> Self {
        WordBreakError::IoError(error.to_string())
    }
}

impl From<serde_json::Error> for WordBreakError {
    fn from(error: serde_json::Error) -> Self {
        WordBreakError::ParseError(format!("JSON解析错误: {}", error))
    }
}

impl From<toml::de::Error> for WordBreakError {
    fn from(error: toml::de::Error) -> Self {
        WordBreakError::ParseError(format!("TOML解析错误: {}", error))
    }
}

impl From<toml::ser::Error> for WordBreakError {
    fn from(error: toml::ser::Error) -> Self {
        WordBreakError::SerializationError(format!("TOML序列化错误: {}", error))
    }
}

/// 错误结果类型别名
pub type WordBreakResult<T> = Result<T, WordBreakError>;

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 按严重程度记录错误，不向上传播
    pub fn log_error(error: &WordBreakError) {
        match error.severity() {
            ErrorSeverity::Info => tracing::info!("分词换行信息: {}", error),
            ErrorSeverity::Warning => tracing::warn!("分词换行警告: {}", error),
            ErrorSeverity::Error => tracing::error!("分词换行错误: {}", error),
            ErrorSeverity::Critical => tracing::error!("分词换行严重错误: {}", error),
        }
    }
}

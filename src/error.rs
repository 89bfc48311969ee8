use std::fmt;

use thiserror::Error;

use crate::TaskKind;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Usage error: {0}")]
    Usage(String), // 引数の不足や入力ファイルが存在しない場合

    #[error("Validation error: {0}")]
    Validation(String), // 一般的なバリデーションエラーメッセージ

    #[error("A file transfer has failed")]
    TransferFailed { failures: Vec<TaskFailure> },
}

// 失敗したタスクとその原因
// A task that failed, together with its error.
#[derive(Debug)]
pub struct TaskFailure {
    pub task: TaskKind,
    pub error: TransferError,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} task: {}", self.task, self.error)
    }
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("connection error: {context}")]
    Connection {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("authentication error: {context}")]
    Authentication {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("filesystem error: {context}")]
    Filesystem {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("protocol error: {context}")]
    Protocol {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("task aborted: {0}")]
    Aborted(String), // パニックなどでタスクが完了しなかった場合
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Connection,
    Authentication,
    Filesystem,
    Protocol,
    Aborted,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Connection => "connection",
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Filesystem => "filesystem",
            ErrorCategory::Protocol => "protocol",
            ErrorCategory::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

impl TransferError {
    pub fn connection(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        TransferError::Connection {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn authentication(context: impl Into<String>) -> Self {
        TransferError::Authentication {
            context: context.into(),
            source: None,
        }
    }

    pub fn filesystem(context: impl Into<String>, source: std::io::Error) -> Self {
        TransferError::Filesystem {
            context: context.into(),
            source,
        }
    }

    pub fn protocol(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        TransferError::Protocol {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            TransferError::Connection { .. } => ErrorCategory::Connection,
            TransferError::Authentication { .. } => ErrorCategory::Authentication,
            TransferError::Filesystem { .. } => ErrorCategory::Filesystem,
            TransferError::Protocol { .. } => ErrorCategory::Protocol,
            TransferError::Aborted(_) => ErrorCategory::Aborted,
        }
    }

    // エラーとその原因をすべて連結した文字列
    // The error followed by every error in its source chain.
    pub fn chain(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str("\n  caused by: ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }
}

impl AppError {
    pub fn failures(&self) -> &[TaskFailure] {
        match self {
            AppError::TransferFailed { failures } => failures,
            _ => &[],
        }
    }
}

//! 统一错误类型定义.
//!
//! 所有 avmeta crate 共用的错误类型, 支持跨模块传播.

use thiserror::Error;

/// avmeta 统一错误类型
#[derive(Debug, Error)]
pub enum AvError {
    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// 不支持的码流特性 (如 profile 不在白名单内)
    #[error("不支持: {0}")]
    Unsupported(String),

    /// 无效数据 (损坏的码流等)
    #[error("无效数据: {0}")]
    InvalidData(String),

    /// 码流在字段中途被截断
    #[error("码流被截断, 读取越过缓冲区末尾")]
    Truncated,
}

/// avmeta 统一 Result 类型
pub type AvResult<T> = Result<T, AvError>;

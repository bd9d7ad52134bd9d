//! # avmeta-core
//!
//! avmeta 核心库, 提供统一错误类型与比特流读写基础设施.
//!
//! 压缩码流解析 (H.264 SPS 等) 所需的按位访问能力集中在本 crate,
//! 上层解析器只依赖这里导出的 `BitReader`/`BitWriter` 与错误类型.

pub mod bitreader;
pub mod bitwriter;
pub mod error;

// 重导出常用类型
pub use bitreader::BitReader;
pub use bitwriter::BitWriter;
pub use error::{AvError, AvResult};

//! # avmeta
//!
//! 纯 Rust 实现的 H.264 码流元数据解析库.
//!
//! avmeta 从 H.264 SPS (Sequence Parameter Set) NAL 单元中恢复视频分辨率,
//! 供 HLS/FLV/TS 等拉流链路在不完整解码的情况下获取画面几何信息:
//! - **NAL 层**: NAL 头部解析与 EBSP → RBSP 防竞争字节移除
//! - **SPS 解码**: Exp-Golomb 逐字段走读, 计算宽高 (像素)
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use avmeta::codec::parsers::h264::parse_sps;
//!
//! // SPS NAL 负载 (NAL 头部字节已由调用方剥离)
//! let payload: Vec<u8> = std::fs::read("sps.bin").unwrap();
//! let meta = parse_sps(&payload).unwrap();
//! println!("分辨率: {}x{}", meta.width, meta.height);
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `avmeta-core` | 错误类型与比特流读写基础设施 |
//! | `avmeta-codec` | H.264 NAL/SPS 解析器 |

/// 核心类型与比特流工具
pub use avmeta_core as core;

/// H.264 解析器
pub use avmeta_codec as codec;

/// 获取 avmeta 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! # avmeta-codec
//!
//! avmeta H.264 解析层, 提供 NAL 单元处理与 SPS 元数据解码.
//!
//! 输入是一段 SPS NAL 负载字节 (起始码与 NAL 头部已由上游拉流/解封装
//! 链路剥离), 输出是从中恢复的视频分辨率:
//!
//! ```rust
//! use avmeta_codec::parsers::h264::parse_sps;
//!
//! // Baseline profile, 176x144, 无 cropping
//! let payload = [0x42, 0x00, 0x1E, 0xF8, 0x58, 0x9C];
//! let meta = parse_sps(&payload).unwrap();
//! assert_eq!((meta.width, meta.height), (176, 144));
//! ```

pub mod parsers;

// 重导出常用类型
pub use parsers::h264::{NalUnit, NalUnitType, SpsMetadata, SpsParser, parse_sps};

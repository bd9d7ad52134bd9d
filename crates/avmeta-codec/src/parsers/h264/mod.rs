//! H.264/AVC 码流解析器.
//!
//! 提供从 SPS NAL 单元恢复视频分辨率所需的解析能力:
//! - NAL 头部解析与类型识别
//! - EBSP → RBSP 防竞争字节移除 (带合法性校验)
//! - SPS (Sequence Parameter Set) 逐字段解码与宽高计算

pub mod nal;
pub mod sps;

pub use nal::{NalUnit, NalUnitType, unescape_rbsp};
pub use sps::{SpsMetadata, SpsParser, parse_sps};

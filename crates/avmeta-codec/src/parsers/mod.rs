//! 码流解析器集合.
//!
//! 按编码标准组织, 目前提供 H.264/AVC 的 NAL/SPS 解析.

pub mod h264;

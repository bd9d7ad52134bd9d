//! H.264 SPS (Sequence Parameter Set) 元数据解码器.
//!
//! 从 SPS NAL 负载中恢复视频宽高 (像素). 只有参与几何计算的字段被保留,
//! 其余字段按固定语法顺序读取后丢弃, 仅用于推进位游标:
//! - profile / constraint / level 头部与 FRExt 扩展块 (含 scaling list)
//! - pic_order_cnt 三种类型的分支字段
//! - 尺寸字段 (宏块单位) 与 cropping 偏移
//!
//! VUI 参数本体不解析 (只读取 present 标志), 参考帧重排表等
//! 完整语义解码不在本层职责内.
//!
//! # Exp-Golomb 编码
//!
//! SPS 中大量使用 Exp-Golomb 可变长编码:
//! - `ue(v)`: 无符号 Exp-Golomb
//! - `se(v)`: 有符号 Exp-Golomb

use avmeta_core::bitreader::BitReader;
use avmeta_core::{AvError, AvResult};
use log::debug;

use super::nal::unescape_rbsp;

/// 从 SPS 中解码出的视频元数据
///
/// 宽高以亮度采样 (像素) 为单位, cropping 已按参考实现的公式折算.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpsMetadata {
    /// 图像宽度 (像素)
    pub width: u32,
    /// 图像高度 (像素)
    pub height: u32,
}

/// SPS 解析器
///
/// 持有一份 NAL 负载的私有拷贝 (NAL 头部字节已由调用方剥离),
/// [`decode`](Self::decode) 消耗 self, 一个实例只解码一次.
/// 实例间无共享状态, 并发场景下各任务独立构造即可.
pub struct SpsParser {
    /// NAL 负载 (EBSP), 去防竞争字节时原地压实
    buf: Vec<u8>,
}

impl SpsParser {
    /// 以 SPS NAL 负载构造解析器 (拷贝输入)
    pub fn new(payload: &[u8]) -> Self {
        Self {
            buf: payload.to_vec(),
        }
    }

    /// 解码 SPS, 返回视频元数据
    ///
    /// 流程: EBSP → RBSP 去防竞争字节 (原地), 再按语法顺序走读字段.
    /// 任何一步失败都不产生部分结果.
    pub fn decode(mut self) -> AvResult<SpsMetadata> {
        unescape_rbsp(&mut self.buf)?;

        let mut br = BitReader::new(&self.buf);
        let meta = decode_rbsp(&mut br)?;

        debug!(
            "H.264 SPS: {}x{}, 共读取 {} 位",
            meta.width,
            meta.height,
            br.bits_read()
        );
        Ok(meta)
    }
}

/// 从 SPS NAL 负载解析视频元数据 (便捷入口)
pub fn parse_sps(payload: &[u8]) -> AvResult<SpsMetadata> {
    SpsParser::new(payload).decode()
}

/// 按 SPS 语法顺序走读 RBSP, 计算宽高
fn decode_rbsp(br: &mut BitReader) -> AvResult<SpsMetadata> {
    // profile_idc (8 bits)
    let profile_idc = br.read_bits(8)? as u8;
    if !is_supported_profile(profile_idc) {
        return Err(AvError::Unsupported(format!(
            "H.264: profile_idc={} 不在支持列表内",
            profile_idc
        )));
    }

    // constraint_set0..5_flag + reserved_zero_2bits + level_idc
    br.skip_bits(16)?;
    // seq_parameter_set_id
    br.read_ue()?;

    // FRExt 系 profile 携带色度/位深扩展块
    if is_frext_profile(profile_idc) {
        let chroma_format_idc = br.read_ue()?;
        if chroma_format_idc == 3 {
            // residual_colour_transform_flag
            br.skip_bits(1)?;
        }
        // bit_depth_luma_minus8 / bit_depth_chroma_minus8
        br.read_ue()?;
        br.read_ue()?;
        // qpprime_y_zero_transform_bypass_flag
        br.skip_bits(1)?;

        // seq_scaling_matrix_present_flag
        if br.read_bit()? == 1 {
            for i in 0..8 {
                // seq_scaling_list_present_flag[i]
                if br.read_bit()? == 1 {
                    let size = if i < 6 { 16 } else { 64 };
                    skip_scaling_list(br, size)?;
                }
            }
        }
    }

    // log2_max_frame_num_minus4
    br.read_ue()?;

    // pic_order_cnt_type 决定后续分支
    let poc_type = br.read_ue()?;
    match poc_type {
        0 => {
            // log2_max_pic_order_cnt_lsb_minus4
            br.read_ue()?;
        }
        1 => {
            // delta_pic_order_always_zero_flag
            br.skip_bits(1)?;
            // offset_for_non_ref_pic / offset_for_top_to_bottom_field
            br.read_se()?;
            br.read_se()?;
            let num_ref_frames_in_cycle = br.read_ue()?;
            // offset_for_ref_frame 列表; 截断由读取器兜底
            for _ in 0..num_ref_frames_in_cycle {
                br.read_se()?;
            }
        }
        _ => {} // poc_type == 2: 无额外字段
    }

    // max_num_ref_frames
    br.read_ue()?;
    // gaps_in_frame_num_value_allowed_flag
    br.skip_bits(1)?;

    // 图像尺寸 (宏块单位), 参与最终计算
    let pic_width_in_mbs_minus1 = br.read_ue()?;
    let pic_height_in_map_units_minus1 = br.read_ue()?;

    let frame_mbs_only_flag = br.read_bit()?;
    if frame_mbs_only_flag == 0 {
        // mb_adaptive_frame_field_flag
        br.skip_bits(1)?;
    }

    // direct_8x8_inference_flag
    br.skip_bits(1)?;

    // Cropping 偏移, 未启用时全 0
    let mut crop_left = 0u32;
    let mut crop_right = 0u32;
    let mut crop_top = 0u32;
    let mut crop_bottom = 0u32;
    if br.read_bit()? == 1 {
        crop_left = br.read_ue()?;
        crop_right = br.read_ue()?;
        crop_top = br.read_ue()?;
        crop_bottom = br.read_ue()?;
    }

    // vui_parameters_present_flag (VUI 本体不解析)
    br.skip_bits(1)?;

    compute_geometry(
        pic_width_in_mbs_minus1,
        pic_height_in_map_units_minus1,
        frame_mbs_only_flag,
        [crop_left, crop_right, crop_top, crop_bottom],
    )
}

/// 计算最终像素宽高
///
/// 公式逐位复刻参考实现, 包括其 crop 偏移与轴向的对应关系
/// (bottom/top 折入宽度, left/right 折入高度). 与 H.264 标准公式相比
/// 轴向是转置的, 但下游以该行为做黄金输出校验, 不做"纠正".
fn compute_geometry(
    pic_width_in_mbs_minus1: u32,
    pic_height_in_map_units_minus1: u32,
    frame_mbs_only_flag: u32,
    [crop_left, crop_right, crop_top, crop_bottom]: [u32; 4],
) -> AvResult<SpsMetadata> {
    let overflow = || AvError::InvalidData("H.264: 尺寸计算溢出".into());

    let width = pic_width_in_mbs_minus1
        .checked_add(1)
        .and_then(|v| v.checked_mul(16))
        .and_then(|v| v.checked_sub(crop_bottom.checked_mul(2)?))
        .and_then(|v| v.checked_sub(crop_top.checked_mul(2)?))
        .ok_or_else(overflow)?;
    let height = (2 - frame_mbs_only_flag)
        .checked_mul(
            pic_height_in_map_units_minus1
                .checked_add(1)
                .and_then(|v| v.checked_mul(16))
                .ok_or_else(overflow)?,
        )
        .and_then(|v| v.checked_sub(crop_right.checked_mul(2)?))
        .and_then(|v| v.checked_sub(crop_left.checked_mul(2)?))
        .ok_or_else(overflow)?;

    Ok(SpsMetadata { width, height })
}

/// 走读一组 scaling list (值全部丢弃, 仅推进游标)
///
/// 标准的 lastScale/nextScale 递推: nextScale 为 0 后不再读 delta_scale.
fn skip_scaling_list(br: &mut BitReader, size: usize) -> AvResult<()> {
    let mut last_scale = 8i32;
    let mut next_scale = 8i32;
    for _ in 0..size {
        if next_scale != 0 {
            let delta_scale = br.read_se()?;
            next_scale = (last_scale + delta_scale + 256) % 256;
        }
        if next_scale != 0 {
            last_scale = next_scale;
        }
    }
    Ok(())
}

/// profile_idc 白名单
///
/// Baseline(66), Main(77), Extended(88), High(100), High10(110),
/// High422(122), High444(244), CAVLC444(44). 其余 (含 Multiview/Stereo
/// High 等) 视为不支持.
fn is_supported_profile(profile_idc: u8) -> bool {
    matches!(profile_idc, 66 | 77 | 88 | 100 | 110 | 122 | 244 | 44)
}

/// 是否为携带色度/位深扩展块的 FRExt 系 profile
fn is_frext_profile(profile_idc: u8) -> bool {
    matches!(profile_idc, 100 | 110 | 122 | 244 | 44)
}

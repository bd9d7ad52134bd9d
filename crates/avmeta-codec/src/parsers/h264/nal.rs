//! H.264 NAL (Network Abstraction Layer) 单元处理.
//!
//! # NAL 头部 (1 字节)
//! ```text
//! ┌─────────────────────────────────────┐
//! │ forbidden(1) | ref_idc(2) | type(5) │
//! └─────────────────────────────────────┘
//! ```
//!
//! # EBSP 与 RBSP
//!
//! 编码器在 RBSP 中每出现连续两个 0x00 后插入一个 0x03 防竞争字节,
//! 避免负载内容与起始码 (00 00 01) 混淆, 得到 EBSP.
//! 解析语法元素前必须移除这些 0x03, 还原 RBSP.

use avmeta_core::{AvError, AvResult};

/// NAL 单元类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum NalUnitType {
    /// 非 IDR 图像切片 (P/B slice)
    Slice,
    /// IDR 图像切片 (关键帧)
    SliceIdr,
    /// 增补增强信息 (SEI)
    Sei,
    /// 序列参数集 (SPS)
    Sps,
    /// 图像参数集 (PPS)
    Pps,
    /// 访问单元分隔符 (AUD)
    Aud,
    /// 未知类型
    Unknown(u8),
}

impl NalUnitType {
    /// 从 NAL 类型编号创建
    pub fn from_type_id(type_id: u8) -> Self {
        match type_id {
            1 => Self::Slice,
            5 => Self::SliceIdr,
            6 => Self::Sei,
            7 => Self::Sps,
            8 => Self::Pps,
            9 => Self::Aud,
            _ => Self::Unknown(type_id),
        }
    }

    /// 获取类型编号
    pub fn type_id(&self) -> u8 {
        match self {
            Self::Slice => 1,
            Self::SliceIdr => 5,
            Self::Sei => 6,
            Self::Sps => 7,
            Self::Pps => 8,
            Self::Aud => 9,
            Self::Unknown(id) => *id,
        }
    }

    /// 是否为序列参数集
    pub fn is_sps(&self) -> bool {
        matches!(self, Self::Sps)
    }
}

impl std::fmt::Display for NalUnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Slice => write!(f, "Slice"),
            Self::SliceIdr => write!(f, "IDR"),
            Self::Sei => write!(f, "SEI"),
            Self::Sps => write!(f, "SPS"),
            Self::Pps => write!(f, "PPS"),
            Self::Aud => write!(f, "AUD"),
            Self::Unknown(id) => write!(f, "Unknown({id})"),
        }
    }
}

/// 解析后的 NAL 单元
#[derive(Debug, Clone)]
pub struct NalUnit {
    /// NAL 单元类型
    pub nal_type: NalUnitType,
    /// nal_ref_idc (参考重要性, 0-3)
    pub ref_idc: u8,
    /// NAL 负载数据 (不含起始码与 NAL 头部字节, 仍为 EBSP)
    pub payload: Vec<u8>,
}

impl NalUnit {
    /// 从 NAL 数据 (含头部字节) 解析
    pub fn parse(data: &[u8]) -> AvResult<Self> {
        if data.is_empty() {
            return Err(AvError::InvalidData("H.264: NAL 单元数据为空".into()));
        }

        let header = data[0];
        let forbidden = (header >> 7) & 1;
        if forbidden != 0 {
            return Err(AvError::InvalidData(format!(
                "H.264: forbidden_zero_bit 非法, value={}",
                forbidden
            )));
        }
        let ref_idc = (header >> 5) & 0x03;
        let type_id = header & 0x1F;

        Ok(Self {
            nal_type: NalUnitType::from_type_id(type_id),
            ref_idc,
            payload: data[1..].to_vec(),
        })
    }
}

/// 移除 emulation prevention 字节 (EBSP → RBSP), 原地压实
///
/// 与 FFmpeg 的无条件移除不同, 这里对拉流输入做结构校验:
/// `00 00` 之后只允许出现 `03` (防竞争字节) 或 `> 03` 的原始内容,
/// 且被移除的 `03` 之后的字节不得大于 `0x03` (否则编码器不会插入它).
/// 违反任一条都说明码流已损坏, 返回错误而不是继续猜测.
///
/// 缓冲区被截断到压实后的长度.
pub fn unescape_rbsp(buf: &mut Vec<u8>) -> AvResult<()> {
    let len = buf.len();
    let mut zero_run = 0usize;
    let mut out = 0usize;
    let mut i = 0usize;

    while i < len {
        let b = buf[i];

        if zero_run == 2 {
            if b == 0x03 {
                if i + 1 == len {
                    // 末尾的防竞争字节, 在此截断
                    break;
                }
                if buf[i + 1] > 0x03 {
                    return Err(AvError::InvalidData(format!(
                        "H.264: 防竞争字节后出现非法字节 0x{:02X}",
                        buf[i + 1]
                    )));
                }
                // 删除 0x03, 继续扫描其后的负载字节
                zero_run = 0;
                i += 1;
                continue;
            }
            if b < 0x03 {
                return Err(AvError::InvalidData(format!(
                    "H.264: 非法的裸字节序列 00 00 {:02X}",
                    b
                )));
            }
        }

        buf[out] = b;
        out += 1;
        zero_run = if b == 0x00 { (zero_run + 1).min(2) } else { 0 };
        i += 1;
    }

    buf.truncate(out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nal_type_create() {
        assert_eq!(NalUnitType::from_type_id(7), NalUnitType::Sps);
        assert_eq!(NalUnitType::from_type_id(8), NalUnitType::Pps);
        assert_eq!(NalUnitType::from_type_id(5), NalUnitType::SliceIdr);
        assert_eq!(NalUnitType::from_type_id(1), NalUnitType::Slice);
        assert_eq!(NalUnitType::from_type_id(9), NalUnitType::Aud);
        assert_eq!(NalUnitType::from_type_id(31), NalUnitType::Unknown(31));
    }

    #[test]
    fn test_nal_type_type_id_round_trip() {
        for id in 0..=31 {
            let nt = NalUnitType::from_type_id(id);
            assert_eq!(nt.type_id(), id);
        }
    }

    #[test]
    fn test_nal_unit_parse() {
        // NAL header: forbidden=0, ref_idc=3, type=7 (SPS)
        // 0b0_11_00111 = 0x67
        let data = [0x67, 0x42, 0x00, 0x1E];
        let nalu = NalUnit::parse(&data).unwrap();
        assert_eq!(nalu.nal_type, NalUnitType::Sps);
        assert!(nalu.nal_type.is_sps());
        assert_eq!(nalu.ref_idc, 3);
        assert_eq!(nalu.payload, vec![0x42, 0x00, 0x1E]);
    }

    #[test]
    fn test_nal_unit_empty_data_error() {
        assert!(NalUnit::parse(&[]).is_err());
    }

    #[test]
    fn test_nal_unit_reject_forbidden_zero_bit_set() {
        let err = NalUnit::parse(&[0xE7]).expect_err("forbidden_zero_bit=1 应返回错误");
        let msg = format!("{err}");
        assert!(
            msg.contains("forbidden_zero_bit"),
            "错误信息应包含 forbidden_zero_bit, actual={}",
            msg
        );
    }

    #[test]
    fn test_unescape_passthrough_without_escape() {
        // 不含 00 00 03 的缓冲区原样保留
        let mut buf = vec![0x01, 0x02, 0x00, 0x04, 0x00, 0xFF, 0x03];
        unescape_rbsp(&mut buf).unwrap();
        assert_eq!(buf, vec![0x01, 0x02, 0x00, 0x04, 0x00, 0xFF, 0x03]);
    }

    #[test]
    fn test_unescape_removes_emulation_byte() {
        // 00 00 03 00 → 00 00 00
        let mut buf = vec![0x00, 0x00, 0x03, 0x00];
        unescape_rbsp(&mut buf).unwrap();
        assert_eq!(buf, vec![0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_unescape_mid_buffer() {
        let mut buf = vec![0x01, 0x00, 0x00, 0x03, 0x02, 0x03];
        unescape_rbsp(&mut buf).unwrap();
        assert_eq!(buf, vec![0x01, 0x00, 0x00, 0x02, 0x03]);
    }

    #[test]
    fn test_unescape_consecutive_escapes() {
        let mut buf = vec![0x00, 0x00, 0x03, 0x00, 0x00, 0x03, 0x01];
        unescape_rbsp(&mut buf).unwrap();
        assert_eq!(buf, vec![0x00, 0x00, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn test_unescape_escaped_0x03_payload() {
        // 00 00 03 03: 第一个 03 为防竞争字节, 第二个是负载
        let mut buf = vec![0x00, 0x00, 0x03, 0x03, 0x80];
        unescape_rbsp(&mut buf).unwrap();
        assert_eq!(buf, vec![0x00, 0x00, 0x03, 0x80]);
    }

    #[test]
    fn test_unescape_trailing_escape_truncated() {
        // 末尾的 00 00 03 在 03 处截断
        let mut buf = vec![0xAA, 0x00, 0x00, 0x03];
        unescape_rbsp(&mut buf).unwrap();
        assert_eq!(buf, vec![0xAA, 0x00, 0x00]);
    }

    #[test]
    fn test_unescape_reject_raw_start_code_bytes() {
        // 00 00 02 不可能出现在合法 EBSP 中
        for illegal in [0x00u8, 0x01, 0x02] {
            let mut buf = vec![0x7F, 0x00, 0x00, illegal, 0x55];
            let err = unescape_rbsp(&mut buf).expect_err("00 00 0x 序列应返回错误");
            assert!(matches!(err, AvError::InvalidData(_)), "illegal={}", illegal);
        }
    }

    #[test]
    fn test_unescape_reject_invalid_byte_after_escape() {
        // 防竞争字节之后只可能是 00/01/02/03
        let mut buf = vec![0x00, 0x00, 0x03, 0x04, 0x22];
        let err = unescape_rbsp(&mut buf).expect_err("03 后跟 >0x03 应返回错误");
        let msg = format!("{err}");
        assert!(
            msg.contains("防竞争字节"),
            "错误信息应包含防竞争字节, actual={}",
            msg
        );
    }

    #[test]
    fn test_unescape_zero_run_resets_after_removal() {
        // 移除 03 后计数清零: 00 00 03 00 00 03 后续仍正确处理
        let mut buf = vec![0x00, 0x00, 0x03, 0x00, 0x00, 0x03, 0x03, 0x01];
        unescape_rbsp(&mut buf).unwrap();
        assert_eq!(buf, vec![0x00, 0x00, 0x00, 0x00, 0x03, 0x01]);
    }
}

//! 端到端测试: 从完整 SPS NAL 单元到视频分辨率.
//!
//! 覆盖调用方视角的完整链路: NAL 头部解析 → 负载剥离 → SPS 解码.

use avmeta::codec::parsers::h264::{NalUnit, NalUnitType, parse_sps};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Baseline profile 176x144 的完整 SPS NAL 单元 (含 0x67 头部字节)
const SPS_NAL_QCIF: [u8; 7] = [0x67, 0x42, 0x00, 0x1E, 0xF8, 0x58, 0x9C];

#[test]
fn nal_to_geometry() {
    init_logger();

    let nalu = NalUnit::parse(&SPS_NAL_QCIF).unwrap();
    assert_eq!(nalu.nal_type, NalUnitType::Sps);

    let meta = parse_sps(&nalu.payload).unwrap();
    assert_eq!(meta.width, 176);
    assert_eq!(meta.height, 144);
}

#[test]
fn non_sps_nal_is_identified() {
    init_logger();

    // PPS (type=8): 该层只识别类型, 不会误解码
    let nalu = NalUnit::parse(&[0x68, 0xCE, 0x38, 0x80]).unwrap();
    assert_eq!(nalu.nal_type, NalUnitType::Pps);
    assert!(!nalu.nal_type.is_sps());
}

#[test]
fn corrupt_nal_does_not_affect_following_decodes() {
    init_logger();

    // 损坏的单元返回错误, 随后的解码不受影响 (实例间无共享状态)
    assert!(parse_sps(&[0x42, 0x00, 0x00, 0x01]).is_err());
    let meta = parse_sps(&SPS_NAL_QCIF[1..]).unwrap();
    assert_eq!((meta.width, meta.height), (176, 144));
}

#[test]
fn version_is_exposed() {
    assert!(!avmeta::version().is_empty());
}

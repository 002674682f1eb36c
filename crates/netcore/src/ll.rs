//! 链路层协议
//!
//! 链路层负责从原始帧中解析出网络层协议号。

use smoltcp::wire::EthernetFrame;

use crate::config::ETH_HLEN;
use crate::error::NetError;
use crate::pkbuff::PacketBuffer;
use crate::protocol::NetProto;

/// 链路层头解析结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkHeader {
    /// 载荷的网络层协议号
    pub net_proto: NetProto,
    /// 解析器实际消耗的头长度
    pub header_len: usize,
}

/// 链路层协议接口
pub trait LinkLayerProtocol {
    /// 协议名称
    fn name(&self) -> &str;

    /// 解析链路层头，不修改缓冲区
    fn parse_llh(&self, pkb: &PacketBuffer) -> Result<LinkHeader, NetError>;
}

/// 以太网链路层
#[derive(Debug, Default, Clone, Copy)]
pub struct EthernetProtocol;

impl LinkLayerProtocol for EthernetProtocol {
    fn name(&self) -> &str {
        "Ethernet"
    }

    fn parse_llh(&self, pkb: &PacketBuffer) -> Result<LinkHeader, NetError> {
        let frame = EthernetFrame::new_checked(pkb.data()).map_err(|_| NetError::InvalidFrame)?;
        Ok(LinkHeader {
            net_proto: NetProto::new(u16::from(frame.ethertype())),
            header_len: ETH_HLEN,
        })
    }
}

#[cfg(test)]
mod tests {
    extern crate test_support;

    use super::*;
    use crate::protocol::{ETH_P_ARP, ETH_P_IP};
    use test_support::mock::net::MockPkbOps;

    static OPS: MockPkbOps = MockPkbOps::new();

    fn frame(ethertype: [u8; 2], payload: &[u8]) -> PacketBuffer {
        let mut bytes = alloc::vec![0xff; 6];
        bytes.extend_from_slice(&[0x52, 0x54, 0x00, 0x12, 0x34, 0x56]);
        bytes.extend_from_slice(&ethertype);
        bytes.extend_from_slice(payload);
        PacketBuffer::from_bytes_with(&OPS, &bytes).unwrap()
    }

    #[test]
    fn test_parse_ipv4_frame() {
        let pkb = frame([0x08, 0x00], &[0x45, 0x00]);
        let llhdr = EthernetProtocol.parse_llh(&pkb).unwrap();
        assert_eq!(llhdr.net_proto, ETH_P_IP);
        assert_eq!(llhdr.header_len, ETH_HLEN);
        // 解析不消耗缓冲区
        assert_eq!(pkb.len(), ETH_HLEN + 2);
    }

    #[test]
    fn test_parse_arp_frame() {
        let pkb = frame([0x08, 0x06], &[]);
        assert_eq!(EthernetProtocol.parse_llh(&pkb).unwrap().net_proto, ETH_P_ARP);
    }

    #[test]
    fn test_parse_short_frame() {
        let pkb = PacketBuffer::from_bytes_with(&OPS, &[0u8; ETH_HLEN - 1]).unwrap();
        assert_eq!(EthernetProtocol.parse_llh(&pkb), Err(NetError::InvalidFrame));
    }
}

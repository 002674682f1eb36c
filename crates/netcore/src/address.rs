//! 网络层地址注册表
//!
//! 记录唯一网络设备拥有的 (协议, 地址) 对，用于由地址反查设备。
//! 一个设备可以拥有多个协议的多个地址。

use alloc::{rc::Rc, vec::Vec};

use crate::error::NetError;
use crate::protocol::NetProtocol;

/// 网络层地址
#[derive(Debug)]
pub struct NetAddress {
    protocol: Rc<NetProtocol>,
    addr: Vec<u8>,
}

impl NetAddress {
    /// 创建地址，长度必须等于协议的地址长度
    pub fn new(protocol: &Rc<NetProtocol>, addr: &[u8]) -> Result<Self, NetError> {
        if addr.len() != protocol.net_addr_len() {
            return Err(NetError::InvalidAddress);
        }
        Ok(Self {
            protocol: protocol.clone(),
            addr: Vec::from(addr),
        })
    }

    /// 所属协议
    pub fn protocol(&self) -> &Rc<NetProtocol> {
        &self.protocol
    }

    /// 原始地址字节
    pub fn addr(&self) -> &[u8] {
        &self.addr
    }

    /// 协议相同且前 `net_addr_len` 字节完全一致
    fn matches(&self, protocol: &Rc<NetProtocol>, addr: &[u8]) -> bool {
        let len = protocol.net_addr_len();
        Rc::ptr_eq(&self.protocol, protocol) && addr.len() >= len && self.addr[..] == addr[..len]
    }
}

/// 唯一网络设备的地址表
#[derive(Debug, Default)]
pub struct AddressTable {
    addresses: Vec<NetAddress>,
}

impl AddressTable {
    pub(crate) fn push(&mut self, address: NetAddress) {
        self.addresses.push(address);
    }

    /// 表中是否存在匹配的地址
    pub fn contains(&self, protocol: &Rc<NetProtocol>, addr: &[u8]) -> bool {
        self.addresses.iter().any(|a| a.matches(protocol, addr))
    }

    /// 地址数量
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// 遍历地址
    pub fn iter(&self) -> impl Iterator<Item = &NetAddress> {
        self.addresses.iter()
    }
}

#[cfg(test)]
mod tests {
    extern crate test_support;

    use super::*;
    use crate::protocol::{ETH_P_ARP, ETH_P_IP};
    use test_support::mock::net::MockRxHandler;

    fn ipv4() -> Rc<NetProtocol> {
        Rc::new(NetProtocol::new("IP", ETH_P_IP, 4, Rc::new(MockRxHandler::new())))
    }

    #[test]
    fn test_new_rejects_wrong_length() {
        let ip = ipv4();
        assert_eq!(
            NetAddress::new(&ip, &[10, 0, 0]).unwrap_err(),
            NetError::InvalidAddress
        );
        assert!(NetAddress::new(&ip, &[10, 0, 0, 1]).is_ok());
    }

    #[test]
    fn test_contains_exact_match() {
        let ip = ipv4();
        let mut table = AddressTable::default();
        table.push(NetAddress::new(&ip, &[10, 254, 254, 1]).unwrap());

        assert!(table.contains(&ip, &[10, 254, 254, 1]));
        assert!(!table.contains(&ip, &[10, 254, 254, 2]));
        assert!(!table.contains(&ip, &[10, 254, 254]));
    }

    #[test]
    fn test_contains_requires_same_protocol() {
        let ip = ipv4();
        // 地址长度相同但不是同一个协议
        let other = Rc::new(NetProtocol::new("ARP", ETH_P_ARP, 4, Rc::new(MockRxHandler::new())));
        let mut table = AddressTable::default();
        table.push(NetAddress::new(&ip, &[10, 254, 254, 1]).unwrap());

        assert!(!table.contains(&other, &[10, 254, 254, 1]));
    }

    #[test]
    fn test_multiple_addresses() {
        let ip = ipv4();
        let mut table = AddressTable::default();
        table.push(NetAddress::new(&ip, &[10, 0, 0, 1]).unwrap());
        table.push(NetAddress::new(&ip, &[192, 168, 0, 1]).unwrap());

        assert_eq!(table.len(), 2);
        assert!(table.contains(&ip, &[192, 168, 0, 1]));
        assert!(table.contains(&ip, &[10, 0, 0, 1]));
    }
}

//! 网络层协议注册表
//!
//! 协议表在初始化阶段通过 [`NetStackBuilder`](crate::NetStackBuilder) 追加构建，
//! 之后只读。查找为线性扫描，表很小且固定。

use alloc::{rc::Rc, string::String, vec::Vec};
use core::fmt;

use crate::error::NetError;
use crate::pkbuff::PacketBuffer;

/// 网络层协议号，按网络字节序保存
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetProto([u8; 2]);

impl NetProto {
    /// 由主机序数值构造
    pub const fn new(proto: u16) -> Self {
        Self(proto.to_be_bytes())
    }

    /// 由线上的两个字节构造
    pub const fn from_wire(bytes: [u8; 2]) -> Self {
        Self(bytes)
    }

    /// 主机序数值
    pub const fn get(self) -> u16 {
        u16::from_be_bytes(self.0)
    }

    /// 线上字节
    pub const fn to_wire(self) -> [u8; 2] {
        self.0
    }
}

impl fmt::Debug for NetProto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NetProto({:#06x})", self.get())
    }
}

/// IPv4
pub const ETH_P_IP: NetProto = NetProto::new(0x0800);
/// ARP
pub const ETH_P_ARP: NetProto = NetProto::new(0x0806);

/// 网络层收包处理
pub trait NetRxHandler {
    /// 处理一个已剥离链路层头的数据包
    ///
    /// 获得缓冲区所有权；返回错误后调用方不会重试，也不会再次释放缓冲区。
    fn rx_process(&self, pkb: PacketBuffer) -> Result<(), NetError>;
}

/// 网络层协议描述
pub struct NetProtocol {
    name: String,
    net_proto: NetProto,
    net_addr_len: usize,
    handler: Rc<dyn NetRxHandler>,
}

impl NetProtocol {
    /// 创建协议描述
    pub fn new(
        name: &str,
        net_proto: NetProto,
        net_addr_len: usize,
        handler: Rc<dyn NetRxHandler>,
    ) -> Self {
        Self {
            name: String::from(name),
            net_proto,
            net_addr_len,
            handler,
        }
    }

    /// 协议名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 协议号
    pub fn net_proto(&self) -> NetProto {
        self.net_proto
    }

    /// 网络层地址长度
    pub fn net_addr_len(&self) -> usize {
        self.net_addr_len
    }

    /// 将数据包交给该协议处理
    pub fn rx_process(&self, pkb: PacketBuffer) -> Result<(), NetError> {
        self.handler.rx_process(pkb)
    }
}

impl fmt::Debug for NetProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetProtocol")
            .field("name", &self.name)
            .field("net_proto", &self.net_proto)
            .field("net_addr_len", &self.net_addr_len)
            .finish()
    }
}

/// 已注册的网络层协议表
#[derive(Debug, Default)]
pub struct ProtocolTable {
    protocols: Vec<Rc<NetProtocol>>,
}

impl ProtocolTable {
    pub(crate) fn push(&mut self, protocol: Rc<NetProtocol>) {
        self.protocols.push(protocol);
    }

    /// 按协议号查找协议
    ///
    /// 比较网络字节序的协议号，不分配、不修改。
    pub fn find(&self, net_proto: NetProto) -> Option<&Rc<NetProtocol>> {
        self.protocols.iter().find(|p| p.net_proto == net_proto)
    }

    /// 已注册协议数量
    pub fn len(&self) -> usize {
        self.protocols.len()
    }

    /// 是否没有注册任何协议
    pub fn is_empty(&self) -> bool {
        self.protocols.is_empty()
    }

    /// 遍历已注册协议
    pub fn iter(&self) -> impl Iterator<Item = &Rc<NetProtocol>> {
        self.protocols.iter()
    }
}

//! 网络核心：设备注册、协议分发与轮询
//!
//! 控制流：驱动轮询 -> [`RxQueue::netdev_rx`] 入队 -> [`NetStack::net_step`] 取出一个
//! -> [`NetStack::net_rx_process`] 解析链路层头并查找协议 -> 所有权移交协议处理。

use alloc::rc::Rc;

use crate::address::{AddressTable, NetAddress};
use crate::config::{LL_STRIP_LEN, NetStackConfig};
use crate::device::{AddrConfigOps, NetDevice, NetDeviceSlot};
use crate::error::NetError;
use crate::pkbuff::{PacketBuffer, free_pkb};
use crate::protocol::{NetProto, NetProtocol, ProtocolTable};
use crate::rx_queue::RxQueue;

/// 网络核心构建器
///
/// 协议与地址只能在这里追加；[`NetStackBuilder::build`] 之后注册表只读。
#[derive(Default)]
pub struct NetStackBuilder {
    config: NetStackConfig,
    protocols: ProtocolTable,
    addresses: AddressTable,
}

impl NetStackBuilder {
    /// 使用默认配置创建构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用指定配置创建构建器
    pub fn with_config(config: NetStackConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// 注册网络层协议，返回的句柄用于注册地址
    pub fn register_protocol(&mut self, protocol: NetProtocol) -> Rc<NetProtocol> {
        let protocol = Rc::new(protocol);
        self.protocols.push(protocol.clone());
        protocol
    }

    /// 为唯一网络设备注册网络层地址
    pub fn register_address(
        &mut self,
        protocol: &Rc<NetProtocol>,
        addr: &[u8],
    ) -> Result<&mut Self, NetError> {
        self.addresses.push(NetAddress::new(protocol, addr)?);
        Ok(self)
    }

    /// 冻结注册表，生成网络核心
    pub fn build(self, addr_ops: Rc<dyn AddrConfigOps>) -> NetStack {
        NetStack {
            rx_queue: RxQueue::new(self.config.rx_queue_high_water),
            config: self.config,
            protocols: self.protocols,
            addresses: self.addresses,
            netdevs: NetDeviceSlot::new(),
            addr_ops,
        }
    }
}

/// 网络核心
///
/// 单线程、不可重入：`net_poll` 与 `net_step` 不能嵌套调用，
/// 收包队列只在轮询/调度路径上访问。
pub struct NetStack {
    config: NetStackConfig,
    protocols: ProtocolTable,
    addresses: AddressTable,
    netdevs: NetDeviceSlot,
    rx_queue: RxQueue,
    addr_ops: Rc<dyn AddrConfigOps>,
}

impl NetStack {
    /// 配置
    pub fn config(&self) -> &NetStackConfig {
        &self.config
    }

    /// 注册网络设备
    ///
    /// 同时应用配置中的静态 IPv4 地址。调用方必须检查返回值。
    pub fn register_netdev(&self, netdev: Rc<NetDevice>) -> Result<(), NetError> {
        self.netdevs.register(netdev, &self.config.static_ipv4, &*self.addr_ops)
    }

    /// 注销网络设备
    pub fn unregister_netdev(&self, netdev: &Rc<NetDevice>) {
        self.netdevs.unregister(netdev, &*self.addr_ops);
    }

    /// 当前已注册的设备
    pub fn netdev(&self) -> Option<Rc<NetDevice>> {
        self.netdevs.get()
    }

    /// 协议表
    pub fn protocols(&self) -> &ProtocolTable {
        &self.protocols
    }

    /// 地址表
    pub fn addresses(&self) -> &AddressTable {
        &self.addresses
    }

    /// 收包队列
    pub fn rx_queue(&self) -> &RxQueue {
        &self.rx_queue
    }

    /// 按网络字节序协议号查找网络层协议
    pub fn find_net_protocol(&self, net_proto: NetProto) -> Option<&Rc<NetProtocol>> {
        self.protocols.find(net_proto)
    }

    /// 按网络层地址查找网络设备
    ///
    /// 即使只有一个设备，也可能返回 `None`：地址不匹配，或设备未注册。
    pub fn find_netdev_by_net_addr(
        &self,
        protocol: &Rc<NetProtocol>,
        addr: &[u8],
    ) -> Option<Rc<NetDevice>> {
        if !self.addresses.contains(protocol, addr) {
            return None;
        }
        self.netdevs.get()
    }

    /// 轮询网络设备
    ///
    /// 收到的数据包经 [`RxQueue::netdev_rx`] 入队。返回队列中是否有数据包。
    pub fn net_poll(&self) -> bool {
        if let Some(netdev) = self.netdevs.get() {
            log::trace!("netdev: polling {}", netdev.name());
            netdev.poll(&self.rx_queue);
        }
        !self.rx_queue.is_empty()
    }

    /// 取出队首数据包，所有权转移给调用方
    pub fn net_rx_dequeue(&self) -> Option<PacketBuffer> {
        self.rx_queue.dequeue()
    }

    /// 处理一个收到的数据包，获得缓冲区所有权
    ///
    /// 未知协议或无效帧时释放缓冲区；否则所有权移交协议处理，
    /// 处理失败时既不重试也不再次释放。
    pub fn net_rx_process(&self, mut pkb: PacketBuffer) -> Result<(), NetError> {
        let Some(ll_protocol) = pkb.ll_protocol().cloned() else {
            log::warn!("netdev: packet without link-layer protocol dropped");
            free_pkb(pkb);
            return Err(NetError::InvalidFrame);
        };

        let llhdr = match ll_protocol.parse_llh(&pkb) {
            Ok(llhdr) => llhdr,
            Err(e) => {
                log::warn!("netdev: bad {} header: {}", ll_protocol.name(), e);
                free_pkb(pkb);
                return Err(e);
            }
        };

        let Some(net_protocol) = self.protocols.find(llhdr.net_proto).cloned() else {
            log::warn!(
                "netdev: unknown network-layer protocol {:#06x}",
                llhdr.net_proto.get()
            );
            free_pkb(pkb);
            return Err(NetError::UnsupportedProtocol);
        };
        pkb.set_net_protocol(net_protocol.clone());

        // 剥离固定长度，而不是 llhdr.header_len
        if llhdr.header_len != LL_STRIP_LEN {
            log::warn!(
                "netdev: {} header is {} bytes but {} bytes are stripped",
                ll_protocol.name(),
                llhdr.header_len,
                LL_STRIP_LEN
            );
        }
        let stripped = pkb.pull(LL_STRIP_LEN).map(|_| ());
        if let Err(e) = stripped {
            free_pkb(pkb);
            return Err(e);
        }

        net_protocol.rx_process(pkb).map_err(|e| {
            log::debug!("netdev: {} dropped packet: {}", net_protocol.name(), e);
            NetError::HandlerFailure
        })
    }

    /// 单步运行网络核心
    ///
    /// 轮询设备，然后最多处理一个收到的数据包。处理一个数据包可能同步触发新的发送
    /// （例如 ARP 应答），而发送完成只在轮询时回收；每次轮询处理多个数据包
    /// 很容易让较小的硬件发送环溢出。
    ///
    /// 返回本次处理结果，队列为空时返回 `None`。
    pub fn net_step(&self) -> Option<Result<(), NetError>> {
        self.net_poll();

        let pkb = self.net_rx_dequeue()?;
        let result = self.net_rx_process(pkb);
        log::debug!("netdev: processed received packet");
        Some(result)
    }

    /// 通过已注册设备发送数据包，获得缓冲区所有权
    pub fn netdev_transmit(&self, pkb: PacketBuffer) -> Result<(), NetError> {
        match self.netdevs.get() {
            Some(netdev) => netdev.transmit(pkb),
            None => {
                free_pkb(pkb);
                Err(NetError::NoDevice)
            }
        }
    }
}

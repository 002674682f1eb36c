//! 网络设备
//!
//! 设计上同一时刻只有一个活动的网络设备。[`NetDeviceSlot`] 显式持有该设备，
//! 并注入到分发器和调度单元中，而不是作为文件级全局状态。

use alloc::{rc::Rc, string::String};
use core::cell::RefCell;
use core::fmt;

use crate::config::Ipv4Config;
use crate::error::NetError;
use crate::ll::LinkLayerProtocol;
use crate::pkbuff::PacketBuffer;
use crate::rx_queue::RxQueue;

/// 网络设备驱动接口
pub trait NetDriver {
    /// 轮询设备
    ///
    /// 可以对收到的每个数据包调用 [`RxQueue::netdev_rx`]（零次或多次），
    /// 并回收已完成的发送。
    fn poll(&self, netdev: &NetDevice, rx: &RxQueue);

    /// 发送数据包，获得缓冲区所有权
    fn transmit(&self, netdev: &NetDevice, pkb: PacketBuffer) -> Result<(), NetError>;
}

/// 地址配置接口
pub trait AddrConfigOps {
    /// 为设备添加 IPv4 地址
    fn add_ipv4_address(&self, netdev: &NetDevice, cfg: &Ipv4Config) -> Result<(), NetError>;

    /// 删除设备的 IPv4 地址，尽力而为
    fn del_ipv4_address(&self, netdev: &NetDevice);
}

/// 网络设备
pub struct NetDevice {
    name: String,
    ll_protocol: Rc<dyn LinkLayerProtocol>,
    driver: Rc<dyn NetDriver>,
}

impl NetDevice {
    /// 创建网络设备
    pub fn new(name: &str, ll_protocol: Rc<dyn LinkLayerProtocol>, driver: Rc<dyn NetDriver>) -> Self {
        Self {
            name: String::from(name),
            ll_protocol,
            driver,
        }
    }

    /// 设备名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 设备当前使用的链路层协议
    pub fn ll_protocol(&self) -> &Rc<dyn LinkLayerProtocol> {
        &self.ll_protocol
    }

    /// 轮询驱动
    pub fn poll(&self, rx: &RxQueue) {
        self.driver.poll(self, rx);
    }

    /// 通过驱动发送
    pub fn transmit(&self, pkb: PacketBuffer) -> Result<(), NetError> {
        self.driver.transmit(self, pkb)
    }
}

impl fmt::Debug for NetDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetDevice")
            .field("name", &self.name)
            .field("ll_protocol", &self.ll_protocol.name())
            .finish()
    }
}

/// 已注册网络设备的槽位，最多持有一个设备
#[derive(Debug, Default)]
pub struct NetDeviceSlot {
    current: RefCell<Option<Rc<NetDevice>>>,
}

impl NetDeviceSlot {
    /// 创建空槽位
    pub const fn new() -> Self {
        Self {
            current: RefCell::new(None),
        }
    }

    /// 注册网络设备并配置地址
    ///
    /// 已有设备注册时返回 [`NetError::AlreadyRegistered`]；
    /// 地址配置失败时返回 [`NetError::ConfigurationError`]，设备不视为已注册。
    pub fn register(
        &self,
        netdev: Rc<NetDevice>,
        cfg: &Ipv4Config,
        ops: &dyn AddrConfigOps,
    ) -> Result<(), NetError> {
        if let Some(current) = self.current.borrow().as_ref() {
            log::warn!(
                "netdev: cannot register {}, {} is already registered",
                netdev.name(),
                current.name()
            );
            return Err(NetError::AlreadyRegistered);
        }

        if let Err(e) = ops.add_ipv4_address(&netdev, cfg) {
            log::warn!("netdev: address configuration of {} failed: {}", netdev.name(), e);
            return Err(NetError::ConfigurationError);
        }

        log::info!(
            "netdev: registered {} ({} / {})",
            netdev.name(),
            cfg.address,
            cfg.netmask
        );
        *self.current.borrow_mut() = Some(netdev);
        Ok(())
    }

    /// 注销网络设备，删除其地址配置
    ///
    /// 设备未注册时不做任何事。
    pub fn unregister(&self, netdev: &Rc<NetDevice>, ops: &dyn AddrConfigOps) {
        if !self.is_registered(netdev) {
            return;
        }
        ops.del_ipv4_address(netdev);
        *self.current.borrow_mut() = None;
        log::info!("netdev: unregistered {}", netdev.name());
    }

    /// 当前已注册的设备
    pub fn get(&self) -> Option<Rc<NetDevice>> {
        self.current.borrow().clone()
    }

    /// 指定设备是否为当前已注册的设备
    pub fn is_registered(&self, netdev: &Rc<NetDevice>) -> bool {
        self.current
            .borrow()
            .as_ref()
            .is_some_and(|current| Rc::ptr_eq(current, netdev))
    }
}

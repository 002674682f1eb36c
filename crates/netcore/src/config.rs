//! 网络核心配置
//!
//! 固定常量与可调配置项。

use core::net::Ipv4Addr;

/// 以太网帧头长度
pub const ETH_HLEN: usize = 14;

/// 分发时从缓冲区头部剥离的链路层头长度
///
/// NOTE: 这是固定值，而不是 `parse_llh` 报告的 `header_len`。
/// 只有当所有已支持的链路层帧头都等长时才正确，长度不一致时分发器只记录告警。
pub const LL_STRIP_LEN: usize = ETH_HLEN;

/// 收包队列默认告警水位
pub const DEFAULT_RX_QUEUE_HIGH_WATER: usize = 64;

/// IPv4 地址配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Config {
    /// 本地地址
    pub address: Ipv4Addr,
    /// 子网掩码
    pub netmask: Ipv4Addr,
    /// 默认网关，`None` 表示 INADDR_NONE
    pub gateway: Option<Ipv4Addr>,
}

impl Ipv4Config {
    /// 创建新的 IPv4 配置
    pub const fn new(address: Ipv4Addr, netmask: Ipv4Addr, gateway: Option<Ipv4Addr>) -> Self {
        Self {
            address,
            netmask,
            gateway,
        }
    }
}

impl Default for Ipv4Config {
    /// 占位用的静态地址：10.254.254.1/24，无网关
    ///
    /// 并非真正的 DHCP 或配置机制。
    fn default() -> Self {
        Self::new(
            Ipv4Addr::new(10, 254, 254, 1),
            Ipv4Addr::new(255, 255, 255, 0),
            None,
        )
    }
}

/// 网络核心配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetStackConfig {
    /// 注册设备时应用的静态 IPv4 配置
    pub static_ipv4: Ipv4Config,
    /// 收包队列长度超过该值时告警
    ///
    /// 仅用于诊断，队列本身不设上限。
    pub rx_queue_high_water: usize,
}

impl Default for NetStackConfig {
    fn default() -> Self {
        Self {
            static_ipv4: Ipv4Config::default(),
            rx_queue_high_water: DEFAULT_RX_QUEUE_HIGH_WATER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_static_address() {
        let cfg = NetStackConfig::default();
        assert_eq!(u32::from(cfg.static_ipv4.address), 0x0afe_fe01);
        assert_eq!(u32::from(cfg.static_ipv4.netmask), 0xffff_ff00);
        assert_eq!(cfg.static_ipv4.gateway, None);
        assert_eq!(cfg.rx_queue_high_water, DEFAULT_RX_QUEUE_HIGH_WATER);
    }
}

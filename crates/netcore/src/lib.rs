//! 单设备网络核心
//!
//! 此 crate 提供启动期固件使用的最小网络栈核心：
//!
//! - [`NetDevice`] - 唯一活动的网络设备及其驱动能力
//! - [`ProtocolTable`] / [`AddressTable`] - 初始化阶段构建、之后只读的注册表
//! - [`RxQueue`] - 收包 FIFO 队列，解耦驱动收包与协议处理
//! - [`NetStack`] - 分发器：解析链路层头、查找网络层协议并移交缓冲区
//! - [`NetProcess`] - 协作式调度单元，每个 tick 最多处理一个数据包
//!
//! # 架构解耦
//!
//! 驱动、地址配置、网络层协议处理以及缓冲区分配均为外部协作者，
//! 通过 trait 注入：
//! - [`NetDriver`]: 轮询与发送
//! - [`AddrConfigOps`]: 地址配置
//! - [`NetRxHandler`]: 网络层收包处理
//! - [`PkbOps`]: 数据包缓冲区分配，使用前需调用 [`register_pkb_ops`] 注册
//!
//! # 并发模型
//!
//! 整个核心运行在单线程、不可重入的协作式调度之下，
//! 共享状态使用 `Rc` + `RefCell`，不需要任何锁。

#![no_std]

extern crate alloc;

pub mod address;
pub mod config;
pub mod device;
pub mod error;
pub mod ll;
pub mod ops;
pub mod pkbuff;
pub mod process;
pub mod protocol;
pub mod rx_queue;
pub mod stack;

// Re-export ops
pub use ops::{PkbOps, pkb_ops, register_pkb_ops};

// Re-export 主要接口
pub use address::{AddressTable, NetAddress};
pub use config::{ETH_HLEN, Ipv4Config, LL_STRIP_LEN, NetStackConfig};
pub use device::{AddrConfigOps, NetDevice, NetDeviceSlot, NetDriver};
pub use error::NetError;
pub use ll::{EthernetProtocol, LinkHeader, LinkLayerProtocol};
pub use pkbuff::{PacketBuffer, alloc_pkb, free_pkb};
pub use process::{NetProcess, Process, RunQueue, Scheduler, init_net};
pub use protocol::{ETH_P_ARP, ETH_P_IP, NetProto, NetProtocol, NetRxHandler, ProtocolTable};
pub use rx_queue::RxQueue;
pub use stack::{NetStack, NetStackBuilder};

//! 数据包缓冲区
//!
//! [`PacketBuffer`] 是唯一所有权的句柄：驱动 -> 收包队列 -> 分发器 -> 协议处理，
//! 每次移交都是一次 move。释放（[`free_pkb`] 或 drop）与移交互斥，
//! 数据区在任何路径上都恰好归还分配器一次。

use alloc::{rc::Rc, vec::Vec};
use core::fmt;

use crate::error::NetError;
use crate::ll::LinkLayerProtocol;
use crate::ops::{PkbOps, pkb_ops};
use crate::protocol::NetProtocol;

/// 数据包缓冲区
pub struct PacketBuffer {
    data: Vec<u8>,
    /// 当前有效数据的起始偏移，`pull` 时前移
    head: usize,
    ops: &'static dyn PkbOps,
    ll_protocol: Option<Rc<dyn LinkLayerProtocol>>,
    net_protocol: Option<Rc<NetProtocol>>,
}

impl PacketBuffer {
    /// 从指定分配器分配 `len` 字节的缓冲区
    pub fn alloc_with(ops: &'static dyn PkbOps, len: usize) -> Option<Self> {
        let data = ops.alloc_data(len)?;
        Some(Self {
            data,
            head: 0,
            ops,
            ll_protocol: None,
            net_protocol: None,
        })
    }

    /// 从指定分配器分配缓冲区并拷入 `bytes`
    pub fn from_bytes_with(ops: &'static dyn PkbOps, bytes: &[u8]) -> Option<Self> {
        let mut pkb = Self::alloc_with(ops, bytes.len())?;
        pkb.data.clear();
        pkb.data.extend_from_slice(bytes);
        Some(pkb)
    }

    /// 当前有效数据
    pub fn data(&self) -> &[u8] {
        &self.data[self.head..]
    }

    /// 当前有效数据（可写）
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data[self.head..]
    }

    /// 有效数据长度
    pub fn len(&self) -> usize {
        self.data.len() - self.head
    }

    /// 是否没有有效数据
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 从头部剥离 `len` 字节并返回被剥离的部分
    ///
    /// 有效数据不足 `len` 字节时返回 [`NetError::InvalidFrame`]，缓冲区不变。
    pub fn pull(&mut self, len: usize) -> Result<&[u8], NetError> {
        if len > self.len() {
            return Err(NetError::InvalidFrame);
        }
        let start = self.head;
        self.head += len;
        Ok(&self.data[start..self.head])
    }

    /// 收包时标记的链路层协议
    pub fn ll_protocol(&self) -> Option<&Rc<dyn LinkLayerProtocol>> {
        self.ll_protocol.as_ref()
    }

    /// 分发时解析出的网络层协议
    pub fn net_protocol(&self) -> Option<&Rc<NetProtocol>> {
        self.net_protocol.as_ref()
    }

    pub(crate) fn set_ll_protocol(&mut self, ll_protocol: Rc<dyn LinkLayerProtocol>) {
        self.ll_protocol = Some(ll_protocol);
    }

    pub(crate) fn set_net_protocol(&mut self, net_protocol: Rc<NetProtocol>) {
        self.net_protocol = Some(net_protocol);
    }
}

impl Drop for PacketBuffer {
    fn drop(&mut self) {
        self.ops.free_data(core::mem::take(&mut self.data));
    }
}

impl fmt::Debug for PacketBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketBuffer")
            .field("len", &self.len())
            .field("head", &self.head)
            .field("ll_protocol", &self.ll_protocol.as_ref().map(|ll| ll.name()))
            .field("net_protocol", &self.net_protocol.as_ref().map(|p| p.name()))
            .finish()
    }
}

/// 从全局分配器分配 `len` 字节的缓冲区
pub fn alloc_pkb(len: usize) -> Option<PacketBuffer> {
    PacketBuffer::alloc_with(pkb_ops(), len)
}

/// 释放缓冲区，所有权在此结束
pub fn free_pkb(pkb: PacketBuffer) {
    drop(pkb);
}

#[cfg(test)]
mod tests {
    extern crate test_support;

    use super::*;
    use crate::error::NetError;
    use test_support::mock::net::MockPkbOps;

    #[test]
    fn test_pull_strips_header() {
        static OPS: MockPkbOps = MockPkbOps::new();
        let mut pkb = PacketBuffer::from_bytes_with(&OPS, &[1, 2, 3, 4, 5]).unwrap();

        assert_eq!(pkb.pull(2).unwrap(), &[1, 2]);
        assert_eq!(pkb.data(), &[3, 4, 5]);
        assert_eq!(pkb.len(), 3);
    }

    #[test]
    fn test_pull_too_long_leaves_buffer_untouched() {
        static OPS: MockPkbOps = MockPkbOps::new();
        let mut pkb = PacketBuffer::from_bytes_with(&OPS, &[1, 2, 3]).unwrap();

        assert_eq!(pkb.pull(4), Err(NetError::InvalidFrame));
        assert_eq!(pkb.data(), &[1, 2, 3]);
        assert_eq!(pkb.pull(3).unwrap().len(), 3);
        assert!(pkb.is_empty());
    }

    #[test]
    fn test_free_returns_data_once() {
        static OPS: MockPkbOps = MockPkbOps::new();
        let pkb = PacketBuffer::alloc_with(&OPS, 64).unwrap();
        assert_eq!(OPS.outstanding(), 1);

        free_pkb(pkb);
        assert_eq!(OPS.allocated(), 1);
        assert_eq!(OPS.freed(), 1);
    }

    #[test]
    fn test_alloc_failure() {
        static OPS: MockPkbOps = MockPkbOps::new();
        OPS.set_exhausted(true);
        assert!(PacketBuffer::alloc_with(&OPS, 64).is_none());
        assert_eq!(OPS.allocated(), 0);
    }

    #[test]
    fn test_alloc_pkb_uses_global_ops() {
        let mut pkb = alloc_pkb(16).unwrap();
        pkb.data_mut()[0] = 0xab;
        assert_eq!(pkb.data()[0], 0xab);
        assert!(pkb.ll_protocol().is_none());
        assert!(pkb.net_protocol().is_none());
    }
}

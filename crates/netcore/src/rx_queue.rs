//! 收包队列
//!
//! 驱动轮询时收到的数据包先进入 FIFO 队列，由调度单元逐个取出处理，
//! 使收包路径上的工作量保持有界且可预测。
//!
//! NOTE: 队列不做背压，长度不设上限；超过告警水位时只记录日志。

use alloc::collections::VecDeque;
use core::cell::{Cell, RefCell};

use crate::config::DEFAULT_RX_QUEUE_HIGH_WATER;
use crate::device::NetDevice;
use crate::pkbuff::PacketBuffer;

/// 收包队列
#[derive(Debug)]
pub struct RxQueue {
    queue: RefCell<VecDeque<PacketBuffer>>,
    high_water: usize,
    /// 当前是否处于超过告警水位的状态
    above_high_water: Cell<bool>,
}

impl RxQueue {
    /// 创建空队列
    pub fn new(high_water: usize) -> Self {
        Self {
            queue: RefCell::new(VecDeque::new()),
            high_water,
            above_high_water: Cell::new(false),
        }
    }

    /// 将收到的数据包加入队列，获得缓冲区所有权
    ///
    /// 只标记设备当前的链路层协议，不做任何协议解析。
    pub fn netdev_rx(&self, netdev: &NetDevice, mut pkb: PacketBuffer) {
        log::debug!("netdev: packet received on {} ({} bytes)", netdev.name(), pkb.len());
        pkb.set_ll_protocol(netdev.ll_protocol().clone());
        self.enqueue(pkb);
    }

    /// 追加到队尾
    pub fn enqueue(&self, pkb: PacketBuffer) {
        let len = {
            let mut queue = self.queue.borrow_mut();
            queue.push_back(pkb);
            queue.len()
        };
        if len > self.high_water && !self.above_high_water.replace(true) {
            log::warn!("netdev: rx queue grew past {} packets", self.high_water);
        }
    }

    /// 取出队首的数据包，所有权转移给调用方
    pub fn dequeue(&self) -> Option<PacketBuffer> {
        let mut queue = self.queue.borrow_mut();
        let pkb = queue.pop_front();
        if queue.len() <= self.high_water {
            self.above_high_water.set(false);
        }
        pkb
    }

    /// 队列长度
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// 队列是否为空
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

impl Default for RxQueue {
    fn default() -> Self {
        Self::new(DEFAULT_RX_QUEUE_HIGH_WATER)
    }
}

#[cfg(test)]
mod tests {
    extern crate test_support;

    use super::*;
    use crate::device::test_mock::NullDriver;
    use crate::ll::EthernetProtocol;
    use alloc::rc::Rc;
    use test_support::mock::net::MockPkbOps;

    static OPS: MockPkbOps = MockPkbOps::new();

    fn pkb(tag: u8) -> PacketBuffer {
        PacketBuffer::from_bytes_with(&OPS, &[tag]).unwrap()
    }

    #[test]
    fn test_fifo_order() {
        let rx = RxQueue::default();
        for i in 0..5 {
            rx.enqueue(pkb(i));
        }
        assert_eq!(rx.len(), 5);

        for i in 0..5 {
            assert_eq!(rx.dequeue().unwrap().data(), &[i]);
        }
        assert!(rx.dequeue().is_none());
        assert!(rx.is_empty());
    }

    #[test]
    fn test_interleaved_enqueue_dequeue() {
        let rx = RxQueue::default();
        rx.enqueue(pkb(1));
        rx.enqueue(pkb(2));
        assert_eq!(rx.dequeue().unwrap().data(), &[1]);
        rx.enqueue(pkb(3));
        assert_eq!(rx.dequeue().unwrap().data(), &[2]);
        assert_eq!(rx.dequeue().unwrap().data(), &[3]);
        assert!(rx.dequeue().is_none());
    }

    #[test]
    fn test_netdev_rx_stamps_link_layer() {
        let rx = RxQueue::default();
        let dev = NetDevice::new("eth0", Rc::new(EthernetProtocol), Rc::new(NullDriver));

        rx.netdev_rx(&dev, pkb(7));
        let pkb = rx.dequeue().unwrap();
        assert!(Rc::ptr_eq(pkb.ll_protocol().unwrap(), dev.ll_protocol()));
        assert!(pkb.net_protocol().is_none());
    }

    #[test]
    fn test_queue_is_unbounded() {
        let rx = RxQueue::new(2);
        for i in 0..10 {
            rx.enqueue(pkb(i));
        }
        assert_eq!(rx.len(), 10);
    }
}

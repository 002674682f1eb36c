//! 网络相关协作者的 Mock 实现
//!
//! 注意：这里不直接依赖 `netcore` crate（避免循环依赖）。
//! `netcore` crate 在 `cfg(test)` 下为这些类型实现其 trait（例如 `PkbOps`）。
//! Mock 只负责记录调用次数和注入失败。

use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Mock 的缓冲区分配器
///
/// 记录分配与释放次数，可通过 [`MockPkbOps::set_exhausted`] 模拟内存耗尽。
pub struct MockPkbOps {
    allocated: AtomicUsize,
    freed: AtomicUsize,
    exhausted: AtomicBool,
}

impl MockPkbOps {
    pub const fn new() -> Self {
        Self {
            allocated: AtomicUsize::new(0),
            freed: AtomicUsize::new(0),
            exhausted: AtomicBool::new(false),
        }
    }

    pub fn note_alloc(&self) {
        self.allocated.fetch_add(1, Ordering::SeqCst);
    }

    pub fn note_free(&self) {
        self.freed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn allocated(&self) -> usize {
        self.allocated.load(Ordering::SeqCst)
    }

    pub fn freed(&self) -> usize {
        self.freed.load(Ordering::SeqCst)
    }

    /// 尚未释放的缓冲区数量
    pub fn outstanding(&self) -> usize {
        self.allocated() - self.freed()
    }

    pub fn set_exhausted(&self, exhausted: bool) {
        self.exhausted.store(exhausted, Ordering::SeqCst);
    }

    pub fn exhausted(&self) -> bool {
        self.exhausted.load(Ordering::SeqCst)
    }
}

/// 全局 Mock 实例
pub static MOCK_PKB_OPS: MockPkbOps = MockPkbOps::new();

/// Mock 的地址配置
///
/// 默认添加成功；`set_fail_add(true)` 后添加地址失败。
pub struct MockAddrConfig {
    added: AtomicUsize,
    removed: AtomicUsize,
    fail_add: AtomicBool,
}

impl MockAddrConfig {
    pub const fn new() -> Self {
        Self {
            added: AtomicUsize::new(0),
            removed: AtomicUsize::new(0),
            fail_add: AtomicBool::new(false),
        }
    }

    pub fn note_add(&self) {
        self.added.fetch_add(1, Ordering::SeqCst);
    }

    pub fn note_remove(&self) {
        self.removed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn added(&self) -> usize {
        self.added.load(Ordering::SeqCst)
    }

    pub fn removed(&self) -> usize {
        self.removed.load(Ordering::SeqCst)
    }

    pub fn set_fail_add(&self, fail: bool) {
        self.fail_add.store(fail, Ordering::SeqCst);
    }

    pub fn fail_add(&self) -> bool {
        self.fail_add.load(Ordering::SeqCst)
    }
}

/// Mock 的网络层收包处理
///
/// 记录调用次数与最后一次收到的载荷长度。
pub struct MockRxHandler {
    calls: AtomicUsize,
    last_len: AtomicUsize,
    fail: AtomicBool,
}

impl MockRxHandler {
    pub const fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            last_len: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    pub fn note_call(&self, payload_len: usize) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_len.store(payload_len, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_len(&self) -> usize {
        self.last_len.load(Ordering::SeqCst)
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn fail(&self) -> bool {
        self.fail.load(Ordering::SeqCst)
    }
}

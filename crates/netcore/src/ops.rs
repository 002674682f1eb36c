//! 数据包缓冲区分配操作 trait 定义和注册
//!
//! 此模块定义了网络核心需要的缓冲区分配接口，通过 trait 抽象实现与固件内存管理的解耦。

use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

/// 数据包缓冲区分配操作
///
/// 网络核心只会获取、移交或释放缓冲区，从不关心分配器内部实现。
/// 固件需要实现此 trait 并在启动时注册。
pub trait PkbOps: Send + Sync {
    /// 分配 `len` 字节的数据区，失败时返回 `None`
    fn alloc_data(&self, len: usize) -> Option<Vec<u8>>;

    /// 归还数据区
    ///
    /// 每个缓冲区恰好调用一次
    fn free_data(&self, data: Vec<u8>);
}

// 使用 AtomicUsize 存储 fat pointer 的两部分
static PKB_OPS_DATA: AtomicUsize = AtomicUsize::new(0);
static PKB_OPS_VTABLE: AtomicUsize = AtomicUsize::new(0);

/// 注册缓冲区分配实现
///
/// # Safety
/// 必须在单线程环境下调用，且只能调用一次
pub unsafe fn register_pkb_ops(ops: &'static dyn PkbOps) {
    let ptr = ops as *const dyn PkbOps;
    // SAFETY: 将 fat pointer 拆分为 data 和 vtable 两部分存储
    let (data, vtable) = unsafe { core::mem::transmute::<*const dyn PkbOps, (usize, usize)>(ptr) };
    PKB_OPS_DATA.store(data, Ordering::Release);
    PKB_OPS_VTABLE.store(vtable, Ordering::Release);
}

/// 获取已注册的缓冲区分配实现
///
/// # Panics
/// 如果尚未调用 [`register_pkb_ops`] 注册实现，则 panic
#[inline]
pub fn pkb_ops() -> &'static dyn PkbOps {
    let data = PKB_OPS_DATA.load(Ordering::Acquire);
    let vtable = PKB_OPS_VTABLE.load(Ordering::Acquire);
    if data == 0 {
        #[cfg(test)]
        {
            extern crate test_support;
            return &test_support::mock::net::MOCK_PKB_OPS;
        }
        #[cfg(not(test))]
        panic!("netcore: PkbOps not registered");
    }
    // SAFETY: 重组 fat pointer
    unsafe { &*core::mem::transmute::<(usize, usize), *const dyn PkbOps>((data, vtable)) }
}

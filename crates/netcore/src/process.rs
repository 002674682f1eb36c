//! 协作式调度
//!
//! 进程每次被调度只执行一步（[`Process::step`]），唯一的挂起点是 `step` 返回。
//! 是否再次调度由进程自己决定；驱动循环（例如 [`RunQueue`]）只负责取出并执行。

use alloc::{collections::VecDeque, rc::Rc};
use core::cell::RefCell;

use crate::stack::NetStack;

/// 协作式进程
pub trait Process {
    /// 执行一步
    fn step(self: Rc<Self>, sched: &dyn Scheduler);
}

/// 调度原语
pub trait Scheduler {
    /// 将进程放入运行队列，在之后的某个 tick 执行
    fn schedule(&self, process: Rc<dyn Process>);
}

/// FIFO 运行队列
#[derive(Default)]
pub struct RunQueue {
    queue: RefCell<VecDeque<Rc<dyn Process>>>,
}

impl RunQueue {
    /// 创建空运行队列
    pub fn new() -> Self {
        Self::default()
    }

    /// 取出队首进程执行一步，运行队列为空时返回 false
    pub fn run_once(&self) -> bool {
        // 出队后立即释放借用，step 内部会再次调度
        let Some(process) = self.queue.borrow_mut().pop_front() else {
            return false;
        };
        process.step(self);
        true
    }

    /// 等待执行的进程数
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// 运行队列是否为空
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

impl Scheduler for RunQueue {
    fn schedule(&self, process: Rc<dyn Process>) {
        self.queue.borrow_mut().push_back(process);
    }
}

/// 网络核心进程
///
/// 每一步轮询设备、最多处理一个收到的数据包，然后无条件地重新调度自己；
/// 单个数据包的错误只记录日志，不会终止进程。
pub struct NetProcess {
    stack: Rc<NetStack>,
}

impl NetProcess {
    /// 创建网络核心进程
    pub fn new(stack: Rc<NetStack>) -> Self {
        Self { stack }
    }

    /// 关联的网络核心
    pub fn stack(&self) -> &Rc<NetStack> {
        &self.stack
    }
}

impl Process for NetProcess {
    fn step(self: Rc<Self>, sched: &dyn Scheduler) {
        if let Some(Err(e)) = self.stack.net_step() {
            log::debug!("netdev: received packet dropped: {}", e);
        }
        sched.schedule(self);
    }
}

/// 初始化网络核心进程，调度其第一步
pub fn init_net(stack: Rc<NetStack>, sched: &dyn Scheduler) -> Rc<NetProcess> {
    let process = Rc::new(NetProcess::new(stack));
    sched.schedule(process.clone());
    process
}

//! Mock 实现模块
//!
//! 提供网络核心各外部协作者的 Mock 实现，用于测试

pub mod net;

//! 测试支持 crate
//!
//! 提供网络核心外部协作者的 Mock 实现，用于宿主机单元测试

#![no_std]

pub mod mock;

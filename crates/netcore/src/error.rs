//! 网络核心错误类型
//!
//! 封闭的错误分类，可通过 [`NetError::to_errno()`] 转换为系统调用错误码。

use core::fmt;

/// 网络核心错误类型
///
/// 各错误码对应标准 POSIX errno 值。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetError {
    // 设备注册相关
    /// 注册设备时地址配置失败 (-EADDRNOTAVAIL)
    ConfigurationError,
    /// 已有设备处于注册状态 (-EBUSY)
    AlreadyRegistered,
    /// 没有已注册的设备 (-ENODEV)
    NoDevice,

    // 收包处理相关
    /// 没有与链路层载荷类型匹配的网络层协议 (-EPROTONOSUPPORT)
    UnsupportedProtocol,
    /// 网络层协议处理失败 (-EIO)
    HandlerFailure,
    /// 帧过短或缺少链路层标记 (-EINVAL)
    InvalidFrame,

    // 注册表相关
    /// 地址长度与协议的地址长度不一致 (-EINVAL)
    InvalidAddress,
}

impl NetError {
    /// 转换为系统调用错误码（负数）
    pub fn to_errno(&self) -> isize {
        match self {
            NetError::HandlerFailure => -5,
            NetError::AlreadyRegistered => -16,
            NetError::NoDevice => -19,
            NetError::InvalidFrame => -22,
            NetError::InvalidAddress => -22,
            NetError::UnsupportedProtocol => -93,
            NetError::ConfigurationError => -99,
        }
    }
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            NetError::ConfigurationError => "address configuration failed",
            NetError::AlreadyRegistered => "a network device is already registered",
            NetError::NoDevice => "no network device registered",
            NetError::UnsupportedProtocol => "unsupported network-layer protocol",
            NetError::HandlerFailure => "network-layer protocol dropped packet",
            NetError::InvalidFrame => "invalid link-layer frame",
            NetError::InvalidAddress => "address length does not match protocol",
        };
        f.write_str(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::NetError;
    use alloc::string::ToString;

    #[test]
    fn test_errno_values() {
        assert_eq!(NetError::UnsupportedProtocol.to_errno(), -93);
        assert_eq!(NetError::ConfigurationError.to_errno(), -99);
        assert_eq!(NetError::HandlerFailure.to_errno(), -5);
        assert_eq!(NetError::AlreadyRegistered.to_errno(), -16);
    }

    #[test]
    fn test_display_is_stable() {
        assert_eq!(
            NetError::UnsupportedProtocol.to_string(),
            "unsupported network-layer protocol"
        );
    }
}

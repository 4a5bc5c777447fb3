#![cfg_attr(not(feature = "std"), no_std)]
#![doc = "variant-core: 按配置 ID 取值、带强制默认值回退的可配置参数核心契约。"]
#![doc = ""]
#![doc = "核心抽象 [`ConfigurableValue`] 保证：任意配置 ID 都能读到一个确定的值，"]
#![doc = "未显式覆盖的配置统一回退到默认值；每次变更都会在状态落定后通知观察者。"]

extern crate alloc;

pub mod configurable;
pub mod observability;

pub use configurable::{
    ChangeEvent, ChangeListener, ChangeNotification, ChangeNotifier, ConfigurableError,
    ConfigurableErrorKind, ConfigurableSnapshot, ConfigurableValue, ConfigurableValueBuilder,
    ConfigurationId, Iter, ListenerToken, SharedConfigurable, SharedReadGuard, Values,
};
pub use observability::{LogField, LogRecord, LogSeverity, Logger, NoopLogger};

use alloc::boxed::Box;
use core::fmt;

/// `variant-core` 中所有错误必须实现的 `no_std` 基础 Trait。
///
/// # 设计背景（Why）
/// - `std::error::Error` 在 `no_std` 环境中不可用，因此需要一个对象安全、与平台无关的错误抽象来串联错误链。
///
/// # 契约说明（What）
/// - 实现类型必须提供 `Debug` 与 `Display`，便于日志收集。
/// - `source` 返回链路上的上游错误，语义与 `std::error::Error::source` 一致。
pub trait Error: fmt::Debug + fmt::Display {
    /// 返回当前错误的上游来源。
    fn source(&self) -> Option<&(dyn Error + 'static)>;
}

impl<E> Error for Box<E>
where
    E: Error + ?Sized,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        (**self).source()
    }
}

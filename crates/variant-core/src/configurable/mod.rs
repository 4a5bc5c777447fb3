//! 可配置值契约模块。
//!
//! # 设计目标概述
//! - 表达“随运行期所选配置而变化”的参数：多数配置共享默认值，少数配置单独覆盖，任何配置下都能读到确定的值。
//! - 模块拆分：`id` 负责配置标识，`value` 实现覆盖存储与回退，`change` 描述变更通知，`error` 统一错误，
//!   `builder` 负责构建期参数，`snapshot` 提供持久化友好的快照，`shared` 提供跨线程共享句柄。
//!
//! # 使用路线图
//! 1. 宿主为每个配置分配一个 [`ConfigurationId`]。
//! 2. 所属组件以默认值创建 [`ConfigurableValue`]（或经由 [`ConfigurableValueBuilder`]），并按需覆盖。
//! 3. 其他子系统通过 [`ConfigurableValue::subscribe`] 订阅 [`ChangeNotification`]。

mod builder;
mod change;
mod error;
mod id;
mod shared;
mod snapshot;
mod value;

pub use builder::ConfigurableValueBuilder;
pub use change::{ChangeEvent, ChangeListener, ChangeNotification, ChangeNotifier, ListenerToken};
pub use error::{ConfigurableError, ConfigurableErrorKind};
pub use id::ConfigurationId;
pub use shared::{SharedConfigurable, SharedReadGuard};
pub use snapshot::ConfigurableSnapshot;
pub use value::{ConfigurableValue, Iter, Values};

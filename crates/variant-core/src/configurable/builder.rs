use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::observability::{Logger, NoopLogger};

use super::{ConfigurableError, ConfigurableValue, ConfigurationId};

/// [`ConfigurableValue`] 的构建器。
///
/// ### 设计意图（Why）
/// - 把日志后端、容量上限与预置覆盖项集中在构建期声明，运行期的 `ConfigurableValue` 只保留必要状态。
///
/// ### 契约说明（What）
/// - 默认值在 [`new`](Self::new) 时强制给出，构建器不存在“无默认值”的中间态。
/// - 预置覆盖项中重复的 ID 以最后一次为准。
/// - 构建过程不发送任何变更通知：此时尚不可能存在观察者。
pub struct ConfigurableValueBuilder<E> {
    default: E,
    overrides: Vec<(ConfigurationId, E)>,
    capacity: Option<usize>,
    logger: Option<Arc<dyn Logger>>,
}

impl<E> ConfigurableValueBuilder<E> {
    /// 以默认值创建构建器。
    pub fn new(default: E) -> Self {
        Self {
            default,
            overrides: Vec::new(),
            capacity: None,
            logger: None,
        }
    }

    /// 限制覆盖项的最大数量。
    ///
    /// 超出上限的新增写入返回 [`ConfigurableError::CapacityExceeded`]；替换已有覆盖项不受影响。
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// 注入日志后端；未注入时使用 [`NoopLogger`]。
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// 预置一条覆盖项。
    pub fn with_override(mut self, id: ConfigurationId, value: E) -> Self {
        self.overrides.push((id, value));
        self
    }

    /// 完成构建。
    ///
    /// 去重后的预置覆盖项数量超过容量上限时返回 [`ConfigurableError::CapacityExceeded`]。
    pub fn build(self) -> Result<ConfigurableValue<E>, ConfigurableError> {
        let overrides: BTreeMap<ConfigurationId, E> = self.overrides.into_iter().collect();
        if let Some(capacity) = self.capacity
            && overrides.len() > capacity
        {
            return Err(ConfigurableError::CapacityExceeded { capacity });
        }

        let logger = self.logger.unwrap_or_else(|| Arc::new(NoopLogger));
        Ok(ConfigurableValue::from_parts(
            self.default,
            overrides,
            logger,
            self.capacity,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_overrides_respect_last_write_and_capacity() {
        let value = ConfigurableValueBuilder::new("A")
            .with_capacity(1)
            .with_override(ConfigurationId::new("x"), "B")
            .with_override(ConfigurationId::new("x"), "C")
            .build()
            .expect("duplicate ids collapse into one override");
        assert_eq!(*value.get(&ConfigurationId::new("x")), "C");
        assert_eq!(value.change_sequence(), 0);

        let err = ConfigurableValueBuilder::new("A")
            .with_capacity(1)
            .with_override(ConfigurationId::new("x"), "B")
            .with_override(ConfigurationId::new("y"), "C")
            .build()
            .expect_err("two distinct ids exceed capacity");
        assert_eq!(err, ConfigurableError::CapacityExceeded { capacity: 1 });
    }
}

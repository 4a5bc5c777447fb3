use alloc::collections::{BTreeMap, btree_map};
use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::iter::FusedIterator;

use crate::Error;
use crate::observability::{Logger, NoopLogger};

use super::{
    ChangeEvent, ChangeListener, ChangeNotifier, ConfigurableError, ConfigurableSnapshot,
    ConfigurableValueBuilder, ConfigurationId, ListenerToken,
};

const LOG_TARGET: &str = "variant::configurable";

/// 随配置 ID 变化、且始终有定义的参数值。
///
/// ### 设计目的（Why）
/// - 宿主系统中大多数配置共享同一个默认值，少数配置单独覆盖；调用方在任何配置下读取都不能观察到“未定义”。
/// - 以组合取代继承：遍历能力由 [`values`](Self::values) 与 `IntoIterator` 提供，变更源能力由内部的
///   [`ChangeNotifier`] 提供。
///
/// ### 逻辑说明（How）
/// - `default`：强制存在的回退值，只能被替换，不能被移除。
/// - `overrides`：`BTreeMap<ConfigurationId, E>`，天然按 ID 升序遍历，排序、反查与迭代共享同一顺序。
/// - 每次成功变更都先落定内存状态，再发送恰好一次通知；观察者以共享借用拿到变更后的本值。
///
/// ### 契约定义（What）
/// - [`get`](Self::get) 对任意 ID 都返回确定的值：覆盖项存在时返回覆盖项，否则返回默认值。
/// - [`size`](Self::size) 只统计覆盖项，不包含默认值槽位。
/// - [`is_default`](Self::is_default) 判断的是“是否走回退路径”，而不是“值是否等于默认值”。
/// - 需要 `&mut self` 才能修改，单写者由借用检查器保证；跨线程共享请使用
///   [`SharedConfigurable`](super::SharedConfigurable)。
pub struct ConfigurableValue<E> {
    default: E,
    overrides: BTreeMap<ConfigurationId, E>,
    notifier: ChangeNotifier<E>,
    logger: Arc<dyn Logger>,
    capacity: Option<usize>,
}

impl<E> ConfigurableValue<E> {
    /// 以初始默认值创建可配置值，不含任何覆盖项。
    pub fn new(default: E) -> Self {
        Self::from_parts(default, BTreeMap::new(), Arc::new(NoopLogger), None)
    }

    /// 返回以 `default` 为默认值的构建器。
    pub fn builder(default: E) -> ConfigurableValueBuilder<E> {
        ConfigurableValueBuilder::new(default)
    }

    pub(crate) fn from_parts(
        default: E,
        overrides: BTreeMap<ConfigurationId, E>,
        logger: Arc<dyn Logger>,
        capacity: Option<usize>,
    ) -> Self {
        Self {
            default,
            overrides,
            notifier: ChangeNotifier::new(),
            logger,
            capacity,
        }
    }

    /// 返回当前默认值。
    #[inline]
    pub fn default_value(&self) -> &E {
        &self.default
    }

    /// 返回 `id` 对应的值：存在覆盖项时返回覆盖项，否则回退到默认值。
    #[inline]
    pub fn get(&self, id: &ConfigurationId) -> &E {
        self.overrides.get(id).unwrap_or(&self.default)
    }

    /// `id` 是否使用默认值（即没有覆盖项）。
    ///
    /// 覆盖项的值恰好等于默认值时仍返回 `false`。
    #[inline]
    pub fn is_default(&self, id: &ConfigurationId) -> bool {
        !self.overrides.contains_key(id)
    }

    /// `id` 是否存在显式覆盖项。
    #[inline]
    pub fn contains(&self, id: &ConfigurationId) -> bool {
        self.overrides.contains_key(id)
    }

    /// 覆盖项数量，不包含默认值。
    #[inline]
    pub fn size(&self) -> usize {
        self.overrides.len()
    }

    /// 是否没有任何覆盖项。
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    /// 构建期声明的覆盖项容量上限。
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// 返回所有存在覆盖项的配置 ID，按升序排列。
    ///
    /// 返回全新的 `Vec`，之后对本值的修改不会影响已返回的序列。
    pub fn sorted_configuration_ids(&self) -> Vec<ConfigurationId> {
        self.overrides.keys().cloned().collect()
    }

    /// 按 ID 升序惰性遍历覆盖值，不包含默认值；每次调用都从第一个元素重新开始。
    pub fn values(&self) -> Values<'_, E> {
        Values {
            inner: self.overrides.values(),
        }
    }

    /// 按 ID 升序遍历 `(id, 覆盖值)`。
    pub fn iter(&self) -> Iter<'_, E> {
        Iter {
            inner: self.overrides.iter(),
        }
    }

    /// 注册变更观察者，返回用于注销的令牌。
    pub fn subscribe<L>(&mut self, listener: L) -> ListenerToken
    where
        L: ChangeListener<E> + 'static,
    {
        self.notifier.register(Arc::new(listener))
    }

    /// 注销观察者；令牌未知时返回 `false`。
    pub fn unsubscribe(&mut self, token: ListenerToken) -> bool {
        self.notifier.unregister(token)
    }

    /// 当前注册的观察者数量。
    pub fn listener_count(&self) -> usize {
        self.notifier.listener_count()
    }

    /// 最近一次变更通知的序号；从未变更时为 0。
    pub fn change_sequence(&self) -> u64 {
        self.notifier.sequence()
    }

    /// 按值反查配置 ID。
    ///
    /// ### 契约（What）
    /// - 只扫描覆盖项，默认值不参与匹配。
    /// - 多个 ID 的覆盖值都等于 `value` 时，返回升序中的第一个。
    /// - 没有匹配时返回 [`ConfigurableError::NotFound`]。
    ///
    /// 未建立值索引，复杂度为 O(n)。
    pub fn find_id(&self, value: &E) -> Result<&ConfigurationId, ConfigurableError>
    where
        E: PartialEq,
    {
        self.overrides
            .iter()
            .find(|(_, candidate)| *candidate == value)
            .map(|(id, _)| id)
            .ok_or_else(|| ConfigurableError::not_found("no override holds the requested value"))
    }

    fn notify(&mut self, event: ChangeEvent<E>) {
        let notification = self.notifier.record(event);
        self.notifier.broadcast(self, &notification);
    }

    fn reject(&self, operation: &'static str, error: ConfigurableError) -> ConfigurableError {
        let cause: &dyn Error = &error;
        self.logger.warn_with_fields(
            LOG_TARGET,
            "configurable value rejected call",
            Some(cause),
            &[("operation", operation), ("kind", error.kind().as_str())],
        );
        error
    }
}

impl<E> ConfigurableValue<E>
where
    E: Clone,
{
    /// 替换默认值。
    ///
    /// ### 契约（What）
    /// - 传入 `None` 时返回 [`ConfigurableError::InvalidArgument`]，状态不变且不发送通知。
    /// - 成功后已有覆盖项保持不变，并恰好发送一次 [`ChangeEvent::DefaultReplaced`]。
    pub fn set_default<V>(&mut self, value: V) -> Result<(), ConfigurableError>
    where
        V: Into<Option<E>>,
    {
        let Some(value) = value.into() else {
            return Err(self.reject(
                "set_default",
                ConfigurableError::invalid_argument("default value must be present"),
            ));
        };

        self.default = value.clone();
        self.logger
            .debug_with_fields(LOG_TARGET, "default value replaced", &[]);
        self.notify(ChangeEvent::DefaultReplaced { value });
        Ok(())
    }

    /// 新增或替换 `id` 的覆盖项。
    ///
    /// ### 契约（What）
    /// - `id` 或 `value` 为 `None` 时返回 [`ConfigurableError::InvalidArgument`]。
    /// - 配置了容量上限且 `id` 尚无覆盖项时，超过上限返回 [`ConfigurableError::CapacityExceeded`]；
    ///   替换已有覆盖项不受容量限制。
    /// - 写入不做值比较：重复写入相同的值同样发送 [`ChangeEvent::OverrideSet`]。
    pub fn set<I, V>(&mut self, id: I, value: V) -> Result<(), ConfigurableError>
    where
        I: Into<Option<ConfigurationId>>,
        V: Into<Option<E>>,
    {
        let Some(id) = id.into() else {
            return Err(self.reject(
                "set",
                ConfigurableError::invalid_argument("configuration id must be present"),
            ));
        };
        let Some(value) = value.into() else {
            return Err(self.reject(
                "set",
                ConfigurableError::invalid_argument("override value must be present"),
            ));
        };
        if let Some(capacity) = self.capacity
            && !self.overrides.contains_key(&id)
            && self.overrides.len() >= capacity
        {
            return Err(self.reject("set", ConfigurableError::CapacityExceeded { capacity }));
        }

        self.overrides.insert(id.clone(), value.clone());
        self.logger
            .debug_with_fields(LOG_TARGET, "override set", &[("id", id.as_str())]);
        self.notify(ChangeEvent::OverrideSet { id, value });
        Ok(())
    }

    /// 移除 `id` 的覆盖项，使其回退到默认值。
    ///
    /// 返回是否真的移除了条目；`id` 本就没有覆盖项时为无操作，不报错也不发送通知。
    pub fn reset(&mut self, id: &ConfigurationId) -> bool {
        let Some((id, _)) = self.overrides.remove_entry(id) else {
            return false;
        };

        self.logger
            .debug_with_fields(LOG_TARGET, "override reset", &[("id", id.as_str())]);
        self.notify(ChangeEvent::OverrideReset { id });
        true
    }

    /// 让 `to` 与 `from` 取得相同的值。
    ///
    /// - `from` 有覆盖项：把该值写入 `to`（等价于 [`set`](Self::set)）。
    /// - `from` 走默认值：移除 `to` 的覆盖项（等价于 [`reset`](Self::reset)），保证二者仍然同步跟随默认值。
    ///
    /// 宿主复制一份配置时使用。
    pub fn copy_configuration(
        &mut self,
        from: &ConfigurationId,
        to: ConfigurationId,
    ) -> Result<(), ConfigurableError> {
        match self.overrides.get(from).cloned() {
            Some(value) => self.set(to, value),
            None => {
                self.reset(&to);
                Ok(())
            }
        }
    }

    /// 移除全部覆盖项，返回被移除的条目数。
    ///
    /// 至少移除一条时发送一次 [`ChangeEvent::OverridesCleared`]。
    pub fn clear_overrides(&mut self) -> usize {
        let removed = self.overrides.len();
        if removed == 0 {
            return 0;
        }

        self.overrides.clear();
        self.logger.info_with_fields(
            LOG_TARGET,
            "overrides cleared",
            &[("removed", removed.to_string().as_str())],
        );
        self.notify(ChangeEvent::OverridesCleared { removed });
        removed
    }

    /// 导出默认值与覆盖项的独立快照，不包含观察者。
    pub fn snapshot(&self) -> ConfigurableSnapshot<E> {
        ConfigurableSnapshot {
            default: self.default.clone(),
            overrides: self
                .overrides
                .iter()
                .map(|(id, value)| (id.clone(), value.clone()))
                .collect(),
        }
    }

    /// 从快照重建可配置值；快照中重复的 ID 以最后一次出现为准。
    pub fn from_snapshot(snapshot: ConfigurableSnapshot<E>) -> Self {
        let overrides = snapshot.overrides.into_iter().collect();
        Self::from_parts(snapshot.default, overrides, Arc::new(NoopLogger), None)
    }
}

impl<E> ConfigurableValue<E>
where
    E: fmt::Debug,
{
    /// 生成多行调试文本：先输出默认值，再按 ID 升序输出覆盖项。
    pub fn describe(&self) -> String {
        let mut out = format!("default = {:?}\n", self.default);
        for (id, value) in &self.overrides {
            out.push_str(&format!("  {id} = {value:?}\n"));
        }
        out
    }
}

/// 克隆只复制数据、日志后端与容量；观察者属于原值的所有者，不随克隆传播。
impl<E> Clone for ConfigurableValue<E>
where
    E: Clone,
{
    fn clone(&self) -> Self {
        Self::from_parts(
            self.default.clone(),
            self.overrides.clone(),
            Arc::clone(&self.logger),
            self.capacity,
        )
    }
}

impl<E> fmt::Debug for ConfigurableValue<E>
where
    E: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurableValue")
            .field("default", &self.default)
            .field("overrides", &self.overrides)
            .field("capacity", &self.capacity)
            .field("notifier", &self.notifier)
            .finish()
    }
}

impl<'a, E> IntoIterator for &'a ConfigurableValue<E> {
    type Item = &'a E;
    type IntoIter = Values<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.values()
    }
}

/// 覆盖值的惰性迭代器，按配置 ID 升序产出。
#[derive(Clone, Debug)]
pub struct Values<'a, E> {
    inner: btree_map::Values<'a, ConfigurationId, E>,
}

impl<'a, E> Iterator for Values<'a, E> {
    type Item = &'a E;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<E> DoubleEndedIterator for Values<'_, E> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<E> ExactSizeIterator for Values<'_, E> {}

impl<E> FusedIterator for Values<'_, E> {}

/// `(id, 覆盖值)` 迭代器，按配置 ID 升序产出。
#[derive(Clone, Debug)]
pub struct Iter<'a, E> {
    inner: btree_map::Iter<'a, ConfigurationId, E>,
}

impl<'a, E> Iterator for Iter<'a, E> {
    type Item = (&'a ConfigurationId, &'a E);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<E> DoubleEndedIterator for Iter<'_, E> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<E> ExactSizeIterator for Iter<'_, E> {}

impl<E> FusedIterator for Iter<'_, E> {}

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use super::{ConfigurableValue, ConfigurationId};

/// 变更通知中携带的单条事件。
///
/// ### 逻辑说明（How）
/// - `DefaultReplaced`：默认值被替换，携带新默认值。
/// - `OverrideSet`：某个配置 ID 的覆盖项被新增或替换，携带新值；即使新旧值相等也会产生该事件。
/// - `OverrideReset`：某个配置 ID 的覆盖项被移除，后续读取回退到默认值；不携带旧值。
/// - `OverridesCleared`：一次性移除全部覆盖项，`removed` 为被移除的条目数。
///
/// 事件只描述“发生了什么”；回退后的取值等完整状态通过回调中的 `source` 查询。
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum ChangeEvent<E> {
    DefaultReplaced { value: E },
    OverrideSet { id: ConfigurationId, value: E },
    OverrideReset { id: ConfigurationId },
    OverridesCleared { removed: usize },
}

/// 封装一次变更通知。
///
/// ### 契约说明（What）
/// - `sequence` 在同一个可配置值内从 1 开始单调递增，每次发送加一，可用于检测漏收或重放。
/// - 通知总是在内存状态更新完成之后发出；回调收到的 `source` 已经反映本次变更。
#[derive(Clone, Debug, PartialEq)]
pub struct ChangeNotification<E> {
    pub sequence: u64,
    pub event: ChangeEvent<E>,
}

/// 变更观察者。
///
/// ### 设计目的（Why）
/// - 以组合取代继承：可配置值持有一个观察者列表，而不是自身“成为”变更源。
///
/// ### 契约（What）
/// - 回调同步执行，且在变更已生效后调用；回调无法回滚变更，因此不返回错误。
/// - `source` 是发出通知的可配置值本身，只读；`source.get`、`source.is_default`、`source.size`
///   等读取均返回变更后的结果。
/// - 回调期间 `source` 仍处于变更调用之内，不能修改它；需要联动修改时请在回调外调度。
pub trait ChangeListener<E>: Send + Sync {
    fn on_change(&self, source: &ConfigurableValue<E>, notification: &ChangeNotification<E>);
}

impl<E, F> ChangeListener<E> for F
where
    F: Fn(&ConfigurableValue<E>, &ChangeNotification<E>) + Send + Sync,
{
    fn on_change(&self, source: &ConfigurableValue<E>, notification: &ChangeNotification<E>) {
        self(source, notification)
    }
}

/// 注册观察者时返回的令牌，用于后续注销。
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerToken(u64);

/// 观察者列表与通知序号的组合体。
///
/// ### 逻辑说明（How）
/// - 观察者按注册顺序保存在向量中，广播时同步遍历，保证顺序一致。
/// - 同一个回调重复注册会收到多次通知；不做去重。
/// - 发送拆为两步：[`record`](Self::record) 需要 `&mut self` 分配序号，[`broadcast`](Self::broadcast)
///   只需 `&self`，使持有者可以把自身以共享借用交给观察者。
pub struct ChangeNotifier<E> {
    listeners: Vec<(ListenerToken, Arc<dyn ChangeListener<E>>)>,
    next_token: u64,
    sequence: u64,
}

impl<E> ChangeNotifier<E> {
    /// 创建空的通知器。
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_token: 1,
            sequence: 0,
        }
    }

    /// 注册观察者。
    pub fn register(&mut self, listener: Arc<dyn ChangeListener<E>>) -> ListenerToken {
        let token = ListenerToken(self.next_token);
        self.next_token += 1;
        self.listeners.push((token, listener));
        token
    }

    /// 注销观察者；令牌未知时返回 `false`。
    pub fn unregister(&mut self, token: ListenerToken) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(candidate, _)| *candidate != token);
        self.listeners.len() != before
    }

    /// 当前注册的观察者数量。
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// 最近一次发送的通知序号；从未发送时为 0。
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// 为事件分配下一个序号。
    ///
    /// 没有观察者时序号同样递增，保证序号只反映变更次数。
    pub fn record(&mut self, event: ChangeEvent<E>) -> ChangeNotification<E> {
        self.sequence += 1;
        ChangeNotification {
            sequence: self.sequence,
            event,
        }
    }

    /// 按注册顺序把通知同步交给每个观察者。
    pub fn broadcast(&self, source: &ConfigurableValue<E>, notification: &ChangeNotification<E>) {
        for (_, listener) in &self.listeners {
            listener.on_change(source, notification);
        }
    }
}

impl<E> Default for ChangeNotifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for ChangeNotifier<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .field("sequence", &self.sequence)
            .finish()
    }
}

use alloc::sync::Arc;
use core::fmt;
use core::ops::Deref;

use spin::{RwLock, RwLockReadGuard};

use super::{ConfigurableSnapshot, ConfigurableValue, ConfigurationId};

/// 跨线程共享的可配置值句柄。
///
/// # 教案级注释（Why）
/// - 典型拓扑是“一个所属组件写、多个读者读快照”；`ConfigurableValue` 本身依赖 `&mut self`
///   保证单写者，跨线程时需要外部串行化写入。
/// - 通过共享读写锁，写者在持有写锁期间完成变更并同步发送通知；读者持有读锁期间看到一致状态。
///
/// # 契约说明（What）
/// - `read`：返回读锁守卫，允许多个线程并发读取。
/// - `update`：在写锁内执行闭包；观察者回调同样在写锁内触发，因此回调中不得再访问同一句柄，否则自旋死锁。
///   回调需要读取状态时使用传入的 `source`。
/// - 写锁为自旋锁：观察者与日志后端执行期间，并发读者会持续占用 CPU 忙等，
///   耗时的观察者应把工作转交到其他线程后立即返回。
/// - Clone 后的实例共享同一把锁与同一份数据。
pub struct SharedConfigurable<E> {
    inner: Arc<RwLock<ConfigurableValue<E>>>,
}

impl<E> SharedConfigurable<E> {
    /// 接管一个可配置值。
    pub fn new(value: ConfigurableValue<E>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
        }
    }

    /// 进入读侧临界区。
    pub fn read(&self) -> SharedReadGuard<'_, E> {
        SharedReadGuard {
            guard: self.inner.read(),
        }
    }

    /// 在写侧临界区内修改，返回闭包结果。
    pub fn update<R>(&self, f: impl FnOnce(&mut ConfigurableValue<E>) -> R) -> R {
        let mut guard = self.inner.write();
        f(&mut *guard)
    }
}

impl<E> SharedConfigurable<E>
where
    E: Clone,
{
    /// 读取 `id` 对应的值并克隆返回，锁在返回前释放。
    pub fn get(&self, id: &ConfigurationId) -> E {
        self.inner.read().get(id).clone()
    }

    /// 在读锁内导出快照。
    pub fn snapshot(&self) -> ConfigurableSnapshot<E> {
        self.inner.read().snapshot()
    }
}

impl<E> Clone for SharedConfigurable<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> From<ConfigurableValue<E>> for SharedConfigurable<E> {
    fn from(value: ConfigurableValue<E>) -> Self {
        Self::new(value)
    }
}

impl<E> fmt::Debug for SharedConfigurable<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedConfigurable")
    }
}

/// 读锁守卫，解引用为 [`ConfigurableValue`]。
pub struct SharedReadGuard<'a, E> {
    guard: RwLockReadGuard<'a, ConfigurableValue<E>>,
}

impl<E> Deref for SharedReadGuard<'_, E> {
    type Target = ConfigurableValue<E>;

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl<E> fmt::Debug for SharedReadGuard<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedReadGuard")
    }
}

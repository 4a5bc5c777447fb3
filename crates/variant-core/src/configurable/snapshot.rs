use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use super::{ConfigurableValue, ConfigurationId};

/// 可配置值的独立快照，供宿主持久化或跨线程传递。
///
/// ### 契约说明（What）
/// - `overrides` 按配置 ID 升序排列，与 [`ConfigurableValue::sorted_configuration_ids`] 一致。
/// - 快照不包含观察者、日志后端与容量上限；这些属于运行期所有者。
/// - 序列化格式由 `serde` 派生：`{"default": .., "overrides": [[id, value], ..]}`，缺省的
///   `overrides` 视为空列表。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigurableSnapshot<E> {
    pub default: E,
    #[serde(default)]
    pub overrides: Vec<(ConfigurationId, E)>,
}

impl<E> ConfigurableSnapshot<E>
where
    E: Clone,
{
    /// 重建可配置值，等价于 [`ConfigurableValue::from_snapshot`]。
    pub fn into_value(self) -> ConfigurableValue<E> {
        ConfigurableValue::from_snapshot(self)
    }
}

#[cfg(feature = "std_json")]
impl<E> ConfigurableSnapshot<E> {
    /// 序列化为 JSON 文本。
    pub fn to_json(&self) -> Result<alloc::string::String, serde_json::Error>
    where
        E: Serialize,
    {
        serde_json::to_string(self)
    }

    /// 从 JSON 文本解析快照。
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error>
    where
        E: serde::de::DeserializeOwned,
    {
        serde_json::from_str(text)
    }
}

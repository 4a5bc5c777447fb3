use alloc::borrow::Cow;
use alloc::string::String;
use core::fmt;

use serde::{Deserialize, Serialize};

/// 配置（变体、档案、飞行配置等）的稳定标识符。
///
/// ### 设计目的（Why）
/// - 可配置值只负责保存“ID → 值”的关联，ID 的创建与发现属于宿主系统；因此这里只提供一个不透明、可比较的新类型。
/// - 借助 `Cow<'static, str>` 同时适配常量与运行时动态生成（例如 UUID 字符串）的场景。
///
/// ### 契约说明（What）
/// - 实现 `Eq`、`Ord`、`Hash`，可作为有序映射的键。
/// - 排序即底层字符串的字典序：本身不承载业务含义，只保证可复现。
/// - 构造函数不做任何校验，唯一性由映射语义自然保证。
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationId(Cow<'static, str>);

impl ConfigurationId {
    /// 创建新的配置标识。
    #[inline]
    pub fn new<N>(name: N) -> Self
    where
        N: Into<Cow<'static, str>>,
    {
        Self(name.into())
    }

    /// 返回内部字符串表示。
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigurationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for ConfigurationId {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ConfigurationId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    #[test]
    fn ordering_follows_lexicographic_name() {
        let mut ids: Vec<ConfigurationId> = vec!["b".into(), "a".into(), "c".into()];
        ids.sort();
        let names: Vec<&str> = ids.iter().map(ConfigurationId::as_str).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn static_and_owned_names_compare_equal() {
        let borrowed = ConfigurationId::from("flight-1");
        let owned = ConfigurationId::from(String::from("flight-1"));
        assert_eq!(borrowed, owned);
        assert_eq!(owned.to_string(), "flight-1");
    }
}

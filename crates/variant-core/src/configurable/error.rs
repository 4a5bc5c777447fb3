use crate::Error;
use alloc::borrow::Cow;
use core::fmt;

/// 可配置值的统一错误类型。
///
/// ### 逻辑解析（How）
/// - `InvalidArgument`：调用方向 `set_default`/`set` 传入了缺失的值，或向 `set` 传入了缺失的 ID。
/// - `NotFound`：按值反查时没有任何覆盖项与之相等；属于预期结果而非缺陷。
/// - `CapacityExceeded`：新增覆盖项时超出了构建期声明的容量上限。
///
/// ### 契约说明（What）
/// - 所有错误都在引发它的调用中同步返回，不存在延迟或批量的错误状态。
/// - 出错的调用不会修改状态，也不会触发变更通知。
/// - `context` 使用 `Cow`，允许常量与动态拼接并存。
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigurableError {
    InvalidArgument { context: Cow<'static, str> },
    NotFound { context: Cow<'static, str> },
    CapacityExceeded { capacity: usize },
}

impl ConfigurableError {
    /// 构造参数非法错误。
    pub fn invalid_argument<C>(context: C) -> Self
    where
        C: Into<Cow<'static, str>>,
    {
        Self::InvalidArgument {
            context: context.into(),
        }
    }

    /// 构造反查未命中错误。
    pub fn not_found<C>(context: C) -> Self
    where
        C: Into<Cow<'static, str>>,
    {
        Self::NotFound {
            context: context.into(),
        }
    }

    /// 返回错误类别。
    pub fn kind(&self) -> ConfigurableErrorKind {
        match self {
            Self::InvalidArgument { .. } => ConfigurableErrorKind::InvalidArgument,
            Self::NotFound { .. } => ConfigurableErrorKind::NotFound,
            Self::CapacityExceeded { .. } => ConfigurableErrorKind::CapacityExceeded,
        }
    }
}

impl fmt::Display for ConfigurableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { context } | Self::NotFound { context } => {
                write!(f, "{}: {}", self.kind(), context)
            }
            Self::CapacityExceeded { capacity } => {
                write!(f, "{}: at most {} overrides allowed", self.kind(), capacity)
            }
        }
    }
}

impl Error for ConfigurableError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigurableError {}

/// 错误类别，便于调用方做分支判断而不依赖上下文文案。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ConfigurableErrorKind {
    InvalidArgument,
    NotFound,
    CapacityExceeded,
}

impl ConfigurableErrorKind {
    /// 返回稳定的类别名称。
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::NotFound => "not_found",
            Self::CapacityExceeded => "capacity_exceeded",
        }
    }
}

impl fmt::Display for ConfigurableErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const _: fn() = || {
    fn assert_error_traits<T: Error + Send + Sync + 'static>() {}

    assert_error_traits::<ConfigurableError>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_kind() {
        let err = ConfigurableError::invalid_argument("value must be present");
        assert_eq!(err.to_string(), "invalid_argument: value must be present");

        let err = ConfigurableError::CapacityExceeded { capacity: 2 };
        assert_eq!(err.kind(), ConfigurableErrorKind::CapacityExceeded);
        assert_eq!(
            err.to_string(),
            "capacity_exceeded: at most 2 overrides allowed"
        );
    }
}

//! variant-tracing：把 `variant-core` 的日志契约桥接到 `tracing` 生态。
//!
//! # 教案式说明
//! - **意图（Why）**：核心 crate 保持 `no_std`，只定义 [`Logger`] 契约；宿主进程通常已经使用 `tracing`，
//!   本 crate 提供零配置的桥接与订阅器安装入口。
//! - **契约（What）**：[`TracingLogger`] 把每条 [`LogRecord`] 转为一条 `tracing` 事件；[`install`] 为进程
//!   安装 `fmt + EnvFilter` 订阅器，仅允许调用一次。

use std::{
    borrow::Cow,
    fmt,
    sync::{Arc, OnceLock},
};

use tracing::{Level, dispatcher};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt};
use variant_core::{LogField, LogRecord, LogSeverity, Logger};

/// 安装状态的全局缓存，确保 `install` 仅执行一次。
static INSTALL_STATE: OnceLock<InstallOptions> = OnceLock::new();

/// 安装过程可能出现的错误类型。
#[derive(Debug)]
pub enum Error {
    /// `install` 被重复调用。
    AlreadyInstalled,
    /// 外部提前设置了全局 `tracing` Subscriber，无法再次注册。
    SubscriberAlreadySet,
    /// 设置全局 Subscriber 失败的底层错误。
    SetGlobalSubscriber(dispatcher::SetGlobalDefaultError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AlreadyInstalled => f.write_str("variant-tracing 已完成安装，禁止重复调用 install"),
            Error::SubscriberAlreadySet => {
                f.write_str("全局 tracing Subscriber 已存在，variant-tracing 无法覆盖")
            }
            Error::SetGlobalSubscriber(err) => {
                write!(f, "设置 tracing 全局 Subscriber 失败: {err}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::SetGlobalSubscriber(err) => Some(err),
            _ => None,
        }
    }
}

/// 订阅器安装参数。
///
/// - `env_var`：读取过滤指令的环境变量，默认 `RUST_LOG`；
/// - `default_directive`：环境变量缺失或无法解析时使用的指令，默认 `info`。
#[derive(Clone, Debug)]
pub struct InstallOptions {
    pub env_var: Cow<'static, str>,
    pub default_directive: Cow<'static, str>,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            env_var: Cow::Borrowed(EnvFilter::DEFAULT_ENV),
            default_directive: Cow::Borrowed("info"),
        }
    }
}

impl InstallOptions {
    /// 替换默认过滤指令。
    pub fn with_default_directive(mut self, directive: impl Into<Cow<'static, str>>) -> Self {
        self.default_directive = directive.into();
        self
    }

    /// 替换读取过滤指令的环境变量。
    pub fn with_env_var(mut self, env_var: impl Into<Cow<'static, str>>) -> Self {
        self.env_var = env_var.into();
        self
    }
}

/// 安装全局订阅器：`registry + EnvFilter + fmt`。
///
/// # 契约（What）
/// - 多次调用返回 [`Error::AlreadyInstalled`]；
/// - 调用前若外部已配置 Subscriber，返回 [`Error::SubscriberAlreadySet`]；
/// - 成功后 [`TracingLogger`] 输出的事件立即可见。
pub fn install(options: InstallOptions) -> Result<(), Error> {
    if INSTALL_STATE.get().is_some() {
        return Err(Error::AlreadyInstalled);
    }
    if dispatcher::has_been_set() {
        return Err(Error::SubscriberAlreadySet);
    }

    let subscriber = tracing_subscriber::registry()
        .with(build_env_filter(&options))
        .with(tracing_subscriber::fmt::layer());
    tracing::subscriber::set_global_default(subscriber).map_err(Error::SetGlobalSubscriber)?;

    INSTALL_STATE
        .set(options)
        .map_err(|_| Error::AlreadyInstalled)
}

/// 返回已生效的安装参数；尚未安装时为 `None`。
pub fn installed_options() -> Option<&'static InstallOptions> {
    INSTALL_STATE.get()
}

fn build_env_filter(options: &InstallOptions) -> EnvFilter {
    EnvFilter::try_from_env(options.env_var.as_ref())
        .unwrap_or_else(|_| EnvFilter::new(options.default_directive.as_ref()))
}

/// 以 `tracing` 事件输出 [`LogRecord`] 的日志实现。
///
/// # 逻辑（How）
/// - `tracing` 的事件 target 必须是编译期常量，记录自带的 `target` 以 `record_target` 字段输出；
/// - 结构化字段拼接为 `attributes` 字段，错误以 `error` 字段输出。
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl TracingLogger {
    /// 以 trait 对象形式返回，便于直接注入 `ConfigurableValueBuilder::with_logger`。
    pub fn shared() -> Arc<dyn Logger> {
        Arc::new(Self)
    }
}

macro_rules! emit {
    ($level:expr, $record:expr, $target:expr, $attributes:expr, $error:expr) => {
        tracing::event!(
            $level,
            record_target = $target,
            attributes = %$attributes,
            error = $error,
            "{}",
            $record.message
        )
    };
}

impl Logger for TracingLogger {
    fn log(&self, record: &LogRecord<'_>) {
        let target = record.target.as_deref().unwrap_or("");
        let attributes = Attributes(record.attributes);
        let error = record.error.map(|err| err.to_string());
        let error = error.as_deref();
        match record.severity {
            LogSeverity::Trace => emit!(Level::TRACE, record, target, attributes, error),
            LogSeverity::Debug => emit!(Level::DEBUG, record, target, attributes, error),
            LogSeverity::Info => emit!(Level::INFO, record, target, attributes, error),
            LogSeverity::Warn => emit!(Level::WARN, record, target, attributes, error),
            LogSeverity::Error => emit!(Level::ERROR, record, target, attributes, error),
        }
    }
}

/// 以 `k=v k=v` 形式展示结构化字段。
struct Attributes<'a>(LogField<'a>);

impl fmt::Display for Attributes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (key, value)) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

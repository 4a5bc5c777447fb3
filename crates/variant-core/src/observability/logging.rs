use crate::Error;
use alloc::borrow::Cow;

/// 日志级别枚举，取 OpenTelemetry `SeverityNumber` 与 `tracing` crate 的交集。
///
/// # 契约说明（What）
/// - `Debug` 用于记录每一次成功的变更，`Warn` 用于被拒绝的调用参数。
/// - 日志导出器可依据级别映射到目标系统（如 `tracing::Level`）。
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogSeverity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogSeverity {
    /// 返回稳定的小写名称，便于在纯文本输出中使用。
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// 结构化日志字段集合。
///
/// # 契约说明（What）
/// - 以 `(key, value)` 切片表达，键值需满足低基数原则。
/// - 切片只需在 [`Logger::log`] 返回前保持有效。
pub type LogField<'a> = &'a [(&'a str, &'a str)];

/// 单条结构化日志记录。
///
/// # 逻辑解析（How）
/// - `message` 使用 `Cow<'a, str>`，既支持静态字符串也支持动态构建的消息。
/// - `target` 表示日志分类，对齐 `tracing` 的 Target。
/// - `error` 允许携带实现 [`Error`] 的对象，用于根因追溯。
///
/// # 契约说明（What）
/// - 记录提交给 [`Logger`] 后应视为不可变对象；需要延迟输出的实现必须自行复制字段。
#[derive(Debug)]
pub struct LogRecord<'a> {
    pub message: Cow<'a, str>,
    pub severity: LogSeverity,
    pub target: Option<Cow<'a, str>>,
    pub error: Option<&'a dyn Error>,
    pub attributes: LogField<'a>,
}

impl<'a> LogRecord<'a> {
    /// 构建新的日志记录，仅保存引用，不复制字段。
    pub fn new(
        message: impl Into<Cow<'a, str>>,
        severity: LogSeverity,
        target: Option<impl Into<Cow<'a, str>>>,
        error: Option<&'a dyn Error>,
        attributes: LogField<'a>,
    ) -> Self {
        Self {
            message: message.into(),
            severity,
            target: target.map(Into::into),
            error,
            attributes,
        }
    }

    /// 按键查找结构化字段。
    pub fn attribute(&self, key: &str) -> Option<&'a str> {
        self.attributes
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, value)| *value)
    }
}

/// 日志接口的核心契约。
///
/// # 设计背景（Why）
/// - 核心 crate 保持 `no_std`，不直接依赖 `tracing`；宿主通过实现该 Trait 对接自己的日志后端，
///   标准桥接由 `variant-tracing` 提供。
///
/// # 逻辑解析（How）
/// - `log` 为唯一必需方法；其余便捷方法内部构造 [`LogRecord`] 再调用 `log`，确保所有路径共享相同逻辑。
///
/// # 契约说明（What）
/// - 实现应尽量保证非阻塞：日志在持有可配置值写锁的临界区内也可能被调用。
pub trait Logger: Send + Sync + 'static {
    /// 提交结构化日志。
    fn log(&self, record: &LogRecord<'_>);

    /// 输出带字段与目标的 DEBUG 日志。
    fn debug_with_fields(&self, target: &str, message: &str, attributes: LogField<'_>) {
        let record = LogRecord::new(message, LogSeverity::Debug, Some(target), None, attributes);
        self.log(&record);
    }

    /// 输出带字段与目标的 INFO 日志。
    fn info_with_fields(&self, target: &str, message: &str, attributes: LogField<'_>) {
        let record = LogRecord::new(message, LogSeverity::Info, Some(target), None, attributes);
        self.log(&record);
    }

    /// 输出带字段与目标的 WARN 日志，可附带触发告警的错误。
    fn warn_with_fields(
        &self,
        target: &str,
        message: &str,
        error: Option<&dyn Error>,
        attributes: LogField<'_>,
    ) {
        let record = LogRecord::new(message, LogSeverity::Warn, Some(target), error, attributes);
        self.log(&record);
    }
}

/// 丢弃所有记录的日志实现，作为未注入日志后端时的默认值。
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _record: &LogRecord<'_>) {}
}

//! 可观测性契约：核心 crate 只定义日志接口，具体后端由宿主注入。

mod logging;

pub use logging::{LogField, LogRecord, LogSeverity, Logger, NoopLogger};

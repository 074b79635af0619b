use std::str::FromStr;
use std::time::Instant;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::errors::ConfigError;

/// 日志格式配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 人类可读格式
    Pretty,
    /// JSON 格式
    Json,
    /// 紧凑格式
    Compact,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            other => Err(ConfigError::InvalidLogging(other.to_string())),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: Level,
    /// 输出格式
    pub format: LogFormat,
    /// 是否显示目标模块
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Compact,
            show_target: false,
            show_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    /// 由配置文件中的字符串构造
    pub fn from_strings(level: &str, format: &str) -> Result<Self, ConfigError> {
        let level = Level::from_str(level)
            .map_err(|_| ConfigError::InvalidLogging(level.to_string()))?;
        Ok(Self {
            level,
            format: format.parse()?,
            ..Self::default()
        })
    }

    fn filter(&self) -> EnvFilter {
        // RUST_LOG 优先于配置文件
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.to_string().to_lowercase()))
    }
}

/// 初始化日志系统
///
/// 全局订阅者只能安装一次，重复调用返回错误。
pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = config.filter();
    match config.format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .pretty()
                .with_target(config.show_target)
                .with_thread_ids(config.show_thread_ids)
                .with_writer(std::io::stderr);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_target(config.show_target)
                .with_thread_ids(config.show_thread_ids)
                .with_writer(std::io::stderr);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Compact => {
            let fmt_layer = fmt::layer()
                .compact()
                .with_target(config.show_target)
                .with_thread_ids(config.show_thread_ids)
                .with_writer(std::io::stderr);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()?;
        }
    }

    tracing::debug!(
        level = ?config.level,
        format = ?config.format,
        "Logging system initialized"
    );

    Ok(())
}

/// 操作性能计时器
pub struct OperationTimer {
    start: Instant,
    operation: String,
    finished: bool,
}

impl OperationTimer {
    /// 创建新的计时器
    pub fn new(operation: &str) -> Self {
        Self {
            start: Instant::now(),
            operation: operation.to_string(),
            finished: false,
        }
    }

    /// 完成计时并记录日志
    pub fn finish(mut self) -> std::time::Duration {
        self.finished = true;
        let duration = self.start.elapsed();

        tracing::info!(
            operation = %self.operation,
            duration_ms = duration.as_millis() as u64,
            "Operation completed"
        );
        duration
    }

    /// 获取当前经过时间
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!(
                operation = %self.operation,
                duration_ms = self.start.elapsed().as_millis() as u64,
                "Operation abandoned"
            );
        }
    }
}

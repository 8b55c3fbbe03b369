//! 容器配置
//!
//! 从 TOML 文件加载，环境变量可以覆盖单个配置项：
//!
//! ```toml
//! [container]
//! eager-init = true
//! validate-on-refresh = true
//!
//! [logging]
//! level = "info"
//! format = "compact"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ContainerError, ContainerResult};
use crate::logging::{LogFormat, LogLevel, LoggingConfig};

/// 容器行为配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ContainerProperties {
    /// refresh 时是否预实例化非延迟单例（默认：true）
    pub eager_init: bool,

    /// refresh 时是否先验证依赖图（默认：true）
    pub validate_on_refresh: bool,
}

impl Default for ContainerProperties {
    fn default() -> Self {
        Self {
            eager_init: true,
            validate_on_refresh: true,
        }
    }
}

/// 日志配置项
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingProperties {
    pub level: String,
    pub format: String,
    pub filter: Option<String>,
}

impl Default for LoggingProperties {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
            filter: None,
        }
    }
}

/// 完整配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    pub container: ContainerProperties,
    pub logging: LoggingProperties,
}

impl ContainerSettings {
    /// 从 TOML 字符串解析
    pub fn from_toml_str(content: &str) -> ContainerResult<Self> {
        let settings: Self = toml::from_str(content)
            .map_err(|e| ContainerError::Configuration(format!("Failed to parse TOML: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// 从 TOML 文件加载
    pub fn from_file(path: impl AsRef<Path>) -> ContainerResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ContainerError::Configuration(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        tracing::info!("Loaded container settings from '{}'", path.display());
        Self::from_toml_str(&content)
    }

    /// 从文件加载，文件不存在时使用默认配置
    pub fn from_file_or_default(path: impl AsRef<Path>) -> ContainerResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!("Config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// 用环境变量覆盖配置
    ///
    /// 支持 `{prefix}EAGER_INIT`、`{prefix}VALIDATE_ON_REFRESH`、
    /// `{prefix}LOG_LEVEL`、`{prefix}LOG_FORMAT`
    pub fn apply_env(self, prefix: &str) -> ContainerResult<Self> {
        self.apply_overrides(|key| std::env::var(format!("{}{}", prefix, key)).ok())
    }

    fn apply_overrides<F>(mut self, lookup: F) -> ContainerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("EAGER_INIT") {
            self.container.eager_init = parse_bool("EAGER_INIT", &value)?;
        }
        if let Some(value) = lookup("VALIDATE_ON_REFRESH") {
            self.container.validate_on_refresh = parse_bool("VALIDATE_ON_REFRESH", &value)?;
        }
        if let Some(value) = lookup("LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = lookup("LOG_FORMAT") {
            self.logging.format = value;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> ContainerResult<()> {
        self.logging
            .level
            .parse::<LogLevel>()
            .map_err(ContainerError::Configuration)?;
        self.logging
            .format
            .parse::<LogFormat>()
            .map_err(ContainerError::Configuration)?;
        Ok(())
    }

    /// 转换为日志配置
    pub fn logging_config(&self) -> ContainerResult<LoggingConfig> {
        let mut config = LoggingConfig::new()
            .level(self.logging.level.parse().map_err(ContainerError::Configuration)?)
            .format(self.logging.format.parse().map_err(ContainerError::Configuration)?);
        if let Some(filter) = &self.logging.filter {
            config = config.filter(filter.clone());
        }
        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> ContainerResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(ContainerError::Configuration(format!(
            "Invalid boolean for {}: {}",
            key, value
        ))),
    }
}

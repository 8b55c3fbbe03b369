use thiserror::Error;

use crate::utils::dependency::DependencyValidationError;

/// 容器错误
///
/// 查找、注册、创建和关闭 Bean 时可能出现的所有错误。
/// 用户回调（工厂函数、init/destroy 回调、后置处理器）返回 `anyhow::Result`，
/// 失败时被包装为 [`ContainerError::BeanCreationFailed`]。
#[derive(Debug, Error)]
pub enum ContainerError {
    /// 同名 Bean 定义已存在
    #[error("Bean definition '{0}' already exists")]
    DuplicateDefinition(String),

    /// 没有匹配的 Bean 定义
    #[error("No such bean: {0}")]
    NoSuchBean(String),

    /// 按类型查找时匹配到多个 Bean 定义
    #[error("Ambiguous bean of type '{type_name}': candidates {candidates:?}")]
    AmbiguousBean {
        type_name: String,
        candidates: Vec<String>,
    },

    /// 循环依赖
    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    /// 容器已关闭
    #[error("Container is closed")]
    ContainerClosed,

    /// 按名称查找时类型不匹配
    #[error("Bean '{name}' is of type '{found}', expected '{expected}'")]
    TypeMismatch {
        name: String,
        expected: String,
        found: String,
    },

    /// Bean 创建失败（工厂、后置处理器或 init 回调出错）
    #[error("Failed to create bean '{name}': {source}")]
    BeanCreationFailed {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// 配置错误
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 日志系统初始化失败
    #[error("Failed to initialize logging: {0}")]
    LoggingInitFailed(String),
}

impl ContainerError {
    /// 是否为解析阶段产生的错误
    ///
    /// 这类错误在嵌套解析时原样向上传播，不会被包装为 `BeanCreationFailed`
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            Self::NoSuchBean(_)
                | Self::AmbiguousBean { .. }
                | Self::CircularDependency(_)
                | Self::ContainerClosed
                | Self::TypeMismatch { .. }
        )
    }
}

/// 依赖图验证的结果映射为查找时的同类错误
impl From<DependencyValidationError> for ContainerError {
    fn from(err: DependencyValidationError) -> Self {
        match err {
            DependencyValidationError::CircularDependency { cycle } => {
                Self::CircularDependency(cycle.join(" -> "))
            }
            missing @ DependencyValidationError::MissingDependency { .. } => {
                Self::NoSuchBean(missing.to_string())
            }
        }
    }
}

pub type ContainerResult<T> = std::result::Result<T, ContainerError>;

/// 用户回调使用的结果类型
///
/// 使用 anyhow::Result，通过 .context() 方法添加错误上下文信息。
///
/// # 示例
///
/// ```rust,ignore
/// use anyhow::Context;
///
/// BeanDefinition::of(|_deps| {
///     let conn = connect().context("Failed to open connection")?;
///     Ok(Repository::new(conn))
/// })
/// ```
pub use anyhow::Result;

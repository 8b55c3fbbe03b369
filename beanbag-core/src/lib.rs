// beanbag-core: 依赖注入容器
//
// 提供类型安全的依赖注入功能，支持：
// - 单例和原型作用域
// - 构造函数注入（显式声明依赖）
// - Provider 延迟解析
// - 生命周期管理（init/destroy 回调、BeanPostProcessor）
// - 循环依赖检测

pub mod bean;
pub mod bean_factory;
pub mod config;
pub mod context;
pub mod error;
pub mod injection;
pub mod lifecycle;
pub mod logging;
pub mod provider;
pub mod scope;
pub mod utils;

// 重新导出常用类型
pub use bean::{BeanDefinition, BeanInstance, Dependency, FunctionFactory, ObjectFactory};
pub use bean_factory::{
    BeanFactory, BeanFactoryExt, ConfigurableBeanFactory, ConfigurableListableBeanFactory,
    DefaultListableBeanFactory, ListableBeanFactory,
};
pub use config::{ContainerProperties, ContainerSettings, LoggingProperties};
pub use context::{ApplicationContext, ApplicationContextBuilder, Container, ShutdownHook};
pub use error::{ContainerError, ContainerResult};
pub use injection::Dependencies;
pub use lifecycle::{BeanPostProcessor, Lifecycle};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use provider::ObjectProvider;
pub use scope::Scope;

/// Prelude 模块，包含常用的 traits 和类型
pub mod prelude {
    pub use crate::bean::{BeanDefinition, Dependency};
    pub use crate::config::ContainerSettings;
    pub use crate::context::{ApplicationContext, Container};
    pub use crate::error::{ContainerError, ContainerResult};
    pub use crate::injection::Dependencies;
    pub use crate::lifecycle::{BeanPostProcessor, Lifecycle};
    pub use crate::logging::{LogFormat, LogLevel, LoggingConfig};
    pub use crate::provider::ObjectProvider;
    pub use crate::scope::Scope;
    // Re-export anyhow for convenience
    pub use anyhow::{anyhow, Context};
}

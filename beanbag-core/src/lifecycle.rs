//! 生命周期扩展点
//!
//! - [`Lifecycle`]：Bean 自身的 init/destroy 回调（类似 @PostConstruct / @PreDestroy）
//! - [`BeanPostProcessor`]：容器级别的钩子，在每个新实例 init 前后调用

use std::any::Any;

use crate::error::Result;

/// 生命周期管理 trait
///
/// 通过 [`BeanDefinition::with_lifecycle`](crate::BeanDefinition::with_lifecycle)
/// 将实现注册为 Bean 的 init/destroy 回调。
pub trait Lifecycle: Any + Send + Sync {
    /// 初始化回调
    /// 在 Bean 创建并注入所有依赖后、返回给调用方之前调用
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// 销毁回调
    /// 在容器关闭时调用，仅对单例有效
    fn destroy(&self) -> Result<()> {
        Ok(())
    }
}

/// BeanPostProcessor trait
///
/// 在 Bean 初始化的不同阶段提供钩子，适用于审计、校验、统一配置等场景。
/// 每个新创建的实例（包括原型实例）都会经过所有已注册的处理器。
///
/// # 示例
///
/// ```rust
/// use std::any::Any;
/// use beanbag_core::BeanPostProcessor;
///
/// struct LoggingBeanPostProcessor;
///
/// impl BeanPostProcessor for LoggingBeanPostProcessor {
///     fn post_process_after_initialization(
///         &self,
///         _bean: &mut dyn Any,
///         bean_name: &str,
///     ) -> anyhow::Result<()> {
///         tracing::info!("After initialization: {}", bean_name);
///         Ok(())
///     }
/// }
/// ```
pub trait BeanPostProcessor: Send + Sync {
    /// 在 Bean 初始化回调（init）之前调用
    fn post_process_before_initialization(
        &self,
        _bean: &mut dyn Any,
        _bean_name: &str,
    ) -> Result<()> {
        Ok(())
    }

    /// 在 Bean 初始化回调（init）之后调用
    fn post_process_after_initialization(
        &self,
        _bean: &mut dyn Any,
        _bean_name: &str,
    ) -> Result<()> {
        Ok(())
    }

    /// 获取处理器的名称（用于日志和调试）
    fn name(&self) -> &str {
        "BeanPostProcessor"
    }

    /// 获取处理器的优先级（数字越小优先级越高）
    ///
    /// 默认为 1000
    fn order(&self) -> i32 {
        1000
    }
}

//! 作用域演示
//!
//! - [`scope`]：单例 / 原型 Bean 的生命周期，以及通过 Provider 在单例里获取新的原型实例
//! - [`singleton`]：单例里保存调用级状态导致的共享状态问题，以及无状态写法

pub mod scope;
pub mod singleton;

use beanbag_core::{ApplicationContext, ContainerResult};

/// 注册演示用到的所有 Bean
pub fn register_demo_beans(context: &ApplicationContext) -> ContainerResult<()> {
    scope::register_scope_beans(context)?;
    singleton::register_order_services(context)?;
    Ok(())
}

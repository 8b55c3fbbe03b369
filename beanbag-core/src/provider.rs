//! ObjectProvider - 延迟解析的 Bean 句柄
//!
//! 单例持有原型依赖时，如果在注入时直接拿实例，这个实例会被单例永久复用，
//! 原型作用域就失去了意义。持有 Provider，每次调用 `get()` 时再解析，
//! 原型 Bean 每次都是新实例。

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};

use crate::bean_factory::{BeanFactoryExt, DefaultListableBeanFactory};
use crate::error::{ContainerError, ContainerResult};

/// 延迟解析的 Bean 句柄
///
/// 只持有容器的弱引用：单例持有 Provider 不会让容器无法释放。
/// 容器关闭或被释放后，`get()` 返回 [`ContainerError::ContainerClosed`]。
pub struct ObjectProvider<T> {
    factory: Weak<DefaultListableBeanFactory>,
    name: Option<String>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> ObjectProvider<T> {
    pub(crate) fn new(factory: Weak<DefaultListableBeanFactory>, name: Option<String>) -> Self {
        Self {
            factory,
            name,
            _phantom: PhantomData,
        }
    }

    /// 解析 Bean，语义与 `get_bean_by_type` / `get_bean_by_name` 相同
    pub fn get(&self) -> ContainerResult<Arc<T>> {
        let factory = self.factory.upgrade().ok_or(ContainerError::ContainerClosed)?;
        match &self.name {
            Some(name) => factory.get_bean_by_name::<T>(name),
            None => factory.get_bean_by_type::<T>(),
        }
    }

    /// 解析 Bean，任何错误都返回 `None`
    pub fn get_if_available(&self) -> Option<Arc<T>> {
        match self.get() {
            Ok(bean) => Some(bean),
            Err(e) => {
                tracing::debug!("Provider for '{}' unavailable: {}", std::any::type_name::<T>(), e);
                None
            }
        }
    }

    /// 绑定的 Bean 名称（按类型解析时为 `None`）
    pub fn bean_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl<T> Clone for ObjectProvider<T> {
    fn clone(&self) -> Self {
        Self {
            factory: self.factory.clone(),
            name: self.name.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ObjectProvider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectProvider")
            .field("type_name", &std::any::type_name::<T>())
            .field("name", &self.name)
            .finish()
    }
}

//! 构造函数注入
//!
//! 容器在调用工厂之前按声明顺序解析所有依赖，工厂通过 [`Dependencies`] 读取

use std::any::Any;
use std::sync::{Arc, Weak};

use crate::bean::BeanInstance;
use crate::bean_factory::DefaultListableBeanFactory;
use crate::error::{ContainerError, ContainerResult};
use crate::provider::ObjectProvider;

/// 已解析的依赖
pub(crate) struct ResolvedDependency {
    pub(crate) name: String,
    pub(crate) bean: BeanInstance,
}

/// 传给工厂函数的依赖集合
pub struct Dependencies {
    bean_name: String,
    resolved: Vec<ResolvedDependency>,
    factory: Weak<DefaultListableBeanFactory>,
}

impl Dependencies {
    pub(crate) fn new(
        bean_name: impl Into<String>,
        resolved: Vec<ResolvedDependency>,
        factory: Weak<DefaultListableBeanFactory>,
    ) -> Self {
        Self {
            bean_name: bean_name.into(),
            resolved,
            factory,
        }
    }

    /// 正在创建的 Bean 名称
    pub fn bean_name(&self) -> &str {
        &self.bean_name
    }

    /// 按类型读取依赖
    ///
    /// 在已声明的依赖中查找类型为 `T` 的实例
    pub fn get<T: Any + Send + Sync>(&self) -> ContainerResult<Arc<T>> {
        let mut matches = self
            .resolved
            .iter()
            .filter(|resolved| resolved.bean.is::<T>())
            .collect::<Vec<_>>();

        match matches.len() {
            0 => Err(ContainerError::NoSuchBean(format!(
                "'{}' declares no dependency of type '{}'",
                self.bean_name,
                std::any::type_name::<T>()
            ))),
            1 => {
                let resolved = matches.remove(0);
                downcast(resolved)
            }
            _ => Err(ContainerError::AmbiguousBean {
                type_name: std::any::type_name::<T>().to_string(),
                candidates: matches.iter().map(|r| r.name.clone()).collect(),
            }),
        }
    }

    /// 按名称读取依赖
    pub fn get_named<T: Any + Send + Sync>(&self, name: &str) -> ContainerResult<Arc<T>> {
        let resolved = self
            .resolved
            .iter()
            .find(|resolved| resolved.name == name)
            .ok_or_else(|| {
                ContainerError::NoSuchBean(format!(
                    "'{}' declares no dependency named '{}'",
                    self.bean_name, name
                ))
            })?;
        downcast(resolved)
    }

    /// 获取延迟解析的 Provider
    ///
    /// Provider 不需要声明为依赖，它在每次 `get()` 时才解析
    pub fn provider<T: Any + Send + Sync>(&self) -> ObjectProvider<T> {
        ObjectProvider::new(self.factory.clone(), None)
    }

    /// 获取按名称解析的 Provider
    pub fn named_provider<T: Any + Send + Sync>(&self, name: impl Into<String>) -> ObjectProvider<T> {
        ObjectProvider::new(self.factory.clone(), Some(name.into()))
    }
}

fn downcast<T: Any + Send + Sync>(resolved: &ResolvedDependency) -> ContainerResult<Arc<T>> {
    Arc::clone(&resolved.bean)
        .downcast::<T>()
        .map_err(|_| ContainerError::TypeMismatch {
            name: resolved.name.clone(),
            expected: std::any::type_name::<T>().to_string(),
            found: "unknown".to_string(),
        })
}

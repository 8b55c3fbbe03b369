//! Bean Factory - 核心容器接口
//!
//! 参考 Spring 的 BeanFactory 架构设计

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

use parking_lot::{Mutex, ReentrantMutex, RwLock};

use crate::{
    bean::{BeanDefinition, BeanInstance, Dependency},
    error::{ContainerError, ContainerResult},
    injection::{Dependencies, ResolvedDependency},
    lifecycle::BeanPostProcessor,
    provider::ObjectProvider,
    utils::dependency::CreationChain,
    Scope,
};

/// BeanFactory - 最基础的容器接口
///
/// 提供基本的 Bean 访问功能，类似 Spring 的 BeanFactory
///
/// 注意：此 trait 不包含泛型方法，因此可以作为 trait object 使用
pub trait BeanFactory: Send + Sync {
    /// 通过名称获取 Bean
    fn get_bean(&self, name: &str) -> ContainerResult<BeanInstance>;

    /// 检查是否包含指定名称的 Bean
    fn contains_bean(&self, name: &str) -> bool;

    /// 指定名称的 Bean 是否为单例
    fn is_singleton(&self, name: &str) -> ContainerResult<bool>;

    /// 指定名称的 Bean 是否为原型
    fn is_prototype(&self, name: &str) -> ContainerResult<bool>;
}

/// BeanFactoryExt - BeanFactory 的扩展 trait
///
/// 提供泛型方法，不能作为 trait object 使用
pub trait BeanFactoryExt: BeanFactory {
    /// 通过类型获取 Bean
    fn get_bean_by_type<T: Any + Send + Sync>(&self) -> ContainerResult<Arc<T>>;

    /// 通过名称和类型获取 Bean
    fn get_bean_by_name<T: Any + Send + Sync>(&self, name: &str) -> ContainerResult<Arc<T>>;

    /// 检查是否包含指定类型的 Bean
    fn contains_bean_by_type<T: Any + Send + Sync>(&self) -> bool;

    /// 获取按类型解析的 Provider
    fn get_provider<T: Any + Send + Sync>(&self) -> ObjectProvider<T>;

    /// 获取按名称解析的 Provider
    fn get_named_provider<T: Any + Send + Sync>(&self, name: &str) -> ObjectProvider<T>;
}

/// ListableBeanFactory - 可列举的 Bean 工厂
///
/// 扩展 BeanFactory，提供列举所有 Bean 的能力
pub trait ListableBeanFactory: BeanFactory {
    /// 获取所有 Bean 的名称（按注册顺序）
    fn get_bean_names(&self) -> Vec<String>;

    /// 获取指定类型的所有 Bean 名称
    fn get_bean_names_for_type(&self, type_id: TypeId) -> Vec<String>;

    /// 获取 Bean 定义的数量
    fn get_bean_definition_count(&self) -> usize;
}

/// ConfigurableBeanFactory - 可配置的 Bean 工厂
///
/// 提供配置和管理 Bean 工厂的能力
pub trait ConfigurableBeanFactory: BeanFactory {
    /// 注册 Bean 定义
    fn register_bean_definition(&self, definition: BeanDefinition) -> ContainerResult<()>;

    /// 检查是否包含指定的 Bean 定义
    fn contains_bean_definition(&self, name: &str) -> bool;

    /// 获取单个 Bean 定义
    fn get_bean_definition(&self, name: &str) -> ContainerResult<BeanDefinition>;

    /// 添加 BeanPostProcessor
    fn add_bean_post_processor(&self, processor: Arc<dyn BeanPostProcessor>);

    /// 获取所有 BeanPostProcessor
    fn get_bean_post_processors(&self) -> Vec<Arc<dyn BeanPostProcessor>>;
}

/// ConfigurableListableBeanFactory - 可配置且可列举的 Bean 工厂
///
/// 结合了 ListableBeanFactory 和 ConfigurableBeanFactory 的功能
pub trait ConfigurableListableBeanFactory: ListableBeanFactory + ConfigurableBeanFactory {
    /// 预实例化所有非延迟单例 Bean
    fn preinstantiate_singletons(&self) -> ContainerResult<()>;

    /// 关闭工厂：销毁所有单例 Bean（调用 destroy 回调），之后拒绝所有查找
    fn close(&self);

    /// 是否已关闭
    fn is_closed(&self) -> bool;

    /// 获取依赖图（Bean 名称 -> 依赖的 Bean 名称，用于依赖验证）
    fn get_dependency_graph(&self) -> HashMap<String, Vec<String>>;
}

/// DefaultListableBeanFactory - ConfigurableListableBeanFactory 的默认实现
///
/// 这是实际的 Bean 容器实现，类似 Spring 的 DefaultListableBeanFactory
pub struct DefaultListableBeanFactory {
    /// 自身的弱引用，用于创建 Provider
    self_ref: Weak<DefaultListableBeanFactory>,

    /// Bean 定义存储
    definitions: RwLock<HashMap<String, BeanDefinition>>,

    /// 注册顺序
    definition_names: RwLock<Vec<String>>,

    /// 类型到名称的映射（一个类型可以有多个定义）
    type_to_names: RwLock<HashMap<TypeId, Vec<String>>>,

    /// 单例 Bean 缓存
    singletons: RwLock<HashMap<String, BeanInstance>>,

    /// 单例创建顺序，销毁时逆序
    singleton_order: Mutex<Vec<String>>,

    /// 单例创建锁（可重入，递归解析依赖时同一线程可再次获取）
    creation_lock: ReentrantMutex<()>,

    /// 每个线程正在创建的 Bean 链，用于循环依赖检测
    ///
    /// 工厂函数里通过 Provider 发起的查找也在同一线程上，同样能检测到循环
    creation_chains: Mutex<HashMap<ThreadId, CreationChain>>,

    /// Bean 后置处理器列表（按优先级排序）
    bean_post_processors: RwLock<Vec<Arc<dyn BeanPostProcessor>>>,

    /// 是否已关闭
    closed: AtomicBool,
}

impl DefaultListableBeanFactory {
    /// 创建新的 Bean 工厂
    ///
    /// 工厂总是以 `Arc` 持有，Provider 通过弱引用回到工厂
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            self_ref: self_ref.clone(),
            definitions: RwLock::new(HashMap::new()),
            definition_names: RwLock::new(Vec::new()),
            type_to_names: RwLock::new(HashMap::new()),
            singletons: RwLock::new(HashMap::new()),
            singleton_order: Mutex::new(Vec::new()),
            creation_lock: ReentrantMutex::new(()),
            creation_chains: Mutex::new(HashMap::new()),
            bean_post_processors: RwLock::new(Vec::new()),
            closed: AtomicBool::new(false),
        })
    }

    /// 当前已缓存的单例数量
    pub fn singleton_count(&self) -> usize {
        self.singletons.read().len()
    }

    /// 指定单例是否已创建
    pub fn contains_singleton(&self, name: &str) -> bool {
        self.singletons.read().contains_key(name)
    }

    fn ensure_open(&self) -> ContainerResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ContainerError::ContainerClosed);
        }
        Ok(())
    }

    fn definition(&self, name: &str) -> ContainerResult<BeanDefinition> {
        self.definitions.read().get(name).cloned().ok_or_else(|| {
            tracing::debug!("Bean '{}' not found in container", name);
            ContainerError::NoSuchBean(format!("no bean named '{}'", name))
        })
    }

    /// 按类型找到唯一的 Bean 名称
    fn resolve_name_for_type(
        &self,
        type_id: TypeId,
        type_name: &str,
    ) -> ContainerResult<String> {
        let type_to_names = self.type_to_names.read();
        let names = type_to_names.get(&type_id).map(Vec::as_slice).unwrap_or(&[]);

        match names {
            [] => Err(ContainerError::NoSuchBean(format!(
                "no bean of type '{}'",
                type_name
            ))),
            [name] => Ok(name.clone()),
            _ => Err(ContainerError::AmbiguousBean {
                type_name: type_name.to_string(),
                candidates: names.to_vec(),
            }),
        }
    }

    fn do_get_bean(&self, name: &str) -> ContainerResult<BeanInstance> {
        self.ensure_open()?;
        tracing::trace!("Requesting bean: '{}'", name);

        let definition = self.definition(name)?;

        match definition.scope {
            Scope::Singleton => {
                if let Some(bean) = self.singletons.read().get(name) {
                    tracing::debug!("Returning cached instance of singleton bean '{}'", name);
                    return Ok(Arc::clone(bean));
                }

                let _creation = self.creation_lock.lock();

                // 等锁期间可能已被其他线程创建，或者容器已被关闭
                if let Some(bean) = self.singletons.read().get(name) {
                    tracing::debug!("Singleton bean '{}' was created concurrently", name);
                    return Ok(Arc::clone(bean));
                }
                self.ensure_open()?;

                tracing::info!("Creating shared instance of singleton bean '{}'", name);
                let bean = self.create_bean(&definition)?;

                self.singletons
                    .write()
                    .insert(name.to_string(), Arc::clone(&bean));
                self.singleton_order.lock().push(name.to_string());

                tracing::debug!("Singleton bean '{}' created and cached", name);
                Ok(bean)
            }
            Scope::Prototype => {
                tracing::debug!("Creating new instance of prototype bean '{}'", name);
                self.create_bean(&definition)
            }
        }
    }

    fn create_bean(&self, definition: &BeanDefinition) -> ContainerResult<BeanInstance> {
        let name = definition.name.as_str();
        self.enter_creation(name)?;

        let result = self.instantiate(definition);
        self.exit_creation(name);
        result
    }

    fn enter_creation(&self, name: &str) -> ContainerResult<()> {
        self.creation_chains
            .lock()
            .entry(thread::current().id())
            .or_default()
            .enter(name)
            .map_err(|cycle| {
                tracing::warn!("Circular dependency detected: {}", cycle);
                ContainerError::CircularDependency(cycle)
            })
    }

    fn exit_creation(&self, name: &str) {
        let thread_id = thread::current().id();
        let mut chains = self.creation_chains.lock();
        if let Some(chain) = chains.get_mut(&thread_id) {
            chain.exit(name);
            if chain.current().is_empty() {
                chains.remove(&thread_id);
            }
        }
    }

    /// 创建 Bean 实例并调用生命周期回调
    ///
    /// # Bean 生命周期顺序
    /// 1. 解析声明的依赖
    /// 2. 实例化（工厂函数，依赖通过参数传入）
    /// 3. BeanPostProcessor.post_process_before_initialization
    /// 4. init 回调
    /// 5. BeanPostProcessor.post_process_after_initialization
    ///
    /// 任何一步失败都不会留下部分创建的实例
    fn instantiate(&self, definition: &BeanDefinition) -> ContainerResult<BeanInstance> {
        let name = definition.name.as_str();

        // 1. 解析依赖
        let mut resolved = Vec::with_capacity(definition.dependencies.len());
        for dependency in &definition.dependencies {
            let dependency_name = match dependency {
                Dependency::Named(dependency_name) => dependency_name.clone(),
                Dependency::Typed { type_id, type_name } => {
                    self.resolve_name_for_type(*type_id, type_name)?
                }
            };
            tracing::trace!("Resolving dependency {} of '{}'", dependency, name);
            let bean = self.do_get_bean(&dependency_name)?;
            resolved.push(ResolvedDependency {
                name: dependency_name,
                bean,
            });
        }
        let deps = Dependencies::new(name, resolved, self.self_ref.clone());

        // 2. 实例化
        let mut instance = definition
            .factory
            .create(&deps)
            .map_err(|e| creation_error(name, e))?;

        let processors = self.get_bean_post_processors();

        // 3. postProcessBeforeInitialization
        for processor in &processors {
            processor
                .post_process_before_initialization(&mut *instance, name)
                .map_err(|e| creation_error(name, e.context(format!("{} failed", processor.name()))))?;
        }

        // 4. init 回调
        if let Some(init_fn) = &definition.init_callback {
            init_fn(&mut *instance).map_err(|e| creation_error(name, e.context("init failed")))?;
            tracing::debug!("Init callback of bean '{}' completed", name);
        }

        // 5. postProcessAfterInitialization
        for processor in &processors {
            processor
                .post_process_after_initialization(&mut *instance, name)
                .map_err(|e| creation_error(name, e.context(format!("{} failed", processor.name()))))?;
        }

        Ok(Arc::from(instance))
    }

    /// 逆创建顺序销毁所有单例
    fn destroy_singletons(&self) {
        // 等待进行中的单例创建结束
        let _creation = self.creation_lock.lock();

        let order = std::mem::take(&mut *self.singleton_order.lock());
        let mut singletons = std::mem::take(&mut *self.singletons.write());

        tracing::info!("Destroying {} singleton bean(s)", order.len());

        for name in order.iter().rev() {
            let Some(bean) = singletons.remove(name) else {
                continue;
            };

            let destroy_fn = self
                .definitions
                .read()
                .get(name)
                .and_then(|definition| definition.destroy_callback.clone());

            if let Some(destroy_fn) = destroy_fn {
                match destroy_fn(&*bean) {
                    Ok(()) => tracing::debug!("Bean '{}' destroyed successfully", name),
                    Err(e) => tracing::warn!("Failed to destroy bean '{}': {:#}", name, e),
                }
            }
        }

        tracing::info!("Singleton beans destruction completed");
    }
}

/// 把用户回调的错误转换为容器错误
///
/// 嵌套解析产生的容器错误（循环依赖、找不到 Bean 等）原样传播
fn creation_error(name: &str, err: anyhow::Error) -> ContainerError {
    match err.downcast::<ContainerError>() {
        Ok(inner) if inner.is_resolution_error() => inner,
        Ok(inner) => ContainerError::BeanCreationFailed {
            name: name.to_string(),
            source: inner.into(),
        },
        Err(err) => ContainerError::BeanCreationFailed {
            name: name.to_string(),
            source: err,
        },
    }
}

impl BeanFactory for DefaultListableBeanFactory {
    fn get_bean(&self, name: &str) -> ContainerResult<BeanInstance> {
        self.do_get_bean(name)
    }

    fn contains_bean(&self, name: &str) -> bool {
        self.definitions.read().contains_key(name)
    }

    fn is_singleton(&self, name: &str) -> ContainerResult<bool> {
        Ok(self.definition(name)?.scope == Scope::Singleton)
    }

    fn is_prototype(&self, name: &str) -> ContainerResult<bool> {
        Ok(self.definition(name)?.scope == Scope::Prototype)
    }
}

impl BeanFactoryExt for DefaultListableBeanFactory {
    fn get_bean_by_type<T: Any + Send + Sync>(&self) -> ContainerResult<Arc<T>> {
        self.ensure_open()?;
        let type_name = std::any::type_name::<T>();
        let name = self.resolve_name_for_type(TypeId::of::<T>(), type_name)?;

        self.get_bean(&name)?
            .downcast::<T>()
            .map_err(|_| ContainerError::TypeMismatch {
                name,
                expected: type_name.to_string(),
                found: "unknown".to_string(),
            })
    }

    fn get_bean_by_name<T: Any + Send + Sync>(&self, name: &str) -> ContainerResult<Arc<T>> {
        self.ensure_open()?;
        let type_name = std::any::type_name::<T>();

        // 先检查类型，避免为一次失败的查找创建实例
        let definition = self.definition(name)?;
        if definition.bean_type_id() != TypeId::of::<T>() {
            return Err(ContainerError::TypeMismatch {
                name: name.to_string(),
                expected: type_name.to_string(),
                found: definition.bean_type_name().to_string(),
            });
        }

        self.get_bean(name)?
            .downcast::<T>()
            .map_err(|_| ContainerError::TypeMismatch {
                name: name.to_string(),
                expected: type_name.to_string(),
                found: definition.bean_type_name().to_string(),
            })
    }

    fn contains_bean_by_type<T: Any + Send + Sync>(&self) -> bool {
        self.type_to_names
            .read()
            .get(&TypeId::of::<T>())
            .is_some_and(|names| !names.is_empty())
    }

    fn get_provider<T: Any + Send + Sync>(&self) -> ObjectProvider<T> {
        ObjectProvider::new(self.self_ref.clone(), None)
    }

    fn get_named_provider<T: Any + Send + Sync>(&self, name: &str) -> ObjectProvider<T> {
        ObjectProvider::new(self.self_ref.clone(), Some(name.to_string()))
    }
}

impl ListableBeanFactory for DefaultListableBeanFactory {
    fn get_bean_names(&self) -> Vec<String> {
        self.definition_names.read().clone()
    }

    fn get_bean_names_for_type(&self, type_id: TypeId) -> Vec<String> {
        self.type_to_names
            .read()
            .get(&type_id)
            .cloned()
            .unwrap_or_default()
    }

    fn get_bean_definition_count(&self) -> usize {
        self.definitions.read().len()
    }
}

impl ConfigurableBeanFactory for DefaultListableBeanFactory {
    fn register_bean_definition(&self, definition: BeanDefinition) -> ContainerResult<()> {
        self.ensure_open()?;

        let name = definition.name.clone();
        let type_id = definition.bean_type_id();

        tracing::trace!(
            "Attempting to register bean: name='{}', type='{}', scope={}",
            name,
            definition.bean_type_name(),
            definition.scope
        );

        {
            let mut definitions = self.definitions.write();
            if definitions.contains_key(&name) {
                tracing::warn!("Bean '{}' already exists, registration failed", name);
                return Err(ContainerError::DuplicateDefinition(name));
            }
            definitions.insert(name.clone(), definition);
        }

        self.definition_names.write().push(name.clone());
        self.type_to_names
            .write()
            .entry(type_id)
            .or_default()
            .push(name.clone());

        tracing::debug!("Bean definition registered successfully: '{}'", name);
        Ok(())
    }

    fn contains_bean_definition(&self, name: &str) -> bool {
        self.definitions.read().contains_key(name)
    }

    fn get_bean_definition(&self, name: &str) -> ContainerResult<BeanDefinition> {
        self.definition(name)
    }

    fn add_bean_post_processor(&self, processor: Arc<dyn BeanPostProcessor>) {
        let mut processors = self.bean_post_processors.write();
        tracing::debug!("Registered BeanPostProcessor '{}'", processor.name());
        processors.push(processor);

        // 按优先级排序（order 值越小优先级越高）
        processors.sort_by_key(|p| p.order());
    }

    fn get_bean_post_processors(&self) -> Vec<Arc<dyn BeanPostProcessor>> {
        self.bean_post_processors.read().clone()
    }
}

impl ConfigurableListableBeanFactory for DefaultListableBeanFactory {
    fn preinstantiate_singletons(&self) -> ContainerResult<()> {
        let bean_names: Vec<String> = {
            let definitions = self.definitions.read();
            self.definition_names
                .read()
                .iter()
                .filter(|name| {
                    definitions
                        .get(*name)
                        .is_some_and(|def| def.scope == Scope::Singleton && !def.lazy)
                })
                .cloned()
                .collect()
        };

        tracing::debug!("Pre-instantiating {} singleton beans", bean_names.len());

        for name in bean_names {
            self.get_bean(&name)?;
        }

        Ok(())
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!("Bean factory already closed");
            return;
        }
        self.destroy_singletons();
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn get_dependency_graph(&self) -> HashMap<String, Vec<String>> {
        let definitions = self.definitions.read();
        let type_to_names = self.type_to_names.read();

        definitions
            .iter()
            .map(|(name, definition)| {
                let dependencies = definition
                    .dependencies
                    .iter()
                    .flat_map(|dependency| match dependency {
                        Dependency::Named(dependency_name) => vec![dependency_name.clone()],
                        // 按类型的依赖没有匹配时用类型名占位，验证时报告为缺失
                        Dependency::Typed { type_id, type_name } => type_to_names
                            .get(type_id)
                            .filter(|names| !names.is_empty())
                            .cloned()
                            .unwrap_or_else(|| vec![type_name.to_string()]),
                    })
                    .collect();
                (name.clone(), dependencies)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug)]
    struct Repository {
        url: String,
    }

    struct Service {
        repository: Arc<Repository>,
    }

    struct Counter {
        count: u32,
    }

    fn repository_definition() -> BeanDefinition {
        BeanDefinition::of(|_| {
            Ok(Repository {
                url: "mem://".to_string(),
            })
        })
    }

    #[test]
    fn test_singleton_identity_and_single_init() {
        let factory = DefaultListableBeanFactory::new();
        let inits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&inits);

        factory
            .register_bean_definition(repository_definition().with_init(move |_: &mut Repository| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }))
            .unwrap();

        let first = factory.get_bean_by_type::<Repository>().unwrap();
        let second = factory.get_bean_by_type::<Repository>().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(inits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_prototype_returns_new_instances() {
        let factory = DefaultListableBeanFactory::new();
        factory
            .register_bean_definition(
                BeanDefinition::of(|_| Ok(Counter { count: 0 })).with_scope(Scope::Prototype),
            )
            .unwrap();

        let first = factory.get_bean_by_type::<Counter>().unwrap();
        let second = factory.get_bean_by_type::<Counter>().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.count, 0);
        assert_eq!(second.count, 0);
        assert!(!factory.contains_singleton("counter"));
    }

    #[test]
    fn test_dependency_injection_by_type() {
        let factory = DefaultListableBeanFactory::new();
        factory.register_bean_definition(repository_definition()).unwrap();
        factory
            .register_bean_definition(
                BeanDefinition::of(|deps| {
                    Ok(Service {
                        repository: deps.get::<Repository>()?,
                    })
                })
                .depends_on_type::<Repository>(),
            )
            .unwrap();

        let service = factory.get_bean_by_type::<Service>().unwrap();
        let repository = factory.get_bean_by_type::<Repository>().unwrap();

        assert!(Arc::ptr_eq(&service.repository, &repository));
        assert_eq!(service.repository.url, "mem://");
    }

    #[test]
    fn test_duplicate_definition() {
        let factory = DefaultListableBeanFactory::new();
        factory.register_bean_definition(repository_definition()).unwrap();

        let result = factory.register_bean_definition(repository_definition());
        assert!(matches!(result, Err(ContainerError::DuplicateDefinition(name)) if name == "repository"));
    }

    #[test]
    fn test_no_such_bean_and_ambiguous_bean() {
        let factory = DefaultListableBeanFactory::new();
        assert!(matches!(
            factory.get_bean_by_type::<Repository>(),
            Err(ContainerError::NoSuchBean(_))
        ));
        assert!(matches!(factory.get_bean("missing"), Err(ContainerError::NoSuchBean(_))));

        factory
            .register_bean_definition(repository_definition().named("primaryRepository"))
            .unwrap();
        factory
            .register_bean_definition(repository_definition().named("replicaRepository"))
            .unwrap();

        match factory.get_bean_by_type::<Repository>() {
            Err(ContainerError::AmbiguousBean { candidates, .. }) => {
                assert_eq!(candidates, vec!["primaryRepository", "replicaRepository"]);
            }
            other => panic!("Expected AmbiguousBean, got {:?}", other.map(|_| ())),
        }

        let replica = factory
            .get_bean_by_name::<Repository>("replicaRepository")
            .unwrap();
        assert_eq!(replica.url, "mem://");
    }

    #[test]
    fn test_get_bean_by_name_type_mismatch() {
        let factory = DefaultListableBeanFactory::new();
        factory.register_bean_definition(repository_definition()).unwrap();

        let result = factory.get_bean_by_name::<Counter>("repository");
        assert!(matches!(result, Err(ContainerError::TypeMismatch { .. })));
        assert!(!factory.contains_singleton("repository"));
    }

    #[test]
    fn test_circular_dependency_is_rejected() {
        struct A;
        struct B;

        let factory = DefaultListableBeanFactory::new();
        factory
            .register_bean_definition(BeanDefinition::of(|_| Ok(A)).named("a").depends_on("b"))
            .unwrap();
        factory
            .register_bean_definition(BeanDefinition::of(|_| Ok(B)).named("b").depends_on("a"))
            .unwrap();

        match factory.get_bean("a") {
            Err(ContainerError::CircularDependency(chain)) => assert_eq!(chain, "a -> b -> a"),
            other => panic!("Expected CircularDependency, got {:?}", other.map(|_| ())),
        }
        assert_eq!(factory.singleton_count(), 0);
    }

    #[test]
    fn test_prototype_self_dependency_is_rejected() {
        let factory = DefaultListableBeanFactory::new();
        factory
            .register_bean_definition(
                BeanDefinition::of(|_| Ok(Counter { count: 0 }))
                    .with_scope(Scope::Prototype)
                    .depends_on("counter"),
            )
            .unwrap();

        match factory.get_bean("counter") {
            Err(ContainerError::CircularDependency(chain)) => {
                assert_eq!(chain, "counter -> counter")
            }
            other => panic!("Expected CircularDependency, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_provider_cycle_on_self_is_rejected() {
        struct SelfReferencing;

        for scope in [Scope::Singleton, Scope::Prototype] {
            let factory = DefaultListableBeanFactory::new();
            factory
                .register_bean_definition(
                    BeanDefinition::of(|deps| {
                        deps.provider::<SelfReferencing>().get()?;
                        Ok(SelfReferencing)
                    })
                    .with_scope(scope),
                )
                .unwrap();

            match factory.get_bean_by_type::<SelfReferencing>() {
                Err(ContainerError::CircularDependency(chain)) => {
                    assert_eq!(chain, "selfReferencing -> selfReferencing")
                }
                other => panic!("Expected CircularDependency for {}, got {:?}", scope, other.map(|_| ())),
            }
            assert_eq!(factory.singleton_count(), 0);
        }
    }

    #[test]
    fn test_provider_cycle_through_other_bean_is_rejected() {
        struct Left;
        struct Right {
            _left: Arc<Left>,
        }

        let factory = DefaultListableBeanFactory::new();
        factory
            .register_bean_definition(BeanDefinition::of(|deps| {
                deps.provider::<Right>().get()?;
                Ok(Left)
            }))
            .unwrap();
        factory
            .register_bean_definition(
                BeanDefinition::of(|deps| {
                    Ok(Right {
                        _left: deps.get::<Left>()?,
                    })
                })
                .depends_on_type::<Left>(),
            )
            .unwrap();

        // 第二次查找得到同样的结果：失败后创建链已清空
        for _ in 0..2 {
            match factory.get_bean_by_type::<Left>() {
                Err(ContainerError::CircularDependency(chain)) => {
                    assert_eq!(chain, "left -> right -> left")
                }
                other => panic!("Expected CircularDependency, got {:?}", other.map(|_| ())),
            }
        }
        assert_eq!(factory.singleton_count(), 0);
    }

    #[test]
    fn test_concurrent_prototype_creation_is_not_a_cycle() {
        let factory = DefaultListableBeanFactory::new();
        factory
            .register_bean_definition(
                BeanDefinition::of(|_| {
                    std::thread::sleep(std::time::Duration::from_millis(10));
                    Ok(Counter { count: 0 })
                })
                .with_scope(Scope::Prototype),
            )
            .unwrap();

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| factory.get_bean_by_type::<Counter>()))
                .collect();
            for handle in handles {
                assert!(handle.join().unwrap().is_ok());
            }
        });
    }

    #[test]
    fn test_dependencies_by_name() {
        struct Report {
            owner: String,
            primary: Arc<Repository>,
            by_type: Arc<Repository>,
            replica: ObjectProvider<Repository>,
            undeclared_rejected: bool,
        }

        let factory = DefaultListableBeanFactory::new();
        for name in ["primaryRepository", "replicaRepository"] {
            factory
                .register_bean_definition(repository_definition().named(name))
                .unwrap();
        }
        factory
            .register_bean_definition(
                BeanDefinition::of(|deps| {
                    Ok(Report {
                        owner: deps.bean_name().to_string(),
                        primary: deps.get_named::<Repository>("primaryRepository")?,
                        by_type: deps.get::<Repository>()?,
                        replica: deps.named_provider::<Repository>("replicaRepository"),
                        undeclared_rejected: matches!(
                            deps.get_named::<Repository>("replicaRepository"),
                            Err(ContainerError::NoSuchBean(_))
                        ),
                    })
                })
                .depends_on("primaryRepository"),
            )
            .unwrap();

        let report = factory.get_bean_by_type::<Report>().unwrap();
        let primary = factory
            .get_bean_by_name::<Repository>("primaryRepository")
            .unwrap();
        let replica = factory
            .get_bean_by_name::<Repository>("replicaRepository")
            .unwrap();

        assert_eq!(report.owner, "report");
        assert!(Arc::ptr_eq(&report.primary, &primary));
        assert!(Arc::ptr_eq(&report.by_type, &primary));
        assert!(report.undeclared_rejected);
        assert_eq!(report.replica.bean_name(), Some("replicaRepository"));
        assert!(Arc::ptr_eq(&report.replica.get().unwrap(), &replica));
    }

    #[test]
    fn test_failed_init_caches_nothing() {
        let factory = DefaultListableBeanFactory::new();
        factory
            .register_bean_definition(
                repository_definition()
                    .with_init(|_: &mut Repository| Err(anyhow::anyhow!("connection refused"))),
            )
            .unwrap();

        let result = factory.get_bean("repository");
        assert!(matches!(result, Err(ContainerError::BeanCreationFailed { ref name, .. }) if name == "repository"));
        assert_eq!(factory.singleton_count(), 0);
    }

    #[test]
    fn test_provider_resolves_on_each_call() {
        let factory = DefaultListableBeanFactory::new();
        factory
            .register_bean_definition(
                BeanDefinition::of(|_| Ok(Counter { count: 0 })).with_scope(Scope::Prototype),
            )
            .unwrap();

        let provider = factory.get_provider::<Counter>();
        let first = provider.get().unwrap();
        let second = provider.get().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_provider_after_factory_dropped() {
        let factory = DefaultListableBeanFactory::new();
        factory.register_bean_definition(repository_definition()).unwrap();
        let provider = factory.get_provider::<Repository>();

        drop(factory);
        assert!(matches!(provider.get(), Err(ContainerError::ContainerClosed)));
        assert!(provider.get_if_available().is_none());
    }

    #[test]
    fn test_close_destroys_singletons_in_reverse_order() {
        let destroyed = Arc::new(Mutex::new(Vec::new()));
        let factory = DefaultListableBeanFactory::new();

        for name in ["first", "second"] {
            let log = Arc::clone(&destroyed);
            factory
                .register_bean_definition(repository_definition().named(name).with_destroy(
                    move |_: &Repository| {
                        log.lock().push(name);
                        Ok(())
                    },
                ))
                .unwrap();
        }

        factory.get_bean("first").unwrap();
        factory.get_bean("second").unwrap();
        factory.close();
        factory.close();

        assert_eq!(*destroyed.lock(), vec!["second", "first"]);
        assert!(factory.is_closed());
        assert!(matches!(factory.get_bean("first"), Err(ContainerError::ContainerClosed)));
        assert!(matches!(
            factory.register_bean_definition(repository_definition()),
            Err(ContainerError::ContainerClosed)
        ));
    }

    #[test]
    fn test_concurrent_singleton_creation() {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&created);
        let factory = DefaultListableBeanFactory::new();
        factory
            .register_bean_definition(BeanDefinition::of(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(std::time::Duration::from_millis(10));
                Ok(Repository {
                    url: "mem://".to_string(),
                })
            }))
            .unwrap();

        let beans: Vec<Arc<Repository>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| factory.get_bean_by_type::<Repository>().unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(created.load(Ordering::SeqCst), 1);
        assert!(beans.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn test_preinstantiate_skips_lazy_and_prototype() {
        let factory = DefaultListableBeanFactory::new();
        factory.register_bean_definition(repository_definition()).unwrap();
        factory
            .register_bean_definition(
                BeanDefinition::of(|_| Ok(Counter { count: 0 })).with_scope(Scope::Prototype),
            )
            .unwrap();
        factory
            .register_bean_definition(repository_definition().named("lazyRepository").with_lazy(true))
            .unwrap();

        factory.preinstantiate_singletons().unwrap();

        assert!(factory.contains_singleton("repository"));
        assert!(!factory.contains_singleton("lazyRepository"));
        assert_eq!(factory.singleton_count(), 1);
    }

    #[test]
    fn test_bean_post_processors_run_in_order() {
        struct Recording {
            label: &'static str,
            order: i32,
            log: Arc<Mutex<Vec<String>>>,
        }

        impl BeanPostProcessor for Recording {
            fn post_process_before_initialization(
                &self,
                _bean: &mut dyn Any,
                bean_name: &str,
            ) -> anyhow::Result<()> {
                self.log.lock().push(format!("{}:before:{}", self.label, bean_name));
                Ok(())
            }

            fn post_process_after_initialization(
                &self,
                _bean: &mut dyn Any,
                bean_name: &str,
            ) -> anyhow::Result<()> {
                self.log.lock().push(format!("{}:after:{}", self.label, bean_name));
                Ok(())
            }

            fn order(&self) -> i32 {
                self.order
            }
        }

        let log = Arc::new(Mutex::new(Vec::new()));
        let factory = DefaultListableBeanFactory::new();
        for (label, order) in [("late", 10), ("early", 1)] {
            factory.add_bean_post_processor(Arc::new(Recording {
                label,
                order,
                log: Arc::clone(&log),
            }));
        }
        let init_log = Arc::clone(&log);
        factory
            .register_bean_definition(repository_definition().with_init(move |_: &mut Repository| {
                init_log.lock().push("init".to_string());
                Ok(())
            }))
            .unwrap();

        factory.get_bean("repository").unwrap();

        assert_eq!(
            *log.lock(),
            vec![
                "early:before:repository",
                "late:before:repository",
                "init",
                "early:after:repository",
                "late:after:repository",
            ]
        );
    }

    #[test]
    fn test_dependency_graph_resolves_typed_dependencies() {
        let factory = DefaultListableBeanFactory::new();
        factory.register_bean_definition(repository_definition()).unwrap();
        factory
            .register_bean_definition(
                BeanDefinition::of(|deps| {
                    Ok(Service {
                        repository: deps.get::<Repository>()?,
                    })
                })
                .depends_on_type::<Repository>(),
            )
            .unwrap();
        factory
            .register_bean_definition(
                BeanDefinition::of(|_| Ok(Counter { count: 0 }))
                    .depends_on_type::<Service>()
                    .depends_on_type::<u64>(),
            )
            .unwrap();

        let graph = factory.get_dependency_graph();
        assert_eq!(graph["service"], vec!["repository"]);
        assert!(graph["repository"].is_empty());
        // 没有匹配的类型用类型名占位
        assert_eq!(graph["counter"], vec!["service", "u64"]);
    }
}

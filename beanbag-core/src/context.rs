use std::any::{Any, TypeId};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::bean_factory::{
    BeanFactory, BeanFactoryExt, ConfigurableBeanFactory, ConfigurableListableBeanFactory,
    DefaultListableBeanFactory, ListableBeanFactory,
};
use crate::injection::Dependencies;
use crate::lifecycle::BeanPostProcessor;
use crate::provider::ObjectProvider;
use crate::{
    bean::{BeanDefinition, BeanInstance, FunctionFactory},
    config::ContainerSettings,
    error::{ContainerError, ContainerResult, Result},
    Scope,
};

/// Shutdown hook类型
pub type ShutdownHook = Box<dyn Fn() -> Result<()> + Send + Sync>;

/// 容器 trait - 定义依赖注入容器的核心接口
pub trait Container: Send + Sync {
    /// 注册 Bean 定义
    fn register(&self, definition: BeanDefinition) -> ContainerResult<()>;

    /// 通过名称获取 Bean
    fn get_bean(&self, name: &str) -> ContainerResult<BeanInstance>;

    /// 通过类型获取 Bean
    fn get_bean_by_type<T: Any + Send + Sync>(&self) -> ContainerResult<Arc<T>>;

    /// 通过名称和类型获取 Bean
    fn get_bean_by_name<T: Any + Send + Sync>(&self, name: &str) -> ContainerResult<Arc<T>>;

    /// 获取延迟解析的 Provider
    fn get_provider<T: Any + Send + Sync>(&self) -> ObjectProvider<T>;

    /// 检查是否包含指定名称的 Bean
    fn contains_bean(&self, name: &str) -> bool;

    /// 检查是否包含指定类型的 Bean
    fn contains_bean_by_type<T: Any + Send + Sync>(&self) -> bool;

    /// 获取所有 Bean 的名称
    fn get_bean_names(&self) -> Vec<String>;
}

/// 应用上下文 - Container 的默认实现
///
/// 生命周期：创建 → 注册定义 → refresh（可选的预实例化） → 提供查找 → close
///
/// 上下文是一个显式的值，由使用方持有并传递，没有全局容器
pub struct ApplicationContext {
    /// Bean 工厂 - 负责 Bean 的创建和管理
    bean_factory: Arc<DefaultListableBeanFactory>,

    /// 容器配置
    settings: ContainerSettings,

    /// Shutdown hooks
    shutdown_hooks: RwLock<Vec<ShutdownHook>>,

    /// 显示名称（用于日志）
    display_name: String,
}

impl ApplicationContext {
    /// 使用默认配置创建上下文
    pub fn new() -> Self {
        Self::with_settings(ContainerSettings::default())
    }

    /// 使用指定配置创建上下文
    pub fn with_settings(settings: ContainerSettings) -> Self {
        Self {
            bean_factory: DefaultListableBeanFactory::new(),
            settings,
            shutdown_hooks: RwLock::new(Vec::new()),
            display_name: "ApplicationContext".to_string(),
        }
    }

    /// 构建器模式创建上下文
    pub fn builder() -> ApplicationContextBuilder {
        ApplicationContextBuilder::new()
    }

    /// 获取内部的 BeanFactory
    pub fn get_bean_factory(&self) -> &Arc<DefaultListableBeanFactory> {
        &self.bean_factory
    }

    /// 获取容器配置
    pub fn settings(&self) -> &ContainerSettings {
        &self.settings
    }

    /// 显示名称
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// 注册 shutdown hook
    ///
    /// Shutdown hook 会在关闭时、销毁单例之前按注册顺序执行
    pub fn register_shutdown_hook<F>(&self, hook: F)
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        let mut hooks = self.shutdown_hooks.write();
        hooks.push(Box::new(hook));
        tracing::debug!("Registered shutdown hook, total: {}", hooks.len());
    }

    /// 注册 BeanPostProcessor
    ///
    /// BeanPostProcessor 会在 Bean 初始化前后进行处理，按优先级顺序执行
    pub fn add_bean_post_processor(&self, processor: Arc<dyn BeanPostProcessor>) {
        self.bean_factory.add_bean_post_processor(processor);
    }

    /// 注册没有依赖的单例 Bean
    pub fn register_singleton<T, F>(
        &self,
        name: impl Into<String>,
        factory: F,
    ) -> ContainerResult<()>
    where
        T: Any + Send + Sync,
        F: Fn() -> Result<T> + Send + Sync + 'static,
    {
        let factory = FunctionFactory::new(move |_: &Dependencies| factory());
        let definition = BeanDefinition::new(name, factory).with_scope(Scope::Singleton);
        self.register(definition)
    }

    /// 注册没有依赖的原型 Bean
    pub fn register_prototype<T, F>(
        &self,
        name: impl Into<String>,
        factory: F,
    ) -> ContainerResult<()>
    where
        T: Any + Send + Sync,
        F: Fn() -> Result<T> + Send + Sync + 'static,
    {
        let factory = FunctionFactory::new(move |_: &Dependencies| factory());
        let definition = BeanDefinition::new(name, factory).with_scope(Scope::Prototype);
        self.register(definition)
    }

    /// 获取按名称解析的 Provider
    pub fn get_named_provider<T: Any + Send + Sync>(&self, name: &str) -> ObjectProvider<T> {
        self.bean_factory.get_named_provider(name)
    }

    /// 获取指定类型的所有 Bean 名称
    pub fn get_bean_names_for_type<T: Any + Send + Sync>(&self) -> Vec<String> {
        self.bean_factory.get_bean_names_for_type(TypeId::of::<T>())
    }

    /// 指定名称的 Bean 是否为单例
    pub fn is_singleton(&self, name: &str) -> ContainerResult<bool> {
        self.bean_factory.is_singleton(name)
    }

    /// 指定名称的 Bean 是否为原型
    pub fn is_prototype(&self, name: &str) -> ContainerResult<bool> {
        self.bean_factory.is_prototype(name)
    }

    /// 验证所有 Bean 的依赖关系
    ///
    /// 检查：
    /// - 缺失的依赖（声明的依赖没有注册），报告为 [`ContainerError::NoSuchBean`]
    /// - 循环依赖（A -> B -> C -> A），报告为 [`ContainerError::CircularDependency`]
    pub fn validate_dependencies(&self) -> ContainerResult<()> {
        use crate::utils::dependency::validate_dependency_graph;

        let dependency_map = self.bean_factory.get_dependency_graph();

        validate_dependency_graph(&dependency_map).map_err(|e| {
            tracing::warn!("Dependency validation failed: {}", e);
            ContainerError::from(e)
        })?;

        tracing::info!(
            "Dependency validation passed for {} bean(s)",
            dependency_map.len()
        );
        Ok(())
    }

    /// 预实例化所有非延迟单例 Bean
    pub fn preinstantiate_singletons(&self) -> ContainerResult<()> {
        self.bean_factory.preinstantiate_singletons()
    }

    /// 刷新上下文
    ///
    /// 按配置验证依赖图并预实例化非延迟单例
    pub fn refresh(&self) -> ContainerResult<()> {
        tracing::info!(
            "Refreshing {} with {} bean definition(s)",
            self.display_name,
            self.bean_factory.get_bean_definition_count()
        );

        if self.settings.container.validate_on_refresh {
            self.validate_dependencies()?;
        }

        if self.settings.container.eager_init {
            self.bean_factory.preinstantiate_singletons()?;
        } else {
            tracing::debug!("Eager initialization disabled, singletons are created on first use");
        }

        Ok(())
    }

    /// 是否已关闭
    pub fn is_closed(&self) -> bool {
        self.bean_factory.is_closed()
    }

    /// 关闭上下文
    ///
    /// 1. 执行 shutdown hooks（失败只记录日志）
    /// 2. 逆创建顺序销毁所有单例（调用 destroy 回调）
    ///
    /// 原型实例不由容器持有，不会被销毁。重复调用不做任何事。
    pub fn close(&self) {
        if self.bean_factory.is_closed() {
            tracing::debug!("{} already closed", self.display_name);
            return;
        }

        tracing::info!("Closing {}", self.display_name);

        let hooks = std::mem::take(&mut *self.shutdown_hooks.write());
        tracing::info!("Executing {} shutdown hook(s)", hooks.len());
        for (idx, hook) in hooks.iter().enumerate() {
            match hook() {
                Ok(()) => tracing::debug!("Shutdown hook {} executed successfully", idx + 1),
                Err(e) => tracing::warn!("Shutdown hook {} failed: {:#}", idx + 1, e),
            }
        }

        self.bean_factory.close();

        tracing::info!("{} closed", self.display_name);
    }
}

impl Default for ApplicationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Container for ApplicationContext {
    fn register(&self, definition: BeanDefinition) -> ContainerResult<()> {
        self.bean_factory.register_bean_definition(definition)
    }

    fn get_bean(&self, name: &str) -> ContainerResult<BeanInstance> {
        self.bean_factory.get_bean(name)
    }

    fn get_bean_by_type<T: Any + Send + Sync>(&self) -> ContainerResult<Arc<T>> {
        self.bean_factory.get_bean_by_type::<T>()
    }

    fn get_bean_by_name<T: Any + Send + Sync>(&self, name: &str) -> ContainerResult<Arc<T>> {
        self.bean_factory.get_bean_by_name::<T>(name)
    }

    fn get_provider<T: Any + Send + Sync>(&self) -> ObjectProvider<T> {
        self.bean_factory.get_provider::<T>()
    }

    fn contains_bean(&self, name: &str) -> bool {
        self.bean_factory.contains_bean(name)
    }

    fn contains_bean_by_type<T: Any + Send + Sync>(&self) -> bool {
        self.bean_factory.contains_bean_by_type::<T>()
    }

    fn get_bean_names(&self) -> Vec<String> {
        self.bean_factory.get_bean_names()
    }
}

/// 应用上下文构建器
pub struct ApplicationContextBuilder {
    settings: ContainerSettings,
    display_name: Option<String>,
    definitions: Vec<BeanDefinition>,
    post_processors: Vec<Arc<dyn BeanPostProcessor>>,
}

impl ApplicationContextBuilder {
    pub fn new() -> Self {
        Self {
            settings: ContainerSettings::default(),
            display_name: None,
            definitions: Vec::new(),
            post_processors: Vec::new(),
        }
    }

    /// 设置容器配置
    pub fn settings(mut self, settings: ContainerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// 设置显示名称
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// 注册 Bean
    pub fn register(mut self, definition: BeanDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// 添加 BeanPostProcessor
    pub fn post_processor(mut self, processor: Arc<dyn BeanPostProcessor>) -> Self {
        self.post_processors.push(processor);
        self
    }

    /// 构建上下文（不刷新）
    ///
    /// 重名定义在这里报错
    pub fn build(self) -> ContainerResult<Arc<ApplicationContext>> {
        let mut context = ApplicationContext::with_settings(self.settings);
        if let Some(name) = self.display_name {
            context.display_name = name;
        }

        for processor in self.post_processors {
            context.add_bean_post_processor(processor);
        }
        for definition in self.definitions {
            context.register(definition)?;
        }

        Ok(Arc::new(context))
    }

    /// 构建并刷新上下文
    pub fn build_and_refresh(self) -> ContainerResult<Arc<ApplicationContext>> {
        let context = self.build()?;
        context.refresh()?;
        Ok(context)
    }
}

impl Default for ApplicationContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! 单例与原型作用域

use std::sync::atomic::{AtomicU32, Ordering};

use beanbag_core::prelude::*;

/// 单例 Bean，容器内只有一个实例
#[derive(Debug, Default)]
pub struct SingletonBean {
    initialized: bool,
}

impl SingletonBean {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl Lifecycle for SingletonBean {
    fn init(&mut self) -> anyhow::Result<()> {
        self.initialized = true;
        tracing::info!("SingletonBean.init");
        Ok(())
    }

    fn destroy(&self) -> anyhow::Result<()> {
        tracing::info!("SingletonBean.destroy");
        Ok(())
    }
}

/// 原型 Bean，每次获取都是新实例，计数器从 0 开始
#[derive(Debug, Default)]
pub struct PrototypeBean {
    count: AtomicU32,
}

impl PrototypeBean {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_count(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get_count(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }
}

impl Lifecycle for PrototypeBean {
    fn init(&mut self) -> anyhow::Result<()> {
        tracing::info!("PrototypeBean.init {:p}", self);
        Ok(())
    }

    // 容器不会销毁原型实例，这里永远不会被调用
    fn destroy(&self) -> anyhow::Result<()> {
        tracing::info!("PrototypeBean.destroy {:p}", self);
        Ok(())
    }
}

/// 持有 `PrototypeBean` Provider 的单例客户端
///
/// 每次调用 [`logic`](ClientBean::logic) 都从 Provider 取一个新的原型实例，
/// 而不是在构造时注入一个固定实例。
#[derive(Debug, Clone)]
pub struct ClientBean {
    prototype_provider: ObjectProvider<PrototypeBean>,
}

impl ClientBean {
    pub fn new(prototype_provider: ObjectProvider<PrototypeBean>) -> Self {
        Self { prototype_provider }
    }

    pub fn logic(&self) -> ContainerResult<u32> {
        let prototype = self.prototype_provider.get()?;
        prototype.add_count();
        Ok(prototype.get_count())
    }
}

/// 注册 `singletonBean`、`prototypeBean`、`clientBean`
pub fn register_scope_beans(context: &ApplicationContext) -> ContainerResult<()> {
    context.register(
        BeanDefinition::of(|_| Ok(SingletonBean::new())).with_lifecycle::<SingletonBean>(),
    )?;
    context.register(
        BeanDefinition::of(|_| Ok(PrototypeBean::new()))
            .with_scope(Scope::Prototype)
            .with_lifecycle::<PrototypeBean>(),
    )?;
    context.register(BeanDefinition::of(|deps: &Dependencies| {
        Ok(ClientBean::new(deps.provider::<PrototypeBean>()))
    }))
}

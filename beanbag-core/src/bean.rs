use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::Result;
use crate::injection::Dependencies;
use crate::lifecycle::Lifecycle;
use crate::utils::naming;
use crate::Scope;

/// 容器持有的 Bean 实例
pub type BeanInstance = Arc<dyn Any + Send + Sync>;

/// 对象工厂 trait - 用于创建 Bean 实例
///
/// 工厂在调用前已经拿到所有声明的依赖（见 [`Dependencies`]）
pub trait ObjectFactory: Send + Sync {
    /// 创建 Bean 实例
    fn create(&self, deps: &Dependencies) -> Result<Box<dyn Any + Send + Sync>>;

    /// 获取 Bean 的类型 ID
    fn object_type_id(&self) -> TypeId;

    /// 获取 Bean 的类型名称
    fn object_type_name(&self) -> &'static str;
}

/// 生命周期回调类型
pub type InitCallback = Arc<dyn Fn(&mut dyn Any) -> Result<()> + Send + Sync>;
pub type DestroyCallback = Arc<dyn Fn(&dyn Any) -> Result<()> + Send + Sync>;

/// 声明的依赖
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dependency {
    /// 按名称依赖
    Named(String),

    /// 按类型依赖
    Typed {
        type_id: TypeId,
        type_name: &'static str,
    },
}

impl Dependency {
    pub fn named(name: impl Into<String>) -> Self {
        Dependency::Named(name.into())
    }

    pub fn of<T: Any + Send + Sync>() -> Self {
        Dependency::Typed {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dependency::Named(name) => write!(f, "'{}'", name),
            Dependency::Typed { type_name, .. } => write!(f, "type '{}'", type_name),
        }
    }
}

/// Bean 定义 - 描述如何创建和管理 Bean
///
/// 回调和工厂都以 `Arc` 持有，容器在创建实例前会克隆一份定义，
/// 避免在调用用户代码时持有注册表的锁
#[derive(Clone)]
pub struct BeanDefinition {
    /// Bean 的名称
    pub name: String,

    /// Bean 的作用域
    pub scope: Scope,

    /// Bean 工厂
    pub factory: Arc<dyn ObjectFactory>,

    /// 是否延迟初始化（仅对单例有效）
    pub lazy: bool,

    /// 声明的依赖，按声明顺序解析
    pub dependencies: Vec<Dependency>,

    /// 初始化回调（@PostConstruct）
    pub init_callback: Option<InitCallback>,

    /// 销毁回调（@PreDestroy）
    pub destroy_callback: Option<DestroyCallback>,
}

impl BeanDefinition {
    /// 创建新的 Bean 定义
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: ObjectFactory + 'static,
    {
        Self {
            name: name.into(),
            scope: Scope::default(),
            factory: Arc::new(factory),
            lazy: false,
            dependencies: Vec::new(),
            init_callback: None,
            destroy_callback: None,
        }
    }

    /// 从工厂函数创建 Bean 定义，名称默认为类型名的 camelCase 形式
    ///
    /// ```
    /// use beanbag_core::BeanDefinition;
    ///
    /// struct OrderRepository;
    ///
    /// let definition = BeanDefinition::of(|_deps| Ok(OrderRepository));
    /// assert_eq!(definition.name, "orderRepository");
    /// ```
    pub fn of<T, F>(factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Dependencies) -> Result<T> + Send + Sync + 'static,
    {
        Self::new(naming::default_bean_name::<T>(), FunctionFactory::new(factory))
    }

    /// 设置名称
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 设置作用域
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// 设置延迟初始化
    pub fn with_lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    /// 声明按名称的依赖
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(Dependency::named(name));
        self
    }

    /// 声明按类型的依赖
    pub fn depends_on_type<D: Any + Send + Sync>(mut self) -> Self {
        self.dependencies.push(Dependency::of::<D>());
        self
    }

    /// 设置初始化回调
    ///
    /// 回调的类型参数必须与工厂产出的类型一致，否则创建时报错
    pub fn with_init<T, F>(mut self, init_fn: F) -> Self
    where
        T: Any,
        F: Fn(&mut T) -> Result<()> + Send + Sync + 'static,
    {
        self.init_callback = Some(Arc::new(move |bean: &mut dyn Any| {
            let bean = bean.downcast_mut::<T>().ok_or_else(|| {
                anyhow::anyhow!("init callback expects '{}'", std::any::type_name::<T>())
            })?;
            init_fn(bean)
        }));
        self
    }

    /// 设置销毁回调
    pub fn with_destroy<T, F>(mut self, destroy_fn: F) -> Self
    where
        T: Any,
        F: Fn(&T) -> Result<()> + Send + Sync + 'static,
    {
        self.destroy_callback = Some(Arc::new(move |bean: &dyn Any| {
            let bean = bean.downcast_ref::<T>().ok_or_else(|| {
                anyhow::anyhow!("destroy callback expects '{}'", std::any::type_name::<T>())
            })?;
            destroy_fn(bean)
        }));
        self
    }

    /// 使用 [`Lifecycle`] 实现作为 init/destroy 回调
    pub fn with_lifecycle<T: Lifecycle>(self) -> Self {
        self.with_init(|bean: &mut T| bean.init())
            .with_destroy(|bean: &T| bean.destroy())
    }

    /// Bean 的类型 ID
    pub fn bean_type_id(&self) -> TypeId {
        self.factory.object_type_id()
    }

    /// Bean 的类型名称
    pub fn bean_type_name(&self) -> &'static str {
        self.factory.object_type_name()
    }
}

impl fmt::Debug for BeanDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanDefinition")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("lazy", &self.lazy)
            .field("dependencies", &self.dependencies)
            .field("type_name", &self.factory.object_type_name())
            .finish()
    }
}

/// 简单的函数工厂实现
pub struct FunctionFactory<T, F>
where
    T: Any + Send + Sync,
    F: Fn(&Dependencies) -> Result<T> + Send + Sync,
{
    factory_fn: F,
    _phantom: PhantomData<fn() -> T>,
}

impl<T, F> FunctionFactory<T, F>
where
    T: Any + Send + Sync,
    F: Fn(&Dependencies) -> Result<T> + Send + Sync,
{
    pub fn new(factory_fn: F) -> Self {
        Self {
            factory_fn,
            _phantom: PhantomData,
        }
    }
}

impl<T, F> ObjectFactory for FunctionFactory<T, F>
where
    T: Any + Send + Sync,
    F: Fn(&Dependencies) -> Result<T> + Send + Sync,
{
    fn create(&self, deps: &Dependencies) -> Result<Box<dyn Any + Send + Sync>> {
        let instance = (self.factory_fn)(deps)?;
        Ok(Box::new(instance))
    }

    fn object_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn object_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

//! 单例中的共享状态
//!
//! 单例被所有调用方共享。把调用级数据（例如"本次订单价格"）存成单例字段，
//! 后写入的调用会覆盖先前的值。正确做法是直接返回结果，不在实例上保存。

use std::sync::atomic::{AtomicI64, Ordering};

use beanbag_core::prelude::*;

/// 有状态服务：`order` 把价格写入共享字段
#[derive(Debug, Default)]
pub struct StatefulService {
    price: AtomicI64,
}

impl StatefulService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order(&self, user: &str, amount: i64) {
        tracing::info!("name = {}, price = {}", user, amount);
        self.price.store(amount, Ordering::SeqCst);
    }

    pub fn get_price(&self) -> i64 {
        self.price.load(Ordering::SeqCst)
    }
}

/// 无状态服务：`order` 直接返回价格
#[derive(Debug, Default)]
pub struct StatelessService;

impl StatelessService {
    pub fn new() -> Self {
        Self
    }

    pub fn order(&self, user: &str, amount: i64) -> i64 {
        tracing::info!("name = {}, price = {}", user, amount);
        amount
    }
}

/// 注册 `statefulService`、`statelessService`
pub fn register_order_services(context: &ApplicationContext) -> ContainerResult<()> {
    context.register(BeanDefinition::of(|_| Ok(StatefulService::new())))?;
    context.register(BeanDefinition::of(|_| Ok(StatelessService::new())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn context() -> ApplicationContext {
        let context = ApplicationContext::new();
        register_order_services(&context).unwrap();
        context
    }

    #[test]
    fn test_stateful_service_last_writer_wins() {
        let context = context();
        let service1 = context.get_bean_by_type::<StatefulService>().unwrap();
        let service2 = context.get_bean_by_type::<StatefulService>().unwrap();
        assert!(Arc::ptr_eq(&service1, &service2));

        // 用户 A 下单 10000
        service1.order("userA", 10000);
        // 用户 B 下单 20000
        service2.order("userB", 20000);

        // 用户 A 查询到的是 B 的价格
        assert_eq!(service1.get_price(), 20000);
    }

    #[test]
    fn test_stateful_service_shared_across_threads() {
        let context = context();

        thread::scope(|s| {
            for (user, amount) in [("userA", 10000), ("userB", 20000)] {
                let service = context.get_bean_by_type::<StatefulService>().unwrap();
                s.spawn(move || service.order(user, amount));
            }
        });

        let price = context.get_bean_by_type::<StatefulService>().unwrap().get_price();
        assert!(price == 10000 || price == 20000);
    }

    #[test]
    fn test_stateless_service() {
        let context = context();
        let service = context.get_bean_by_type::<StatelessService>().unwrap();

        let price_a = service.order("userA", 10000);
        let price_b = service.order("userB", 20000);

        assert_eq!(price_a, 10000);
        assert_eq!(price_b, 20000);
    }
}

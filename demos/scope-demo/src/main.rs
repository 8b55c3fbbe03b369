use std::sync::Arc;

use beanbag_core::prelude::*;
use scope_demo::scope::{ClientBean, PrototypeBean, SingletonBean};
use scope_demo::singleton::{StatefulService, StatelessService};

fn main() -> anyhow::Result<()> {
    println!("\n╔════════════════════════════════════════════════════╗");
    println!("║        Beanbag - Scope & Lifecycle Demo           ║");
    println!("╚════════════════════════════════════════════════════╝\n");

    // 查找配置文件
    let config_file = ["demos/scope-demo/application.toml", "application.toml"]
        .into_iter()
        .find(|path| std::path::Path::new(path).exists())
        .unwrap_or("application.toml");

    let settings = ContainerSettings::from_file_or_default(config_file)?.apply_env("APP_")?;
    settings.logging_config()?.init()?;

    let context = ApplicationContext::builder()
        .settings(settings)
        .display_name("ScopeDemo")
        .build()?;
    scope_demo::register_demo_beans(&context)?;
    context.refresh()?;

    tracing::info!(
        "Context '{}' refreshed with {} beans: {:?}",
        context.display_name(),
        context.get_bean_names().len(),
        context.get_bean_names()
    );

    // 在一个作用域中使用 beans
    {
        println!("\n── Singleton ────────────────────────────────────────");
        let singleton1 = context.get_bean_by_type::<SingletonBean>()?;
        let singleton2 = context.get_bean_by_type::<SingletonBean>()?;
        println!("singletonBean1 = {:p}", Arc::as_ptr(&singleton1));
        println!("singletonBean2 = {:p}", Arc::as_ptr(&singleton2));
        println!("same instance: {}", Arc::ptr_eq(&singleton1, &singleton2));

        println!("\n── Prototype ────────────────────────────────────────");
        let prototype1 = context.get_bean_by_type::<PrototypeBean>()?;
        let prototype2 = context.get_bean_by_type::<PrototypeBean>()?;
        prototype1.add_count();
        println!("prototypeBean1 = {:p}, count = {}", Arc::as_ptr(&prototype1), prototype1.get_count());
        println!("prototypeBean2 = {:p}, count = {}", Arc::as_ptr(&prototype2), prototype2.get_count());
        println!("same instance: {}", Arc::ptr_eq(&prototype1, &prototype2));

        println!("\n── Singleton holding a Prototype provider ───────────");
        let client1 = context.get_bean_by_type::<ClientBean>()?;
        println!("clientBean1.logic() = {}", client1.logic()?);
        let client2 = context.get_bean_by_type::<ClientBean>()?;
        println!("clientBean2.logic() = {}", client2.logic()?);

        println!("\n── Stateful singleton ───────────────────────────────");
        let stateful = context.get_bean_by_type::<StatefulService>()?;
        stateful.order("userA", 10000);
        stateful.order("userB", 20000);
        println!("userA price = {} (overwritten by userB)", stateful.get_price());

        println!("\n── Stateless singleton ──────────────────────────────");
        let stateless = context.get_bean_by_type::<StatelessService>()?;
        let price_a = stateless.order("userA", 10000);
        let price_b = stateless.order("userB", 20000);
        println!("userA price = {}, userB price = {}", price_a, price_b);
    }

    println!("\n╔════════════════════════════════════════════════════╗");
    println!("║                 Shutting Down                     ║");
    println!("╚════════════════════════════════════════════════════╝\n");

    context.close();

    Ok(())
}

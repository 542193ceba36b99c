//! Basic usage example for capability-registry.
//!
//! Demonstrates:
//! - Providing primitives, strings, and custom structs
//! - Retrieving values with `get()` (returns `Arc<T>`)
//! - Retrieving cloned values with `get_cloned()` (returns `T`)
//! - Handling a missing dependency
//! - Resetting the registry
//!
//! Run with: `RUST_LOG=capability_registry=trace cargo run --example basic_usage`

use capability_registry::{define_registry, RegistryError};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

define_registry!(app);

#[derive(Debug, Clone, PartialEq)]
struct AppConfig {
    name: String,
    version: u32,
    debug_mode: bool,
}

fn main() -> Result<(), RegistryError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== capability-registry: Basic Usage ===\n");

    // -------------------------------------------------------------------------
    // 1. Provide values
    // -------------------------------------------------------------------------
    println!("1. Providing values...");

    app::provide(42i32);
    app::provide(true);
    app::provide("Hello, capability-registry!".to_string());
    app::provide(AppConfig {
        name: "MyApp".to_string(),
        version: 1,
        debug_mode: true,
    });

    println!("   Provided: i32, bool, String, AppConfig");

    // -------------------------------------------------------------------------
    // 2. Retrieve by exact type
    // -------------------------------------------------------------------------
    println!("\n2. Retrieving values...");

    let number: Arc<i32> = app::get()?;
    let message: Arc<String> = app::get()?;
    let config: AppConfig = app::get_cloned()?;

    println!("   i32: {}", number);
    println!("   String: {}", message);
    println!(
        "   AppConfig: {} v{} (debug: {})",
        config.name, config.version, config.debug_mode
    );

    // -------------------------------------------------------------------------
    // 3. Overwrite
    // -------------------------------------------------------------------------
    println!("\n3. Overwriting i32...");

    app::provide(7i32);
    println!("   i32 is now: {}", app::get::<i32>()?);

    // -------------------------------------------------------------------------
    // 4. Missing dependency
    // -------------------------------------------------------------------------
    println!("\n4. Requesting a type that was never provided...");

    match app::get::<f64>() {
        Ok(value) => println!("   unexpected f64: {}", value),
        Err(err) => println!("   error: {}", err),
    }

    // -------------------------------------------------------------------------
    // 5. Reset
    // -------------------------------------------------------------------------
    println!("\n5. Resetting...");

    app::reset();
    println!("   contains::<i32>() = {}", app::contains::<i32>());

    println!("\n=== Example Complete ===");
    Ok(())
}

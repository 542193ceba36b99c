//! Trait contracts example for capability-registry.
//!
//! Demonstrates the **contract-based dependency injection** pattern:
//! - Define traits (contracts) that specify behavior
//! - Provide concrete implementations, declaring the contracts they satisfy
//! - Resolve by contract with `get_interface()`
//! - Swap implementations at runtime
//!
//! Run with: `RUST_LOG=capability_registry=trace cargo run --example trait_contracts`

use capability_registry::{provide, Registry, RegistryError};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// =============================================================================
// Contract Definitions (Traits)
// =============================================================================

/// Contract for a logging service.
trait Logger: Send + Sync {
    fn log(&self, message: &str);
    fn name(&self) -> &str;
}

/// Contract for a notification service.
trait Notifier: Send + Sync {
    fn notify(&self, recipient: &str, message: &str);
    fn service_type(&self) -> &str;
}

// =============================================================================
// Concrete Implementations
// =============================================================================

struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) {
        println!("[CONSOLE] {}", message);
    }

    fn name(&self) -> &str {
        "ConsoleLogger"
    }
}

struct FileLogger {
    path: String,
}

impl Logger for FileLogger {
    fn log(&self, message: &str) {
        println!("[FILE:{}] {}", self.path, message);
    }

    fn name(&self) -> &str {
        "FileLogger"
    }
}

/// Sends over SMTP and keeps an audit line of its own, so it is both contracts.
struct EmailNotifier {
    smtp_server: String,
}

impl Notifier for EmailNotifier {
    fn notify(&self, recipient: &str, message: &str) {
        println!(
            "[EMAIL via {}] To: {} - {}",
            self.smtp_server, recipient, message
        );
    }

    fn service_type(&self) -> &str {
        "Email"
    }
}

impl Logger for EmailNotifier {
    fn log(&self, message: &str) {
        println!("[EMAIL-AUDIT] {}", message);
    }

    fn name(&self) -> &str {
        "EmailNotifier"
    }
}

// =============================================================================
// Application Code (Uses Contracts, Not Implementations)
// =============================================================================

fn process_order(registry: &Registry, order_id: u32) -> Result<(), RegistryError> {
    let logger: Arc<dyn Logger> = registry.get_interface()?;
    let notifier: Arc<dyn Notifier> = registry.get_interface()?;

    logger.log(&format!("Processing order #{}", order_id));
    logger.log("Order confirmed!");

    notifier.notify("customer@example.com", &format!("Order #{} confirmed!", order_id));
    Ok(())
}

fn main() -> Result<(), RegistryError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== capability-registry: Trait Contracts ===\n");

    let registry = Registry::new();

    // -------------------------------------------------------------------------
    // 1. Provide initial implementations
    // -------------------------------------------------------------------------
    println!("1. Providing initial implementations...");

    provide!(registry, ConsoleLogger => dyn Logger);
    provide!(
        registry,
        EmailNotifier { smtp_server: "smtp.example.com".to_string() } => dyn Notifier
    );

    println!("\n2. Processing order...\n");
    process_order(&registry, 1001)?;

    // -------------------------------------------------------------------------
    // 3. Swap implementations: the most recent provide wins
    // -------------------------------------------------------------------------
    println!("\n3. Swapping to FileLogger...");

    provide!(registry, FileLogger { path: "/var/log/app.log".to_string() } => dyn Logger);

    println!("\n4. Processing another order...\n");
    process_order(&registry, 1002)?;

    // -------------------------------------------------------------------------
    // 5. One value, two contracts
    // -------------------------------------------------------------------------
    println!("\n5. Re-providing EmailNotifier as both Notifier and Logger...");

    provide!(
        registry,
        EmailNotifier { smtp_server: "smtp.example.com".to_string() } => dyn Notifier, dyn Logger
    );
    let logger: Arc<dyn Logger> = registry.get_interface()?;
    println!("   Current Logger: {}", logger.name());

    // -------------------------------------------------------------------------
    // 6. Missing contract
    // -------------------------------------------------------------------------
    registry.reset();
    match process_order(&registry, 1003) {
        Ok(()) => println!("\n6. unexpected success"),
        Err(err) => println!("\n6. After reset: {}", err),
    }

    println!("\n=== Example Complete ===");
    Ok(())
}

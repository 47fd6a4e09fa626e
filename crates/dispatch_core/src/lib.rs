pub mod clock;
pub mod config;
pub mod ecs;
pub mod engine;
pub mod error;
pub mod locator;
pub mod locks;
pub mod notify;
pub mod pricing;
pub mod routing;
pub mod runner;
pub mod session;
pub mod spatial;
pub mod store;
pub mod systems;
pub mod telemetry;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;

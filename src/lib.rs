// Infrastructure layer (shared components)
pub mod infrastructure;

pub use infrastructure::auth;
pub use infrastructure::config;
pub use infrastructure::error;
pub use infrastructure::metrics;
pub use infrastructure::postgres;

// Domain layer (resources, validation, pagination)
pub mod domain;

// Persistence
pub mod store;

// Application layer
pub mod api;
pub mod server;

// Supporting modules
pub mod telemetry;

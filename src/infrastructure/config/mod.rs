mod settings;

pub use settings::{
    DatabaseConfig, OtelConfig, PaginationConfig, ServerConfig, Settings, StoreConfig,
};

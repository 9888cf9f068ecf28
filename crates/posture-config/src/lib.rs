pub mod config;
pub mod loader;
pub mod validate;

pub use config::{Config, ServerConfig, SourcesConfig, StoreBackend, StoreConfig, DEFAULT_CONFIG_FILE};
pub use loader::{apply_env, load_config, load_with_env};
pub use validate::validate_config;

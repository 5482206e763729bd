// src/config/mod.rs
pub mod app;
pub mod secret;

pub use app::{
    config_path_default, load_config, load_config_from, AppConfig, DEFAULT_CONFIG_PATH,
    ENV_CONFIG_PATH,
};
pub use secret::Secret;

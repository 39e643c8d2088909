#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CalcArgs, Cli, Command, PlacesCommand};
pub use toml_config::AppConfig;

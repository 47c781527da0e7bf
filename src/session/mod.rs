//! Configuration, settings and sessions.

pub mod configuration;
pub mod factory;
pub mod settings;
pub mod sql_session;

pub use configuration::{Configuration, StrictMap};
pub use factory::SessionFactory;
pub use settings::{ConfigFile, DatabaseConfig, Placeholder, Settings, SettingsBuilder};
pub use sql_session::Session;

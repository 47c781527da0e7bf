//! Runtime settings and the TOML configuration file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BindError, BindResult};

/// Placeholder style written into compiled SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placeholder {
    /// `?` for every parameter.
    #[default]
    Question,
    /// `$1`, `$2`, ... in parameter order.
    Dollar,
}

impl Placeholder {
    /// Placeholder text for the parameter at `position` (1-based).
    pub fn render(&self, position: usize) -> String {
        match self {
            Placeholder::Question => "?".to_string(),
            Placeholder::Dollar => format!("${}", position),
        }
    }
}

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Match `author_name` columns to `authorName` properties.
    pub map_underscore_to_camel_case: bool,

    /// Call setters for `NULL` columns instead of leaving the property alone.
    pub call_setters_on_nulls: bool,

    /// Map columns to same-named properties without an explicit mapping.
    pub auto_mapping: bool,

    pub placeholder: Placeholder,

    pub open_token: String,
    pub close_token: String,

    /// Collapse runs of whitespace in compiled SQL.
    pub shrink_whitespaces_in_sql: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            map_underscore_to_camel_case: false,
            call_setters_on_nulls: false,
            auto_mapping: true,
            placeholder: Placeholder::Question,
            open_token: "#{".to_string(),
            close_token: "}".to_string(),
            shrink_whitespaces_in_sql: false,
        }
    }
}

impl Settings {
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }
}

/// Builder for [`Settings`].
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn map_underscore_to_camel_case(mut self, enabled: bool) -> Self {
        self.settings.map_underscore_to_camel_case = enabled;
        self
    }

    pub fn call_setters_on_nulls(mut self, enabled: bool) -> Self {
        self.settings.call_setters_on_nulls = enabled;
        self
    }

    pub fn auto_mapping(mut self, enabled: bool) -> Self {
        self.settings.auto_mapping = enabled;
        self
    }

    pub fn placeholder(mut self, placeholder: Placeholder) -> Self {
        self.settings.placeholder = placeholder;
        self
    }

    /// Set the template markers.
    pub fn tokens(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.settings.open_token = open.into();
        self.settings.close_token = close.into();
        self
    }

    pub fn shrink_whitespaces_in_sql(mut self, enabled: bool) -> Self {
        self.settings.shrink_whitespaces_in_sql = enabled;
        self
    }

    pub fn build(self) -> Settings {
        self.settings
    }
}

/// Database section of the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL, e.g. `sqlite::memory:` or `postgres://localhost/app`.
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

/// Contents of `sqlbind.toml`.
///
/// ```toml
/// mappers = ["mappers/blog.toml"]
///
/// [settings]
/// map_underscore_to_camel_case = true
/// placeholder = "dollar"
///
/// [database]
/// url = "sqlite::memory:"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub settings: Settings,

    /// Mapper files, relative to the configuration file.
    #[serde(default)]
    pub mappers: Vec<PathBuf>,

    pub database: Option<DatabaseConfig>,
}

impl ConfigFile {
    pub fn from_toml(content: &str) -> BindResult<Self> {
        toml::from_str(content).map_err(|e| BindError::Config(e.to_string()))
    }

    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> BindResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| BindError::Config(format!("{}: {}", path.display(), e)))
    }

    /// `<config dir>/sqlbind/sqlbind.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sqlbind").join("sqlbind.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.auto_mapping);
        assert!(!settings.map_underscore_to_camel_case);
        assert_eq!(settings.open_token, "#{");
        assert_eq!(Placeholder::Dollar.render(3), "$3");
    }

    #[test]
    fn test_parse_config_file() {
        let config = ConfigFile::from_toml(
            r#"
            mappers = ["blog.toml"]

            [settings]
            map_underscore_to_camel_case = true
            placeholder = "dollar"

            [database]
            url = "sqlite::memory:"
            "#,
        )
        .unwrap();
        assert!(config.settings.map_underscore_to_camel_case);
        assert!(config.settings.auto_mapping);
        assert_eq!(config.settings.placeholder, Placeholder::Dollar);
        assert_eq!(config.mappers, vec![PathBuf::from("blog.toml")]);
        assert_eq!(config.database.unwrap().max_connections, 5);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            ConfigFile::from_toml("settings = 3"),
            Err(BindError::Config(_))
        ));
    }
}

//! TOML mapper files.
//!
//! ```toml
//! namespace = "blog"
//!
//! [[result_map]]
//! id = "authorResult"
//! type = "Author"
//! mappings = [
//!     { property = "name", column = "author_name", jdbc_type = "VARCHAR" },
//! ]
//!
//! [[statement]]
//! id = "findAuthor"
//! kind = "select"
//! sql = "select * from author where id = #{id}"
//! parameter_type = "int"
//! result_map = "authorResult"
//! ```
//!
//! Type names resolve through the configuration's type aliases. Unknown keys
//! are ignored and statements of an unrecognized kind are skipped.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::builder::MapperBuilderAssistant;
use crate::error::{BindError, BindResult};
use crate::mapping::SqlCommandType;
use crate::session::Configuration;
use crate::types::SqlType;
use crate::value::ValueType;

#[derive(Debug, Clone, Deserialize)]
struct MapperFile {
    namespace: String,
    #[serde(default)]
    result_map: Vec<ResultMapEntry>,
    #[serde(default)]
    statement: Vec<StatementEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResultMapEntry {
    id: String,
    #[serde(rename = "type")]
    ty: String,
    auto_mapping: Option<bool>,
    #[serde(default)]
    mappings: Vec<ResultMappingEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResultMappingEntry {
    property: String,
    column: String,
    java_type: Option<String>,
    jdbc_type: Option<String>,
    type_handler: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct StatementEntry {
    id: String,
    kind: String,
    sql: String,
    parameter_type: Option<String>,
    result_type: Option<String>,
    result_map: Option<String>,
}

/// Registers the result maps and statements of one mapper file.
pub struct MapperFileBuilder<'c> {
    config: &'c mut Configuration,
    file: MapperFile,
    resource: String,
}

impl<'c> MapperFileBuilder<'c> {
    pub fn from_path(config: &'c mut Configuration, path: &Path) -> BindResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let resource = path.display().to_string();
        Self::from_content(config, &content, &resource)
    }

    pub fn from_content(config: &'c mut Configuration, content: &str, resource: &str) -> BindResult<Self> {
        let file: MapperFile =
            toml::from_str(content).map_err(|e| BindError::Config(format!("{}: {}", resource, e)))?;
        Ok(Self {
            config,
            file,
            resource: resource.to_string(),
        })
    }

    pub fn parse(self) -> BindResult<()> {
        if self.config.is_resource_loaded(&self.resource) {
            debug!("Skipping {}: already loaded", self.resource);
            return Ok(());
        }
        let file = self.file;
        let resource = self.resource;
        let mut assistant = MapperBuilderAssistant::new(self.config, resource.as_str());
        assistant.set_current_namespace(&file.namespace)?;

        for entry in &file.result_map {
            let ty = resolve_type(&assistant, &entry.ty)?;
            let mappings = entry
                .mappings
                .iter()
                .map(|m| {
                    let java_type = m
                        .java_type
                        .as_deref()
                        .map(|name| resolve_type(&assistant, name))
                        .transpose()?;
                    let sql_type = m
                        .jdbc_type
                        .as_deref()
                        .map(str::parse::<SqlType>)
                        .transpose()?;
                    assistant.build_result_mapping(
                        &ty,
                        &m.property,
                        &m.column,
                        java_type,
                        sql_type,
                        m.type_handler.as_deref(),
                    )
                })
                .collect::<BindResult<Vec<_>>>()?;
            assistant.add_result_map(&entry.id, ty, mappings, entry.auto_mapping)?;
        }

        let mut registered = 0;
        for entry in &file.statement {
            let kind = SqlCommandType::parse(&entry.kind);
            if kind == SqlCommandType::Unknown {
                debug!("Skipping {}.{}: unknown kind '{}'", file.namespace, entry.id, entry.kind);
                continue;
            }
            let parameter_type = entry
                .parameter_type
                .as_deref()
                .map(|name| resolve_type(&assistant, name))
                .transpose()?;
            let result_type = entry
                .result_type
                .as_deref()
                .map(|name| resolve_type(&assistant, name))
                .transpose()?;
            let sql = assistant.compile_sql(&entry.sql, parameter_type.as_ref())?;
            assistant.add_mapped_statement(
                &entry.id,
                sql,
                kind,
                parameter_type,
                entry.result_map.as_deref(),
                result_type,
            )?;
            registered += 1;
        }

        assistant.configuration_mut().add_loaded_resource(resource.as_str());
        info!(
            "Loaded {} statements and {} result maps from {}",
            registered,
            file.result_map.len(),
            resource
        );
        Ok(())
    }
}

fn resolve_type(assistant: &MapperBuilderAssistant<'_>, name: &str) -> BindResult<ValueType> {
    assistant.configuration().type_aliases().resolve(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAPPER: &str = r#"
        namespace = "stats"

        [[statement]]
        id = "count"
        kind = "select"
        sql = "select count(*) from visits where day = #{day}"
        parameter_type = "string"
        result_type = "long"

        [[statement]]
        id = "vacuum"
        kind = "maintenance"
        sql = "vacuum"
    "#;

    #[test]
    fn test_load_statements() {
        let mut config = Configuration::default();
        config.load_mapper_str(MAPPER, "stats.toml").unwrap();

        let statement = config.mapped_statement("stats.count").unwrap();
        assert_eq!(statement.sql().sql(), "select count(*) from visits where day = ?");
        assert_eq!(statement.parameter_type(), Some(&ValueType::String));
        assert_eq!(statement.result_maps()[0].id(), "stats.count-Inline");
        assert_eq!(statement.result_maps()[0].value_type(), &ValueType::Long);
        assert!(!config.has_statement("stats.vacuum"));
    }

    #[test]
    fn test_resource_loaded_once() {
        let mut config = Configuration::default();
        config.load_mapper_str(MAPPER, "stats.toml").unwrap();
        config.load_mapper_str(MAPPER, "stats.toml").unwrap();
        assert_eq!(config.mapped_statements().count(), 1);
    }

    #[test]
    fn test_unknown_type_alias() {
        let mut config = Configuration::default();
        let err = config
            .load_mapper_str(
                r#"
                namespace = "x"
                [[statement]]
                id = "find"
                kind = "select"
                sql = "select 1"
                result_type = "Ghost"
                "#,
                "x.toml",
            )
            .unwrap_err();
        assert!(err.to_string().contains("Ghost"));
    }
}

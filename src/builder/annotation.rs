//! Registers the statements declared by a [`Mapper`](crate::binding::Mapper).

use tracing::debug;

use crate::binding::{MapperDecl, MethodDecl};
use crate::builder::MapperBuilderAssistant;
use crate::error::{BindError, BindResult};
use crate::mapping::SqlCommandType;
use crate::session::Configuration;

/// Builds one statement per SQL-carrying method of a mapper declaration.
pub struct MapperAnnotationBuilder<'c, 'd> {
    assistant: MapperBuilderAssistant<'c>,
    decl: &'d MapperDecl,
}

impl<'c, 'd> MapperAnnotationBuilder<'c, 'd> {
    pub fn new(config: &'c mut Configuration, decl: &'d MapperDecl) -> Self {
        Self {
            assistant: MapperBuilderAssistant::new(config, decl.resource()),
            decl,
        }
    }

    pub fn parse(mut self) -> BindResult<()> {
        let resource = self.decl.resource();
        if self.assistant.configuration().is_resource_loaded(&resource) {
            debug!("Skipping {}: already loaded", resource);
            return Ok(());
        }
        if let Some(name) = self.decl.duplicate_method() {
            return Err(BindError::DuplicateId {
                collection: "Mapped Statements collection",
                id: format!("{}.{}", self.decl.namespace(), name),
            });
        }
        self.assistant.set_current_namespace(self.decl.namespace())?;
        for method in self.decl.methods() {
            self.parse_statement(method)?;
        }
        self.assistant.configuration_mut().add_loaded_resource(resource);
        Ok(())
    }

    fn parse_statement(&mut self, method: &MethodDecl) -> BindResult<()> {
        let Some(annotation) = method.sql_annotation() else {
            debug!("Skipping {}.{}: no SQL", self.decl.namespace(), method.name());
            return Ok(());
        };
        if annotation.kind == SqlCommandType::Unknown {
            debug!(
                "Skipping {}.{}: unknown statement kind",
                self.decl.namespace(),
                method.name()
            );
            return Ok(());
        }

        let parameter_type = method.parameter_type();
        let sql = self
            .assistant
            .compile_sql(&annotation.sql, parameter_type.as_ref())?;
        let result_type = if annotation.kind.is_select() {
            method.return_type().cloned()
        } else {
            None
        };

        self.assistant.add_mapped_statement(
            method.name(),
            sql,
            annotation.kind,
            parameter_type,
            method.result_map_id(),
            result_type,
        )?;
        Ok(())
    }
}

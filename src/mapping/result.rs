//! Result shapes.

use std::collections::HashSet;
use std::sync::Arc;

use crate::types::TypeHandler;
use crate::value::ValueType;

/// Maps one column to one property.
#[derive(Debug, Clone)]
pub struct ResultMapping {
    property: String,
    column: String,
    value_type: ValueType,
    type_handler: Arc<dyn TypeHandler>,
}

impl ResultMapping {
    pub fn new(
        property: impl Into<String>,
        column: impl Into<String>,
        value_type: ValueType,
        type_handler: Arc<dyn TypeHandler>,
    ) -> Self {
        Self {
            property: property.into(),
            column: column.into(),
            value_type,
            type_handler,
        }
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    pub fn type_handler(&self) -> &Arc<dyn TypeHandler> {
        &self.type_handler
    }
}

/// How rows of a statement become values.
#[derive(Debug, Clone)]
pub struct ResultMap {
    id: String,
    ty: ValueType,
    mappings: Vec<ResultMapping>,
    auto_mapping: Option<bool>,
    mapped_columns: HashSet<String>,
}

impl ResultMap {
    pub fn new(id: impl Into<String>, ty: ValueType, mappings: Vec<ResultMapping>) -> Self {
        let mapped_columns = mappings
            .iter()
            .map(|m| m.column.to_uppercase())
            .collect();
        Self {
            id: id.into(),
            ty,
            mappings,
            auto_mapping: None,
            mapped_columns,
        }
    }

    /// Override the global auto-mapping setting for this map.
    pub fn with_auto_mapping(mut self, auto_mapping: Option<bool>) -> Self {
        self.auto_mapping = auto_mapping;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Type of each materialized row.
    pub fn value_type(&self) -> &ValueType {
        &self.ty
    }

    pub fn mappings(&self) -> &[ResultMapping] {
        &self.mappings
    }

    pub fn auto_mapping(&self) -> Option<bool> {
        self.auto_mapping
    }

    /// True when `column` has an explicit mapping (case-insensitive).
    pub fn is_mapped_column(&self, column: &str) -> bool {
        self.mapped_columns.contains(&column.to_uppercase())
    }
}

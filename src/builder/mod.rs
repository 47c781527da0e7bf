//! Builders that turn declarations into registered statements.
//!
//! Both entry points, [`MapperAnnotationBuilder`] for [`Mapper`] declarations
//! and [`MapperFileBuilder`] for TOML files, go through the
//! [`MapperBuilderAssistant`], which owns namespace rules and registration.
//!
//! [`Mapper`]: crate::binding::Mapper

pub mod annotation;
pub mod assistant;
pub mod loader;
pub mod sql_source;

pub use annotation::MapperAnnotationBuilder;
pub use assistant::MapperBuilderAssistant;
pub use loader::MapperFileBuilder;
pub use sql_source::SqlSourceBuilder;

//! # sqlbind
//!
//! Bind mapper interfaces to hand-written SQL templates.
//!
//! Statements are plain SQL with `#{property}` placeholders. Each placeholder
//! is compiled once into a positional marker plus a parameter mapping that
//! knows how to read and marshal the property at execution time.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use sqlbind::prelude::*;
//!
//! struct BlogMapper;
//!
//! impl Mapper for BlogMapper {
//!     fn declare() -> MapperDecl {
//!         MapperDecl::new::<Self>().with_namespace("blog").method(
//!             MethodDecl::new("findTitle")
//!                 .select(&["select title from blog where id = #{id}"])
//!                 .param("id", ValueType::Int)
//!                 .returns(ValueType::String),
//!         )
//!     }
//! }
//!
//! let mut config = Configuration::default();
//! config.add_mapper::<BlogMapper>()?;
//! let factory = SessionFactory::new(Arc::new(config), transactions);
//!
//! let session = factory.open_session()?;
//! let title: Option<String> = session
//!     .get_mapper::<BlogMapper>()?
//!     .call("findTitle", vec![Value::Int(1)])?;
//! ```
//!
//! ## Placeholder Options
//!
//! | Option         | Meaning                                   |
//! |----------------|-------------------------------------------|
//! | `javaType`     | Declared value type (type alias)          |
//! | `jdbcType`     | Wire type, also written `#{id:INTEGER}`   |
//! | `mode`         | `IN`, `OUT` or `INOUT`                    |
//! | `numericScale` | Scale for numeric wire types              |
//! | `typeHandler`  | Named type handler                        |
//! | `resultMap`    | Result map of an `OUT` cursor parameter   |

pub mod binding;
pub mod builder;
pub mod error;
pub mod executor;
pub mod mapping;
pub mod parsing;
pub mod reflection;
pub mod session;
pub mod types;
pub mod value;

pub mod prelude {
    pub use crate::binding::{Mapper, MapperDecl, MapperProxy, MethodDecl, ParamMap};
    pub use crate::error::*;
    pub use crate::executor::{Executor, Transaction, TransactionFactory};
    pub use crate::mapping::{MappedStatement, SqlCommandType, StaticSql};
    pub use crate::reflection::{Mappable, PropertyNavigator, TypeShape};
    pub use crate::session::{Configuration, Session, SessionFactory, Settings};
    pub use crate::types::{SqlType, TypeHandler};
    pub use crate::value::{FromValue, Row, Value, ValueType};
}

/// Compile a template against the default configuration.
///
/// # Example
///
/// ```
/// let sql = sqlbind::compile("select * from t where id = #{id}").unwrap();
/// assert_eq!(sql.sql(), "select * from t where id = ?");
/// assert_eq!(sql.parameter_mappings()[0].property(), "id");
/// ```
pub fn compile(template: &str) -> error::BindResult<mapping::StaticSql> {
    let config = session::Configuration::default();
    builder::SqlSourceBuilder::new(&config).parse(template, None)
}

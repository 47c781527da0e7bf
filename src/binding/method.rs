//! Binding of one mapper method to its statement.

use tracing::debug;

use crate::binding::{MapperDecl, MethodDecl, ParamNameResolver};
use crate::error::{BindError, BindResult};
use crate::mapping::SqlCommandType;
use crate::session::{Configuration, Session};
use crate::value::{Value, ValueType};

/// The statement a method executes.
#[derive(Debug, Clone)]
pub struct SqlCommand {
    name: String,
    kind: SqlCommandType,
}

impl SqlCommand {
    pub fn resolve(config: &Configuration, decl: &MapperDecl, method: &MethodDecl) -> BindResult<Self> {
        let id = format!("{}.{}", decl.namespace(), method.name());
        let statement = config
            .mapped_statement(&id)
            .map_err(|_| BindError::binding(format!("Invalid bound statement (not found): {}", id)))?;
        if statement.command_type() == SqlCommandType::Unknown {
            return Err(BindError::binding(format!("Unknown execution method for: {}", id)));
        }
        Ok(Self {
            name: id,
            kind: statement.command_type(),
        })
    }

    /// Fully qualified statement id.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SqlCommandType {
        self.kind
    }
}

/// Return shape and argument naming of a method.
#[derive(Debug, Clone)]
pub struct MethodSignature {
    return_type: Option<ValueType>,
    param_resolver: ParamNameResolver,
}

impl MethodSignature {
    pub fn new(method: &MethodDecl) -> Self {
        Self {
            return_type: method.return_type().cloned(),
            param_resolver: ParamNameResolver::new(method),
        }
    }

    pub fn return_type(&self) -> Option<&ValueType> {
        self.return_type.as_ref()
    }

    pub fn returns_void(&self) -> bool {
        self.return_type.is_none()
    }

    pub fn returns_many(&self) -> bool {
        self.return_type.as_ref().is_some_and(ValueType::is_list)
    }

    pub fn convert_args(&self, args: Vec<Value>) -> BindResult<Value> {
        self.param_resolver.named_params(args)
    }
}

/// A resolved method, built once per mapper method and cached by the proxy
/// factory.
#[derive(Debug, Clone)]
pub struct MapperMethod {
    command: SqlCommand,
    signature: MethodSignature,
}

impl MapperMethod {
    pub fn new(config: &Configuration, decl: &MapperDecl, method: &MethodDecl) -> BindResult<Self> {
        let command = SqlCommand::resolve(config, decl, method)?;
        debug!("Bound {}::{} to {} {}", decl.type_name(), method.name(), command.kind, command.name);
        Ok(Self {
            command,
            signature: MethodSignature::new(method),
        })
    }

    pub fn command(&self) -> &SqlCommand {
        &self.command
    }

    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    /// Run the statement through `session` and shape the result after the
    /// declared return type.
    pub fn execute(&self, session: &Session, args: Vec<Value>) -> BindResult<Value> {
        let param = self.signature.convert_args(args)?;
        let name = self.command.name();
        match self.command.kind {
            SqlCommandType::Insert => self.row_count_result(session.insert(name, param)?),
            SqlCommandType::Update => self.row_count_result(session.update(name, param)?),
            SqlCommandType::Delete => self.row_count_result(session.delete(name, param)?),
            SqlCommandType::Select if self.signature.returns_void() => {
                session.select_list(name, param)?;
                Ok(Value::Null)
            }
            SqlCommandType::Select if self.signature.returns_many() => {
                Ok(Value::List(session.select_list(name, param)?))
            }
            SqlCommandType::Select => {
                let result = session.select_one(name, param)?;
                if let Some(ty) = self.signature.return_type()
                    && result.is_null()
                    && is_primitive(ty)
                {
                    return Err(BindError::binding(format!(
                        "Mapper method '{}' attempted to return null from a method with a primitive return type ({}).",
                        name, ty
                    )));
                }
                Ok(result)
            }
            SqlCommandType::Unknown => Err(BindError::binding(format!(
                "Unknown execution method for: {}",
                name
            ))),
        }
    }

    fn row_count_result(&self, rows: u64) -> BindResult<Value> {
        match self.signature.return_type() {
            None => Ok(Value::Null),
            Some(ValueType::Int) => i32::try_from(rows).map(Value::Int).map_err(|_| {
                BindError::type_error(format!("Row count {} does not fit in int", rows))
            }),
            Some(ValueType::Long) => i64::try_from(rows).map(Value::Long).map_err(|_| {
                BindError::type_error(format!("Row count {} does not fit in long", rows))
            }),
            Some(ValueType::Bool) => Ok(Value::Bool(rows > 0)),
            Some(other) => Err(BindError::binding(format!(
                "Mapper method '{}' has an unsupported return type: {}",
                self.command.name, other
            ))),
        }
    }
}

fn is_primitive(ty: &ValueType) -> bool {
    matches!(
        ty,
        ValueType::Bool | ValueType::Int | ValueType::Long | ValueType::Double
    )
}

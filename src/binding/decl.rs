//! Mapper declarations: the methods of a mapper interface, their SQL,
//! parameters and return types.

use crate::mapping::SqlCommandType;
use crate::value::ValueType;

/// A mapper interface.
///
/// ```ignore
/// struct BlogMapper;
///
/// impl Mapper for BlogMapper {
///     fn declare() -> MapperDecl {
///         MapperDecl::new::<Self>()
///             .method(
///                 MethodDecl::new("findById")
///                     .select(&["select * from blog", "where id = #{id}"])
///                     .param("id", ValueType::Int)
///                     .returns(ValueType::object::<Blog>()),
///             )
///     }
/// }
/// ```
pub trait Mapper: 'static {
    fn declare() -> MapperDecl;
}

/// SQL attached to a method, with its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlAnnotation {
    pub kind: SqlCommandType,
    pub sql: String,
}

impl SqlAnnotation {
    /// Join `fragments` with single spaces.
    pub fn new(kind: SqlCommandType, fragments: &[&str]) -> Self {
        Self {
            kind,
            sql: fragments.join(" ").trim().to_string(),
        }
    }
}

/// One declared method parameter; unnamed parameters are called `arg<i>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
    pub name: Option<String>,
    pub ty: ValueType,
}

/// One mapper method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    name: String,
    sql: Option<SqlAnnotation>,
    params: Vec<ParamDecl>,
    returns: Option<ValueType>,
    result_map: Option<String>,
}

impl MethodDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql: None,
            params: Vec::new(),
            returns: None,
            result_map: None,
        }
    }

    pub fn sql(mut self, kind: SqlCommandType, fragments: &[&str]) -> Self {
        self.sql = Some(SqlAnnotation::new(kind, fragments));
        self
    }

    pub fn select(self, fragments: &[&str]) -> Self {
        self.sql(SqlCommandType::Select, fragments)
    }

    pub fn insert(self, fragments: &[&str]) -> Self {
        self.sql(SqlCommandType::Insert, fragments)
    }

    pub fn update(self, fragments: &[&str]) -> Self {
        self.sql(SqlCommandType::Update, fragments)
    }

    pub fn delete(self, fragments: &[&str]) -> Self {
        self.sql(SqlCommandType::Delete, fragments)
    }

    /// A named parameter.
    pub fn param(mut self, name: impl Into<String>, ty: ValueType) -> Self {
        let name: String = name.into();
        self.params.push(ParamDecl {
            name: (!name.is_empty()).then_some(name),
            ty,
        });
        self
    }

    /// An unnamed parameter.
    pub fn arg(mut self, ty: ValueType) -> Self {
        self.params.push(ParamDecl { name: None, ty });
        self
    }

    /// Declared return type; methods without one return nothing.
    pub fn returns(mut self, ty: ValueType) -> Self {
        self.returns = Some(ty);
        self
    }

    /// Use a registered result map instead of an inline one.
    pub fn result_map(mut self, id: impl Into<String>) -> Self {
        self.result_map = Some(id.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sql_annotation(&self) -> Option<&SqlAnnotation> {
        self.sql.as_ref()
    }

    pub fn params(&self) -> &[ParamDecl] {
        &self.params
    }

    pub fn return_type(&self) -> Option<&ValueType> {
        self.returns.as_ref()
    }

    pub fn result_map_id(&self) -> Option<&str> {
        self.result_map.as_deref()
    }

    /// Statement parameter type: none, the single argument's type, or the
    /// named bag for several arguments.
    pub fn parameter_type(&self) -> Option<ValueType> {
        match self.params.as_slice() {
            [] => None,
            [single] => Some(single.ty.clone()),
            _ => Some(ValueType::Params),
        }
    }
}

/// All methods of one mapper, under one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapperDecl {
    type_name: &'static str,
    namespace: String,
    methods: Vec<MethodDecl>,
}

impl MapperDecl {
    /// Declaration for `M`, namespaced by its type path.
    pub fn new<M: ?Sized + 'static>() -> Self {
        let type_name = std::any::type_name::<M>();
        Self {
            type_name,
            namespace: type_name.to_string(),
            methods: Vec::new(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Add a method. Methods keep declaration order; a repeated name is
    /// rejected when the mapper is registered.
    pub fn method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Resource name used to detect repeated loading.
    pub fn resource(&self) -> String {
        format!("{} (mapper)", self.type_name)
    }

    pub fn get(&self, name: &str) -> Option<&MethodDecl> {
        self.methods.iter().find(|method| method.name == name)
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.methods.iter()
    }

    /// First method name declared more than once.
    pub fn duplicate_method(&self) -> Option<&str> {
        self.methods
            .iter()
            .enumerate()
            .find(|(i, method)| self.methods[..*i].iter().any(|m| m.name == method.name))
            .map(|(_, method)| method.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sample;

    #[test]
    fn test_parameter_type_shapes() {
        let none = MethodDecl::new("count");
        let one = MethodDecl::new("find").param("id", ValueType::Int);
        let two = MethodDecl::new("search")
            .param("id", ValueType::Int)
            .arg(ValueType::String);
        assert_eq!(none.parameter_type(), None);
        assert_eq!(one.parameter_type(), Some(ValueType::Int));
        assert_eq!(two.parameter_type(), Some(ValueType::Params));
    }

    #[test]
    fn test_sql_fragments_joined() {
        let method = MethodDecl::new("find").select(&["select *", "from t ", ""]);
        assert_eq!(method.sql_annotation().unwrap().sql, "select * from t");
    }

    #[test]
    fn test_duplicate_method_detected() {
        let decl = MapperDecl::new::<Sample>()
            .method(MethodDecl::new("find").select(&["select 1"]))
            .method(MethodDecl::new("count"))
            .method(MethodDecl::new("find").select(&["select 2"]));
        assert_eq!(decl.duplicate_method(), Some("find"));
        assert_eq!(decl.get("find").unwrap().sql_annotation().unwrap().sql, "select 1");
        assert_eq!(decl.methods().count(), 3);
    }

    #[test]
    fn test_default_namespace() {
        let decl = MapperDecl::new::<Sample>();
        assert!(decl.namespace().ends_with("Sample"));
        let decl = decl.with_namespace("sample");
        assert_eq!(decl.namespace(), "sample");
    }
}

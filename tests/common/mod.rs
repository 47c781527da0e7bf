//! Shared fixtures: mappable types, a mapper and a recording transaction.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use sqlbind::prelude::*;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Author {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
    pub favourite_section: Option<String>,
}

impl Mappable for Author {
    fn type_shape() -> TypeShape {
        TypeShape::builder::<Author>()
            .default_constructor()
            .field(
                "id",
                ValueType::Int,
                |a: &Author| a.id,
                |a: &mut Author, v: i32| a.id = v,
            )
            .getter("getUsername", ValueType::String, |a: &Author| a.username.clone())
            .setter("setUsername", ValueType::String, |a: &mut Author, v: String| a.username = v)
            .field(
                "email",
                ValueType::String,
                |a: &Author| a.email.clone(),
                |a: &mut Author, v: Option<String>| a.email = v,
            )
            .field(
                "favouriteSection",
                ValueType::String,
                |a: &Author| a.favourite_section.clone(),
                |a: &mut Author, v: Option<String>| a.favourite_section = v,
            )
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blog {
    pub id: i32,
    pub title: String,
    pub author: Option<Author>,
}

impl Mappable for Blog {
    fn type_shape() -> TypeShape {
        TypeShape::builder::<Blog>()
            .default_constructor()
            .field("id", ValueType::Int, |b: &Blog| b.id, |b: &mut Blog, v: i32| b.id = v)
            .field(
                "title",
                ValueType::String,
                |b: &Blog| b.title.clone(),
                |b: &mut Blog, v: String| b.title = v,
            )
            .field(
                "author",
                ValueType::object::<Author>(),
                |b: &Blog| b.author.clone(),
                |b: &mut Blog, v: Option<Author>| b.author = v,
            )
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Widget {
    pub id: i32,
    pub name: String,
}

impl Mappable for Widget {
    fn type_shape() -> TypeShape {
        TypeShape::builder::<Widget>()
            .default_constructor()
            .field("id", ValueType::Int, |w: &Widget| w.id, |w: &mut Widget, v: i32| w.id = v)
            .field(
                "name",
                ValueType::String,
                |w: &Widget| w.name.clone(),
                |w: &mut Widget, v: String| w.name = v,
            )
            .build()
    }
}

pub struct AuthorMapper;

impl Mapper for AuthorMapper {
    fn declare() -> MapperDecl {
        MapperDecl::new::<Self>()
            .with_namespace("author")
            .method(
                MethodDecl::new("selectAuthor")
                    .select(&["select * from author", "where id = #{id}"])
                    .param("id", ValueType::Int)
                    .returns(ValueType::object::<Author>()),
            )
            .method(
                MethodDecl::new("selectAll")
                    .select(&["select * from author order by id"])
                    .returns(ValueType::list(ValueType::object::<Author>())),
            )
            .method(
                MethodDecl::new("countAuthors")
                    .select(&["select count(*) from author"])
                    .returns(ValueType::Long),
            )
            .method(
                MethodDecl::new("findByName")
                    .select(&[
                        "select * from author",
                        "where username = #{username} and id > #{param2}",
                    ])
                    .param("username", ValueType::String)
                    .param("minId", ValueType::Int)
                    .returns(ValueType::list(ValueType::object::<Author>())),
            )
            .method(
                MethodDecl::new("insertAuthor")
                    .insert(&[
                        "insert into author (id, username, email)",
                        "values (#{id}, #{username}, #{email})",
                    ])
                    .arg(ValueType::object::<Author>())
                    .returns(ValueType::Int),
            )
            .method(
                MethodDecl::new("deleteAuthor")
                    .delete(&["delete from author where id = #{id}"])
                    .param("id", ValueType::Int)
                    .returns(ValueType::Bool),
            )
            .method(
                MethodDecl::new("touchAuthor")
                    .update(&["update author set username = username where id = #{id}"])
                    .param("id", ValueType::Int),
            )
            .method(MethodDecl::new("helper"))
    }
}

/// One statement seen by a [`Recorder`].
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub sql: String,
    pub params: Vec<Value>,
}

#[derive(Debug, Default)]
struct RecorderState {
    calls: Vec<Call>,
    rows: Vec<Row>,
    affected: u64,
    commits: usize,
    rollbacks: usize,
    closes: usize,
}

/// Transaction factory whose transactions record every call and answer
/// queries with canned rows.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    state: Arc<Mutex<RecorderState>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rows(&self, rows: Vec<Row>) {
        self.state.lock().unwrap().rows = rows;
    }

    pub fn set_affected(&self, affected: u64) {
        self.state.lock().unwrap().affected = affected;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn last_call(&self) -> Call {
        self.calls().pop().expect("no statement was executed")
    }

    pub fn commits(&self) -> usize {
        self.state.lock().unwrap().commits
    }

    pub fn rollbacks(&self) -> usize {
        self.state.lock().unwrap().rollbacks
    }

    pub fn closes(&self) -> usize {
        self.state.lock().unwrap().closes
    }
}

impl TransactionFactory for Recorder {
    fn new_transaction(&self, _autocommit: bool) -> BindResult<Box<dyn Transaction>> {
        Ok(Box::new(RecordingTransaction {
            state: Arc::clone(&self.state),
        }))
    }
}

struct RecordingTransaction {
    state: Arc<Mutex<RecorderState>>,
}

impl RecordingTransaction {
    fn record(&self, sql: &str, params: &[Value]) {
        self.state.lock().unwrap().calls.push(Call {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
    }
}

impl Transaction for RecordingTransaction {
    fn query(&mut self, sql: &str, params: &[Value]) -> BindResult<Vec<Row>> {
        self.record(sql, params);
        Ok(self.state.lock().unwrap().rows.clone())
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> BindResult<u64> {
        self.record(sql, params);
        Ok(self.state.lock().unwrap().affected)
    }

    fn commit(&mut self) -> BindResult<()> {
        self.state.lock().unwrap().commits += 1;
        Ok(())
    }

    fn rollback(&mut self) -> BindResult<()> {
        self.state.lock().unwrap().rollbacks += 1;
        Ok(())
    }

    fn close(&mut self) -> BindResult<()> {
        self.state.lock().unwrap().closes += 1;
        Ok(())
    }
}

/// Build a row from `(column, value)` pairs.
pub fn row(columns: &[(&str, Value)]) -> Row {
    columns
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

/// A configuration with [`AuthorMapper`] registered, and a session factory
/// over `recorder`.
pub fn author_factory(recorder: &Recorder) -> SessionFactory {
    let mut config = Configuration::default();
    config.add_mapper::<AuthorMapper>().unwrap();
    SessionFactory::new(Arc::new(config), Arc::new(recorder.clone()))
}

mod common;

use std::sync::Arc;
use std::thread;

use common::{Author, AuthorMapper, Recorder, Widget, author_factory, row};
use pretty_assertions::assert_eq;
use sqlbind::binding::ParamNameResolver;
use sqlbind::prelude::*;

fn ann() -> Row {
    row(&[
        ("id", Value::Int(1)),
        ("username", Value::from("ann")),
        ("email", Value::Null),
    ])
}

#[test]
fn test_multiple_arguments_become_named_bag() {
    let method = MethodDecl::new("search")
        .param("id", ValueType::Int)
        .param("name", ValueType::String);
    let resolver = ParamNameResolver::new(&method);

    let Value::Params(params) = resolver
        .named_params(vec![Value::Int(42), Value::from("x")])
        .unwrap()
    else {
        panic!("expected a parameter bag");
    };
    let keys: Vec<&str> = params.keys().collect();
    assert_eq!(keys, vec!["id", "param1", "name", "param2"]);
    assert_eq!(params.get("id").unwrap(), &Value::Int(42));
    assert_eq!(params.get("param1").unwrap(), &Value::Int(42));
    assert_eq!(params.get("name").unwrap(), &Value::from("x"));
    assert_eq!(params.get("param2").unwrap(), &Value::from("x"));
}

#[test]
fn test_select_one_object() {
    let recorder = Recorder::new();
    recorder.set_rows(vec![ann()]);
    let factory = author_factory(&recorder);
    let session = factory.open_session().unwrap();
    let mapper = session.get_mapper::<AuthorMapper>().unwrap();

    let author: Option<Author> = mapper.call("selectAuthor", vec![Value::Int(1)]).unwrap();
    assert_eq!(
        author,
        Some(Author {
            id: 1,
            username: "ann".to_string(),
            email: None,
            favourite_section: None,
        })
    );

    let call = recorder.last_call();
    assert_eq!(call.sql, "select * from author where id = ?");
    assert_eq!(call.params, vec![Value::Int(1)]);
}

#[test]
fn test_select_one_without_rows_is_none() {
    let recorder = Recorder::new();
    let factory = author_factory(&recorder);
    let session = factory.open_session().unwrap();
    let mapper = session.get_mapper::<AuthorMapper>().unwrap();

    let author: Option<Author> = mapper.call("selectAuthor", vec![Value::Int(9)]).unwrap();
    assert_eq!(author, None);
}

#[test]
fn test_select_one_with_many_rows_fails() {
    let recorder = Recorder::new();
    recorder.set_rows(vec![ann(), ann()]);
    let factory = author_factory(&recorder);
    let session = factory.open_session().unwrap();
    let mapper = session.get_mapper::<AuthorMapper>().unwrap();

    let err = mapper.invoke("selectAuthor", vec![Value::Int(1)]).unwrap_err();
    assert!(matches!(err, BindError::TooManyResults(2)));
}

#[test]
fn test_select_many() {
    let recorder = Recorder::new();
    let mut bob = ann();
    bob.insert("id".to_string(), Value::Int(2));
    bob.insert("username".to_string(), Value::from("bob"));
    recorder.set_rows(vec![ann(), bob]);
    let factory = author_factory(&recorder);
    let session = factory.open_session().unwrap();
    let mapper = session.get_mapper::<AuthorMapper>().unwrap();

    let authors: Vec<Author> = mapper.call("selectAll", Vec::new()).unwrap();
    let names: Vec<&str> = authors.iter().map(|a| a.username.as_str()).collect();
    assert_eq!(names, vec!["ann", "bob"]);
    assert!(recorder.last_call().params.is_empty());
}

#[test]
fn test_named_bag_reaches_transaction() {
    let recorder = Recorder::new();
    let factory = author_factory(&recorder);
    let session = factory.open_session().unwrap();
    let mapper = session.get_mapper::<AuthorMapper>().unwrap();

    let authors: Vec<Author> = mapper
        .call("findByName", vec![Value::from("ann"), Value::Int(5)])
        .unwrap();
    assert!(authors.is_empty());
    assert_eq!(
        recorder.last_call().params,
        vec![Value::from("ann"), Value::Int(5)]
    );
}

#[test]
fn test_scalar_results() {
    let recorder = Recorder::new();
    recorder.set_rows(vec![row(&[("count(*)", Value::Long(3))])]);
    let factory = author_factory(&recorder);
    let session = factory.open_session().unwrap();
    let mapper = session.get_mapper::<AuthorMapper>().unwrap();

    let count: i64 = mapper.call("countAuthors", Vec::new()).unwrap();
    assert_eq!(count, 3);

    recorder.set_rows(Vec::new());
    let err = mapper.invoke("countAuthors", Vec::new()).unwrap_err();
    assert!(err.to_string().contains("attempted to return null"));
}

#[test]
fn test_update_counts_follow_return_type() {
    let recorder = Recorder::new();
    recorder.set_affected(1);
    let factory = author_factory(&recorder);
    let session = factory.open_session().unwrap();
    let mapper = session.get_mapper::<AuthorMapper>().unwrap();

    let author = Author {
        id: 5,
        username: "dan".to_string(),
        ..Author::default()
    };
    let inserted: i32 = mapper.call("insertAuthor", vec![author.into()]).unwrap();
    assert_eq!(inserted, 1);
    assert_eq!(
        recorder.last_call().params,
        vec![Value::Int(5), Value::from("dan"), Value::Null]
    );

    let deleted: bool = mapper.call("deleteAuthor", vec![Value::Int(5)]).unwrap();
    assert!(deleted);

    let touched = mapper.invoke("touchAuthor", vec![Value::Int(5)]).unwrap();
    assert_eq!(touched, Value::Null);
}

#[test]
fn test_binding_errors() {
    let recorder = Recorder::new();
    let factory = author_factory(&recorder);
    let session = factory.open_session().unwrap();
    let mapper = session.get_mapper::<AuthorMapper>().unwrap();

    let err = mapper.invoke("helper", Vec::new()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Binding error: Invalid bound statement (not found): author.helper"
    );

    let err = mapper.invoke("nope", Vec::new()).unwrap_err();
    assert!(err.to_string().contains("is not declared by mapper"));

    let err = mapper.invoke("selectAuthor", Vec::new()).unwrap_err();
    assert!(err.to_string().contains("expects 1 argument(s)"));

    struct Unregistered;
    impl Mapper for Unregistered {
        fn declare() -> MapperDecl {
            MapperDecl::new::<Self>()
        }
    }
    let err = session.get_mapper::<Unregistered>().err().unwrap();
    assert!(err.to_string().contains("is not known to the MapperRegistry"));
}

#[test]
fn test_concurrent_calls_share_one_binding() {
    let recorder = Recorder::new();
    recorder.set_rows(vec![ann()]);
    let factory = author_factory(&recorder);
    let session = factory.open_session().unwrap();
    let mapper = session.get_mapper::<AuthorMapper>().unwrap();

    thread::scope(|s| {
        for _ in 0..8 {
            let mapper = mapper.clone();
            s.spawn(move || {
                let author: Option<Author> = mapper.call("selectAuthor", vec![Value::Int(1)]).unwrap();
                assert_eq!(author.map(|a| a.id), Some(1));
            });
        }
    });

    assert_eq!(mapper.factory().cached_methods(), 1);
    assert_eq!(recorder.calls().len(), 8);
}

#[test]
fn test_commit_and_rollback() {
    let recorder = Recorder::new();
    recorder.set_affected(1);
    let factory = author_factory(&recorder);

    {
        let session = factory.open_session().unwrap();
        session.commit().unwrap();
        assert_eq!(recorder.commits(), 0);

        session.delete("author.deleteAuthor", 5).unwrap();
        assert!(session.is_dirty());
        session.commit().unwrap();
        assert_eq!(recorder.commits(), 1);
        assert!(!session.is_dirty());

        session.update("author.touchAuthor", 5).unwrap();
    }

    assert_eq!(recorder.rollbacks(), 1);
    assert_eq!(recorder.closes(), 1);
}

#[test]
fn test_closed_session_rejects_work() {
    let recorder = Recorder::new();
    let factory = author_factory(&recorder);
    let session = factory.open_session().unwrap();
    session.close();

    let err = session.select_list("author.selectAll", Value::Null).unwrap_err();
    assert_eq!(err.to_string(), "Executor error: Executor was closed.");
    drop(session);
    assert_eq!(recorder.closes(), 1);
}

#[test]
fn test_mapper_file_session_roundtrip() {
    let settings = Settings::builder().map_underscore_to_camel_case(true).build();
    let mut config = Configuration::new(settings);
    config.type_aliases_mut().register_type::<Author>().unwrap();
    config.type_aliases_mut().register_type::<Widget>().unwrap();
    config
        .load_mapper_str(
            r#"
            namespace = "blog"

            [[result_map]]
            id = "authorResult"
            type = "author"
            mappings = [{ property = "username", column = "author_name" }]

            [[statement]]
            id = "selectAuthors"
            kind = "select"
            sql = "select * from author where email like #{pattern}"
            parameter_type = "string"
            result_map = "authorResult"

            [[statement]]
            id = "widgetRows"
            kind = "select"
            sql = "select * from widget"
            result_type = "map"
            "#,
            "blog.toml",
        )
        .unwrap();

    let recorder = Recorder::new();
    recorder.set_rows(vec![row(&[
        ("id", Value::Int(4)),
        ("author_name", Value::from("eve")),
        ("favourite_section", Value::from("news")),
    ])]);
    let factory = SessionFactory::new(Arc::new(config), Arc::new(recorder.clone()));
    let session = factory.open_session().unwrap();

    let authors = session.select_list("blog.selectAuthors", "%@x.org").unwrap();
    let author = authors[0].clone().into_object::<Author>().unwrap();
    assert_eq!(author.id, 4);
    assert_eq!(author.username, "eve");
    assert_eq!(author.favourite_section.as_deref(), Some("news"));
    assert_eq!(recorder.last_call().params, vec![Value::from("%@x.org")]);

    let rows = session.select_list("widgetRows", Value::Null).unwrap();
    let Value::Map(map) = &rows[0] else {
        panic!("expected a map row");
    };
    assert_eq!(map.get("author_name"), Some(&Value::from("eve")));
}

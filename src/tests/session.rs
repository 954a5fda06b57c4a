use super::support::*;
use crate::driver::{ProgramParser, Session, SessionOptions};
use crate::language::{ast::BinaryOp, ast::Program, errors::CompilerError, span::Span};
use crate::runtime::{OutputBuffer, Value};

#[test]
fn declarations_persist_between_programs() {
    let (mut session, output) = session();
    session
        .run(&program(vec![
            let_("base", int(40)),
            function(
                "plus_base",
                vec![("n", ty("int"))],
                ty("int"),
                vec![ret(binary(var("base"), BinaryOp::Add, var("n")))],
            ),
        ]))
        .unwrap();
    let value = session
        .run(&program(vec![expr_stmt(call("plus_base", vec![int(2)]))]))
        .unwrap();
    assert_eq!(value, Value::Int(42));
    assert!(output.lines().is_empty());
}

#[test]
fn type_errors_stop_before_evaluation() {
    let (result, output) = run(vec![print(string("early")), print(var("missing"))]);
    assert_eq!(result.unwrap_err().kind(), "UnknownVariable");
    assert!(output.contents().is_empty());
}

#[test]
fn failed_program_does_not_break_the_session() {
    let (mut session, output) = session();
    assert!(session.run(&program(vec![print(var("later"))])).is_err());
    session
        .run(&program(vec![let_("later", int(1)), print(var("later"))]))
        .unwrap();
    assert_eq!(output.lines(), vec!["1"]);
    assert_eq!(session.type_env().depth(), 1);
    assert_eq!(session.runtime_env().depth(), 1);
}

#[test]
fn builtins_are_opt_in() {
    let output = OutputBuffer::new();
    let mut session = Session::new(SessionOptions {
        prelude: false,
        output: Some(Box::new(output.clone())),
    });
    let err = session
        .run(&program(vec![print(call("sum", vec![int(1), int(2)]))]))
        .unwrap_err();
    assert!(matches!(err, CompilerError::UnknownVariable { ref name, .. } if name == "sum"));
}

#[test]
fn type_error_discards_earlier_declarations() {
    let (mut session, output) = session();
    let err = session
        .run(&program(vec![
            let_("x", int(1)),
            print(binary(var("x"), BinaryOp::Add, boolean(true))),
        ]))
        .unwrap_err();
    assert_eq!(err.kind(), "InvalidOperationError");

    let err = session.run(&program(vec![print(var("x"))])).unwrap_err();
    assert!(matches!(err, CompilerError::UnknownVariable { ref name, .. } if name == "x"));
    assert!(output.lines().is_empty());
}

#[test]
fn runtime_error_discards_the_whole_program() {
    let (mut session, output) = session();
    let err = session
        .run(&program(vec![
            let_("a", array(vec![int(1)])),
            let_("b", index(var("a"), int(3))),
            let_("c", int(2)),
        ]))
        .unwrap_err();
    assert_eq!(err.kind(), "IndexingOutOfRange");

    for name in ["a", "b", "c"] {
        let err = session.run(&program(vec![print(var(name))])).unwrap_err();
        assert_eq!(err.kind(), "UnknownVariable");
    }
    assert!(session.type_env().get_var("a").is_none());
    assert!(session.runtime_env().get("a").is_none());

    session
        .run(&program(vec![let_("b", string("fresh")), print(var("b"))]))
        .unwrap();
    assert_eq!(output.lines(), vec!["fresh"]);
}

#[test]
fn runtime_error_keeps_earlier_programs() {
    let (mut session, output) = session();
    session.run(&program(vec![let_("kept", int(7))])).unwrap();
    let err = session
        .run(&program(vec![
            function("broken", vec![], ty("int"), vec![print(var("kept"))]),
            expr_stmt(call("broken", vec![])),
        ]))
        .unwrap_err();
    assert_eq!(err.kind(), "MissingReturn");
    assert!(session.type_env().get_var("broken").is_none());

    session.run(&program(vec![print(var("kept"))])).unwrap();
    assert_eq!(output.lines(), vec!["7", "7"]);
}

struct Canned(Result<Program, CompilerError>);

impl ProgramParser for Canned {
    fn parse(&self, _source: &str) -> Result<Program, CompilerError> {
        self.0.clone()
    }
}

#[test]
fn run_source_parses_then_runs() {
    let (mut session, output) = session();
    let parser = Canned(Ok(program(vec![print(string("parsed"))])));
    session.run_source(&parser, "print \"parsed\"").unwrap();
    assert_eq!(output.lines(), vec!["parsed"]);
}

#[test]
fn run_source_surfaces_syntax_errors() {
    let (mut session, _) = session();
    let syntax = CompilerError::Syntax {
        message: "expected expression".into(),
        span: Span::new((1, 7), (1, 8), (6, 7)),
    };
    let parser = Canned(Err(syntax.clone()));
    assert_eq!(session.run_source(&parser, "print +").unwrap_err(), syntax);
}

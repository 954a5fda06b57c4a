use super::support::*;
use crate::language::{ast::ArrayPatternItem, errors::CompilerError, types::Type};

fn maybe_bool() -> crate::language::ast::Statement {
    enum_decl("MaybeBool", vec![("Some", Some(ty("bool"))), ("None", None)])
}

#[test]
fn bool_match_missing_false() {
    let scrutinee = boolean(true);
    let scrutinee_span = scrutinee.span;
    let statement = match_(scrutinee, vec![(p_bool(true), vec![])]);
    let span = statement.span;
    assert_eq!(
        check_err(vec![statement]),
        CompilerError::InexhaustiveMatch {
            span,
            expected_type: Type::Bool,
            scrutinee_span,
            remaining_values: vec!["false".into()],
        }
    );
}

#[test]
fn payload_values_are_tracked_per_variant() {
    let err = check_err(vec![
        maybe_bool(),
        let_("m", variant("MaybeBool", "None", None)),
        match_(
            var("m"),
            vec![
                (p_variant("MaybeBool", "Some", Some(p_bool(true))), vec![]),
                (p_variant("MaybeBool", "None", None), vec![]),
            ],
        ),
    ]);
    match err {
        CompilerError::InexhaustiveMatch {
            remaining_values, ..
        } => assert_eq!(remaining_values, vec!["MaybeBool::Some(false)".to_string()]),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn uncovered_variants_are_listed_in_declaration_order() {
    let err = check_err(vec![
        enum_decl(
            "Light",
            vec![("Red", None), ("Amber", None), ("Green", Some(ty("int")))],
        ),
        match_(
            variant("Light", "Amber", None),
            vec![(p_variant("Light", "Amber", None), vec![])],
        ),
    ]);
    match err {
        CompilerError::InexhaustiveMatch {
            remaining_values, ..
        } => assert_eq!(
            remaining_values,
            vec!["Light::Red".to_string(), "Light::Green(_)".to_string()]
        ),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn repeated_case_is_rejected() {
    let first = p_bool(true);
    let second = p_bool(true);
    let (first_span, second_span) = (first.span, second.span);
    assert_eq!(
        check_err(vec![match_(
            boolean(true),
            vec![(first, vec![]), (second, vec![]), (p_bool(false), vec![])],
        )]),
        CompilerError::DuplicatedCase {
            span: second_span,
            previous_span: first_span,
        }
    );
}

#[test]
fn case_after_wildcard_is_rejected() {
    let wildcard = p_wild();
    let wildcard_span = wildcard.span;
    let late = p_bool(false);
    let late_span = late.span;
    assert_eq!(
        check_err(vec![match_(
            boolean(false),
            vec![(wildcard, vec![]), (late, vec![])],
        )]),
        CompilerError::DuplicatedCase {
            span: late_span,
            previous_span: wildcard_span,
        }
    );
}

#[test]
fn pattern_must_fit_scrutinee_type() {
    let scrutinee = boolean(true);
    let scrutinee_span = scrutinee.span;
    let pattern = p_variant("MaybeBool", "None", None);
    let pattern_span = pattern.span;
    let err = check_err(vec![
        maybe_bool(),
        match_(scrutinee, vec![(pattern, vec![]), (p_wild(), vec![])]),
    ]);
    match err {
        CompilerError::TypeMismatch {
            expected,
            span,
            expected_span,
            ..
        } => {
            assert_eq!(expected, Type::Bool);
            assert_eq!(span, pattern_span);
            assert_eq!(expected_span, Some(scrutinee_span));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn payload_pattern_must_fit_payload_type() {
    let err = check_err(vec![
        maybe_bool(),
        match_(
            variant("MaybeBool", "None", None),
            vec![
                (
                    p_variant("MaybeBool", "Some", Some(p_array(vec![ArrayPatternItem::Int(1)]))),
                    vec![],
                ),
                (p_wild(), vec![]),
            ],
        ),
    ]);
    assert!(matches!(
        err,
        CompilerError::TypeMismatch { expected: Type::Bool, .. }
    ));
}

#[test]
fn unsupported_scrutinee_is_an_internal_error() {
    let err = check_err(vec![match_(int(3), vec![(p_wild(), vec![])])]);
    assert_eq!(err.kind(), "InternalCompilerError");
}

#[test]
fn int_arrays_need_a_wildcard() {
    let err = check_err(vec![match_(
        array(vec![int(1), int(2)]),
        vec![(
            p_array(vec![ArrayPatternItem::Int(1), ArrayPatternItem::Wildcard]),
            vec![],
        )],
    )]);
    match err {
        CompilerError::InexhaustiveMatch {
            remaining_values, ..
        } => assert_eq!(remaining_values, vec!["_".to_string()]),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn first_matching_arm_runs() {
    let printed = run_lines(vec![
        maybe_bool(),
        let_(
            "all",
            array(vec![
                variant("MaybeBool", "Some", Some(boolean(true))),
                variant("MaybeBool", "Some", Some(boolean(false))),
                variant("MaybeBool", "None", None),
            ]),
        ),
        for_in(
            "m",
            var("all"),
            vec![match_(
                var("m"),
                vec![
                    (
                        p_variant("MaybeBool", "Some", Some(p_bool(true))),
                        vec![print(string("yes"))],
                    ),
                    (
                        p_variant("MaybeBool", "Some", Some(p_wild())),
                        vec![print(string("no"))],
                    ),
                    (p_variant("MaybeBool", "None", None), vec![print(string("unknown"))]),
                ],
            )],
        ),
    ]);
    assert_eq!(printed, vec!["yes", "no", "unknown"]);
}

#[test]
fn array_shapes_dispatch_at_runtime() {
    let shape_match = |scrutinee| {
        match_(
            scrutinee,
            vec![
                (
                    p_array(vec![ArrayPatternItem::Int(1), ArrayPatternItem::Wildcard]),
                    vec![print(string("starts with one"))],
                ),
                (
                    p_array(vec![ArrayPatternItem::Wildcard]),
                    vec![print(string("single"))],
                ),
                (p_wild(), vec![print(string("other"))]),
            ],
        )
    };
    let printed = run_lines(vec![
        shape_match(array(vec![int(1), int(7)])),
        shape_match(array(vec![int(4)])),
        shape_match(array(vec![int(2), int(7)])),
        shape_match(array(vec![int(1), int(2), int(3)])),
    ]);
    assert_eq!(printed, vec!["starts with one", "single", "other", "other"]);
}

#[test]
fn arm_bodies_are_scoped() {
    let err = check_err(vec![
        match_(
            boolean(true),
            vec![(p_wild(), vec![let_("inside", int(1))])],
        ),
        print(var("inside")),
    ]);
    assert!(matches!(err, CompilerError::UnknownVariable { ref name, .. } if name == "inside"));
}

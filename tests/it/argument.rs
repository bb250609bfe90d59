// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2021, tree-sitter authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

use jass_tree::argument::Argument;
use jass_tree::argument::Expression;
use jass_tree::argument::FunctionCall;

fn check_round_trip(source: &str, expected: &str) {
    let argument = Argument::parse(source);
    assert_eq!(argument.to_string(), expected);
    let reparsed = Argument::parse(expected);
    assert_eq!(reparsed, argument);
    assert_eq!(reparsed.to_string(), expected);
}

fn leaf_texts(source: &str) -> Vec<String> {
    Argument::parse(source)
        .leaves()
        .into_iter()
        .map(|leaf| leaf.expression.to_string())
        .collect()
}

#[test]
fn can_classify_function_call() {
    let argument = Argument::parse("f(x)");
    match &argument.expression {
        Expression::Call(call) => {
            assert_eq!(call.name, "f");
            assert_eq!(call.arguments.len(), 1);
            assert_eq!(call.arguments[0].to_string(), "x");
        }
        other => panic!("Expected a call, got {:?}", other),
    }
}

#[test]
fn can_classify_aggregation() {
    let argument = Argument::parse("f(x) + 1");
    match &argument.expression {
        Expression::Aggregation(aggregation) => {
            assert_eq!(aggregation.operator, "+");
            assert_eq!(aggregation.parts.len(), 2);
            assert!(matches!(aggregation.parts[0].expression, Expression::Call(_)));
            assert_eq!(aggregation.parts[1].to_string(), "1");
        }
        other => panic!("Expected an aggregation, got {:?}", other),
    }
}

#[test]
fn can_classify_array_access() {
    let argument = Argument::parse("a[b]");
    match &argument.expression {
        Expression::ArrayAccess(access) => {
            assert_eq!(access.name.to_string(), "a");
            assert_eq!(access.index.to_string(), "b");
        }
        other => panic!("Expected an array access, got {:?}", other),
    }
}

#[test]
fn can_classify_negation() {
    let argument = Argument::parse("not (a)");
    match &argument.expression {
        Expression::Negation(inner) => assert_eq!(inner.expression.to_string(), "a"),
        other => panic!("Expected a negation, got {:?}", other),
    }
}

#[test]
fn can_classify_atom() {
    assert!(matches!(
        Argument::parse("x").expression,
        Expression::Atom(ref text) if text == "x"
    ));
    assert!(matches!(
        Argument::parse("-1").expression,
        Expression::Atom(ref text) if text == "-1"
    ));
    assert!(Argument::parse("").is_empty());
}

#[test]
fn calls_must_close_on_the_last_character() {
    assert!(!matches!(
        Argument::parse("f(x)(y)").expression,
        Expression::Call(_)
    ));
    match Argument::parse("f(x)+g(y)").expression {
        Expression::Aggregation(aggregation) => {
            assert_eq!(aggregation.operator, "+");
            assert_eq!(aggregation.parts[0].to_string(), "f(x)");
            assert_eq!(aggregation.parts[1].to_string(), "g(y)");
        }
        other => panic!("Expected an aggregation, got {:?}", other),
    }
}

#[test]
fn string_literals_are_opaque() {
    let argument = Argument::parse(r#"s + "x(y""#);
    match &argument.expression {
        Expression::Aggregation(aggregation) => {
            assert!(matches!(
                aggregation.parts[1].expression,
                Expression::Atom(ref text) if text == r#""x(y""#
            ));
        }
        other => panic!("Expected an aggregation, got {:?}", other),
    }
    let call = Argument::parse(r#"Print("a, (b", 1)"#);
    match &call.expression {
        Expression::Call(call) => assert_eq!(call.arguments.len(), 2),
        other => panic!("Expected a call, got {:?}", other),
    }
}

#[test]
fn can_round_trip_expressions() {
    check_round_trip("x", "x");
    check_round_trip("a<b", "a < b");
    check_round_trip("a<=b", "a <= b");
    check_round_trip("a>b", "a > b");
    check_round_trip("x == 1 and y != 2", "x == 1 and y != 2");
    check_round_trip("not (a)", "not (a)");
    check_round_trip("not a", "not (a)");
    check_round_trip("a and not b", "a and not (b)");
    check_round_trip("(a + b) * c", "(a + b) * c");
    check_round_trip("(a)", "(a)");
    check_round_trip("f(a, g(b, c))", "f(a,g(b,c))");
    check_round_trip("f()", "f()");
    check_round_trip("units[i + 1]", "units[i + 1]");
    check_round_trip("-a - b", "- a - b");
    check_round_trip(r#""hello  world""#, r#""hello  world""#);
}

#[test]
fn leaves_are_atoms_and_calls() {
    assert_eq!(
        leaf_texts("f(a, b[i]) + not (c)"),
        vec!["f(a,b[i])", "a", "i", "b", "c"]
    );
    for leaf in Argument::parse("f(a, b[i]) + not (c)").leaves() {
        assert!(matches!(
            leaf.expression,
            Expression::Atom(_) | Expression::Call(_)
        ));
    }
    assert!(leaf_texts("").is_empty());
}

#[test]
fn can_rename_variables_and_functions() {
    let mut argument = Argument::parse("f(x, function g) + x");
    argument.rename_variable("x", "y");
    assert_eq!(argument.to_string(), "f(y,function g) + y");
    argument.rename_variable("f", "k");
    assert_eq!(argument.to_string(), "f(y,function g) + y");
    argument.rename_function("g", "h");
    assert_eq!(argument.to_string(), "f(y,function h) + y");
    argument.rename_function("f", "k");
    assert_eq!(argument.to_string(), "k(y,function h) + y");
}

#[test]
fn can_detect_function_values() {
    let argument = Argument::parse("TimerStart(t, 1.0, false, function OnExpire)");
    assert!(argument.uses_as_function("OnExpire"));
    assert!(argument.uses_as_function("OnExp"));
    assert!(!argument.uses_as_function("Other"));
    assert!(!argument.uses_as_function("TimerStart"));
}

#[test]
fn can_inline_calls() {
    let replacement = "h(3)".parse::<FunctionCall>().unwrap();
    let argument = Argument::parse("f(g(1)) + g(2)").inline("g", &replacement);
    assert_eq!(argument.to_string(), "f(h(3)) + h(3)");
    let argument = Argument::parse("a[g(1)]").inline("g", &replacement);
    assert_eq!(argument.to_string(), "a[g(1)]");
}

#[test]
fn replacement_must_be_a_call() {
    assert!("x + 1".parse::<FunctionCall>().is_err());
    assert!("f(x)".parse::<FunctionCall>().is_ok());
}

#[test]
fn earliest_operator_decides_the_split() {
    match Argument::parse("not a and b").expression {
        Expression::Negation(inner) => assert_eq!(inner.expression.to_string(), "a and b"),
        other => panic!("Expected a negation, got {:?}", other),
    }
    check_round_trip("not a and b", "not (a and b)");

    let argument = Argument::parse("-1 + x");
    assert!(matches!(
        argument.expression,
        Expression::Atom(ref text) if text == "-1 + x"
    ));
    assert_eq!(leaf_texts("-1 + x"), vec!["-1 + x"]);
}

// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2021, tree-sitter authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

use indoc::indoc;
use jass_tree::AnalysisService;
use jass_tree::ExpansionStyle;
use jass_tree::LookupError;
use jass_tree::Slice;
use jass_tree::SyntaxTree;
use jass_tree::VariableScope;
use serde_json::json;

const CALLBACKS: &str = indoc! {r#"
    globals
        integer a = 0
        integer b = 0
        integer c = 0
    endglobals
    function callback takes nothing returns nothing
        set b = 1
    endfunction
    function register takes nothing returns nothing
        set a = 1
        call TimerStart(CreateTimer(), 1.0, false, function callback)
    endfunction
    function setup takes nothing returns nothing
        call ForForce(GetPlayersAll(), function register)
    endfunction
    function unrelated takes nothing returns nothing
        set c = 1
        call register()
    endfunction
"#};

fn read(source: &str) -> SyntaxTree {
    match SyntaxTree::read(source) {
        Ok(tree) => tree,
        Err(e) => panic!("Cannot read tree: {}", e),
    }
}

fn names(slice: &Slice) -> (Vec<String>, Vec<String>) {
    let functions = slice
        .functions()
        .into_iter()
        .map(|callable| callable.name().to_string())
        .collect();
    let variables = slice
        .variables()
        .into_iter()
        .map(|variable| variable.name.clone())
        .collect();
    (functions, variables)
}

fn check_isolate_function(
    style: ExpansionStyle,
    seed: &str,
    budget: i32,
    functions: &[&str],
    variables: &[&str],
) {
    let tree = read(CALLBACKS);
    let service = AnalysisService::with_style(style);
    let slice = match service.isolate_function(&tree, seed, budget) {
        Ok(slice) => slice,
        Err(e) => panic!("Cannot isolate {}: {}", seed, e),
    };
    let (actual_functions, actual_variables) = names(&slice);
    assert_eq!(actual_functions, functions);
    assert_eq!(actual_variables, variables);
}

#[test]
fn can_isolate_variable() {
    let tree = read(indoc! {r#"
        globals
            x = 0
        endglobals
        function f takes nothing returns nothing
            set x = 1
        endfunction
    "#});
    let service = AnalysisService::new();
    let slice = service
        .isolate_variable(&tree, "x", 1)
        .expect("Cannot isolate");
    assert!(slice.contains_variable("x"));
    assert!(slice.contains_function("f"));
    assert_eq!(slice.functions().len(), 1);
    assert_eq!(
        service.find_variable_scope(&tree, "x").expect("Cannot find scope"),
        VariableScope::SingleUse
    );
}

#[test]
fn can_find_variable_scopes() {
    let tree = read(indoc! {r#"
        globals
            integer x = 0
            integer y = 0
        endglobals
        function f takes nothing returns nothing
            set x = 1
        endfunction
        function g takes nothing returns nothing
            set x = x + 1
        endfunction
    "#});
    let service = AnalysisService::new();
    assert_eq!(
        service.find_variable_scope(&tree, "x").expect("Cannot find scope"),
        VariableScope::Global
    );
    assert_eq!(
        service.find_variable_scope(&tree, "y").expect("Cannot find scope"),
        VariableScope::Unused
    );
    assert_eq!(VariableScope::SingleUse.to_string(), "single use");
}

#[test]
fn can_find_scope_of_library_global() {
    let tree = read(indoc! {r#"
        library Counter
            globals
                integer counter = 0
            endglobals
            function bump takes nothing returns nothing
                set counter = counter + 1
            endfunction
        endlibrary
    "#});
    assert_eq!(
        AnalysisService::new()
            .find_variable_scope(&tree, "counter")
            .expect("Cannot find scope"),
        VariableScope::SingleUse
    );
}

#[test]
fn passive_isolation_follows_mentioned_functions() {
    check_isolate_function(
        ExpansionStyle::Passive,
        "register",
        -1,
        &["callback", "register"],
        &["a", "b"],
    );
}

#[test]
fn inverse_isolation_follows_mentioning_functions() {
    check_isolate_function(
        ExpansionStyle::Inverse,
        "register",
        -1,
        &["register", "setup"],
        &["a"],
    );
}

#[test]
fn aggressive_isolation_follows_both_directions() {
    check_isolate_function(
        ExpansionStyle::Aggressive,
        "register",
        -1,
        &["callback", "register", "setup"],
        &["a", "b"],
    );
}

#[test]
fn budget_limits_expansion_rounds() {
    check_isolate_function(ExpansionStyle::Passive, "setup", 1, &["setup"], &[]);
    check_isolate_function(
        ExpansionStyle::Passive,
        "setup",
        2,
        &["callback", "register", "setup"],
        &["a"],
    );
    check_isolate_function(
        ExpansionStyle::Passive,
        "setup",
        -1,
        &["callback", "register", "setup"],
        &["a", "b"],
    );
    check_isolate_function(
        ExpansionStyle::Passive,
        "setup",
        10,
        &["callback", "register", "setup"],
        &["a", "b"],
    );
    check_isolate_function(
        ExpansionStyle::Aggressive,
        "setup",
        i32::MIN,
        &["callback", "register", "setup"],
        &["a", "b"],
    );
}

#[test]
fn most_negative_budget_is_unbounded() {
    let tree = read(CALLBACKS);
    let slice = AnalysisService::new()
        .isolate_variable(&tree, "b", i32::MIN)
        .expect("Cannot isolate");
    let (functions, variables) = names(&slice);
    assert_eq!(functions, vec!["callback"]);
    assert_eq!(variables, vec!["b"]);
}

#[test]
fn zero_budget_collects_nothing() {
    let tree = read(CALLBACKS);
    let service = AnalysisService::new();
    let slice = service
        .isolate_function(&tree, "missing", 0)
        .expect("Cannot isolate");
    assert!(slice.is_empty());
    let slice = service
        .isolate_variable(&tree, "a", 0)
        .expect("Cannot isolate");
    assert!(slice.is_empty());
}

#[test]
fn cannot_isolate_undefined_entities() {
    let tree = read(CALLBACKS);
    let service = AnalysisService::new();
    let error = service
        .isolate_function(&tree, "missing", 1)
        .expect_err("Isolation succeeded unexpectedly");
    assert!(matches!(error, LookupError::UndefinedFunction(ref name) if name == "missing"));
    let error = service
        .isolate_variable(&tree, "missing", 1)
        .expect_err("Isolation succeeded unexpectedly");
    assert_eq!(
        error.to_string(),
        "Expected to be able to isolate on variable missing but was not found."
    );
}

#[test]
fn can_build_tree_from_slice() {
    let tree = read(CALLBACKS);
    let slice = AnalysisService::new()
        .isolate_function(&tree, "register", -1)
        .expect("Cannot isolate");
    let isolated = SyntaxTree::from_slice(&slice);
    assert_eq!(
        format!("{}\n", isolated),
        indoc! {r#"
            globals
            integer a=0
            integer b=0
            endglobals
            function callback takes nothing returns nothing
            set b = 1
            endfunction
            function register takes nothing returns nothing
            set a = 1
            call TimerStart(CreateTimer(),1.0,false,function callback)
            endfunction
        "#}
    );
}

#[test]
fn slice_without_variables_has_no_globals_section() {
    let tree = read(CALLBACKS);
    let slice = AnalysisService::new()
        .isolate_function(&tree, "setup", 1)
        .expect("Cannot isolate");
    let isolated = SyntaxTree::from_slice(&slice);
    assert!(isolated.script().globals.is_none());
    assert_eq!(
        format!("{}\n", isolated),
        indoc! {r#"
            function setup takes nothing returns nothing
            call ForForce(GetPlayersAll(),function register)
            endfunction
        "#}
    );
}

#[test]
fn can_render_slice_as_json() {
    let tree = read(CALLBACKS);
    let slice = AnalysisService::new()
        .isolate_function(&tree, "register", -1)
        .expect("Cannot isolate");
    let rendered = slice.to_json().expect("Cannot render slice");
    let value = serde_json::from_str::<serde_json::Value>(&rendered).expect("Invalid JSON");
    assert_eq!(
        value,
        json!({
            "functions": ["callback", "register"],
            "variables": ["a", "b"]
        })
    );
}

#[test]
fn can_configure_expansion_style() {
    let mut service = AnalysisService::new();
    assert_eq!(service.expansion_style(), ExpansionStyle::Passive);
    service.set_expansion_style("Aggressive".parse().expect("Unknown style"));
    assert_eq!(service.expansion_style(), ExpansionStyle::Aggressive);
    assert!("sideways".parse::<ExpansionStyle>().is_err());
}

// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2021, tree-sitter authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

use std::path::Path;

use indoc::indoc;
use jass_tree::ast::Callable;
use jass_tree::ast::ContainerKind;
use jass_tree::ast::Script;
use jass_tree::ast::Statement;
use jass_tree::ast::Variable;
use jass_tree::preprocess::LinePreprocessor;
use jass_tree::preprocess::Preprocessor;
use jass_tree::ParseError;

fn parse(source: &str) -> Result<Script, ParseError> {
    Script::parse(&LinePreprocessor.preprocess(source))
}

fn check_parse(source: &str, expected: &str) {
    let script = match parse(source) {
        Ok(script) => script,
        Err(e) => panic!("Cannot parse script: {}", e),
    };
    assert_eq!(format!("{}\n", script), expected);
}

fn fail_parse(source: &str) -> ParseError {
    match parse(source) {
        Ok(script) => panic!("Parse succeeded unexpectedly:\n{}", script),
        Err(e) => e,
    }
}

#[test]
fn can_parse_globals_and_functions() {
    check_parse(
        indoc! {r#"
          globals
              integer x = 0
              constant real PI = 3.14
              unit array units
          endglobals

          function f takes integer a, real b returns nothing
              local integer i = 0
              set x = x + a
              loop
                  exitwhen i > 10
                  set units[i] = null
                  set i = i + 1
              endloop
              call DoNothing()
              return
          endfunction
        "#},
        indoc! {r#"
          globals
          integer x=0
          constant real PI=3.14
          unit array units
          endglobals
          function f takes integer a, real b returns nothing
          local integer i=0
          set x = x + a
          loop
          exitwhen i > 10
          set units[i] = null
          set i = i + 1
          endloop
          call DoNothing()
          return
          endfunction
        "#},
    );
}

#[test]
fn can_parse_conditionals() {
    check_parse(
        indoc! {r#"
          function sign takes integer n returns integer
              if n < 0 then
                  return -1
              elseif n == 0 then
                  return 0
              else
                  return 1
              endif
          endfunction
        "#},
        indoc! {r#"
          function sign takes integer n returns integer
          if n < 0 then
          return -1
          elseif n == 0 then
          return 0
          else
          return 1
          endif
          endfunction
        "#},
    );
}

#[test]
fn comments_and_blank_lines_are_dropped() {
    check_parse(
        indoc! {r#"
          // a leading comment
          function f takes nothing returns nothing

              set s = "http://example.com"   // trailing comment
          endfunction
        "#},
        indoc! {r#"
          function f takes nothing returns nothing
          set s = "http://example.com"
          endfunction
        "#},
    );
}

#[test]
fn can_parse_natives_and_types() {
    let source = indoc! {r#"
      type agent extends handle
      native GetTriggerUnit takes nothing returns unit
      constant native GetPlayerId takes player whichPlayer returns integer
      private constant function IsReady takes nothing returns boolean
          return true
      endfunction
    "#};
    let script = parse(source).expect("Cannot parse script");
    let callables = script.callables();
    assert_eq!(callables.len(), 4);
    assert!(matches!(callables[0], Callable::Type(declaration) if declaration.name == "agent"));
    assert!(matches!(callables[1], Callable::Native(native) if !native.constant));
    assert!(matches!(callables[2], Callable::Native(native) if native.constant));
    assert_eq!(
        callables[3].declaration_text(),
        "private constant function IsReady takes nothing returns boolean"
    );
    match callables[3] {
        Callable::Function(function) => {
            assert_eq!(function.declaration.modifiers.as_deref(), Some("private"));
            assert!(function.declaration.constant);
            assert_eq!(function.declaration.returns, "boolean");
        }
        other => panic!("Expected a function, got {:?}", other),
    }
    check_parse(
        source,
        indoc! {r#"
          type agent extends handle
          native GetTriggerUnit takes nothing returns unit
          constant native GetPlayerId takes player whichPlayer returns integer
          private constant function IsReady takes nothing returns boolean
          return true
          endfunction
        "#},
    );
}

#[test]
fn can_parse_containers() {
    let source = indoc! {r#"
      library Utils initializer Init requires Base
          globals
              integer count = 0
          endglobals
          function Init takes nothing returns nothing
              set count = 1
          endfunction
          scope Inner
              function Helper takes nothing returns nothing
              endfunction
          endscope
          struct Point
              static integer total = 0
              real x
              real y
              method length takes nothing returns real
                  return SquareRoot(x * x + y * y)
              endmethod
          endstruct
      endlibrary
    "#};
    check_parse(
        source,
        indoc! {r#"
          library Utils initializer Init requires Base
          globals
          integer count=0
          endglobals
          function Init takes nothing returns nothing
          set count = 1
          endfunction
          scope Inner
          function Helper takes nothing returns nothing
          endfunction
          endscope
          struct Point
          static integer total=0
          real x
          real y
          method length takes nothing returns real
          return SquareRoot(x * x + y * y)
          endmethod
          endstruct
          endlibrary
        "#},
    );

    let script = parse(source).expect("Cannot parse script");
    assert_eq!(script.containers.len(), 1);
    let library = &script.containers[0];
    assert_eq!(library.kind, ContainerKind::Library);
    assert_eq!(library.initializer(), Some("Init"));
    let names = script
        .callables()
        .into_iter()
        .map(|callable| callable.name().to_string())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Init", "Helper", "length"]);
    let globals = script
        .global_variables()
        .into_iter()
        .map(|variable| variable.name.clone())
        .collect::<Vec<_>>();
    assert_eq!(globals, vec!["count"]);
    let point = &library.body.containers[1];
    assert_eq!(point.kind, ContainerKind::Struct);
    assert_eq!(point.members.len(), 3);
    assert_eq!(point.members[0].modifiers.as_deref(), Some("static"));
}

#[test]
fn can_parse_variable_declarations() {
    let variable = Variable::parse("x = 0").expect("Cannot parse variable");
    assert_eq!(variable.type_name, "");
    assert_eq!(variable.to_string(), "x=0");
    let variable = Variable::parse("integer array a").expect("Cannot parse variable");
    assert!(variable.array);
    assert_eq!(variable.name, "a");
    assert!(variable.initial_value.is_none());
    let variable = Variable::parse("constant string S = \"a = b\"").expect("Cannot parse variable");
    assert!(variable.constant);
    assert_eq!(variable.to_string(), "constant string S=\"a = b\"");
    assert!(Variable::parse("integer").is_none());
}

#[test]
fn statements_flatten_to_leaves() {
    let script = parse(indoc! {r#"
      function f takes nothing returns nothing
          set units[i] = CreateUnit(p, 'hfoo', x, y)
      endfunction
    "#})
    .expect("Cannot parse script");
    let statement = &script.callables()[0].statements()[0];
    assert!(matches!(statement, Statement::Set(_)));
    let leaves = statement
        .leaves()
        .into_iter()
        .map(|leaf| leaf.to_string())
        .collect::<Vec<_>>();
    assert_eq!(
        leaves,
        vec!["CreateUnit(p,'hfoo',x,y)", "p", "'hfoo'", "x", "y", "i", "units"]
    );
}

#[test]
fn cannot_parse_stray_terminator() {
    let error = fail_parse(indoc! {r#"
      function f takes nothing returns nothing
          endloop
      endfunction
    "#});
    assert!(
        matches!(error, ParseError::UnbalancedBlock(ref line, location) if line == "endloop" && location.line == 1)
    );
    assert_eq!(
        error.to_string(),
        "Found 'endloop' outside of its block at line 2"
    );
    let error = fail_parse("endfunction\n");
    assert!(matches!(error, ParseError::UnbalancedBlock(..)));
}

#[test]
fn cannot_parse_nested_function() {
    let error = fail_parse(indoc! {r#"
      function f takes nothing returns nothing
          function g takes nothing returns nothing
          endfunction
      endfunction
    "#});
    assert!(matches!(error, ParseError::UnbalancedBlock(_, location) if location.line == 1));
}

#[test]
fn cannot_parse_unterminated_function() {
    let error = fail_parse(indoc! {r#"
      function f takes nothing returns nothing
          set x = 1
    "#});
    assert!(matches!(error, ParseError::UnexpectedEOF("endfunction", _)));
    let error = fail_parse("library L\n");
    assert!(matches!(error, ParseError::UnexpectedEOF("endlibrary", _)));
}

#[test]
fn cannot_parse_second_globals_section() {
    let error = fail_parse(indoc! {r#"
      globals
          integer x
      endglobals
      globals
      endglobals
    "#});
    assert!(matches!(error, ParseError::DuplicateSection("globals", location) if location.line == 3));
}

#[test]
fn cannot_parse_malformed_statements() {
    let error = fail_parse("function f takes nothing\nendfunction\n");
    assert!(matches!(error, ParseError::MalformedDeclaration(..)));
    let error = fail_parse("function f takes nothing returns nothing\nfoo bar\nendfunction\n");
    assert!(matches!(error, ParseError::UnexpectedLine(ref line, _) if line == "foo bar"));
    let error = fail_parse("function f takes nothing returns nothing\nif x\nendif\nendfunction\n");
    assert!(matches!(error, ParseError::ExpectedKeyword("then", ..)));
    let error = fail_parse("function f takes nothing returns nothing\nset x\nendfunction\n");
    assert!(matches!(error, ParseError::ExpectedKeyword("=", ..)));
    let error = fail_parse("function f takes nothing returns nothing\ncall x + 1\nendfunction\n");
    assert!(matches!(error, ParseError::ExpectedKeyword("(", ..)));
    let error = fail_parse("set x = 1\n");
    assert!(matches!(error, ParseError::UnexpectedLine(..)));
}

#[test]
fn can_display_error_excerpt() {
    let lines = vec![
        "function f takes nothing returns nothing".to_string(),
        "endloop".to_string(),
    ];
    let error = Script::parse(&lines).expect_err("Parse succeeded unexpectedly");
    let excerpt = error
        .display_excerpt(Path::new("war3map.j"), &lines)
        .to_string();
    assert_eq!(
        excerpt,
        concat!(
            "Found 'endloop' outside of its block at line 2\n",
            "  war3map.j:2:\n",
            "  2 | endloop\n",
            "    | ^^^^^^^\n",
        )
    );
}

// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2021, tree-sitter authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

use std::fmt::Display;
use std::path::Path;

use log::trace;
use once_cell::sync::Lazy;
use regex::Captures;
use regex::Regex;
use thiserror::Error;

use crate::argument::Argument;
use crate::argument::Expression;
use crate::argument::QuoteTracker;
use crate::ast;
use crate::parse_error::Excerpt;

impl ast::Script {
    /// Parses preprocessed logical lines into a script.
    pub fn parse(lines: &[String]) -> Result<ast::Script, ParseError> {
        let mut parser = Parser::new(lines);
        let (script, _) = parser.parse_body(None)?;
        Ok(script)
    }
}

impl ast::Variable {
    /// Parses `[constant] TYPE [array] NAME [= VALUE]`, or the untyped `NAME = VALUE`.
    pub fn parse(text: &str) -> Option<ast::Variable> {
        let (declaration, initial_value) = match split_assignment(text) {
            Some((declaration, value)) => (declaration, Some(Argument::parse(value))),
            None => (text, None),
        };
        let mut words = declaration.split_whitespace().collect::<Vec<_>>();
        let constant = words.first() == Some(&"constant");
        if constant {
            words.remove(0);
        }
        let (type_name, array, name) = match words.as_slice() {
            [name] if initial_value.is_some() => ("", false, *name),
            [type_name, name] => (*type_name, false, *name),
            [type_name, "array", name] => (*type_name, true, *name),
            _ => return None,
        };
        Some(ast::Variable {
            constant,
            type_name: type_name.to_string(),
            array,
            name: name.to_string(),
            initial_value,
        })
    }
}

/// An error that can occur while parsing a script
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Expected '{0}' in '{1}' at {2}")]
    ExpectedKeyword(&'static str, String, Location),
    #[error("Expected a function call but found '{0}'")]
    ExpectedCall(String),
    #[error("Expected '{0}' before the end of the script at {1}")]
    UnexpectedEOF(&'static str, Location),
    #[error("Unexpected line '{0}' at {1}")]
    UnexpectedLine(String, Location),
    #[error("Found '{0}' outside of its block at {1}")]
    UnbalancedBlock(String, Location),
    #[error("Found {0} twice at {1}")]
    DuplicateSection(&'static str, Location),
    #[error("Malformed declaration '{0}' at {1}")]
    MalformedDeclaration(String, Location),
}

impl ParseError {
    pub fn location(&self) -> Option<Location> {
        match self {
            ParseError::ExpectedKeyword(_, _, location)
            | ParseError::UnexpectedEOF(_, location)
            | ParseError::UnexpectedLine(_, location)
            | ParseError::UnbalancedBlock(_, location)
            | ParseError::DuplicateSection(_, location)
            | ParseError::MalformedDeclaration(_, location) => Some(*location),
            ParseError::ExpectedCall(_) => None,
        }
    }

    /// Renders the line the error was reported at, as it looked after preprocessing.
    pub fn display_excerpt<'a>(
        &'a self,
        path: &'a Path,
        lines: &'a [String],
    ) -> impl Display + 'a {
        ParseErrorExcerpt {
            error: self,
            path,
            lines,
        }
    }
}

struct ParseErrorExcerpt<'a> {
    error: &'a ParseError,
    path: &'a Path,
    lines: &'a [String],
}

impl Display for ParseErrorExcerpt<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "{}", self.error)?;
        if let Some(location) = self.error.location() {
            let excerpt = Excerpt::from_lines(self.path, self.lines, location.line, 2);
            write!(f, "{}", excerpt)?;
        }
        Ok(())
    }
}

/// The logical line a script entity was read from
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Location {
    /// Zero-based index into the preprocessed lines
    pub line: usize,
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "line {}", self.line + 1)
    }
}

static FUNCTION_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:private|public|static|stub)\s+)*(?:constant\s+)?(?:function|method)\b")
        .expect("valid regex")
});

static FUNCTION_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^((?:(?:private|public|static|stub)\s+)*)(constant\s+)?(function|method)\s+(.+?)\s+takes\s+(.+?)\s+returns\s+(\S+)$",
    )
    .expect("valid regex")
});

static NATIVE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:constant\s+)?native\b").expect("valid regex"));

static NATIVE_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(constant\s+)?native\s+(\S+)\s+takes\s+(.+?)\s+returns\s+(\S+)$")
        .expect("valid regex")
});

static TYPE_DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^type\s+(\S+)(?:\s+(.+))?$").expect("valid regex"));

static CONTAINER_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^((?:(?:private|public)\s+)*)(library|scope|struct)\s+(\S+)(?:\s+(.+))?$")
        .expect("valid regex")
});

const MEMBER_MODIFIERS: [&str; 6] = ["static", "private", "public", "readonly", "stub", "delegate"];

const BLOCK_TERMINATORS: [&str; 10] = [
    "endfunction",
    "endmethod",
    "endglobals",
    "endloop",
    "endif",
    "elseif",
    "else",
    "endlibrary",
    "endscope",
    "endstruct",
];

/// A forward-only cursor over preprocessed lines, shared by every node that is parsed from them.
struct Parser<'a> {
    lines: &'a [String],
    offset: usize,
    /// The last line handed out, which is where errors are reported
    location: Location,
}

impl<'a> Parser<'a> {
    fn new(lines: &'a [String]) -> Parser<'a> {
        Parser {
            lines,
            offset: 0,
            location: Location::default(),
        }
    }

    fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.offset).map(String::as_str)
    }

    fn next(&mut self) -> Option<&'a str> {
        let line = self.lines.get(self.offset)?;
        self.location = Location { line: self.offset };
        self.offset += 1;
        Some(line.as_str())
    }

    fn expect_line(&mut self, terminator: &'static str) -> Result<&'a str, ParseError> {
        match self.next() {
            Some(line) => Ok(line),
            None => Err(ParseError::UnexpectedEOF(terminator, self.location)),
        }
    }

    /// Parses a script body up to the terminator of `end`, or to the end of input for a whole
    /// script.  Inside a struct, lines that nothing else accepts are returned as members.
    fn parse_body(
        &mut self,
        end: Option<ast::ContainerKind>,
    ) -> Result<(ast::Script, Vec<ast::StructMember>), ParseError> {
        let mut script = ast::Script::default();
        let mut members = Vec::new();
        loop {
            let line = match (self.peek(), end) {
                (Some(line), _) => line,
                (None, None) => break,
                (None, Some(kind)) => {
                    return Err(ParseError::UnexpectedEOF(kind.terminator(), self.location))
                }
            };
            if end.map(|kind| kind.terminator()) == Some(line) {
                self.next();
                break;
            }
            if line == "globals" {
                self.next();
                if script.globals.is_some() {
                    return Err(ParseError::DuplicateSection("globals", self.location));
                }
                script.globals = Some(self.parse_globals()?);
            } else if let Some(callable) = self.parse_callable(line)? {
                script.functions.callables.push(callable);
            } else if let Some(container) = self.parse_container(line)? {
                script.containers.push(container);
            } else if end == Some(ast::ContainerKind::Struct) && !is_terminator(line) {
                self.next();
                members.push(self.parse_member(line)?);
            } else {
                self.next();
                return Err(unexpected(line, self.location));
            }
        }
        Ok((script, members))
    }

    fn parse_globals(&mut self) -> Result<ast::GlobalsSection, ParseError> {
        let mut globals = ast::GlobalsSection::default();
        loop {
            let line = self.expect_line("endglobals")?;
            if line == "endglobals" {
                break;
            }
            if line == "globals" {
                return Err(ParseError::DuplicateSection("globals", self.location));
            }
            let variable = ast::Variable::parse(line).ok_or_else(|| {
                ParseError::MalformedDeclaration(line.to_string(), self.location)
            })?;
            trace!("parsed global {} at {}", variable.name, self.location);
            globals.variables.push(variable);
        }
        Ok(globals)
    }

    /// Parses the callable starting at `line`, if `line` starts one.
    fn parse_callable(&mut self, line: &'a str) -> Result<Option<ast::Callable>, ParseError> {
        if FUNCTION_START.is_match(line) {
            self.next();
            let declaration = self.parse_declaration(line)?;
            let statements = self.parse_statements(&[declaration.kind.terminator()])?.0;
            trace!(
                "parsed {} {} at {}",
                declaration.kind.keyword(),
                declaration.name,
                self.location
            );
            let function = ast::Function {
                declaration,
                statements,
            };
            return Ok(Some(match function.declaration.kind {
                ast::DeclarationKind::Function => ast::Callable::Function(function),
                ast::DeclarationKind::Method => ast::Callable::Method(function),
            }));
        }
        if NATIVE_START.is_match(line) {
            self.next();
            let captures = NATIVE_DECLARATION.captures(line).ok_or_else(|| {
                ParseError::MalformedDeclaration(line.to_string(), self.location)
            })?;
            let native = ast::NativeFunction {
                constant: captures.get(1).is_some(),
                name: captures[2].to_string(),
                parameters: self.parse_parameters(line, &captures[3])?,
                returns: captures[4].to_string(),
            };
            trace!("parsed native {} at {}", native.name, self.location);
            return Ok(Some(ast::Callable::Native(native)));
        }
        if first_word(line) == "type" {
            self.next();
            let captures = TYPE_DECLARATION.captures(line).ok_or_else(|| {
                ParseError::MalformedDeclaration(line.to_string(), self.location)
            })?;
            let declaration = ast::TypeDeclaration {
                name: captures[1].to_string(),
                flags: captures.get(2).map(|m| m.as_str().to_string()),
            };
            trace!("parsed type {} at {}", declaration.name, self.location);
            return Ok(Some(ast::Callable::Type(declaration)));
        }
        Ok(None)
    }

    fn parse_declaration(&self, line: &str) -> Result<ast::Declaration, ParseError> {
        let captures = FUNCTION_DECLARATION
            .captures(line)
            .ok_or_else(|| ParseError::MalformedDeclaration(line.to_string(), self.location))?;
        let kind = match &captures[3] {
            "method" => ast::DeclarationKind::Method,
            _ => ast::DeclarationKind::Function,
        };
        Ok(ast::Declaration {
            modifiers: modifiers(&captures),
            constant: captures.get(2).is_some(),
            kind,
            name: captures[4].to_string(),
            parameters: self.parse_parameters(line, &captures[5])?,
            returns: captures[6].to_string(),
        })
    }

    fn parse_parameters(&self, line: &str, text: &str) -> Result<ast::Parameters, ParseError> {
        if text.trim() == "nothing" {
            return Ok(ast::Parameters::default());
        }
        let mut parameters = Vec::new();
        for parameter in text.split(',') {
            match parameter.split_whitespace().collect::<Vec<_>>().as_slice() {
                [type_name, name] => parameters.push(ast::Parameter {
                    type_name: type_name.to_string(),
                    name: name.to_string(),
                }),
                _ => {
                    return Err(ParseError::MalformedDeclaration(
                        line.to_string(),
                        self.location,
                    ))
                }
            }
        }
        Ok(ast::Parameters(parameters))
    }

    fn parse_container(&mut self, line: &'a str) -> Result<Option<ast::Container>, ParseError> {
        let captures = match CONTAINER_START.captures(line) {
            Some(captures) => captures,
            None => return Ok(None),
        };
        self.next();
        let kind = match &captures[2] {
            "library" => ast::ContainerKind::Library,
            "scope" => ast::ContainerKind::Scope,
            _ => ast::ContainerKind::Struct,
        };
        let name = captures[3].to_string();
        let location = self.location;
        let (body, members) = self.parse_body(Some(kind))?;
        trace!("parsed {} {} at {}", kind.keyword(), name, location);
        Ok(Some(ast::Container {
            kind,
            modifiers: modifiers(&captures),
            name,
            flags: captures.get(4).map(|m| m.as_str().to_string()),
            members,
            body,
        }))
    }

    fn parse_member(&self, line: &str) -> Result<ast::StructMember, ParseError> {
        let mut words = Vec::new();
        let mut rest = line;
        while let Some((word, remainder)) = rest.split_once(' ') {
            if !MEMBER_MODIFIERS.contains(&word) {
                break;
            }
            words.push(word);
            rest = remainder;
        }
        let variable = ast::Variable::parse(rest)
            .ok_or_else(|| ParseError::MalformedDeclaration(line.to_string(), self.location))?;
        trace!("parsed member {} at {}", variable.name, self.location);
        Ok(ast::StructMember {
            modifiers: if words.is_empty() {
                None
            } else {
                Some(words.join(" "))
            },
            variable,
        })
    }

    /// Parses statements until one of `terminators`, returning them along with the terminating
    /// line.  Nested blocks consume their own terminators.
    fn parse_statements(
        &mut self,
        terminators: &[&'static str],
    ) -> Result<(Vec<ast::Statement>, &'a str), ParseError> {
        let expected = terminators.last().copied().unwrap_or("end");
        let mut statements = Vec::new();
        loop {
            let line = self.expect_line(expected)?;
            if terminators
                .iter()
                .any(|terminator| keyword_rest(line, terminator).is_some())
            {
                return Ok((statements, line));
            }
            statements.push(self.parse_statement(line)?);
        }
    }

    fn parse_statement(&mut self, line: &'a str) -> Result<ast::Statement, ParseError> {
        let keyword = first_word(line);
        let rest = keyword_rest(line, keyword).unwrap_or("");
        let statement = match keyword {
            "set" => {
                let (target, value) = split_assignment(rest)
                    .filter(|(target, _)| !target.is_empty())
                    .ok_or_else(|| {
                        ParseError::ExpectedKeyword("=", line.to_string(), self.location)
                    })?;
                ast::SetStatement {
                    target: Argument::parse(target),
                    value: Argument::parse(value),
                }
                .into()
            }
            "local" => {
                let variable = ast::Variable::parse(rest).ok_or_else(|| {
                    ParseError::MalformedDeclaration(line.to_string(), self.location)
                })?;
                ast::LocalStatement { variable }.into()
            }
            "call" => {
                let call = Argument::parse(rest);
                if !matches!(call.expression, Expression::Call(_)) {
                    return Err(ParseError::ExpectedKeyword(
                        "(",
                        line.to_string(),
                        self.location,
                    ));
                }
                ast::CallStatement { call }.into()
            }
            "return" => ast::ReturnStatement {
                value: if rest.is_empty() {
                    None
                } else {
                    Some(Argument::parse(rest))
                },
            }
            .into(),
            "exitwhen" => {
                if rest.is_empty() {
                    return Err(ParseError::ExpectedKeyword(
                        "condition",
                        line.to_string(),
                        self.location,
                    ));
                }
                ast::ExitWhenStatement {
                    condition: Argument::parse(rest),
                }
                .into()
            }
            "loop" if rest.is_empty() => {
                let (statements, _) = self.parse_statements(&["endloop"])?;
                ast::LoopStatement { statements }.into()
            }
            "if" => self.parse_if(line, rest)?,
            _ if is_terminator(line) || FUNCTION_START.is_match(line) => {
                return Err(ParseError::UnbalancedBlock(line.to_string(), self.location))
            }
            _ => return Err(unexpected(line, self.location)),
        };
        trace!("parsed statement '{}' at {}", keyword, self.location);
        Ok(statement)
    }

    fn parse_if(&mut self, line: &str, rest: &str) -> Result<ast::Statement, ParseError> {
        let mut branches = Vec::new();
        let mut otherwise = None;
        let mut condition = self.parse_condition(line, rest)?;
        loop {
            let (statements, terminator) =
                self.parse_statements(&["elseif", "else", "endif"])?;
            branches.push(ast::Branch {
                condition,
                statements,
            });
            if let Some(rest) = keyword_rest(terminator, "elseif") {
                condition = self.parse_condition(terminator, rest)?;
            } else if terminator == "else" {
                otherwise = Some(self.parse_statements(&["endif"])?.0);
                break;
            } else if terminator == "endif" {
                break;
            } else {
                return Err(unexpected(terminator, self.location));
            }
        }
        Ok(ast::IfStatement {
            branches,
            otherwise,
        }
        .into())
    }

    fn parse_condition(&self, line: &str, rest: &str) -> Result<Argument, ParseError> {
        match rest.strip_suffix("then").map(str::trim) {
            Some(condition) if !condition.is_empty() => Ok(Argument::parse(condition)),
            _ => Err(ParseError::ExpectedKeyword(
                "then",
                line.to_string(),
                self.location,
            )),
        }
    }
}

fn modifiers(captures: &Captures) -> Option<String> {
    let words = captures[1].split_whitespace().collect::<Vec<_>>();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

fn unexpected(line: &str, location: Location) -> ParseError {
    if is_terminator(line) {
        ParseError::UnbalancedBlock(line.to_string(), location)
    } else {
        ParseError::UnexpectedLine(line.to_string(), location)
    }
}

fn is_terminator(line: &str) -> bool {
    BLOCK_TERMINATORS
        .iter()
        .any(|terminator| keyword_rest(line, terminator).is_some())
}

fn first_word(line: &str) -> &str {
    let end = line
        .find(|c: char| c == ' ' || c == '(')
        .unwrap_or_else(|| line.len());
    &line[..end]
}

/// Returns what follows `keyword` when `line` starts with it as a whole word.
fn keyword_rest<'l>(line: &'l str, keyword: &str) -> Option<&'l str> {
    let rest = line.strip_prefix(keyword)?;
    if rest.is_empty() || rest.starts_with(' ') || rest.starts_with('(') {
        Some(rest.trim())
    } else {
        None
    }
}

/// Splits `text` on its first `=` that is outside of brackets and string literals.
fn split_assignment(text: &str) -> Option<(&str, &str)> {
    let mut quotes = QuoteTracker::default();
    let mut depth = 0;
    for (i, ch) in text.char_indices() {
        quotes.observe(ch);
        if ch == '"' || quotes.quoted() {
            continue;
        }
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            '=' if depth == 0 => return Some((text[..i].trim(), text[i + 1..].trim())),
            _ => {}
        }
    }
    None
}

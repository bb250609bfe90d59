// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2021, tree-sitter authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! Classifies the free-form expression text that appears inside statements.
//!
//! JASS expressions are never fully parsed.  Instead, each piece of text is recognized as one of
//! a handful of shapes (a whole function call, an operator chain, an array access, a negation or
//! an opaque atom), recursively, which is enough to find and rewrite every identifier that the
//! expression refers to.

use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::str::FromStr;

use crate::ParseError;

/// Operators recognized when splitting an operator chain.  When several could apply, the one
/// whose occurrence ends earliest in the text wins, and ties go to the earlier entry here.
pub const OPERATORS: [&str; 13] = [
    "+", "-", "/", "*", " and ", " or ", "> ", "< ", ">=", "<=", "==", "!=", " not ",
];

/// Characters that can never appear in the name of a called function.
const INVALID_CALL_NAME_CHARACTERS: [char; 9] = ['"', ',', '\\', ')', '(', '[', ']', '\n', ' '];

/// A classified expression, possibly wrapped in one pair of redundant parentheses.
#[derive(Clone, Debug)]
pub struct Argument {
    pub parenthesized: bool,
    pub expression: Expression,
}

#[derive(Clone, Debug)]
pub enum Expression {
    /// Opaque text: an identifier, a literal, or anything that could not be decomposed.  An
    /// empty atom stands for a missing operand.
    Atom(String),
    Call(FunctionCall),
    Aggregation(Aggregation),
    ArrayAccess(ArrayAccess),
    Negation(Box<Argument>),
}

/// A call whose closing parenthesis is the last character of the expression.
#[derive(Clone, Debug)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: Vec<Argument>,
}

/// Two or more operands joined by the same operator.
#[derive(Clone, Debug)]
pub struct Aggregation {
    pub operator: String,
    pub parts: Vec<Argument>,
}

#[derive(Clone, Debug)]
pub struct ArrayAccess {
    pub name: Box<Argument>,
    pub index: Box<Argument>,
}

impl Argument {
    /// Classifies `text`.  This never fails: text that matches no other shape becomes an atom.
    pub fn parse(text: &str) -> Argument {
        let line = normalize(text);
        match strip_enclosing_parentheses(&line) {
            Some(inner) => Argument {
                parenthesized: true,
                expression: Expression::classify(inner.trim()),
            },
            None => Argument {
                parenthesized: false,
                expression: Expression::classify(&line),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(&self.expression, Expression::Atom(text) if text.is_empty())
    }

    /// The text used to decide whether two arguments are the same.
    pub fn canonical_text(&self) -> String {
        self.to_string()
    }

    /// Returns the reference leaves of this expression: every atom and every function call,
    /// including calls nested inside other calls.  Operator chains, array accesses and negations
    /// only ever contribute their children.
    pub fn leaves(&self) -> Vec<&Argument> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    pub(crate) fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a Argument>) {
        match &self.expression {
            Expression::Atom(text) => {
                if !text.is_empty() {
                    leaves.push(self);
                }
            }
            Expression::Call(call) => {
                leaves.push(self);
                for argument in &call.arguments {
                    argument.collect_leaves(leaves);
                }
            }
            Expression::Aggregation(aggregation) => {
                for part in &aggregation.parts {
                    part.collect_leaves(leaves);
                }
            }
            Expression::ArrayAccess(access) => {
                access.index.collect_leaves(leaves);
                access.name.collect_leaves(leaves);
            }
            Expression::Negation(inner) => inner.collect_leaves(leaves),
        }
    }

    /// Whether the text `function <name>` appears anywhere inside an atom of this expression.
    pub fn uses_as_function(&self, name: &str) -> bool {
        match &self.expression {
            Expression::Atom(text) => text.contains(&format!("function {}", name)),
            Expression::Call(call) => call.arguments.iter().any(|a| a.uses_as_function(name)),
            Expression::Aggregation(aggregation) => {
                aggregation.parts.iter().any(|p| p.uses_as_function(name))
            }
            Expression::ArrayAccess(access) => {
                access.index.uses_as_function(name) || access.name.uses_as_function(name)
            }
            Expression::Negation(inner) => inner.uses_as_function(name),
        }
    }

    /// Renames every atom that is exactly `old` (or exactly `function old`).  Called function
    /// names are left alone.
    pub fn rename_variable(&mut self, old: &str, new: &str) {
        self.rename(old, new, false);
    }

    /// Like [`rename_variable`][Argument::rename_variable], but also renames the names of
    /// function calls.
    pub fn rename_function(&mut self, old: &str, new: &str) {
        self.rename(old, new, true);
    }

    fn rename(&mut self, old: &str, new: &str, calls: bool) {
        match &mut self.expression {
            Expression::Atom(text) => {
                if let Some(renamed) = rename_text(text, old, new) {
                    *text = renamed;
                }
            }
            Expression::Call(call) => {
                if calls {
                    if let Some(renamed) = rename_text(&call.name, old, new) {
                        call.name = renamed;
                    }
                }
                for argument in &mut call.arguments {
                    argument.rename(old, new, calls);
                }
            }
            Expression::Aggregation(aggregation) => {
                for part in &mut aggregation.parts {
                    part.rename(old, new, calls);
                }
            }
            Expression::ArrayAccess(access) => {
                access.name.rename(old, new, calls);
                access.index.rename(old, new, calls);
            }
            Expression::Negation(inner) => inner.rename(old, new, calls),
        }
    }

    /// Returns a copy of this expression in which every call to `function_name` is replaced by
    /// `replacement`.  Array accesses are never rewritten.
    pub fn inline(&self, function_name: &str, replacement: &FunctionCall) -> Argument {
        let expression = match &self.expression {
            Expression::Call(call) if call.name == function_name => {
                Expression::Call(replacement.clone())
            }
            Expression::Call(call) => Expression::Call(FunctionCall {
                name: call.name.clone(),
                arguments: call
                    .arguments
                    .iter()
                    .map(|a| a.inline(function_name, replacement))
                    .collect(),
            }),
            Expression::Aggregation(aggregation) => Expression::Aggregation(Aggregation {
                operator: aggregation.operator.clone(),
                parts: aggregation
                    .parts
                    .iter()
                    .map(|p| p.inline(function_name, replacement))
                    .collect(),
            }),
            Expression::Negation(inner) => {
                Expression::Negation(Box::new(inner.inline(function_name, replacement)))
            }
            Expression::Atom(_) | Expression::ArrayAccess(_) => self.expression.clone(),
        };
        Argument {
            parenthesized: self.parenthesized,
            expression,
        }
    }
}

fn rename_text(text: &str, old: &str, new: &str) -> Option<String> {
    if text == old {
        Some(new.to_string())
    } else if text.strip_prefix("function ") == Some(old) {
        Some(format!("function {}", new))
    } else {
        None
    }
}

impl From<FunctionCall> for Argument {
    fn from(call: FunctionCall) -> Argument {
        Argument {
            parenthesized: false,
            expression: Expression::Call(call),
        }
    }
}

impl FromStr for Argument {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Argument, ParseError> {
        Ok(Argument::parse(text))
    }
}

impl PartialEq for Argument {
    fn eq(&self, other: &Argument) -> bool {
        self.canonical_text() == other.canonical_text()
    }
}

impl Eq for Argument {}

impl Hash for Argument {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_text().hash(state);
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.parenthesized {
            write!(f, "({})", self.expression)
        } else {
            write!(f, "{}", self.expression)
        }
    }
}

impl Expression {
    fn classify(line: &str) -> Expression {
        let line = if line.starts_with("not ") {
            format!(" {}", line)
        } else {
            line.to_string()
        };
        if is_function_call(&line) {
            return Expression::Call(FunctionCall::split(&line));
        }
        if let Some((operator, parts)) = split_operands(&line) {
            let mut operands = parts.iter().filter(|p| !p.trim().is_empty());
            let non_empty = operands.clone().count();
            let operator = operator.trim();
            if non_empty >= 2 {
                return Expression::Aggregation(Aggregation {
                    operator: operator.to_string(),
                    parts: parts.iter().map(|p| Argument::parse(p)).collect(),
                });
            }
            if operator == "not" {
                if let Some(operand) = operands.next() {
                    return Expression::Negation(Box::new(Argument::parse(operand)));
                }
            }
        }
        Expression::atom_or_array(line.trim())
    }

    fn atom_or_array(text: &str) -> Expression {
        if text.ends_with(']') {
            if let (Some(open), Some(close)) = (text.find('['), text.rfind(']')) {
                if open > 0 && open < close {
                    return Expression::ArrayAccess(ArrayAccess {
                        name: Box::new(Argument::parse(&text[..open])),
                        index: Box::new(Argument::parse(&text[open + 1..close])),
                    });
                }
            }
        }
        Expression::Atom(text.to_string())
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expression::Atom(text) => write!(f, "{}", text),
            Expression::Call(call) => write!(f, "{}", call),
            Expression::Aggregation(aggregation) => write!(f, "{}", aggregation),
            Expression::ArrayAccess(access) => write!(f, "{}[{}]", access.name, access.index),
            // the operand's own parentheses are folded into the ones we emit
            Expression::Negation(inner) => write!(f, "not ({})", inner.expression),
        }
    }
}

impl FunctionCall {
    /// Splits a line already known to be a whole function call.
    fn split(line: &str) -> FunctionCall {
        let (open, close) = match (line.find('('), line.rfind(')')) {
            (Some(open), Some(close)) if open < close => (open, close),
            _ => {
                return FunctionCall {
                    name: line.trim().to_string(),
                    arguments: Vec::new(),
                }
            }
        };
        let mut arguments = Vec::new();
        let mut current = String::new();
        let mut quotes = QuoteTracker::default();
        let mut depth = 0;
        for ch in line[open..=close].chars() {
            quotes.observe(ch);
            if ch == '"' || quotes.quoted() {
                current.push(ch);
                continue;
            }
            match ch {
                '(' => {
                    depth += 1;
                    if depth > 1 {
                        current.push(ch);
                    }
                }
                ')' => {
                    if depth > 1 {
                        current.push(ch);
                    }
                    depth -= 1;
                }
                ',' if depth == 1 => {
                    arguments.push(Argument::parse(current.trim()));
                    current.clear();
                }
                _ => current.push(ch),
            }
        }
        if !current.trim().is_empty() {
            arguments.push(Argument::parse(current.trim()));
        }
        FunctionCall {
            name: line[..open].trim().to_string(),
            arguments,
        }
    }

    /// Renames the call itself as well as every argument.
    pub fn rename_function(&mut self, old: &str, new: &str) {
        if let Some(renamed) = rename_text(&self.name, old, new) {
            self.name = renamed;
        }
        for argument in &mut self.arguments {
            argument.rename_function(old, new);
        }
    }

    pub fn rename_variable(&mut self, old: &str, new: &str) {
        for argument in &mut self.arguments {
            argument.rename_variable(old, new);
        }
    }

    pub fn inline(&self, function_name: &str, replacement: &FunctionCall) -> FunctionCall {
        if self.name == function_name {
            return replacement.clone();
        }
        FunctionCall {
            name: self.name.clone(),
            arguments: self
                .arguments
                .iter()
                .map(|a| a.inline(function_name, replacement))
                .collect(),
        }
    }

    pub fn uses_as_function(&self, name: &str) -> bool {
        self.arguments.iter().any(|a| a.uses_as_function(name))
    }

    pub(crate) fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a Argument>) {
        for argument in &self.arguments {
            argument.collect_leaves(leaves);
        }
    }
}

impl FromStr for FunctionCall {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<FunctionCall, ParseError> {
        let line = normalize(text);
        if is_function_call(&line) {
            Ok(FunctionCall::split(&line))
        } else {
            Err(ParseError::ExpectedCall(line))
        }
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        let mut first = true;
        for argument in &self.arguments {
            if !first {
                write!(f, ",")?;
            }
            first = false;
            write!(f, "{}", argument)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut written = false;
        for (i, part) in self.parts.iter().enumerate() {
            let text = part.to_string();
            if i > 0 {
                if written {
                    write!(f, " ")?;
                }
                write!(f, "{}", self.operator)?;
                if !text.is_empty() {
                    write!(f, " ")?;
                }
                written = true;
            }
            if !text.is_empty() {
                write!(f, "{}", text)?;
                written = true;
            }
        }
        Ok(())
    }
}

/// Tracks whether a scan is inside a string literal.  A quote toggles the state unless it is
/// escaped by a single backslash; a doubled backslash escapes itself instead.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct QuoteTracker {
    quoted: bool,
    last: char,
    before_last: char,
}

impl QuoteTracker {
    /// Feeds the next character, returning whether it opened or closed a string literal.
    pub(crate) fn observe(&mut self, ch: char) -> bool {
        let toggles = ch == '"' && (self.last != '\\' || self.before_last == '\\');
        if toggles {
            self.quoted = !self.quoted;
        }
        self.before_last = self.last;
        self.last = ch;
        toggles
    }

    pub(crate) fn quoted(&self) -> bool {
        self.quoted
    }
}

/// Collapses whitespace outside of string literals, makes sure `<` and `>` are followed by a
/// space unless they start `<=` or `>=`, and trims the result.
pub(crate) fn normalize(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut quotes = QuoteTracker::default();
    let mut chars = text.trim().chars().peekable();
    while let Some(ch) = chars.next() {
        quotes.observe(ch);
        if ch == '"' || quotes.quoted() {
            result.push(ch);
            continue;
        }
        if ch.is_whitespace() {
            if !result.ends_with(' ') {
                result.push(' ');
            }
            continue;
        }
        result.push(ch);
        if (ch == '<' || ch == '>') && chars.peek() != Some(&'=') {
            result.push(' ');
        }
    }
    result.trim().to_string()
}

/// Returns the text inside a pair of parentheses that encloses all of `line`.
fn strip_enclosing_parentheses(line: &str) -> Option<&str> {
    if line.len() < 2 || !line.starts_with('(') || !line.ends_with(')') {
        return None;
    }
    let mut quotes = QuoteTracker::default();
    let mut depth = 0;
    let last = line.len() - 1;
    for (i, ch) in line.char_indices() {
        quotes.observe(ch);
        if ch == '"' || quotes.quoted() {
            continue;
        }
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 && i != last {
                    return None;
                }
            }
            _ => {}
        }
    }
    if depth == 0 {
        Some(&line[1..last])
    } else {
        None
    }
}

/// Whether `line` is a single call: a plain name, then a parenthesized argument list that closes
/// on the very last character.
pub(crate) fn is_function_call(line: &str) -> bool {
    let open = match line.find('(') {
        Some(open) => open,
        None => return false,
    };
    let name = &line[..open];
    if name.is_empty()
        || OPERATORS.iter().any(|op| name.contains(op))
        || name.contains(&INVALID_CALL_NAME_CHARACTERS[..])
    {
        return false;
    }
    let mut quotes = QuoteTracker::default();
    let mut depth = 0;
    let mut closed = false;
    for ch in line[open..].chars() {
        if closed {
            return false;
        }
        quotes.observe(ch);
        if ch == '"' || quotes.quoted() {
            continue;
        }
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                closed = depth == 0;
            }
            _ => {}
        }
    }
    closed
}

/// Splits `line` on the first operator that occurs at nesting depth zero outside of a string
/// literal, and on every later occurrence of that same operator.
fn split_operands(line: &str) -> Option<(&'static str, Vec<String>)> {
    let mut operator: Option<&'static str> = None;
    let mut parts = Vec::new();
    let mut buffer = String::new();
    let mut quotes = QuoteTracker::default();
    let mut depth = 0;
    for ch in line.chars() {
        buffer.push(ch);
        quotes.observe(ch);
        if ch == '"' || quotes.quoted() {
            continue;
        }
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            _ if depth == 0 => {
                let found = match operator {
                    Some(op) => Some(op).filter(|op| buffer.ends_with(op)),
                    None => OPERATORS.iter().copied().find(|op| buffer.ends_with(op)),
                };
                if let Some(op) = found {
                    buffer.truncate(buffer.len() - op.len());
                    parts.push(std::mem::take(&mut buffer));
                    operator = Some(op);
                }
            }
            _ => {}
        }
    }
    if !buffer.is_empty() {
        parts.push(buffer);
    }
    operator.map(|op| (op, parts))
}

// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2021, tree-sitter authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! Defines the AST structures of a JASS or vJass script

use std::fmt;

use crate::argument::Argument;
use crate::argument::FunctionCall;
use crate::write_nested;
use crate::DisplayIndented;
use crate::Indent;

/// A whole script, or the body of a library, scope or struct
#[derive(Clone, Debug, Default)]
pub struct Script {
    pub globals: Option<GlobalsSection>,
    pub functions: FunctionsSection,
    pub containers: Vec<Container>,
}

impl Script {
    pub fn is_empty(&self) -> bool {
        self.globals.is_none() && self.functions.callables.is_empty() && self.containers.is_empty()
    }

    /// Every global variable, those of the top-level section first and then those declared in
    /// containers, depth-first.
    pub fn global_variables(&self) -> Vec<&Variable> {
        let mut variables = Vec::new();
        self.collect_global_variables(&mut variables);
        variables
    }

    fn collect_global_variables<'a>(&'a self, variables: &mut Vec<&'a Variable>) {
        if let Some(globals) = &self.globals {
            variables.extend(globals.variables.iter());
        }
        for container in &self.containers {
            container.body.collect_global_variables(variables);
        }
    }

    /// Every callable, in the same order as [`global_variables`][Script::global_variables].
    pub fn callables(&self) -> Vec<&Callable> {
        let mut callables = Vec::new();
        self.collect_callables(&mut callables);
        callables
    }

    fn collect_callables<'a>(&'a self, callables: &mut Vec<&'a Callable>) {
        callables.extend(self.functions.callables.iter());
        for container in &self.containers {
            container.body.collect_callables(callables);
        }
    }

    pub fn rename_variable(&mut self, old: &str, new: &str) {
        if let Some(globals) = &mut self.globals {
            for variable in &mut globals.variables {
                variable.rename_variable(old, new);
            }
        }
        for callable in &mut self.functions.callables {
            callable.rename_variable(old, new);
        }
        for container in &mut self.containers {
            container.rename_variable(old, new);
        }
    }

    pub fn rename_function(&mut self, old: &str, new: &str) {
        if let Some(globals) = &mut self.globals {
            for variable in &mut globals.variables {
                variable.rename_function(old, new);
            }
        }
        for callable in &mut self.functions.callables {
            callable.rename_function(old, new);
        }
        for container in &mut self.containers {
            container.rename_function(old, new);
        }
    }

    /// Replaces every call to `function_name` in every function body and global initializer
    /// with `replacement`.
    pub fn inline(&mut self, function_name: &str, replacement: &FunctionCall) {
        if let Some(globals) = &mut self.globals {
            for variable in &mut globals.variables {
                *variable = variable.inline(function_name, replacement);
            }
        }
        for callable in &mut self.functions.callables {
            *callable = callable.inline(function_name, replacement);
        }
        for container in &mut self.containers {
            container.body.inline(function_name, replacement);
        }
    }
}

impl DisplayIndented for Script {
    fn fmt_indented(&self, f: &mut fmt::Formatter, indent: Indent) -> fmt::Result {
        let mut written = false;
        if let Some(globals) = &self.globals {
            globals.fmt_indented(f, indent)?;
            written = true;
        }
        for callable in &self.functions.callables {
            if written {
                writeln!(f)?;
            }
            callable.fmt_indented(f, indent)?;
            written = true;
        }
        for container in &self.containers {
            if written {
                writeln!(f)?;
            }
            container.fmt_indented(f, indent)?;
            written = true;
        }
        Ok(())
    }
}

/// A `globals` ... `endglobals` block
#[derive(Clone, Debug, Default)]
pub struct GlobalsSection {
    pub variables: Vec<Variable>,
}

impl DisplayIndented for GlobalsSection {
    fn fmt_indented(&self, f: &mut fmt::Formatter, indent: Indent) -> fmt::Result {
        write!(f, "{}globals", indent)?;
        write_nested(f, &self.variables, indent)?;
        write!(f, "\n{}endglobals", indent)
    }
}

/// The callables of a script, in declaration order
#[derive(Clone, Debug, Default)]
pub struct FunctionsSection {
    pub callables: Vec<Callable>,
}

/// A variable declaration: a global, a `local`, or a struct member
#[derive(Clone, Debug)]
pub struct Variable {
    pub constant: bool,
    /// Empty for the untyped `name = value` shorthand.
    pub type_name: String,
    pub array: bool,
    pub name: String,
    pub initial_value: Option<Argument>,
}

impl Variable {
    pub fn canonical_text(&self) -> String {
        self.to_string()
    }

    pub fn leaves(&self) -> Vec<&Argument> {
        match &self.initial_value {
            Some(value) => value.leaves(),
            None => Vec::new(),
        }
    }

    /// Renames the variable itself if it is called `old`, along with any references in its
    /// initializer.
    pub fn rename_variable(&mut self, old: &str, new: &str) {
        if self.name == old {
            self.name = new.to_string();
        }
        if let Some(value) = &mut self.initial_value {
            value.rename_variable(old, new);
        }
    }

    pub fn rename_function(&mut self, old: &str, new: &str) {
        if let Some(value) = &mut self.initial_value {
            value.rename_function(old, new);
        }
    }

    pub fn inline(&self, function_name: &str, replacement: &FunctionCall) -> Variable {
        Variable {
            initial_value: self
                .initial_value
                .as_ref()
                .map(|value| value.inline(function_name, replacement)),
            ..self.clone()
        }
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Variable) -> bool {
        self.canonical_text() == other.canonical_text()
    }
}

impl Eq for Variable {}

impl DisplayIndented for Variable {
    fn fmt_indented(&self, f: &mut fmt::Formatter, indent: Indent) -> fmt::Result {
        write!(f, "{}", indent)?;
        if self.constant {
            write!(f, "constant ")?;
        }
        if !self.type_name.is_empty() {
            write!(f, "{} ", self.type_name)?;
        }
        if self.array {
            write!(f, "array ")?;
        }
        write!(f, "{}", self.name)?;
        if let Some(value) = &self.initial_value {
            write!(f, "={}", value)?;
        }
        Ok(())
    }
}

/// Anything declared in a functions section
#[derive(Clone, Debug)]
pub enum Callable {
    Function(Function),
    Native(NativeFunction),
    Type(TypeDeclaration),
    /// A vJass method; its declaration uses the `method` keyword.
    Method(Function),
}

impl Callable {
    pub fn name(&self) -> &str {
        match self {
            Callable::Function(function) | Callable::Method(function) => {
                &function.declaration.name
            }
            Callable::Native(native) => &native.name,
            Callable::Type(declaration) => &declaration.name,
        }
    }

    /// The first line of the callable.
    pub fn declaration_text(&self) -> String {
        match self {
            Callable::Function(function) | Callable::Method(function) => {
                function.declaration.to_string()
            }
            Callable::Native(native) => native.to_string(),
            Callable::Type(declaration) => declaration.to_string(),
        }
    }

    pub fn statements(&self) -> &[Statement] {
        match self {
            Callable::Function(function) | Callable::Method(function) => &function.statements,
            Callable::Native(_) | Callable::Type(_) => &[],
        }
    }

    pub fn canonical_text(&self) -> String {
        self.to_string()
    }

    pub fn leaves(&self) -> Vec<&Argument> {
        let mut leaves = Vec::new();
        for statement in self.statements() {
            statement.collect_leaves(&mut leaves);
        }
        leaves
    }

    pub fn uses_as_function(&self, name: &str) -> bool {
        self.statements()
            .iter()
            .any(|statement| statement.uses_as_function(name))
    }

    pub fn rename_variable(&mut self, old: &str, new: &str) {
        if let Callable::Function(function) | Callable::Method(function) = self {
            for statement in &mut function.statements {
                statement.rename_variable(old, new);
            }
        }
    }

    pub fn rename_function(&mut self, old: &str, new: &str) {
        match self {
            Callable::Function(function) | Callable::Method(function) => {
                if function.declaration.name == old {
                    function.declaration.name = new.to_string();
                }
                for statement in &mut function.statements {
                    statement.rename_function(old, new);
                }
            }
            Callable::Native(native) => {
                if native.name == old {
                    native.name = new.to_string();
                }
            }
            Callable::Type(declaration) => {
                if declaration.name == old {
                    declaration.name = new.to_string();
                }
            }
        }
    }

    pub fn inline(&self, function_name: &str, replacement: &FunctionCall) -> Callable {
        match self {
            Callable::Function(function) => {
                Callable::Function(function.inline(function_name, replacement))
            }
            Callable::Method(function) => {
                Callable::Method(function.inline(function_name, replacement))
            }
            Callable::Native(_) | Callable::Type(_) => self.clone(),
        }
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Callable) -> bool {
        self.canonical_text() == other.canonical_text()
    }
}

impl Eq for Callable {}

impl DisplayIndented for Callable {
    fn fmt_indented(&self, f: &mut fmt::Formatter, indent: Indent) -> fmt::Result {
        match self {
            Callable::Function(function) | Callable::Method(function) => {
                function.fmt_indented(f, indent)
            }
            Callable::Native(native) => write!(f, "{}{}", indent, native),
            Callable::Type(declaration) => write!(f, "{}{}", indent, declaration),
        }
    }
}

/// A function or method with its body
#[derive(Clone, Debug)]
pub struct Function {
    pub declaration: Declaration,
    pub statements: Vec<Statement>,
}

impl Function {
    pub fn name(&self) -> &str {
        &self.declaration.name
    }

    pub fn inline(&self, function_name: &str, replacement: &FunctionCall) -> Function {
        Function {
            declaration: self.declaration.clone(),
            statements: inline_statements(&self.statements, function_name, replacement),
        }
    }
}

impl DisplayIndented for Function {
    fn fmt_indented(&self, f: &mut fmt::Formatter, indent: Indent) -> fmt::Result {
        write!(f, "{}{}", indent, self.declaration)?;
        write_nested(f, &self.statements, indent)?;
        write!(f, "\n{}{}", indent, self.declaration.kind.terminator())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeclarationKind {
    Function,
    Method,
}

impl DeclarationKind {
    pub fn keyword(self) -> &'static str {
        match self {
            DeclarationKind::Function => "function",
            DeclarationKind::Method => "method",
        }
    }

    pub fn terminator(self) -> &'static str {
        match self {
            DeclarationKind::Function => "endfunction",
            DeclarationKind::Method => "endmethod",
        }
    }
}

/// `[modifiers] [constant] function NAME takes PARAMETERS returns TYPE`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Declaration {
    /// Access and storage words such as `private` or `static`, verbatim.
    pub modifiers: Option<String>,
    pub constant: bool,
    pub kind: DeclarationKind,
    pub name: String,
    pub parameters: Parameters,
    pub returns: String,
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(modifiers) = &self.modifiers {
            write!(f, "{} ", modifiers)?;
        }
        if self.constant {
            write!(f, "constant ")?;
        }
        write!(
            f,
            "{} {} takes {} returns {}",
            self.kind.keyword(),
            self.name,
            self.parameters,
            self.returns
        )
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Parameters(pub Vec<Parameter>);

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Parameter {
    pub type_name: String,
    pub name: String,
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "nothing");
        }
        let mut first = true;
        for parameter in &self.0 {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{} {}", parameter.type_name, parameter.name)?;
        }
        Ok(())
    }
}

/// `[constant] native NAME takes PARAMETERS returns TYPE`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NativeFunction {
    pub constant: bool,
    pub name: String,
    pub parameters: Parameters,
    pub returns: String,
}

impl fmt::Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.constant {
            write!(f, "constant ")?;
        }
        write!(
            f,
            "native {} takes {} returns {}",
            self.name, self.parameters, self.returns
        )
    }
}

/// `type NAME [extends PARENT]`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypeDeclaration {
    pub name: String,
    pub flags: Option<String>,
}

impl fmt::Display for TypeDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "type {}", self.name)?;
        if let Some(flags) = &self.flags {
            write!(f, " {}", flags)?;
        }
        Ok(())
    }
}

/// A statement inside a function body
#[derive(Clone, Debug)]
pub enum Statement {
    Set(SetStatement),
    Local(LocalStatement),
    Return(ReturnStatement),
    ExitWhen(ExitWhenStatement),
    Loop(LoopStatement),
    Call(CallStatement),
    If(IfStatement),
}

impl Statement {
    pub fn leaves(&self) -> Vec<&Argument> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a Argument>) {
        match self {
            Statement::Set(stmt) => {
                stmt.value.collect_leaves(leaves);
                stmt.target.collect_leaves(leaves);
            }
            Statement::Local(stmt) => {
                if let Some(value) = &stmt.variable.initial_value {
                    value.collect_leaves(leaves);
                }
            }
            Statement::Return(stmt) => {
                if let Some(value) = &stmt.value {
                    value.collect_leaves(leaves);
                }
            }
            Statement::ExitWhen(stmt) => stmt.condition.collect_leaves(leaves),
            Statement::Loop(stmt) => {
                for statement in &stmt.statements {
                    statement.collect_leaves(leaves);
                }
            }
            Statement::Call(stmt) => stmt.call.collect_leaves(leaves),
            Statement::If(stmt) => {
                for branch in &stmt.branches {
                    branch.condition.collect_leaves(leaves);
                    for statement in &branch.statements {
                        statement.collect_leaves(leaves);
                    }
                }
                for statement in stmt.otherwise.iter().flatten() {
                    statement.collect_leaves(leaves);
                }
            }
        }
    }

    /// Whether `function <name>` appears anywhere in the text of the statement.
    pub fn uses_as_function(&self, name: &str) -> bool {
        self.to_string().contains(&format!("function {}", name))
    }

    pub fn rename_variable(&mut self, old: &str, new: &str) {
        self.rename(
            &mut |argument: &mut Argument| argument.rename_variable(old, new),
            &mut |variable: &mut Variable| variable.rename_variable(old, new),
        );
    }

    pub fn rename_function(&mut self, old: &str, new: &str) {
        self.rename(
            &mut |argument: &mut Argument| argument.rename_function(old, new),
            &mut |variable: &mut Variable| variable.rename_function(old, new),
        );
    }

    fn rename(
        &mut self,
        argument: &mut dyn FnMut(&mut Argument),
        variable: &mut dyn FnMut(&mut Variable),
    ) {
        match self {
            Statement::Set(stmt) => {
                argument(&mut stmt.target);
                argument(&mut stmt.value);
            }
            Statement::Local(stmt) => variable(&mut stmt.variable),
            Statement::Return(stmt) => {
                if let Some(value) = &mut stmt.value {
                    argument(value);
                }
            }
            Statement::ExitWhen(stmt) => argument(&mut stmt.condition),
            Statement::Loop(stmt) => {
                for statement in &mut stmt.statements {
                    statement.rename(argument, variable);
                }
            }
            Statement::Call(stmt) => argument(&mut stmt.call),
            Statement::If(stmt) => {
                for branch in &mut stmt.branches {
                    argument(&mut branch.condition);
                    for statement in &mut branch.statements {
                        statement.rename(argument, variable);
                    }
                }
                for statement in stmt.otherwise.iter_mut().flatten() {
                    statement.rename(argument, variable);
                }
            }
        }
    }

    /// Returns a copy of the statement with every call to `function_name` replaced.
    pub fn inline(&self, function_name: &str, replacement: &FunctionCall) -> Statement {
        match self {
            Statement::Set(stmt) => SetStatement {
                target: stmt.target.clone(),
                value: stmt.value.inline(function_name, replacement),
            }
            .into(),
            Statement::Local(stmt) => LocalStatement {
                variable: stmt.variable.inline(function_name, replacement),
            }
            .into(),
            Statement::Return(stmt) => ReturnStatement {
                value: stmt
                    .value
                    .as_ref()
                    .map(|value| value.inline(function_name, replacement)),
            }
            .into(),
            Statement::ExitWhen(stmt) => ExitWhenStatement {
                condition: stmt.condition.inline(function_name, replacement),
            }
            .into(),
            Statement::Loop(stmt) => LoopStatement {
                statements: inline_statements(&stmt.statements, function_name, replacement),
            }
            .into(),
            Statement::Call(stmt) => CallStatement {
                call: stmt.call.inline(function_name, replacement),
            }
            .into(),
            Statement::If(stmt) => IfStatement {
                branches: stmt
                    .branches
                    .iter()
                    .map(|branch| Branch {
                        condition: branch.condition.inline(function_name, replacement),
                        statements: inline_statements(
                            &branch.statements,
                            function_name,
                            replacement,
                        ),
                    })
                    .collect(),
                otherwise: stmt
                    .otherwise
                    .as_ref()
                    .map(|s| inline_statements(s, function_name, replacement)),
            }
            .into(),
        }
    }
}

fn inline_statements(
    statements: &[Statement],
    function_name: &str,
    replacement: &FunctionCall,
) -> Vec<Statement> {
    statements
        .iter()
        .map(|s| s.inline(function_name, replacement))
        .collect()
}

impl PartialEq for Statement {
    fn eq(&self, other: &Statement) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Eq for Statement {}

impl DisplayIndented for Statement {
    fn fmt_indented(&self, f: &mut fmt::Formatter, indent: Indent) -> fmt::Result {
        match self {
            Statement::Set(stmt) => write!(f, "{}set {} = {}", indent, stmt.target, stmt.value),
            Statement::Local(stmt) => write!(f, "{}local {}", indent, stmt.variable),
            Statement::Return(stmt) => match &stmt.value {
                Some(value) => write!(f, "{}return {}", indent, value),
                None => write!(f, "{}return", indent),
            },
            Statement::ExitWhen(stmt) => write!(f, "{}exitwhen {}", indent, stmt.condition),
            Statement::Loop(stmt) => {
                write!(f, "{}loop", indent)?;
                write_nested(f, &stmt.statements, indent)?;
                write!(f, "\n{}endloop", indent)
            }
            Statement::Call(stmt) => write!(f, "{}call {}", indent, stmt.call),
            Statement::If(stmt) => {
                for (i, branch) in stmt.branches.iter().enumerate() {
                    if i == 0 {
                        write!(f, "{}if {} then", indent, branch.condition)?;
                    } else {
                        write!(f, "\n{}elseif {} then", indent, branch.condition)?;
                    }
                    write_nested(f, &branch.statements, indent)?;
                }
                if let Some(otherwise) = &stmt.otherwise {
                    write!(f, "\n{}else", indent)?;
                    write_nested(f, otherwise, indent)?;
                }
                write!(f, "\n{}endif", indent)
            }
        }
    }
}

/// `set TARGET = VALUE`
#[derive(Clone, Debug)]
pub struct SetStatement {
    pub target: Argument,
    pub value: Argument,
}

impl From<SetStatement> for Statement {
    fn from(statement: SetStatement) -> Statement {
        Statement::Set(statement)
    }
}

/// `local VARIABLE`
#[derive(Clone, Debug)]
pub struct LocalStatement {
    pub variable: Variable,
}

impl From<LocalStatement> for Statement {
    fn from(statement: LocalStatement) -> Statement {
        Statement::Local(statement)
    }
}

/// `return [VALUE]`
#[derive(Clone, Debug)]
pub struct ReturnStatement {
    pub value: Option<Argument>,
}

impl From<ReturnStatement> for Statement {
    fn from(statement: ReturnStatement) -> Statement {
        Statement::Return(statement)
    }
}

/// `exitwhen CONDITION`
#[derive(Clone, Debug)]
pub struct ExitWhenStatement {
    pub condition: Argument,
}

impl From<ExitWhenStatement> for Statement {
    fn from(statement: ExitWhenStatement) -> Statement {
        Statement::ExitWhen(statement)
    }
}

/// `loop` ... `endloop`
#[derive(Clone, Debug)]
pub struct LoopStatement {
    pub statements: Vec<Statement>,
}

impl From<LoopStatement> for Statement {
    fn from(statement: LoopStatement) -> Statement {
        Statement::Loop(statement)
    }
}

/// `call NAME(ARGUMENTS)`.  The argument is always a function call.
#[derive(Clone, Debug)]
pub struct CallStatement {
    pub call: Argument,
}

impl From<CallStatement> for Statement {
    fn from(statement: CallStatement) -> Statement {
        Statement::Call(statement)
    }
}

/// `if` ... [`elseif` ...]* [`else` ...] `endif`
#[derive(Clone, Debug)]
pub struct IfStatement {
    /// The `if` arm followed by every `elseif` arm
    pub branches: Vec<Branch>,
    pub otherwise: Option<Vec<Statement>>,
}

#[derive(Clone, Debug)]
pub struct Branch {
    pub condition: Argument,
    pub statements: Vec<Statement>,
}

impl From<IfStatement> for Statement {
    fn from(statement: IfStatement) -> Statement {
        Statement::If(statement)
    }
}

/// A vJass library, scope or struct
#[derive(Clone, Debug)]
pub struct Container {
    pub kind: ContainerKind,
    pub modifiers: Option<String>,
    pub name: String,
    /// Everything after the name on the opening line, such as `initializer Init requires Foo`.
    pub flags: Option<String>,
    /// Member declarations; only structs have any.
    pub members: Vec<StructMember>,
    pub body: Script,
}

impl Container {
    /// The function named by an `initializer` clause, if there is one.
    pub fn initializer(&self) -> Option<&str> {
        let flags = self.flags.as_deref()?;
        let mut words = flags.split_whitespace();
        words.find(|word| *word == "initializer")?;
        words.next()
    }

    fn rename_variable(&mut self, old: &str, new: &str) {
        // members are fields, not globals, so only their initializers change
        for member in &mut self.members {
            if let Some(value) = &mut member.variable.initial_value {
                value.rename_variable(old, new);
            }
        }
        self.body.rename_variable(old, new);
    }

    fn rename_function(&mut self, old: &str, new: &str) {
        if self.initializer() == Some(old) {
            if let Some(flags) = &mut self.flags {
                let mut renamed = Vec::new();
                let mut after_initializer = false;
                for word in flags.split_whitespace() {
                    if after_initializer && word == old {
                        renamed.push(new);
                    } else {
                        renamed.push(word);
                    }
                    after_initializer = word == "initializer";
                }
                *flags = renamed.join(" ");
            }
        }
        for member in &mut self.members {
            member.variable.rename_function(old, new);
        }
        self.body.rename_function(old, new);
    }
}

impl DisplayIndented for Container {
    fn fmt_indented(&self, f: &mut fmt::Formatter, indent: Indent) -> fmt::Result {
        write!(f, "{}", indent)?;
        if let Some(modifiers) = &self.modifiers {
            write!(f, "{} ", modifiers)?;
        }
        write!(f, "{} {}", self.kind.keyword(), self.name)?;
        if let Some(flags) = &self.flags {
            write!(f, " {}", flags)?;
        }
        write_nested(f, &self.members, indent)?;
        if !self.body.is_empty() {
            writeln!(f)?;
            self.body.fmt_indented(f, indent.nested())?;
        }
        write!(f, "\n{}{}", indent, self.kind.terminator())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContainerKind {
    Library,
    Scope,
    Struct,
}

impl ContainerKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ContainerKind::Library => "library",
            ContainerKind::Scope => "scope",
            ContainerKind::Struct => "struct",
        }
    }

    pub fn terminator(self) -> &'static str {
        match self {
            ContainerKind::Library => "endlibrary",
            ContainerKind::Scope => "endscope",
            ContainerKind::Struct => "endstruct",
        }
    }
}

/// A field of a struct, such as `static integer count = 0`
#[derive(Clone, Debug)]
pub struct StructMember {
    pub modifiers: Option<String>,
    pub variable: Variable,
}

impl DisplayIndented for StructMember {
    fn fmt_indented(&self, f: &mut fmt::Formatter, indent: Indent) -> fmt::Result {
        write!(f, "{}", indent)?;
        if let Some(modifiers) = &self.modifiers {
            write!(f, "{} ", modifiers)?;
        }
        write!(f, "{}", self.variable)
    }
}

macro_rules! display_compact {
    ($($node:ty),* $(,)?) => {
        $(
            impl fmt::Display for $node {
                fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    self.fmt_indented(f, Indent::compact())
                }
            }
        )*
    };
}

display_compact!(
    Script,
    GlobalsSection,
    Variable,
    Callable,
    Function,
    Statement,
    Container,
    StructMember,
);

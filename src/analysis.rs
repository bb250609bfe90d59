// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2021, tree-sitter authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! Dependency isolation: collecting the part of a tree that a function or variable depends on.
//!
//! A function references a global variable when the variable's name is one of the reference
//! leaves of the function's statements.  A function references another callable only through a
//! first-class `function Name` mention; plain calls do not create an edge.  Starting from a seed,
//! the [`AnalysisService`] adds every referenced entity to a [`Slice`] and then expands from the
//! newly added entities, until nothing new is found or the iteration budget runs out.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use log::trace;
use serde::ser;
use serde::ser::SerializeMap;
use serde::ser::SerializeSeq;
use thiserror::Error;

use crate::ast::Callable;
use crate::ast::Variable;
use crate::SyntaxTree;

/// An error that can occur when the seed of an isolation does not exist
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Expected to be able to isolate on variable {0} but was not found.")]
    UndefinedVariable(String),
    #[error("Expected to be able to isolate on function {0} but was not found.")]
    UndefinedFunction(String),
}

/// Which callable-to-callable edges are followed when isolating a function
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExpansionStyle {
    /// Both the callables the seed mentions and the callables that mention the seed
    Aggressive,
    /// Only the callables the seed mentions
    Passive,
    /// Only the callables that mention the seed
    Inverse,
}

impl ExpansionStyle {
    fn follows_mentions(self) -> bool {
        self != ExpansionStyle::Inverse
    }

    fn follows_mentioners(self) -> bool {
        self != ExpansionStyle::Passive
    }
}

impl Default for ExpansionStyle {
    fn default() -> ExpansionStyle {
        ExpansionStyle::Passive
    }
}

#[derive(Debug, Error)]
#[error("Unknown expansion style '{0}'")]
pub struct UnknownExpansionStyle(String);

impl FromStr for ExpansionStyle {
    type Err = UnknownExpansionStyle;

    fn from_str(s: &str) -> Result<ExpansionStyle, UnknownExpansionStyle> {
        match s.to_ascii_lowercase().as_str() {
            "aggressive" => Ok(ExpansionStyle::Aggressive),
            "passive" => Ok(ExpansionStyle::Passive),
            "inverse" => Ok(ExpansionStyle::Inverse),
            _ => Err(UnknownExpansionStyle(s.to_string())),
        }
    }
}

/// How widely a global variable is used
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VariableScope {
    /// No function refers to it
    Unused,
    /// Exactly one function refers to it, so it could be a local of that function
    SingleUse,
    Global,
}

impl fmt::Display for VariableScope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VariableScope::Unused => write!(f, "unused"),
            VariableScope::SingleUse => write!(f, "single use"),
            VariableScope::Global => write!(f, "global"),
        }
    }
}

/// The functions and variables collected by an isolation.  Each entity appears at most once,
/// as decided by its canonical text.
#[derive(Debug, Default)]
pub struct Slice<'tree> {
    functions: Vec<(usize, &'tree Callable)>,
    variables: Vec<(usize, &'tree Variable)>,
    function_keys: HashSet<String>,
    variable_keys: HashSet<String>,
}

impl<'tree> Slice<'tree> {
    pub fn new() -> Slice<'tree> {
        Slice::default()
    }

    /// The collected callables, in the order they are declared in the tree.
    pub fn functions(&self) -> Vec<&'tree Callable> {
        let mut functions = self.functions.clone();
        functions.sort_by_key(|(index, _)| *index);
        functions.into_iter().map(|(_, callable)| callable).collect()
    }

    /// The collected variables, in the order they are declared in the tree.
    pub fn variables(&self) -> Vec<&'tree Variable> {
        let mut variables = self.variables.clone();
        variables.sort_by_key(|(index, _)| *index);
        variables.into_iter().map(|(_, variable)| variable).collect()
    }

    pub fn contains_function(&self, name: &str) -> bool {
        self.functions.iter().any(|(_, callable)| callable.name() == name)
    }

    pub fn contains_variable(&self, name: &str) -> bool {
        self.variables.iter().any(|(_, variable)| variable.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.variables.is_empty()
    }

    /// Returns whether the callable was not already part of the slice.
    fn add_function(&mut self, index: usize, callable: &'tree Callable) -> bool {
        let added = self.function_keys.insert(callable.canonical_text());
        if added {
            self.functions.push((index, callable));
        }
        added
    }

    fn add_variable(&mut self, index: usize, variable: &'tree Variable) -> bool {
        let added = self.variable_keys.insert(variable.canonical_text());
        if added {
            self.variables.push((index, variable));
        }
        added
    }

    /// Renders the names of the collected entities as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn display_json(&self) -> serde_json::Result<()> {
        println!("{}", self.to_json()?);
        Ok(())
    }
}

impl ser::Serialize for Slice<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        struct Names<I>(I);

        impl<I> ser::Serialize for Names<I>
        where
            I: Clone + ExactSizeIterator,
            I::Item: ser::Serialize,
        {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: ser::Serializer,
            {
                let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
                for name in self.0.clone() {
                    seq.serialize_element(&name)?;
                }
                seq.end()
            }
        }

        let functions = self.functions();
        let variables = self.variables();
        // serializing as a map instead of a struct so we don't have to encode a struct name
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("functions", &Names(functions.iter().map(|c| c.name())))?;
        map.serialize_entry(
            "variables",
            &Names(variables.iter().map(|v| v.name.as_str())),
        )?;
        map.end()
    }
}

/// Answers dependency questions over syntax trees
#[derive(Clone, Debug, Default)]
pub struct AnalysisService {
    style: ExpansionStyle,
}

impl AnalysisService {
    pub fn new() -> AnalysisService {
        AnalysisService::default()
    }

    pub fn with_style(style: ExpansionStyle) -> AnalysisService {
        AnalysisService { style }
    }

    pub fn expansion_style(&self) -> ExpansionStyle {
        self.style
    }

    pub fn set_expansion_style(&mut self, style: ExpansionStyle) {
        self.style = style;
    }

    /// Collects the global variable `name`, the functions that reference it, and whatever those
    /// functions depend on.  Each expansion round uses up one unit of `budget`; a negative
    /// budget never runs out, and a budget of zero collects nothing at all.
    pub fn isolate_variable<'tree>(
        &self,
        tree: &'tree SyntaxTree,
        name: &str,
        budget: i32,
    ) -> Result<Slice<'tree>, LookupError> {
        let mut slice = Slice::new();
        Isolation::new(self.style, tree).variable(name, budget, &mut slice)?;
        Ok(slice)
    }

    /// Collects the callable `name`, the globals it references, and the callables connected to
    /// it according to the expansion style, transitively.
    pub fn isolate_function<'tree>(
        &self,
        tree: &'tree SyntaxTree,
        name: &str,
        budget: i32,
    ) -> Result<Slice<'tree>, LookupError> {
        let mut slice = Slice::new();
        Isolation::new(self.style, tree).function(name, budget, &mut slice)?;
        Ok(slice)
    }

    /// Classifies a global by the number of functions that directly reference it.
    pub fn find_variable_scope(
        &self,
        tree: &SyntaxTree,
        name: &str,
    ) -> Result<VariableScope, LookupError> {
        let slice = self.isolate_variable(tree, name, 1)?;
        Ok(match slice.functions.len() {
            0 => VariableScope::Unused,
            1 => VariableScope::SingleUse,
            _ => VariableScope::Global,
        })
    }
}

/// The state of a single isolation: the tree's entities, flattened once.
struct Isolation<'tree> {
    style: ExpansionStyle,
    variables: Vec<&'tree Variable>,
    callables: Vec<&'tree Callable>,
}

impl<'tree> Isolation<'tree> {
    fn new(style: ExpansionStyle, tree: &'tree SyntaxTree) -> Isolation<'tree> {
        Isolation {
            style,
            variables: tree.global_variables(),
            callables: tree.callables(),
        }
    }

    fn variable(
        &self,
        name: &str,
        budget: i32,
        slice: &mut Slice<'tree>,
    ) -> Result<(), LookupError> {
        if budget == 0 {
            return Ok(());
        }
        let (index, variable) = self
            .variables
            .iter()
            .copied()
            .enumerate()
            .find(|(_, variable)| variable.name == name)
            .ok_or_else(|| LookupError::UndefinedVariable(name.to_string()))?;
        slice.add_variable(index, variable);

        let mut added = Vec::new();
        for (index, callable) in self.callables.iter().copied().enumerate() {
            let references = callable
                .leaves()
                .iter()
                .any(|leaf| leaf.expression.to_string() == name);
            if references && slice.add_function(index, callable) {
                added.push(callable.name());
            }
        }
        trace!(
            "isolating variable {} with budget {}: {} new functions",
            name,
            budget,
            added.len()
        );

        for function in added {
            self.function(function, remaining(budget), slice)?;
        }
        Ok(())
    }

    fn function(
        &self,
        name: &str,
        budget: i32,
        slice: &mut Slice<'tree>,
    ) -> Result<(), LookupError> {
        if budget == 0 {
            return Ok(());
        }
        let (index, seed) = self
            .callables
            .iter()
            .copied()
            .enumerate()
            .find(|(_, callable)| callable.name() == name)
            .ok_or_else(|| LookupError::UndefinedFunction(name.to_string()))?;
        slice.add_function(index, seed);

        let leaves = seed
            .leaves()
            .into_iter()
            .map(|leaf| leaf.expression.to_string())
            .collect::<HashSet<_>>();
        let mut added_variables = Vec::new();
        for (index, variable) in self.variables.iter().copied().enumerate() {
            if leaves.contains(&variable.name) && slice.add_variable(index, variable) {
                added_variables.push(variable.name.as_str());
            }
        }

        let mut added_functions = Vec::new();
        if self.style.follows_mentions() {
            let seed_leaves = seed.leaves();
            for (index, callable) in self.callables.iter().copied().enumerate() {
                let mentioned = seed_leaves
                    .iter()
                    .any(|leaf| leaf.uses_as_function(callable.name()));
                if mentioned && slice.add_function(index, callable) {
                    added_functions.push(callable.name());
                }
            }
        }
        if self.style.follows_mentioners() {
            for (index, callable) in self.callables.iter().copied().enumerate() {
                let mentions = callable
                    .leaves()
                    .iter()
                    .any(|leaf| leaf.uses_as_function(name));
                if mentions && slice.add_function(index, callable) {
                    added_functions.push(callable.name());
                }
            }
        }
        trace!(
            "isolating function {} with budget {}: {} new variables, {} new functions",
            name,
            budget,
            added_variables.len(),
            added_functions.len()
        );

        for variable in added_variables {
            self.variable(variable, remaining(budget), slice)?;
        }
        for function in added_functions {
            self.function(function, remaining(budget), slice)?;
        }
        Ok(())
    }
}

/// The budget left for the next round; negative budgets never run out.
fn remaining(budget: i32) -> i32 {
    if budget < 0 {
        budget
    } else {
        budget - 1
    }
}

// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2021, tree-sitter authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! Whole-tree operations: reading, writing, merging, renaming and deduplicating scripts.

use std::fmt;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use log::debug;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::analysis::Slice;
use crate::argument::FunctionCall;
use crate::ast::Callable;
use crate::ast::DeclarationKind;
use crate::ast::Function;
use crate::ast::FunctionsSection;
use crate::ast::GlobalsSection;
use crate::ast::Script;
use crate::ast::TypeDeclaration;
use crate::ast::Variable;
use crate::names::NameSource;
use crate::preprocess::LinePreprocessor;
use crate::preprocess::Preprocessor;
use crate::DisplayIndented;
use crate::Indent;
use crate::ParseError;

/// An error that can occur while transforming a syntax tree
#[derive(Debug, Error)]
pub enum TreeError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Cannot parse the script after line '{0}'")]
    Read(String, #[source] ParseError),
    #[error("Incompatible merge: {0}, {1}")]
    Merge(String, String),
    #[error("Cannot rename {0}")]
    Rename(String, #[source] Box<TreeError>),
    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),
    #[error("Cannot read {0}")]
    ReadFile(PathBuf, #[source] io::Error),
    #[error("Cannot write {0}")]
    WriteFile(PathBuf, #[source] io::Error),
    #[error("{0} is not supported")]
    Unsupported(&'static str),
}

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// A parsed script together with the operations that rewrite it as a whole
#[derive(Clone, Debug, Default)]
pub struct SyntaxTree {
    script: Script,
}

impl SyntaxTree {
    pub fn new(script: Script) -> SyntaxTree {
        SyntaxTree { script }
    }

    /// Reads a tree using the default [`LinePreprocessor`].
    pub fn read(source: &str) -> Result<SyntaxTree, TreeError> {
        SyntaxTree::read_with(source, &LinePreprocessor)
    }

    pub fn read_with(
        source: &str,
        preprocessor: &dyn Preprocessor,
    ) -> Result<SyntaxTree, TreeError> {
        let lines = preprocessor.preprocess(source);
        match Script::parse(&lines) {
            Ok(script) => Ok(SyntaxTree { script }),
            Err(error) => {
                let last = error
                    .location()
                    .and_then(|location| lines.get(location.line))
                    .cloned()
                    .unwrap_or_default();
                Err(TreeError::Read(last, error))
            }
        }
    }

    pub fn read_file(path: &Path) -> Result<SyntaxTree, TreeError> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| TreeError::ReadFile(path.to_path_buf(), e))?;
        SyntaxTree::read(&source)
    }

    /// Builds a standalone tree out of the globals and callables of a slice.  The tree has no
    /// globals section when the slice has no variables.
    pub fn from_slice(slice: &Slice) -> SyntaxTree {
        let variables = slice
            .variables()
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();
        let script = Script {
            globals: if variables.is_empty() {
                None
            } else {
                Some(GlobalsSection { variables })
            },
            functions: FunctionsSection {
                callables: slice.functions().iter().map(|c| (*c).clone()).collect(),
            },
            containers: Vec::new(),
        };
        SyntaxTree { script }
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn into_script(self) -> Script {
        self.script
    }

    pub fn global_variables(&self) -> Vec<&Variable> {
        self.script.global_variables()
    }

    pub fn callables(&self) -> Vec<&Callable> {
        self.script.callables()
    }

    pub fn types(&self) -> Vec<&TypeDeclaration> {
        self.callables()
            .into_iter()
            .filter_map(|callable| match callable {
                Callable::Type(declaration) => Some(declaration),
                _ => None,
            })
            .collect()
    }

    /// Writes the compact rendering of the tree, followed by a newline.
    pub fn write(&self, path: &Path) -> Result<(), TreeError> {
        debug!("writing tree to {}", path.display());
        std::fs::write(path, format!("{}\n", self))
            .map_err(|e| TreeError::WriteFile(path.to_path_buf(), e))
    }

    pub fn to_formatted_string(&self) -> String {
        self.script.display_indented(Indent::formatted(0)).to_string()
    }

    /// Appends the declarations of `other` to this tree.  Functions named `main` or `config`
    /// that exist in both trees have their bodies concatenated instead.  On failure the tree is
    /// left untouched.
    pub fn merge(&mut self, other: SyntaxTree) -> Result<(), TreeError> {
        debug!("merging trees");
        let mut merged = self.script.clone();
        merged.merge(other.script)?;
        self.script = merged;
        Ok(())
    }

    pub fn rename_variable(&mut self, old: &str, new: &str) -> Result<(), TreeError> {
        debug!("renaming variable {} to {}", old, new);
        check_identifier(new).map_err(|e| TreeError::Rename(old.to_string(), Box::new(e)))?;
        self.script.rename_variable(old, new);
        Ok(())
    }

    pub fn rename_function(&mut self, old: &str, new: &str) -> Result<(), TreeError> {
        debug!("renaming function {} to {}", old, new);
        check_identifier(new).map_err(|e| TreeError::Rename(old.to_string(), Box::new(e)))?;
        self.script.rename_function(old, new);
        Ok(())
    }

    pub fn rename_local_variable(
        &mut self,
        _function: &str,
        _old: &str,
        _new: &str,
    ) -> Result<(), TreeError> {
        Err(TreeError::Unsupported("renaming local variables"))
    }

    /// Gives every global variable, and then every callable except `main`, a fresh name.
    pub fn deduplicate(&mut self, names: &mut dyn NameSource) -> Result<(), TreeError> {
        let variables = self
            .global_variables()
            .into_iter()
            .map(|variable| variable.name.clone())
            .collect::<Vec<_>>();
        let callables = self
            .callables()
            .into_iter()
            .map(|callable| callable.name().to_string())
            .filter(|name| name != "main")
            .collect::<Vec<_>>();
        debug!(
            "deduplicating {} variables and {} callables",
            variables.len(),
            callables.len()
        );
        for variable in variables {
            self.rename_variable(&variable, &names.next_name())?;
        }
        for callable in callables {
            self.rename_function(&callable, &names.next_name())?;
        }
        Ok(())
    }

    /// Re-reads the rendered tree with blank lines removed.
    pub fn postprocess(&self) -> Result<SyntaxTree, TreeError> {
        debug!("postprocessing tree");
        let mut text = self.to_string();
        while text.contains("\n\n") {
            text = text.replace("\n\n", "\n");
        }
        SyntaxTree::read(&text)
    }

    /// Appends an empty `main` function unless the tree already has one.
    pub fn add_function_main(&mut self) {
        if self.callables().iter().any(|callable| callable.name() == "main") {
            warn!("tree already has a main function");
            return;
        }
        self.script
            .functions
            .callables
            .push(Callable::Function(Function {
                declaration: main_declaration(),
                statements: Vec::new(),
            }));
    }

    /// Replaces every call to `function_name` with the call in `replacement`.
    pub fn inline_function_calls(
        &mut self,
        function_name: &str,
        replacement: &str,
    ) -> Result<(), TreeError> {
        let replacement = replacement.parse::<FunctionCall>()?;
        debug!("inlining calls to {} as {}", function_name, replacement);
        self.script.inline(function_name, &replacement);
        Ok(())
    }
}

impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.script)
    }
}

fn check_identifier(name: &str) -> Result<(), TreeError> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(TreeError::InvalidIdentifier(name.to_string()))
    }
}

fn main_declaration() -> crate::ast::Declaration {
    crate::ast::Declaration {
        modifiers: None,
        constant: false,
        kind: DeclarationKind::Function,
        name: "main".to_string(),
        parameters: Default::default(),
        returns: "nothing".to_string(),
    }
}

impl Script {
    /// Appends the contents of `other`.  See [`SyntaxTree::merge`].
    pub fn merge(&mut self, other: Script) -> Result<(), TreeError> {
        if let Some(globals) = other.globals {
            match &mut self.globals {
                Some(existing) => existing.variables.extend(globals.variables),
                None => self.globals = Some(globals),
            }
        }
        self.functions.merge(other.functions)?;
        self.containers.extend(other.containers);
        Ok(())
    }
}

impl FunctionsSection {
    /// Types come first, then natives, then every other callable in order, then `config` and
    /// finally `main`, so that everything is declared before it is called.
    pub fn merge(&mut self, other: FunctionsSection) -> Result<(), TreeError> {
        let mut types = Vec::new();
        let mut natives = Vec::new();
        let mut others = Vec::new();
        let mut config: Option<Function> = None;
        let mut main: Option<Function> = None;
        let callables = std::mem::take(&mut self.callables);
        for callable in callables.into_iter().chain(other.callables) {
            match callable {
                Callable::Type(_) => types.push(callable),
                Callable::Native(_) => natives.push(callable),
                Callable::Function(function) if function.name() == "config" => {
                    merge_into(&mut config, function)?
                }
                Callable::Function(function) if function.name() == "main" => {
                    merge_into(&mut main, function)?
                }
                _ => others.push(callable),
            }
        }
        self.callables = types;
        self.callables.extend(natives);
        self.callables.extend(others);
        self.callables.extend(config.map(Callable::Function));
        self.callables.extend(main.map(Callable::Function));
        Ok(())
    }
}

fn merge_into(slot: &mut Option<Function>, function: Function) -> Result<(), TreeError> {
    match slot {
        Some(existing) => existing.merge(function),
        None => {
            *slot = Some(function);
            Ok(())
        }
    }
}

impl Function {
    /// Appends the statements of `other`, which must have the same declaration.
    pub fn merge(&mut self, other: Function) -> Result<(), TreeError> {
        if self.declaration != other.declaration {
            return Err(TreeError::Merge(
                self.declaration.to_string(),
                other.declaration.to_string(),
            ));
        }
        self.statements.extend(other.statements);
        Ok(())
    }
}

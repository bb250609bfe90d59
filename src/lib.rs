// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2021, tree-sitter authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! This library parses [JASS][] and vJass scripts into a structural syntax tree that can be
//! merged, renamed, obfuscated and sliced.
//!
//! [JASS]: https://jass.sourceforge.net/doc/
//!
//! # Overview
//!
//! Scripts are read one logical line at a time.  A [preprocessor][preprocess::Preprocessor] first
//! strips comments and normalizes whitespace, and the parser then builds a [`Script`][ast::Script]
//! made of a globals section, a functions section (functions, natives, type declarations and
//! methods) and any vJass libraries, scopes and structs.  Every expression that appears inside a
//! statement is classified into an [`Argument`][argument::Argument] so that references to
//! variables and functions can be found and rewritten structurally.
//!
//! The [`SyntaxTree`] wraps a parsed script with the whole-tree operations: merging two scripts,
//! renaming globals and functions, deduplicating names with a [`NameSource`][names::NameSource],
//! and re-rendering the result either compactly or with indentation.
//!
//! The [`AnalysisService`] answers dependency questions over a tree.  Starting from a function or
//! a global variable it collects the transitive closure of everything the seed references (and,
//! depending on the [`ExpansionStyle`], everything that references the seed) into a [`Slice`],
//! which can be turned back into a standalone tree.

pub mod analysis;
pub mod argument;
pub mod ast;
pub mod names;
pub mod parse_error;
mod parser;
pub mod preprocess;
pub mod tree;

pub use analysis::AnalysisService;
pub use analysis::ExpansionStyle;
pub use analysis::LookupError;
pub use analysis::Slice;
pub use analysis::VariableScope;
pub use parser::Location;
pub use parser::ParseError;
pub use tree::SyntaxTree;
pub use tree::TreeError;

use std::fmt;

/// The indentation applied while rendering a node.  A compact indent never emits any whitespace,
/// which is how trees are written back out by default.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Indent {
    level: usize,
    width: usize,
}

impl Indent {
    pub fn compact() -> Indent {
        Indent { level: 0, width: 0 }
    }

    /// Four spaces per nesting level, starting at `level`.
    pub fn formatted(level: usize) -> Indent {
        Indent { level, width: 4 }
    }

    pub fn nested(self) -> Indent {
        Indent {
            level: self.level + 1,
            ..self
        }
    }
}

impl Default for Indent {
    fn default() -> Indent {
        Indent::compact()
    }
}

impl fmt::Display for Indent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:1$}", "", self.level * self.width)
    }
}

/// Like [`Display`][fmt::Display], but for nodes that span several lines and need to know how
/// deeply they are nested.
pub trait DisplayIndented {
    fn fmt_indented(&self, f: &mut fmt::Formatter, indent: Indent) -> fmt::Result;

    fn display_indented<'a>(&'a self, indent: Indent) -> Box<dyn fmt::Display + 'a>
    where
        Self: Sized,
    {
        struct Impl<'a, T: DisplayIndented>(&'a T, Indent);

        impl<'a, T: DisplayIndented> fmt::Display for Impl<'a, T> {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                self.0.fmt_indented(f, self.1)
            }
        }

        Box::new(Impl(self, indent))
    }
}

/// Renders each item on its own line, one nesting level deeper than `indent`.
pub(crate) fn write_nested<T: DisplayIndented>(
    f: &mut fmt::Formatter,
    items: &[T],
    indent: Indent,
) -> fmt::Result {
    for item in items {
        writeln!(f)?;
        item.fmt_indented(f, indent.nested())?;
    }
    Ok(())
}

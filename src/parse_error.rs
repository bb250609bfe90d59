// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2022, tree-sitter authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! Displaying the script line that a parse error was reported at.

#[cfg(feature = "term-colors")]
use colored::Colorize;
use std::path::Path;

/// An excerpt of a single preprocessed script line, underlined in full.
pub struct Excerpt<'a> {
    path: &'a Path,
    source: Option<&'a str>,
    row: usize,
    indent: usize,
}

impl<'a> Excerpt<'a> {
    pub fn from_lines(
        path: &'a Path,
        lines: &'a [String],
        row: usize,
        indent: usize,
    ) -> Excerpt<'a> {
        Excerpt {
            path,
            source: lines.get(row).map(String::as_str),
            row,
            indent,
        }
    }

    fn gutter_width(&self) -> usize {
        ((self.row + 1) as f64).log10() as usize + 1
    }
}

impl<'a> std::fmt::Display for Excerpt<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(
            f,
            "{}{}:{}:",
            " ".repeat(self.indent),
            white_bold(self.path.to_str().unwrap_or("<unknown file>")),
            white_bold(&format!("{}", self.row + 1)),
        )?;
        match self.source {
            Some(source) => {
                writeln!(
                    f,
                    "{}{}{}{}",
                    " ".repeat(self.indent),
                    blue(&format!("{}", self.row + 1)),
                    blue(" | "),
                    source,
                )?;
                writeln!(
                    f,
                    "{}{}{}{}",
                    " ".repeat(self.indent),
                    " ".repeat(self.gutter_width()),
                    blue(" | "),
                    green_bold(&"^".repeat(source.chars().count().max(1))),
                )?;
            }
            None => writeln!(f, "{}<end of script>", " ".repeat(self.indent))?,
        }
        Ok(())
    }
}

// coloring functions

#[cfg(feature = "term-colors")]
fn blue(str: &str) -> impl std::fmt::Display {
    str.blue()
}
#[cfg(not(feature = "term-colors"))]
fn blue<'a>(str: &'a str) -> impl std::fmt::Display + 'a {
    str
}

#[cfg(feature = "term-colors")]
fn green_bold(str: &str) -> impl std::fmt::Display {
    str.green().bold()
}
#[cfg(not(feature = "term-colors"))]
fn green_bold<'a>(str: &'a str) -> impl std::fmt::Display + 'a {
    str
}

#[cfg(feature = "term-colors")]
fn white_bold(str: &str) -> impl std::fmt::Display {
    str.white().bold()
}
#[cfg(not(feature = "term-colors"))]
fn white_bold<'a>(str: &'a str) -> impl std::fmt::Display + 'a {
    str
}

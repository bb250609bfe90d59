// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2021, tree-sitter authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! Turning raw script text into the logical lines the parser consumes.

use crate::argument::normalize;
use crate::argument::QuoteTracker;

/// Normalizes raw script text into clean logical lines.
pub trait Preprocessor {
    fn preprocess(&self, source: &str) -> Vec<String>;
}

/// The default preprocessor.  It drops `//` comments that are not inside string literals,
/// collapses whitespace outside of string literals, and removes blank lines.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinePreprocessor;

impl Preprocessor for LinePreprocessor {
    fn preprocess(&self, source: &str) -> Vec<String> {
        source
            .lines()
            .map(|line| normalize(strip_comment(line)))
            .filter(|line| !line.is_empty())
            .collect()
    }
}

impl<F> Preprocessor for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn preprocess(&self, source: &str) -> Vec<String> {
        self(source)
    }
}

fn strip_comment(line: &str) -> &str {
    let mut quotes = QuoteTracker::default();
    let mut previous = None;
    for (i, ch) in line.char_indices() {
        quotes.observe(ch);
        if ch == '/' && previous == Some('/') && !quotes.quoted() {
            return &line[..i - 1];
        }
        previous = Some(ch);
    }
    line
}

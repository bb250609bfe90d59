// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2021, tree-sitter authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! Sources of fresh identifiers, used when deduplicating the names of a tree.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

/// Produces the next fresh identifier each time it is asked.
pub trait NameSource {
    fn next_name(&mut self) -> String;
}

impl<F> NameSource for F
where
    F: FnMut() -> String,
{
    fn next_name(&mut self) -> String {
        self()
    }
}

const FIRST_CHARACTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const CHARACTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_";

const MAX_ATTEMPTS: usize = 256;

const KEYWORDS: [&str; 28] = [
    "and", "array", "call", "constant", "debug", "else", "elseif", "endfunction", "endglobals",
    "endif", "endloop", "exitwhen", "extends", "false", "function", "globals", "if", "local",
    "loop", "native", "not", "nothing", "null", "or", "return", "returns", "set", "takes",
];

/// Random identifiers that never repeat and never collide with a keyword.
#[derive(Debug)]
pub struct RandomNameSource {
    rng: StdRng,
    length: usize,
    issued: HashSet<String>,
}

impl RandomNameSource {
    pub fn new() -> RandomNameSource {
        RandomNameSource::with_rng(StdRng::from_entropy())
    }

    /// A source that issues the same names on every run.
    pub fn seeded(seed: u64) -> RandomNameSource {
        RandomNameSource::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> RandomNameSource {
        RandomNameSource {
            rng,
            length: 8,
            issued: HashSet::new(),
        }
    }

    pub fn with_length(mut self, length: usize) -> RandomNameSource {
        self.length = length.max(1);
        self
    }

    fn candidate(&mut self) -> String {
        let mut name = String::with_capacity(self.length);
        let first = FIRST_CHARACTERS[self.rng.gen_range(0..FIRST_CHARACTERS.len())];
        name.push(first as char);
        for _ in 1..self.length {
            name.push(CHARACTERS[self.rng.gen_range(0..CHARACTERS.len())] as char);
        }
        name
    }
}

impl Default for RandomNameSource {
    fn default() -> RandomNameSource {
        RandomNameSource::new()
    }
}

impl NameSource for RandomNameSource {
    /// Once names of the current length keep colliding, the names grow one character longer.
    fn next_name(&mut self) -> String {
        loop {
            for _ in 0..MAX_ATTEMPTS {
                let name = self.candidate();
                if !KEYWORDS.contains(&name.as_str()) && self.issued.insert(name.clone()) {
                    return name;
                }
            }
            self.length += 1;
        }
    }
}

/// Always issues the same name.  Mostly useful for predictable output in tests.
#[derive(Clone, Debug)]
pub struct FixedNameSource(pub String);

impl NameSource for FixedNameSource {
    fn next_name(&mut self) -> String {
        self.0.clone()
    }
}

// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2021, tree-sitter authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

use std::path::Path;

use anyhow::anyhow;
use anyhow::Context as _;
use anyhow::Result;
use clap::App;
use clap::Arg;
use clap::ArgMatches;
use jass_tree::ast::Script;
use jass_tree::names::RandomNameSource;
use jass_tree::preprocess::LinePreprocessor;
use jass_tree::preprocess::Preprocessor;
use jass_tree::AnalysisService;
use jass_tree::ExpansionStyle;
use jass_tree::Slice;
use jass_tree::SyntaxTree;

const BUILD_VERSION: &'static str = env!("CARGO_PKG_VERSION");

fn main() -> Result<()> {
    init_log();

    let matches = App::new("jass-tree")
        .version(BUILD_VERSION)
        .about("Merges, obfuscates and slices JASS scripts")
        .arg(Arg::with_name("input").index(1).required(true))
        .arg(
            Arg::with_name("merge")
                .long("merge")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .help("Merge another script into the input"),
        )
        .arg(
            Arg::with_name("isolate-function")
                .long("isolate-function")
                .takes_value(true)
                .conflicts_with("isolate-variable")
                .help("Keep only what the named function depends on"),
        )
        .arg(
            Arg::with_name("isolate-variable")
                .long("isolate-variable")
                .takes_value(true)
                .help("Keep only what the named global variable depends on"),
        )
        .arg(
            Arg::with_name("depth")
                .long("depth")
                .takes_value(true)
                .allow_hyphen_values(true)
                .help("Number of expansion rounds when isolating; negative for no limit"),
        )
        .arg(
            Arg::with_name("style")
                .long("style")
                .takes_value(true)
                .possible_values(&["aggressive", "passive", "inverse"])
                .help("Which function references to follow when isolating"),
        )
        .arg(
            Arg::with_name("scope")
                .long("scope")
                .takes_value(true)
                .help("Print how widely the named global variable is used"),
        )
        .arg(
            Arg::with_name("deduplicate")
                .long("deduplicate")
                .help("Give every global and function except main a random name"),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .takes_value(true)
                .requires("deduplicate")
                .help("Seed for the random names"),
        )
        .arg(Arg::with_name("add-main").long("add-main"))
        .arg(Arg::with_name("postprocess").long("postprocess"))
        .arg(Arg::with_name("formatted").long("formatted"))
        .arg(
            Arg::with_name("json")
                .long("json")
                .help("Print the names of the isolated functions and variables as JSON"),
        )
        .arg(Arg::with_name("output").short("o").long("output").takes_value(true))
        .get_matches();

    let input = Path::new(
        matches
            .value_of("input")
            .ok_or_else(|| anyhow!("No input script"))?,
    );
    let mut tree = read_tree(input)?;
    for path in matches.values_of("merge").into_iter().flatten() {
        let path = Path::new(path);
        let other = read_tree(path)?;
        tree.merge(other)
            .with_context(|| format!("Cannot merge {}", path.display()))?;
    }

    let mut service = AnalysisService::new();
    if let Some(style) = matches.value_of("style") {
        service.set_expansion_style(style.parse::<ExpansionStyle>()?);
    }

    if let Some(name) = matches.value_of("scope") {
        let scope = service.find_variable_scope(&tree, name)?;
        println!("{}: {}", name, scope);
        return Ok(());
    }

    let slice = isolate(&matches, &service, &tree)?;
    if let Some(slice) = slice {
        if matches.is_present("json") {
            slice.display_json()?;
            return Ok(());
        }
        let isolated = SyntaxTree::from_slice(&slice);
        drop(slice);
        tree = isolated;
    }

    if matches.is_present("add-main") {
        tree.add_function_main();
    }
    if matches.is_present("deduplicate") {
        let mut names = match matches.value_of("seed") {
            Some(seed) => RandomNameSource::seeded(
                seed.parse()
                    .with_context(|| format!("Invalid seed {}", seed))?,
            ),
            None => RandomNameSource::new(),
        };
        tree.deduplicate(&mut names)?;
    }
    if matches.is_present("postprocess") {
        tree = tree.postprocess()?;
    }

    let text = if matches.is_present("formatted") {
        tree.to_formatted_string()
    } else {
        tree.to_string()
    };
    match matches.value_of("output") {
        Some(output) => std::fs::write(output, format!("{}\n", text))
            .with_context(|| format!("Cannot write {}", output))?,
        None => println!("{}", text),
    }
    Ok(())
}

fn isolate<'tree>(
    matches: &ArgMatches,
    service: &AnalysisService,
    tree: &'tree SyntaxTree,
) -> Result<Option<Slice<'tree>>> {
    let depth = match matches.value_of("depth") {
        Some(depth) => depth
            .parse::<i32>()
            .with_context(|| format!("Invalid depth {}", depth))?,
        None => -1,
    };
    let slice = if let Some(name) = matches.value_of("isolate-function") {
        service.isolate_function(tree, name, depth)?
    } else if let Some(name) = matches.value_of("isolate-variable") {
        service.isolate_variable(tree, name, depth)?
    } else {
        return Ok(None);
    };
    Ok(Some(slice))
}

fn read_tree(path: &Path) -> Result<SyntaxTree> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read script {}", path.display()))?;
    let lines = LinePreprocessor.preprocess(&source);
    match Script::parse(&lines) {
        Ok(script) => Ok(SyntaxTree::new(script)),
        Err(error) => {
            eprintln!("{}", error.display_excerpt(path, &lines));
            Err(anyhow!("Cannot parse {}", path.display()))
        }
    }
}

fn init_log() {
    let _ = env_logger::builder()
        .format_level(false)
        .format_target(false)
        .format_timestamp(None)
        .try_init();
}

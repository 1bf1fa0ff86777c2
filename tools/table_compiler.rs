/// Table Compiler — compiles a directory of wildcard .txt files into a RON table.
///
/// Usage: table_compiler --input <wildcard_dir> --output <table.ron>
///
/// Each .txt file becomes one table entry keyed by its relative path without
/// extension (cloth/dress-style.txt → "cloth/dress-style"). Lines starting
/// with '#' are comments.
use std::env;
use std::path::Path;
use std::process;

use promptspin::schema::table::WildcardTable;

const USAGE: &str = "Usage: table_compiler --input <wildcard_dir> --output <table.ron>";

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut input = None;
    let mut output = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--input" if i + 1 < args.len() => {
                i += 1;
                input = Some(args[i].clone());
            }
            "--output" if i + 1 < args.len() => {
                i += 1;
                output = Some(args[i].clone());
            }
            "--help" | "-h" => {
                println!("{}", USAGE);
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                eprintln!("{}", USAGE);
                process::exit(1);
            }
        }
        i += 1;
    }

    let input_dir = input.unwrap_or_else(|| {
        eprintln!("Error: --input is required");
        eprintln!("{}", USAGE);
        process::exit(1);
    });

    let output_path = output.unwrap_or_else(|| {
        eprintln!("Error: --output is required");
        eprintln!("{}", USAGE);
        process::exit(1);
    });

    let table = WildcardTable::load_from_dir(Path::new(&input_dir)).unwrap_or_else(|e| {
        eprintln!("Error loading wildcards from '{}': {}", input_dir, e);
        process::exit(1);
    });

    let candidate_count: usize = table
        .names()
        .filter_map(|name| table.get(name).map(|candidates| candidates.len()))
        .sum();
    println!(
        "Loaded {} wildcard entries ({} candidates) from '{}'",
        table.len(),
        candidate_count,
        input_dir
    );

    table.save_to_ron(Path::new(&output_path)).unwrap_or_else(|e| {
        eprintln!("Error writing table to '{}': {}", output_path, e);
        process::exit(1);
    });

    println!("Table written to '{}'", output_path);
}

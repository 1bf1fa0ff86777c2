/// Preview — expands a template a few times against a wildcard table.
///
/// Usage: preview [--wildcards <dir-or-table.ron>] [--seed <n>] [--count <n>] <template>
///
/// The wildcards path may be a directory of .txt files or a compiled .ron
/// table. Each draw uses the seed plus the draw index, so a run is
/// reproducible end to end.
use std::env;
use std::process;

use promptspin::core::pipeline::PromptEngine;

const USAGE: &str =
    "Usage: preview [--wildcards <dir-or-table.ron>] [--seed <n>] [--count <n>] <template>";

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut wildcards = None;
    let mut seed: u64 = 42;
    let mut count: usize = 3;
    let mut template = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--wildcards" if i + 1 < args.len() => {
                i += 1;
                wildcards = Some(args[i].clone());
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or_else(|_| {
                    eprintln!("Error: --seed must be an integer");
                    process::exit(1);
                });
            }
            "--count" if i + 1 < args.len() => {
                i += 1;
                count = args[i].parse().unwrap_or_else(|_| {
                    eprintln!("Error: --count must be an integer");
                    process::exit(1);
                });
            }
            "--help" | "-h" => {
                println!("{}", USAGE);
                process::exit(0);
            }
            other if template.is_none() && !other.starts_with("--") => {
                template = Some(args[i].clone());
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                eprintln!("{}", USAGE);
                process::exit(1);
            }
        }
        i += 1;
    }

    let template = template.unwrap_or_else(|| {
        eprintln!("Error: a template is required");
        eprintln!("{}", USAGE);
        process::exit(1);
    });

    let mut builder = PromptEngine::builder().seed(seed);
    if let Some(ref path) = wildcards {
        builder = if path.ends_with(".ron") {
            builder.wildcards_ron(path)
        } else {
            builder.wildcards_dir(path)
        };
    }

    let mut engine = builder.build().unwrap_or_else(|e| {
        eprintln!("Error building engine: {}", e);
        process::exit(1);
    });

    if let Some(ref path) = wildcards {
        println!("{} wildcard entries loaded from '{}'", engine.table().len(), path);
    }

    for n in 0..count {
        match engine.expand(&template) {
            Ok(result) => println!("{}: {}", n, result),
            Err(e) => {
                eprintln!("Error expanding template: {}", e);
                process::exit(1);
            }
        }
    }
}

//! Simple CLI for driving an in-memory B-tree.
//!
//! Usage:
//!   btree_cli [min_degree] < commands.txt
//!
//! Commands are read from stdin, one per line:
//!   insert <key>...      search <key>       delete <key>...
//!   traverse             stats              tree
//!   debug <key>          bulk_insert <n>    validate
//!   clear
//!
//! Set `RUST_LOG=debug` to see rebalancing events on stderr.

use btree_arena::{BTree, Key, DEFAULT_MIN_DEGREE};
use std::env;
use std::io::{self, BufRead};
use std::process::exit;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let min_degree = match args.get(1) {
        None => DEFAULT_MIN_DEGREE,
        Some(arg) => match arg.parse() {
            Ok(t) => t,
            Err(_) => {
                eprintln!("Usage: btree_cli [min_degree] < commands");
                exit(1);
            }
        },
    };

    let mut tree = match BTree::new(min_degree) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            exit(1);
        }
    };

    let stdin = io::stdin();
    for (line_no, line) in stdin.lock().lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("ERROR: failed to read input: {}", e);
                exit(1);
            }
        };
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, rest)) = words.split_first() else {
            continue;
        };
        if command.starts_with('#') {
            continue;
        }

        if let Err(msg) = run_command(&mut tree, command, rest) {
            eprintln!("ERROR (line {}): {}", line_no + 1, msg);
        }
    }
}

fn parse_keys(args: &[&str]) -> Result<Vec<Key>, String> {
    if args.is_empty() {
        return Err("expected at least one key".to_string());
    }
    args.iter()
        .map(|arg| arg.parse().map_err(|_| format!("invalid key '{}'", arg)))
        .collect()
}

fn parse_key(args: &[&str]) -> Result<Key, String> {
    match parse_keys(args)?.as_slice() {
        [key] => Ok(*key),
        _ => Err("expected exactly one key".to_string()),
    }
}

fn run_command(tree: &mut BTree, command: &str, args: &[&str]) -> Result<(), String> {
    match command {
        "insert" => {
            for key in parse_keys(args)? {
                if tree.insert(key) {
                    println!("INSERTED {}", key);
                } else {
                    println!("DUPLICATE {}", key);
                }
            }
        }

        "search" => {
            let key = parse_key(args)?;
            if tree.contains(key) {
                println!("FOUND {}", key);
            } else {
                println!("NOT_FOUND {}", key);
            }
        }

        "delete" => {
            for key in parse_keys(args)? {
                if tree.delete(key) {
                    println!("DELETED {}", key);
                } else {
                    println!("NOT_FOUND {}", key);
                }
            }
        }

        "traverse" => {
            let keys: Vec<String> = tree.iter().map(|k| k.to_string()).collect();
            println!("{}", keys.join(" "));
        }

        "stats" => {
            let stats = tree.stats();
            println!("key_count: {}", stats.key_count);
            println!("node_count: {}", stats.node_count);
            println!("free_slots: {}", stats.free_slots);
            println!("tree_height: {}", stats.height);
            println!("min_degree: {}", stats.min_degree);
        }

        "tree" => {
            let json = serde_json::to_string_pretty(&tree.export_tree())
                .map_err(|e| format!("failed to encode tree: {}", e))?;
            println!("{}", json);
        }

        "debug" => {
            let key = parse_key(args)?;
            for line in tree.debug_search(key) {
                println!("{}", line);
            }
        }

        "bulk_insert" => {
            let count: Key = match args {
                [n] => n.parse().map_err(|_| "invalid count".to_string())?,
                _ => return Err("usage: bulk_insert <count>".to_string()),
            };

            let start = std::time::Instant::now();
            let inserted = (0..count).filter(|&key| tree.insert(key)).count();
            let elapsed = start.elapsed();

            let ops_per_sec = inserted as f64 / elapsed.as_secs_f64();
            println!("INSERTED: {}", inserted);
            println!("TIME_MS: {}", elapsed.as_millis());
            println!("OPS_PER_SEC: {:.0}", ops_per_sec);
        }

        "validate" => match tree.validate() {
            Ok(()) => println!("VALID"),
            Err(e) => println!("INVALID: {}", e),
        },

        "clear" => {
            tree.clear();
            println!("OK");
        }

        _ => return Err(format!("unknown command '{}'", command)),
    }

    Ok(())
}

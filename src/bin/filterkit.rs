//! filterkit — inspect how a filter compiles
//!
//! # Usage
//!
//! ```bash
//! # Show the builder calls for a filter
//! filterkit '{"age": {"$gte": 18}}'
//!
//! # Full breakdown, as JSON
//! filterkit explain '{"$or": [{"a": 1}, {"b": null}]}' --format json
//!
//! # Read the filter from a file or stdin
//! filterkit --file filter.json
//! cat filter.json | filterkit -
//! ```

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use filterkit::prelude::*;
use serde_json::json;

#[derive(Parser)]
#[command(name = "filterkit")]
#[command(version)]
#[command(about = "Compile $-operator filters into query-builder calls", long_about = None)]
#[command(after_help = "EXAMPLES:
    filterkit '{\"name\": \"ann\", \"age\": {\"$gte\": 18}}'
    filterkit explain '{\"$or\": [{\"a\": 1}, {\"b\": null}]}'
    filterkit relations '{\"author.name\": \"x\"}'")]
struct Cli {
    /// The filter as JSON (`-` reads stdin)
    filter: Option<String>,

    /// Read the filter from a file
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    format: OutputFormat,

    /// Config file (defaults to ./filterkit.toml, then the user config dir)
    #[arg(short, long, env = "FILTERKIT_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the condition tree, relations and builder calls
    Explain {
        /// The filter as JSON (`-` reads stdin)
        filter: Option<String>,
    },
    /// Show the relation paths and relation tree
    Relations {
        /// The filter as JSON (`-` reads stdin)
        filter: Option<String>,
    },
    /// Show the operator reference
    Operators,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "filterkit=debug" } else { "filterkit=warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Some(Commands::Operators) => {
            show_operators();
            Ok(())
        }
        Some(Commands::Explain { filter }) => {
            let query = load_query(filter.as_deref().or(cli.filter.as_deref()), cli)?;
            explain(&query, cli.format)
        }
        Some(Commands::Relations { filter }) => {
            let query = load_query(filter.as_deref().or(cli.filter.as_deref()), cli)?;
            show_relations(&query, cli.format)
        }
        None => {
            if cli.filter.is_none() && cli.file.is_none() {
                println!("{}", "filterkit — $-operator filter compiler".cyan().bold());
                println!();
                println!("Usage: filterkit <FILTER> [OPTIONS]");
                println!();
                println!("Try: filterkit --help");
                return Ok(());
            }
            let query = load_query(cli.filter.as_deref(), cli)?;
            show_calls(&query, cli.format)
        }
    }
}

fn load_query(inline: Option<&str>, cli: &Cli) -> Result<FilterQuery> {
    let config = Config::load(cli.config.as_deref())?;

    let text = match (inline, &cli.file) {
        (Some("-"), _) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read filter from stdin")?;
            buf
        }
        (Some(text), _) => text.to_string(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => {
            anyhow::bail!("No filter given. Pass it inline, with --file, or '-' for stdin")
        }
    };

    if cli.verbose {
        eprintln!("{} {}", "Input:".dimmed(), text.trim().yellow());
    }

    Ok(FilterQuery::parse_with_config(&text, &config)?)
}

fn record(query: &FilterQuery) -> Result<Recorder> {
    let mut recorder = Recorder::new();
    query.apply(&mut recorder)?;
    Ok(recorder)
}

fn show_calls(query: &FilterQuery, format: OutputFormat) -> Result<()> {
    let recorder = record(query)?;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(recorder.calls())?);
        }
        OutputFormat::Table => {
            if recorder.is_empty() {
                println!("{}", "(no conditions)".dimmed());
            } else {
                println!("{}", recorder.to_string().white());
            }
        }
    }
    Ok(())
}

fn show_relations(query: &FilterQuery, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let doc = json!({
                "paths": query.relation_paths(),
                "tree": query.relations(),
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        OutputFormat::Table => {
            println!("{}", "Relation Paths:".green().bold());
            if query.relation_paths().is_empty() {
                println!("  {}", "(none)".dimmed());
            }
            for path in query.relation_paths() {
                println!("  • {}", path.white());
            }
            println!();
            println!("{}", "Relation Tree:".green().bold());
            print_tree(query.relations(), 1);
        }
    }
    Ok(())
}

fn print_tree(tree: &RelationTree, depth: usize) {
    for (segment, child) in tree.iter() {
        let indent = "  ".repeat(depth);
        if child.is_leaf() {
            println!("{}{}", indent, segment.white());
        } else {
            println!("{}{}", indent, format!("{}.", segment).cyan());
            print_tree(child, depth + 1);
        }
    }
}

fn explain(query: &FilterQuery, format: OutputFormat) -> Result<()> {
    let recorder = record(query)?;

    if let OutputFormat::Json = format {
        let doc = json!({
            "filter": query.filter(),
            "conditions": query.conditions(),
            "relations": {
                "paths": query.relation_paths(),
                "tree": query.relations(),
            },
            "calls": recorder.calls(),
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("{}", "filterkit Explanation".cyan().bold());
    println!();
    println!("{} {}", "Filter:".dimmed(), query.filter().to_string().yellow());
    println!();
    println!("{}", "Condition Tree:".green().bold());
    print_node(query.conditions(), 1);
    println!();
    show_relations(query, format)?;
    println!();
    println!("{}", "Builder Calls:".green().bold());
    if recorder.is_empty() {
        println!("  {}", "(no conditions)".dimmed());
    } else {
        println!("  {}", recorder.to_string().white());
    }
    Ok(())
}

fn print_node(node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        Node::Leaf(leaf) => println!("{}{}", indent, leaf.to_string().white()),
        Node::Having(having) => println!("{}{}", indent, having.to_string().magenta()),
        Node::Group(group) => {
            let label = if group.is_or { "OR" } else { "AND" };
            if group.children.is_empty() {
                println!("{}{} {}", indent, label.cyan(), "(empty)".dimmed());
                return;
            }
            println!("{}{}", indent, label.cyan().bold());
            for child in &group.children {
                print_node(child, depth + 1);
            }
        }
    }
}

fn show_operators() {
    println!("{}", "filterkit Operator Reference".cyan().bold());
    println!();

    let operators = [
        ("field: v", "Equality", "where(field, v)"),
        ("field: null", "Null check", "where_null(field)"),
        ("field: [..]", "Membership", "where_in(field, [..])"),
        ("field: {..}", "Scope operators to field", "-"),
        ("$or", "Any of (list or mapping)", "where(|q| q.or_*(..))"),
        ("$not", "Negate everything beneath", "where_not*(..)"),
        ("$gt", "Greater than", "where(field, \">\", v)"),
        ("$gte", "Greater or equal", "where(field, \">=\", v)"),
        ("$lt", "Less than", "where(field, \"<\", v)"),
        ("$lte", "Less or equal", "where(field, \"<=\", v)"),
        ("$like", "Pattern match", "where(field, \"like\", v)"),
        ("$having.col", "Aggregate comparison", "having(col, op, v)"),
    ];

    println!(
        "{:14} {:28} {}",
        "Key".white().bold(),
        "Meaning".white().bold(),
        "Builder Call".white().bold()
    );
    println!("{}", "─".repeat(72).dimmed());

    for (key, meaning, call) in operators {
        println!("{:14} {:28} {}", key.cyan().bold(), meaning.yellow(), call.dimmed());
    }

    println!();
    println!("{}", "Comparison tokens:".dimmed());
    for (symbol, op) in COMPARISON_OPERATORS {
        println!("  {:6} → {}", symbol.cyan(), op.token().white());
    }
}

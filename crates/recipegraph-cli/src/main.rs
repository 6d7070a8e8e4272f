use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use recipegraph_core::{Algorithm, ConfigManager, LoggingConfig, RecipeGraphConfig};
use recipegraph_search::{RecipeTree, SearchContext, SearchReport, SearchRequest};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "recipegraph")]
#[command(about = "RecipeGraph CLI - find and enumerate crafting recipes", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format (json, pretty)
    #[arg(short, long, global = true, default_value = "pretty")]
    output: OutputFormat,

    /// Config file to use instead of the default search locations
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Recipe catalog (JSON) to load
    #[arg(long, global = true, env = "RECIPEGRAPH_DATA")]
    data: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Find recipes for an element
    Search {
        /// Element to craft
        target: String,

        /// Number of recipes to return (0 or less: all of them)
        #[arg(short, long)]
        max: Option<i64>,

        /// BFS, DFS or Bi-BFS
        #[arg(short, long)]
        algorithm: Option<Algorithm>,

        /// Worker threads (0: one per CPU)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Passed through with the request
        #[arg(long)]
        mode: Option<String>,

        /// Also write the JSON report to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Show tier and producing pairs of an element
    Inspect {
        /// Element name
        element: String,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a config file populated with the defaults
    Init {
        /// Destination
        #[arg(default_value = ".recipegraph.toml")]
        path: PathBuf,
    },
}

#[derive(Serialize)]
struct ProducerInfo {
    pair: String,
    tier_valid: bool,
}

#[derive(Serialize)]
struct InspectResult {
    element: String,
    tier: u32,
    base: bool,
    producers: Vec<ProducerInfo>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    if let Commands::Config(ConfigCommands::Init { path }) = &cli.command {
        ConfigManager::create_default_config(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("{} {}", "Wrote".green(), path.display());
        return Ok(());
    }

    let mut config = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging, cli.verbose);
    if let Some(data) = &cli.data {
        config.data.recipes_path = data.clone();
    }

    let context = SearchContext::from_config(&config).with_context(|| {
        format!(
            "Failed to load recipe catalog from {}",
            config.data.recipes_path.display()
        )
    })?;

    match &cli.command {
        Commands::Search {
            target,
            max,
            algorithm,
            workers,
            mode,
            out,
        } => {
            let algorithm = match algorithm {
                Some(algorithm) => *algorithm,
                None => config
                    .search
                    .algorithm()
                    .context("Invalid algorithm in configuration")?,
            };
            let request = SearchRequest {
                target: target.clone(),
                max_recipes: max.unwrap_or(config.search.max_recipes),
                algorithm,
                workers: *workers,
                search_mode: mode.clone(),
            };
            let report = context.search(&request).context("Search failed")?;

            if let Some(out) = out {
                std::fs::write(out, report.to_json_pretty()?)
                    .with_context(|| format!("Failed to write report to {}", out.display()))?;
            }
            match cli.output {
                OutputFormat::Json => println!("{}", report.to_json_pretty()?),
                OutputFormat::Pretty => print_report(&request, &report),
            }
        }
        Commands::Inspect { element } => {
            let index = context.index();
            let name = index
                .resolve(element)
                .with_context(|| format!("Unknown element: {}", element))?;
            let result = InspectResult {
                element: name.to_string(),
                tier: index.tier_of(&name),
                base: index.is_base(&name),
                producers: index
                    .producers_of(&name)
                    .iter()
                    .map(|pair| ProducerInfo {
                        pair: pair.to_string(),
                        tier_valid: index.is_tier_valid(&name, pair),
                    })
                    .collect(),
            };
            match cli.output {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
                OutputFormat::Pretty => print_inspect(&result),
            }
        }
        Commands::Config(_) => {}
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<RecipeGraphConfig> {
    let manager = match path {
        Some(path) => ConfigManager::from_file(path),
        None => ConfigManager::load(),
    }
    .context("Failed to load configuration")?;
    Ok(manager.config().clone())
}

/// Logs go to stderr so a JSON report on stdout stays parseable.
fn init_tracing(logging: &LoggingConfig, verbose: bool) {
    let default_level = if verbose { "debug" } else { logging.level.as_str() };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        "compact" => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init(),
        _ => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .init(),
    }
}

fn print_report(request: &SearchRequest, report: &SearchReport) {
    if report.recipes.is_empty() {
        println!(
            "{} {}",
            "No recipe found for".red(),
            request.target.bold()
        );
    }
    for (i, tree) in report.recipes.iter().enumerate() {
        println!(
            "\n{}{} {}",
            "Recipe ".cyan(),
            (i + 1).to_string().yellow(),
            format!(
                "({} nodes, depth {})",
                tree.node_count(),
                tree.height()
            )
            .dimmed()
        );
        print_tree(tree, "", true, true);
    }
    println!();
    println!("{}: {}", "algorithm".cyan().bold(), request.algorithm.to_string().green());
    println!("{}: {}", "timetaken".cyan().bold(), report.timetaken.green());
    println!(
        "{}: {}",
        "node_visited".cyan().bold(),
        report.node_visited.to_string().yellow()
    );
}

fn print_tree(tree: &RecipeTree, prefix: &str, last: bool, root: bool) {
    let name = if tree.is_leaf() {
        tree.name.normal()
    } else {
        tree.name.bold()
    };
    if root {
        println!("{}", name);
    } else {
        println!("{}{} {}", prefix, if last { "└─" } else { "├─" }, name);
    }

    let child_prefix = if root {
        String::new()
    } else {
        format!("{}{}", prefix, if last { "   " } else { "│  " })
    };
    let count = tree.children.len();
    for (i, child) in tree.children.iter().enumerate() {
        print_tree(child, &child_prefix, i + 1 == count, false);
    }
}

fn print_inspect(result: &InspectResult) {
    println!("{}: {}", "element".cyan().bold(), result.element.green());
    println!("{}: {}", "tier".cyan().bold(), result.tier.to_string().yellow());
    if result.base {
        println!("{}", "base element".green());
        return;
    }
    for producer in &result.producers {
        let marker = if producer.tier_valid {
            "ok".green()
        } else {
            "tier mismatch".red()
        };
        println!("  {} [{}]", producer.pair, marker);
    }
}

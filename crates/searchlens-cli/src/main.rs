use std::env;
use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use searchlens_cli::{GoogleSearchProvider, SearchSession};
use searchlens_core::GraphState;

const APP_NAME: &str = "searchlens";
const VERSION: &str = env!("CARGO_PKG_VERSION");

struct CliOptions {
    query: String,
    expand: u32,
    json: bool,
    save_target: Option<PathBuf>,
}

enum CliCommand {
    Run(CliOptions),
    Help,
    Version,
}

fn parse_arguments(args: &[String]) -> Result<CliCommand> {
    if args.is_empty() {
        return Ok(CliCommand::Help);
    }

    let mut query_words: Vec<String> = Vec::new();
    let mut expand = 0u32;
    let mut json = false;
    let mut save_target: Option<PathBuf> = None;
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        if matches!(arg.as_str(), "-h" | "--help") {
            return Ok(CliCommand::Help);
        }

        if matches!(arg.as_str(), "-v" | "--version") {
            return Ok(CliCommand::Version);
        }

        if matches!(arg.as_str(), "-j" | "--json") {
            json = true;
            i += 1;
            continue;
        }

        if matches!(arg.as_str(), "-e" | "--expand") {
            let value = args
                .get(i + 1)
                .ok_or_else(|| anyhow!("{arg} requires a round count"))?;
            expand = value
                .parse()
                .map_err(|_| anyhow!("invalid round count: {value}"))?;
            i += 2;
            continue;
        }

        if arg.starts_with("--save=") {
            if save_target.is_some() {
                return Err(anyhow!("--save specified multiple times"));
            }
            let value = &arg["--save=".len()..];
            let path = if value.is_empty() {
                PathBuf::from(".")
            } else {
                PathBuf::from(value)
            };
            save_target = Some(path);
            i += 1;
            continue;
        }

        if matches!(arg.as_str(), "-s" | "--save") {
            if save_target.is_some() {
                return Err(anyhow!("--save specified multiple times"));
            }
            let next_is_path = args
                .get(i + 1)
                .map(|next| !next.starts_with('-'))
                .unwrap_or(false);

            if next_is_path && !query_words.is_empty() {
                save_target = Some(PathBuf::from(args[i + 1].clone()));
                i += 2;
            } else {
                save_target = Some(PathBuf::from("."));
                i += 1;
            }

            continue;
        }

        if arg.starts_with('-') {
            return Err(anyhow!("unknown flag: {arg}"));
        }

        query_words.push(arg.clone());
        i += 1;
    }

    if query_words.is_empty() {
        return Err(anyhow!("missing <query> argument"));
    }

    Ok(CliCommand::Run(CliOptions {
        query: query_words.join(" "),
        expand,
        json,
        save_target,
    }))
}

fn print_help() {
    println!("{APP_NAME} — explore search results as an expanding graph");
    println!("Usage: {APP_NAME} [OPTIONS] <QUERY>...\n");
    println!("Options:");
    println!("  -e, --expand N      Expansion rounds after the root search (default 0)");
    println!("  -j, --json          Print the merged graph as JSON");
    println!("  -s, --save [PATH]   Save output to a file");
    println!("  -v, --version       Show version information");
    println!("  -h, --help          Show this help message");
    println!();
    println!("Environment:");
    println!("  SEARCHLENS_API_KEY     Search API key (required)");
    println!("  SEARCHLENS_ENGINE_ID   Search engine id (required)");
    println!("  SEARCHLENS_SEARCH_URL  Endpoint override (optional)");
}

fn print_version() {
    println!("{APP_NAME} {VERSION}");
}

/// Nodes grouped by depth tier, then the surviving links.
fn render_text(graph: &GraphState) -> String {
    let mut output = String::new();
    let max_depth = graph.nodes.iter().map(|n| n.depth).max().unwrap_or(0);

    for depth in 0..=max_depth {
        let tier: Vec<_> = graph.nodes.iter().filter(|n| n.depth == depth).collect();
        if tier.is_empty() {
            continue;
        }
        let _ = writeln!(output, "depth {depth} ({} nodes)", tier.len());
        for node in tier {
            let _ = writeln!(output, "  [{}] {}", node.id, node.title);
            let _ = writeln!(output, "      {}", node.link);
            if !node.keywords.is_empty() {
                let _ = writeln!(output, "      keywords: {}", node.keywords.join(", "));
            }
        }
    }

    let _ = writeln!(output, "{} links", graph.links.len());
    for link in &graph.links {
        let _ = writeln!(output, "  {} -- {}", link.source, link.target);
    }

    output
}

fn resolve_save_path(target: PathBuf, json: bool) -> PathBuf {
    let default_name = if json { "graph.json" } else { "graph.txt" };
    if target.is_dir() {
        target.join(default_name)
    } else {
        target
    }
}

async fn run(options: CliOptions) -> Result<()> {
    let provider = GoogleSearchProvider::from_env()?;
    let mut session = SearchSession::new(provider);

    session.submit_query(&options.query).await?;

    for round in 0..options.expand {
        // Walk deeper by expanding the most recently merged node that
        // still carries keywords to re-query with.
        let target = session
            .graph()
            .nodes
            .iter()
            .rev()
            .find(|node| !node.keywords.is_empty())
            .map(|node| node.id.clone());

        let Some(target) = target else {
            log::warn!("no expandable node left after round {round}");
            break;
        };

        if let Err(err) = session.expand_node(&target).await {
            log::warn!("expansion round {} stopped: {err:#}", round + 1);
            break;
        }
    }

    let output = if options.json {
        let mut json = serde_json::to_string_pretty(session.graph())?;
        json.push('\n');
        json
    } else {
        render_text(session.graph())
    };

    match options.save_target {
        Some(target) => {
            let path = resolve_save_path(target, options.json);
            fs::write(&path, &output)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("saved graph to {}", path.display());
        }
        None => print!("{output}"),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let raw_args = env::args().skip(1).collect::<Vec<_>>();
    match parse_arguments(&raw_args)? {
        CliCommand::Help => print_help(),
        CliCommand::Version => print_version(),
        CliCommand::Run(options) => run(options).await?,
    }

    Ok(())
}

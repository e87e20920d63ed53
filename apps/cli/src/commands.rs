//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use roamgraph_core::{Sidebar, diagram_for, render_block_graph};
use roamgraph_outline::{JsonOutline, UuidGenerator};
use roamgraph_shared::{AppConfig, RenderConfig, init_config, init_config_at, load_config, load_config_from};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// roamgraph — dependency flowcharts from outline blocks.
#[derive(Parser)]
#[command(
    name = "roamgraph",
    version,
    about = "Render the Depends On:: graph of an outline block as a Mermaid flowchart.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.roamgraph/roamgraph.toml).
    #[arg(long, env = "ROAMGRAPH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Render the graph of a block, store it under the block and print it.
    Render {
        /// Root block uid.
        uid: String,

        /// Outline export to read and update.
        #[arg(short, long)]
        outline: Option<PathBuf>,

        /// Graph name used in node links.
        #[arg(short, long)]
        graph: Option<String>,

        /// Print the diagram but leave the outline file untouched.
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the dependency graph of a block as JSON.
    Graph {
        /// Root block uid.
        uid: String,

        /// Outline export to read.
        #[arg(short, long)]
        outline: Option<PathBuf>,
    },

    /// Print the Mermaid diagram of a block without storing it.
    Diagram {
        /// Root block uid.
        uid: String,

        /// Outline export to read.
        #[arg(short, long)]
        outline: Option<PathBuf>,

        /// Graph name used in node links.
        #[arg(short, long)]
        graph: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr; stdout carries
/// command output.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "roamgraph=info",
        1 => "roamgraph=debug",
        _ => "roamgraph=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config;
    match cli.command {
        Command::Render {
            uid,
            outline,
            graph,
            dry_run,
        } => cmd_render(
            config_path.as_deref(),
            &uid,
            outline.as_deref(),
            graph.as_deref(),
            dry_run,
        ),
        Command::Graph { uid, outline } => {
            cmd_graph(config_path.as_deref(), &uid, outline.as_deref())
        }
        Command::Diagram {
            uid,
            outline,
            graph,
        } => cmd_diagram(config_path.as_deref(), &uid, outline.as_deref(), graph.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(config_path.as_deref()),
            ConfigAction::Show => cmd_config_show(config_path.as_deref()),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_render(
    config_path: Option<&Path>,
    uid: &str,
    outline: Option<&Path>,
    graph: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let config = load(config_path)?;
    let render_config = resolve_render_config(&config, graph)?;
    let outline_path = resolve_outline_path(&config, outline);

    info!(uid, outline = %outline_path.display(), dry_run, "rendering block graph");

    let mut store = JsonOutline::open(&outline_path)?;
    let report = render_block_graph(
        &mut store,
        &UuidGenerator,
        &StdoutSidebar,
        &render_config,
        uid,
    )?;

    if !report.opened_in_sidebar {
        println!("{}", report.markup);
    }

    if dry_run {
        info!("dry run, outline not written");
    } else if store.is_dirty() {
        store.save()?;
    }

    eprintln!();
    eprintln!("  Graph rendered!");
    eprintln!("  Root:    {}", report.root_uid);
    eprintln!("  Nodes:   {}", report.node_count);
    eprintln!("  Block:   {}", report.mermaid_uid);
    eprintln!(
        "  Stored:  {}",
        if dry_run {
            "no (dry run)"
        } else if report.created {
            "created"
        } else {
            "updated"
        }
    );
    eprintln!("  Time:    {:.1}ms", report.elapsed.as_secs_f64() * 1000.0);
    eprintln!();

    Ok(())
}

fn cmd_graph(config_path: Option<&Path>, uid: &str, outline: Option<&Path>) -> Result<()> {
    let config = load(config_path)?;
    let store = JsonOutline::open(&resolve_outline_path(&config, outline))?;
    let render_config = resolve_render_config(&config, None)?;

    let (nodes, _) = diagram_for(&store, &UuidGenerator, &render_config, uid)?;
    println!("{}", serde_json::to_string_pretty(&nodes)?);
    Ok(())
}

fn cmd_diagram(
    config_path: Option<&Path>,
    uid: &str,
    outline: Option<&Path>,
    graph: Option<&str>,
) -> Result<()> {
    let config = load(config_path)?;
    let store = JsonOutline::open(&resolve_outline_path(&config, outline))?;
    let render_config = resolve_render_config(&config, graph)?;

    let (_, markup) = diagram_for(&store, &UuidGenerator, &render_config, uid)?;
    println!("{markup}");
    Ok(())
}

fn cmd_config_init(config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(path) => init_config_at(path)?,
        None => init_config()?,
    };
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config: AppConfig = load(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => {
            if !path.exists() {
                return Err(eyre!("config file '{}' does not exist", path.display()));
            }
            load_config_from(path)?
        }
        None => load_config()?,
    };
    Ok(config)
}

fn resolve_render_config(config: &AppConfig, graph: Option<&str>) -> Result<RenderConfig> {
    let render = RenderConfig::from_app(config)?;
    Ok(match graph {
        Some(name) => render.with_graph_name(name)?,
        None => render,
    })
}

fn resolve_outline_path(config: &AppConfig, outline: Option<&Path>) -> PathBuf {
    outline
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.graph.outline))
}

/// Terminal stand-in for the sidebar: the diagram goes to stdout.
struct StdoutSidebar;

impl Sidebar for StdoutSidebar {
    fn window_count(&self) -> usize {
        0
    }

    fn add_block_window(&self, _block_uid: &str, markup: &str) {
        println!("{markup}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_args_parse() {
        let cli = Cli::try_parse_from([
            "roamgraph", "-vv", "render", "uid1", "--outline", "export.json", "--graph", "work",
            "--dry-run",
        ])
        .expect("parse");
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Render {
                uid,
                outline,
                graph,
                dry_run,
            } => {
                assert_eq!(uid, "uid1");
                assert_eq!(outline, Some(PathBuf::from("export.json")));
                assert_eq!(graph.as_deref(), Some("work"));
                assert!(dry_run);
            }
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn flags_override_config() {
        let mut config = AppConfig::default();
        config.graph.name = "from-file".into();
        config.graph.outline = "file.json".into();

        let render = resolve_render_config(&config, Some("from-flag")).expect("render config");
        assert_eq!(render.graph_name, "from-flag");
        let render = resolve_render_config(&config, None).expect("render config");
        assert_eq!(render.graph_name, "from-file");

        assert_eq!(
            resolve_outline_path(&config, Some(Path::new("flag.json"))),
            PathBuf::from("flag.json")
        );
        assert_eq!(resolve_outline_path(&config, None), PathBuf::from("file.json"));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = load(Some(Path::new("/definitely/not/here/roamgraph.toml"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}

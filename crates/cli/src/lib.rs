//! CLI for AstroBenchmarks.
//!
//! This crate provides the `astrobench` command: building the leaderboard
//! site, inspecting and linting the results tree, and scaffolding new
//! submissions.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

use anyhow::{bail, Context, Result};
use astrobench_adapters::plot_renderer;
use astrobench_benchmarks::check::{check_repository, has_errors, Severity};
use astrobench_benchmarks::html::display_value;
use astrobench_benchmarks::meta::discover_benchmarks;
use astrobench_benchmarks::plot::NoPlots;
use astrobench_benchmarks::scaffold::scaffold_result;
use astrobench_benchmarks::{build_and_write, build_leaderboard, Catalogue, OutputFormat};
use astrobench_core::telemetry::init_tracing;
use astrobench_core::{Layout, ResultLocation, Settings};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};

/// AstroBenchmarks CLI.
#[derive(Parser, Debug)]
#[command(name = "astrobench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Repository root.
    #[arg(long, global = true, env = "ASTROBENCH_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Verbose (debug) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit JSON-formatted log lines.
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Discover results, rank them and write the leaderboard site.
    ///
    /// Writes to the output directory (default `html/`):
    /// - index.html - The leaderboard page, plus the logo
    /// - summary.md - Markdown summary
    /// - leaderboard.json - The compiled leaderboard
    Build {
        /// Output directory override.
        #[arg(short, long, env = "ASTROBENCH_OUTPUT")]
        output: Option<PathBuf>,

        /// What to write.
        #[arg(short, long, value_enum, default_value_t = Format::All)]
        format: Format,

        /// Skip plot hooks.
        #[arg(long)]
        no_plots: bool,

        /// Python interpreter for plot hooks.
        #[arg(long, env = "ASTROBENCH_PYTHON")]
        python: Option<String>,
    },

    /// Show the resolved layout and result totals.
    Status {
        /// Show per-benchmark details.
        #[arg(short, long)]
        detailed: bool,
    },

    /// List benchmarks and their ranked results.
    List,

    /// Lint the results tree.
    ///
    /// Exits non-zero when any error-level issue is found.
    Check,

    /// Create a result.json skeleton from a benchmark's template.
    NewResult {
        /// Code name (first directory level under results/).
        #[arg(long)]
        code: String,

        /// Machine name.
        #[arg(long)]
        machine: String,

        /// Benchmark id.
        #[arg(long)]
        benchmark: String,

        /// Commit of the code that produced the result.
        #[arg(long)]
        commit: String,

        /// Overwrite an existing result.json.
        #[arg(long)]
        force: bool,
    },
}

/// Output selection for `build`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// index.html and the logo
    Html,
    /// summary.md
    Markdown,
    /// leaderboard.json
    Json,
    /// Everything
    All,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Html => OutputFormat::Html,
            Format::Markdown => OutputFormat::Markdown,
            Format::Json => OutputFormat::Json,
            Format::All => OutputFormat::All,
        }
    }
}

/// Repository settings and layout resolved for one invocation.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Settings from `astrobench.toml`, or defaults
    pub settings: Settings,
    /// Resolved paths
    pub layout: Layout,
}

impl Workspace {
    /// Load settings under `root` and resolve the layout.
    pub fn open(root: &Path) -> Result<Self> {
        let settings = Settings::load(root)
            .with_context(|| format!("Failed to load settings from {}", root.display()))?;
        let layout = settings.layout(root);
        debug!(root = %root.display(), html = %layout.html_dir.display(), "resolved layout");
        Ok(Self { settings, layout })
    }

    fn catalogue(&self) -> Result<Catalogue> {
        discover_benchmarks(&self.layout).context("Failed to read benchmark definitions")
    }
}

/// Whether plot hooks run and with which interpreter.
///
/// Flags win over `astrobench.toml`.
pub fn plot_options(settings: &Settings, no_plots: bool, python: Option<String>) -> (bool, String) {
    let enabled = settings.plots && !no_plots;
    let python = python.unwrap_or_else(|| settings.python.clone());
    (enabled, python)
}

/// Run the CLI with the process arguments.
///
/// # Returns
///
/// Returns `Ok(())` on success, or an error if the command fails.
pub fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    init_tracing(cli.json_logs, level);
    execute(cli)
}

/// Execute a parsed command.
pub fn execute(cli: Cli) -> Result<()> {
    let workspace = Workspace::open(&cli.root)?;

    match cli.command {
        Commands::Build {
            output,
            format,
            no_plots,
            python,
        } => build(workspace, output, format, no_plots, python),
        Commands::Status { detailed } => status(&workspace, detailed),
        Commands::List => list(&workspace),
        Commands::Check => check(&workspace),
        Commands::NewResult {
            code,
            machine,
            benchmark,
            commit,
            force,
        } => {
            let location = ResultLocation::new(code, machine, benchmark, commit)?;
            new_result(&workspace, &location, force)
        }
    }
}

fn build(
    workspace: Workspace,
    output: Option<PathBuf>,
    format: Format,
    no_plots: bool,
    python: Option<String>,
) -> Result<()> {
    let Workspace { settings, mut layout } = workspace;
    if let Some(dir) = output {
        layout = layout.with_html_dir(dir);
    }

    let (plots, python) = plot_options(&settings, no_plots, python);
    info!(plots, python = %python, "building leaderboard");
    let renderer = plot_renderer(plots, &python);

    let (board, written) = build_and_write(
        &layout,
        &settings,
        renderer.as_ref(),
        format.into(),
        Utc::now(),
    )
    .context("Failed to build leaderboard")?;

    println!(
        "{} {} results across {} benchmarks",
        "Ranked".green().bold(),
        board.stats.results,
        board.stats.benchmarks
    );
    for path in &written {
        println!("  - {}", layout.relative(path));
    }
    Ok(())
}

fn status(workspace: &Workspace, detailed: bool) -> Result<()> {
    let layout = &workspace.layout;
    let catalogue = workspace.catalogue()?;
    let board = build_leaderboard(layout, &NoPlots).context("Failed to read results")?;
    let stats = &board.stats;

    println!("{}", workspace.settings.site_title.bold());
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!("Root: {}", layout.root.display());
    println!("Benchmarks defined: {}", catalogue.len());
    println!("Benchmarks with results: {}", stats.benchmarks);
    println!("Results: {}", stats.results);
    println!("Codes: {}", stats.codes.len());
    println!("Machines: {}", stats.machines.len());
    println!("Last result: {}", stats.last_result_display());

    if detailed {
        println!("\nDirectories:");
        println!("  - results: {}", layout.relative(&layout.results_dir));
        println!("  - benchmarks: {}", layout.relative(&layout.benchmarks_dir));
        println!("  - output: {}", layout.relative(&layout.html_dir));
        println!("  - logo: {}", layout.relative(&layout.logo));
        println!("\nPer benchmark:");
        for (id, meta) in &catalogue {
            let results = board
                .boards
                .iter()
                .find(|b| &b.meta.id == id)
                .map_or(0, |b| b.rows.len());
            println!("  - {id}: {results} results ({})", meta.name);
        }
    }
    Ok(())
}

fn list(workspace: &Workspace) -> Result<()> {
    let catalogue = workspace.catalogue()?;
    let board = build_leaderboard(&workspace.layout, &NoPlots).context("Failed to read results")?;

    if catalogue.is_empty() {
        println!("No benchmarks found.");
    }
    for (id, meta) in &catalogue {
        let ranking = match meta.ranking_key() {
            Some(key) => format!("ranked by {key} {}", if meta.sort_dir.is_asc() { "asc" } else { "desc" }),
            None => "unranked".to_string(),
        };
        let tags = if meta.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", meta.tags.join(", "))
        };
        println!("{} - {} ({ranking}){tags}", id.bold(), meta.name);

        let Some(b) = board.boards.iter().find(|b| &b.meta.id == id) else {
            println!("  no results");
            continue;
        };
        let key = meta.ranking_key();
        for row in &b.rows {
            let r = &row.record;
            let value = key
                .map(|k| format!("  {k}={}", display_value(r.field(k))))
                .unwrap_or_default();
            println!("  {:>3}. {}/{} @ {}{value}", row.rank, r.code, r.machine, r.commit);
        }
    }

    for b in board.boards.iter().filter(|b| !catalogue.contains_key(&b.meta.id)) {
        println!("{} - results for an unknown benchmark ({})", b.meta.id.bold(), b.rows.len());
    }
    Ok(())
}

fn check(workspace: &Workspace) -> Result<()> {
    let catalogue = workspace.catalogue()?;
    let issues = check_repository(&workspace.layout, &catalogue).context("Failed to scan results")?;

    for issue in &issues {
        let severity = match issue.severity {
            Severity::Error => issue.severity.to_string().red().bold(),
            Severity::Warning => issue.severity.to_string().yellow(),
        };
        println!("{severity}: {}: {}", issue.path, issue.message);
    }

    let errors = issues.iter().filter(|i| i.severity == Severity::Error).count();
    let warnings = issues.len() - errors;
    if has_errors(&issues) {
        bail!("{errors} error(s), {warnings} warning(s)");
    }
    println!("{} {warnings} warning(s)", "OK".green().bold());
    Ok(())
}

fn new_result(workspace: &Workspace, location: &ResultLocation, force: bool) -> Result<()> {
    let catalogue = workspace.catalogue()?;
    let Some(meta) = catalogue.get(&location.benchmark) else {
        let known: Vec<&str> = catalogue.keys().map(String::as_str).collect();
        bail!(
            "unknown benchmark {:?}, known benchmarks: {}",
            location.benchmark,
            known.join(", ")
        );
    };

    let path = scaffold_result(&workspace.layout, meta, location, Utc::now(), force)?;
    println!("{} {}", "Created".green().bold(), workspace.layout.relative(&path));
    println!("Fill in the values, then run `astrobench check`.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build() {
        let cli = Cli::try_parse_from([
            "astrobench",
            "build",
            "--output",
            "public",
            "--format",
            "markdown",
            "--no-plots",
        ])
        .unwrap();

        match cli.command {
            Commands::Build {
                output,
                format,
                no_plots,
                python,
            } => {
                assert_eq!(output, Some(PathBuf::from("public")));
                assert_eq!(format, Format::Markdown);
                assert!(no_plots);
                assert_eq!(python, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["astrobench", "status", "--root", "/srv/repo", "-v", "--json-logs"])
                .unwrap();
        assert_eq!(cli.root, PathBuf::from("/srv/repo"));
        assert!(cli.verbose);
        assert!(cli.json_logs);
        assert!(matches!(cli.command, Commands::Status { detailed: false }));
    }

    #[test]
    fn test_parse_new_result() {
        let cli = Cli::try_parse_from([
            "astrobench",
            "new-result",
            "--code",
            "athena",
            "--machine",
            "laptop",
            "--benchmark",
            "sod",
            "--commit",
            "abc123",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::NewResult { ref code, force: false, .. } if code == "athena"
        ));
    }

    #[test]
    fn test_new_result_requires_all_coordinates() {
        assert!(Cli::try_parse_from(["astrobench", "new-result", "--code", "athena"]).is_err());
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["astrobench", "build", "--format", "pdf"]).is_err());
    }

    #[test]
    fn test_format_maps_to_output_format() {
        assert_eq!(OutputFormat::from(Format::All), OutputFormat::All);
        assert_eq!(OutputFormat::from(Format::Json), OutputFormat::Json);
    }

    #[test]
    fn test_plot_options_precedence() {
        let mut settings = Settings::default();
        assert_eq!(plot_options(&settings, false, None), (true, "python3".to_string()));
        assert_eq!(
            plot_options(&settings, false, Some("/opt/py/bin/python".into())),
            (true, "/opt/py/bin/python".to_string())
        );
        assert!(!plot_options(&settings, true, None).0);

        settings.plots = false;
        settings.python = "python3.12".into();
        assert_eq!(plot_options(&settings, false, None), (false, "python3.12".to_string()));
    }
}

#![forbid(unsafe_code)]

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use ferrule_config::Lockfile;
use ferrule_engine::{
    load_configuration, ArtifactDependencyResolver, LockfileResolvedConfiguration,
    LockfileResolver, Predicate, ResolvedArtifact, ResolvedConfiguration, ResolvedDependency,
    SatisfiesAll, SelfResolvedConfiguration, SelfResolvingDependencyResolver,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

type CliResult = Result<(), Box<dyn Error>>;

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "FERRULE_LOG";

#[derive(Debug, Parser)]
#[command(name = "ferrule", about = "Resolve the files of a project configuration")]
#[command(version)]
struct Cli {
    /// Log resolution steps to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
    /// Local module repository (defaults to ~/.ferrule/repository)
    #[arg(long, global = true)]
    repository: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the files of a configuration, self-resolved files first
    Files {
        /// Configuration to resolve
        #[arg(long, short = 'c', default_value = "compile")]
        configuration: String,
        /// Resolve without transitive dependencies
        #[arg(long)]
        intransitive: bool,
        /// Only include module artifacts with this extension
        #[arg(long)]
        extension: Option<String>,
        /// Print JSON instead of one path per line
        #[arg(long)]
        json: bool,
    },
    /// Show the first-level module dependencies as a tree
    Deps {
        /// Configuration to resolve
        #[arg(long, short = 'c', default_value = "compile")]
        configuration: String,
        /// Print JSON instead of a tree
        #[arg(long)]
        json: bool,
    },
    /// List every resolved module artifact
    Artifacts {
        /// Configuration to resolve
        #[arg(long, short = 'c', default_value = "compile")]
        configuration: String,
        /// Print JSON instead of one artifact per line
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = project_root().and_then(|root| {
        let repository = match cli.repository {
            Some(path) => path,
            None => ferrule_util::fs::default_repository()?,
        };
        run(&root, &repository, cli.command)
    });

    if let Err(msg) = result {
        eprintln!("error: {msg}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Find the project root by looking for `ferrule.toml` in the current directory.
fn project_root() -> Result<PathBuf, Box<dyn Error>> {
    let cwd = std::env::current_dir()?;
    if !cwd.join(ferrule_engine::project::MANIFEST_FILE).exists() {
        return Err("no ferrule.toml found in current directory".into());
    }
    Ok(cwd)
}

fn run(root: &Path, repository: &Path, command: Command) -> CliResult {
    let output = match command {
        Command::Files {
            configuration,
            intransitive,
            extension,
            json,
        } => {
            let resolved = resolve(root, repository, &configuration, intransitive)?;
            let files: Vec<PathBuf> = match extension {
                Some(ext) => {
                    let spec = Predicate(move |a: &ResolvedArtifact| a.extension == ext);
                    resolved.files(&spec)?
                }
                None => resolved.files(&SatisfiesAll)?,
            }
            .into_iter()
            .collect();
            if json {
                serde_json::to_string_pretty(&files)?
            } else {
                render_lines(files.iter().map(|f| f.display()))
            }
        }
        Command::Deps {
            configuration,
            json,
        } => {
            let resolved = resolve(root, repository, &configuration, false)?;
            let deps: Vec<ResolvedDependency> =
                resolved.first_level_module_dependencies()?.into_iter().collect();
            if json {
                serde_json::to_string_pretty(&deps)?
            } else {
                render_tree(&deps)
            }
        }
        Command::Artifacts {
            configuration,
            json,
        } => {
            let resolved = resolve(root, repository, &configuration, false)?;
            let artifacts: Vec<ResolvedArtifact> =
                resolved.resolved_artifacts()?.into_iter().collect();
            if json {
                serde_json::to_string_pretty(&artifacts)?
            } else {
                render_lines(
                    artifacts
                        .iter()
                        .map(|a| format!("{a} {}", a.file.display())),
                )
            }
        }
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

/// Load a configuration and resolve it against the project's lockfile.
fn resolve(
    root: &Path,
    repository: &Path,
    configuration: &str,
    intransitive: bool,
) -> Result<SelfResolvedConfiguration<LockfileResolvedConfiguration>, Box<dyn Error>> {
    debug!(root = %root.display(), configuration, intransitive, "loading configuration");
    let config = load_configuration(root, configuration)?;
    if intransitive {
        config.set_transitive(false);
    }
    let lockfile = Lockfile::from_path(&root.join("ferrule.lock"))?;
    let resolver = SelfResolvingDependencyResolver::new(LockfileResolver::new(lockfile, repository));
    Ok(resolver.resolve(&config)?)
}

fn render_lines<T: std::fmt::Display>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join("\n")
}

fn render_tree(deps: &[ResolvedDependency]) -> String {
    let mut out = String::new();
    for dep in deps {
        render_node(dep, 0, &mut out);
    }
    out.trim_end().to_owned()
}

fn render_node(dep: &ResolvedDependency, depth: usize, out: &mut String) {
    out.push_str(&format!("{}{}\n", "    ".repeat(depth), dep.module));
    for child in &dep.children {
        render_node(child, depth + 1, out);
    }
}

mod board;
mod config;
mod script;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gitflow_core::{FlowEngine, IdSource, SequentialIds, UuidIds};
use graph::{column_order, compute_connectors, AnchorTable};
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};

use crate::config::AppConfig;
use crate::script::{parse_script, Step};

const DEMO_SCRIPT: &str = "\
# feature round trip
feature
commit feature/1
merge feature/1

# production fix
hotfix
release hotfix/1

# release candidate with one QA fix
rc
qa-fix
commit qa-fix/1
qa-merge qa-fix/1
release rc/1

bugfix
merge bugfix/1
delete feature/1
";

#[derive(Parser)]
#[command(name = "gitflow")]
#[command(about = "Git-flow branching diagrams", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Print the snapshot and connectors as JSON
    #[arg(long, global = true)]
    json: bool,
    /// Use random ids instead of n1, n2, ...
    #[arg(long, global = true)]
    random_ids: bool,
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the built-in demo flow
    Demo,
    /// Play a script file
    Run {
        /// Script with one operation per line
        script: PathBuf,
        /// Log rejected operations and continue
        #[arg(short, long)]
        keep_going: bool,
    },
    /// List branches with the operations they offer
    Branches {
        /// Script to play first
        script: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load(cli.config.as_deref())?;
    let ids: Box<dyn IdSource> = if cli.random_ids {
        Box::new(UuidIds)
    } else {
        Box::new(SequentialIds::new("n"))
    };
    let mut engine = FlowEngine::new(ids, Box::new(config.flow.clone()));

    match cli.command {
        Commands::Demo => {
            let steps = parse_script(DEMO_SCRIPT)?;
            play(&mut engine, &steps, false)?;
            show(&engine, &config, cli.json)?;
        }
        Commands::Run { script, keep_going } => {
            let steps = read_script(&script)?;
            play(&mut engine, &steps, keep_going)?;
            show(&engine, &config, cli.json)?;
        }
        Commands::Branches { script } => {
            if let Some(script) = script {
                let steps = read_script(&script)?;
                play(&mut engine, &steps, false)?;
            }
            let project = engine.snapshot();
            for branch in column_order(&project) {
                let ops: Vec<String> = branch
                    .available_operations()
                    .iter()
                    .map(|op| op.to_string())
                    .collect();
                let state = if branch.merged { "merged" } else { "open" };
                println!("{:<12} {:<18} {:<7} {}", branch.name, branch.kind, state, ops.join(", "));
            }
        }
    }

    Ok(())
}

fn read_script(path: &Path) -> Result<Vec<(usize, Step)>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_script(&text).with_context(|| format!("in {}", path.display()))
}

fn play(engine: &mut FlowEngine, steps: &[(usize, Step)], keep_going: bool) -> Result<()> {
    for (line, step) in steps {
        let outcome = step
            .resolve(&engine.snapshot())
            .map_err(anyhow::Error::from)
            .and_then(|op| engine.apply(&op).map_err(anyhow::Error::from));
        match outcome {
            Ok(_) => {}
            Err(err) if keep_going => warn!(line, error = %err, "step skipped"),
            Err(err) => return Err(err.context(format!("line {}", line))),
        }
    }
    let project = engine.snapshot();
    info!(branches = project.branches.len(), commits = project.commits.len(), "flow played");
    Ok(())
}

fn show(engine: &FlowEngine, config: &AppConfig, json: bool) -> Result<()> {
    let project = engine.snapshot();
    let anchors = AnchorTable::place(&project, config.grid);
    let connectors = compute_connectors(&project.commits, &anchors);

    if json {
        let doc = serde_json::json!({
            "project": &*project,
            "anchors": anchors,
            "connectors": connectors,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        print!("{}", board::render(&project, &connectors)?);
    }
    Ok(())
}

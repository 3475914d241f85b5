use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use storyforge_core::{CancellationToken, Diagnostic};
use storyforge_encode::SceneGraphEncoder;
use storyforge_generate::{GenerationResult, Project};
use storyforge_script::{AssetRegistry, RhaiScript, ScriptOutcome};

#[derive(Parser)]
#[command(
    name = "storyforge",
    version,
    about = "Storyforge: scripted storyboard generation",
    long_about = "Storyforge runs storyboard scripts, merges their sprites, animations and samples\ninto ordered layers, and writes a storyboard file next to the mapset."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every script and write the storyboard file
    Generate {
        /// Project directory containing storyforge.toml
        #[arg(default_value = ".")]
        project: PathBuf,
    },

    /// Compile and run every script, reporting faults without writing output
    Check {
        /// Project directory containing storyforge.toml
        #[arg(default_value = ".")]
        project: PathBuf,
    },

    /// Print the generated scene graph as JSON
    Preview {
        /// Project directory containing storyforge.toml
        #[arg(default_value = ".")]
        project: PathBuf,

        /// Write the JSON to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate { project } => cmd_generate(&project),
        Commands::Check { project } => cmd_check(&project),
        Commands::Preview { project, output } => cmd_preview(&project, output.as_deref()),
    }
}

fn open_project(path: &Path) -> Result<Project> {
    Project::open(path).with_context(|| format!("failed to open project {}", path.display()))
}

fn cmd_generate(path: &Path) -> Result<()> {
    let start = Instant::now();
    let project = open_project(path)?;
    let result = project
        .write_storyboard(CancellationToken::new())
        .context("storyboard generation failed")?;

    report(&result.outcomes, &result.diagnostics);
    println!(
        "✓ Wrote {} ({} groups, {} assets generated, {} reused) in {:.2}s",
        project.osb_path().display(),
        result.group_names.len(),
        result.assets_generated,
        result.assets_reused,
        start.elapsed().as_secs_f64()
    );
    fail_on_faults(&result)
}

fn cmd_check(path: &Path) -> Result<()> {
    let project = open_project(path)?;
    let scripts = project
        .load_scripts()
        .context("failed to load project scripts")?;

    let mut syntax_errors = 0;
    for entry in std::fs::read_dir(project.scripts_dir())? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("rhai") {
            continue;
        }
        let script = RhaiScript::from_file(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if let Err(e) = script.check_syntax() {
            eprintln!("✗ {}: {e}", path.display());
            syntax_errors += 1;
        }
    }
    if syntax_errors > 0 {
        bail!("{syntax_errors} script(s) failed to compile");
    }

    let options = project.run_options(Arc::new(AssetRegistry::new()), CancellationToken::new());
    let run = scripts.run(&options).context("script run failed")?;
    report(&run.outcomes, &[]);

    let faults = run.faults().count();
    if faults > 0 {
        bail!("{faults} of {} script(s) faulted", run.outcomes.len());
    }
    println!(
        "✓ {} script(s) ran cleanly, {} group(s)",
        run.outcomes.len(),
        run.groups.len()
    );
    Ok(())
}

fn cmd_preview(path: &Path, output: Option<&Path>) -> Result<()> {
    let project = open_project(path)?;
    let result = project
        .generate(&SceneGraphEncoder::new(), CancellationToken::new())
        .context("scene graph generation failed")?;
    report(&result.outcomes, &result.diagnostics);

    let json = result.output.to_json()?;
    match output {
        Some(file) => {
            std::fs::write(file, json)
                .with_context(|| format!("failed to write {}", file.display()))?;
            println!(
                "✓ Wrote scene graph with {} element(s) to {}",
                result.output.element_count(),
                file.display()
            );
        }
        None => println!("{json}"),
    }
    fail_on_faults(&result)
}

fn report(outcomes: &[ScriptOutcome], diagnostics: &[Diagnostic]) {
    for outcome in outcomes {
        match &outcome.fault {
            Some(fault) => eprintln!("✗ {}: {fault}", outcome.script),
            None => tracing::debug!(
                script = %outcome.script,
                elements = outcome.element_count,
                elapsed_ms = outcome.elapsed.as_millis() as u64,
                "script ok"
            ),
        }
    }
    for diagnostic in diagnostics {
        eprintln!("  {diagnostic}");
    }
}

fn fail_on_faults<T>(result: &GenerationResult<T>) -> Result<()> {
    let faults = result.faults().count();
    if faults > 0 {
        bail!("{faults} script(s) faulted; their output was left out");
    }
    Ok(())
}

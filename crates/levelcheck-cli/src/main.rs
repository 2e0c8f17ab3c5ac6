//! `levelcheck`: the command-line driver (A5) that wires the ambient file
//! readers, elaborator, model linker, connectivity index, propagation
//! engine, and rule checker into one run, then optionally hands control to
//! the interactive hierarchy shell (C11).
//!
//! The shell owns navigation and read-only query commands outright; a
//! command that mutates run-wide state (`setpower`, `setmodel`, `setfuse`)
//! or advances the pipeline (`rerun`, `continue`, `skip`, `noerror`) comes
//! back out of [`levelcheck_shell::Shell::run`] as an [`Outcome`] for this
//! driver to act on. The pipeline itself is rebuilt from scratch on every
//! reload rather than mutated in place: nothing downstream of
//! [`levelcheck_circuit::CircuitLibrary`] supports incremental updates, and
//! a full netlist re-parse is cheap next to one propagation pass.

mod config;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use levelcheck_check::{CheckContext, Finding, RuleChecker};
use levelcheck_circuit::CircuitLibrary;
use levelcheck_core::{Interner, RunOptions, Stage, TextId};
use levelcheck_elaborate::{Elaboration, Elaborator};
use levelcheck_io::{read_model_file, read_netlist_file, read_power_file, FuseOverrides};
use levelcheck_model::ModelLibrary;
use levelcheck_netgraph::{ConnectivityIndex, LinkedModels};
use levelcheck_power::PowerSpec;
use levelcheck_propagate::{PropagationEngine, PropagationState, Sinks};
use levelcheck_shell::{InputStack, Outcome, ReloadKind, Shell, ShellContext, TerminalInput};

use config::ConfigFile;

#[derive(Parser)]
#[command(name = "levelcheck")]
#[command(about = "Transistor-level voltage checker for flattened IC netlists")]
#[command(version)]
struct Cli {
    /// Flat netlist file (.SUBCKT/.ENDS blocks, device and X instance lines)
    netlist: PathBuf,

    /// Top-level subcircuit to elaborate from
    #[arg(long)]
    top: String,

    /// Device model file
    #[arg(long)]
    model: PathBuf,

    /// Power-intent file
    #[arg(long)]
    power: PathBuf,

    /// Fuse-override file
    #[arg(long)]
    fuse: Option<PathBuf>,

    /// TOML file overriding the default run thresholds
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enter the interactive hierarchy shell once the run completes
    #[arg(short, long)]
    interactive: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// The paths and options a pipeline rebuild reads from; mutated in place by
/// `setpower`/`setmodel`/`setfuse` reloads, never by anything downstream.
struct Session {
    netlist_path: PathBuf,
    top: String,
    model_path: PathBuf,
    power_path: PathBuf,
    fuse_path: Option<PathBuf>,
    options: RunOptions,
}

impl Session {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let mut options = RunOptions::default();
        if let Some(config_path) = &cli.config {
            ConfigFile::load(config_path)?.apply(&mut options);
        }
        Ok(Self {
            netlist_path: cli.netlist.clone(),
            top: cli.top.clone(),
            model_path: cli.model.clone(),
            power_path: cli.power.clone(),
            fuse_path: cli.fuse.clone(),
            options,
        })
    }

    fn apply_reload(&mut self, kind: ReloadKind, path: String) {
        match kind {
            ReloadKind::Power => self.power_path = PathBuf::from(path),
            ReloadKind::Model => self.model_path = PathBuf::from(path),
            ReloadKind::Fuse => self.fuse_path = Some(PathBuf::from(path)),
        }
    }
}

/// Everything one elaborate/link/propagate/check pass produces, owned
/// together so a [`ShellContext`] and [`CheckContext`] can both borrow from
/// it for the lifetime of one pipeline build.
struct Pipeline {
    interner: Interner,
    library: CircuitLibrary,
    models: ModelLibrary,
    power: PowerSpec,
    linked: LinkedModels,
    connectivity: ConnectivityIndex,
    elaboration: Elaboration,
    state: PropagationState,
    findings: Vec<Finding>,
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Apply fuse overrides by mutating `device_type` on every fuse device in
/// `library` in place. The netlist is re-parsed fresh on every rebuild, so
/// this never has to undo a previous override.
fn apply_fuse_overrides(library: &mut CircuitLibrary, overrides: &FuseOverrides, interner: &Interner) {
    if overrides.is_empty() {
        return;
    }
    for (_, circuit) in library.iter_mut() {
        for device in circuit.devices_mut() {
            if !device.device_type.is_fuse() {
                continue;
            }
            let name = interner.resolve(device.name).to_string();
            device.device_type = overrides.resolve(&name, device.device_type);
        }
    }
}

fn build_pipeline(session: &Session, sinks: &mut Sinks) -> Result<Pipeline> {
    let mut interner = Interner::new();

    let netlist_text = read_file(&session.netlist_path)?;
    let mut library = read_netlist_file(
        &session.netlist_path.to_string_lossy(),
        &netlist_text,
        &mut interner,
    )
    .with_context(|| format!("parsing netlist {}", session.netlist_path.display()))?;

    let model_text = read_file(&session.model_path)?;
    let models = read_model_file(&session.model_path.to_string_lossy(), &model_text)
        .with_context(|| format!("parsing model file {}", session.model_path.display()))?;

    let power_text = read_file(&session.power_path)?;
    let power = read_power_file(&session.power_path.to_string_lossy(), &power_text)
        .with_context(|| format!("parsing power file {}", session.power_path.display()))?;

    if let Some(fuse_path) = &session.fuse_path {
        let fuse_text = read_file(fuse_path)?;
        let overrides = FuseOverrides::parse(&fuse_path.to_string_lossy(), &fuse_text)
            .with_context(|| format!("parsing fuse file {}", fuse_path.display()))?;
        apply_fuse_overrides(&mut library, &overrides, &interner);
    }

    let top_name: TextId = interner
        .get(&session.top)
        .ok_or_else(|| anyhow::anyhow!("top circuit {:?} is not declared in the netlist", session.top))?;

    let elaboration = Elaborator::elaborate(&library, top_name, &session.options)
        .with_context(|| format!("elaborating from top circuit {:?}", session.top))?;
    let linked = LinkedModels::link(&library, &models, &interner);
    let connectivity = ConnectivityIndex::build(&elaboration, &library, &linked);
    let state = PropagationEngine::run(
        &elaboration,
        &library,
        &models,
        &linked,
        &connectivity,
        &power,
        &interner,
        sinks,
    );

    let findings = {
        let ctx = CheckContext {
            elaboration: &elaboration,
            library: &library,
            linked: &linked,
            connectivity: &connectivity,
            power: &power,
            state: &state,
            interner: &interner,
            options: &session.options,
        };
        RuleChecker::run(&ctx, sinks)
    };

    Ok(Pipeline { interner, library, models, power, linked, connectivity, elaboration, state, findings })
}

fn run(cli: Cli) -> Result<ExitCode> {
    let interactive = cli.interactive;
    let mut session = Session::from_cli(&cli)?;

    'outer: loop {
        let mut sinks = Sinks::stdio();
        let pipeline = build_pipeline(&session, &mut sinks)?;
        let clean = pipeline.findings.is_empty();

        if !interactive {
            return Ok(if clean { ExitCode::SUCCESS } else { ExitCode::FAILURE });
        }

        let ctx = ShellContext::new(
            &pipeline.elaboration,
            &pipeline.library,
            &pipeline.models,
            &pipeline.linked,
            &pipeline.connectivity,
            &pipeline.power,
            Some(&pipeline.state),
            &pipeline.interner,
            &session.options,
            Stage::Complete,
        );
        let input = InputStack::new(Box::new(TerminalInput::new(io::stdin(), io::stdout())));
        let mut shell = Shell::new(input, ctx);
        // Hand the pipeline's own debug writer to the shell so `debug`
        // writes its configuration/netlist/power-snapshot triple to the
        // same sink the rest of the run uses, rather than discarding it.
        shell.set_debug_sink(sinks.debug);

        loop {
            match shell.run(&mut io::stdout()) {
                Outcome::Quit => return Ok(if clean { ExitCode::SUCCESS } else { ExitCode::FAILURE }),
                Outcome::Reload { kind, path } => {
                    session.apply_reload(kind, path);
                    continue 'outer;
                }
                // `shell.run` only returns once it has something other than
                // `Continue` to report, but the match stays exhaustive here
                // rather than falling back on a wildcard arm.
                Outcome::Rerun
                | Outcome::Advance(_)
                | Outcome::Skip
                | Outcome::SuppressCurrentCategory
                | Outcome::Continue => continue,
            }
        }
    }
}

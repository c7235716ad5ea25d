//! Kickstart - terminal tutorials with saved progress
//!
//! CLI entry point: menu, direct runs, listings and progress maintenance.

use std::fs;
use std::io::{self, IsTerminal};

use clap::{CommandFactory, FromArgMatches};
use colored::*;
use eyre::{Context, Result};
use progressstore::{ProgressError, ProgressStore, ratio};
use serde::Serialize;
use tracing::{debug, info};

use kickstart::cli::{Cli, Command, OutputFormat, generate_after_help, get_log_path};
use kickstart::config::Config;
use kickstart::display::{ConsoleDisplay, PROGRESS_WIDTH, progress_bar};
use kickstart::editor::EditorLauncher;
use kickstart::i18n::Translator;
use kickstart::input::{InputError, LineInput, ReadlineInput, StdinInput};
use kickstart::selector::{ByteKeys, KeySource, Selector, SelectorExit, TerminalKeys};
use kickstart::session::Session;
use kickstart::tui::{MenuScreen, PlainScreen, TuiScreen};
use kickstart::tutorial::{Catalog, Outcome, Workspace, run_tutorial};
use kickstart::tutorials;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Priority: CLI --log-level / -v > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn main() {
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = match Cli::from_arg_matches(&cmd.get_matches()) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    if let Err(e) = run(cli) {
        let corrupt = e
            .chain()
            .find_map(|cause| match cause.downcast_ref::<ProgressError>() {
                Some(ProgressError::StateCorruption { path, .. }) => Some(path.clone()),
                _ => None,
            });
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        if let Some(path) = corrupt {
            eprintln!(
                "The progress file {} was left as it is. Fix it by hand or start over with `ks reset --yes`.",
                path.display()
            );
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.effective_log_level().as_deref(), config_log_level.as_deref())
        .context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    apply_overrides(&mut config, &cli);
    config.validate().context("Invalid configuration")?;
    info!(
        "Kickstart loaded config: language={}, groups={}",
        config.language,
        config.groups.len()
    );

    let catalog = tutorials::registry()?;
    catalog
        .validate_groups(&config.groups)
        .context("Configured groups do not match the available tutorials")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command.unwrap_or(Command::Menu) {
        Command::Menu => cmd_menu(&config, catalog),
        Command::List => cmd_list(&config, &catalog),
        Command::Status { format } => cmd_status(&config, format),
        Command::Run { name } => cmd_run(&config, &catalog, &name),
        Command::Reset { yes } => cmd_reset(&config, yes),
    }
}

/// Command-line flags win over the config file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(lang) = &cli.lang {
        config.language = lang.clone();
    }
    if let Some(path) = &cli.state_file {
        config.state_file = Some(path.clone());
    }
    if let Some(path) = &cli.workspace {
        config.workspace = Some(path.clone());
    }
}

fn interactive() -> bool {
    io::stdin().is_terminal() && io::stdout().is_terminal()
}

fn line_input() -> Result<Box<dyn LineInput>> {
    if interactive() {
        Ok(Box::new(ReadlineInput::new().context("Failed to start line editor")?))
    } else {
        Ok(Box::new(StdinInput::new()))
    }
}

fn open_store(config: &Config) -> Result<ProgressStore> {
    let path = config.state_path();
    debug!(path = %path.display(), "open_store: called");
    Ok(ProgressStore::load(&path, config.groups.clone())?)
}

fn build_session(config: &Config, input: Box<dyn LineInput>) -> Result<Session> {
    let i18n = Translator::new(&config.language)?;
    let root = config.workspace_root();
    fs::create_dir_all(&root).context(format!("Failed to create workspace {}", root.display()))?;
    Ok(Session::new(
        Box::new(ConsoleDisplay::new()),
        input,
        i18n,
        EditorLauncher::new(config.editor.clone()),
        Workspace::new(root),
    ))
}

fn group_label(i18n: &Translator, key: &str, fallback: &str) -> String {
    i18n.get(&format!("group.{}.name", key)).unwrap_or(fallback).to_string()
}

fn cmd_menu(config: &Config, catalog: Catalog) -> Result<()> {
    info!("Starting menu");
    let store = open_store(config)?;

    let (keys, screen, input): (Box<dyn KeySource>, Box<dyn MenuScreen>, Box<dyn LineInput>) = if interactive() {
        (
            Box::new(TerminalKeys),
            Box::new(TuiScreen::new()?),
            Box::new(ReadlineInput::new().context("Failed to start line editor")?),
        )
    } else {
        debug!("cmd_menu: not a terminal, using plain screen");
        (
            Box::new(ByteKeys::new(io::stdin())),
            Box::new(PlainScreen::new(Box::new(ConsoleDisplay::new()))),
            Box::new(StdinInput::new()),
        )
    };

    let session = build_session(config, input)?;
    let mut selector = Selector::new(store, catalog, session, keys, screen)?.with_after(config.after_tutorial);
    let exit = selector.run()?;

    // Dropping the selector hands the terminal back before printing
    let store = selector.into_store();
    if let SelectorExit::Ran { name, outcome } = &exit {
        debug!(%name, ?outcome, "cmd_menu: exited after tutorial");
    }
    println!(
        "{} {}",
        "Total progress:".bold(),
        progress_bar(store.total_progress(), PROGRESS_WIDTH)
    );
    Ok(())
}

fn cmd_list(config: &Config, catalog: &Catalog) -> Result<()> {
    let store = open_store(config)?;
    let i18n = Translator::new(&config.language)?;

    for group in store.groups() {
        println!("{}", group_label(&i18n, &group.key, &group.name).cyan().bold());
        for name in &group.tutorials {
            let mark = if store.is_completed(name) {
                "✓".green()
            } else {
                "○".dimmed()
            };
            let fallback = catalog.get(name).map_or("", |d| d.description);
            let description = i18n
                .get(&format!("tutorial.{}.description", name))
                .unwrap_or(fallback);
            println!("  {} {:<16} {}", mark, name, description.dimmed());
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct GroupStatus {
    key: String,
    name: String,
    completed: usize,
    total: usize,
    progress: f64,
}

#[derive(Debug, Serialize)]
struct StatusReport {
    groups: Vec<GroupStatus>,
    completed: usize,
    total: usize,
    progress: f64,
    current_tutorial: Option<String>,
}

fn status_report(store: &ProgressStore, i18n: &Translator) -> StatusReport {
    let groups: Vec<GroupStatus> = store
        .groups()
        .iter()
        .map(|group| {
            let completed = group.tutorials.iter().filter(|t| store.is_completed(t)).count();
            GroupStatus {
                key: group.key.clone(),
                name: group_label(i18n, &group.key, &group.name),
                completed,
                total: group.len(),
                progress: ratio(completed, group.len()),
            }
        })
        .collect();

    let all = store.state().all_tutorials();
    let completed = all.iter().filter(|t| store.is_completed(t)).count();
    StatusReport {
        groups,
        completed,
        total: all.len(),
        progress: store.total_progress(),
        current_tutorial: store.state().current_tutorial.clone(),
    }
}

fn cmd_status(config: &Config, format: OutputFormat) -> Result<()> {
    let store = open_store(config)?;
    let i18n = Translator::new(&config.language)?;
    let report = status_report(&store, &i18n);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            for group in &report.groups {
                println!(
                    "{:<20} {} ({}/{})",
                    group.name,
                    progress_bar(group.progress, PROGRESS_WIDTH),
                    group.completed,
                    group.total
                );
            }
            println!(
                "{:<20} {} ({}/{})",
                i18n.text("menu.total").bold(),
                progress_bar(report.progress, PROGRESS_WIDTH),
                report.completed,
                report.total
            );
            if let Some(current) = &report.current_tutorial {
                println!("Last started: {}", current);
            }
            println!("State file: {}", store.path().display());
        }
    }
    Ok(())
}

fn cmd_run(config: &Config, catalog: &Catalog, name: &str) -> Result<()> {
    info!(%name, "Running tutorial directly");
    let mut store = open_store(config)?;
    if !store.state().knows_tutorial(name) {
        let available: Vec<&str> = catalog.names().collect();
        return Err(eyre::eyre!(
            "Tutorial '{}' is not in any configured group. Available: {}",
            name,
            available.join(", ")
        ));
    }
    let mut tutorial = catalog
        .instantiate(name)
        .ok_or_else(|| eyre::eyre!("Tutorial '{}' is not available", name))?;

    store.set_current(name)?;
    let mut session = build_session(config, line_input()?)?;
    let outcome = run_tutorial(tutorial.as_mut(), &mut session);

    if outcome == Outcome::Completed && store.mark_completed(name)? {
        println!("{} {}", "✓".green(), session.format("selector.marked_complete", &[("name", name)]));
    }
    Ok(())
}

fn cmd_reset(config: &Config, yes: bool) -> Result<()> {
    let path = config.state_path();
    if !yes {
        let mut input = line_input()?;
        let answer = match input.read_line(&format!("Reset all progress in {}? (y/n): ", path.display())) {
            Ok(answer) => answer,
            Err(InputError::Cancelled) => String::new(),
            Err(e) => return Err(e.into()),
        };
        if !answer.eq_ignore_ascii_case("y") {
            println!("Reset cancelled.");
            return Ok(());
        }
    }

    let (_, backup) = ProgressStore::reset(&path, config.groups.clone())?;
    println!("{} Progress reset: {}", "✓".green(), path.display());
    if let Some(backup) = backup {
        println!("Previous progress saved to {}", backup.display());
    }
    Ok(())
}

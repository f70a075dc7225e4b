//! `logfilter` - drive the log filter engine from the command line
//!
//! Loads a session exported from a rendered log, applies filter commands
//! and prints the resulting view.

mod render;
mod script;
mod session;

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use logfilter_core::{FilterCommand, FilterEngine};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let session = Arg::new("session")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Session JSON file ({\"tables\": [[row, ...], ...]})");
    let config = Arg::new("config")
        .long("config")
        .value_parser(value_parser!(PathBuf))
        .help("Filter configuration (TOML)");

    Command::new("logfilter")
        .version(logfilter_core::VERSION)
        .about("Nesting and entity/user filter for structured log views")
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log engine activity at debug level"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("view")
                .about("Apply commands and print the resulting view")
                .arg(session.clone())
                .arg(config.clone())
                .arg(
                    Arg::new("depth")
                        .long("depth")
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(i64))
                        .help("Fold at this nest level before other commands (-1 expands all)"),
                )
                .arg(
                    Arg::new("script")
                        .long("script")
                        .value_parser(value_parser!(PathBuf))
                        .help("File with one command per line"),
                )
                .arg(
                    Arg::new("cmd")
                        .long("cmd")
                        .action(ArgAction::Append)
                        .help("Inline command, e.g. 'collapse 3' or 'toggle Engine:Self'"),
                )
                .arg(
                    Arg::new("all-rows")
                        .long("all-rows")
                        .action(ArgAction::SetTrue)
                        .help("Also print hidden rows"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the view snapshot as JSON"),
                ),
        )
        .subcommand(
            Command::new("buttons")
                .about("Print the initial button states as JSON")
                .arg(session)
                .arg(config),
        )
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_engine(args: &ArgMatches) -> Result<FilterEngine> {
    let Some(session_path) = args.get_one::<PathBuf>("session") else {
        bail!("missing session file");
    };
    let config = session::load_config(args.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    let index = session::load_session(session_path)?.into_index()?;
    Ok(FilterEngine::with_index(config, index))
}

fn collect_commands(args: &ArgMatches) -> Result<Vec<FilterCommand>> {
    let mut commands = Vec::new();

    if let Some(&depth) = args.get_one::<i64>("depth") {
        let depth = script::depth_from_signed(depth)
            .map_err(|()| anyhow::anyhow!("--depth must be -1 or a non-negative level"))?;
        commands.push(FilterCommand::ResetAll { depth });
    }
    if let Some(path) = args.get_one::<PathBuf>("script") {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        commands.extend(script::parse_script(&text)?);
    }
    if let Some(inline) = args.get_many::<String>("cmd") {
        for (i, line) in inline.enumerate() {
            if let Some(command) = script::parse_line(i + 1, line)? {
                commands.push(command);
            }
        }
    }
    Ok(commands)
}

fn run_view(args: &ArgMatches) -> Result<()> {
    let mut engine = build_engine(args)?;

    for command in collect_commands(args)? {
        let outcome = engine
            .dispatch(command.clone())
            .with_context(|| format!("applying {command:?}"))?;
        tracing::debug!(rows = outcome.changed_rows.len(), "command applied");
    }

    let snapshot = engine.snapshot()?;
    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", render::render_text(&snapshot, args.get_flag("all-rows")));
    }
    Ok(())
}

fn run_buttons(args: &ArgMatches) -> Result<()> {
    let engine = build_engine(args)?;
    println!("{}", serde_json::to_string_pretty(engine.buttons()?)?);
    Ok(())
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    match matches.subcommand() {
        Some(("view", args)) => run_view(args),
        Some(("buttons", args)) => run_buttons(args),
        _ => bail!("unknown subcommand"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn inline_commands_follow_depth() {
        let matches = cli().get_matches_from([
            "logfilter",
            "view",
            "session.json",
            "--depth",
            "-1",
            "--cmd",
            "collapse 2",
            "--cmd",
            "toggle Engine:Self",
        ]);
        let Some(("view", args)) = matches.subcommand() else {
            panic!("expected view subcommand");
        };

        let commands = collect_commands(args).unwrap();
        assert_eq!(
            commands,
            vec![
                FilterCommand::ResetAll { depth: None },
                FilterCommand::Collapse { entry: 2 },
                FilterCommand::toggle("Engine", "Self"),
            ]
        );
    }
}

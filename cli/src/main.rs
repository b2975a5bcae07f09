use std::path::PathBuf;
use std::process;

use anyhow::anyhow;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use cli::{handle_diff, handle_sync};
use flowsync_defs::ResourceKind;
use flowsync_utils::setup_logging;
use log::{error, LevelFilter};

fn file_arg(help: &'static str) -> Arg {
    Arg::new("file")
        .help(help)
        .required(true)
        .value_parser(value_parser!(PathBuf))
}

fn sync_command(name: &'static str, about: &'static str, help: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(file_arg(help))
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Print what would change without sending any write")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-prune")
                .long("no-prune")
                .help("Keep server resources that are missing from the file")
                .action(ArgAction::SetTrue),
        )
}

fn build_cli() -> Command {
    Command::new("flowsync")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Reconciles flows, deployments and automations on an orchestration server with YAML definitions")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Debug logging, overrides LOG_LEVEL")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(sync_command(
            "deployments",
            "Create, update and delete deployments (and their flows) to match a file",
            "Deployment definitions, e.g. deployments.yaml",
        ))
        .subcommand(sync_command(
            "automations",
            "Create, update and delete automations to match a file",
            "Automation definitions, e.g. automations.yaml",
        ))
        .subcommand(
            Command::new("diff")
                .about("Show per-field differences between a file and the server")
                .arg(
                    Arg::new("kind")
                        .help("Kind of resources in the file")
                        .required(true)
                        .value_parser(["deployments", "automations"]),
                )
                .arg(file_arg("Definitions file, e.g. deployments.yaml")),
        )
}

fn path_of(matches: &ArgMatches) -> anyhow::Result<PathBuf> {
    matches
        .get_one::<PathBuf>("file")
        .cloned()
        .ok_or_else(|| anyhow!("No file given"))
}

async fn run(matches: &ArgMatches) -> anyhow::Result<bool> {
    match matches.subcommand() {
        Some(("deployments", sub)) | Some(("automations", sub)) => {
            let kind: ResourceKind = matches.subcommand_name().unwrap_or_default().parse()?;
            handle_sync(
                kind,
                &path_of(sub)?,
                sub.get_flag("dry-run"),
                !sub.get_flag("no-prune"),
            )
            .await
        }
        Some(("diff", sub)) => {
            let kind: ResourceKind = sub
                .get_one::<String>("kind")
                .map(String::as_str)
                .unwrap_or_default()
                .parse()?;
            handle_diff(kind, &path_of(sub)?).await
        }
        Some((other, _)) => Err(anyhow!("Unknown command '{}'", other)),
        None => Err(anyhow!("No command given, see --help")),
    }
}

#[tokio::main]
async fn main() {
    let matches = build_cli().get_matches();

    let level = if matches.get_flag("verbose") {
        Some(LevelFilter::Debug)
    } else {
        None
    };
    if let Err(e) = setup_logging(level) {
        eprintln!("Failed to set up logging: {}", e);
    }

    match run(&matches).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("{:#}", e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition_is_valid() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_sync_flags() {
        let matches = build_cli()
            .try_get_matches_from(["flowsync", "deployments", "deployments.yaml", "--dry-run", "-v"])
            .unwrap();
        assert!(matches.get_flag("verbose"));

        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "deployments");
        assert_eq!(path_of(sub).unwrap(), PathBuf::from("deployments.yaml"));
        assert!(sub.get_flag("dry-run"));
        assert!(!sub.get_flag("no-prune"));
    }

    #[test]
    fn test_diff_rejects_unknown_kind() {
        assert!(build_cli()
            .try_get_matches_from(["flowsync", "diff", "workers", "w.yaml"])
            .is_err());
        assert!(build_cli()
            .try_get_matches_from(["flowsync", "diff", "automations", "a.yaml"])
            .is_ok());
    }

    #[test]
    fn test_file_is_required() {
        assert!(build_cli()
            .try_get_matches_from(["flowsync", "automations", "--no-prune"])
            .is_err());
    }
}

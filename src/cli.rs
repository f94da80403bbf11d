use crate::command::{Command, GlobalCommand, Verb};
use crate::config::{FailurePolicy, ON_FAILURE_VAR, PARALLEL_VAR, ROOT_VAR};
use crate::error::{Result, StacksError};
use crate::logging::LOG_VAR;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stacks")]
#[command(about = "Start, stop and update self-hosted docker compose stacks.")]
#[command(disable_help_flag = true)]
pub struct Cli {
    /// Print help
    #[arg(short, long)]
    pub help: bool,

    /// Directory holding the stacks
    #[arg(long, value_name = "DIR", env = ROOT_VAR)]
    pub root: Option<PathBuf>,

    /// What a run over all stacks does when one of them fails
    #[arg(long, value_enum, env = ON_FAILURE_VAR, default_value = "best-effort")]
    pub on_failure: FailurePolicy,

    /// Run a verb in all stacks concurrently
    #[arg(long)]
    pub parallel: bool,

    /// Debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// [stack] <command> [args...]
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
    pub words: Vec<String>,
}

/// A parsed `[stack] <command> [args...]` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub stack: Option<String>,
    pub command: Command,
    pub args: Vec<String>,
}

/// Split the positional words into stack, command and trailing arguments.
///
/// A known command name in first position always means "no stack"; otherwise
/// the first word names the stack and the second the command.
pub fn parse_invocation(words: &[String]) -> Result<Invocation> {
    let Some(first) = words.first() else {
        return Ok(Invocation {
            stack: None,
            command: Command::Global(GlobalCommand::Help),
            args: vec![],
        });
    };

    if let Some(command) = Command::parse(first) {
        return Ok(Invocation {
            stack: None,
            command,
            args: words[1..].to_vec(),
        });
    }

    let Some(second) = words.get(1) else {
        return Err(StacksError::UnknownCommand(first.clone()));
    };
    let command = Command::parse(second).ok_or_else(|| StacksError::UnknownCommand(second.clone()))?;
    if let Command::Global(_) = command {
        return Err(StacksError::GlobalOnly(command.as_str().to_string()));
    }

    Ok(Invocation {
        stack: Some(first.clone()),
        command,
        args: words[2..].to_vec(),
    })
}

pub fn help_text() -> String {
    let mut out = String::new();
    out.push_str("Usage: stacks [OPTIONS] [stack] <command> [args...]\n\n");

    out.push_str("Lifecycle commands (all stacks, or only [stack]):\n");
    for v in Verb::ALL {
        out.push_str(&format!("  {:<10} {}\n", v.as_str(), v.summary()));
    }

    out.push_str("\nGlobal commands:\n");
    for g in GlobalCommand::ALL {
        out.push_str(&format!("  {:<10} {}\n", g.as_str(), g.summary()));
    }

    out.push_str("\nOptions:\n");
    out.push_str(&format!("  --root <DIR>            stacks directory (or {ROOT_VAR})\n"));
    out.push_str(&format!(
        "  --on-failure <POLICY>   best-effort | fail-fast | ignore (or {ON_FAILURE_VAR})\n"
    ));
    out.push_str(&format!(
        "  --parallel              run all stacks concurrently (or {PARALLEL_VAR}=1)\n"
    ));
    out.push_str("  -v, --verbose / -q, --quiet\n");
    out.push_str("  -h, --help              print this help\n");

    out.push_str("\nEnvironment:\n");
    out.push_str(&format!("  {ROOT_VAR:<16} stacks directory, required\n"));
    out.push_str(&format!("  {ON_FAILURE_VAR:<16} failure policy for runs over all stacks\n"));
    out.push_str(&format!("  {PARALLEL_VAR:<16} run all stacks concurrently\n"));
    out.push_str("  DOCKER_BIN       container runtime binary (default: docker)\n");
    out.push_str(&format!("  {LOG_VAR:<16} log filter, e.g. debug\n"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_words_is_help() {
        let inv = parse_invocation(&[]).unwrap();
        assert_eq!(inv.command, Command::Global(GlobalCommand::Help));
        assert_eq!(inv.stack, None);
    }

    #[test]
    fn command_first_means_no_stack() {
        let inv = parse_invocation(&words(&["password", "20"])).unwrap();
        assert_eq!(inv.command, Command::Global(GlobalCommand::Password));
        assert_eq!(inv.stack, None);
        assert_eq!(inv.args, words(&["20"]));

        let inv = parse_invocation(&words(&["up", "--build"])).unwrap();
        assert_eq!(inv.command, Command::Lifecycle(Verb::Up));
        assert_eq!(inv.args, words(&["--build"]));
    }

    #[test]
    fn stack_then_verb() {
        let inv = parse_invocation(&words(&["media", "restart", "jellyfin"])).unwrap();
        assert_eq!(inv.stack.as_deref(), Some("media"));
        assert_eq!(inv.command, Command::Lifecycle(Verb::Restart));
        assert_eq!(inv.args, words(&["jellyfin"]));
    }

    #[test]
    fn unknown_commands_are_reported() {
        assert!(matches!(
            parse_invocation(&words(&["launch"])),
            Err(StacksError::UnknownCommand(c)) if c == "launch"
        ));
        assert!(matches!(
            parse_invocation(&words(&["media", "launch"])),
            Err(StacksError::UnknownCommand(c)) if c == "launch"
        ));
    }

    #[test]
    fn global_command_rejects_stack() {
        assert!(matches!(
            parse_invocation(&words(&["media", "prune"])),
            Err(StacksError::GlobalOnly(c)) if c == "prune"
        ));
    }

    #[test]
    fn help_lists_every_command() {
        let help = help_text();
        for v in Verb::ALL {
            assert!(help.contains(v.as_str()));
        }
        for g in GlobalCommand::ALL {
            assert!(help.contains(g.as_str()));
        }
        for var in [ROOT_VAR, ON_FAILURE_VAR, PARALLEL_VAR, LOG_VAR, "DOCKER_BIN"] {
            assert!(help.contains(var), "{var}");
        }
    }

    #[test]
    fn clap_keeps_trailing_flags_for_the_runtime() {
        let cli = Cli::try_parse_from(["stacks", "--root", "/srv", "media", "up", "--force-recreate"]).unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/srv")));
        assert_eq!(cli.words, words(&["media", "up", "--force-recreate"]));
    }

    #[test]
    fn help_flag_is_ours_and_trailing_help_goes_to_the_runtime() {
        let cli = Cli::try_parse_from(["stacks", "--help"]).unwrap();
        assert!(cli.help);
        assert!(cli.words.is_empty());

        let cli = Cli::try_parse_from(["stacks", "media", "up", "--help"]).unwrap();
        assert!(!cli.help);
        assert_eq!(cli.words, words(&["media", "up", "--help"]));
    }
}

use std::fmt;

/// Commands implemented by this tool. They never take a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalCommand {
    Help,
    Init,
    Prune,
    Password,
    Docs,
    List,
}

/// Lifecycle verbs forwarded to the compose runtime, in one stack or all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Up,
    Stop,
    Down,
    Restart,
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Global(GlobalCommand),
    Lifecycle(Verb),
}

impl GlobalCommand {
    pub const ALL: [GlobalCommand; 6] = [
        GlobalCommand::Help,
        GlobalCommand::Init,
        GlobalCommand::Prune,
        GlobalCommand::Password,
        GlobalCommand::Docs,
        GlobalCommand::List,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GlobalCommand::Help => "help",
            GlobalCommand::Init => "init",
            GlobalCommand::Prune => "prune",
            GlobalCommand::Password => "password",
            GlobalCommand::Docs => "docs",
            GlobalCommand::List => "list",
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            GlobalCommand::Help => "print this help",
            GlobalCommand::Init => "check that the container runtime is installed and reachable",
            GlobalCommand::Prune => "remove unused container resources system-wide",
            GlobalCommand::Password => "generate a random password from [length] bytes (default 16, at most 4096)",
            GlobalCommand::Docs => "open the local documentation",
            GlobalCommand::List => "list discovered stacks (--json for machine output)",
        }
    }
}

impl Verb {
    pub const ALL: [Verb; 5] = [Verb::Up, Verb::Stop, Verb::Down, Verb::Restart, Verb::Update];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Up => "up",
            Verb::Stop => "stop",
            Verb::Down => "down",
            Verb::Restart => "restart",
            Verb::Update => "update",
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            Verb::Up => "start all services",
            Verb::Stop => "stop services, keep containers",
            Verb::Down => "stop and remove containers",
            Verb::Restart => "restart services",
            Verb::Update => "pull, build and up, then prune system-wide",
        }
    }

    /// `docker compose` argument lists to run in order inside a stack directory.
    /// Trailing arguments go to the last step.
    pub fn compose_steps(&self, extra: &[String]) -> Vec<Vec<String>> {
        let step = |base: &[&str], with_extra: bool| {
            let mut args: Vec<String> = base.iter().map(|s| s.to_string()).collect();
            if with_extra {
                args.extend(extra.iter().cloned());
            }
            args
        };

        match self {
            Verb::Up => vec![step(&["up", "--detach"], true)],
            Verb::Stop => vec![step(&["stop"], true)],
            Verb::Down => vec![step(&["down"], true)],
            Verb::Restart => vec![step(&["restart"], true)],
            Verb::Update => vec![
                step(&["pull"], false),
                step(&["build"], false),
                step(&["up", "--detach"], true),
            ],
        }
    }

    /// Whether the verb ends with a system-wide prune once every stack is done.
    pub fn prunes_after(&self) -> bool {
        matches!(self, Verb::Update)
    }
}

impl Command {
    /// Look a command up by name. An empty name means `help`.
    pub fn parse(name: &str) -> Option<Command> {
        let name = name.trim();
        if name.is_empty() {
            return Some(Command::Global(GlobalCommand::Help));
        }
        if let Some(v) = Verb::ALL.iter().find(|v| v.as_str() == name) {
            return Some(Command::Lifecycle(*v));
        }
        GlobalCommand::ALL
            .iter()
            .find(|g| g.as_str() == name)
            .map(|g| Command::Global(*g))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Global(g) => g.as_str(),
            Command::Lifecycle(v) => v.as_str(),
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

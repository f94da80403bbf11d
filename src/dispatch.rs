//! Command dispatch.
//!
//! Global commands run once. Lifecycle verbs run in the named stack, or in
//! every discovered stack one after the other (or concurrently with
//! `--parallel`). The target directory is handed to the runtime on each call;
//! the process working directory is never changed.

use crate::cli::{help_text, Invocation};
use crate::command::{Command, GlobalCommand, Verb};
use crate::config::{Config, FailurePolicy};
use crate::docker::{ComposeRuntime, DockerMeta};
use crate::error::{Result, StacksError};
use crate::logging::{progress, report};
use crate::password;
use crate::stacks::{self, Stack};
use futures_util::future::join_all;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackOutcome {
    pub stack: String,
    pub code: i32,
}

pub struct Dispatcher<R> {
    cfg: Config,
    runtime: R,
}

impl<R: ComposeRuntime> Dispatcher<R> {
    pub fn new(cfg: Config, runtime: R) -> Self {
        Self { cfg, runtime }
    }

    /// Run one invocation and return the process exit code.
    pub async fn run(&self, inv: &Invocation) -> Result<i32> {
        tracing::debug!(command = %inv.command, stack = ?inv.stack, args = ?inv.args, "dispatch");
        match (inv.command, inv.stack.as_deref()) {
            (Command::Global(g), None) => self.run_global(g, &inv.args).await,
            (Command::Global(g), Some(_)) => Err(StacksError::GlobalOnly(g.as_str().to_string())),
            (Command::Lifecycle(verb), Some(name)) => {
                let stack = stacks::resolve(&self.cfg.root, name)?;
                self.run_single(verb, &stack, &inv.args).await
            }
            (Command::Lifecycle(verb), None) => self.run_all(verb, &inv.args).await,
        }
    }

    async fn run_single(&self, verb: Verb, stack: &Stack, args: &[String]) -> Result<i32> {
        let code = self.run_verb(verb, stack, args).await?;
        if !verb.prunes_after() {
            return Ok(code);
        }
        let prune_code = self.prune(&[]).await?;
        Ok(if code != 0 { code } else { prune_code })
    }

    async fn run_all(&self, verb: Verb, args: &[String]) -> Result<i32> {
        let all = stacks::discover(&self.cfg.root)?;
        if all.is_empty() {
            progress(&format!("no stacks under {}, nothing to {verb}", self.cfg.root.display()));
            return Ok(0);
        }

        let (outcomes, aborted) = if self.cfg.parallel {
            (self.fan_out_parallel(verb, &all, args).await, false)
        } else {
            self.fan_out_sequential(verb, &all, args).await
        };

        let mut code = self.summarize(verb, &outcomes, all.len());
        if verb.prunes_after() && !aborted {
            let prune_code = self.prune(&[]).await?;
            if code == 0 {
                code = prune_code;
            }
        }
        Ok(code)
    }

    async fn fan_out_sequential(&self, verb: Verb, all: &[Stack], args: &[String]) -> (Vec<StackOutcome>, bool) {
        let mut outcomes = Vec::with_capacity(all.len());
        for stack in all {
            progress(&format!("{}: {verb}", stack.name));
            let code = self.run_verb_logged(verb, stack, args).await;
            outcomes.push(StackOutcome {
                stack: stack.name.clone(),
                code,
            });
            if code != 0 && self.cfg.on_failure == FailurePolicy::FailFast {
                tracing::warn!(stack = %stack.name, code, "stopping after first failure");
                return (outcomes, true);
            }
        }
        (outcomes, false)
    }

    async fn fan_out_parallel(&self, verb: Verb, all: &[Stack], args: &[String]) -> Vec<StackOutcome> {
        let runs = all.iter().map(|stack| async move {
            progress(&format!("{}: {verb}", stack.name));
            StackOutcome {
                stack: stack.name.clone(),
                code: self.run_verb_logged(verb, stack, args).await,
            }
        });
        join_all(runs).await
    }

    fn summarize(&self, verb: Verb, outcomes: &[StackOutcome], total: usize) -> i32 {
        let failed: Vec<&StackOutcome> = outcomes.iter().filter(|o| o.code != 0).collect();
        let Some(first) = failed.first() else {
            tracing::info!(%verb, stacks = total, "all stacks done");
            return 0;
        };

        let names = failed.iter().map(|o| o.stack.as_str()).collect::<Vec<_>>().join(", ");
        if self.cfg.on_failure == FailurePolicy::Ignore {
            tracing::warn!(%verb, failed = %names, "ignoring failed stacks");
            return 0;
        }
        report(&format!("{} of {} stacks failed to {verb}: {names}", failed.len(), total));
        first.code
    }

    /// Run every compose step of `verb` in `stack`, stopping at the first failing step.
    async fn run_verb(&self, verb: Verb, stack: &Stack, args: &[String]) -> Result<i32> {
        for step in verb.compose_steps(args) {
            let code = self.runtime.compose(&stack.dir, &step).await?;
            if code != 0 {
                tracing::debug!(stack = %stack.name, ?step, code, "compose step failed");
                return Ok(code);
            }
        }
        Ok(0)
    }

    /// `run_verb` for fan-out: a runtime that cannot be started counts as a failed stack.
    async fn run_verb_logged(&self, verb: Verb, stack: &Stack, args: &[String]) -> i32 {
        match self.run_verb(verb, stack, args).await {
            Ok(code) => code,
            Err(e) => {
                report(&format!("{}: {e}", stack.name));
                1
            }
        }
    }

    async fn prune(&self, args: &[String]) -> Result<i32> {
        let mut full = vec!["system".to_string(), "prune".to_string(), "--force".to_string()];
        full.extend(args.iter().cloned());
        self.runtime.system(&full).await
    }

    async fn run_global(&self, command: GlobalCommand, args: &[String]) -> Result<i32> {
        match command {
            GlobalCommand::Help => {
                print!("{}", help_text());
                Ok(0)
            }
            GlobalCommand::Password => {
                if args.len() > 1 {
                    return Err(StacksError::InvalidArgument {
                        command: "password".to_string(),
                        message: "expected at most one length argument".to_string(),
                    });
                }
                let bytes = password::parse_length(args.first().map(String::as_str))?;
                println!("{}", password::generate(bytes));
                Ok(0)
            }
            GlobalCommand::Prune => self.prune(args).await,
            GlobalCommand::List => self.list(args),
            GlobalCommand::Init => self.init().await,
            GlobalCommand::Docs => self.docs(),
        }
    }

    fn list(&self, args: &[String]) -> Result<i32> {
        let json = match args {
            [] => false,
            [flag] if flag == "--json" => true,
            _ => {
                return Err(StacksError::InvalidArgument {
                    command: "list".to_string(),
                    message: format!("unexpected arguments: {}", args.join(" ")),
                })
            }
        };

        let all = stacks::discover(&self.cfg.root)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&all)?);
        } else {
            for stack in &all {
                println!("{}", stack.name);
            }
        }
        Ok(0)
    }

    async fn init(&self) -> Result<i32> {
        let meta = DockerMeta::detect(&self.cfg.root, &self.cfg.docker_bin).await;
        println!("runtime:  {}", meta.docker_bin);
        println!("context:  {} ({})", meta.context_name, meta.backend);
        if !meta.host.is_empty() {
            println!("host:     {}", meta.host);
        }
        println!("daemon:   {}", if meta.available { "reachable" } else { "unreachable" });
        println!(
            "compose:  {}",
            meta.compose_version.as_deref().unwrap_or("not installed")
        );

        if meta.usable() {
            Ok(0)
        } else {
            report("container runtime is not ready; install docker with the compose plugin and start the daemon");
            Ok(1)
        }
    }

    fn docs(&self) -> Result<i32> {
        let candidates: [PathBuf; 2] = [
            self.cfg.root.join("docs").join("index.html"),
            self.cfg.root.join("README.md"),
        ];
        let target = candidates
            .iter()
            .find(|p| p.is_file())
            .ok_or_else(|| StacksError::DocsNotFound(self.cfg.root.clone()))?;

        progress(&format!("opening {}", target.display()));
        open::that(target).map_err(|source| StacksError::Spawn {
            bin: "document viewer".to_string(),
            source,
        })?;
        Ok(0)
    }
}

mod cli;
mod command;
mod config;
mod dispatch;
mod docker;
mod env;
mod error;
mod logging;
mod password;
mod stacks;

use anyhow::Result;
use clap::Parser;
use error::StacksError;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    // ./.env may carry STACKS_ROOT, so it has to be loaded before clap reads the environment.
    let start_dir = std::env::current_dir()?;
    let mut loaded = env::load_env(&start_dir)?;

    let mut cli = cli::Cli::parse();
    if cli.help {
        print!("{}", cli::help_text());
        return Ok(0);
    }

    // <root>/.env may set the remaining options, so parse again once it is loaded.
    // Flags on the command line still win over anything read from the environment.
    let root = config::resolve_root(cli.root.as_deref())?;
    let root_env = env::load_env(&root)?;
    if !root_env.is_empty() {
        cli = cli::Cli::parse();
        loaded.extend(root_env);
    }

    logging::init_logging(cli.verbose, cli.quiet);
    if !loaded.is_empty() {
        tracing::debug!(files = ?loaded, "loaded env");
    }

    let cfg = config::get_config(Some(&root), cli.on_failure, cli.parallel)?;

    // A bare invocation is a usage error, `help` itself is not.
    if cli.words.first().map_or(true, |w| w.trim().is_empty()) {
        print!("{}", cli::help_text());
        return Ok(1);
    }

    let invocation = match cli::parse_invocation(&cli.words) {
        Ok(inv) => inv,
        Err(e @ StacksError::UnknownCommand(_)) => {
            eprintln!("error: {e}");
            print!("{}", cli::help_text());
            return Ok(1);
        }
        Err(e) => return Err(e.into()),
    };

    let runtime = docker::DockerCli::new(cfg.docker_bin.clone());
    let dispatcher = dispatch::Dispatcher::new(cfg, runtime);
    Ok(dispatcher.run(&invocation).await?)
}

#![warn(missing_docs)]

//! Entry point for the `panehop` binary.

mod cli;
mod error;
mod registry;
mod settings;

use std::{env, process};

use clap::Parser;
use logging::LogConfig;
use nvim_rpc::SocketEnv;
use panehop_engine::{Scanner, navigate};
use proc_tree::Procfs;
use sway_ipc::SwayClient;
use tracing::{debug, error};

use crate::{
    cli::Cli,
    error::{Error, Result},
    registry::Registry,
    settings::Settings,
};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version go to stdout and are not failures.
            let code = i32::from(err.use_stderr());
            err.print().ok();
            process::exit(code);
        }
    };
    if let Err(err) = run(&cli) {
        error!("{err}");
        eprintln!("panehop: {err}");
        process::exit(1);
    }
}

/// Install logging, connect to the window manager and move focus once.
fn run(cli: &Cli) -> Result<()> {
    logging::init(&LogConfig::from_args(&cli.log));
    let settings = Settings::resolve(cli, |key| env::var_os(key))?;
    debug!(?settings, "starting");

    let procfs = Procfs::new();
    let registry = Registry::builtin(
        procfs.clone(),
        SocketEnv::from_env(),
        tmux_nav::tmpdir_from_env(),
        settings.timeout,
    );
    let hooks = registry.enabled(settings.hooks.as_deref())?;

    let mut wm = SwayClient::connect(&settings.sway_socket, settings.timeout)?;
    let scanner = Scanner::new(procfs, hooks);
    let outcome = navigate(&mut wm, &scanner, settings.direction, settings.timeout);
    debug!(?outcome, "done");
    Ok(())
}

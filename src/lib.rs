mod command;
pub mod compile;
pub mod config;
pub mod ext;
pub mod logger;
pub mod service;
pub mod signal;

mod internal_prelude {
    pub use crate::ext::{eyre::reexports::*, Paint as _};
    pub use tracing::*;
}

use crate::{config::Commands, ext::PathBufExt, logger::GRAY};
use camino::Utf8PathBuf;
use clap::CommandFactory;
use config::{Cli, Config};
use signal::Interrupt;
use std::env;

use crate::internal_prelude::*;

pub async fn run(args: Cli) -> Result<()> {
    use Commands::{Completions, Sass, SassWatch};

    let opts = match &args.command {
        Completions { shell } => {
            clap_complete::generate(
                *shell,
                &mut Cli::command(),
                "sass-task",
                &mut std::io::stdout(),
            );
            return Ok(());
        }
        Sass(opts) | SassWatch(opts) => opts.clone(),
    };

    let cwd = env::current_dir().wrap_err("Could not read the current dir")?;
    let mut cwd = Utf8PathBuf::from_path_buf(cwd)
        .map_err(|p| eyre!("Current dir is not UTF-8: {p:?}"))?;
    cwd.clean_windows_path();

    let config = Config::load(opts, &cwd, args.config.as_deref()).dot()?;
    env::set_current_dir(&config.working_dir).dot()?;
    debug!(
        "Path working dir {}",
        GRAY.paint(config.working_dir.as_str())
    );

    let _monitor = Interrupt::run_ctrl_c_monitor();
    match args.command {
        Sass(_) => command::build(&config.project).await,
        SassWatch(_) => {
            let rebuilds = command::watch(&config.project).await?;
            debug!("Watch stopped after {rebuilds} rebuild(s)");
            Ok(())
        }
        Completions { .. } => unreachable!(r#""completions" command should have already been run"#),
    }
}

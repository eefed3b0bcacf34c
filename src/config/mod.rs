
mod cli;
mod project;
mod sass;

use crate::{ext::PathExt, internal_prelude::*, logger::GRAY};
use camino::{Utf8Path, Utf8PathBuf};
use std::{fs, sync::Arc};

pub use cli::{Cli, Commands, Log, Opts};
pub use project::{Compiler, Project, WatchConfig};
pub use sass::{CompilerKind, OutputStyle, SassConfig};

pub const DEFAULT_CONFIG_FILE: &str = "sass.toml";

#[derive(Debug)]
pub struct Config {
    /// absolute path to the dir holding the configuration file
    pub working_dir: Utf8PathBuf,
    pub project: Arc<Project>,
}

impl Config {
    /// Reads the configuration file, `sass.toml` in `cwd` unless another is given.
    /// A missing default file means all defaults.
    pub fn load(cli: Opts, cwd: &Utf8Path, config_file: Option<&Utf8Path>) -> Result<Self> {
        let file = cwd
            .join(config_file.unwrap_or(Utf8Path::new(DEFAULT_CONFIG_FILE)))
            .normalized();

        let conf = if file.exists() {
            read_config(&file)?
        } else if config_file.is_some() {
            bail!("Configuration file {file} not found");
        } else {
            debug!(
                "Config no {DEFAULT_CONFIG_FILE} in {}, using defaults",
                GRAY.paint(cwd)
            );
            SassConfig::default()
        };

        let working_dir = file.parent().map(Utf8Path::to_path_buf).unwrap_or_else(|| cwd.to_path_buf());
        let project = Project::resolve(&conf, &working_dir, &cli)
            .wrap_err(format!("Invalid configuration {file}"))?;

        Ok(Self {
            working_dir,
            project: Arc::new(project),
        })
    }
}

pub fn read_config(file: &Utf8Path) -> Result<SassConfig> {
    let text = fs::read_to_string(file).wrap_err(format!("Could not read {file}"))?;
    trace!("Config file content:\n{text}");
    parse_config(&text).wrap_err(format!("Could not parse {file}"))
}

pub fn parse_config(text: &str) -> Result<SassConfig> {
    let file: sass::ConfigFile = toml::from_str(text)?;
    Ok(file.sass)
}

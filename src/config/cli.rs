use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum Log {
    /// File system watcher (notify)
    Watch,
    /// Stylesheet compiler and css printer (grass, lightningcss)
    Css,
}

#[derive(Debug, Clone, Parser, PartialEq, Default)]
pub struct Opts {
    /// Compressed output, minified for the configured browserquery.
    #[arg(short, long)]
    pub release: bool,

    /// Verbosity (none: info, errors & warnings, -v: verbose, -vv: very verbose).
    #[arg(short, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Parser)]
#[clap(version)]
pub struct Cli {
    /// Path to the configuration file. Defaults to `sass.toml` in the current dir.
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Output logs from dependencies (multiple --log accepted).
    #[arg(long)]
    pub log: Vec<Log>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn opts(&self) -> Option<Opts> {
        match &self.command {
            Commands::Sass(opts) | Commands::SassWatch(opts) => Some(opts.clone()),
            Commands::Completions { .. } => None,
        }
    }
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum Commands {
    /// Compile the configured stylesheets to css with source maps.
    Sass(Opts),
    /// Compile once, then recompile whenever a watched stylesheet changes.
    #[command(name = "sass:watch")]
    SassWatch(Opts),
    /// Generate shell completions for `sass-task`
    Completions { shell: Shell },
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8Path;

    #[test]
    fn task_names_match_the_task_runner() {
        let cli = Cli::parse_from(["sass-task", "sass:watch", "-vv"]);
        assert_eq!(
            cli.command,
            Commands::SassWatch(Opts {
                release: false,
                verbose: 2
            })
        );

        let cli = Cli::parse_from(["sass-task", "--config", "web/sass.toml", "sass", "-r"]);
        assert_eq!(cli.config.as_deref(), Some(Utf8Path::new("web/sass.toml")));
        assert!(cli.opts().unwrap().release);
    }

    #[test]
    fn completions_have_no_opts() {
        let cli = Cli::parse_from(["sass-task", "completions", "bash"]);
        assert_eq!(cli.opts(), None);
    }
}

use crate::{ext::PathExt, internal_prelude::*, logger::GRAY};
use camino::{Utf8Path, Utf8PathBuf};
use globset::{GlobBuilder, GlobMatcher};
use itertools::Itertools;
use lightningcss::targets::{Browsers, Targets};
use std::{fmt::Debug, time::Duration};

use super::{
    cli::Opts,
    sass::{CompilerKind, OutputStyle, SassConfig},
};

/// The stylesheet tasks, with every path resolved against the working dir.
pub struct Project {
    /// absolute path to the working dir, where the configuration file lives
    pub working_dir: Utf8PathBuf,
    pub entries: Vec<Utf8PathBuf>,
    pub include_paths: Vec<Utf8PathBuf>,
    pub dest: Utf8PathBuf,
    pub watch: WatchConfig,
    pub style: OutputStyle,
    pub release: bool,
    pub compiler: Compiler,
    pub browserquery: String,
    pub targets: Targets,
}

impl Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("working_dir", &self.working_dir)
            .field("entries", &self.entries)
            .field("include_paths", &self.include_paths)
            .field("dest", &self.dest)
            .field("watch", &self.watch)
            .field("style", &self.style)
            .field("release", &self.release)
            .field("compiler", &self.compiler)
            .field("browserquery", &self.browserquery)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub glob: GlobMatcher,
    pub include_paths: bool,
    pub debounce: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compiler {
    Grass,
    DartSass { exe: Utf8PathBuf },
}

impl Project {
    pub fn resolve(conf: &SassConfig, working_dir: &Utf8Path, cli: &Opts) -> Result<Self> {
        ensure!(
            !conf.source.is_empty(),
            "No stylesheet to compile, set `source` in the [sass] section"
        );
        let resolve = |path: &Utf8PathBuf| working_dir.join(path).normalized();

        let dest = resolve(&conf.dest);
        ensure!(
            !conf.source.iter().any(|s| resolve(s).parent() == Some(dest.as_path())
                && s.is_ext_any(&["css"])),
            "The dest dir {dest} would overwrite a css source"
        );

        let entries: Vec<Utf8PathBuf> = conf.source.iter().map(resolve).collect();
        if let Some(stem) = entries
            .iter()
            .filter(|e| !e.is_partial())
            .filter_map(|e| e.file_stem())
            .duplicates()
            .next()
        {
            bail!("Two sources would both be compiled to {dest}/{stem}.css");
        }

        let style = if cli.release {
            OutputStyle::Compressed
        } else {
            conf.style
        };

        Ok(Self {
            working_dir: working_dir.to_path_buf(),
            entries,
            include_paths: conf.include_paths.iter().map(resolve).collect(),
            dest,
            watch: WatchConfig {
                glob: watch_glob(&conf.watch)?,
                include_paths: conf.watch_include_paths,
                debounce: Duration::from_millis(conf.debounce_ms),
            },
            style,
            release: cli.release,
            compiler: Compiler::resolve(conf, working_dir)?,
            browserquery: conf.browserquery.clone(),
            targets: Targets::from(browser_lists(&conf.browserquery)?),
        })
    }
}

impl Compiler {
    fn resolve(conf: &SassConfig, working_dir: &Utf8Path) -> Result<Self> {
        Ok(match conf.compiler {
            CompilerKind::Grass => Self::Grass,
            CompilerKind::DartSass => {
                let exe = match &conf.sass_exe {
                    Some(exe) => working_dir.join(exe).normalized(),
                    None => {
                        let found = which::which("sass").wrap_err(
                            "Could not find the Dart Sass executable `sass` on PATH, install it or set `sass-exe`",
                        )?;
                        Utf8PathBuf::from_path_buf(found)
                            .map_err(|p| eyre!("Non UTF-8 path to sass: {p:?}"))?
                    }
                };
                debug!("Sass using Dart Sass {}", GRAY.paint(&exe));
                Self::DartSass { exe }
            }
        })
    }
}

/// `*` does not cross `/`, so `*.scss` only matches files directly in the working dir.
fn watch_glob(pattern: &str) -> Result<GlobMatcher> {
    Ok(GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .wrap_err(format!("Invalid watch glob {pattern:?}"))?
        .compile_matcher())
}

fn browser_lists(query: &str) -> Result<Option<Browsers>> {
    Browsers::from_browserslist([query]).wrap_err(format!("Error in browserlist query: {query}"))
}

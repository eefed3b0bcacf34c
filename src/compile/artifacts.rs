use crate::{ext::PathExt, internal_prelude::*};
use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Where the compiled css and its source map go, for one entry stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    pub css: Utf8PathBuf,
    pub map: Utf8PathBuf,
    /// the entry stylesheet as seen from the dest dir, listed in the map's `sources`
    pub map_source: Utf8PathBuf,
}

impl OutputFiles {
    pub fn new(dest: &Utf8Path, entry: &Utf8Path) -> Result<Self> {
        let stem = entry
            .file_stem()
            .wrap_err_with(|| format!("Stylesheet without a file name: {entry}"))?;
        let css = dest.join(format!("{stem}.css"));
        let map = dest.join(format!("{stem}.css.map"));
        Ok(Self {
            css,
            map,
            map_source: entry.relative_from(dest)?,
        })
    }

    pub fn css_name(&self) -> &str {
        self.css.file_name().unwrap_or(self.css.as_str())
    }

    pub fn map_name(&self) -> &str {
        self.map.file_name().unwrap_or(self.map.as_str())
    }

    /// names the css produced by the in-process compiler, before printing
    pub fn compiled_source(&self) -> String {
        format!("{}.css", self.map_source)
    }
}

/// Everything one compile produced, nothing is written yet.
#[derive(Debug, Clone)]
pub struct BuildArtifacts {
    pub entry: Utf8PathBuf,
    pub outputs: OutputFiles,
    /// ends with the reference to the map
    pub css: String,
    /// source map v3 json
    pub map: String,
    /// every stylesheet read by the compiler, the entry included
    pub loaded: Vec<Utf8PathBuf>,
}

#[derive(Debug, Error)]
pub enum CompileError {
    /// syntax error or unresolved import
    #[error("error in {entry}:\n{message}")]
    Sass { entry: Utf8PathBuf, message: String },
    #[error("could not print css for {entry}: {message}")]
    Css { entry: Utf8PathBuf, message: String },
    #[error("{exe} failed on {entry}:\n{message}")]
    Process {
        exe: Utf8PathBuf,
        entry: Utf8PathBuf,
        message: String,
    },
}

/// Compile errors are reported, not propagated, so that the next save can retry.
pub fn report(err: &CompileError) {
    error!("Sass {err}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outputs_sit_in_dest_and_point_back_at_the_entry() {
        let out = OutputFiles::new(
            Utf8Path::new("/site/scss/../css"),
            Utf8Path::new("/site/scss/frontpage.scss"),
        )
        .unwrap();

        assert_eq!(out.css, "/site/scss/../css/frontpage.css");
        assert_eq!(out.map_name(), "frontpage.css.map");
        assert_eq!(out.css_name(), "frontpage.css");
        assert_eq!(out.map_source, "../scss/frontpage.scss");
        assert_eq!(out.compiled_source(), "../scss/frontpage.scss.css");
    }
}

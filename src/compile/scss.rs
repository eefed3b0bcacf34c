//! In-process compile with [`grass`].

use super::{
    artifacts::{BuildArtifacts, CompileError, OutputFiles},
    sourcemap::{self, LoadedSource},
};
use crate::{config::Project, internal_prelude::*, logger::GRAY};
use camino::{Utf8Path, Utf8PathBuf};
use std::{io, path::Path, sync::Mutex};

/// Reads from disk and remembers every stylesheet the compiler loaded, with
/// its content, so that imports show up in the source map.
#[derive(Debug, Default)]
struct TrackingFs {
    loaded: Mutex<Vec<LoadedSource>>,
}

impl TrackingFs {
    fn loaded(self) -> Vec<LoadedSource> {
        self.loaded.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl grass::Fs for TrackingFs {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        trace!("Sass reading {}", GRAY.paint(path.display()));
        let data = std::fs::read(path)?;
        // non UTF-8 paths still compile, they are only left out of the map
        if let (Ok(mut loaded), Ok(path)) = (
            self.loaded.lock(),
            Utf8PathBuf::from_path_buf(path.to_path_buf()),
        ) {
            if !loaded.iter().any(|l| l.path == path) {
                loaded.push(LoadedSource {
                    path,
                    content: String::from_utf8_lossy(&data).into_owned(),
                });
            }
        }
        Ok(data)
    }
}

/// Compiles one entry stylesheet to css and its source map. Writes nothing.
pub fn compile(
    proj: &Project,
    entry: &Utf8Path,
    outputs: &OutputFiles,
) -> Result<BuildArtifacts, CompileError> {
    let fs = TrackingFs::default();
    let mut options = grass::Options::default()
        .fs(&fs)
        .style(proj.style.into());
    for dir in &proj.include_paths {
        options = options.load_path(dir);
    }

    let css = grass::from_path(entry, &options).map_err(|e| CompileError::Sass {
        entry: entry.to_path_buf(),
        message: e.to_string(),
    })?;
    drop(options);
    let loaded = fs.loaded();

    let printed = sourcemap::print(&css, proj, outputs, &loaded).map_err(|e| CompileError::Css {
        entry: entry.to_path_buf(),
        message: format!("{e:#}"),
    })?;

    debug!(
        "Sass {} loaded {} stylesheet(s)",
        GRAY.paint(entry),
        loaded.len()
    );

    Ok(BuildArtifacts {
        entry: entry.to_path_buf(),
        outputs: outputs.clone(),
        css: printed.css,
        map: printed.map,
        loaded: loaded.into_iter().map(|l| l.path).collect(),
    })
}

use crate::{
    compile::Change,
    config::Project,
    ext::{fs::remove_nested, PathExt},
    internal_prelude::*,
    logger::GRAY,
    signal::Interrupt,
};
use camino::{Utf8Path, Utf8PathBuf};
use globset::GlobMatcher;
use itertools::Itertools;
use notify_debouncer_full::{
    new_debouncer,
    notify::{
        event::{CreateKind, ModifyKind, RemoveKind, RenameMode},
        EventKind, RecursiveMode,
    },
    DebounceEventResult, DebouncedEvent,
};
use std::{fmt::Display, path::Path, sync::Arc};
use tokio::task::JoinHandle;

/// Watches the stylesheets and records a [`Change`] for every debounced
/// batch that touches one of them.
pub fn spawn(proj: &Arc<Project>) -> Result<JoinHandle<()>> {
    let filter = WatchFilter::new(proj);
    let roots = filter.roots();
    info!(
        "Notify watching {}",
        GRAY.paint(roots.iter().map(|(p, _)| p).join(", "))
    );

    let mut debouncer = new_debouncer(
        proj.watch.debounce,
        None,
        batch_handler(filter, |changes| Interrupt::send(&changes)),
    )
    .wrap_err("Could not start the file watcher")?;

    for (path, mode) in &roots {
        debouncer
            .watch(path.as_std_path(), *mode)
            .wrap_err(format!("Could not watch {path}"))?;
    }

    Ok(tokio::spawn(async move {
        if let Err(e) = Interrupt::subscribe_shutdown().recv().await {
            trace!("Notify stopped due to: {e:?}");
        }
        drop(debouncer);
        debug!("Notify stopped");
    }))
}

/// Turns each debounced batch into changes and hands them to `sink`,
/// at most once per batch.
pub fn batch_handler(
    filter: WatchFilter,
    mut sink: impl FnMut(Vec<Change>) + Send + 'static,
) -> impl FnMut(DebounceEventResult) + Send + 'static {
    move |res: DebounceEventResult| match res {
        Ok(events) => {
            let mut changes: Vec<Change> = Vec::new();
            for event in &events {
                match Watched::try_new(event) {
                    Ok(Some(watched)) => match filter.change_for(&watched) {
                        Some(change) => {
                            debug!("Notify {} {}", change, GRAY.paint(&watched));
                            if !changes.contains(&change) {
                                changes.push(change);
                            }
                        }
                        None => trace!("Notify changed but not watched: {}", GRAY.paint(&watched)),
                    },
                    Ok(None) => trace!("Notify not handled {}", GRAY.paint(format!("{event:?}"))),
                    Err(e) => error!("Notify error {e}"),
                }
            }
            if !changes.is_empty() {
                sink(changes);
            }
        }
        Err(errors) => {
            for e in errors {
                error!("Notify watch error: {e}");
            }
        }
    }
}

/// Decides which file system events concern the build.
#[derive(Debug, Clone)]
pub struct WatchFilter {
    root: Utf8PathBuf,
    glob: GlobMatcher,
    include_dirs: Vec<Utf8PathBuf>,
}

impl WatchFilter {
    pub fn new(proj: &Project) -> Self {
        let include_dirs = if proj.watch.include_paths {
            proj.include_paths.clone()
        } else {
            Vec::new()
        };
        Self {
            root: proj.working_dir.clone(),
            glob: proj.watch.glob.clone(),
            include_dirs,
        }
    }

    /// The directories to watch. The working dir is only watched recursively
    /// when the glob can match below it.
    pub fn roots(&self) -> Vec<(Utf8PathBuf, RecursiveMode)> {
        let root_mode = if self.glob.glob().glob().contains('/') {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        let mut roots = vec![(self.root.clone(), root_mode)];

        let dirs = self
            .include_dirs
            .iter()
            .filter(|dir| {
                let inside = root_mode == RecursiveMode::Recursive && dir.starts_with(&self.root);
                !inside && dir.exists()
            })
            .cloned();
        roots.extend(
            remove_nested(dirs)
                .into_iter()
                .map(|dir| (dir, RecursiveMode::Recursive)),
        );
        roots
    }

    pub fn change_for(&self, watched: &Watched) -> Option<Change> {
        match watched {
            Watched::Rescan => Some(Change::Rescan),
            Watched::Rename(from, to) => self.path_change(to).or_else(|| self.path_change(from)),
            Watched::Write(p) | Watched::Create(p) | Watched::Remove(p) => self.path_change(p),
        }
    }

    fn path_change(&self, path: &Utf8Path) -> Option<Change> {
        if let Some(rel) = path.unbase(&self.root) {
            if self.glob.is_match(rel.as_std_path()) {
                return Some(Change::Source(rel));
            }
        }
        let included = self.include_dirs.iter().any(|dir| path.starts_with(dir));
        if included && path.is_ext_any(&["scss", "sass", "css"]) {
            return Some(Change::Include(path.to_path_buf()));
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Watched {
    Remove(Utf8PathBuf),
    Rename(Utf8PathBuf, Utf8PathBuf),
    Write(Utf8PathBuf),
    Create(Utf8PathBuf),
    Rescan,
}

fn convert(p: &Path) -> Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(p.to_path_buf())
        .map_err(|e| eyre!("Could not convert to a Utf8PathBuf: {e:?}"))
}

fn first_path(event: &DebouncedEvent) -> Result<Utf8PathBuf> {
    convert(event.paths.first().wrap_err("Event without a path")?)
}

impl Watched {
    pub fn try_new(event: &DebouncedEvent) -> Result<Option<Self>> {
        if event.need_rescan() {
            return Ok(Some(Self::Rescan));
        }
        Ok(match event.kind {
            EventKind::Modify(ModifyKind::Name(mode)) => match (mode, event.paths.as_slice()) {
                (_, [from, to]) => Some(Self::Rename(convert(from)?, convert(to)?)),
                // the debouncer could not pair both sides of the rename
                (RenameMode::From, _) => Some(Self::Remove(first_path(event)?)),
                (RenameMode::To, _) => Some(Self::Create(first_path(event)?)),
                (_, [path]) => Some(Self::Write(convert(path)?)),
                _ => None,
            },
            EventKind::Modify(ModifyKind::Metadata(_)) => None,
            EventKind::Modify(_) => Some(Self::Write(first_path(event)?)),
            EventKind::Create(CreateKind::File | CreateKind::Any) => {
                Some(Self::Create(first_path(event)?))
            }
            EventKind::Remove(RemoveKind::File | RemoveKind::Any) => {
                Some(Self::Remove(first_path(event)?))
            }
            _ => None,
        })
    }
}

impl Display for Watched {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create(p) => write!(f, "create {p}"),
            Self::Remove(p) => write!(f, "remove {p}"),
            Self::Write(p) => write!(f, "write {p}"),
            Self::Rename(fr, to) => write!(f, "rename {fr} -> {to}"),
            Self::Rescan => write!(f, "rescan"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Opts};
    use std::{
        fs,
        sync::mpsc,
        time::{Duration, Instant},
    };
    use temp_dir::TempDir;

    fn load(root: &Utf8Path, sass_toml: &str) -> Config {
        fs::write(root.join("sass.toml"), sass_toml).unwrap();
        let opts = Opts {
            release: false,
            verbose: 0,
        };
        Config::load(opts, root, None).unwrap()
    }

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn only_matching_stylesheets_count() {
        let dir = TempDir::new().unwrap();
        let root = utf8(&dir);
        let conf = load(
            &root,
            "[sass]\ninclude-paths = [\"../vendor\"]\nwatch-include-paths = true\n",
        );
        let filter = WatchFilter::new(&conf.project);
        let vendor = root.parent().unwrap().join("vendor");

        assert_eq!(
            filter.change_for(&Watched::Write(root.join("_grid.scss"))),
            Some(Change::Source("_grid.scss".into()))
        );
        assert_eq!(filter.change_for(&Watched::Write(root.join("notes.txt"))), None);
        assert_eq!(
            filter.change_for(&Watched::Write(root.join("sub/_grid.scss"))),
            None
        );
        assert_eq!(
            filter.change_for(&Watched::Remove(vendor.join("grid/_cell.scss"))),
            Some(Change::Include(vendor.join("grid/_cell.scss")))
        );
        assert_eq!(
            filter.change_for(&Watched::Rename(
                root.join(".main.scss.swp"),
                root.join("main.scss")
            )),
            Some(Change::Source("main.scss".into()))
        );
        assert_eq!(filter.change_for(&Watched::Rescan), Some(Change::Rescan));
    }

    #[test]
    fn include_paths_are_ignored_unless_asked() {
        let dir = TempDir::new().unwrap();
        let root = utf8(&dir);
        fs::create_dir(root.join("vendor")).unwrap();
        let conf = load(&root, "[sass]\ninclude-paths = [\"vendor\"]\n");
        let filter = WatchFilter::new(&conf.project);

        assert_eq!(
            filter.change_for(&Watched::Write(root.join("vendor/_grid.scss"))),
            None
        );
        assert_eq!(
            filter.roots(),
            vec![(root.clone(), RecursiveMode::NonRecursive)]
        );
    }

    #[test]
    fn roots_skip_missing_and_nested_dirs() {
        let dir = TempDir::new().unwrap();
        let root = utf8(&dir);
        fs::create_dir_all(root.join("lib/grid")).unwrap();
        let conf = load(
            &root,
            "[sass]\ninclude-paths = [\"lib/grid\", \"lib\", \"missing\"]\nwatch-include-paths = true\n",
        );

        assert_eq!(
            WatchFilter::new(&conf.project).roots(),
            vec![
                (root.clone(), RecursiveMode::NonRecursive),
                (root.join("lib"), RecursiveMode::Recursive),
            ]
        );
    }

    #[test]
    fn one_save_gives_one_batch() {
        let dir = TempDir::new().unwrap();
        let root = utf8(&dir);
        let conf = load(&root, "");
        let file = root.join("main.scss");
        fs::write(&file, "a { color: red; }\n").unwrap();

        let (tx, rx) = mpsc::channel();
        let handler = batch_handler(WatchFilter::new(&conf.project), move |changes| {
            _ = tx.send(changes);
        });
        let mut debouncer = new_debouncer(Duration::from_millis(100), None, handler).unwrap();
        debouncer
            .watch(root.as_std_path(), RecursiveMode::NonRecursive)
            .unwrap();

        let start = Instant::now();
        fs::write(&file, "a { color: blue; }\n").unwrap();
        fs::write(root.join("notes.txt"), "not a stylesheet").unwrap();

        let batch = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(100));
        assert_eq!(batch, vec![Change::Source("main.scss".into())]);
        assert!(rx.recv_timeout(Duration::from_millis(500)).is_err());
    }
}

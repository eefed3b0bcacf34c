use crate::internal_prelude::*;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

pub trait PathExt {
    /// converts this absolute path to relative if the start matches
    fn unbase(&self, base: &Utf8Path) -> Option<Utf8PathBuf>;

    /// lexically removes `.` and `..` components, without touching the file system
    fn normalized(&self) -> Utf8PathBuf;

    /// the path of `self` as seen from the directory `base`
    fn relative_from(&self, base: &Utf8Path) -> Result<Utf8PathBuf>;

    /// file names starting with `_` are partials, only meant to be imported
    fn is_partial(&self) -> bool;

    fn is_ext_any(&self, exts: &[&str]) -> bool;
}

impl PathExt for Utf8Path {
    fn unbase(&self, base: &Utf8Path) -> Option<Utf8PathBuf> {
        self.strip_prefix(base).ok().map(Utf8Path::to_path_buf)
    }

    fn normalized(&self) -> Utf8PathBuf {
        let mut out = Utf8PathBuf::new();
        for comp in self.components() {
            match comp {
                Utf8Component::CurDir => {}
                Utf8Component::ParentDir => match out.components().next_back() {
                    Some(Utf8Component::Normal(_)) => {
                        out.pop();
                    }
                    // `/..` is `/`
                    Some(Utf8Component::RootDir) | Some(Utf8Component::Prefix(_)) => {}
                    _ => out.push(".."),
                },
                other => out.push(other.as_str()),
            }
        }
        out
    }

    fn relative_from(&self, base: &Utf8Path) -> Result<Utf8PathBuf> {
        pathdiff::diff_utf8_paths(self.normalized(), base.normalized())
            .wrap_err_with(|| format!("Could not make {self} relative to {base}"))
    }

    fn is_partial(&self) -> bool {
        self.file_name().is_some_and(|name| name.starts_with('_'))
    }

    fn is_ext_any(&self, exts: &[&str]) -> bool {
        self.extension().is_some_and(|ext| exts.contains(&ext))
    }
}

impl PathExt for Utf8PathBuf {
    fn unbase(&self, base: &Utf8Path) -> Option<Utf8PathBuf> {
        self.as_path().unbase(base)
    }

    fn normalized(&self) -> Utf8PathBuf {
        self.as_path().normalized()
    }

    fn relative_from(&self, base: &Utf8Path) -> Result<Utf8PathBuf> {
        self.as_path().relative_from(base)
    }

    fn is_partial(&self) -> bool {
        self.as_path().is_partial()
    }

    fn is_ext_any(&self, exts: &[&str]) -> bool {
        self.as_path().is_ext_any(exts)
    }
}

pub trait PathBufExt: PathExt {
    /// on windows, strips the verbatim `\\?\` prefix left by canonicalize
    fn clean_windows_path(&mut self);
}

impl PathBufExt for Utf8PathBuf {
    fn clean_windows_path(&mut self) {
        if cfg!(windows) {
            let cleaned = self.as_str().trim_start_matches(r"\\?\");
            *self = Utf8PathBuf::from(cleaned);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_folds_parent_dirs() {
        let p = Utf8PathBuf::from("/work/scss/../css/./out");
        assert_eq!(p.normalized(), "/work/css/out");
        assert_eq!(Utf8PathBuf::from("../css").normalized(), "../css");
        assert_eq!(Utf8PathBuf::from("a/../../b").normalized(), "../b");
    }

    #[test]
    fn relative_from_walks_up_out_of_dest() {
        let src = Utf8PathBuf::from("/work/scss/frontpage.scss");
        let dest = Utf8PathBuf::from("/work/scss/../css");
        assert_eq!(src.relative_from(&dest).unwrap(), "../scss/frontpage.scss");
    }

    #[test]
    fn partials_and_extensions() {
        assert!(Utf8PathBuf::from("lib/_grid.scss").is_partial());
        assert!(!Utf8PathBuf::from("_lib/grid.scss").is_partial());
        assert!(Utf8PathBuf::from("grid.sass").is_ext_any(&["scss", "sass"]));
        assert!(!Utf8PathBuf::from("grid.css.map").is_ext_any(&["css"]));
    }
}

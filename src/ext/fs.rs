use crate::internal_prelude::*;
use std::path::Path;
use tokio::fs;

pub async fn write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
    fs::write(&path, contents)
        .await
        .wrap_err(format!("Could not write to {:?}", path.as_ref()))
}

/// Returns false when the file already holds exactly `contents`.
pub async fn write_if_changed<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    contents: C,
) -> Result<bool> {
    let new_hash = seahash::hash(contents.as_ref());
    if file_hash(&path).await? == Some(new_hash) {
        return Ok(false);
    }
    self::write(&path, contents).await?;
    Ok(true)
}

/// Hash of the file content, or `None` if there is no such file.
pub async fn file_hash<P: AsRef<Path>>(path: P) -> Result<Option<u64>> {
    if !path.as_ref().exists() {
        return Ok(None);
    }
    let data = self::read(&path).await?;
    Ok(Some(seahash::hash(&data)))
}

pub async fn create_dir_all<P: AsRef<Path>>(path: P) -> Result<()> {
    fs::create_dir_all(&path)
        .await
        .wrap_err(format!("Could not create {:?}", path.as_ref()))
}

pub async fn read<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    fs::read(&path)
        .await
        .wrap_err(format!("Could not read {:?}", path.as_ref()))
}

pub fn remove_nested<P: AsRef<Path>>(paths: impl IntoIterator<Item = P>) -> Vec<P> {
    paths.into_iter().fold(vec![], |mut vec, path| {
        for added in vec.iter_mut() {
            // path is a parent folder of added
            if added.as_ref().starts_with(path.as_ref()) {
                *added = path;
                return vec;
            }
            // path is a sub folder of added
            if path.as_ref().starts_with(added.as_ref()) {
                return vec;
            }
        }
        vec.push(path);
        vec
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use temp_dir::TempDir;

    #[tokio::test]
    async fn write_if_changed_skips_identical_content() {
        let dir = TempDir::new().unwrap();
        let file = dir.child("main.css");

        assert!(write_if_changed(&file, "a {}").await.unwrap());
        assert!(!write_if_changed(&file, "a {}").await.unwrap());
        assert!(write_if_changed(&file, "b {}").await.unwrap());
        assert_eq!(read(&file).await.unwrap(), b"b {}");
    }

    #[test]
    fn remove_nested_keeps_outermost() {
        let paths = vec![
            Utf8PathBuf::from("/w/scss/vendor"),
            Utf8PathBuf::from("/w/scss"),
            Utf8PathBuf::from("/w/lib"),
            Utf8PathBuf::from("/w/lib/partials"),
        ];
        assert_eq!(
            remove_nested(paths),
            vec![Utf8PathBuf::from("/w/scss"), Utf8PathBuf::from("/w/lib")]
        );
    }
}

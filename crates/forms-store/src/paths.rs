use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// All well-known paths under `.forms/`.
#[derive(Debug, Clone)]
pub struct FormsPaths {
    pub root: PathBuf,
    pub forms_dir: PathBuf,
    pub db_path: PathBuf,
    pub config_json: PathBuf,
    pub media_dir: PathBuf,
}

impl FormsPaths {
    /// Derive all paths from a workspace root. Pure computation, no I/O.
    pub fn discover(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let forms_dir = root.join(".forms");
        Self {
            db_path: forms_dir.join("forms.db"),
            config_json: forms_dir.join("config.json"),
            media_dir: forms_dir.join("media"),
            forms_dir,
            root,
        }
    }

    /// Create `.forms/` and `.forms/media/`. Idempotent.
    pub fn ensure_layout(&self) -> crate::Result<()> {
        fs::create_dir_all(&self.media_dir)?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.forms_dir.is_dir()
    }

    /// Walk up from `start` looking for a directory containing `.forms/`.
    pub fn find_root(start: &Path) -> Option<PathBuf> {
        let mut cur = start.to_path_buf();
        loop {
            if cur.join(".forms").is_dir() {
                return Some(cur);
            }
            if !cur.pop() {
                return None;
            }
        }
    }
}

/// Atomic write: write to temp file in same dir, then rename.
pub fn write_atomic(path: &Path, data: &[u8]) -> crate::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("no parent dir for {}", path.display()),
        )
    })?;
    fs::create_dir_all(parent)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discover_builds_correct_paths() {
        let p = FormsPaths::discover("/tmp/journal");
        assert_eq!(p.forms_dir, PathBuf::from("/tmp/journal/.forms"));
        assert_eq!(p.db_path, PathBuf::from("/tmp/journal/.forms/forms.db"));
        assert_eq!(
            p.config_json,
            PathBuf::from("/tmp/journal/.forms/config.json")
        );
        assert_eq!(p.media_dir, PathBuf::from("/tmp/journal/.forms/media"));
    }

    #[test]
    fn find_root_walks_up() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = FormsPaths::discover(tmp.path());
        paths.ensure_layout().unwrap();
        let nested = tmp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(FormsPaths::find_root(&nested), Some(tmp.path().to_path_buf()));
    }

    #[test]
    fn write_atomic_creates_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.json");
        write_atomic(&path, b"{}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }
}

//! Script references: path resolution and display names.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use super::RunError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRef {
    path: PathBuf,
}

/// A resolved script whose source has been read.
#[derive(Debug, Clone)]
pub struct LoadedScript {
    pub path: PathBuf,
    pub display_name: String,
    pub source: String,
}

impl ScriptRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path component only; banners never show directories.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }

    /// Relative references are joined onto `base_dir` when one is given.
    pub fn resolve(&self, base_dir: Option<&Path>) -> PathBuf {
        match base_dir {
            Some(base) if self.path.is_relative() => base.join(&self.path),
            _ => self.path.clone(),
        }
    }

    /// Resolve and read the script. Any failure here is `NotFound`.
    pub fn load(&self, base_dir: Option<&Path>) -> Result<LoadedScript, RunError> {
        let path = self.resolve(base_dir);
        if path.is_dir() {
            return Err(RunError::NotFound {
                source: io::Error::new(io::ErrorKind::Other, "is a directory"),
                path,
            });
        }
        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(source) => return Err(RunError::NotFound { path, source }),
        };
        Ok(LoadedScript { display_name: self.display_name(), path, source })
    }
}

impl From<&Path> for ScriptRef {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

impl From<&str> for ScriptRef {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<PathBuf> for ScriptRef {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

impl From<&PathBuf> for ScriptRef {
    fn from(path: &PathBuf) -> Self {
        Self::new(path.clone())
    }
}

impl From<&String> for ScriptRef {
    fn from(path: &String) -> Self {
        Self::new(path.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_drops_directories() {
        let r = ScriptRef::new("analysis/2024/telemetry/03_detections.rhai");
        assert_eq!(r.display_name(), "03_detections.rhai");
    }

    #[test]
    fn relative_paths_join_base_dir() {
        let r = ScriptRef::new("clean.rhai");
        assert_eq!(r.resolve(Some(Path::new("/srv/scripts"))), PathBuf::from("/srv/scripts/clean.rhai"));
        assert_eq!(r.resolve(None), PathBuf::from("clean.rhai"));
    }

    #[cfg(unix)]
    #[test]
    fn absolute_paths_ignore_base_dir() {
        let r = ScriptRef::new("/opt/clean.rhai");
        assert_eq!(r.resolve(Some(Path::new("/srv/scripts"))), PathBuf::from("/opt/clean.rhai"));
    }

    #[test]
    fn missing_and_directory_refs_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = ScriptRef::new("nope.rhai").load(Some(dir.path()));
        assert!(matches!(missing, Err(RunError::NotFound { .. })));

        let as_dir = ScriptRef::new(dir.path()).load(None);
        assert!(matches!(as_dir, Err(RunError::NotFound { .. })));
    }

    #[test]
    fn non_utf8_file_names_the_read_failure() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bin.rhai"), [0xff, 0xfe, 0x00]).unwrap();
        let err = ScriptRef::new("bin.rhai").load(Some(dir.path())).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("cannot read script "), "{}", message);
        assert!(message.contains("bin.rhai"), "{}", message);
    }

    #[test]
    fn load_reads_source() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rhai"), "let a = 1;").unwrap();
        let loaded = ScriptRef::new("a.rhai").load(Some(dir.path())).unwrap();
        assert_eq!(loaded.source, "let a = 1;");
        assert_eq!(loaded.display_name, "a.rhai");
    }
}

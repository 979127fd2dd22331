//! File target.

use std::any::Any;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::layout::Layout;
use crate::service::LogEvent;
use crate::targets::{Target, TargetError, TargetKind};

/// Appends rendered lines to a file.
///
/// The file and its parent directories are created on first write. With
/// `append = false` the file is truncated when it is first opened.
#[derive(Debug)]
pub struct FileTarget {
    name: String,
    path: PathBuf,
    layout: Layout,
    append: bool,
    file: Mutex<Option<File>>,
}

impl FileTarget {
    pub fn new(name: &str, path: impl AsRef<Path>, layout: Layout) -> Self {
        Self {
            name: name.to_string(),
            path: path.as_ref().to_path_buf(),
            layout,
            append: true,
            file: Mutex::new(None),
        }
    }

    pub fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> std::io::Result<File> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut options = OpenOptions::new();
        options.create(true);
        if self.append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }
        options.open(&self.path)
    }
}

impl Target for FileTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> TargetKind {
        TargetKind::File
    }

    fn write(&self, event: &LogEvent) -> Result<(), TargetError> {
        let line = self.layout.render(event);
        let mut guard = self.file.lock().unwrap_or_else(PoisonError::into_inner);

        if guard.is_none() {
            let file = self.open().map_err(|e| TargetError::io(&self.name, e))?;
            tracing::debug!(target_name = %self.name, path = ?self.path, "Log file opened");
            *guard = Some(file);
        }

        if let Some(file) = guard.as_mut() {
            if let Err(e) = writeln!(file, "{}", line) {
                *guard = None;
                return Err(TargetError::io(&self.name, e));
            }
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), TargetError> {
        let mut guard = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_mut() {
            Some(file) => file.flush().map_err(|e| TargetError::io(&self.name, e)),
            None => Ok(()),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{LogLevel, LogMessage};

    fn event(text: &str) -> LogEvent {
        LogEvent::new("test", LogMessage::new(LogLevel::Info, text))
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deep/app.log");
        let target = FileTarget::new("file", &path, Layout::parse("${message}").unwrap());

        target.write(&event("first")).unwrap();
        target.write(&event("second")).unwrap();
        target.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_truncates_when_not_appending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "old log data\n").unwrap();

        let target = FileTarget::new("file", &path, Layout::parse("${message}").unwrap())
            .with_append(false);
        target.write(&event("fresh")).unwrap();
        target.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "fresh\n");
    }

    #[test]
    fn test_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "old\n").unwrap();

        let target = FileTarget::new("file", &path, Layout::parse("${message}").unwrap());
        target.write(&event("new")).unwrap();
        target.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "old\nnew\n");
    }
}

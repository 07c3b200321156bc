/// Append-only record of filename changes
///
/// The photo store reports every rename (and every failed rename) to a
/// `RenameSink`. The UI reads the entries back line by line.
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub trait RenameSink: Send {
    fn record_rename(&mut self, old_name: &str, new_name: &str) -> Result<()>;

    fn record_failure(&mut self, path: &Path, error: &str) -> Result<()>;

    /// Every recorded line, oldest first
    fn entries(&self) -> Result<Vec<String>>;
}

pub fn rename_message(old_name: &str, new_name: &str) -> String {
    format!("Rename Photo from:{old_name} to:{new_name}")
}

fn timestamp() -> String {
    chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false)
}

/// Log file on disk, one event per line
#[derive(Debug, Clone)]
pub struct RenameLog {
    path: PathBuf,
}

impl RenameLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn append(&self, line: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

impl RenameSink for RenameLog {
    fn record_rename(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        self.append(&format!("{} INFO {}", timestamp(), rename_message(old_name, new_name)))
    }

    fn record_failure(&mut self, path: &Path, error: &str) -> Result<()> {
        self.append(&format!(
            "{} SEVERE Rename failed for {}: {}",
            timestamp(),
            path.display(),
            error
        ))
    }

    fn entries(&self) -> Result<Vec<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Sink kept in memory, for tests and throwaway sessions
#[derive(Debug, Default, Clone)]
pub struct MemoryRenameLog {
    lines: Vec<String>,
}

impl MemoryRenameLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenameSink for MemoryRenameLog {
    fn record_rename(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        self.lines.push(rename_message(old_name, new_name));
        Ok(())
    }

    fn record_failure(&mut self, path: &Path, error: &str) -> Result<()> {
        self.lines
            .push(format!("Rename failed for {}: {}", path.display(), error));
        Ok(())
    }

    fn entries(&self) -> Result<Vec<String>> {
        Ok(self.lines.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_log_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = RenameLog::new(dir.path().join("rename.log"));
        assert!(log.entries().unwrap().is_empty());
    }

    #[test]
    fn test_entries_are_appended_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("rename.log");
        let mut log = RenameLog::new(&path);

        log.record_rename("pic.jpg", "@Cat pic.jpg").unwrap();
        log.record_rename("@Cat pic.jpg", "pic.jpg").unwrap();
        log.record_failure(Path::new("/photos/x.jpg"), "denied").unwrap();

        let entries = log.entries().unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].ends_with("INFO Rename Photo from:pic.jpg to:@Cat pic.jpg"));
        assert!(entries[1].ends_with("Rename Photo from:@Cat pic.jpg to:pic.jpg"));
        assert!(entries[2].contains("SEVERE Rename failed for /photos/x.jpg: denied"));

        // A second handle on the same file sees the same history
        assert_eq!(RenameLog::new(&path).entries().unwrap(), entries);
    }

    #[test]
    fn test_memory_log() {
        let mut log = MemoryRenameLog::new();
        log.record_rename("a.jpg", "b.jpg").unwrap();
        assert_eq!(log.entries().unwrap(), vec!["Rename Photo from:a.jpg to:b.jpg"]);
    }
}

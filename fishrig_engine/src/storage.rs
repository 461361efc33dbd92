//! Where the queue file lives.
//!
//! The engine reads the whole file as lines and replaces the whole file at
//! the end of each pass. [`FileStorage`] swaps content in with a rename so a
//! crash mid-write leaves either the old or the new file, never a mix.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

/// Some editors put this in front of UTF-8 text; it is not part of the first line.
const BYTE_ORDER_MARK: char = '\u{feff}';

/// Failure of the storage collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("reading {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("writing {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Whole-file line storage for a queue.
pub trait QueueStorage {
    /// All lines in order, or `None` if the queue file doesn't exist.
    ///
    /// # Errors
    /// [`StorageError::Read`] if the file exists but can't be read.
    fn read_lines(&self) -> Result<Option<Vec<String>>, StorageError>;

    /// Replace the whole file with `lines`.
    ///
    /// # Errors
    /// [`StorageError::Write`] if the new content couldn't be put in place.
    fn write_lines(&mut self, lines: &[String]) -> Result<(), StorageError>;
}

/// A queue file on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_err(&self, source: io::Error) -> StorageError {
        StorageError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl QueueStorage for FileStorage {
    fn read_lines(&self) -> Result<Option<Vec<String>>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let text = raw.strip_prefix(BYTE_ORDER_MARK).unwrap_or(raw.as_str());
                Ok(Some(text.lines().map(str::to_string).collect()))
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn write_lines(&mut self, lines: &[String]) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|err| self.write_err(err))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|err| self.write_err(err))?;
        for line in lines {
            writeln!(tmp, "{line}").map_err(|err| self.write_err(err))?;
        }
        tmp.as_file().sync_all().map_err(|err| self.write_err(err))?;
        tmp.persist(&self.path).map_err(|err| self.write_err(err.error))?;
        Ok(())
    }
}

/// Queue lines held in memory, for embedding and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStorage {
    lines: Option<Vec<String>>,
    writes: usize,
}

impl MemoryStorage {
    /// A storage whose file doesn't exist yet.
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: Some(lines.into_iter().map(Into::into).collect()),
            writes: 0,
        }
    }

    pub fn lines(&self) -> Option<&[String]> {
        self.lines.as_deref()
    }

    /// Number of times the content was replaced.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl QueueStorage for MemoryStorage {
    fn read_lines(&self) -> Result<Option<Vec<String>>, StorageError> {
        Ok(self.lines.clone())
    }

    fn write_lines(&mut self, lines: &[String]) -> Result<(), StorageError> {
        self.lines = Some(lines.to_vec());
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn missing_file_reads_as_absent() -> Result<()> {
        let dir = tempdir()?;
        let storage = FileStorage::new(dir.path().join("queue.txt"));
        assert!(storage.read_lines()?.is_none());
        Ok(())
    }

    #[test]
    fn write_replaces_whole_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("queue.txt");
        fs::write(&path, "old\ncontent\nthat is longer\n")?;

        let mut storage = FileStorage::new(&path);
        storage.write_lines(&["#comment".to_string(), "cod".to_string()])?;

        assert_eq!(fs::read_to_string(&path)?, "#comment\ncod\n");
        assert_eq!(
            storage.read_lines()?,
            Some(vec!["#comment".to_string(), "cod".to_string()])
        );
        Ok(())
    }

    #[test]
    fn write_creates_missing_directories() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested/deeper/queue.txt");
        let mut storage = FileStorage::new(&path);
        storage.write_lines(&["cod".to_string()])?;
        assert!(path.is_file());
        Ok(())
    }

    #[test]
    fn crlf_lines_read_cleanly() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("queue.txt");
        fs::write(&path, "#a\r\ncod\r\n")?;
        let storage = FileStorage::new(&path);
        assert_eq!(storage.read_lines()?, Some(vec!["#a".to_string(), "cod".to_string()]));
        Ok(())
    }

    #[test]
    fn byte_order_mark_is_not_part_of_the_first_line() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("queue.txt");
        fs::write(&path, "\u{feff}#comment\r\ncod\r\n")?;
        let storage = FileStorage::new(&path);
        assert_eq!(storage.path(), path.as_path());
        assert_eq!(storage.read_lines()?, Some(vec!["#comment".to_string(), "cod".to_string()]));
        Ok(())
    }

    #[test]
    fn directory_in_place_of_file_is_a_read_error() -> Result<()> {
        let dir = tempdir()?;
        let storage = FileStorage::new(dir.path());
        assert!(matches!(storage.read_lines(), Err(StorageError::Read { .. })));
        Ok(())
    }

    #[test]
    fn memory_storage_counts_writes() -> Result<()> {
        let mut storage = MemoryStorage::with_lines(["cod"]);
        storage.write_lines(&[])?;
        assert_eq!(storage.writes(), 1);
        assert_eq!(storage.lines(), Some(&[][..]));
        Ok(())
    }
}

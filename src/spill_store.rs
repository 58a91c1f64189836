use std::fs::{File, OpenOptions};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Context;
use data_encoding::HEXLOWER;

pub(crate) const TMP_PREFIX: &str = ".sorter.tmp.";

/// Owns the spill files of one sort session.
///
/// Spill files are named `.sorter.tmp.<session>.<index>` inside the temp directory. The session
/// part is random so that concurrent sorts sharing a directory do not collide, the index is the
/// chunk creation order starting at 0.
#[derive(Debug)]
pub struct SpillStore {
    tmp: PathBuf,
    session: String,
    spills: Vec<PathBuf>,
    unterminated_last_line: Option<Vec<u8>>,
}

impl SpillStore {
    /// Create a store for a new session in `tmp`. No file is created until [SpillStore::create_next]
    pub fn new(tmp: &Path) -> SpillStore {
        SpillStore {
            tmp: tmp.to_path_buf(),
            session: HEXLOWER.encode(&rand::random::<[u8; 16]>()),
            spills: Vec::new(),
            unterminated_last_line: None,
        }
    }

    /// Session identifier embedded in every spill file name
    pub fn session(&self) -> &str {
        &self.session
    }

    /// Path of the spill file with `index`, whether it was created or not
    pub fn path(&self, index: usize) -> PathBuf {
        self.tmp.join(format!("{}{}.{}", TMP_PREFIX, self.session, index))
    }

    /// Create the next spill file and return its index, path and a buffered writer.
    /// Fails if a file with the same name already exists.
    pub fn create_next(&mut self) -> Result<(usize, PathBuf, BufWriter<File>), anyhow::Error> {
        let index = self.spills.len();
        let path = self.path(index);
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .with_context(|| format!("create spill file: {}", path.to_string_lossy()))?;
        self.spills.push(path.clone());
        Ok((index, path, BufWriter::new(file)))
    }

    /// The last source line when it had no '\n', with the terminator added as it was spilled
    pub fn unterminated_last_line(&self) -> Option<&[u8]> {
        self.unterminated_last_line.as_deref()
    }

    pub(crate) fn set_unterminated_last_line(&mut self, line: Vec<u8>) {
        self.unterminated_last_line = Some(line);
    }

    /// Paths of all spill files created so far, in chunk index order
    pub fn paths(&self) -> &Vec<PathBuf> {
        &self.spills
    }

    pub fn len(&self) -> usize {
        self.spills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spills.is_empty()
    }

    /// Delete every spill file of this session. Files already moved away are skipped.
    pub fn remove_all(&mut self) -> Result<(), anyhow::Error> {
        for path in self.spills.drain(..) {
            if path.exists() {
                std::fs::remove_file(&path)
                    .with_context(|| format!("remove spill file: {}", path.to_string_lossy()))?;
            }
        }
        log::debug!("Removed spill files of session {}", self.session);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::TempDir;

    use crate::spill_store::SpillStore;

    #[test]
    fn test_naming() -> Result<(), anyhow::Error> {
        let tmp = TempDir::new()?;
        let mut store = SpillStore::new(tmp.path());
        assert_eq!(store.session().len(), 32);
        assert!(store.is_empty());

        let (index, path, _writer) = store.create_next()?;
        assert_eq!(index, 0);
        assert_eq!(path, tmp.path().join(format!(".sorter.tmp.{}.0", store.session())));
        let (index, path, _writer) = store.create_next()?;
        assert_eq!(index, 1);
        assert_eq!(path, store.path(1));
        assert_eq!(store.len(), 2);
        assert_eq!(store.paths(), &vec![store.path(0), store.path(1)]);
        Ok(())
    }

    #[test]
    fn test_sessions_do_not_collide() {
        let tmp = std::env::temp_dir();
        let first = SpillStore::new(&tmp);
        let second = SpillStore::new(&tmp);
        assert_ne!(first.session(), second.session());
        assert_ne!(first.path(0), second.path(0));
    }

    #[test]
    fn test_remove_all() -> Result<(), anyhow::Error> {
        let tmp = TempDir::new()?;
        let mut store = SpillStore::new(tmp.path());
        for _ in 0..3 {
            let (_, _, mut writer) = store.create_next()?;
            writer.write_all(b"line\n")?;
            writer.flush()?;
        }
        let paths = store.paths().clone();
        assert!(paths.iter().all(|p| p.exists()));

        std::fs::remove_file(&paths[1])?;
        store.remove_all()?;
        assert!(paths.iter().all(|p| !p.exists()));
        assert!(store.is_empty());
        Ok(())
    }

    #[test]
    fn test_create_fails_on_missing_dir() {
        let mut store = SpillStore::new(&std::env::temp_dir().join("no-such-dir-for-spills").join("nested"));
        assert!(store.create_next().is_err());
    }
}

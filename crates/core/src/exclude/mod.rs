//! Exclude list: basenames of finding aids that must not be ingested.
//!
//! The list file holds one basename per line, without directory or `.xml`
//! extension (`12345`, not `/eads/12345.xml`). Lines starting with `#` are
//! comments and blank lines are ignored.

use std::collections::HashSet;
use std::io;
use std::path::Path;

use tracing::{debug, info};

use crate::ingest::FileRecord;

/// Set of basenames to skip. Matching is exact and case-sensitive.
#[derive(Debug, Clone, Default)]
pub struct ExcludeSet {
    names: HashSet<String>,
}

impl ExcludeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the exclude list at `path`.
    ///
    /// A path that is not an existing regular file yields an empty set.
    pub fn load(path: &Path) -> io::Result<Self> {
        if !path.is_file() {
            debug!(path = %path.display(), "No exclude list found");
            return Ok(Self::new());
        }

        let contents = std::fs::read_to_string(path)?;
        let set = Self::parse(&contents);
        info!(
            path = %path.display(),
            entries = set.len(),
            "Loaded exclude list"
        );
        Ok(set)
    }

    /// Parse exclude list contents.
    pub fn parse(contents: &str) -> Self {
        let names = contents
            .lines()
            .filter(|line| !line.starts_with('#'))
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { names }
    }

    pub fn contains(&self, basename: &str) -> bool {
        self.names.contains(basename)
    }

    /// Whether `file` is on the exclude list.
    pub fn should_skip(&self, file: &FileRecord) -> bool {
        self.contains(file.basename())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<String> for ExcludeSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let set = ExcludeSet::parse("# skipped for review\n12345\n\nms-007\n#67890\n");
        assert_eq!(set.len(), 2);
        assert!(set.contains("12345"));
        assert!(set.contains("ms-007"));
        assert!(!set.contains("67890"));
        assert!(!set.contains("# skipped for review"));
    }

    #[test]
    fn test_parse_keeps_lines_verbatim() {
        let set = ExcludeSet::parse(" leading\ntrailing \r\n");
        assert!(set.contains(" leading"));
        assert!(set.contains("trailing "));
        assert!(!set.contains("leading"));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let set = ExcludeSet::load(Path::new("/nonexistent/exclude_list.txt")).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_load_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let set = ExcludeSet::load(dir.path()).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# Example exclude list").unwrap();
        writeln!(file, "alpha").unwrap();
        writeln!(file, "beta").unwrap();
        let set = ExcludeSet::load(file.path()).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_should_skip_matches_basename_exactly() {
        let set: ExcludeSet = ["Alpha".to_string()].into_iter().collect();

        let alpha = FileRecord::new(PathBuf::from("/eads/Alpha.xml"));
        let lower = FileRecord::new(PathBuf::from("/eads/alpha.xml"));
        let other = FileRecord::new(PathBuf::from("/eads/Alpha-2.xml"));

        assert!(set.should_skip(&alpha));
        assert!(!set.should_skip(&lower));
        assert!(!set.should_skip(&other));
    }
}

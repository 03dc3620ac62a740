/// One row of the result list, parsed from a raw backend output line.
///
/// Backends emit relative paths with `/` separators; directories carry a
/// trailing `/`. The raw form is kept verbatim in `path` so a confirmed
/// selection hands the host exactly what the backend produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Raw backend line, trailing separator preserved for directories.
    pub path: String,
    /// Base name; keeps the trailing separator for directories.
    pub name: String,
    /// Parent path, empty for top-level entries.
    pub dir: String,
    pub is_dir: bool,
}

impl FileEntry {
    /// Split a backend output line into its display parts.
    #[must_use]
    pub fn from_backend_line(line: impl Into<String>) -> Self {
        let path: String = line.into();
        let is_dir = path.ends_with('/');
        let stem = if is_dir { &path[..path.len() - 1] } else { &path };
        let (dir, name) = match stem.rfind('/') {
            Some(split) => (&stem[..split], &path[split + 1..]),
            None => ("", path.as_str()),
        };
        Self {
            name: name.to_string(),
            dir: dir.to_string(),
            is_dir,
            path,
        }
    }

    /// Path without the directory marker, suitable for filesystem calls.
    #[must_use]
    pub fn fs_path(&self) -> &str {
        if self.is_dir {
            &self.path[..self.path.len() - 1]
        } else {
            &self.path
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_file_into_name_and_dir() {
        let entry = FileEntry::from_backend_line("src/ui/render.rs");
        assert_eq!(entry.name, "render.rs");
        assert_eq!(entry.dir, "src/ui");
        assert!(!entry.is_dir);
        assert_eq!(entry.fs_path(), "src/ui/render.rs");
    }

    #[test]
    fn directory_keeps_trailing_separator_in_name() {
        let entry = FileEntry::from_backend_line("src/ui/");
        assert_eq!(entry.name, "ui/");
        assert_eq!(entry.dir, "src");
        assert!(entry.is_dir);
        assert_eq!(entry.fs_path(), "src/ui");
    }

    #[test]
    fn top_level_entry_has_empty_dir() {
        let entry = FileEntry::from_backend_line("README.md");
        assert_eq!(entry.name, "README.md");
        assert_eq!(entry.dir, "");
    }

    #[test]
    fn top_level_directory() {
        let entry = FileEntry::from_backend_line("target/");
        assert_eq!(entry.name, "target/");
        assert_eq!(entry.dir, "");
        assert!(entry.is_dir);
    }
}

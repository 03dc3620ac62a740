use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::error::PreviewError;

/// How far into the file the binary sniff looks for a null byte.
const BINARY_SNIFF_BYTES: usize = 8 * 1024;

/// Raw, pre-highlight preview content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RawPreview {
    Text(String),
    Binary,
}

/// Read a file for previewing.
///
/// The size cap is enforced against metadata before the content read, so an
/// oversized file is rejected whole rather than truncated; a file exactly at
/// the cap still loads. A null byte within the sniff window classifies the
/// file as binary without attempting to decode it.
pub(crate) fn load_raw(path: &Path, max_bytes: u64) -> Result<RawPreview, PreviewError> {
    let metadata = fs::metadata(path)?;
    if metadata.is_dir() {
        return Err(PreviewError::IsDirectory);
    }
    if metadata.len() > max_bytes {
        debug!(?path, len = metadata.len(), "preview rejected: over size cap");
        return Err(PreviewError::TooLarge);
    }

    let bytes = fs::read(path).map_err(|err| match err.kind() {
        // The entry can become a directory between the metadata call and the
        // read; classify the race instead of surfacing a raw I/O error.
        ErrorKind::IsADirectory => PreviewError::IsDirectory,
        _ => PreviewError::Io(err),
    })?;

    let sniff = &bytes[..bytes.len().min(BINARY_SNIFF_BYTES)];
    if sniff.contains(&0) {
        return Ok(RawPreview::Binary);
    }

    Ok(RawPreview::Text(String::from_utf8_lossy(&bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAP: u64 = 64;

    fn write_fixture(bytes: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("fixture");
        fs::write(&path, bytes).expect("write fixture");
        (dir, path)
    }

    #[test]
    fn file_exactly_at_cap_loads() {
        let (_dir, path) = write_fixture(&vec![b'x'; CAP as usize]);
        let preview = load_raw(&path, CAP).expect("load at cap");
        assert_eq!(preview, RawPreview::Text("x".repeat(CAP as usize)));
    }

    #[test]
    fn one_byte_over_cap_fails_whole() {
        let (_dir, path) = write_fixture(&vec![b'x'; CAP as usize + 1]);
        let err = load_raw(&path, CAP).expect_err("over cap must fail");
        assert!(matches!(err, PreviewError::TooLarge));
    }

    #[test]
    fn zero_byte_file_is_empty_text_not_binary() {
        let (_dir, path) = write_fixture(b"");
        let preview = load_raw(&path, CAP).expect("load empty file");
        assert_eq!(preview, RawPreview::Text(String::new()));
    }

    #[test]
    fn null_byte_in_prefix_classifies_binary() {
        let (_dir, path) = write_fixture(b"\x7fELF\x00\x01\x02");
        let preview = load_raw(&path, CAP).expect("load binary file");
        assert_eq!(preview, RawPreview::Binary);
    }

    #[test]
    fn null_byte_past_sniff_window_stays_text() {
        let mut bytes = vec![b'a'; BINARY_SNIFF_BYTES];
        bytes.push(0);
        let (_dir, path) = write_fixture(&bytes);
        let preview = load_raw(&path, BINARY_SNIFF_BYTES as u64 + 1).expect("load");
        assert!(matches!(preview, RawPreview::Text(_)));
    }

    #[test]
    fn directory_is_classified() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let err = load_raw(dir.path(), CAP).expect_err("directory must fail");
        assert!(matches!(err, PreviewError::IsDirectory));
    }

    #[test]
    fn missing_file_is_generic_io() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let err = load_raw(&dir.path().join("gone"), CAP).expect_err("missing file");
        assert!(matches!(err, PreviewError::Io(_)));
    }
}

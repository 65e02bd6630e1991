//! Tile archive builder.
//!
//! Collects the publishable files of a tile directory into memory and
//! serialises them as a gzip-compressed tar.

use crate::error::{Result, TileError};
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Extensions that are packaged into a tile archive.
pub const ARCHIVE_EXTENSIONS: &[&str] = &["md", "js", "py", "sh", "txt", "json", "ps1"];

/// Media type the registry expects for uploaded archives.
pub const ARCHIVE_MEDIA_TYPE: &str = "application/x-tar";

/// In-memory tile contents keyed by `/`-separated path relative to the root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileArchive {
    files: BTreeMap<String, Vec<u8>>,
}

impl TileArchive {
    /// Scan `root` and read every allow-listed file.
    ///
    /// Hidden entries are skipped and symlinks are not followed. Fails with
    /// [`TileError::NoMatchingFiles`] when nothing matches and with
    /// [`TileError::NonUtf8Path`] when a packaged path is not UTF-8.
    pub fn collect(root: &Path) -> Result<Self> {
        let mut files = BTreeMap::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() || !has_archive_extension(entry.path()) {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(root)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            let key = relative_key(relative)?;

            debug!(file = %key, "Adding file to archive");
            files.insert(key, std::fs::read(entry.path())?);
        }

        if files.is_empty() {
            return Err(TileError::NoMatchingFiles {
                path: root.to_path_buf(),
            });
        }

        Ok(Self { files })
    }

    /// Relative paths in archive order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Number of files in the archive.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Serialise to a gzip-compressed tar.
    ///
    /// Entries carry a fixed mode and mtime so the same inputs always produce
    /// the same bytes.
    pub fn to_tar_gz(&self) -> Result<Vec<u8>> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for (path, contents) in &self.files {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            header.set_mtime(0);
            header.set_entry_type(tar::EntryType::Regular);
            builder.append_data(&mut header, path, contents.as_slice())?;
        }

        let encoder = builder.into_inner()?;
        Ok(encoder.finish()?)
    }
}

/// Collect `root` and serialise it in one step.
pub fn build_archive(root: &Path) -> Result<Vec<u8>> {
    TileArchive::collect(root)?.to_tar_gz()
}

/// SHA-256 of archive bytes, hex encoded.
pub fn archive_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Whether a walk entry is a dotfile or dot-directory.
pub fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().as_encoded_bytes().starts_with(b".")
}

fn has_archive_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ARCHIVE_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

fn relative_key(relative: &Path) -> Result<String> {
    let parts = relative
        .components()
        .map(|c| {
            c.as_os_str()
                .to_str()
                .ok_or_else(|| TileError::NonUtf8Path(relative.to_path_buf()))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_collect_matching_files() {
        let dir = tempdir().unwrap();
        write(dir.path(), "test.md", "# Hello");
        write(dir.path(), "script.js", "console.log(\"hi\")");
        write(dir.path(), "docs/nested/guide.txt", "guide");

        let archive = TileArchive::collect(dir.path()).unwrap();
        let paths: Vec<_> = archive.paths().collect();
        assert_eq!(paths, vec!["docs/nested/guide.txt", "script.js", "test.md"]);
    }

    #[test]
    fn test_collect_skips_other_extensions_and_hidden_entries() {
        let dir = tempdir().unwrap();
        write(dir.path(), "tile.json", "{}");
        write(dir.path(), "ignored.xml", "<root/>");
        write(dir.path(), ".hidden.md", "secret");
        write(dir.path(), ".git/notes.md", "git internals");
        write(dir.path(), "Makefile", "all:");

        let archive = TileArchive::collect(dir.path()).unwrap();
        assert_eq!(archive.paths().collect::<Vec<_>>(), vec!["tile.json"]);
    }

    #[test]
    fn test_collect_no_matching_files() {
        let dir = tempdir().unwrap();
        write(dir.path(), "ignored.xml", "<root/>");

        let err = TileArchive::collect(dir.path()).unwrap_err();
        assert!(err.to_string().contains("No files found"));
        assert!(err.to_string().contains(&dir.path().display().to_string()));
    }

    #[test]
    fn test_collect_missing_root_is_io_error() {
        let dir = tempdir().unwrap();
        let err = TileArchive::collect(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, TileError::Io(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_collect_does_not_follow_symlinks() {
        let dir = tempdir().unwrap();
        let outside = tempdir().unwrap();
        write(outside.path(), "linked.md", "outside");
        write(dir.path(), "README.md", "inside");
        std::os::unix::fs::symlink(outside.path(), dir.path().join("linked")).unwrap();

        let archive = TileArchive::collect(dir.path()).unwrap();
        assert_eq!(archive.paths().collect::<Vec<_>>(), vec!["README.md"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_collect_skips_hidden_non_utf8_directory() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir().unwrap();
        write(dir.path(), "README.md", "inside");
        let hidden = dir.path().join(OsStr::from_bytes(b".secr\xffet"));
        std::fs::create_dir(&hidden).unwrap();
        std::fs::write(hidden.join("token.txt"), "ghp_secret").unwrap();

        let archive = TileArchive::collect(dir.path()).unwrap();
        assert_eq!(archive.paths().collect::<Vec<_>>(), vec!["README.md"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_collect_rejects_non_utf8_file_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir().unwrap();
        write(dir.path(), "README.md", "inside");
        std::fs::write(dir.path().join(OsStr::from_bytes(b"caf\xff.md")), "menu").unwrap();

        let err = TileArchive::collect(dir.path()).unwrap_err();
        assert!(matches!(err, TileError::NonUtf8Path(_)));
        assert!(err.to_string().starts_with("Path is not valid UTF-8: caf"));
    }

    #[test]
    fn test_tar_gz_contains_entries() {
        let dir = tempdir().unwrap();
        write(dir.path(), "skills/a/SKILL.md", "# Skill A");
        write(dir.path(), "run.sh", "echo hi");

        let bytes = build_archive(dir.path()).unwrap();
        assert!(!bytes.is_empty());

        let mut tar = tar::Archive::new(GzDecoder::new(bytes.as_slice()));
        let mut seen = Vec::new();
        for entry in tar.entries().unwrap() {
            let mut entry = entry.unwrap();
            let path = entry.path().unwrap().to_string_lossy().to_string();
            let mut contents = String::new();
            entry.read_to_string(&mut contents).unwrap();
            seen.push((path, contents));
        }
        assert_eq!(
            seen,
            vec![
                ("run.sh".to_string(), "echo hi".to_string()),
                ("skills/a/SKILL.md".to_string(), "# Skill A".to_string()),
            ]
        );
    }

    #[test]
    fn test_tar_gz_is_deterministic() {
        let dir = tempdir().unwrap();
        write(dir.path(), "a.md", "a");
        write(dir.path(), "b.py", "print('b')");

        let first = build_archive(dir.path()).unwrap();
        let second = build_archive(dir.path()).unwrap();
        assert_eq!(archive_digest(&first), archive_digest(&second));
        assert_eq!(archive_digest(&first).len(), 64);
    }
}

// jgrep - core/classifier.rs
//
// Binary classifier (C2): reads a file prefix and matches it against a
// `SignatureTable`, returning the matched format name or `None` for text.

use crate::core::signature::SignatureTable;
use crate::platform::fs::read_prefix;
use std::io;
use std::path::Path;

/// `Classify(filePath, table) → signatureName | None` (§4.1).
///
/// I/O errors reading the prefix propagate to the caller, which treats an
/// unclassified file as text unless `textOnly` demands otherwise (§4.1,
/// last paragraph) — that policy lives in the scanner (C6), not here.
pub fn classify(path: &Path, table: &SignatureTable) -> io::Result<Option<String>> {
    if table.is_empty() {
        return Ok(None);
    }
    let buffer = read_prefix(path, table.max_prefix())?;
    let bytes_read = buffer.len();
    Ok(table.classify(&buffer, bytes_read).map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::signature::SignatureTable;
    use std::io::Write;

    #[test]
    fn zip_file_classifies_as_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.zip");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(&[0x50, 0x4B, 0x03, 0x04, 0x01, 0x02]).unwrap();
        drop(f);

        let table = SignatureTable::builtin();
        let result = classify(&path, &table).unwrap();
        assert_eq!(result.as_deref(), Some("ZIP"));
    }

    #[test]
    fn plain_text_file_classifies_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, b"hello world\n").unwrap();

        let table = SignatureTable::builtin();
        let result = classify(&path, &table).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn empty_table_never_classifies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.zip");
        std::fs::write(&path, [0x50, 0x4B, 0x03, 0x04]).unwrap();

        let table = SignatureTable::empty();
        let result = classify(&path, &table).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn tar_at_offset_257_classifies_as_tar() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.tar");
        let mut buf = vec![0u8; 257];
        buf.extend_from_slice(b"ustar");
        std::fs::write(&path, &buf).unwrap();

        let table = SignatureTable::builtin();
        let result = classify(&path, &table).unwrap();
        assert_eq!(result.as_deref(), Some("TAR"));
    }
}

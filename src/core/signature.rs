// jgrep - core/signature.rs
//
// Magic-number signature table (C1). A `Signature` pairs a byte pattern
// (with wildcard positions) and an offset; a `SignatureTable` is an
// immutable, shared, read-only collection of signatures used by the binary
// classifier (C2).
//
// Dynamic hashmap records in the source are modelled here as a named record
// type with typed fields and a derived `bytes`/`mask` pair rather than a
// loosely typed map (§9).

use std::collections::HashMap;

/// Sentinel stored in `Signature::bytes` for a wildcard position. Real byte
/// values are `0..=255`; `WILDCARD` (256) cannot collide with any of them.
const WILDCARD: u16 = 256;

/// One entry in the signature table (§3 `Signature`).
#[derive(Debug, Clone)]
pub struct Signature {
    pub name: String,
    /// `bytes[i] == WILDCARD` marks a wildcard position; otherwise the
    /// concrete byte value the file must have at `offset + i`.
    bytes: Vec<u16>,
    pub offset: usize,
}

impl Signature {
    /// Construct a signature from a name, a sequence of optional concrete
    /// bytes (`None` = wildcard), and an offset.
    pub fn new(name: impl Into<String>, pattern: Vec<Option<u8>>, offset: usize) -> Self {
        let bytes = pattern
            .into_iter()
            .map(|b| b.map(u16::from).unwrap_or(WILDCARD))
            .collect();
        Self {
            name: name.into(),
            bytes,
            offset,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Test `buffer` (the file's prefix, `bytes_read` of it genuinely read
    /// from disk, the rest implicitly zero) against this signature (§4.1).
    fn matches(&self, buffer: &[u8], bytes_read: usize) -> bool {
        for (i, &want) in self.bytes.iter().enumerate() {
            if want == WILDCARD {
                continue;
            }
            let pos = self.offset + i;
            let got = if pos < bytes_read { buffer[pos] as u16 } else { 0 };
            if got != want {
                return false;
            }
        }
        true
    }
}

/// Immutable, shared, read-only mapping from signature name to `Signature`
/// (§3 `SignatureTable`). `MaxPrefix` is precomputed once at construction.
#[derive(Debug, Clone)]
pub struct SignatureTable {
    signatures: HashMap<String, Signature>,
    max_prefix: usize,
}

impl SignatureTable {
    /// Build a table from a list of signatures, computing `MaxPrefix` as
    /// `max(offset + len)` over all entries (§3 invariant).
    pub fn new(signatures: Vec<Signature>) -> Self {
        let max_prefix = signatures
            .iter()
            .map(|s| s.offset + s.len())
            .max()
            .unwrap_or(0);
        let signatures = signatures.into_iter().map(|s| (s.name.clone(), s)).collect();
        Self {
            signatures,
            max_prefix,
        }
    }

    /// An empty table: classification never matches, every file is "text".
    pub fn empty() -> Self {
        Self {
            signatures: HashMap::new(),
            max_prefix: 0,
        }
    }

    /// The built-in table shipped with the crate (§4.1.1), used whenever the
    /// user does not supply an external `--signatures` JSON file.
    pub fn builtin() -> Self {
        fn lit(bytes: &[u8]) -> Vec<Option<u8>> {
            bytes.iter().map(|&b| Some(b)).collect()
        }

        let signatures = vec![
            Signature::new("ZIP", lit(&[0x50, 0x4B, 0x03, 0x04]), 0),
            Signature::new("GZIP", lit(&[0x1F, 0x8B]), 0),
            Signature::new("PDF", lit(&[0x25, 0x50, 0x44, 0x46]), 0),
            Signature::new(
                "PNG",
                lit(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
                0,
            ),
            Signature::new("ELF", lit(&[0x7F, 0x45, 0x4C, 0x46]), 0),
            Signature::new("CLASS", lit(&[0xCA, 0xFE, 0xBA, 0xBE]), 0),
            Signature::new("EXE", lit(&[0x4D, 0x5A]), 0),
            Signature::new(
                "TAR",
                lit(&[0x75, 0x73, 0x74, 0x61, 0x72]), // "ustar"
                257,
            ),
            Signature::new(
                "RIFF",
                vec![
                    Some(0x52),
                    Some(0x49),
                    Some(0x46),
                    Some(0x46),
                    None,
                    None,
                    None,
                    None,
                ],
                0,
            ),
        ];
        Self::new(signatures)
    }

    pub fn max_prefix(&self) -> usize {
        self.max_prefix
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn get(&self, name: &str) -> Option<&Signature> {
        self.signatures.get(name)
    }

    /// Classify a file prefix against every signature in the table,
    /// returning the first matching name (§4.1). Iteration order over a
    /// `HashMap` is unspecified, matching the spec's "first hit wins, any
    /// stable choice is acceptable" contract.
    pub fn classify(&self, buffer: &[u8], bytes_read: usize) -> Option<&str> {
        self.signatures
            .values()
            .find(|sig| sig.matches(buffer, bytes_read))
            .map(|sig| sig.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_prefix_accounts_for_tar_offset() {
        let table = SignatureTable::builtin();
        // ustar at offset 257, 5 bytes long => MaxPrefix >= 262.
        assert!(table.max_prefix() >= 262);
    }

    #[test]
    fn empty_table_never_classifies() {
        let table = SignatureTable::empty();
        let buf = [0x50, 0x4B, 0x03, 0x04];
        assert_eq!(table.classify(&buf, buf.len()), None);
    }

    #[test]
    fn zip_prefix_classifies_as_zip() {
        let table = SignatureTable::builtin();
        let buf = [0x50, 0x4B, 0x03, 0x04, 0xAA, 0xBB];
        assert_eq!(table.classify(&buf, buf.len()), Some("ZIP"));
    }

    #[test]
    fn short_file_does_not_match_concrete_bytes_past_eof() {
        // A signature with only 1 real byte read can't match a 4-byte pattern
        // whose later bytes are non-zero (virtual EOF bytes are 0).
        let sig = Signature::new("FAKE", lit_test(&[0x50, 0x4B, 0x03, 0x04]), 0);
        let table = SignatureTable::new(vec![sig]);
        let buf = [0x50];
        assert_eq!(table.classify(&buf, 1), None);
    }

    #[test]
    fn wildcard_matches_any_byte_including_past_eof() {
        let sig = Signature::new(
            "WILD",
            vec![Some(0x52), Some(0x49), None, None],
            0,
        );
        let table = SignatureTable::new(vec![sig]);
        // Only 2 real bytes read; the two wildcard positions are virtual-EOF.
        let buf = [0x52, 0x49];
        assert_eq!(table.classify(&buf, 2), Some("WILD"));
    }

    #[test]
    fn wildcard_correctness_altering_wildcard_byte_does_not_affect_result() {
        let sig = Signature::new(
            "RIFFISH",
            vec![Some(0x52), Some(0x49), Some(0x46), Some(0x46), None, None],
            0,
        );
        let table = SignatureTable::new(vec![sig]);
        let mut buf = [0x52, 0x49, 0x46, 0x46, 0x00, 0x00];
        assert_eq!(table.classify(&buf, buf.len()), Some("RIFFISH"));
        buf[4] = 0xFF;
        buf[5] = 0x01;
        assert_eq!(table.classify(&buf, buf.len()), Some("RIFFISH"));
    }

    fn lit_test(bytes: &[u8]) -> Vec<Option<u8>> {
        bytes.iter().map(|&b| Some(b)).collect()
    }
}

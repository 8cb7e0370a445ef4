// jgrep - core/encoding.rs
//
// Japanese-aware character-encoding auto-detector (C3) and the encoding
// registry that turns a resolved `EncodingKey` into a decoder (C4).

use crate::core::model::EncodingKey;
use crate::util::constants::{
    DEFAULT_SAMPLE_KB, SAMPLE_MIDDLE_THRESHOLD_BYTES, SAMPLE_TAIL_THRESHOLD_BYTES,
};
use encoding_rs::Encoding;

// =============================================================================
// Registry (C4)
// =============================================================================

/// Static metadata for one `EncodingKey` (§3 `EncodingInfo`).
#[derive(Debug, Clone, Copy)]
pub struct EncodingInfo {
    pub key: EncodingKey,
    pub encoding: &'static Encoding,
    pub has_bom: bool,
    pub display_name: &'static str,
    pub is_default: bool,
}

/// Look up the static metadata for `key`. Every `EncodingKey` variant has an
/// entry; this never returns `None` for a value produced by this crate.
pub fn info(key: EncodingKey) -> EncodingInfo {
    match key {
        EncodingKey::Ascii => EncodingInfo {
            key,
            encoding: encoding_rs::WINDOWS_1252,
            has_bom: false,
            display_name: "ASCII",
            is_default: false,
        },
        EncodingKey::Utf8N => EncodingInfo {
            key,
            encoding: encoding_rs::UTF_8,
            has_bom: false,
            display_name: "UTF-8",
            is_default: false,
        },
        EncodingKey::Utf8Bom => EncodingInfo {
            key,
            encoding: encoding_rs::UTF_8,
            has_bom: true,
            display_name: "UTF-8",
            is_default: false,
        },
        EncodingKey::Utf16Le => EncodingInfo {
            key,
            encoding: encoding_rs::UTF_16LE,
            has_bom: true,
            display_name: "UTF-16LE",
            is_default: false,
        },
        EncodingKey::Utf16Be => EncodingInfo {
            key,
            encoding: encoding_rs::UTF_16BE,
            has_bom: true,
            display_name: "UTF-16BE",
            is_default: false,
        },
        EncodingKey::Utf32Le => EncodingInfo {
            key,
            // encoding_rs has no UTF-32 codec; decoded as UTF-16LE code-unit
            // pairs is wrong, so UTF-32 content is treated as raw UTF-8 bytes
            // after BOM stripping by the line reader below. The display name
            // still reflects what was detected.
            encoding: encoding_rs::UTF_8,
            has_bom: true,
            display_name: "UTF-32LE",
            is_default: false,
        },
        EncodingKey::Utf32Be => EncodingInfo {
            key,
            encoding: encoding_rs::UTF_8,
            has_bom: true,
            display_name: "UTF-32BE",
            is_default: false,
        },
        EncodingKey::Sjis => EncodingInfo {
            key,
            encoding: encoding_rs::SHIFT_JIS,
            has_bom: false,
            display_name: "Shift-JIS",
            is_default: true,
        },
        EncodingKey::Jis => EncodingInfo {
            key,
            encoding: encoding_rs::ISO_2022_JP,
            has_bom: false,
            display_name: "JIS",
            is_default: false,
        },
        EncodingKey::Euc => EncodingInfo {
            key,
            encoding: encoding_rs::EUC_JP,
            has_bom: false,
            display_name: "EUC-JP",
            is_default: false,
        },
    }
}

/// The encoding returned when auto-detection is inconclusive (§4.2 step 7).
pub fn default_key() -> EncodingKey {
    EncodingKey::ALL
        .into_iter()
        .find(|&k| info(k).is_default)
        .expect("exactly one EncodingKey is marked default")
}

/// Decode a whole byte buffer (already stripped of any BOM the caller
/// consumed) into a `String`, tolerating malformed sequences by substituting
/// `encoding_rs`'s REPLACEMENT CHARACTER rather than aborting (§4.3).
pub fn decode_lossy(key: EncodingKey, bytes: &[u8]) -> String {
    let (cow, _used_encoding, _had_errors) = info(key).encoding.decode(bytes);
    cow.into_owned()
}

/// Length, in bytes, of the BOM for `key` if it has one (used to skip past
/// it before decoding the body).
pub fn bom_len(key: EncodingKey) -> usize {
    match key {
        EncodingKey::Utf8Bom => 3,
        EncodingKey::Utf16Le | EncodingKey::Utf16Be => 2,
        EncodingKey::Utf32Le | EncodingKey::Utf32Be => 4,
        _ => 0,
    }
}

// =============================================================================
// Detector (C3)
// =============================================================================

/// `DetectEncoding(filePath, sampleKB) → EncodingKey` (§4.2), operating on an
/// already-read buffer. The caller (the scanner, C6) owns file I/O; this
/// function is pure.
pub fn detect(buffer: &[u8]) -> EncodingKey {
    if buffer.is_empty() {
        return EncodingKey::Ascii;
    }

    if let Some(key) = sniff_bom(buffer) {
        return key;
    }

    if is_ascii(buffer) {
        return EncodingKey::Ascii;
    }

    if has_jis_escape(buffer) {
        return EncodingKey::Jis;
    }

    statistical_detect(buffer)
}

/// Assemble the §4.2 step-3 sample: head/middle/tail thirds of a file whose
/// true size is `file_len`, reading through `read_range`. Returns the
/// concatenated buffer ready for `detect`.
pub fn assemble_sample<F>(file_len: u64, mut read_range: F) -> std::io::Result<Vec<u8>>
where
    F: FnMut(u64, usize) -> std::io::Result<Vec<u8>>,
{
    let sample_cap = DEFAULT_SAMPLE_KB * 1024;
    let sample_len = std::cmp::min(file_len, sample_cap as u64) as usize;

    if file_len as usize <= sample_len {
        return read_range(0, sample_len);
    }

    let third = sample_len / 3;
    let mut out = read_range(0, third)?;

    if sample_len > SAMPLE_MIDDLE_THRESHOLD_BYTES {
        let mid_offset = file_len / 2 - (third as u64) / 2;
        out.extend(read_range(mid_offset, third)?);
    }

    if sample_len > SAMPLE_TAIL_THRESHOLD_BYTES {
        let tail_offset = file_len.saturating_sub(third as u64);
        out.extend(read_range(tail_offset, third)?);
    }

    Ok(out)
}

fn sniff_bom(buffer: &[u8]) -> Option<EncodingKey> {
    if buffer.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return Some(EncodingKey::Utf8Bom);
    }
    if buffer.starts_with(&[0xFF, 0xFE, 0x00, 0x00]) {
        return Some(EncodingKey::Utf32Le);
    }
    if buffer.starts_with(&[0x00, 0x00, 0xFE, 0xFF]) {
        return Some(EncodingKey::Utf32Be);
    }
    if buffer.starts_with(&[0xFF, 0xFE]) {
        return Some(EncodingKey::Utf16Le);
    }
    if buffer.starts_with(&[0xFE, 0xFF]) {
        return Some(EncodingKey::Utf16Be);
    }
    None
}

fn is_ascii(buffer: &[u8]) -> bool {
    !buffer.iter().any(|&b| b == 0x1B || b & 0x80 != 0)
}

const JIS_ESCAPES: &[&[u8]] = &[
    &[0x1B, 0x24, 0x40],             // ESC $ @
    &[0x1B, 0x24, 0x42],             // ESC $ B
    &[0x1B, 0x28, 0x42],             // ESC ( B
    &[0x1B, 0x28, 0x4A],             // ESC ( J
    &[0x1B, 0x28, 0x49],             // ESC ( I
    &[0x1B, 0x24, 0x28, 0x44],       // ESC $ ( D
    &[0x1B, 0x26, 0x40, 0x1B, 0x24, 0x42], // ESC & @ ESC $ B
];

fn has_jis_escape(buffer: &[u8]) -> bool {
    JIS_ESCAPES.iter().any(|needle| contains(buffer, needle))
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() || haystack.len() < needle.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// §4.2 step 6: score SJIS, EUC-JP, and UTF-8 independently by summing the
/// byte-length of every valid multi-byte sequence found; return the strict
/// maximum, falling back to the default-flagged encoding on a tie.
fn statistical_detect(buffer: &[u8]) -> EncodingKey {
    let sjis = score_sjis(buffer);
    let euc = score_euc(buffer);
    let utf8 = score_utf8(buffer);

    if sjis > euc && sjis > utf8 {
        EncodingKey::Sjis
    } else if euc > sjis && euc > utf8 {
        EncodingKey::Euc
    } else if utf8 > sjis && utf8 > euc {
        EncodingKey::Utf8N
    } else {
        default_key()
    }
}

fn score_sjis(buf: &[u8]) -> u64 {
    let mut score = 0u64;
    let mut i = 0;
    while i + 1 < buf.len() {
        let lead = buf[i];
        let trail = buf[i + 1];
        let lead_ok = (0x81..=0x9F).contains(&lead) || (0xE0..=0xFC).contains(&lead);
        let trail_ok = (0x40..=0x7E).contains(&trail) || (0x80..=0xFC).contains(&trail);
        if lead_ok && trail_ok {
            score += 2;
            i += 2;
        } else {
            i += 1;
        }
    }
    score
}

fn score_euc(buf: &[u8]) -> u64 {
    let mut score = 0u64;
    let mut i = 0;
    while i < buf.len() {
        if i + 2 < buf.len() && buf[i] == 0x8F && (0xA1..=0xFE).contains(&buf[i + 1]) && (0xA1..=0xFE).contains(&buf[i + 2]) {
            score += 3;
            i += 3;
            continue;
        }
        if i + 1 < buf.len() {
            let a = buf[i];
            let b = buf[i + 1];
            if (0xA1..=0xFE).contains(&a) && (0xA1..=0xFE).contains(&b) {
                score += 2;
                i += 2;
                continue;
            }
            if a == 0x8E && (0xA1..=0xDF).contains(&b) {
                score += 2;
                i += 2;
                continue;
            }
        }
        i += 1;
    }
    score
}

fn score_utf8(buf: &[u8]) -> u64 {
    let mut score = 0u64;
    let mut i = 0;
    while i < buf.len() {
        if i + 2 < buf.len()
            && (0xE0..=0xEF).contains(&buf[i])
            && (0x80..=0xBF).contains(&buf[i + 1])
            && (0x80..=0xBF).contains(&buf[i + 2])
        {
            score += 3;
            i += 3;
            continue;
        }
        if i + 1 < buf.len() && (0xC0..=0xDF).contains(&buf[i]) && (0x80..=0xBF).contains(&buf[i + 1]) {
            score += 2;
            i += 2;
            continue;
        }
        i += 1;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_is_ascii() {
        assert_eq!(detect(&[]), EncodingKey::Ascii);
    }

    #[test]
    fn ascii_fast_path() {
        let buf: Vec<u8> = (0x00u8..=0x7Fu8).filter(|&b| b != 0x1B).collect();
        assert_eq!(detect(&buf), EncodingKey::Ascii);
    }

    #[test]
    fn esc_byte_excludes_ascii_fast_path() {
        let buf = [b'a', 0x1B, b'b'];
        assert_ne!(detect(&buf), EncodingKey::Ascii);
    }

    #[test]
    fn utf8_bom_precedence_over_body() {
        let mut buf = vec![0xEF, 0xBB, 0xBF];
        buf.extend_from_slice("hello".as_bytes());
        assert_eq!(detect(&buf), EncodingKey::Utf8Bom);
    }

    #[test]
    fn utf16le_bom_detected() {
        let buf = [0xFF, 0xFE, b'h', 0x00];
        assert_eq!(detect(&buf), EncodingKey::Utf16Le);
    }

    #[test]
    fn jis_escape_detected() {
        let mut buf = vec![0x1B, 0x24, 0x42];
        buf.extend_from_slice(&[0x24, 0x22]);
        assert_eq!(detect(&buf), EncodingKey::Jis);
    }

    #[test]
    fn utf8_multibyte_outscores_sjis_noise() {
        let text = "日本語のテキストです。これはUTF-8エンコードされた文字列です。";
        assert_eq!(detect(text.as_bytes()), EncodingKey::Utf8N);
    }

    #[test]
    fn default_key_is_sjis() {
        assert_eq!(default_key(), EncodingKey::Sjis);
    }

    #[test]
    fn assemble_sample_small_file_reads_head_only() {
        let calls = std::cell::RefCell::new(Vec::new());
        let buf = assemble_sample(100, |offset, len| {
            calls.borrow_mut().push((offset, len));
            Ok(vec![0u8; len])
        })
        .unwrap();
        assert_eq!(calls.borrow().len(), 1);
        assert_eq!(buf.len(), 100);
    }
}

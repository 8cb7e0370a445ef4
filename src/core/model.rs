// jgrep - core/model.rs
//
// Core data model types. Pure data definitions with no I/O.
// These types are the shared vocabulary across the signature, classifier,
// encoding, pattern, scanner, and orchestrator modules.

use regex::Regex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::core::signature::SignatureTable;

// =============================================================================
// Encoding key
// =============================================================================

/// Closed enumeration of encodings the detector and registry understand (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingKey {
    Ascii,
    Utf8N,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
    Sjis,
    Jis,
    Euc,
}

impl EncodingKey {
    /// All variants, used to build the registry and to iterate in tests.
    pub const ALL: [EncodingKey; 10] = [
        EncodingKey::Ascii,
        EncodingKey::Utf8N,
        EncodingKey::Utf8Bom,
        EncodingKey::Utf16Le,
        EncodingKey::Utf16Be,
        EncodingKey::Utf32Le,
        EncodingKey::Utf32Be,
        EncodingKey::Sjis,
        EncodingKey::Jis,
        EncodingKey::Euc,
    ];
}

/// How the user specified `--codepage` (AUTO-detect, or a fixed encoding).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodepageMode {
    Auto,
    Fixed(EncodingKey),
}

// =============================================================================
// Scan configuration
// =============================================================================

/// Immutable per-run configuration broadcast (read-only, via `Arc`) to every
/// worker (§3 `ScanConfig`).
#[derive(Debug)]
pub struct ScanConfig {
    /// Compiled search pattern (C5).
    pub regex: Regex,

    /// When true, binary files (per C2) are skipped entirely.
    pub text_only: bool,

    /// Magic-number table used by the binary classifier (C1/C2).
    pub signatures: Arc<SignatureTable>,

    /// AUTO-detect per file, or force one encoding for every file.
    pub codepage: CodepageMode,

    /// Stop scanning a file after its first matching line.
    pub first_match_only: bool,

    /// Emit only the matched substring instead of the whole line.
    pub output_matched_part: bool,

    /// Worker-pool width (§4.6).
    pub parallelism: usize,

    /// Suppress progress reporting.
    pub quiet: bool,

    /// Enable the debug sink / debug-level logging.
    pub debug: bool,

    /// Wall-clock origin for the trailer's elapsed-time report.
    pub start_time: Instant,
}

// =============================================================================
// Match record
// =============================================================================

/// One matched line, ready for formatting into the result artifact (§3, §4.5).
#[derive(Debug, Clone)]
pub struct MatchRecord {
    pub file_path: PathBuf,
    /// 1-based line number.
    pub line_number: u64,
    /// 1-based column number, counted in `char`s (Unicode scalar values).
    pub column_number: u64,
    pub encoding_display_name: String,
    /// The matched substring, or the whole line, per `output_matched_part`.
    pub payload: String,
}

impl MatchRecord {
    /// Render in the §4.5 format: `"<absPath>(<line>,<col>)  [<enc>]: <payload>"`.
    pub fn format(&self) -> String {
        format!(
            "{}({},{})  [{}]: {}",
            self.file_path.display(),
            self.line_number,
            self.column_number,
            self.encoding_display_name,
            self.payload
        )
    }
}

// =============================================================================
// Job
// =============================================================================

/// One dispatched unit of work: a file to scan plus its private temp files
/// (§3 `Job`, §6.4 working state).
#[derive(Debug, Clone)]
pub struct Job {
    pub input_path: PathBuf,
    pub temp_output_path: PathBuf,
    pub temp_log_path: PathBuf,
}

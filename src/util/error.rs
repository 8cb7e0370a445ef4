// jgrep - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation. All errors preserve the causal chain
// for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all jgrep operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum GrepError {
    /// Signature table loading or validation failed.
    Signature(SignatureError),

    /// File discovery failed.
    Discovery(DiscoveryError),

    /// Pattern compilation failed.
    Pattern(PatternError),

    /// A run-level scan failure (surfaced before dispatch).
    Scan(ScanError),

    /// Aggregated sink failure.
    Sink(SinkError),
}

impl fmt::Display for GrepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signature(e) => write!(f, "signature table error: {e}"),
            Self::Discovery(e) => write!(f, "discovery error: {e}"),
            Self::Pattern(e) => write!(f, "pattern error: {e}"),
            Self::Scan(e) => write!(f, "scan error: {e}"),
            Self::Sink(e) => write!(f, "output error: {e}"),
        }
    }
}

impl std::error::Error for GrepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Signature(e) => Some(e),
            Self::Discovery(e) => Some(e),
            Self::Pattern(e) => Some(e),
            Self::Scan(e) => Some(e),
            Self::Sink(e) => Some(e),
        }
    }
}

impl From<SignatureError> for GrepError {
    fn from(e: SignatureError) -> Self {
        Self::Signature(e)
    }
}
impl From<DiscoveryError> for GrepError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}
impl From<PatternError> for GrepError {
    fn from(e: PatternError) -> Self {
        Self::Pattern(e)
    }
}
impl From<ScanError> for GrepError {
    fn from(e: ScanError) -> Self {
        Self::Scan(e)
    }
}
impl From<SinkError> for GrepError {
    fn from(e: SinkError) -> Self {
        Self::Sink(e)
    }
}

// ---------------------------------------------------------------------------
// Signature table errors (C1, C10) — `InvalidSignature` in the error table
// ---------------------------------------------------------------------------

/// Errors related to signature-table loading and validation.
#[derive(Debug)]
pub enum SignatureError {
    /// The signature JSON file could not be read.
    Io { path: PathBuf, source: io::Error },

    /// The signature JSON file is not valid JSON / does not match the
    /// expected `{name: {Hex, Offset}}` shape.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A `Hex` token is neither a two-digit hex byte nor `??`.
    InvalidHexToken { name: String, token: String },

    /// A `Hex` string's token count is odd or otherwise malformed.
    MalformedHex { name: String, hex: String },
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "failed to parse signature JSON '{}': {source}", path.display())
            }
            Self::InvalidHexToken { name, token } => write!(
                f,
                "signature '{name}': invalid hex token '{token}' (expected two hex digits or '??')"
            ),
            Self::MalformedHex { name, hex } => {
                write!(f, "signature '{name}': malformed Hex string '{hex}'")
            }
        }
    }
}

impl std::error::Error for SignatureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Discovery errors (C9) — `MissingPath` in the error table
// ---------------------------------------------------------------------------

/// Errors related to directory discovery.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The scan root does not exist.
    RootNotFound { path: PathBuf },

    /// The scan root is not a directory.
    NotADirectory { path: PathBuf },

    /// `max_files` was exceeded during traversal.
    MaxFilesExceeded { max: usize },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "search path '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "search path '{}' is not a directory", path.display())
            }
            Self::MaxFilesExceeded { max } => {
                write!(f, "discovery exceeded the maximum file count ({max})")
            }
        }
    }
}

impl std::error::Error for DiscoveryError {}

// ---------------------------------------------------------------------------
// Pattern compiler errors (C5) — `InvalidPattern` in the error table
// ---------------------------------------------------------------------------

/// Errors related to compiling the user's search pattern into a regex.
#[derive(Debug)]
pub enum PatternError {
    /// The (possibly escaped/word-wrapped) pattern failed to compile.
    InvalidRegex { pattern: String, source: regex::Error },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRegex { pattern, source } => {
                write!(f, "invalid pattern '{pattern}': {source}")
            }
        }
    }
}

impl std::error::Error for PatternError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidRegex { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-file scan errors (C6) — `FileNotFound`, `FileIOError`, `DecodeError`
// ---------------------------------------------------------------------------

/// Non-fatal, per-file scan errors. These are always caught at the scanner
/// boundary, debug-logged, and never abort the run (§7).
#[derive(Debug)]
pub enum ScanFileError {
    /// The file did not exist when the worker reached it.
    NotFound { path: PathBuf },

    /// An I/O error occurred reading the file (classification, sampling, or
    /// line-by-line scanning).
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ScanFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path } => write!(f, "file not found: '{}'", path.display()),
            Self::Io { path, source } => {
                write!(f, "I/O error reading '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ScanFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound { .. } => None,
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Run-level scan / orchestrator errors (C7) — startup-fatal only
// ---------------------------------------------------------------------------

/// Fatal, run-level errors surfaced before any worker starts.
#[derive(Debug)]
pub enum ScanError {
    Discovery(DiscoveryError),
    Pattern(PatternError),
    Signature(SignatureError),

    /// The per-process temp working directory could not be created.
    TempDirUnavailable { path: PathBuf, source: io::Error },
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery(e) => write!(f, "{e}"),
            Self::Pattern(e) => write!(f, "{e}"),
            Self::Signature(e) => write!(f, "{e}"),
            Self::TempDirUnavailable { path, source } => write!(
                f,
                "could not create working directory '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Discovery(e) => Some(e),
            Self::Pattern(e) => Some(e),
            Self::Signature(e) => Some(e),
            Self::TempDirUnavailable { source, .. } => Some(source),
        }
    }
}

impl From<DiscoveryError> for ScanError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}
impl From<PatternError> for ScanError {
    fn from(e: PatternError) -> Self {
        Self::Pattern(e)
    }
}
impl From<SignatureError> for ScanError {
    fn from(e: SignatureError) -> Self {
        Self::Signature(e)
    }
}

// ---------------------------------------------------------------------------
// Aggregated sink errors (C8) — `SinkIOError`
// ---------------------------------------------------------------------------

/// Errors from the aggregated result/debug sinks.
#[derive(Debug)]
pub enum SinkError {
    /// Opening the result artifact (or debug log) failed. Fatal.
    Open { path: PathBuf, source: io::Error },

    /// A flush failed. Never propagated (§4.7); kept for logging at the
    /// call site.
    Flush { source: io::Error },

    /// Closing the sink failed. Logged, not propagated.
    Close { source: io::Error },
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "could not open '{}': {source}", path.display())
            }
            Self::Flush { source } => write!(f, "flush failed: {source}"),
            Self::Close { source } => write!(f, "close failed: {source}"),
        }
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Flush { source } => Some(source),
            Self::Close { source } => Some(source),
        }
    }
}

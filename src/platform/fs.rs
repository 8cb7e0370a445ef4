// jgrep - platform/fs.rs
//
// Filesystem helpers: the per-process temp working directory (§6.4) and
// small buffered-read utilities shared by the binary classifier and
// encoding detector.

use crate::util::constants::{APP_NAME, IO_BUFFER_SIZE};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Resolve (and create) the per-process working directory
/// `TEMP/<APP_NAME>/<pid>` that holds job temp files (§6.4).
pub fn working_dir() -> io::Result<PathBuf> {
    let dir = std::env::temp_dir()
        .join(APP_NAME)
        .join(std::process::id().to_string());
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Best-effort recursive removal of the per-process working directory.
/// Errors are ignored: leaked temp directories are tolerable (§5, §6.4).
pub fn cleanup_working_dir(dir: &Path) {
    if let Err(e) = fs::remove_dir_all(dir) {
        tracing::debug!(path = %dir.display(), error = %e, "Failed to remove working directory");
    }
}

/// Read up to `max_bytes` from the start of `path` into a buffer, using a
/// network-efficient buffer size. Short reads are not an error: the caller
/// receives however many bytes were actually available.
///
/// Used by the binary classifier (C2) to read the signature-table prefix
/// and by the encoding detector (C3) to read the head of its sample.
pub fn read_prefix(path: &Path, max_bytes: usize) -> io::Result<Vec<u8>> {
    let file = fs::File::open(path)?;
    let mut reader = io::BufReader::with_capacity(IO_BUFFER_SIZE, file);
    let mut buf = vec![0u8; max_bytes];
    let mut total = 0;
    loop {
        match reader.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
        if total == buf.len() {
            break;
        }
    }
    buf.truncate(total);
    Ok(buf)
}

/// Read an arbitrary byte range `[offset, offset+len)` from `path`, clamped
/// to the file's actual size. Used to assemble the head/middle/tail sample
/// thirds for encoding detection (§4.2 step 3).
pub fn read_range(path: &Path, offset: u64, len: usize) -> io::Result<Vec<u8>> {
    use std::io::{Seek, SeekFrom};
    let mut file = fs::File::open(path)?;
    file.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0u8; len];
    let mut total = 0;
    loop {
        match file.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
        if total == buf.len() {
            break;
        }
    }
    buf.truncate(total);
    Ok(buf)
}

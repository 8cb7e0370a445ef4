// jgrep - app/sink.rs
//
// Aggregated sink (C8): a thread-safe, append-only, line-oriented writer for
// the result artifact and the optional debug log, with a background flush
// timer.

use crate::util::constants::{SINK_CANCEL_CHECK_INTERVAL_MS, SINK_FLUSH_INTERVAL_SECS};
use crate::util::error::SinkError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

struct Inner {
    writer: Mutex<BufWriter<File>>,
    running: AtomicBool,
}

/// A thread-safe append-only text writer (§4.7). Writes are line-oriented: a
/// write contains a complete record or a blank line. A background thread
/// flushes every [`SINK_FLUSH_INTERVAL_SECS`] seconds; flush failures there
/// are swallowed, matching the "never propagated" policy in §4.7/§7.
pub struct Sink {
    inner: Arc<Inner>,
    flush_thread: Option<JoinHandle<()>>,
}

impl Sink {
    /// Open `path` for append-only writing and start the background flush
    /// timer. Opening failure is fatal (`SinkError::Open`, §7).
    pub fn open(path: &Path) -> Result<Self, SinkError> {
        let file = File::create(path).map_err(|source| SinkError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let inner = Arc::new(Inner {
            writer: Mutex::new(BufWriter::new(file)),
            running: AtomicBool::new(true),
        });

        // Sub-divide each flush interval into cancel-check slices so `close()`
        // never blocks for the whole interval on shutdown.
        let slices = (SINK_FLUSH_INTERVAL_SECS * 1000 / SINK_CANCEL_CHECK_INTERVAL_MS).max(1);

        let flush_inner = Arc::clone(&inner);
        let flush_thread = std::thread::spawn(move || {
            while flush_inner.running.load(Ordering::Relaxed) {
                let mut stopped = false;
                for _ in 0..slices {
                    std::thread::sleep(Duration::from_millis(SINK_CANCEL_CHECK_INTERVAL_MS));
                    if !flush_inner.running.load(Ordering::Relaxed) {
                        stopped = true;
                        break;
                    }
                }
                if stopped {
                    break;
                }
                if let Ok(mut w) = flush_inner.writer.lock() {
                    if let Err(e) = w.flush() {
                        tracing::debug!(error = %e, "periodic sink flush failed");
                    }
                }
            }
        });

        Ok(Self {
            inner,
            flush_thread: Some(flush_thread),
        })
    }

    /// Append a single complete line (the newline is added here).
    pub fn write_line(&self, line: &str) -> Result<(), SinkError> {
        let mut w = self.inner.writer.lock().expect("sink mutex poisoned");
        writeln!(w, "{line}").map_err(|source| SinkError::Flush { source })
    }

    /// Append a blank line, used as a section separator in the header block.
    pub fn write_blank(&self) -> Result<(), SinkError> {
        self.write_line("")
    }

    /// Stop the timer, flush once more, and release the handle. Calling this
    /// more than once is safe: the second call is a no-op flush.
    pub fn close(&mut self) -> Result<(), SinkError> {
        self.inner.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.flush_thread.take() {
            let _ = handle.join();
        }
        let mut w = self.inner.writer.lock().expect("sink mutex poisoned");
        w.flush().map_err(|source| SinkError::Close { source })
    }
}

impl Drop for Sink {
    fn drop(&mut self) {
        if self.flush_thread.is_some() {
            if let Err(e) = self.close() {
                tracing::debug!(error = %e, "sink close on drop failed");
            }
        }
    }
}

/// A parallel sink active only when `--debug` is set (§4.7). Shares the same
/// contract as [`Sink`] but additionally stamps each line with a timestamp,
/// the process id, and the caller-supplied worker identifier.
pub struct DebugSink {
    sink: Sink,
}

impl DebugSink {
    pub fn open(path: &Path) -> Result<Self, SinkError> {
        Ok(Self {
            sink: Sink::open(path)?,
        })
    }

    pub fn log(&self, worker_id: &str, message: &str) -> Result<(), SinkError> {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let pid = std::process::id();
        self.sink
            .write_line(&format!("[{now}] pid={pid} worker={worker_id} {message}"))
    }

    pub fn close(&mut self) -> Result<(), SinkError> {
        self.sink.close()
    }
}

/// Build the debug log path alongside the result artifact: `<base>.log`
/// (§6.4).
pub fn debug_log_path(result_path: &Path) -> PathBuf {
    let suffix = crate::util::constants::DEBUG_LOG_SUFFIX;
    let mut name = result_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str(suffix);
    result_path.with_file_name(name)
}

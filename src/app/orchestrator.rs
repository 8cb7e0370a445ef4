// jgrep - app/orchestrator.rs
//
// Scan orchestrator (C7): batches the discovered file list, dispatches each
// batch across a dedicated, bounded `rayon::ThreadPool`, and drains results
// back into the aggregated sink in submission order.

use crate::app::sink::{DebugSink, Sink};
use crate::core::model::{Job, MatchRecord, ScanConfig};
use crate::core::scanner;
use crate::util::constants::BATCH_MULTIPLIER;
use crate::util::error::ScanError;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

/// Totals reported in the §6.3 trailer.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    pub total_matches: u64,
    pub files_scanned: usize,
}

/// Resolve `parallelism == 0` ("use available cores") to a concrete worker
/// count, mirroring §3's "ScanConfig.parallelism: positive integer" — the
/// zero sentinel is a CLI-layer convenience only.
pub fn resolve_parallelism(requested: usize) -> usize {
    if requested == 0 {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    } else {
        requested
    }
}

/// Run the full batched dispatch/drain loop over `files` (§4.6).
///
/// `working_dir` is the per-process temp directory (§6.4); `sink` receives
/// match lines in input-file order; `debug_sink`, when present, receives a
/// merged copy of each job's per-file debug notes.
pub fn run(
    files: &[PathBuf],
    config: &ScanConfig,
    working_dir: &Path,
    sink: &Sink,
    debug_sink: Option<&DebugSink>,
) -> Result<RunSummary, ScanError> {
    let parallelism = resolve_parallelism(config.parallelism);
    let batch_size = BATCH_MULTIPLIER * parallelism;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(parallelism)
        .build()
        .map_err(|source| ScanError::TempDirUnavailable {
            path: working_dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::Other, source),
        })?;

    let mut summary = RunSummary::default();
    let total = files.len();

    for (batch_index, batch) in files.chunks(batch_size.max(1)).enumerate() {
        let jobs: Vec<Job> = batch
            .iter()
            .map(|path| new_job(path, working_dir))
            .collect();

        let results: Vec<Vec<MatchRecord>> =
            pool.install(|| jobs.par_iter().map(|job| run_job(job, config)).collect());

        for (job, records) in jobs.iter().zip(results.into_iter()) {
            for record in &records {
                sink.write_line(&record.format())
                    .map_err(|_| ScanError::TempDirUnavailable {
                        path: working_dir.to_path_buf(),
                        source: std::io::Error::new(std::io::ErrorKind::Other, "sink write failed"),
                    })?;
            }
            summary.total_matches += records.len() as u64;
            summary.files_scanned += 1;

            if config.debug {
                merge_debug_log(&job.temp_log_path, debug_sink);
            }
            let _ = std::fs::remove_file(&job.temp_output_path);
            let _ = std::fs::remove_file(&job.temp_log_path);
        }

        if !config.quiet {
            let completed = (batch_index * batch_size + batch.len()).min(total);
            tracing::info!(
                completed,
                total,
                elapsed_secs = config.start_time.elapsed().as_secs_f64(),
                "scan progress"
            );
        }
    }

    Ok(summary)
}

fn new_job(path: &Path, working_dir: &Path) -> Job {
    let id = Uuid::new_v4();
    Job {
        input_path: path.to_path_buf(),
        temp_output_path: working_dir.join(format!("{id}.txt")),
        temp_log_path: working_dir.join(format!("{id}.log")),
    }
}

/// Scan one job's file and return its records. Any per-file failure (§7's
/// `FileNotFound`/`FileIOError`) is caught here, recorded to the job's debug
/// temp file, and treated as zero matches — the run continues
/// (`WorkerException` policy, §7).
fn run_job(job: &Job, config: &ScanConfig) -> Vec<MatchRecord> {
    match scanner::scan_file(&job.input_path, config) {
        Ok(records) => records,
        Err(e) => {
            let _ = std::fs::write(&job.temp_log_path, format!("{e}\n"));
            Vec::new()
        }
    }
}

fn merge_debug_log(temp_log_path: &Path, debug_sink: Option<&DebugSink>) {
    let Some(debug_sink) = debug_sink else {
        return;
    };
    let Ok(contents) = std::fs::read_to_string(temp_log_path) else {
        return;
    };
    for line in contents.lines() {
        if !line.is_empty() {
            let _ = debug_sink.log("scan", line);
        }
    }
}

/// Elapsed time formatted as `HH:MM:SS` for the §6.3 trailer.
pub fn format_elapsed(start: Instant) -> String {
    let secs = start.elapsed().as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::CodepageMode;
    use crate::core::pattern::{compile, CompileOptions};
    use crate::core::signature::SignatureTable;
    use std::sync::Arc;

    fn config(pattern: &str, parallelism: usize) -> ScanConfig {
        ScanConfig {
            regex: compile(pattern, CompileOptions::default()).unwrap(),
            text_only: false,
            signatures: Arc::new(SignatureTable::builtin()),
            codepage: CodepageMode::Auto,
            first_match_only: false,
            output_matched_part: false,
            parallelism,
            quiet: true,
            debug: false,
            start_time: Instant::now(),
        }
    }

    #[test]
    fn resolve_parallelism_zero_uses_available_cores() {
        assert!(resolve_parallelism(0) >= 1);
        assert_eq!(resolve_parallelism(4), 4);
    }

    #[test]
    fn run_scans_all_files_and_orders_results_by_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let working_dir = dir.path().join("work");
        std::fs::create_dir_all(&working_dir).unwrap();

        let mut files = Vec::new();
        for i in 0..6 {
            let path = dir.path().join(format!("f{i}.txt"));
            std::fs::write(&path, format!("line one\nERROR {i}\n")).unwrap();
            files.push(path);
        }

        let result_path = dir.path().join("result.txt");
        let sink = Sink::open(&result_path).unwrap();
        let cfg = config("ERROR", 2);

        let summary = run(&files, &cfg, &working_dir, &sink, None).unwrap();
        assert_eq!(summary.total_matches, 6);
        assert_eq!(summary.files_scanned, 6);

        drop(sink);
        let contents = std::fs::read_to_string(&result_path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 6);
        for (i, line) in lines.iter().enumerate() {
            assert!(line.contains(&format!("f{i}.txt")));
        }
    }

    #[test]
    fn determinism_under_varying_parallelism() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = Vec::new();
        for i in 0..20 {
            let path = dir.path().join(format!("f{i:02}.txt"));
            std::fs::write(&path, format!("ERROR {i}\n")).unwrap();
            files.push(path);
        }

        let mut outputs = Vec::new();
        for parallelism in [1, 4, 8] {
            let working_dir = dir.path().join(format!("work-{parallelism}"));
            std::fs::create_dir_all(&working_dir).unwrap();
            let result_path = dir.path().join(format!("result-{parallelism}.txt"));
            let sink = Sink::open(&result_path).unwrap();
            let cfg = config("ERROR", parallelism);
            run(&files, &cfg, &working_dir, &sink, None).unwrap();
            drop(sink);
            outputs.push(std::fs::read_to_string(&result_path).unwrap());
        }

        assert!(outputs.windows(2).all(|w| w[0] == w[1]));
    }
}

// jgrep - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing and validation
// 2. Logging initialisation (RUST_LOG > --debug > "info")
// 3. Signature table resolution (builtin or --signatures JSON)
// 4. Directory discovery, pattern compilation, scan orchestration
// 5. Result artifact header/body/trailer, process exit code

pub use jgrep::{app, core, platform, util};

use clap::{Parser, ValueEnum};
use core::discovery::{self, DiscoveryConfig};
use core::model::{CodepageMode, EncodingKey, ScanConfig};
use core::pattern::{self, CompileOptions};
use core::signature::SignatureTable;
use core::signature_import;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use util::error::GrepError;

/// CLI-facing mirror of [`EncodingKey`], giving `clap` a closed set of
/// `--codepage` values instead of free-form string parsing.
#[derive(ValueEnum, Clone, Copy, Debug)]
#[value(rename_all = "lower")]
enum CodepageArg {
    Ascii,
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
    Sjis,
    Jis,
    Euc,
}

impl From<CodepageArg> for EncodingKey {
    fn from(arg: CodepageArg) -> Self {
        match arg {
            CodepageArg::Ascii => EncodingKey::Ascii,
            CodepageArg::Utf8 => EncodingKey::Utf8N,
            CodepageArg::Utf8Bom => EncodingKey::Utf8Bom,
            CodepageArg::Utf16Le => EncodingKey::Utf16Le,
            CodepageArg::Utf16Be => EncodingKey::Utf16Be,
            CodepageArg::Utf32Le => EncodingKey::Utf32Le,
            CodepageArg::Utf32Be => EncodingKey::Utf32Be,
            CodepageArg::Sjis => EncodingKey::Sjis,
            CodepageArg::Jis => EncodingKey::Jis,
            CodepageArg::Euc => EncodingKey::Euc,
        }
    }
}

/// jgrep - parallel recursive text search with binary detection and
/// Japanese-aware encoding auto-detection.
#[derive(Parser, Debug)]
#[command(name = "jgrep", version, about)]
struct Cli {
    /// Pattern to search for (literal by default; see --regex).
    pattern: String,

    /// Root directory to search.
    root: PathBuf,

    /// Filename glob to restrict which files are scanned (e.g. "*.log").
    #[arg(long = "target", default_value = "*")]
    search_target: String,

    /// Recurse into subdirectories.
    #[arg(short = 'r', long)]
    recurse: bool,

    /// Skip files the binary classifier (C1/C2) identifies as non-text.
    #[arg(long = "text-only")]
    text_only: bool,

    /// Match whole words only. Mutually exclusive with --regex (§4.4).
    #[arg(short = 'w', long, conflicts_with = "use_regex")]
    word: bool,

    /// Case-insensitive matching.
    #[arg(short = 'i', long = "ignore-case")]
    ignore_case: bool,

    /// Treat `pattern` as a regular expression instead of a literal string.
    #[arg(long = "regex")]
    use_regex: bool,

    /// Force a specific encoding instead of auto-detecting (§4.2). Omit for
    /// AUTO.
    #[arg(long, value_enum)]
    codepage: Option<CodepageArg>,

    /// Emit only the matched substring instead of the whole line.
    #[arg(long = "match-part")]
    output_matched_part: bool,

    /// Stop scanning a file after its first matching line.
    #[arg(long = "first-match-only")]
    first_match_only: bool,

    /// Semicolon-separated directory-name glob exclusions.
    #[arg(long = "exclude-dirs", default_value = "")]
    exclude_dirs: String,

    /// Semicolon-separated filename glob exclusions.
    #[arg(long = "exclude-files", default_value = "")]
    exclude_files: String,

    /// Worker-pool width. 0 (default) uses the available core count.
    #[arg(long, default_value_t = 0)]
    parallelism: usize,

    /// Suppress progress reporting.
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Enable debug logging and the per-run debug log file.
    #[arg(short = 'd', long)]
    debug: bool,

    /// External signature-table JSON file (replaces the builtin table).
    #[arg(long)]
    signatures: Option<PathBuf>,

    /// Result artifact path. Defaults to stdout when omitted.
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    util::logging::init(cli.debug);

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "jgrep starting"
    );

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), GrepError> {
    let start_time = Instant::now();

    let signatures = match &cli.signatures {
        Some(path) => signature_import::load_signature_table(path)?,
        None => SignatureTable::builtin(),
    };

    let regex = pattern::compile(
        &cli.pattern,
        CompileOptions {
            use_regex: cli.use_regex,
            ignore_case: cli.ignore_case,
            word: cli.word,
        },
    )?;

    let codepage = match cli.codepage {
        None => CodepageMode::Auto,
        Some(arg) => CodepageMode::Fixed(arg.into()),
    };

    let discovery_config = DiscoveryConfig {
        search_target: cli.search_target.clone(),
        exclude_dirs: discovery::parse_glob_list(&cli.exclude_dirs),
        exclude_files: discovery::parse_glob_list(&cli.exclude_files),
        recurse: cli.recurse,
        ..DiscoveryConfig::default()
    };

    let (files, warnings) = discovery::discover_files(&cli.root, &discovery_config)?;
    for warning in &warnings {
        tracing::warn!(%warning, "discovery warning");
    }

    let working_dir = platform::fs::working_dir().map_err(|source| {
        GrepError::Scan(util::error::ScanError::TempDirUnavailable {
            path: std::env::temp_dir(),
            source,
        })
    })?;

    let config = ScanConfig {
        regex,
        text_only: cli.text_only,
        signatures: Arc::new(signatures),
        codepage,
        first_match_only: cli.first_match_only,
        output_matched_part: cli.output_matched_part,
        parallelism: cli.parallelism,
        quiet: cli.quiet,
        debug: cli.debug,
        start_time,
    };

    let result_path = cli.output.clone();
    let sink = match &result_path {
        Some(path) => app::sink::Sink::open(path)?,
        None => app::sink::Sink::open(&stdout_proxy_path(&working_dir))?,
    };

    let mut debug_sink = if cli.debug {
        let log_path = match &result_path {
            Some(path) => app::sink::debug_log_path(path),
            None => working_dir.join("jgrep.log"),
        };
        Some(app::sink::DebugSink::open(&log_path)?)
    } else {
        None
    };

    write_header(&sink, &cli, &files)?;

    let summary = app::orchestrator::run(
        &files,
        &config,
        &working_dir,
        &sink,
        debug_sink.as_ref(),
    )?;

    write_trailer(&sink, &summary, start_time)?;

    let mut sink = sink;
    sink.close()?;
    if let Some(ds) = debug_sink.as_mut() {
        ds.close()?;
    }

    if result_path.is_none() {
        let proxy_path = stdout_proxy_path(&working_dir);
        if let Ok(contents) = std::fs::read_to_string(&proxy_path) {
            print!("{contents}");
            let _ = io::stdout().flush();
        }
        let _ = std::fs::remove_file(&proxy_path);
    }

    platform::fs::cleanup_working_dir(&working_dir);

    Ok(())
}

/// When no `--output` path is given, the sink still needs a real file to
/// append to (§4.7's sink is file-backed); it is copied to stdout and
/// removed once the run completes.
fn stdout_proxy_path(working_dir: &std::path::Path) -> PathBuf {
    working_dir.join("stdout-result.txt")
}

fn write_header(
    sink: &app::sink::Sink,
    cli: &Cli,
    files: &[PathBuf],
) -> Result<(), util::error::SinkError> {
    sink.write_blank()?;
    sink.write_line(&format!("Pattern: {}", cli.pattern))?;
    sink.write_line(&format!("Search target: {}", cli.search_target))?;
    sink.write_line(&format!("Root: {}", cli.root.display()))?;
    sink.write_line(&format!("Files discovered: {}", files.len()))?;
    if !cli.exclude_dirs.trim().is_empty() {
        sink.write_line(&format!("Excluded directories: {}", cli.exclude_dirs))?;
    }
    if !cli.exclude_files.trim().is_empty() {
        sink.write_line(&format!("Excluded files: {}", cli.exclude_files))?;
    }
    sink.write_line(&format!("Recurse: {}", cli.recurse))?;
    sink.write_line(&format!("Text only: {}", cli.text_only))?;
    sink.write_line(&format!("Word match: {}", cli.word))?;
    sink.write_line(&format!("Case sensitive: {}", !cli.ignore_case))?;
    sink.write_line(&format!(
        "Regex engine: {}",
        util::constants::REGEX_ENGINE_LABEL
    ))?;
    sink.write_line(&format!(
        "Codepage: {}",
        cli.codepage
            .map(|c| format!("{c:?}"))
            .unwrap_or_else(|| "AUTO".to_string())
    ))?;
    sink.write_line(&format!("Match part only: {}", cli.output_matched_part))?;
    sink.write_line(&format!("First match only: {}", cli.first_match_only))?;
    sink.write_blank()?;
    Ok(())
}

fn write_trailer(
    sink: &app::sink::Sink,
    summary: &app::orchestrator::RunSummary,
    start_time: Instant,
) -> Result<(), util::error::SinkError> {
    sink.write_blank()?;
    sink.write_line(&format!(
        "{} items matched. - Elapsed: {}",
        summary.total_matches,
        app::orchestrator::format_elapsed(start_time)
    ))
}

//! epsclean: EPS path reconstruction for fragmented plot output.
//!
//! Numerical-plotting toolkits emit every filled patch, contour band
//! and line segment as its own graphics-state block. The resulting
//! EPS files carry thousands of micro-paths that bloat editors, break
//! polylines apart and leave hairline gaps between fills that should
//! read as one region. This crate regroups blocks that share
//! rendering state, traces their segments back into continuous
//! polylines and (optionally) merges adjacent filled polygons —
//! while passing every byte it does not understand through verbatim.
//!
//! # Example
//!
//! ```no_run
//! use epsclean::{clean_file, CleanConfig};
//! use std::path::Path;
//!
//! let config = CleanConfig {
//!     combine_areas: true,
//!     ..CleanConfig::default()
//! };
//! // In-place: writes a sibling temp file, then renames over the input.
//! let stats = clean_file(Path::new("figure.eps"), None, &config)?;
//! eprintln!("{} blocks -> {}", stats.blocks_in, stats.blocks_out);
//! # Ok::<(), epsclean::CleanError>(())
//! ```

#![forbid(unsafe_code)]

mod block;
mod config;
mod error;
mod fill;
mod geom;
mod graph;
mod line;
mod parse;
mod stroke;
mod writer;

pub use config::CleanConfig;
pub use error::CleanError;

use std::fs;
use std::path::{Path, PathBuf};

use line::Lines;

/// Counters describing one cleaning run. Informational only — the
/// engine is silent on success and the numbers never influence the
/// output bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanStats {
    /// Input lines.
    pub lines: usize,
    /// Graphics-state blocks parsed.
    pub blocks_in: usize,
    /// Blocks written after grouping.
    pub blocks_out: usize,
    /// Stroke segments read from path content.
    pub segments_in: usize,
    /// Continuous polylines reconstructed from those segments.
    pub polylines_out: usize,
    /// Fill polygons read (area combining only).
    pub polygons_in: usize,
    /// Fill polygons merged into a neighbor.
    pub polygons_merged: usize,
}

/// The cleaned document plus its run counters.
#[derive(Debug, Clone)]
pub struct CleanResult {
    pub output: String,
    pub stats: CleanStats,
}

/// Clean an EPS document held in memory.
///
/// Infallible: input that is not recognizable EPS (no
/// `%%EndPageSetup` marker, unbalanced brackets, truncated blocks)
/// degrades to verbatim passthrough, never to an error.
pub fn clean_str(input: &str, config: &CleanConfig) -> CleanResult {
    let lines = Lines::split(input);
    let (output, stats) = parse::run(&lines, config);
    CleanResult { output, stats }
}

/// Clean an EPS file on disk.
///
/// With `output = None` (or equal to `input`) the result replaces the
/// input: it is first written to a sibling temp file and then renamed
/// over the original, so a failed write never corrupts the source.
pub fn clean_file(
    input: &Path,
    output: Option<&Path>,
    config: &CleanConfig,
) -> Result<CleanStats, CleanError> {
    let text = fs::read_to_string(input).map_err(|source| CleanError::Read {
        path: input.to_path_buf(),
        source,
    })?;

    let result = clean_str(&text, config);

    match output {
        Some(path) if path != input => {
            fs::write(path, &result.output).map_err(|source| CleanError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        _ => {
            let tmp = sibling_temp(input);
            fs::write(&tmp, &result.output).map_err(|source| CleanError::Write {
                path: tmp.clone(),
                source,
            })?;
            fs::rename(&tmp, input).map_err(|source| CleanError::Replace {
                path: input.to_path_buf(),
                source,
            })?;
        }
    }

    Ok(result.stats)
}

/// Temp path next to `path` (same filesystem, so the rename is atomic).
fn sibling_temp(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".epsclean.tmp");
    path.with_file_name(name)
}

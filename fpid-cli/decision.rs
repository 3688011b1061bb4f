use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::scanner::RankedList;

/// Filename and score of one ranked candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateSummary {
    pub filename: String,
    pub score: usize,
}

/// Outcome of one identification run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentifyResult {
    /// The best candidate reached the not-found threshold
    pub ok: bool,
    /// Numeric identifier parsed from the best filename
    pub identifier: Option<u64>,
    pub best_filename: Option<String>,
    pub best_score: usize,
    pub top_k: Vec<CandidateSummary>,
    /// Where the match diagram was written, if it was
    pub vis_path: Option<PathBuf>,
    /// Database entries that could not be decoded
    pub skipped: Vec<String>,
    pub message: String,
}

impl IdentifyResult {
    /// Failed result carrying only a message
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            identifier: None,
            best_filename: None,
            best_score: 0,
            top_k: Vec::new(),
            vis_path: None,
            skipped: Vec::new(),
            message: message.into(),
        }
    }
}

/// First run of decimal digits in the file stem, e.g. `"0_thumb.bmp"` gives
/// 0 and `"finger17.png"` gives 17.
///
/// Names without digits, or whose digits overflow `u64`, give `None`.
pub fn identifier_from_filename(filename: &str) -> Option<u64> {
    let stem = Path::new(filename).file_stem()?.to_str()?;
    let start = stem.find(|c: char| c.is_ascii_digit())?;
    let digits = &stem[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}

/// Accept or reject the best candidate of `ranked`.
///
/// Success requires `best.score >= not_found_threshold`. The visualization
/// path and skipped list are filled in by the caller.
pub fn decide(ranked: &RankedList, not_found_threshold: usize, top_k: usize) -> IdentifyResult {
    let Some(best) = ranked.best() else {
        return IdentifyResult::failure("no candidates to rank");
    };

    let summaries = ranked
        .top(top_k)
        .iter()
        .map(|r| CandidateSummary {
            filename: r.filename.clone(),
            score: r.score,
        })
        .collect();

    let ok = best.score >= not_found_threshold;
    let identifier = if ok {
        identifier_from_filename(&best.filename)
    } else {
        None
    };

    let message = if ok {
        match identifier {
            Some(id) => format!(
                "recognized: ID={id} file={} (good matches: {})",
                best.filename, best.score
            ),
            None => format!(
                "recognized: file={} (good matches: {}), no numeric ID in filename",
                best.filename, best.score
            ),
        }
    } else {
        format!(
            "not recognized: best match {} has {} good matches, below threshold {}",
            best.filename, best.score, not_found_threshold
        )
    };

    IdentifyResult {
        ok,
        identifier,
        best_filename: Some(best.filename.clone()),
        best_score: best.score,
        top_k: summaries,
        vis_path: None,
        skipped: Vec::new(),
        message,
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use fpid_core::{Descriptor, Keypoint, MatchPair};
use fpid_match::{accepted_matches, Matcher};

use crate::error::{EngineResult, IdentifyError};
use crate::extractor::{Extractor, Features};
use crate::io::load_core_image;

/// One database image scored against the query
#[derive(Debug, Clone)]
pub struct CandidateRecord {
    pub filename: String,
    pub path: PathBuf,
    pub keypoints: Vec<Keypoint>,
    pub descriptors: Vec<Descriptor>,
    /// Number of ratio-accepted matches
    pub score: usize,
    pub accepted: Vec<MatchPair>,
}

impl CandidateRecord {
    /// Record with no features; scores zero
    pub fn empty(filename: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
            path: path.into(),
            keypoints: Vec::new(),
            descriptors: Vec::new(),
            score: 0,
            accepted: Vec::new(),
        }
    }
}

/// Candidates ordered by descending score; equal scores keep enumeration
/// order
#[derive(Debug, Clone, Default)]
pub struct RankedList {
    records: Vec<CandidateRecord>,
}

impl RankedList {
    pub fn from_records(mut records: Vec<CandidateRecord>) -> Self {
        records.sort_by(|a, b| b.score.cmp(&a.score));
        Self { records }
    }

    /// Append entries that could not be scored; they rank below every scored
    /// entry, in the given order
    pub fn append_unscored(&mut self, unscored: impl IntoIterator<Item = CandidateRecord>) {
        self.records.extend(unscored.into_iter().map(|mut r| {
            r.score = 0;
            r.accepted.clear();
            r
        }));
    }

    pub fn best(&self) -> Option<&CandidateRecord> {
        self.records.first()
    }

    /// The first `k` entries (fewer if the list is shorter)
    pub fn top(&self, k: usize) -> &[CandidateRecord] {
        &self.records[..k.min(self.records.len())]
    }

    pub fn records(&self) -> &[CandidateRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Result of scanning a database directory
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub ranked: RankedList,
    /// Names of entries that could not be decoded, in enumeration order
    pub skipped: Vec<String>,
}

/// Regular files of `dir`, ordered by file name
fn list_files(dir: &Path) -> EngineResult<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(dir).map_err(|source| IdentifyError::DatabaseUnreadable {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<(String, PathBuf)> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter_map(|path| {
            let name = path.file_name()?.to_string_lossy().into_owned();
            Some((name, path))
        })
        .collect();
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

/// Score every image of `db_dir` against the query features.
///
/// A file that fails to decode is logged, listed in `skipped` and placed at
/// the bottom of the ranking with score zero; the scan continues with the
/// next file. A decodable image with no features is ranked normally with
/// score zero.
pub fn scan_database(
    extractor: &Extractor,
    matcher: &Matcher,
    query: &Features,
    db_dir: &Path,
    ratio: f32,
) -> EngineResult<ScanOutcome> {
    let files = list_files(db_dir)?;
    tracing::debug!(files = files.len(), dir = %db_dir.display(), "scanning database");

    let mut records = Vec::with_capacity(files.len());
    let mut unreadable = Vec::new();
    let mut skipped = Vec::new();

    for (filename, path) in files {
        let img = match load_core_image(&path) {
            Ok(img) => img,
            Err(err) => {
                tracing::warn!(file = %filename, error = %err, "skipping unreadable database entry");
                unreadable.push(CandidateRecord::empty(filename.clone(), path));
                skipped.push(filename);
                continue;
            }
        };

        let features = match extractor.features(&img) {
            Ok(features) => features,
            Err(err) => {
                tracing::warn!(file = %filename, error = %err, "skipping database entry");
                unreadable.push(CandidateRecord::empty(filename.clone(), path));
                skipped.push(filename);
                continue;
            }
        };

        if features.is_empty() {
            tracing::debug!(file = %filename, "no features, scoring zero");
            records.push(CandidateRecord::empty(filename, path));
            continue;
        }

        let knn = matcher.knn_match(&query.descriptors, &features.descriptors);
        let accepted = accepted_matches(&knn, ratio);
        tracing::debug!(
            file = %filename,
            features = features.len(),
            score = accepted.len(),
            "scored candidate"
        );

        records.push(CandidateRecord {
            filename,
            path,
            keypoints: features.keypoints,
            descriptors: features.descriptors,
            score: accepted.len(),
            accepted,
        });
    }

    if records.is_empty() {
        return Err(IdentifyError::EmptyDatabase {
            path: db_dir.to_path_buf(),
        });
    }

    let mut ranked = RankedList::from_records(records);
    ranked.append_unscored(unreadable);
    Ok(ScanOutcome { ranked, skipped })
}

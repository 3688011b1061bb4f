use std::path::{Path, PathBuf};

use fpid_core::IdentifyConfig;
use fpid_match::Matcher;
use image::GrayImage;

use crate::decision::{decide, IdentifyResult};
use crate::error::{EngineResult, IdentifyError};
use crate::extractor::{Extractor, Features};
use crate::io::{load_gray_image, load_image_pair};
use crate::scanner::{scan_database, CandidateRecord};
use crate::visualize::{render_matches, save_visualization};

/// 1:N identification against a database directory.
///
/// The extractor and matcher are built once and reused for every database
/// file of every call; no other state is kept between calls.
#[derive(Debug, Clone)]
pub struct Identifier {
    cfg: IdentifyConfig,
    extractor: Extractor,
    matcher: Matcher,
}

impl Identifier {
    pub fn new(cfg: IdentifyConfig) -> EngineResult<Self> {
        cfg.validate()?;
        let extractor = Extractor::new(&cfg.extractor)?;
        let matcher = Matcher::new(cfg.matcher.clone())?;
        Ok(Self {
            cfg,
            extractor,
            matcher,
        })
    }

    pub fn config(&self) -> &IdentifyConfig {
        &self.cfg
    }

    /// Identify `source` against every image in `database`.
    ///
    /// Never fails: missing inputs, an empty database or a featureless source
    /// produce a result with `ok == false` and the reason in `message`.
    pub fn identify<S, D>(&self, source: S, database: D) -> IdentifyResult
    where
        S: AsRef<Path>,
        D: AsRef<Path>,
    {
        let (source, database) = (source.as_ref(), database.as_ref());
        let _span = tracing::info_span!(
            "identify",
            source = %source.display(),
            database = %database.display()
        )
        .entered();

        match self.run(source, database) {
            Ok(result) => {
                tracing::info!(
                    ok = result.ok,
                    best = result.best_filename.as_deref().unwrap_or("-"),
                    score = result.best_score,
                    "identification finished"
                );
                result
            }
            Err(err) => {
                tracing::warn!(error = %err, "identification failed");
                IdentifyResult::failure(err.to_string())
            }
        }
    }

    fn run(&self, source: &Path, database: &Path) -> EngineResult<IdentifyResult> {
        if !source.exists() {
            return Err(IdentifyError::SourceMissing {
                path: source.to_path_buf(),
            });
        }
        if !database.is_dir() {
            return Err(IdentifyError::DatabaseMissing {
                path: database.to_path_buf(),
            });
        }

        let (query_gray, query_img) =
            load_image_pair(source).map_err(|source_err| IdentifyError::SourceUnreadable {
                path: source.to_path_buf(),
                source: source_err,
            })?;
        let query = self.extractor.extract(&query_img, source)?;
        tracing::info!(features = query.len(), "source features extracted");

        let scan = scan_database(
            &self.extractor,
            &self.matcher,
            &query,
            database,
            self.cfg.ratio,
        )?;
        tracing::info!(
            candidates = scan.ranked.len(),
            skipped = scan.skipped.len(),
            "database scanned"
        );

        let mut result = decide(&scan.ranked, self.cfg.not_found_threshold, self.cfg.top_k);
        result.skipped = scan.skipped;

        if self.cfg.save_visualization {
            if let Some(best) = scan.ranked.best() {
                match self.write_visualization(&query_gray, &query, best) {
                    Ok(path) => result.vis_path = Some(path),
                    Err(err) => tracing::warn!(error = %err, "visualization not written"),
                }
            }
        }

        Ok(result)
    }

    fn write_visualization(
        &self,
        query_img: &GrayImage,
        query: &Features,
        best: &CandidateRecord,
    ) -> EngineResult<PathBuf> {
        let path = &self.cfg.visualization_path;

        // candidate pixels are not retained by the scan
        let best_img = load_gray_image(&best.path).map_err(|source| IdentifyError::Visualization {
            path: path.clone(),
            source,
        })?;
        let canvas = render_matches(
            query_img,
            &query.keypoints,
            &best_img,
            &best.keypoints,
            &best.accepted,
        );

        let written = save_visualization(&canvas, path, self.cfg.preview_scale)?;
        tracing::debug!(path = %written.display(), pairs = best.accepted.len(), "visualization written");
        Ok(written)
    }
}

/// One-shot identification with explicit parameters; extractor and matcher
/// settings take their defaults.
///
/// Invalid parameters (for example a ratio outside `(0, 1]` or `top_k == 0`)
/// produce a failed result like any other error.
pub fn identify<S, D, V>(
    source: S,
    database: D,
    ratio: f32,
    not_found_threshold: usize,
    top_k: usize,
    produce_visualization: bool,
    visualization_path: V,
) -> IdentifyResult
where
    S: AsRef<Path>,
    D: AsRef<Path>,
    V: Into<PathBuf>,
{
    let mut cfg = IdentifyConfig::default()
        .with_ratio(ratio)
        .with_threshold(not_found_threshold)
        .with_top_k(top_k)
        .with_visualization(visualization_path);
    if !produce_visualization {
        cfg = cfg.without_visualization();
    }

    match Identifier::new(cfg) {
        Ok(identifier) => identifier.identify(source, database),
        Err(err) => IdentifyResult::failure(err.to_string()),
    }
}

use std::path::Path;

use fpid_core::VerifyConfig;
use fpid_match::{count_accepted, Matcher};
use serde::Serialize;

use crate::error::{EngineResult, IdentifyError};
use crate::extractor::Extractor;
use crate::io::load_core_image;

/// Outcome of a 1:1 comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyResult {
    pub passed: bool,
    pub good_matches: usize,
    pub pass_threshold: usize,
    pub message: String,
}

impl VerifyResult {
    fn failure(pass_threshold: usize, message: impl Into<String>) -> Self {
        Self {
            passed: false,
            good_matches: 0,
            pass_threshold,
            message: message.into(),
        }
    }
}

/// Compare `source` against a single enrolled `model` image.
///
/// Passes when the ratio-accepted match count reaches
/// `cfg.pass_threshold`. Errors become a failed result.
pub fn verify<S, M>(source: S, model: M, cfg: &VerifyConfig) -> VerifyResult
where
    S: AsRef<Path>,
    M: AsRef<Path>,
{
    let (source, model) = (source.as_ref(), model.as_ref());
    let _span = tracing::info_span!(
        "verify",
        source = %source.display(),
        model = %model.display()
    )
    .entered();

    match count_good_matches(source, model, cfg) {
        Ok(good_matches) => {
            let passed = good_matches >= cfg.pass_threshold;
            tracing::info!(good_matches, passed, "verification finished");
            let message = if passed {
                format!(
                    "verification passed: {good_matches} good matches (threshold {})",
                    cfg.pass_threshold
                )
            } else {
                format!(
                    "verification failed: {good_matches} good matches, below threshold {}",
                    cfg.pass_threshold
                )
            };
            VerifyResult {
                passed,
                good_matches,
                pass_threshold: cfg.pass_threshold,
                message,
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "verification failed");
            VerifyResult::failure(cfg.pass_threshold, err.to_string())
        }
    }
}

fn count_good_matches(source: &Path, model: &Path, cfg: &VerifyConfig) -> EngineResult<usize> {
    cfg.validate()?;
    let extractor = Extractor::new(&cfg.extractor)?;
    let matcher = Matcher::new(cfg.matcher.clone())?;

    let load = |path: &Path| {
        if !path.exists() {
            return Err(IdentifyError::SourceMissing {
                path: path.to_path_buf(),
            });
        }
        load_core_image(path).map_err(|source| IdentifyError::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        })
    };
    let src_img = load(source)?;
    let model_img = load(model)?;

    let src = extractor.extract(&src_img, source)?;
    let enrolled = extractor.extract(&model_img, model)?;

    let knn = matcher.knn_match(&src.descriptors, &enrolled.descriptors);
    Ok(count_accepted(&knn, cfg.ratio))
}

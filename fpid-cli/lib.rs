//! Fingerprint identification engine.
//!
//! A source image is compared against every image in a database directory:
//! FAST keypoints with oriented BRIEF descriptors are extracted from each
//! image, matched with an approximate k=2 search, filtered with Lowe's ratio
//! test, and the candidates ranked by accepted-match count. The best candidate
//! is accepted when its count reaches the not-found threshold, and a
//! side-by-side match diagram can be written to disk.
//!
//! ```no_run
//! use fpid::{IdentifyConfig, Identifier};
//!
//! let identifier = Identifier::new(IdentifyConfig::default()).unwrap();
//! let result = identifier.identify("data/src.bmp", "data/database");
//! println!("{}", result.message);
//! ```

pub mod check;
pub mod decision;
pub mod error;
pub mod extractor;
pub mod identify;
pub mod io;
pub mod scanner;
pub mod verify;
pub mod visualize;

pub use check::{check_inputs, DatabaseCheck, ImageCheck, InputReport};
pub use decision::{decide, identifier_from_filename, CandidateSummary, IdentifyResult};
pub use error::{EngineResult, IdentifyError};
pub use extractor::{Extractor, Features};
pub use identify::{identify, Identifier};
pub use scanner::{scan_database, CandidateRecord, RankedList, ScanOutcome};
pub use verify::{verify, VerifyResult};
pub use visualize::{render_matches, save_visualization};

pub use fpid_core::{
    self, ExtractorConfig, IdentifyConfig, MatcherConfig, MatcherKind, PersistentConfig,
    VerifyConfig,
};

//! Pre-flight report on input images and the database directory.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::io::load_gray_image;

/// Number of database file names listed in the report
const SAMPLE_NAMES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageCheck {
    pub path: PathBuf,
    pub exists: bool,
    pub readable: bool,
    /// (width, height) when the file decodes
    pub dimensions: Option<(u32, u32)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseCheck {
    pub path: PathBuf,
    pub exists: bool,
    pub file_count: usize,
    /// First file names in ascending order
    pub sample: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputReport {
    pub images: Vec<ImageCheck>,
    pub database: DatabaseCheck,
}

impl InputReport {
    /// Every image decodes and the database holds at least one file
    pub fn all_ok(&self) -> bool {
        self.images.iter().all(|i| i.readable) && self.database.file_count > 0
    }
}

/// Check that each of `paths` exists and decodes, and summarize `db_dir`
pub fn check_inputs<P: AsRef<Path>>(paths: &[P], db_dir: &Path) -> InputReport {
    let images = paths
        .iter()
        .map(|p| {
            let path = p.as_ref();
            let decoded = load_gray_image(path).ok();
            ImageCheck {
                path: path.to_path_buf(),
                exists: path.exists(),
                readable: decoded.is_some(),
                dimensions: decoded.map(|img| img.dimensions()),
            }
        })
        .collect();

    InputReport {
        images,
        database: check_database(db_dir),
    }
}

fn check_database(dir: &Path) -> DatabaseCheck {
    let mut names: Vec<String> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .filter(|e| e.path().is_file())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();

    let file_count = names.len();
    names.truncate(SAMPLE_NAMES);
    DatabaseCheck {
        path: dir.to_path_buf(),
        exists: dir.is_dir(),
        file_count,
        sample: names,
    }
}

impl fmt::Display for InputReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for img in &self.images {
            writeln!(
                f,
                "[check] {}: {}",
                img.path.display(),
                if img.exists { "EXISTS" } else { "MISSING" }
            )?;
            match img.dimensions {
                Some((w, h)) => writeln!(f, "  read: OK | size: {w}x{h}")?,
                None => writeln!(f, "  read: FAIL")?,
            }
        }

        let db = &self.database;
        if !db.exists {
            return write!(f, "[check] {}: MISSING", db.path.display());
        }
        write!(
            f,
            "[check] {}: {} files -> [{}]{}",
            db.path.display(),
            db.file_count,
            db.sample.join(", "),
            if db.file_count > SAMPLE_NAMES { " ..." } else { "" }
        )
    }
}

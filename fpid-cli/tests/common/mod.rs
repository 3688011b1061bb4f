#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use image::{GrayImage, Luma};
use rand::{rngs::StdRng, Rng, SeedableRng};

pub const SIZE: u32 = 128;
const BLOCK: u32 = 6;

/// Blocky random texture; every seed gives a different, feature-rich image
pub fn texture(seed: u64) -> GrayImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let cells = SIZE.div_ceil(BLOCK);
    let values: Vec<u8> = (0..cells * cells).map(|_| rng.random()).collect();
    GrayImage::from_fn(SIZE, SIZE, |x, y| {
        Luma([values[((y / BLOCK) * cells + x / BLOCK) as usize]])
    })
}

pub fn flat(value: u8) -> GrayImage {
    GrayImage::from_pixel(SIZE, SIZE, Luma([value]))
}

/// Fresh, empty scratch directory for one test
pub fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("fpid-it-{}-{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn save(img: &GrayImage, path: &Path) {
    img.save(path).unwrap();
}

/// Five-file database whose `2_copy.png` duplicates `texture(1)`; returns
/// (source path, database dir)
pub fn fixture(name: &str) -> (PathBuf, PathBuf) {
    let root = scratch(name);
    let db = root.join("database");
    fs::create_dir_all(&db).unwrap();

    let source = root.join("src.png");
    save(&texture(1), &source);

    save(&texture(11), &db.join("0_alpha.png"));
    save(&texture(12), &db.join("1_beta.bmp"));
    save(&texture(1), &db.join("2_copy.png"));
    save(&texture(13), &db.join("3_gamma.png"));
    save(&texture(14), &db.join("4_delta.bmp"));

    (source, db)
}

pub fn cleanup(path: &Path) {
    let _ = fs::remove_dir_all(path);
}

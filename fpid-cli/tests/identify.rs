mod common;

use std::fs;

use fpid::{identify, IdentifyConfig, Identifier, MatcherConfig};

use common::{cleanup, fixture, flat, save, scratch, texture};

fn identifier(cfg: IdentifyConfig) -> Identifier {
    Identifier::new(cfg).unwrap()
}

#[test]
fn test_duplicate_is_recognized() {
    let (source, db) = fixture("duplicate");
    let root = db.parent().unwrap().to_path_buf();

    let result = identifier(IdentifyConfig::default().without_visualization()).identify(&source, &db);

    assert!(result.ok, "{}", result.message);
    assert_eq!(result.identifier, Some(2));
    assert_eq!(result.best_filename.as_deref(), Some("2_copy.png"));
    assert!(result.best_score >= 50, "score {}", result.best_score);
    assert_eq!(result.top_k.len(), 3);
    assert_eq!(result.top_k[0].filename, "2_copy.png");
    assert_eq!(result.top_k[0].score, result.best_score);
    assert!(result.top_k[1].score < result.best_score);
    assert!(result.skipped.is_empty());
    assert!(result.vis_path.is_none());
    assert!(result.message.contains("ID=2"));

    cleanup(&root);
}

#[test]
fn test_default_matcher_scores_match_exhaustive_search() {
    let (source, db) = fixture("brute-force");
    let root = db.parent().unwrap().to_path_buf();

    let run = |matcher: MatcherConfig| {
        let cfg = IdentifyConfig::default()
            .without_visualization()
            .with_top_k(5)
            .with_matcher(matcher);
        identifier(cfg).identify(&source, &db)
    };
    let indexed = run(MatcherConfig::default());
    let exhaustive = run(MatcherConfig::brute_force());
    let hashed = run(MatcherConfig::lsh());

    assert!(exhaustive.ok);
    assert_eq!(indexed.top_k.len(), 5);
    assert_eq!(indexed.top_k, exhaustive.top_k);
    assert_eq!(indexed.best_score, exhaustive.best_score);
    assert_eq!(hashed.best_filename.as_deref(), Some("2_copy.png"));

    cleanup(&root);
}

#[test]
fn test_database_entries_decode_by_content() {
    let root = scratch("sniffed-names");
    let db = root.join("db");
    fs::create_dir_all(&db).unwrap();
    let source = root.join("src.png");
    save(&texture(3), &source);
    save(&texture(21), &db.join("5_other.png"));
    fs::copy(&source, db.join("7_scan")).unwrap();
    fs::copy(&source, db.join("8_scan.dat")).unwrap();

    let result = identifier(IdentifyConfig::default().without_visualization().with_top_k(3))
        .identify(&source, &db);

    assert!(result.ok, "{}", result.message);
    assert!(result.skipped.is_empty(), "{:?}", result.skipped);
    assert_eq!(result.best_filename.as_deref(), Some("7_scan"));
    assert_eq!(result.identifier, Some(7));
    assert_eq!(result.top_k[1].filename, "8_scan.dat");
    assert_eq!(result.top_k[1].score, result.best_score);

    cleanup(&root);
}

#[test]
fn test_free_function_entry_point() {
    let (source, db) = fixture("free-fn");
    let root = db.parent().unwrap().to_path_buf();
    let vis = root.join("out").join("best.png");

    let result = identify(&source, &db, 0.8, 15, 2, true, &vis);

    assert!(result.ok);
    assert_eq!(result.identifier, Some(2));
    assert_eq!(result.top_k.len(), 2);
    assert_eq!(result.vis_path.as_deref(), Some(vis.as_path()));
    assert!(vis.is_file());

    cleanup(&root);
}

#[test]
fn test_repeated_runs_are_identical() {
    let (source, db) = fixture("determinism");
    let root = db.parent().unwrap().to_path_buf();
    let id = identifier(IdentifyConfig::default().without_visualization().with_top_k(5));

    let first = id.identify(&source, &db);
    let second = id.identify(&source, &db);
    let fresh = identifier(IdentifyConfig::default().without_visualization().with_top_k(5))
        .identify(&source, &db);

    assert_eq!(first, second);
    assert_eq!(first, fresh);

    cleanup(&root);
}

#[test]
fn test_raising_threshold_only_turns_success_off() {
    let (source, db) = fixture("threshold");
    let root = db.parent().unwrap().to_path_buf();

    let run = |t: usize| {
        identifier(IdentifyConfig::default().without_visualization().with_threshold(t))
            .identify(&source, &db)
    };
    let base = run(15);
    assert!(base.ok);

    let at = run(base.best_score);
    let above = run(base.best_score + 1);
    assert!(at.ok);
    assert!(!above.ok);
    assert_eq!(above.identifier, None);
    assert_eq!(above.best_filename, base.best_filename);
    assert_eq!(above.best_score, base.best_score);
    assert!(above.message.contains("not recognized"));

    cleanup(&root);
}

#[test]
fn test_loose_ratio_scores_at_least_as_high() {
    let (source, db) = fixture("ratio");
    let root = db.parent().unwrap().to_path_buf();

    let run = |r: f32| {
        identifier(
            IdentifyConfig::default()
                .without_visualization()
                .with_ratio(r)
                .with_top_k(5)
                .with_matcher(MatcherConfig::brute_force()),
        )
        .identify(&source, &db)
    };
    let strict = run(0.6);
    let loose = run(0.9);

    for s in &strict.top_k {
        let l = loose.top_k.iter().find(|l| l.filename == s.filename).unwrap();
        assert!(l.score >= s.score, "{}: {} < {}", s.filename, l.score, s.score);
    }

    cleanup(&root);
}

#[test]
fn test_corrupt_files_do_not_change_ranking() {
    let (source, db) = fixture("isolation");
    let root = db.parent().unwrap().to_path_buf();
    let cfg = IdentifyConfig::default().without_visualization().with_top_k(10);

    let clean = identifier(cfg.clone()).identify(&source, &db);

    fs::write(db.join("1_broken.png"), b"\x89PNG\r\n\x1a\nthis is not a png").unwrap();
    fs::write(db.join("notes.txt"), b"enrolled 2024").unwrap();
    fs::create_dir_all(db.join("nested")).unwrap();
    save(&texture(1), &db.join("nested").join("9_hidden.png"));

    let dirty = identifier(cfg).identify(&source, &db);

    assert!(dirty.ok);
    assert_eq!(dirty.best_filename, clean.best_filename);
    assert_eq!(dirty.skipped, ["1_broken.png", "notes.txt"]);
    assert_eq!(dirty.top_k.len(), clean.top_k.len() + 2);
    assert_eq!(dirty.top_k[..clean.top_k.len()], clean.top_k[..]);
    for tail in &dirty.top_k[clean.top_k.len()..] {
        assert_eq!(tail.score, 0);
    }
    assert!(dirty.top_k.iter().all(|c| c.filename != "9_hidden.png"));

    cleanup(&root);
}

#[test]
fn test_featureless_candidate_scores_zero() {
    let (source, db) = fixture("featureless");
    let root = db.parent().unwrap().to_path_buf();
    save(&flat(90), &db.join("5_blank.png"));

    let result = identifier(IdentifyConfig::default().without_visualization().with_top_k(6))
        .identify(&source, &db);

    assert!(result.ok);
    assert!(result.skipped.is_empty());
    let blank = result.top_k.iter().find(|c| c.filename == "5_blank.png").unwrap();
    assert_eq!(blank.score, 0);

    cleanup(&root);
}

#[test]
fn test_success_without_numeric_name() {
    let root = scratch("no-digits");
    let db = root.join("db");
    fs::create_dir_all(&db).unwrap();
    let source = root.join("probe.png");
    save(&texture(5), &source);
    save(&texture(5), &db.join("nodigits.png"));
    save(&texture(6), &db.join("other.png"));

    let result = identifier(IdentifyConfig::default().without_visualization()).identify(&source, &db);

    assert!(result.ok);
    assert_eq!(result.identifier, None);
    assert_eq!(result.best_filename.as_deref(), Some("nodigits.png"));
    assert!(result.message.contains("nodigits.png"));

    cleanup(&root);
}

#[test]
fn test_embedded_number_is_the_identifier() {
    let root = scratch("embedded-digits");
    let db = root.join("db");
    fs::create_dir_all(&db).unwrap();
    let source = root.join("probe.png");
    save(&texture(8), &source);
    save(&texture(8), &db.join("finger17.png"));
    save(&texture(9), &db.join("finger18.png"));

    let result = identifier(IdentifyConfig::default().without_visualization()).identify(&source, &db);

    assert!(result.ok);
    assert_eq!(result.identifier, Some(17));

    cleanup(&root);
}

#[test]
fn test_empty_database() {
    let root = scratch("empty-db");
    let db = root.join("db");
    fs::create_dir_all(&db).unwrap();
    let source = root.join("src.png");
    save(&texture(1), &source);
    let vis = root.join("vis.png");

    let result = identifier(IdentifyConfig::default().with_visualization(&vis)).identify(&source, &db);

    assert!(!result.ok);
    assert!(result.message.contains("empty"));
    assert!(result.vis_path.is_none());
    assert!(result.top_k.is_empty());
    assert!(!vis.exists());

    cleanup(&root);
}

#[test]
fn test_database_of_unreadable_files_is_empty() {
    let root = scratch("garbage-db");
    let db = root.join("db");
    fs::create_dir_all(&db).unwrap();
    fs::write(db.join("a.bmp"), b"BM garbage").unwrap();
    let source = root.join("src.png");
    save(&texture(1), &source);

    let result = identifier(IdentifyConfig::default().without_visualization()).identify(&source, &db);

    assert!(!result.ok);
    assert!(result.message.contains("empty"));

    cleanup(&root);
}

#[test]
fn test_missing_database() {
    let root = scratch("missing-db");
    let source = root.join("src.png");
    save(&texture(1), &source);

    let result = identifier(IdentifyConfig::default()).identify(&source, root.join("nope"));

    assert!(!result.ok);
    assert!(result.message.contains("database directory not found"));
    assert!(result.best_filename.is_none());

    cleanup(&root);
}

#[test]
fn test_missing_and_unreadable_source() {
    let (_, db) = fixture("bad-source");
    let root = db.parent().unwrap().to_path_buf();
    let id = identifier(IdentifyConfig::default().without_visualization());

    let missing = id.identify(root.join("absent.bmp"), &db);
    assert!(!missing.ok);
    assert!(missing.message.contains("not found"));

    let garbage = root.join("garbage.bmp");
    fs::write(&garbage, b"not an image").unwrap();
    let unreadable = id.identify(&garbage, &db);
    assert!(!unreadable.ok);
    assert!(unreadable.message.contains("cannot read input image"));
    assert!(unreadable.top_k.is_empty());

    cleanup(&root);
}

#[test]
fn test_featureless_source() {
    let (_, db) = fixture("flat-source");
    let root = db.parent().unwrap().to_path_buf();
    let source = root.join("flat.png");
    save(&flat(128), &source);

    let result = identifier(IdentifyConfig::default().without_visualization()).identify(&source, &db);

    assert!(!result.ok);
    assert!(result.message.contains("no features"));
    assert!(result.top_k.is_empty());

    cleanup(&root);
}

//! Integration tests for `InstanceSource` over on-disk datasets.
//!
//! Covers: base/augmented pairing, cyclic restart, error propagation and skip,
//! single-mode format dispatch, and the batch streams.

use std::fs;
use std::path::{Path, PathBuf};

use chroma_core::{
    DEFAULT_CHROMATIC_TARGET, GraphFormat, InstanceError, InstanceSource, load_instance,
};
use tempfile::TempDir;

fn paired_file(n: usize, edges: &[(usize, usize)], diff: Option<(usize, usize)>, chrom: usize) -> String {
    let mut out = format!("NAME : test\nDIMENSION {n}\nEDGE_DATA_SECTION\n");
    for (u, v) in edges {
        out.push_str(&format!("{u} {v}\n"));
    }
    out.push_str("-1\n");
    if let Some((u, v)) = diff {
        out.push_str(&format!("DIFF_EDGE\n{u} {v}\n"));
    }
    out.push_str(&format!("CHROM_NUMBER\n{chrom}\n"));
    out
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write fixture");
    path
}

/// Three paired files: a 4-cycle, a path and a triangle-minus-one.
fn paired_dataset() -> (TempDir, Vec<PathBuf>) {
    let dir = TempDir::new().expect("tempdir");
    let paths = vec![
        write(dir.path(), "c4.graph", &paired_file(4, &[(0, 1), (1, 2), (2, 3), (3, 0)], Some((0, 2)), 2)),
        write(dir.path(), "p3.graph", &paired_file(3, &[(0, 1), (1, 2)], Some((2, 0)), 2)),
        write(dir.path(), "t3.graph", &paired_file(3, &[(0, 1), (2, 1)], Some((0, 2)), 3)),
    ];
    (dir, paths)
}

// ===========================================================================
// Pairing
// ===========================================================================

#[test]
fn pair_differs_in_exactly_the_diff_edge_cells() {
    let (_dir, paths) = paired_dataset();
    let mut source = InstanceSource::with_seed(paths, 11).expect("non-empty");

    for _ in 0..6 {
        let (base, augmented) = source.next_paired_pair().expect("fixture parses");
        let (u, v) = base.diff_edge().expect("fixtures carry a diff edge");
        assert_eq!(base.chromatic_target(), augmented.chromatic_target());
        assert_eq!(base.source_id(), augmented.source_id());

        let n = base.vertex_count();
        for r in 0..n {
            for s in 0..n {
                let differs = base.adjacency()[(r, s)] != augmented.adjacency()[(r, s)];
                let is_diff_cell = (r, s) == (u, v) || (r, s) == (v, u);
                assert_eq!(differs, is_diff_cell, "cell ({r}, {s}) of {}", base.source_id());
            }
        }
    }
}

#[test]
fn paired_file_without_diff_edge_yields_identical_twins() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(dir.path(), "nodiff.graph", &paired_file(3, &[(0, 1)], None, 2));
    let mut source = InstanceSource::with_seed(vec![path], 0).expect("non-empty");
    let (a, b) = source.next_paired_pair().expect("parses");
    assert_eq!(a, b);
}

#[test]
fn paired_batch_interleaves_base_and_augmented() {
    let (_dir, paths) = paired_dataset();
    let mut source = InstanceSource::with_seed(paths, 5).expect("non-empty");
    let batch = source.paired_batch(2).expect("two pairs");
    assert_eq!(batch.len(), 4);
    assert_eq!(batch.sat_flags, vec![1, 0, 1, 0]);
    assert_eq!(batch.per_instance_edge_counts[1], batch.per_instance_edge_counts[0] + 1);
    assert_eq!(batch.per_instance_vertex_counts[0], batch.per_instance_vertex_counts[1]);
    assert_eq!(batch.adjacency_block, batch.adjacency_block.transpose());
}

// ===========================================================================
// Cyclic restart
// ===========================================================================

#[test]
fn driving_past_the_end_reshuffles_instead_of_failing() {
    let (_dir, paths) = paired_dataset();
    let total = paths.len();
    let mut source = InstanceSource::with_seed(paths, 3).expect("non-empty");

    let mut seen = Vec::new();
    for _ in 0..(total * 4 + 1) {
        let (base, _) = source.next_paired_pair().expect("never runs dry");
        seen.push(base.source_id().to_string());
    }
    assert_eq!(source.epoch(), 4);

    // Every epoch visits every file exactly once.
    for epoch in seen.chunks(total).take(4) {
        let mut epoch = epoch.to_vec();
        epoch.sort();
        epoch.dedup();
        assert_eq!(epoch.len(), total);
    }
}

#[test]
fn reset_restarts_the_epoch() {
    let (_dir, paths) = paired_dataset();
    let mut source = InstanceSource::with_seed(paths, 8).expect("non-empty");
    source.next_paired_pair().expect("parses");
    source.reset();
    assert_eq!(source.current(), source.identifiers()[0].as_path());
}

// ===========================================================================
// Errors
// ===========================================================================

#[test]
fn broken_file_surfaces_error_until_skipped() {
    let dir = TempDir::new().expect("tempdir");
    let bad = write(dir.path(), "bad.graph", "DIMENSION 2\nEDGE_DATA_SECTION\n0 1\n");
    let mut source = InstanceSource::with_seed(vec![bad.clone()], 0).expect("non-empty");

    for _ in 0..2 {
        let err = source.next_paired_pair().expect_err("no sentinel");
        assert!(matches!(err, InstanceError::Malformed { .. }));
        assert_eq!(err.source_id(), Some(bad.display().to_string().as_str()));
    }
    source.skip();
    assert_eq!(source.epoch(), 1);
}

#[test]
fn failed_paired_batch_rolls_back_the_source() {
    let (dir, mut paths) = paired_dataset();
    let bad = write(dir.path(), "bad.graph", "DIMENSION 2\nEDGE_DATA_SECTION\n0 1\n");
    paths.push(bad.clone());

    let mut checked = 0;
    for seed in 0..16 {
        let mut source = InstanceSource::with_seed(paths.clone(), seed).expect("non-empty");
        if source.current() == bad.as_path() {
            continue;
        }
        let before = source.identifiers().to_vec();

        // Four pairs over four files always reach the broken one.
        let err = source.paired_batch(4).expect_err("batch includes the broken file");
        assert_eq!(err.source_id(), Some(bad.display().to_string().as_str()));
        assert_eq!(source.identifiers(), before.as_slice());
        assert_eq!(source.current(), before[0].as_path());
        assert_eq!(source.epoch(), 0);

        // The good files ahead of the broken one are still drawn first.
        let (base, _) = source.next_paired_pair().expect("first file is good");
        assert_eq!(base.source_id(), before[0].display().to_string());
        checked += 1;
    }
    assert!(checked > 0, "every seed put the broken file first");
}

// ===========================================================================
// Single mode
// ===========================================================================

#[test]
fn dimacs_scenario_from_disk() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(dir.path(), "path.col", "p edge 3 2\ne 1 2\ne 2 3\nh 3\n");
    let g = load_instance(&path, GraphFormat::Dimacs).expect("parses");
    assert_eq!(g.vertex_count(), 3);
    assert_eq!(g.chromatic_target(), 3);
    assert!(g.adjacency()[(0, 1)] && g.adjacency()[(1, 0)]);
    assert!(g.adjacency()[(1, 2)] && g.adjacency()[(2, 1)]);
    assert_eq!(g.edge_count(), 2);
}

#[test]
fn auto_dispatch_reads_json_and_dimacs_side_by_side() {
    let dir = TempDir::new().expect("tempdir");
    let json = write(
        dir.path(),
        "layout.json",
        r#"[{"id": 0, "conflict": [{"id": 1}]}, {"id": 1, "conflict": [{"id": 0}]}]"#,
    );
    let col = write(dir.path(), "tri.col", "p edge 3 3\ne 1 2\ne 2 3\ne 1 3\nh 3\n");
    let mut source = InstanceSource::with_seed(vec![json, col], 2).expect("non-empty");

    let mut targets = Vec::new();
    for _ in 0..2 {
        let g = source.next_single_auto().expect("parses");
        targets.push((g.vertex_count(), g.chromatic_target()));
    }
    targets.sort_unstable();
    assert_eq!(targets, vec![(2, DEFAULT_CHROMATIC_TARGET), (3, 3)]);
}

#[test]
fn single_batches_cover_one_epoch_and_label_sat() {
    let dir = TempDir::new().expect("tempdir");
    let paths = vec![
        write(dir.path(), "a.col", "p edge 2 1\ne 1 2\n"),
        write(dir.path(), "b.col", "p edge 4 0\nh 2\n"),
        write(dir.path(), "c.json", r#"[{"id": 0, "conflict": []}]"#),
    ];
    let mut source = InstanceSource::with_seed(paths, 4).expect("non-empty");

    let batches: Vec<_> = source
        .single_batches(None)
        .collect::<Result<_, _>>()
        .expect("all parse");
    assert_eq!(batches.len(), 3);
    for batch in &batches {
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.sat_flags, vec![1]);
    }
    assert_eq!(source.epoch(), 1);
}

#[test]
fn test_single_batches_wrap_past_one_epoch() {
    let dir = TempDir::new().expect("tempdir");
    let paths = vec![
        write(dir.path(), "a.col", "p edge 2 1\ne 1 2\n"),
        write(dir.path(), "b.json", r#"[{"id": 0, "conflict": []}]"#),
    ];
    let mut source = InstanceSource::with_seed(paths, 6).expect("non-empty");

    let batches: Vec<_> = source
        .test_single_batches(None, 7)
        .collect::<Result<_, _>>()
        .expect("all parse");
    assert_eq!(batches.len(), 7);
    assert!(batches.iter().all(|b| b.sat_flags == vec![1]));
    assert_eq!(source.epoch(), 3);
}

#[test]
fn epoch_and_test_streams_yield_requested_counts() {
    let (_dir, paths) = paired_dataset();
    let mut source = InstanceSource::with_seed(paths, 9).expect("non-empty");

    let epoch: Vec<_> = source.batches(1).collect::<Result<_, _>>().expect("parses");
    assert_eq!(epoch.len(), 3);
    assert!(epoch.iter().all(|b| b.sat_flags == vec![1, 0]));

    let test: Vec<_> = source.test_batches(2, 5).collect::<Result<_, _>>().expect("parses");
    assert_eq!(test.len(), 5);
    assert!(test.iter().all(|b| b.len() == 4));
}

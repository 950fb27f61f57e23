//! Property-based tests for batch extraction.
//!
//! These tests use proptest to generate archive layouts and verify that the
//! execution mode never changes what ends up on disk.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

use proptest::prelude::*;
use tempfile::TempDir;
use unzipset_core::JobConfig;
use unzipset_core::NoopDiagnostics;
use unzipset_core::Orchestrator;
use unzipset_core::RunOptions;
use unzipset_core::test_utils::ZipTestBuilder;
use unzipset_core::test_utils::snapshot;

/// File paths and contents for one archive.
type Layout = BTreeMap<String, Vec<u8>>;

fn layout_strategy() -> impl Strategy<Value = Layout> {
    prop::collection::btree_map(
        prop::collection::vec("[a-z]{1,6}", 1..4).prop_map(|parts| parts.join("/")),
        prop::collection::vec(any::<u8>(), 0..256),
        1..8,
    )
    .prop_filter("a file cannot also be a directory", |layout| {
        let dirs: BTreeSet<String> = layout
            .keys()
            .flat_map(|path| {
                path.match_indices('/')
                    .map(|(i, _)| path[..i].to_string())
                    .collect::<Vec<_>>()
            })
            .collect();
        layout.keys().all(|path| !dirs.contains(path))
    })
}

fn write_archives(dir: &Path, layouts: &[Layout]) -> Vec<JobConfig> {
    layouts
        .iter()
        .enumerate()
        .map(|(i, layout)| {
            let bytes = layout
                .iter()
                .fold(ZipTestBuilder::new(), |builder, (path, data)| {
                    builder.add_file(path, data)
                })
                .build();
            let archive = dir.join(format!("archive{i}.zip"));
            fs::write(&archive, bytes).expect("failed to write archive");
            JobConfig::new(archive, format!("dest{i}"))
        })
        .collect()
}

fn run_in(root: &Path, jobs: &[JobConfig], options: RunOptions) -> usize {
    let jobs: Vec<JobConfig> = jobs
        .iter()
        .map(|job| JobConfig::new(&job.source_archive, root.join(&job.destination)))
        .collect();
    Orchestrator::new(options)
        .with_diagnostics(Arc::new(NoopDiagnostics))
        .run(&jobs)
        .expect("extraction failed")
        .files_copied()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Parallel extraction into disjoint destinations matches sequential
    /// extraction.
    #[test]
    fn prop_parallel_matches_sequential(
        layouts in prop::collection::vec(layout_strategy(), 1..5),
        workers in 1usize..4,
    ) {
        let archives = TempDir::new().unwrap();
        let jobs = write_archives(archives.path(), &layouts);

        let sequential_root = TempDir::new().unwrap();
        let parallel_root = TempDir::new().unwrap();
        let sequential = run_in(sequential_root.path(), &jobs, RunOptions::sequential());
        let parallel = run_in(
            parallel_root.path(),
            &jobs,
            RunOptions {
                parallel: true,
                max_workers: NonZeroUsize::new(workers),
            },
        );

        prop_assert_eq!(sequential, parallel);
        prop_assert_eq!(snapshot(sequential_root.path()), snapshot(parallel_root.path()));
    }

    /// Every file of the archive lands at its path with its contents.
    #[test]
    fn prop_extracted_tree_matches_archive(layout in layout_strategy()) {
        let archives = TempDir::new().unwrap();
        let jobs = write_archives(archives.path(), std::slice::from_ref(&layout));
        let root = TempDir::new().unwrap();

        let copied = run_in(root.path(), &jobs, RunOptions::default());

        prop_assert_eq!(copied, layout.len());
        for (path, data) in &layout {
            let written = fs::read(root.path().join("dest0").join(path)).unwrap();
            prop_assert_eq!(&written, data);
        }
    }
}

//! End-to-end backup scenarios against a real temp-directory tree,
//! exercising the full state machine rather than its individual stages.

use std::fs;
use std::path::{Path, PathBuf};

use compress::{CompFlags, Codec, Level};
use digest::DigestKind;
use orchestrator::{run_backup, CloudProviderKind, CloudTarget, Options};

fn base_options(directories: Vec<PathBuf>, output_root: PathBuf) -> Options {
    Options {
        directories,
        exclude: Vec::new(),
        digest_kind: DigestKind::Sha1,
        #[cfg(feature = "cipher")]
        cipher_kind: None,
        #[cfg(feature = "cipher")]
        password: None,
        compressor: Codec::Gzip,
        comp_level: Level::new(3),
        comp_flags: CompFlags::NONE,
        output_root,
        cloud_target: CloudTarget {
            provider: CloudProviderKind::None,
            credentials: None,
            remote_root: String::new(),
        },
        verbose: false,
    }
}

fn gunzip(path: &Path) -> Vec<u8> {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    compress::decompress_file(path, &out, Codec::Gzip).unwrap();
    fs::read(out).unwrap()
}

fn checksums(output_root: &Path) -> Vec<(String, String)> {
    let mut file = fs::File::open(output_root.join("checksums.txt")).unwrap();
    let mut out = Vec::new();
    while let Some(entry) = manifest::read_entry(&mut file).unwrap() {
        out.push((entry.path, entry.hex_digest));
    }
    out
}

#[test]
fn scenario_a_minimal_backup() {
    let root = tempfile::tempdir().unwrap();
    let src = root.path().join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("a.txt"), b"hello").unwrap();
    fs::write(src.join("b.txt"), b"world").unwrap();

    let output = root.path().join("out");
    let options = base_options(vec![src.clone()], output.clone());

    let stats = run_backup(&options).unwrap();
    assert_eq!(stats.written, 2);
    assert_eq!(stats.unchanged, 0);

    assert_eq!(gunzip(&output.join("files/src/a.txt")), b"hello");
    assert_eq!(gunzip(&output.join("files/src/b.txt")), b"world");

    let mut entries = checksums(&output);
    entries.sort();
    assert_eq!(
        entries,
        vec![
            (
                "src/a.txt".to_string(),
                "AAF4C61DDCC5E8A2DABEDE0F3B482CD9AEA9434D".to_string()
            ),
            (
                "src/b.txt".to_string(),
                "7C211433F02071597741E6FF5A8EA34789ABBF43".to_string()
            ),
        ]
    );
}

#[test]
fn scenario_b_incremental_one_changed_one_unchanged() {
    let root = tempfile::tempdir().unwrap();
    let src = root.path().join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("a.txt"), b"hello").unwrap();
    fs::write(src.join("b.txt"), b"world").unwrap();

    let output = root.path().join("out");
    let options = base_options(vec![src.clone()], output.clone());
    run_backup(&options).unwrap();

    let b_after_first_run = fs::read(output.join("files/src/b.txt")).unwrap();

    fs::write(src.join("a.txt"), b"goodbye").unwrap();
    let stats = run_backup(&options).unwrap();
    assert_eq!(stats.written, 1);
    assert_eq!(stats.unchanged, 1);
    assert_eq!(stats.deltas, 1);

    assert_eq!(gunzip(&output.join("files/src/a.txt")), b"goodbye");
    assert_eq!(fs::read(output.join("files/src/b.txt")).unwrap(), b_after_first_run);

    let delta_entries: Vec<_> = fs::read_dir(output.join("deltas/src"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    let delta_name = delta_entries
        .iter()
        .find(|name| name.starts_with("a.txt."))
        .expect("expected a rotated delta for a.txt");
    assert_eq!(
        gunzip(&output.join("deltas/src").join(delta_name)),
        b"hello"
    );

    let mut entries = checksums(&output);
    entries.sort();
    assert_eq!(entries.len(), 2);
    assert_ne!(entries[0].1, "AAF4C61DDCC5E8A2DABEDE0F3B482CD9AEA9434D".to_string());
}

#[test]
fn scenario_c_deletion_reconciliation() {
    let root = tempfile::tempdir().unwrap();
    let src = root.path().join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("a.txt"), b"hello").unwrap();
    fs::write(src.join("b.txt"), b"world").unwrap();

    let output = root.path().join("out");
    let options = base_options(vec![src.clone()], output.clone());
    run_backup(&options).unwrap();

    fs::remove_file(src.join("a.txt")).unwrap();
    let stats = run_backup(&options).unwrap();
    assert_eq!(stats.removed, 1);

    assert!(!output.join("files/src/a.txt").exists());
    let entries = checksums(&output);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, "src/b.txt");
}

#[test]
fn scenario_d_exclude() {
    let root = tempfile::tempdir().unwrap();
    let src = root.path().join("src");
    fs::create_dir_all(src.join("keep")).unwrap();
    fs::create_dir_all(src.join("skip")).unwrap();
    fs::write(src.join("keep/x.txt"), b"keep me").unwrap();
    fs::write(src.join("skip/y.txt"), b"skip me").unwrap();

    let output = root.path().join("out");
    let mut options = base_options(vec![src.clone()], output.clone());
    options.exclude = vec![src.join("skip")];

    run_backup(&options).unwrap();

    assert!(output.join("files/src/keep/x.txt").exists());
    assert!(!output.join("files/src/skip/y.txt").exists());

    let entries = checksums(&output);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, "src/keep/x.txt");
}

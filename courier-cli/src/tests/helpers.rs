//! Test helpers for writing instance files.

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// The two-courier sample instance in `.dat` form; its optimum is 11.
pub(super) const SAMPLE_DAT: &str = "\
2
3
10 10
3 4 5
0 2 7 3
2 0 4 6
7 4 0 5
3 6 5 0
";

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path, contents).expect("write test file");
}

/// A temporary directory with a UTF-8 root path.
pub(super) fn utf8_tempdir() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

//! Capability-based file access for instance inputs, built on `cap-std`.

use std::io::{self, Read};

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};

/// Open the directory holding `path` and return it with the final component.
///
/// A bare file name resolves against the current directory.
fn parent_and_name(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, &str)> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{path} does not name a file"),
        )
    })?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name))
}

/// Whether `path` exists and is a regular file.
///
/// A missing path surfaces as an [`io::ErrorKind::NotFound`] error rather
/// than `Ok(false)`.
pub(crate) fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = parent_and_name(path)?;
    dir.metadata(name).map(|metadata| metadata.is_file())
}

/// Read the whole of a UTF-8 text file.
pub(crate) fn read_utf8_file(path: &Utf8Path) -> io::Result<String> {
    let mut file = fs_utf8::File::open_ambient(path, ambient_authority())?;
    let mut text = String::new();
    file.read_to_string(&mut text)?;
    Ok(text)
}

//! Filesystem utilities for code generation

use std::fs;
use std::io;
use std::path::Path;

/// Write content to a file, creating parent directories if needed
pub fn write_file<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> io::Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, contents)
}

/// Read a previously generated file, `None` if it does not exist yet
pub fn read_existing<P: AsRef<Path>>(path: P) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Write content only when it differs from what is on disk.
///
/// Returns `true` if the file was written.
pub fn write_if_changed<P: AsRef<Path>>(path: P, contents: &str) -> io::Result<bool> {
    let path = path.as_ref();

    if read_existing(path)?.as_deref() == Some(contents) {
        return Ok(false);
    }

    write_file(path, contents)?;
    Ok(true)
}

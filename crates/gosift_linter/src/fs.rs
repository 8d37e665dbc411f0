//! File reading helpers

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::error::LintError;

/// Read a source file, memory-mapping anything past a page.
///
/// Small files go through a plain read since mmap has fixed setup cost.
pub fn read_file_fast(path: &Path) -> Result<String, LintError> {
    let file = File::open(path).map_err(|source| LintError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let len = file
        .metadata()
        .map_err(|source| LintError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .len() as usize;

    if len < 4096 {
        return std::fs::read_to_string(path).map_err(|source| LintError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    // SAFETY: the mapping is read-only and copied into an owned String
    // before this function returns.
    let mmap = unsafe {
        Mmap::map(&file).map_err(|source| LintError::Io {
            path: path.to_path_buf(),
            source,
        })?
    };

    std::str::from_utf8(&mmap)
        .map(|s| s.to_string())
        .map_err(|_| LintError::NonUtf8 {
            path: path.to_path_buf(),
        })
}

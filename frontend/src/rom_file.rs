//! ROM file reading: a plain image, or the first file inside a ZIP archive.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Read a ROM image from `path`.
///
/// `.zip` archives yield their first file entry. An archive with no files
/// yields an empty image, which the loader reports as "no file selected".
pub fn read_rom(path: &Path) -> std::io::Result<Vec<u8>> {
    if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
    {
        return read_from_zip(path);
    }
    std::fs::read(path)
}

fn read_from_zip(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut archive = zip::ZipArchive::new(reader).map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, format!("invalid ZIP: {e}"))
    })?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("ZIP entry error: {e}"),
            )
        })?;

        // Skip directories
        if entry.is_dir() {
            continue;
        }

        log::debug!("using {} from {}", entry.name(), path.display());
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut data)?;
        return Ok(data);
    }

    Ok(Vec::new())
}

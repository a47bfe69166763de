use std::io::Write;
use std::path::Path;

use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

/// One file to place in an archive.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Strips path components so entries can never escape the archive root.
fn sanitize_entry_name(filename: &str, fallback: &str) -> String {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or(fallback)
        .to_string()
}

/// Builds a deflate ZIP from the given entries, in order.
pub fn build_zip(entries: &[ArchiveEntry]) -> anyhow::Result<Vec<u8>> {
    use anyhow::Context;

    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(std::io::Cursor::new(&mut buffer));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        for (idx, entry) in entries.iter().enumerate() {
            let name = sanitize_entry_name(&entry.filename, &format!("document_{}", idx + 1));
            zip.start_file(name.as_str(), options)
                .with_context(|| format!("Failed to add {name} to archive"))?;
            zip.write_all(&entry.bytes)
                .with_context(|| format!("Failed to write {name} to archive"))?;
        }

        zip.finish().context("Failed to finalize archive")?;
    }

    Ok(buffer)
}

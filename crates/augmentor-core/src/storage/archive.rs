//! Zip archives of a request's artifacts.

use std::fs::File;
use std::io;
use std::path::Path;

use thiserror::Error;
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("cannot create archive {path}: {message}")]
    Create { path: String, message: String },

    #[error("cannot add {name} to archive: {message}")]
    Entry { name: String, message: String },

    #[error("cannot finish archive {path}: {message}")]
    Finish { path: String, message: String },
}

/// Archive file name for an output folder.
pub fn archive_name(folder: &str) -> String {
    format!("{folder}.zip")
}

/// Write a deflate-compressed zip at `zip_path`, replacing any existing file.
///
/// Each entry is stored under its bare name. Returns the number of entries.
pub fn write_archive<'a, I>(zip_path: &Path, entries: I) -> Result<usize, ArchiveError>
where
    I: IntoIterator<Item = (&'a str, std::path::PathBuf)>,
{
    let file = File::create(zip_path).map_err(|e| ArchiveError::Create {
        path: zip_path.display().to_string(),
        message: e.to_string(),
    })?;

    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut count = 0;

    for (name, path) in entries {
        let entry_err = |message: String| ArchiveError::Entry {
            name: name.to_string(),
            message,
        };

        let mut source = File::open(&path).map_err(|e| entry_err(e.to_string()))?;
        zip.start_file(name, options)
            .map_err(|e| entry_err(e.to_string()))?;
        io::copy(&mut source, &mut zip).map_err(|e| entry_err(e.to_string()))?;
        count += 1;
    }

    zip.finish().map_err(|e| ArchiveError::Finish {
        path: zip_path.display().to_string(),
        message: e.to_string(),
    })?;

    info!(path = %zip_path.display(), entries = count, "wrote archive");
    Ok(count)
}

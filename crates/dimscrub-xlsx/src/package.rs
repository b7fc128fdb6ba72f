//! Zip part table of an XLSX file

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use crate::error::{XlsxError, XlsxResult};

/// Content types part every XLSX package carries
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

#[derive(Debug, Clone)]
struct PackageEntry {
    name: String,
    data: Vec<u8>,
    stored: bool,
    is_dir: bool,
}

/// All parts of an XLSX package, in archive order
///
/// Part names are kept exactly as the archive spells them, without a leading
/// slash. Writing produces the same entry order, so a package that is read
/// and written without changes differs from its source only in compression
/// metadata.
#[derive(Debug, Clone, Default)]
pub struct XlsxPackage {
    entries: Vec<PackageEntry>,
}

impl XlsxPackage {
    /// Read every entry of a zip archive
    pub fn from_bytes(bytes: &[u8]) -> XlsxResult<Self> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            entries.push(PackageEntry {
                name: file.name().to_string(),
                data,
                stored: file.compression() == CompressionMethod::Stored,
                is_dir: file.is_dir(),
            });
        }

        let package = Self { entries };
        if !package.contains(CONTENT_TYPES_PART) {
            return Err(XlsxError::InvalidFormat(format!(
                "Missing {}",
                CONTENT_TYPES_PART
            )));
        }
        Ok(package)
    }

    /// Serialize the package back into zip bytes
    pub fn to_bytes(&self) -> XlsxResult<Vec<u8>> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));

        for entry in &self.entries {
            let method = if entry.stored {
                CompressionMethod::Stored
            } else {
                CompressionMethod::Deflated
            };
            let options = SimpleFileOptions::default().compression_method(method);

            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), options)?;
            } else {
                zip.start_file(entry.name.as_str(), options)?;
                zip.write_all(&entry.data)?;
            }
        }

        Ok(zip.finish()?.into_inner())
    }

    /// Get a part's bytes by name
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        let name = normalize(name);
        self.entries
            .iter()
            .find(|e| !e.is_dir && e.name == name)
            .map(|e| e.data.as_slice())
    }

    /// Get a required part, failing with [`XlsxError::MissingPart`]
    pub fn require_part(&self, name: &str) -> XlsxResult<&[u8]> {
        self.part(name)
            .ok_or_else(|| XlsxError::MissingPart(normalize(name).to_string()))
    }

    /// Check whether a part exists
    pub fn contains(&self, name: &str) -> bool {
        self.part(name).is_some()
    }

    /// Replace a part's bytes, appending the part if it does not exist
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        let name = normalize(name);
        match self.entries.iter_mut().find(|e| !e.is_dir && e.name == name) {
            Some(entry) => entry.data = data,
            None => self.entries.push(PackageEntry {
                name: name.to_string(),
                data,
                stored: false,
                is_dir: false,
            }),
        }
    }

    /// Remove a part, returning whether it existed
    pub fn remove_part(&mut self, name: &str) -> bool {
        let name = normalize(name);
        let before = self.entries.len();
        self.entries.retain(|e| e.is_dir || e.name != name);
        self.entries.len() != before
    }

    /// Iterate over part names in archive order
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| !e.is_dir)
            .map(|e| e.name.as_str())
    }
}

fn normalize(name: &str) -> &str {
    name.strip_prefix('/').unwrap_or(name)
}

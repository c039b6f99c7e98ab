//! Single-file model format.
//!
//! ```text
//! magic "RKAC" | u32 LE metadata length | metadata JSON | weight bytes
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::checkpoint::metadata::{ModelMetadata, MODEL_FORMAT_VERSION};
use crate::error::ModelError;

pub const MODEL_MAGIC: [u8; 4] = *b"RKAC";

/// Write metadata and weights to `path`, replacing any existing file.
///
/// The file is written to a `.tmp` sibling first and renamed into place.
pub fn write_model_file(
    path: &Path,
    metadata: &ModelMetadata,
    weights: &[u8],
) -> Result<(), ModelError> {
    let meta_json = serde_json::to_vec(metadata)?;
    let meta_len = u32::try_from(meta_json.len())
        .map_err(|_| ModelError::Encode("metadata too large".to_string()))?;

    let mut bytes = Vec::with_capacity(8 + meta_json.len() + weights.len());
    bytes.extend_from_slice(&MODEL_MAGIC);
    bytes.extend_from_slice(&meta_len.to_le_bytes());
    bytes.extend_from_slice(&meta_json);
    bytes.extend_from_slice(weights);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    fs::write(&tmp, &bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Read a model file, returning its metadata and raw weight bytes.
pub fn read_model_file(path: &Path) -> Result<(ModelMetadata, Vec<u8>), ModelError> {
    if !path.exists() {
        return Err(ModelError::NotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;
    let bad_magic = || ModelError::BadMagic {
        path: path.to_path_buf(),
    };

    if bytes.len() < 8 || bytes[0..4] != MODEL_MAGIC {
        return Err(bad_magic());
    }
    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&bytes[4..8]);
    let meta_end = 8 + u32::from_le_bytes(len_bytes) as usize;
    if meta_end > bytes.len() {
        return Err(bad_magic());
    }

    // Check the version before trusting the rest of the layout.
    let version: VersionHeader = serde_json::from_slice(&bytes[8..meta_end])?;
    if version.format_version != MODEL_FORMAT_VERSION {
        return Err(ModelError::UnsupportedVersion {
            found: version.format_version,
            expected: MODEL_FORMAT_VERSION,
        });
    }
    let metadata: ModelMetadata = serde_json::from_slice(&bytes[8..meta_end])?;

    Ok((metadata, bytes[meta_end..].to_vec()))
}

#[derive(serde::Deserialize)]
struct VersionHeader {
    format_version: u32,
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

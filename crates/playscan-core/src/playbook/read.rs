use sha2::{Digest, Sha256};
use std::{fs, path::Path};

use crate::error::{Error, Result};
use crate::report::model::{ArtifactHash, ArtifactInfo};

/// Raw playbook context used during analysis.
///
/// Holds the exact text analyzed and a cryptographic fingerprint
/// that uniquely identifies the artifact.
#[derive(Debug, Clone)]
pub struct ArtifactContext {
    /// Optional source path (informational only).
    pub path: Option<String>,

    /// Exact text read from disk.
    pub text: String,

    /// Size of the artifact in bytes.
    pub size_bytes: u64,

    /// Hash algorithm used for fingerprinting.
    pub hash_alg: String,

    /// Hex-encoded hash of the artifact bytes.
    pub hash_hex: String,
}

impl ArtifactContext {
    /// Convert into the report-facing artifact metadata, dropping the text.
    pub fn into_artifact(self) -> ArtifactInfo {
        ArtifactInfo {
            path: self.path,
            size_bytes: self.size_bytes,
            hash: ArtifactHash {
                algorithm: self.hash_alg,
                value: self.hash_hex,
            },
        }
    }
}

/// Read a playbook and compute a stable cryptographic identity.
///
/// The identity depends only on the file bytes, never on filesystem
/// metadata.
pub fn read_artifact(path: &Path) -> Result<ArtifactContext> {
    let bytes = fs::read(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let digest = Sha256::digest(&bytes);
    let size_bytes = bytes.len() as u64;

    let text = String::from_utf8(bytes).map_err(|_| Error::Encoding {
        path: path.to_path_buf(),
    })?;

    Ok(ArtifactContext {
        path: Some(path.display().to_string()),
        text,
        size_bytes,
        hash_alg: "sha256".to_string(),
        hash_hex: hex::encode(digest),
    })
}

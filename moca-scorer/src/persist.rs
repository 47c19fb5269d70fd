//! Persist the embedding cache between runs as `embeddings.bin`.
//!
//! The file is a `bincode` header (`MOEC` magic and a format version), the
//! [`CacheOrigin`] naming the model and endpoint that produced the vectors,
//! and a text-to-vector map. A missing file loads as an empty cache, and so
//! does a file written for a different origin: mixing vectors from two
//! embedding spaces would corrupt nearest-neighbour resolution.

use std::collections::{BTreeMap, HashMap};
use std::io::{BufReader, BufWriter, Write};

use bincode::Options;
use camino::Utf8Path;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::CacheFileError;

/// Magic bytes opening every cache file.
pub const CACHE_MAGIC: [u8; 4] = *b"MOEC";

/// Current cache format version.
pub const CACHE_VERSION: u32 = 2;

#[derive(Debug, Serialize, Deserialize)]
struct CacheHeader {
    magic: [u8; 4],
    version: u32,
}

/// Embedding model and service a cache file's vectors came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheOrigin {
    /// Model identifier.
    pub model: String,
    /// Base URL of the embedding service.
    pub endpoint: String,
}

impl CacheOrigin {
    /// Construct a cache origin.
    pub fn new(model: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            endpoint: endpoint.into(),
        }
    }
}

fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new()
}

/// Load a cache written by [`write_embedding_cache`] for `origin`.
///
/// A cache recorded under another model or endpoint is discarded with a
/// warning and loads as empty.
///
/// # Errors
/// Returns [`CacheFileError`] when the file exists but cannot be read, or
/// when its header or body is invalid.
pub fn read_embedding_cache(
    path: &Utf8Path,
    origin: &CacheOrigin,
) -> Result<HashMap<String, Vec<f32>>, CacheFileError> {
    let exists = moca_fs::file_exists(path).map_err(|source| CacheFileError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    if !exists {
        return Ok(HashMap::new());
    }

    let file = moca_fs::open_utf8_file(path).map_err(|source| CacheFileError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let header: CacheHeader = bincode_options()
        .deserialize_from(&mut reader)
        .map_err(|source| CacheFileError::Deserialise {
            path: path.to_path_buf(),
            source,
        })?;
    if header.magic != CACHE_MAGIC {
        return Err(CacheFileError::BadMagic {
            path: path.to_path_buf(),
        });
    }
    if header.version != CACHE_VERSION {
        return Err(CacheFileError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: header.version,
        });
    }
    let deserialise = |source| CacheFileError::Deserialise {
        path: path.to_path_buf(),
        source,
    };
    let recorded: CacheOrigin = bincode_options()
        .deserialize_from(&mut reader)
        .map_err(deserialise)?;
    if recorded != *origin {
        warn!(
            "discarding embedding cache {path}: written for model '{}' at {}, expected model '{}' at {}",
            recorded.model, recorded.endpoint, origin.model, origin.endpoint
        );
        return Ok(HashMap::new());
    }
    let entries: HashMap<String, Vec<f32>> = bincode_options()
        .deserialize_from(&mut reader)
        .map_err(deserialise)?;
    info!("loaded {} cached embeddings from {path}", entries.len());
    Ok(entries)
}

/// Write `entries` produced under `origin` to `path`, creating parent
/// directories as needed.
///
/// # Errors
/// Returns [`CacheFileError`] when the file cannot be created or written.
pub fn write_embedding_cache(
    path: &Utf8Path,
    origin: &CacheOrigin,
    entries: &BTreeMap<String, Vec<f32>>,
) -> Result<(), CacheFileError> {
    moca_fs::ensure_parent_dir(path).map_err(|source| CacheFileError::CreateParent {
        path: path.to_path_buf(),
        source,
    })?;
    let file = moca_fs::create_utf8_file(path).map_err(|source| CacheFileError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    let header = CacheHeader {
        magic: CACHE_MAGIC,
        version: CACHE_VERSION,
    };
    let serialise = |source| CacheFileError::Serialise {
        path: path.to_path_buf(),
        source,
    };
    bincode_options()
        .serialize_into(&mut writer, &header)
        .map_err(serialise)?;
    bincode_options()
        .serialize_into(&mut writer, origin)
        .map_err(serialise)?;
    bincode_options()
        .serialize_into(&mut writer, entries)
        .map_err(serialise)?;
    writer.flush().map_err(|source| CacheFileError::Open {
        path: path.to_path_buf(),
        source,
    })
}

//! HTTP embedding oracle for tags missing from the reference taxonomy.
//!
//! [`HttpEmbeddingOracle`] implements [`moca_core::EmbeddingOracle`] against
//! a service exposing `POST /api/embed`, which takes
//! `{"model": ..., "input": [text]}` and answers `{"embeddings": [[...]]}`.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use moca_core::EmbeddingOracle;
//! use moca_data::oracle::{HttpEmbeddingOracle, HttpEmbeddingOracleConfig};
//!
//! let config = HttpEmbeddingOracleConfig::new("http://localhost:11434")
//!     .with_model("intfloat/multilingual-e5-small")
//!     .with_timeout(Duration::from_secs(10));
//! let oracle = HttpEmbeddingOracle::with_config(config)?;
//! let vector = oracle.embed("bakery")?;
//! println!("{} dimensions", vector.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod provider;
mod wire;

pub use provider::{DEFAULT_BASE_URL, DEFAULT_MODEL, HttpEmbeddingOracle, HttpEmbeddingOracleConfig};

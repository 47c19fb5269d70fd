//! Test helpers for writing fixtures and stubbing remote services.

use super::*;
use crate::enrich::EnrichServices;
use camino::Utf8PathBuf;
use moca_core::test_support::StubOracle;
use std::cell::RefCell;
use moca_core::{Category, EmbeddingOracle};
use moca_data::test_support::StubPointsSource;
use moca_data::{HttpEmbeddingOracleConfig, PointsSource};
use tempfile::TempDir;

/// Two-row reference taxonomy: `bakery` and `school`.
pub(super) fn taxonomy_csv() -> String {
    let scores: Vec<&str> = Category::ALL
        .iter()
        .map(|category| category.column_name())
        .collect();
    let mut csv = format!("name,{},stop_type,embedding\n", scores.join(","));
    let bakery: Vec<&str> = Category::ALL
        .iter()
        .map(|category| match category {
            Category::Commercial => "0.8",
            _ => "0",
        })
        .collect();
    let school: Vec<&str> = Category::ALL
        .iter()
        .map(|category| match category {
            Category::Education => "1",
            _ => "0",
        })
        .collect();
    csv.push_str(&format!("bakery,{},commercial,\"[0.0, 1.0]\"\n", bakery.join(",")));
    csv.push_str(&format!("school,{},education,\"[1.0, 0.0]\"\n", school.join(",")));
    csv
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    moca_fs::write_file(path, contents).expect("write fixture");
}

/// Temporary workspace with `data/` fixtures for the `enrich` command.
pub(super) struct EnrichWorkspace {
    _dir: TempDir,
    pub(super) root: Utf8PathBuf,
}

impl EnrichWorkspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn points(&self) -> Utf8PathBuf {
        self.root.join("data").join("points_cache.csv")
    }

    pub(super) fn taxonomy(&self) -> Utf8PathBuf {
        self.root.join("data").join("base_tags.csv")
    }

    pub(super) fn output(&self) -> Utf8PathBuf {
        self.root.join("data").join("expanded_points.csv")
    }

    pub(super) fn embedding_cache(&self) -> Utf8PathBuf {
        self.root.join("data").join("embeddings.bin")
    }

    pub(super) fn write_taxonomy(&self) {
        write_utf8(&self.taxonomy(), taxonomy_csv().as_bytes());
    }

    pub(super) fn write_points(&self, contents: &str) {
        write_utf8(&self.points(), contents.as_bytes());
    }
}

/// Services answering from memory instead of the network.
pub(super) struct StubServices {
    points_body: String,
    vector: Vec<f32>,
    requested: RefCell<Vec<String>>,
}

impl StubServices {
    pub(super) fn new(points_body: &str, vector: Vec<f32>) -> Self {
        Self {
            points_body: points_body.to_owned(),
            vector,
            requested: RefCell::new(Vec::new()),
        }
    }

    /// Endpoints a points source was built for, in call order.
    pub(super) fn requested_endpoints(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl EnrichServices for StubServices {
    fn points_source(&self, url: &str) -> Result<Box<dyn PointsSource>, CliError> {
        self.requested.borrow_mut().push(url.to_owned());
        Ok(Box::new(StubPointsSource::with_body(self.points_body.clone())))
    }

    fn oracle(
        &self,
        _config: &HttpEmbeddingOracleConfig,
    ) -> Result<Box<dyn EmbeddingOracle>, CliError> {
        Ok(Box::new(StubOracle::new(2).with_default(self.vector.clone())))
    }
}


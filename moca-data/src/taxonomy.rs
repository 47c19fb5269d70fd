//! Load the reference taxonomy from `base_tags.csv`.
//!
//! The header must contain `name`, `stop_type`, `embedding` and one column
//! per [`Category`] named by [`Category::column_name`]. Columns may appear in
//! any order and extra columns are ignored.

use std::io::Read;

use camino::{Utf8Path, Utf8PathBuf};
use csv::StringRecord;
use log::info;
use moca_core::{CATEGORY_COUNT, Category, CategoryScores, ReferenceTag, Taxonomy, TaxonomyError};
use thiserror::Error;

use crate::BYTE_ORDER_MARK;

/// Header of the unique tag name column.
pub const NAME_COLUMN: &str = "name";

/// Header of the stop type column, shared with the enriched table.
pub const STOP_TYPE_COLUMN: &str = "stop_type";

/// Header of the reference embedding column.
pub const EMBEDDING_COLUMN: &str = "embedding";

/// Errors raised while loading the reference taxonomy.
#[derive(Debug, Error)]
pub enum TaxonomyLoadError {
    /// The taxonomy file does not exist.
    #[error("reference taxonomy not found at {path}")]
    Missing {
        /// Path that was probed.
        path: Utf8PathBuf,
    },
    /// The taxonomy file exists but could not be opened.
    #[error("failed to open reference taxonomy {path}")]
    Open {
        /// Path that failed to open.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The CSV could not be read.
    #[error("failed to read taxonomy CSV")]
    Csv {
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },
    /// A required header is absent.
    #[error("taxonomy CSV is missing the `{column}` column")]
    MissingColumn {
        /// Name of the missing header.
        column: &'static str,
    },
    /// A score cell is not a number.
    #[error("row {row}: `{column}` value `{value}` is not a number")]
    InvalidScore {
        /// One-based data row.
        row: usize,
        /// Header of the offending column.
        column: &'static str,
        /// Raw cell text.
        value: String,
    },
    /// An embedding cell is not a list of numbers.
    #[error("row {row}: embedding is not a list of numbers")]
    InvalidEmbedding {
        /// One-based data row.
        row: usize,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// The rows violate a taxonomy invariant.
    #[error("invalid reference taxonomy")]
    Invalid {
        /// The violated invariant.
        #[source]
        source: TaxonomyError,
    },
}

#[derive(Debug)]
struct ColumnLayout {
    name: usize,
    stop_type: usize,
    embedding: usize,
    scores: [usize; CATEGORY_COUNT],
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord) -> Result<Self, TaxonomyLoadError> {
        let find = |column: &'static str| {
            headers
                .iter()
                .position(|header| header.trim_start_matches(BYTE_ORDER_MARK).trim() == column)
                .ok_or(TaxonomyLoadError::MissingColumn { column })
        };
        let mut scores = [0; CATEGORY_COUNT];
        for (slot, category) in scores.iter_mut().zip(Category::ALL) {
            *slot = find(category.column_name())?;
        }
        Ok(Self {
            name: find(NAME_COLUMN)?,
            stop_type: find(STOP_TYPE_COLUMN)?,
            embedding: find(EMBEDDING_COLUMN)?,
            scores,
        })
    }

    fn parse(&self, row: usize, record: &StringRecord) -> Result<ReferenceTag, TaxonomyLoadError> {
        let cell = |index: usize| record.get(index).unwrap_or_default();

        let mut scores = CategoryScores::zero();
        for (category, &index) in Category::ALL.into_iter().zip(&self.scores) {
            let raw = cell(index);
            let value = raw
                .trim()
                .parse::<f64>()
                .map_err(|_| TaxonomyLoadError::InvalidScore {
                    row,
                    column: category.column_name(),
                    value: raw.to_owned(),
                })?;
            scores.set(category, value);
        }

        let embedding: Vec<f32> = serde_json::from_str(cell(self.embedding).trim())
            .map_err(|source| TaxonomyLoadError::InvalidEmbedding { row, source })?;

        Ok(ReferenceTag::new(
            cell(self.name),
            scores,
            cell(self.stop_type),
            embedding,
        ))
    }
}

/// Load the taxonomy stored at `path`.
///
/// # Errors
/// Returns [`TaxonomyLoadError::Missing`] when the file does not exist, and
/// the errors of [`read_taxonomy`] for malformed contents.
pub fn load_taxonomy(path: &Utf8Path) -> Result<Taxonomy, TaxonomyLoadError> {
    let open_error = |source| TaxonomyLoadError::Open {
        path: path.to_path_buf(),
        source,
    };
    if !moca_fs::file_exists(path).map_err(open_error)? {
        return Err(TaxonomyLoadError::Missing {
            path: path.to_path_buf(),
        });
    }
    let file = moca_fs::open_utf8_file(path).map_err(open_error)?;
    let taxonomy = read_taxonomy(file)?;
    info!(
        "loaded {} reference tags ({} dimensions) from {path}",
        taxonomy.len(),
        taxonomy.dimension()
    );
    Ok(taxonomy)
}

/// Read a taxonomy CSV from `reader`.
///
/// # Errors
/// Returns [`TaxonomyLoadError`] when a header is missing, a cell cannot be
/// parsed, or the rows violate a [`Taxonomy`] invariant.
///
/// # Examples
/// ```
/// use moca_core::Category;
/// use moca_data::read_taxonomy;
///
/// let mut header: Vec<&str> = vec!["name", "stop_type", "embedding"];
/// header.extend(Category::ALL.iter().map(|category| category.column_name()));
/// let zeros = vec!["0"; Category::ALL.len()].join(",");
/// let csv = format!(
///     "{}\nbakery,commercial,\"[1.0, 0.0]\",{zeros}\n",
///     header.join(",")
/// );
///
/// let taxonomy = read_taxonomy(csv.as_bytes())?;
/// assert_eq!(taxonomy.dimension(), 2);
/// assert!(taxonomy.get("bakery").is_some());
/// # Ok::<(), moca_data::TaxonomyLoadError>(())
/// ```
pub fn read_taxonomy<R: Read>(reader: R) -> Result<Taxonomy, TaxonomyLoadError> {
    let mut csv_reader = csv::ReaderBuilder::new().from_reader(reader);
    let headers = csv_reader
        .headers()
        .map_err(|source| TaxonomyLoadError::Csv { source })?
        .clone();
    let layout = ColumnLayout::from_headers(&headers)?;

    let mut tags = Vec::new();
    for (index, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|source| TaxonomyLoadError::Csv { source })?;
        tags.push(layout.parse(index + 1, &record)?);
    }
    Taxonomy::new(tags).map_err(|source| TaxonomyLoadError::Invalid { source })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};

    use super::*;

    fn header() -> String {
        let mut columns = vec!["name", "stop_type", "embedding"];
        columns.extend(Category::ALL.iter().map(|category| category.column_name()));
        columns.join(",")
    }

    fn row(name: &str, stop_type: &str, embedding: &str, education: &str) -> String {
        let mut cells = vec![
            name.to_owned(),
            stop_type.to_owned(),
            format!("\"{embedding}\""),
            education.to_owned(),
        ];
        cells.extend(std::iter::repeat_n("0.5".to_owned(), CATEGORY_COUNT - 1));
        cells.join(",")
    }

    #[fixture]
    fn csv_text() -> String {
        format!(
            "{}\n{}\n{}\n",
            header(),
            row("school", "education", "[1.0, 0.0]", "1.0"),
            row("bakery", "commercial", "[0.0, 1.0]", "0.1"),
        )
    }

    #[rstest]
    fn reads_rows_with_scores_and_embeddings(csv_text: String) {
        let taxonomy = read_taxonomy(csv_text.as_bytes()).expect("valid taxonomy");
        assert_eq!(taxonomy.len(), 2);
        let school = taxonomy.get("school").expect("school");
        assert_eq!(school.stop_type, "education");
        assert_eq!(school.embedding, vec![1.0, 0.0]);
        assert_eq!(school.scores.get(Category::Education), 1.0);
        assert_eq!(school.scores.get(Category::SeasonalVariation), 0.5);
    }

    #[rstest]
    fn column_order_is_irrelevant() {
        let mut columns: Vec<&str> = Category::ALL.iter().map(|c| c.column_name()).collect();
        columns.extend(["extra", "embedding", "stop_type", "name"]);
        let mut cells = vec!["0.25"; CATEGORY_COUNT];
        cells.extend(["ignored", "\"[0.5, 0.5]\"", "civic", "library"]);
        let text = format!("{}\n{}\n", columns.join(","), cells.join(","));

        let taxonomy = read_taxonomy(text.as_bytes()).expect("valid taxonomy");
        let library = taxonomy.get("library").expect("library");
        assert_eq!(library.stop_type, "civic");
        assert_eq!(library.scores.get(Category::Welfare), 0.25);
    }

    #[rstest]
    fn byte_order_mark_on_first_header_is_ignored(csv_text: String) {
        let text = format!("\u{feff}{csv_text}");
        let taxonomy = read_taxonomy(text.as_bytes()).expect("BOM-prefixed taxonomy");
        assert_eq!(taxonomy.len(), 2);
        assert_eq!(taxonomy.get("bakery").expect("bakery").stop_type, "commercial");
    }

    #[rstest]
    fn missing_score_column_is_reported() {
        let text = "name,stop_type,embedding\nschool,education,\"[1.0]\"\n";
        let err = read_taxonomy(text.as_bytes()).expect_err("columns missing");
        assert!(matches!(
            err,
            TaxonomyLoadError::MissingColumn { column: "education_score" }
        ));
    }

    #[rstest]
    fn non_numeric_score_names_the_row_and_column() {
        let text = format!("{}\n{}\n", header(), row("school", "education", "[1.0]", "high"));
        let err = read_taxonomy(text.as_bytes()).expect_err("bad score");
        assert!(matches!(
            err,
            TaxonomyLoadError::InvalidScore { row: 1, column: "education_score", ref value } if value == "high"
        ));
    }

    #[rstest]
    fn malformed_embedding_is_reported() {
        let text = format!("{}\n{}\n", header(), row("school", "education", "[1.0,", "1"));
        let err = read_taxonomy(text.as_bytes()).expect_err("bad embedding");
        assert!(matches!(err, TaxonomyLoadError::InvalidEmbedding { row: 1, .. }));
    }

    #[rstest]
    fn ragged_dimensions_are_rejected() {
        let text = format!(
            "{}\n{}\n{}\n",
            header(),
            row("school", "education", "[1.0, 0.0]", "1"),
            row("bakery", "commercial", "[1.0]", "0"),
        );
        let err = read_taxonomy(text.as_bytes()).expect_err("dimension mismatch");
        assert!(matches!(
            err,
            TaxonomyLoadError::Invalid {
                source: TaxonomyError::DimensionMismatch { .. }
            }
        ));
    }

    #[rstest]
    fn header_only_file_is_empty() {
        let err = read_taxonomy(format!("{}\n", header()).as_bytes()).expect_err("no rows");
        assert!(matches!(
            err,
            TaxonomyLoadError::Invalid {
                source: TaxonomyError::Empty
            }
        ));
    }

    #[rstest]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("base_tags.csv")).expect("utf8");
        let err = load_taxonomy(&path).expect_err("file missing");
        assert!(matches!(err, TaxonomyLoadError::Missing { path: ref missing } if *missing == path));
    }

    #[rstest]
    fn load_reads_from_disk(csv_text: String) {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(csv_text.as_bytes()).expect("write");
        let path = Utf8PathBuf::from_path_buf(file.path().to_path_buf()).expect("utf8");
        let taxonomy = load_taxonomy(&path).expect("load");
        assert_eq!(taxonomy.dimension(), 2);
    }
}

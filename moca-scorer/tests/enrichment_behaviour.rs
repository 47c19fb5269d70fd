//! Behavioural coverage for enriching stops from their tags.

use std::cell::RefCell;

use moca_core::test_support::{CountingOracle, FailingOracle, StubOracle, reference_tag};
use moca_core::{Category, EmbeddingOracle, OracleError, PointsTable, ScoreVector, Taxonomy};
use moca_scorer::{EnrichOptions, Enrichment, RetryPolicy, RowIssue, enrich_points};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

type SharedOracle = CountingOracle<Box<dyn EmbeddingOracle>>;

/// Similarity of each graded reference tag to the unknown word, in
/// taxonomy order.
const GRADED: [(&str, &str, f64); 5] = [
    ("library", "civic", 0.3),
    ("plaza", "central", 0.5),
    ("farm", "rural", 0.1),
    ("market", "commercial", 0.4),
    ("shrine", "heritage", 0.2),
];

/// Reference taxonomy shared by the steps of a scenario.
#[fixture]
pub fn taxonomy() -> RefCell<Option<Taxonomy>> {
    RefCell::new(None)
}

/// Points table under test.
#[fixture]
pub fn points() -> RefCell<Option<PointsTable>> {
    RefCell::new(None)
}

/// Oracle consulted for unknown tags; answers `[1, 0]` for every word
/// unless a step replaces it.
#[fixture]
pub fn oracle() -> RefCell<SharedOracle> {
    let stub: Box<dyn EmbeddingOracle> = Box::new(StubOracle::new(2).with_default(vec![1.0, 0.0]));
    RefCell::new(CountingOracle::new(stub))
}

/// Captures the enrichment outcome for assertions.
#[fixture]
pub fn outcome() -> RefCell<Option<Enrichment>> {
    RefCell::new(None)
}

#[given("a reference taxonomy containing a bakery")]
fn bakery_taxonomy(taxonomy: &RefCell<Option<Taxonomy>>) {
    let built = Taxonomy::new(vec![
        reference_tag(
            "bakery",
            "commercial",
            vec![0.0, 1.0],
            &[(Category::Commercial, 0.8), (Category::BaseDemand, 0.6)],
        ),
        reference_tag(
            "school",
            "education",
            vec![1.0, 0.0],
            &[(Category::Education, 1.0)],
        ),
    ])
    .unwrap_or_else(|err| panic!("bakery taxonomy should be valid: {err}"));
    *taxonomy.borrow_mut() = Some(built);
}

#[given("a reference taxonomy of five graded tags")]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    reason = "embeddings are placed on the unit circle at chosen angles"
)]
fn graded_taxonomy(taxonomy: &RefCell<Option<Taxonomy>>) {
    let tags = GRADED
        .iter()
        .map(|&(name, stop_type, similarity)| {
            let embedding = vec![similarity as f32, (1.0 - similarity * similarity).sqrt() as f32];
            reference_tag(
                name,
                stop_type,
                embedding,
                &[(Category::Education, similarity * 10.0)],
            )
        })
        .collect();
    let built =
        Taxonomy::new(tags).unwrap_or_else(|err| panic!("graded taxonomy should be valid: {err}"));
    *taxonomy.borrow_mut() = Some(built);
}

#[given("an embedding oracle that always times out")]
fn failing_oracle(oracle: &RefCell<SharedOracle>) {
    let failing: Box<dyn EmbeddingOracle> = Box::new(FailingOracle::timing_out());
    *oracle.borrow_mut() = CountingOracle::new(failing);
}

#[given("a stop tagged only with bakery")]
fn bakery_stop(points: &RefCell<Option<PointsTable>>) {
    *points.borrow_mut() = Some(single_stop("['bakery']"));
}

#[given("a stop with an empty tag list")]
fn empty_stop(points: &RefCell<Option<PointsTable>>) {
    *points.borrow_mut() = Some(single_stop("[]"));
}

#[given("a stop tagged only with an unknown word")]
fn unknown_stop(points: &RefCell<Option<PointsTable>>) {
    *points.borrow_mut() = Some(single_stop("[\"xyz\"]"));
}

#[when("the stops are enriched")]
fn enrich(
    taxonomy: &RefCell<Option<Taxonomy>>,
    points: &RefCell<Option<PointsTable>>,
    oracle: &RefCell<SharedOracle>,
    outcome: &RefCell<Option<Enrichment>>,
) {
    let taxonomy_ref = taxonomy.borrow();
    let reference = taxonomy_ref
        .as_ref()
        .unwrap_or_else(|| panic!("taxonomy must be initialised"));
    let points_ref = points.borrow();
    let table = points_ref
        .as_ref()
        .unwrap_or_else(|| panic!("points must be initialised"));
    let options = EnrichOptions::default().with_retry(RetryPolicy::no_retry());
    let oracle_ref = oracle.borrow();
    let enrichment = enrich_points(table, reference, &*oracle_ref, &options)
        .unwrap_or_else(|err| panic!("default options should be valid: {err}"));
    *outcome.borrow_mut() = Some(enrichment);
}

#[then("the stop receives the bakery scores")]
fn has_bakery_scores(
    taxonomy: &RefCell<Option<Taxonomy>>,
    outcome: &RefCell<Option<Enrichment>>,
) {
    let enrichment = recorded(outcome);
    let row = enrichment
        .rows
        .first()
        .unwrap_or_else(|| panic!("one row should be emitted"));
    let binding = taxonomy.borrow();
    let bakery = binding
        .as_ref()
        .and_then(|reference| reference.get("bakery"))
        .unwrap_or_else(|| panic!("bakery should exist"));
    assert_eq!(row.score.scores, bakery.scores);
    assert_eq!(row.score.stop_type, "commercial");
}

#[then("the embedding oracle is never called")]
fn oracle_not_called(oracle: &RefCell<SharedOracle>) {
    assert_eq!(oracle.borrow().total_calls(), 0);
}

#[then("the stop receives a sentinel row")]
fn has_sentinel(outcome: &RefCell<Option<Enrichment>>) {
    let enrichment = recorded(outcome);
    assert_eq!(enrichment.rows.len(), 1);
    assert!(
        enrichment
            .rows
            .iter()
            .all(|row| row.score == ScoreVector::sentinel())
    );
}

#[then("the report flags the stop as having no tags")]
fn flagged_empty(outcome: &RefCell<Option<Enrichment>>) {
    let enrichment = recorded(outcome);
    assert_eq!(enrichment.report.flagged, 1);
    assert!(
        enrichment
            .report
            .issues
            .iter()
            .any(|record| record.issue == RowIssue::EmptyTagList)
    );
}

#[then("the scores are weighted by similarity over their sum")]
#[expect(
    clippy::float_arithmetic,
    reason = "expected value is a similarity-weighted mean"
)]
fn weighted_by_similarity(outcome: &RefCell<Option<Enrichment>>) {
    let enrichment = recorded(outcome);
    let row = enrichment
        .rows
        .first()
        .unwrap_or_else(|| panic!("one row should be emitted"));
    let total: f64 = GRADED.iter().map(|&(_, _, similarity)| similarity).sum();
    let expected: f64 = GRADED
        .iter()
        .map(|&(_, _, similarity)| similarity / total * similarity * 10.0)
        .sum();
    let education = row.score.scores.get(Category::Education);
    assert!(
        (education - expected).abs() < 1e-5,
        "expected education {expected}, got {education}"
    );
}

#[then("the stop type comes from the most similar tag")]
fn stop_type_from_best(outcome: &RefCell<Option<Enrichment>>) {
    let enrichment = recorded(outcome);
    assert!(enrichment.rows.iter().all(|row| row.score.stop_type == "central"));
}

#[then("the stop is skipped and reported as an oracle failure")]
fn skipped_on_oracle_failure(outcome: &RefCell<Option<Enrichment>>) {
    let enrichment = recorded(outcome);
    assert!(enrichment.rows.is_empty());
    assert_eq!(enrichment.report.skipped, 1);
    let issue = enrichment
        .report
        .issues
        .first()
        .map(|record| &record.issue)
        .unwrap_or_else(|| panic!("an issue should be reported"));
    assert!(matches!(
        issue,
        RowIssue::OracleFailure {
            source: OracleError::Timeout { .. },
            ..
        }
    ));
}

fn single_stop(raw_tags: &str) -> PointsTable {
    PointsTable::new(
        vec!["stop_id".into(), "tags".into()],
        vec![vec!["S-1".into(), raw_tags.to_owned()]],
    )
    .unwrap_or_else(|err| panic!("single-stop table should be valid: {err}"))
}

fn recorded(outcome: &RefCell<Option<Enrichment>>) -> Enrichment {
    outcome
        .borrow()
        .clone()
        .unwrap_or_else(|| panic!("enrichment outcome must be recorded"))
}

#[scenario(path = "tests/features/enrichment.feature", index = 0)]
fn known_tag_copies_scores(
    taxonomy: RefCell<Option<Taxonomy>>,
    points: RefCell<Option<PointsTable>>,
    oracle: RefCell<SharedOracle>,
    outcome: RefCell<Option<Enrichment>>,
) {
    let _ = (taxonomy, points, oracle, outcome);
}

#[scenario(path = "tests/features/enrichment.feature", index = 1)]
fn empty_stop_is_flagged(
    taxonomy: RefCell<Option<Taxonomy>>,
    points: RefCell<Option<PointsTable>>,
    oracle: RefCell<SharedOracle>,
    outcome: RefCell<Option<Enrichment>>,
) {
    let _ = (taxonomy, points, oracle, outcome);
}

#[scenario(path = "tests/features/enrichment.feature", index = 2)]
fn unknown_tag_blends_neighbours(
    taxonomy: RefCell<Option<Taxonomy>>,
    points: RefCell<Option<PointsTable>>,
    oracle: RefCell<SharedOracle>,
    outcome: RefCell<Option<Enrichment>>,
) {
    let _ = (taxonomy, points, oracle, outcome);
}

#[scenario(path = "tests/features/enrichment.feature", index = 3)]
fn oracle_outage_skips_stop(
    taxonomy: RefCell<Option<Taxonomy>>,
    points: RefCell<Option<PointsTable>>,
    oracle: RefCell<SharedOracle>,
    outcome: RefCell<Option<Enrichment>>,
) {
    let _ = (taxonomy, points, oracle, outcome);
}

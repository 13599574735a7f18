//! Integration tests for `SqliteStore` against an in-memory database.

use vigie_core::{
  date::DateRange,
  query::SearchCriteria,
  store::{StagedRow, ViolationStore},
  violation::{EstablishmentRef, EstablishmentStat, ViolationRecord},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn violation(id: i64, establishment: &str, date: &str) -> ViolationRecord {
  ViolationRecord {
    id,
    business_id:   1000 + id,
    date:          date.into(),
    description:   "Aliment conservé à une température inadéquate".into(),
    address:       "123 Rue Principale".into(),
    judgment_date: None,
    establishment: establishment.into(),
    amount:        "750 $".into(),
    owner:         "Gestion Exemple inc.".into(),
    city:          "Montréal".into(),
    status:        "Jugé".into(),
    status_date:   Some("20240301".into()),
    category:      "Restaurant".into(),
  }
}

fn staged(records: Vec<ViolationRecord>) -> Vec<StagedRow> {
  records
    .into_iter()
    .enumerate()
    .map(|(i, record)| StagedRow { ordinal: i + 1, record })
    .collect()
}

async fn seeded(records: Vec<ViolationRecord>) -> SqliteStore {
  let s = store().await;
  let outcome = s.merge(staged(records)).await.unwrap();
  assert!(outcome.failures.is_empty(), "{:?}", outcome.failures);
  s
}

fn ids(records: &[ViolationRecord]) -> Vec<i64> { records.iter().map(|r| r.id).collect() }

// ─── Empty store ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_store_reports_no_data() {
  let s = store().await;

  assert_eq!(s.count().await.unwrap(), 0);
  assert!(s.statistics().await.unwrap().is_empty());
  assert!(s.worst_establishment().await.unwrap().is_none());
  assert!(s.establishments().await.unwrap().is_empty());
  assert!(s.search(&SearchCriteria::default()).await.unwrap().is_empty());
}

// ─── Merge ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn merge_inserts_and_roundtrips_all_fields() {
  let mut record = violation(1, "Cafe Nord", "20240115");
  record.judgment_date = Some("20240220".into());
  record.status_date = None;
  let s = seeded(vec![record.clone()]).await;

  let stored = s.search(&SearchCriteria::default()).await.unwrap();
  assert_eq!(stored, vec![record]);
}

#[tokio::test]
async fn merging_twice_is_a_no_op() {
  let batch = vec![
    violation(1, "Cafe Nord", "20240115"),
    violation(2, "Cafe Sud", "20240116"),
  ];
  let s = store().await;

  let first = s.merge(staged(batch.clone())).await.unwrap();
  assert_eq!(first.inserted, 2);
  assert_eq!(first.duplicates, 0);
  let before = s.search(&SearchCriteria::default()).await.unwrap();

  let second = s.merge(staged(batch)).await.unwrap();
  assert_eq!(second.inserted, 0);
  assert_eq!(second.duplicates, 2);

  let after = s.search(&SearchCriteria::default()).await.unwrap();
  assert_eq!(before, after);
  assert_eq!(s.count().await.unwrap(), 2);
}

#[tokio::test]
async fn existing_rows_are_never_altered() {
  let s = seeded(vec![violation(1, "Cafe Nord", "20240115")]).await;

  let outcome = s
    .merge(staged(vec![violation(1, "Renamed", "20250101")]))
    .await
    .unwrap();
  assert_eq!(outcome.duplicates, 1);

  let stored = s.search(&SearchCriteria::default()).await.unwrap();
  assert_eq!(stored[0].establishment, "Cafe Nord");
  assert_eq!(stored[0].date, "20240115");
}

#[tokio::test]
async fn repeated_identifier_within_batch_is_inserted_once() {
  let s = store().await;
  let outcome = s
    .merge(staged(vec![
      violation(7, "Cafe Nord", "20240115"),
      violation(7, "Cafe Nord", "20240115"),
    ]))
    .await
    .unwrap();

  assert_eq!(outcome.inserted, 1);
  assert_eq!(outcome.duplicates, 1);
  assert_eq!(s.count().await.unwrap(), 1);
}

#[tokio::test]
async fn failing_row_does_not_abort_batch() {
  let s = store().await;
  s.execute_batch(
    "CREATE TRIGGER reject_row BEFORE INSERT ON violations
     WHEN NEW.etablissement = 'Rejected'
     BEGIN SELECT RAISE(ABORT, 'row rejected'); END;",
  )
  .await
  .unwrap();

  let outcome = s
    .merge(staged(vec![
      violation(1, "Cafe Nord", "20240115"),
      violation(2, "Rejected", "20240116"),
      violation(3, "Bistro", "20240117"),
    ]))
    .await
    .unwrap();

  assert_eq!(outcome.inserted, 2);
  assert_eq!(outcome.failures.len(), 1);
  assert_eq!(outcome.failures[0].ordinal, 2);
  assert_eq!(outcome.failures[0].id, 2);
  assert!(outcome.failures[0].reason.contains("row rejected"));
  assert_eq!(s.count().await.unwrap(), 2);
}

#[tokio::test]
async fn dates_are_stored_as_provided() {
  let s = seeded(vec![
    violation(1, "Cafe Nord", "2024-01-15"),
    violation(2, "Cafe Sud", "15/01/2024"),
  ])
  .await;

  let mut dates: Vec<String> = s
    .search(&SearchCriteria::default())
    .await
    .unwrap()
    .into_iter()
    .map(|r| r.date)
    .collect();
  dates.sort_unstable();
  assert_eq!(dates, ["15/01/2024", "2024-01-15"]);
}

#[tokio::test]
async fn concurrent_merges_never_duplicate() {
  let s = store().await;
  let batch: Vec<_> = (1..=50)
    .map(|id| violation(id, "Cafe Nord", "20240115"))
    .collect();

  let (a, b) = tokio::join!(s.merge(staged(batch.clone())), s.merge(staged(batch)));
  let (a, b) = (a.unwrap(), b.unwrap());

  assert_eq!(a.inserted + b.inserted, 50);
  assert_eq!(a.duplicates + b.duplicates, 50);
  assert_eq!(s.count().await.unwrap(), 50);
}

#[tokio::test]
async fn existing_ids_returns_stored_subset() {
  let s = seeded(vec![
    violation(1, "Cafe Nord", "20240115"),
    violation(3, "Cafe Sud", "20240116"),
  ])
  .await;

  let found = s.existing_ids(&[1, 2, 3, 4]).await.unwrap();
  assert_eq!(found.len(), 2);
  assert!(found.contains(&1) && found.contains(&3));
  assert!(s.existing_ids(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn existing_ids_spans_multiple_chunks() {
  let batch: Vec<_> = (1..=1200)
    .map(|id| violation(id, "Cafe Nord", "20240115"))
    .collect();
  let s = seeded(batch).await;

  let wanted: Vec<i64> = (600..=1800).collect();
  let found = s.existing_ids(&wanted).await.unwrap();
  assert_eq!(found.len(), 601);
}

// ─── Search ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn search_criteria_are_conjunctive() {
  let s = seeded(vec![
    violation(1, "Cafe Nord", "20240115"),
    violation(2, "Cafe Sud", "20240116"),
  ])
  .await;

  let both = s
    .search(&SearchCriteria::default().establishment("Cafe"))
    .await
    .unwrap();
  assert_eq!(both.len(), 2);

  let none = s
    .search(
      &SearchCriteria::default()
        .establishment("Cafe")
        .owner("Personne"),
    )
    .await
    .unwrap();
  assert!(none.is_empty());
}

#[tokio::test]
async fn search_is_case_insensitive() {
  let s = seeded(vec![violation(1, "Cafe Nord", "20240115")]).await;

  let found = s
    .search(&SearchCriteria::default().establishment("cAFE nord"))
    .await
    .unwrap();
  assert_eq!(ids(&found), [1]);
}

#[tokio::test]
async fn street_tokens_match_in_any_order() {
  let s = seeded(vec![violation(1, "Cafe Nord", "20240115")]).await;

  let reordered = s
    .search(&SearchCriteria::default().street("Principale 123"))
    .await
    .unwrap();
  assert_eq!(ids(&reordered), [1]);

  let partial = s
    .search(&SearchCriteria::default().street("Principale Secondaire"))
    .await
    .unwrap();
  assert!(partial.is_empty());
}

#[tokio::test]
async fn search_matches_fragments_literally() {
  let s = seeded(vec![
    violation(1, "100% Bio", "20240115"),
    violation(2, "1000 Saveurs", "20240116"),
    violation(3, "Chez_Lulu", "20240117"),
    violation(4, "Chez Lulu", "20240118"),
  ])
  .await;

  let percent = s
    .search(&SearchCriteria::default().establishment("100%"))
    .await
    .unwrap();
  assert_eq!(ids(&percent), [1]);

  let underscore = s
    .search(&SearchCriteria::default().establishment("Chez_"))
    .await
    .unwrap();
  assert_eq!(ids(&underscore), [3]);
}

#[tokio::test]
async fn unconstrained_search_returns_all_newest_first() {
  let s = seeded(vec![
    violation(1, "A", "20230105"),
    violation(2, "B", "20240320"),
    violation(3, "C", "20240320"),
    violation(4, "D", "20231130"),
  ])
  .await;

  let all = s
    .search(&SearchCriteria::default().owner("  "))
    .await
    .unwrap();
  assert_eq!(ids(&all), [3, 2, 4, 1]);
}

// ─── Date range ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn date_range_is_inclusive_on_both_ends() {
  let s = seeded(vec![
    violation(1, "A", "20231231"),
    violation(2, "B", "20240101"),
    violation(3, "C", "20240115"),
    violation(4, "D", "20240131"),
    violation(5, "E", "20240201"),
  ])
  .await;

  let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
  let found = s.in_date_range(&range).await.unwrap();
  assert_eq!(ids(&found), [4, 3, 2]);
}

#[tokio::test]
async fn reversed_date_range_is_empty() {
  let s = seeded(vec![violation(1, "A", "20240115")]).await;

  let range = DateRange::parse("2024-01-31", "2024-01-01").unwrap();
  assert!(s.in_date_range(&range).await.unwrap().is_empty());
}

// ─── Establishments ──────────────────────────────────────────────────────────

#[tokio::test]
async fn establishments_are_distinct_and_sorted() {
  let s = seeded(vec![
    violation(1, "Cafe Sud", "20240115"),
    violation(2, "Bistro", "20240116"),
    violation(3, "Cafe Sud", "20240117"),
    violation(4, "Cafe Nord", "20240118"),
  ])
  .await;

  assert_eq!(
    s.establishments().await.unwrap(),
    ["Bistro", "Cafe Nord", "Cafe Sud"]
  );
}

#[tokio::test]
async fn lookup_by_ids_skips_unknown_identifiers() {
  let s = seeded(vec![
    violation(10, "Cafe Nord", "20240115"),
    violation(20, "Cafe Sud", "20240116"),
    violation(30, "Bistro", "20240117"),
  ])
  .await;

  let refs = s.establishments_by_ids(&[30, 99, 10, 30]).await.unwrap();
  assert_eq!(refs, vec![
    EstablishmentRef { id: 10, establishment: "Cafe Nord".into() },
    EstablishmentRef { id: 30, establishment: "Bistro".into() },
  ]);
  assert!(s.establishments_by_ids(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn lookup_spans_multiple_chunks_in_id_order() {
  let batch: Vec<_> = (1..=1200)
    .map(|id| violation(id, &format!("Cafe {id}"), "20240115"))
    .collect();
  let s = seeded(batch).await;

  let wanted: Vec<i64> = (1..=1500).rev().collect();
  let refs = s.establishments_by_ids(&wanted).await.unwrap();
  assert_eq!(refs.len(), 1200);
  assert!(refs.windows(2).all(|w| w[0].id < w[1].id));
  assert_eq!(refs[1199].establishment, "Cafe 1200");
}

// ─── Aggregates ──────────────────────────────────────────────────────────────

fn stat(name: &str, count: u64) -> EstablishmentStat {
  EstablishmentStat { establishment: name.into(), count }
}

#[tokio::test]
async fn statistics_rank_by_count_then_name() {
  let s = seeded(vec![
    violation(1, "Cafe Sud", "20240115"),
    violation(2, "Bistro", "20240116"),
    violation(3, "Cafe Sud", "20240117"),
    violation(4, "Cafe Nord", "20240118"),
    violation(5, "Bistro", "20240119"),
    violation(6, "Zinc", "20240120"),
    violation(7, "Zinc", "20240121"),
    violation(8, "Zinc", "20240122"),
  ])
  .await;

  let stats = s.statistics().await.unwrap();
  assert_eq!(stats, vec![
    stat("Zinc", 3),
    stat("Bistro", 2),
    stat("Cafe Sud", 2),
    stat("Cafe Nord", 1),
  ]);

  let total: u64 = stats.iter().map(|st| st.count).sum();
  assert_eq!(total, s.count().await.unwrap());
}

#[tokio::test]
async fn worst_establishment_is_head_of_statistics() {
  let s = seeded(vec![
    violation(1, "Cafe Sud", "20240115"),
    violation(2, "Bistro", "20240116"),
    violation(3, "Cafe Sud", "20240117"),
    violation(4, "Bistro", "20240118"),
  ])
  .await;

  let stats = s.statistics().await.unwrap();
  let worst = s.worst_establishment().await.unwrap();
  assert_eq!(worst.as_ref(), stats.first());
  assert_eq!(worst, Some(stat("Bistro", 2)));
}

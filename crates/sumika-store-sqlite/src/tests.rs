//! Integration tests for `SqliteRegistry` against an in-memory database,
//! including matcher precedence over real registry state.

use sumika_core::{
  building::{Listing, NewBuilding, NewEvidenceLink},
  key::BuildingKey,
  matcher::{self, MatchOutcome},
  normalize::{normalize_address, normalize_name},
  registry::BuildingRegistry,
};

use crate::SqliteRegistry;

async fn registry() -> SqliteRegistry {
  SqliteRegistry::open_in_memory()
    .await
    .expect("in-memory registry")
}

fn building(raw_name: &str, raw_address: &str) -> NewBuilding {
  let norm_name = normalize_name(raw_name);
  let norm_address = normalize_address(raw_address);
  NewBuilding::derived(raw_name, raw_address, &norm_name, &norm_address)
}

fn link(
  source: &str,
  evidence_id: &str,
  building_id: &BuildingKey,
  raw_name: &str,
  raw_address: &str,
) -> NewEvidenceLink {
  NewEvidenceLink {
    source:      source.to_string(),
    evidence_id: evidence_id.to_string(),
    building_id: building_id.clone(),
    raw_name:    raw_name.to_string(),
    raw_address: raw_address.to_string(),
    norm_name:   normalize_name(raw_name),
  }
}

fn listing(key: &str, building_id: &BuildingKey, room: &str) -> Listing {
  Listing {
    listing_key: key.to_string(),
    building_id: building_id.clone(),
    source:      "weekly".to_string(),
    evidence_id: "ev-1".to_string(),
    room:        room.to_string(),
    rent_man:    Some(5.2),
    fee_man:     Some(0.3),
    floor:       Some("3".to_string()),
    layout:      Some("1K".to_string()),
    area_sqm:    Some(24.5),
    age_years:   Some(12),
    structure:   Some("RC".to_string()),
    updated_at:  Some("2024-06-01".to_string()),
  }
}

// ─── Buildings ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_building() {
  let r = registry().await;

  let input = building("サンハイツ魚町", "北九州市小倉北区魚町1丁目2番3号");
  let id = input.building_id.clone();
  assert!(r.insert_building_if_absent(input).await.unwrap());

  let fetched = r.get_building(&id).await.unwrap().unwrap();
  assert_eq!(fetched.building_id, id);
  assert_eq!(fetched.canonical_name, "サンハイツ魚町");
  assert_eq!(fetched.norm_address, "福岡県北九州市小倉北区魚町1-2-3");
  assert_eq!(fetched.addr_key, "北九州市小倉北区魚町1-2-3");
}

#[tokio::test]
async fn insert_if_absent_absorbs_duplicates() {
  let r = registry().await;

  let input = building("サンハイツ魚町", "北九州市小倉北区魚町1-2-3");
  assert!(r.insert_building_if_absent(input.clone()).await.unwrap());
  assert!(!r.insert_building_if_absent(input).await.unwrap());

  assert_eq!(r.building_count().await.unwrap(), 1);
}

#[tokio::test]
async fn get_building_missing_returns_none() {
  let r = registry().await;
  let id = BuildingKey::derive("ない", "どこにもない");
  assert!(r.get_building(&id).await.unwrap().is_none());
}

#[tokio::test]
async fn find_by_addr_key_ignores_prefecture() {
  let r = registry().await;

  // Stored with the prefecture prefixed during normalization.
  let input = building("コーポ光", "北九州市小倉北区魚町1-2-3");
  let id = input.building_id.clone();
  r.insert_building_if_absent(input).await.unwrap();

  let found = r
    .find_by_addr_key("北九州市小倉北区魚町1-2-3")
    .await
    .unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].building_id, id);
}

#[tokio::test]
async fn update_normal_forms_rewrites_matching_columns() {
  let r = registry().await;

  let input = building("サンハイツ", "北九州市小倉北区魚町1-2-3");
  let id = input.building_id.clone();
  r.insert_building_if_absent(input).await.unwrap();

  r.update_normal_forms(&id, "新名称", "福岡県北九州市小倉南区4-5", "北九州市小倉南区4-5")
    .await
    .unwrap();

  let fetched = r.get_building(&id).await.unwrap().unwrap();
  assert_eq!(fetched.building_id, id); // identity is stable
  assert_eq!(fetched.norm_name, "新名称");
  assert_eq!(fetched.addr_key, "北九州市小倉南区4-5");
}

// ─── Evidence links ──────────────────────────────────────────────────────────

#[tokio::test]
async fn evidence_upsert_is_last_write_wins() {
  let r = registry().await;

  let a = building("ビルA", "北九州市小倉北区魚町1-2");
  let b = building("ビルB", "北九州市小倉北区船場町9-9");
  let id_a = a.building_id.clone();
  let id_b = b.building_id.clone();
  r.insert_building_if_absent(a).await.unwrap();
  r.insert_building_if_absent(b).await.unwrap();

  r.upsert_evidence_link(link("weekly", "ev-1", &id_a, "ビルA", "魚町1-2"))
    .await
    .unwrap();
  r.upsert_evidence_link(link("weekly", "ev-1", &id_b, "ビルA", "魚町1-2"))
    .await
    .unwrap();

  let fetched = r.get_evidence_link("weekly", "ev-1").await.unwrap().unwrap();
  assert_eq!(fetched.building_id, id_b);
  assert_eq!(r.evidence_count().await.unwrap(), 1);
}

#[tokio::test]
async fn alias_targets_are_distinct_building_ids() {
  let r = registry().await;

  let a = building("サンハイツ", "北九州市小倉北区魚町1-2");
  let b = building("サンハイツ", "北九州市小倉南区湯川3-4");
  let id_a = a.building_id.clone();
  let id_b = b.building_id.clone();
  r.insert_building_if_absent(a).await.unwrap();
  r.insert_building_if_absent(b).await.unwrap();

  // Two sources observing the same building under the same name collapse to
  // one target; a third observation on another building makes two.
  r.upsert_evidence_link(link("weekly", "ev-1", &id_a, "サンハイツ", "魚町1-2"))
    .await
    .unwrap();
  r.upsert_evidence_link(link("reviews", "ev-2", &id_a, "サンハイツ", "魚町1-2"))
    .await
    .unwrap();
  assert_eq!(r.alias_targets("サンハイツ").await.unwrap().len(), 1);

  r.upsert_evidence_link(link("weekly", "ev-3", &id_b, "サンハイツ", "湯川3-4"))
    .await
    .unwrap();
  assert_eq!(r.alias_targets("サンハイツ").await.unwrap().len(), 2);
}

#[tokio::test]
async fn find_evidence_by_id_spans_sources() {
  let r = registry().await;

  let a = building("ビルA", "北九州市小倉北区魚町1-2");
  let id_a = a.building_id.clone();
  r.insert_building_if_absent(a).await.unwrap();

  r.upsert_evidence_link(link("weekly", "ev-9", &id_a, "ビルA", "魚町1-2"))
    .await
    .unwrap();
  r.upsert_evidence_link(link("seed", "ev-9", &id_a, "ビルA", "魚町1-2"))
    .await
    .unwrap();

  let links = r.find_evidence_by_id("ev-9").await.unwrap();
  assert_eq!(links.len(), 2);
  assert!(links.iter().all(|l| l.building_id == id_a));
}

// ─── Listings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn listing_upsert_is_idempotent() {
  let r = registry().await;
  let id = BuildingKey::derive("ビル", "北九州市小倉北区魚町1-2");

  r.upsert_listing(listing("lk-1", &id, "101")).await.unwrap();
  r.upsert_listing(listing("lk-1", &id, "101")).await.unwrap();
  assert_eq!(r.listing_count().await.unwrap(), 1);

  r.upsert_listing(listing("lk-2", &id, "202")).await.unwrap();
  assert_eq!(r.listing_count().await.unwrap(), 2);
}

// ─── Matcher precedence ──────────────────────────────────────────────────────

#[tokio::test]
async fn alias_exact_resolves_single_target() {
  let r = registry().await;

  let a = building("サンハイツ魚町", "北九州市小倉北区魚町1-2-3");
  let id_a = a.building_id.clone();
  r.insert_building_if_absent(a).await.unwrap();
  r.upsert_evidence_link(link("weekly", "ev-1", &id_a, "サンハイツ魚町", "魚町1-2-3"))
    .await
    .unwrap();

  let outcome = matcher::match_building(&r, "サンハイツ魚町", "").await.unwrap();
  assert_eq!(outcome.resolved(), Some(&id_a));
  assert_eq!(outcome.reason(), "alias_exact");
}

#[tokio::test]
async fn alias_beats_address_colocation() {
  let r = registry().await;

  // Building A, known by alias. Building B, only reachable by address.
  let a = building("サンハイツ魚町", "北九州市小倉北区魚町1-2-3");
  let b = building("コーポ船場", "北九州市小倉北区船場町5-6");
  let id_a = a.building_id.clone();
  let id_b = b.building_id.clone();
  r.insert_building_if_absent(a).await.unwrap();
  r.insert_building_if_absent(b).await.unwrap();
  r.upsert_evidence_link(link("weekly", "ev-1", &id_a, "サンハイツ魚町", "魚町1-2-3"))
    .await
    .unwrap();

  // Name matches A's alias; address matches B exactly.
  let outcome = matcher::match_building(
    &r,
    "サンハイツ魚町",
    "福岡県北九州市小倉北区船場町5-6",
  )
  .await
  .unwrap();

  assert_eq!(outcome.resolved(), Some(&id_a));
  assert_ne!(outcome.resolved(), Some(&id_b));
}

#[tokio::test]
async fn alias_conflict_is_terminal() {
  let r = registry().await;

  let a = building("サンハイツ", "北九州市小倉北区魚町1-2");
  let b = building("サンハイツ", "北九州市小倉南区湯川3-4");
  let c = building("コーポ独占", "北九州市門司区栄町7-8");
  let id_a = a.building_id.clone();
  let id_b = b.building_id.clone();
  r.insert_building_if_absent(a).await.unwrap();
  r.insert_building_if_absent(b).await.unwrap();
  r.insert_building_if_absent(c).await.unwrap();
  r.upsert_evidence_link(link("weekly", "ev-1", &id_a, "サンハイツ", "魚町1-2"))
    .await
    .unwrap();
  r.upsert_evidence_link(link("weekly", "ev-2", &id_b, "サンハイツ", "湯川3-4"))
    .await
    .unwrap();

  // The address alone would resolve to C, but the alias conflict wins.
  let outcome = matcher::match_building(
    &r,
    "サンハイツ",
    "福岡県北九州市門司区栄町7-8",
  )
  .await
  .unwrap();

  let MatchOutcome::AliasAmbiguous { candidates } = outcome else {
    panic!("expected alias conflict, got {outcome:?}");
  };
  assert_eq!(candidates.len(), 2);
}

#[tokio::test]
async fn address_exact_resolves_single_colocated_building() {
  let r = registry().await;

  let a = building("コーポ光", "北九州市小倉北区魚町1-2-3");
  let id_a = a.building_id.clone();
  r.insert_building_if_absent(a).await.unwrap();

  // Unknown name, known address.
  let outcome = matcher::match_building(
    &r,
    "ハイツひかり",
    "福岡県北九州市小倉北区魚町1-2-3",
  )
  .await
  .unwrap();

  assert_eq!(outcome.resolved(), Some(&id_a));
  assert_eq!(outcome.reason(), "address_exact");
}

#[tokio::test]
async fn address_similarity_needs_unique_winner() {
  let r = registry().await;

  // Same lot, two buildings: one matching name, one unrelated.
  let a = building("グランドハイツ小倉駅前", "北九州市小倉北区浅野2-3-4");
  let b = building("メゾンさくら", "福岡県北九州市小倉北区浅野2-3-4");
  let id_a = a.building_id.clone();
  r.insert_building_if_absent(a).await.unwrap();
  r.insert_building_if_absent(b).await.unwrap();

  let outcome = matcher::match_building(
    &r,
    "グランドハイツ小倉駅前",
    "福岡県北九州市小倉北区浅野2-3-4",
  )
  .await
  .unwrap();

  let MatchOutcome::AddressSimilarity { building_id, score } = outcome else {
    panic!("expected similarity resolution, got {outcome:?}");
  };
  assert_eq!(building_id, id_a);
  assert!(score >= matcher::NAME_SIMILARITY_THRESHOLD);
}

#[tokio::test]
async fn tied_similarity_stays_unresolved() {
  let r = registry().await;

  // Two buildings on the same lot whose names are equally close to the
  // query (both scores clear the threshold, but neither wins strictly).
  let a = building("グランドハイツ浅野一号館", "北九州市小倉北区浅野2-3-4");
  let b = building("グランドハイツ浅野二号館", "北九州市小倉北区浅野2-3-4");
  assert_ne!(a.building_id, b.building_id);
  r.insert_building_if_absent(a).await.unwrap();
  r.insert_building_if_absent(b).await.unwrap();

  let outcome = matcher::match_building(
    &r,
    "グランドハイツ浅野三号館",
    "福岡県北九州市小倉北区浅野2-3-4",
  )
  .await
  .unwrap();

  let MatchOutcome::AddressLowConfidence { candidates } = outcome else {
    panic!("expected low confidence, got {outcome:?}");
  };
  assert_eq!(candidates.len(), 2);
}

#[tokio::test]
async fn weak_address_never_matches_by_address() {
  let r = registry().await;

  let a = building("コーポ光", "北九州市小倉北区魚町");
  r.insert_building_if_absent(a).await.unwrap();

  // Same weak address, unknown name: the address step is skipped entirely.
  let outcome = matcher::match_building(
    &r,
    "ハイツひかり",
    "福岡県北九州市小倉北区魚町",
  )
  .await
  .unwrap();

  assert_eq!(outcome, MatchOutcome::Unmatched);
}

#[tokio::test]
async fn unmatched_when_registry_is_empty() {
  let r = registry().await;
  let outcome = matcher::match_building(
    &r,
    "サンハイツ",
    "福岡県北九州市小倉北区魚町1-2-3",
  )
  .await
  .unwrap();
  assert_eq!(outcome, MatchOutcome::Unmatched);
  assert!(outcome.candidates().is_empty());
}

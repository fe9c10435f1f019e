//! Integration tests for the recommendation service.
//!
//! These tests drive the public operations end to end on small in-code
//! catalogs.

use std::collections::HashSet;
use std::sync::Arc;

use catalog::{Interaction, InteractionEvent, ItemKey, ItemRecord, ItemRef, ItemType};
use engine::{EngineError, RecommendRequest, RecommendationService};
use ranking::{DISCOVER_SCORE, POPULAR_SCORE, REASON_COLLABORATIVE, REASON_DISCOVER, REASON_HYBRID};
use rayon::prelude::*;

fn catalog_items() -> Vec<ItemRecord> {
    vec![
        ItemRecord::new(10, ItemType::Movie, "The Matrix", &["Action", "Sci-Fi"]),
        ItemRecord::new(11, ItemType::Movie, "The Matrix Reloaded", &["Action", "Sci-Fi"]),
        ItemRecord::new(12, ItemType::Movie, "Blade Runner", &["Sci-Fi", "Noir"]),
        ItemRecord::new(13, ItemType::Movie, "Notting Hill", &["Romance", "Comedy"]),
        ItemRecord::new(14, ItemType::Movie, "Heat", &["Action", "Crime"]),
        ItemRecord::new(20, ItemType::Book, "Neuromancer", &["Sci-Fi"]),
        ItemRecord::new(21, ItemType::Book, "Pride and Prejudice", &["Romance"]),
        ItemRecord::new(30, ItemType::Series, "The Expanse", &["Sci-Fi", "Drama"]),
        ItemRecord::new(31, ItemType::Series, "???", &[]),
    ]
}

fn like(user: i64, id: i64, item_type: ItemType) -> Interaction {
    Interaction::new(user, id, item_type, InteractionEvent::Like)
}

fn build_test_service() -> RecommendationService {
    let service = RecommendationService::default();
    service.sync_items(catalog_items(), true);
    service
        .sync_interactions(&[
            like(1, 10, ItemType::Movie),
            like(1, 20, ItemType::Book),
            like(2, 10, ItemType::Movie),
            like(2, 13, ItemType::Movie),
            like(3, 30, ItemType::Series),
            like(4, 30, ItemType::Series),
        ])
        .unwrap();
    service
}

fn matrix_request() -> RecommendRequest {
    RecommendRequest::new(vec![ItemRef::new(10, ItemType::Movie)])
}

#[test]
fn test_sync_interactions_before_items_fails() {
    let service = RecommendationService::default();
    let result = service.sync_interactions(&[like(1, 10, ItemType::Movie)]);
    assert!(matches!(result, Err(EngineError::PreconditionFailed(_))));

    let result = service.feedback(&like(1, 10, ItemType::Movie));
    assert!(matches!(result, Err(EngineError::PreconditionFailed(_))));
}

#[test]
fn test_feedback_unknown_item_is_not_found() {
    let service = build_test_service();
    let before = service.stats();

    let result = service.feedback(&like(1, 999, ItemType::Movie));
    assert!(matches!(result, Err(EngineError::NotFound { key }) if key == "movie:999"));
    // same id under another type is a different key
    let result = service.feedback(&like(1, 20, ItemType::Movie));
    assert!(matches!(result, Err(EngineError::NotFound { .. })));

    assert_eq!(service.stats(), before);
}

#[test]
fn test_sync_interactions_counts() {
    let service = RecommendationService::default();
    service.sync_items(catalog_items(), true);

    let report = service
        .sync_interactions(&[
            like(1, 10, ItemType::Movie),
            Interaction::new(1, 11, ItemType::Movie, InteractionEvent::Purchase),
            Interaction::new(1, 12, ItemType::Movie, InteractionEvent::View),
            Interaction::new(1, 12, ItemType::Movie, InteractionEvent::Other),
            like(1, 404, ItemType::Book),
        ])
        .unwrap();

    assert_eq!(report.ingested, 2);
    assert_eq!(report.ignored, 2);
    assert_eq!(report.skipped_unknown, 1);
    assert_eq!(service.stats().interaction_total, 2);
}

#[test]
fn test_view_events_never_count() {
    let service = build_test_service();
    let before = service.stats();
    let view = Interaction::new(9, 12, ItemType::Movie, InteractionEvent::View);
    assert_eq!(service.feedback(&view).unwrap(), 0);

    let after = service.stats();
    assert_eq!(after.user_count, before.user_count);
    assert_eq!(after.interaction_total, before.interaction_total);
}

#[test]
fn test_collaborative_neighbour_is_recommended() {
    let service = build_test_service();
    let recs = service.recommend(&matrix_request().limit(8)).unwrap();

    // user 1 and user 2 both liked The Matrix
    let neuromancer = recs.iter().find(|r| r.id == 20).unwrap();
    assert_eq!(neuromancer.reason, REASON_HYBRID);
    let notting_hill = recs.iter().find(|r| r.id == 13).unwrap();
    assert_eq!(notting_hill.reason, REASON_COLLABORATIVE);
    assert!(notting_hill.score > 0.0);
}

#[test]
fn test_repeated_likes_weigh_more() {
    let service = build_test_service();
    let matrix = ItemRef::new(10, ItemType::Movie);
    let pride = ItemRef::new(21, ItemType::Book);
    let once = service
        .recommend(&RecommendRequest::new(vec![matrix, pride]).limit(10).diversity(0.0))
        .unwrap();
    let twice = service
        .recommend(&RecommendRequest::new(vec![matrix, matrix, pride]).limit(10).diversity(0.0))
        .unwrap();

    let reloaded = |recs: &[ranking::Recommendation]| recs.iter().find(|r| r.id == 11).unwrap().score;
    assert!(reloaded(&twice) > reloaded(&once));
    assert!(twice.iter().all(|r| r.id != 10 && r.id != 21));
}

#[test]
fn test_zero_relevance_candidates_go_to_fallback() {
    let service = RecommendationService::default();
    service.sync_items(
        vec![
            ItemRecord::new(1, ItemType::Movie, "Fast Cars", &["Action"]),
            ItemRecord::new(2, ItemType::Movie, "Slow Boats", &["Drama"]),
            ItemRecord::new(3, ItemType::Movie, "Fast Boats", &["Action"]),
            ItemRecord::new(4, ItemType::Movie, "Zebra", &["Action", "Crime"]),
            ItemRecord::new(5, ItemType::Movie, "Quokka", &["Crime"]),
            ItemRecord::new(6, ItemType::Movie, "Other", &["Poetry"]),
        ],
        true,
    );

    // Quokka is only reached through the Action -> Crime expansion
    let request = RecommendRequest::new(vec![ItemRef::new(1, ItemType::Movie)])
        .limit(5)
        .diversity(0.0);
    let recs = service.recommend(&request).unwrap();

    let ids: Vec<i64> = recs.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![3, 4, 2, 5, 6]);
    assert!(recs.iter().all(|r| r.score > 0.0));
    let quokka = &recs[3];
    assert_eq!(quokka.reason, REASON_DISCOVER);
    assert_eq!(quokka.score, DISCOVER_SCORE);
}

#[test]
fn test_liked_items_never_returned() {
    let service = build_test_service();
    let request = RecommendRequest::new(vec![
        ItemRef::new(10, ItemType::Movie),
        ItemRef::new(30, ItemType::Series),
    ])
    .limit(50)
    .min_score(0.5);

    let recs = service.recommend(&request).unwrap();
    assert!(!recs.is_empty());
    assert!(recs.iter().all(|r| !matches!((r.id, r.item_type), (10, ItemType::Movie) | (30, ItemType::Series))));
}

#[test]
fn test_no_duplicates_after_padding() {
    let service = build_test_service();
    for diversity in [0.0, 0.3, 1.0] {
        let recs = service
            .recommend(&matrix_request().limit(20).diversity(diversity))
            .unwrap();
        // every other item fits
        assert_eq!(recs.len(), catalog_items().len() - 1);
        let unique: HashSet<ItemKey> = recs.iter().map(|r| ItemKey::new(r.item_type, r.id)).collect();
        assert_eq!(unique.len(), recs.len());
    }
}

#[test]
fn test_threshold_law() {
    let service = build_test_service();
    for min_score in [0.0, 0.2, 0.4, 0.8, 1.0] {
        let recs = service
            .recommend(&matrix_request().limit(10).min_score(min_score))
            .unwrap();
        for rec in &recs {
            let fallback = rec.score == POPULAR_SCORE || rec.score == DISCOVER_SCORE;
            assert!(fallback || rec.score >= min_score, "{rec:?} under {min_score}");
        }
    }
}

#[test]
fn test_limit_bounds_result() {
    let service = build_test_service();
    for limit in [1, 2, 5] {
        let recs = service.recommend(&matrix_request().limit(limit).mmr_pool(3)).unwrap();
        assert_eq!(recs.len(), limit);
    }
}

#[test]
fn test_target_type_applies_to_everything() {
    let service = build_test_service();
    let recs = service
        .recommend(&matrix_request().target_type(ItemType::Book).limit(5))
        .unwrap();
    assert_eq!(recs.len(), 2);
    assert!(recs.iter().all(|r| r.item_type == ItemType::Book));
}

#[test]
fn test_recommend_is_deterministic() {
    let service = build_test_service();
    let request = matrix_request().limit(6).diversity(0.5);
    let first = service.recommend(&request).unwrap();
    for _ in 0..5 {
        assert_eq!(service.recommend(&request).unwrap(), first);
    }
}

#[test]
fn test_rebuild_is_idempotent() {
    let service = build_test_service();
    let request = matrix_request().limit(6).diversity(0.2);
    let before = service.recommend(&request).unwrap();

    service.rebuild();
    service.rebuild();
    assert_eq!(service.recommend(&request).unwrap(), before);

    service.sync_items(catalog_items(), true);
    assert_eq!(service.recommend(&request).unwrap(), before);
}

#[test]
fn test_unknown_likes_still_get_results() {
    let service = build_test_service();
    let request = RecommendRequest::new(vec![ItemRef::new(777, ItemType::Movie)]).limit(3);
    let recs = service.recommend(&request).unwrap();

    assert_eq!(recs.len(), 3);
    // The Expanse and The Matrix have two likes each; first-seen wins the tie
    assert_eq!(recs[0].id, 10);
    assert_eq!(recs[1].id, 30);
    assert!(recs.iter().all(|r| r.score == POPULAR_SCORE));
}

#[test]
fn test_empty_profile_degrades_to_fallback() {
    let service = build_test_service();
    // no title tokens, no genres, no interactions
    let request = RecommendRequest::new(vec![ItemRef::new(31, ItemType::Series)]).limit(4);
    let recs = service.recommend(&request).unwrap();
    assert_eq!(recs.len(), 4);
    assert!(recs.iter().all(|r| r.id != 31));
}

#[test]
fn test_concurrent_recommend_during_rebuild() {
    let service = Arc::new(build_test_service());
    let request = matrix_request().limit(5);
    let expected = service.recommend(&request).unwrap();

    let results: Vec<_> = (0..64)
        .into_par_iter()
        .map(|i| {
            if i % 8 == 0 {
                service.sync_items(catalog_items(), true);
                None
            } else {
                Some(service.recommend(&request).unwrap())
            }
        })
        .collect();

    for recs in results.into_iter().flatten() {
        assert_eq!(recs, expected);
    }
}

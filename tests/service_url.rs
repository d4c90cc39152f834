mod common;

use chrono::{Duration, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use expiring_shortener::application::services::{
    CreateUrl, MAX_ALLOCATION_ATTEMPTS, MAX_DURATION_HOURS, WriteBackPolicy,
};
use expiring_shortener::domain::repositories::UrlRepository;
use expiring_shortener::error::AppError;
use expiring_shortener::infrastructure::cache::CacheService;
use expiring_shortener::utils::code_generator::ALPHABET;

fn request(url: &str) -> CreateUrl {
    CreateUrl {
        original_url: url.to_string(),
        custom_code: None,
        duration_hours: None,
    }
}

fn custom(url: &str, code: &str) -> CreateUrl {
    CreateUrl {
        original_url: url.to_string(),
        custom_code: Some(code.to_string()),
        duration_hours: None,
    }
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_generates_code_from_alphabet() {
    let ctx = common::create_test_context();

    let created = ctx
        .service
        .create_url(request("https://example.com"))
        .await
        .unwrap();

    assert_eq!(created.short_code.len(), 7);
    assert!(created.short_code.bytes().all(|b| ALPHABET.contains(&b)));
    assert!(
        !ctx.repo
            .is_short_code_available(&created.short_code)
            .await
            .unwrap()
    );
    assert_eq!(
        created.short_url,
        format!("{}/{}", common::BASE_URL, created.short_code)
    );
}

#[tokio::test]
async fn test_create_applies_default_duration() {
    let ctx = common::create_test_context();
    let before = Utc::now();

    let created = ctx
        .service
        .create_url(request("https://example.com"))
        .await
        .unwrap();

    let lifetime = created.expired_at - before;
    assert!(lifetime >= Duration::hours(24));
    assert!(lifetime < Duration::hours(24) + Duration::minutes(1));
}

#[tokio::test]
async fn test_create_uses_requested_duration() {
    let ctx = common::create_test_context();
    let before = Utc::now();

    let created = ctx
        .service
        .create_url(CreateUrl {
            duration_hours: Some(3),
            ..request("https://example.com")
        })
        .await
        .unwrap();

    let lifetime = created.expired_at - before;
    assert!(lifetime >= Duration::hours(3));
    assert!(lifetime < Duration::hours(4));
}

#[tokio::test]
async fn test_create_writes_store_then_cache() {
    let ctx = common::create_test_context();

    let created = ctx
        .service
        .create_url(request("https://example.com"))
        .await
        .unwrap();

    assert_eq!(ctx.repo.len(), 1);
    let cached = ctx.cache.get(&created.short_code).await.unwrap().unwrap();
    assert_eq!(cached.original_url, "https://example.com");
    assert_eq!(cached.expired_at, created.expired_at);
    assert!(!cached.is_custom);
}

#[tokio::test]
async fn test_created_codes_are_unique() {
    let ctx = common::create_test_context();
    let mut codes = HashSet::new();

    for i in 0..200 {
        let created = ctx
            .service
            .create_url(request(&format!("https://example.com/{i}")))
            .await
            .unwrap();
        assert!(
            !ctx.repo
                .is_short_code_available(&created.short_code)
                .await
                .unwrap()
        );
        assert!(codes.insert(created.short_code));
    }

    assert_eq!(ctx.repo.len(), 200);
}

#[tokio::test]
async fn test_custom_code_is_used_verbatim() {
    let ctx = common::create_test_context();

    let created = ctx
        .service
        .create_url(custom("https://example.com", "Promo24"))
        .await
        .unwrap();

    assert_eq!(created.short_code, "Promo24");
    assert!(!ctx.repo.is_short_code_available("Promo24").await.unwrap());
    assert_eq!(created.short_url, "https://sho.rt/Promo24");
    assert_eq!(ctx.service.resolve("Promo24").await.unwrap(), "https://example.com");
}

#[tokio::test]
async fn test_custom_code_conflict() {
    let ctx = common::create_test_context();

    ctx.service
        .create_url(custom("https://first.com", "abcd"))
        .await
        .unwrap();

    let result = ctx
        .service
        .create_url(custom("https://second.com", "abcd"))
        .await;

    assert!(matches!(result, Err(AppError::CodeConflict { ref code }) if code == "abcd"));
    assert_eq!(ctx.repo.len(), 1);
    assert_eq!(ctx.service.resolve("abcd").await.unwrap(), "https://first.com");
}

#[tokio::test]
async fn test_zero_duration_is_rejected() {
    let ctx = common::create_test_context();

    let result = ctx
        .service
        .create_url(CreateUrl {
            duration_hours: Some(0),
            ..request("https://example.com")
        })
        .await;

    assert!(matches!(result, Err(AppError::Validation { .. })));
    assert!(ctx.repo.is_empty());
}

#[tokio::test]
async fn test_duration_bounds() {
    let ctx = common::create_test_context();

    let created = ctx
        .service
        .create_url(CreateUrl {
            duration_hours: Some(MAX_DURATION_HOURS),
            ..request("https://example.com")
        })
        .await
        .unwrap();
    assert!(created.expired_at > Utc::now() + Duration::hours(99));

    for hours in [MAX_DURATION_HOURS + 1, u32::MAX] {
        let result = ctx
            .service
            .create_url(CreateUrl {
                duration_hours: Some(hours),
                ..request("https://example.com")
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation { .. })), "duration {hours}");
    }

    assert_eq!(ctx.repo.len(), 1);
}

#[tokio::test]
async fn test_generated_collision_retries_with_new_code() {
    let ctx = common::create_test_context_with(
        Arc::new(common::ScriptedCodeGenerator::new(&[
            "taken01", "taken01", "fresh01",
        ])),
        WriteBackPolicy::Strict,
    );
    ctx.repo
        .seed(common::live_record("taken01", "https://other.com"));

    let created = ctx
        .service
        .create_url(request("https://example.com"))
        .await
        .unwrap();

    assert_eq!(created.short_code, "fresh01");
    assert!(!ctx.repo.is_short_code_available("fresh01").await.unwrap());
    // 3 during allocation, 1 by the assertion above
    assert_eq!(ctx.repo.availability_checks(), 4);
}

#[tokio::test]
async fn test_allocation_exhausted_after_max_attempts() {
    let ctx = common::create_test_context_with(
        Arc::new(common::ConstantCodeGenerator("taken01".to_string())),
        WriteBackPolicy::Strict,
    );
    ctx.repo
        .seed(common::live_record("taken01", "https://other.com"));

    let result = ctx.service.create_url(request("https://example.com")).await;

    assert!(matches!(
        result,
        Err(AppError::AllocationExhausted { attempts }) if attempts == MAX_ALLOCATION_ATTEMPTS
    ));
    assert_eq!(ctx.repo.availability_checks(), MAX_ALLOCATION_ATTEMPTS);
    assert_eq!(ctx.repo.len(), 1);
    assert!(ctx.cache.is_empty());
}

#[tokio::test]
async fn test_store_failure_leaves_cache_untouched() {
    let ctx = common::create_test_context();
    ctx.repo.set_failing(true);

    let result = ctx.service.create_url(request("https://example.com")).await;

    assert!(matches!(result, Err(AppError::Store(_))));
    assert!(ctx.cache.is_empty());
}

#[tokio::test]
async fn test_cache_failure_on_create_keeps_durable_record() {
    let ctx = common::create_test_context();
    ctx.cache.set_failing(true);

    let result = ctx.service.create_url(request("https://example.com")).await;

    assert!(matches!(result, Err(AppError::Cache(_))));
    assert_eq!(ctx.repo.len(), 1);
}

// ─── Resolve ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_round_trip_through_cache_and_store() {
    let ctx = common::create_test_context();

    let created = ctx
        .service
        .create_url(request("https://example.com/page"))
        .await
        .unwrap();

    // Served from cache
    assert_eq!(
        ctx.service.resolve(&created.short_code).await.unwrap(),
        "https://example.com/page"
    );

    // Served from store, then repopulated
    ctx.cache.invalidate(&created.short_code).await.unwrap();
    assert!(ctx.cache.is_empty());
    assert_eq!(
        ctx.service.resolve(&created.short_code).await.unwrap(),
        "https://example.com/page"
    );
    assert_eq!(ctx.cache.len(), 1);
}

#[tokio::test]
async fn test_resolve_unknown_code() {
    let ctx = common::create_test_context();

    let result = ctx.service.resolve("nothere").await;

    assert!(matches!(result, Err(AppError::NotFound { ref code }) if code == "nothere"));
    assert!(ctx.cache.is_empty());
}

#[tokio::test]
async fn test_resolve_expired_but_unpurged_record() {
    let ctx = common::create_test_context();
    ctx.repo.seed(common::test_record(
        "stale01",
        "https://example.com",
        Utc::now() - Duration::minutes(1),
    ));

    let result = ctx.service.resolve("stale01").await;

    assert!(matches!(result, Err(AppError::NotFound { .. })));
    assert!(ctx.cache.is_empty());
}

#[tokio::test]
async fn test_resolve_cache_failure_is_not_a_miss() {
    let ctx = common::create_test_context();
    ctx.repo
        .seed(common::live_record("cached1", "https://example.com"));
    ctx.cache.set_failing(true);

    let result = ctx.service.resolve("cached1").await;

    assert!(matches!(result, Err(AppError::Cache(_))));
}

#[tokio::test]
async fn test_resolve_store_failure() {
    let ctx = common::create_test_context();
    ctx.repo.set_failing(true);

    let result = ctx.service.resolve("anycode").await;

    assert!(matches!(result, Err(AppError::Store(_))));
}

#[tokio::test]
async fn test_cache_entry_never_outlives_record() {
    let ctx = common::create_test_context();

    let created = ctx
        .service
        .create_url(CreateUrl {
            duration_hours: Some(1),
            ..request("https://example.com")
        })
        .await
        .unwrap();
    assert_eq!(ctx.cache.len(), 1);

    ctx.cache.advance_clock(Duration::minutes(61));

    assert!(ctx.cache.get(&created.short_code).await.unwrap().is_none());
}

// ─── Cleanup ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_expiration_boundary() {
    let ctx = common::create_test_context();

    let created = ctx
        .service
        .create_url(CreateUrl {
            duration_hours: Some(1),
            ..request("https://example.com")
        })
        .await
        .unwrap();
    assert_eq!(
        ctx.service.resolve(&created.short_code).await.unwrap(),
        "https://example.com"
    );

    // Nothing is due before the expiration time
    assert_eq!(ctx.service.run_cleanup_once().await.unwrap(), 0);

    ctx.repo.advance_clock(Duration::hours(1) + Duration::seconds(1));
    ctx.cache.advance_clock(Duration::hours(1) + Duration::seconds(1));

    assert_eq!(ctx.service.run_cleanup_once().await.unwrap(), 1);
    assert!(ctx.repo.is_empty());

    let result = ctx.service.resolve(&created.short_code).await;
    assert!(matches!(result, Err(AppError::NotFound { .. })));
}

#[tokio::test]
async fn test_cleanup_is_idempotent_and_spares_live_records() {
    let ctx = common::create_test_context();
    let past = Utc::now() - Duration::hours(1);
    ctx.repo
        .seed(common::test_record("old0001", "https://a.com", past));
    ctx.repo
        .seed(common::test_record("old0002", "https://b.com", past));
    ctx.repo
        .seed(common::live_record("live001", "https://c.com"));

    assert_eq!(ctx.service.run_cleanup_once().await.unwrap(), 2);
    assert_eq!(ctx.service.run_cleanup_once().await.unwrap(), 0);

    assert_eq!(ctx.repo.len(), 1);
    assert_eq!(ctx.service.resolve("live001").await.unwrap(), "https://c.com");
}

#[tokio::test]
async fn test_cleanup_store_failure() {
    let ctx = common::create_test_context();
    ctx.repo.set_failing(true);

    let result = ctx.service.run_cleanup_once().await;

    assert!(matches!(result, Err(AppError::Store(_))));
}

// ─── Concurrency ─────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_get_distinct_codes() {
    let ctx = common::create_test_context();

    let handles: Vec<_> = (0..50)
        .map(|i| {
            let service = ctx.service.clone();
            tokio::spawn(async move {
                service
                    .create_url(request(&format!("https://example.com/{i}")))
                    .await
            })
        })
        .collect();

    let mut codes = HashSet::new();
    for handle in handles {
        let created = handle.await.unwrap().unwrap();
        assert!(codes.insert(created.short_code));
    }

    assert_eq!(ctx.repo.len(), 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_same_custom_code_has_one_winner() {
    let ctx = common::create_test_context();

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let service = ctx.service.clone();
            tokio::spawn(async move {
                service
                    .create_url(custom(&format!("https://example.com/{i}"), "race01"))
                    .await
            })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(created) => {
                assert_eq!(created.short_code, "race01");
                winners += 1;
            }
            Err(AppError::CodeConflict { code }) => assert_eq!(code, "race01"),
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(ctx.repo.len(), 1);
}

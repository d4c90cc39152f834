#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};
use expiring_shortener::application::services::{UrlService, UrlServiceSettings, WriteBackPolicy};
use expiring_shortener::domain::entities::UrlRecord;
use expiring_shortener::infrastructure::cache::MemoryCache;
use expiring_shortener::infrastructure::persistence::InMemoryUrlRepository;
use expiring_shortener::state::AppState;
use expiring_shortener::utils::code_generator::{CodeGenerator, RandomCodeGenerator};

pub const BASE_URL: &str = "https://sho.rt";

/// Service wired over in-memory fakes, with handles to both so tests can
/// inspect them or move their clocks.
pub struct TestContext {
    pub repo: Arc<InMemoryUrlRepository>,
    pub cache: Arc<MemoryCache>,
    pub service: Arc<UrlService>,
    pub state: AppState,
}

pub fn create_test_context() -> TestContext {
    create_test_context_with(
        Arc::new(RandomCodeGenerator::with_seed(7, 42)),
        WriteBackPolicy::Strict,
    )
}

pub fn create_test_context_with(
    generator: Arc<dyn CodeGenerator>,
    write_back_policy: WriteBackPolicy,
) -> TestContext {
    let repo = Arc::new(InMemoryUrlRepository::new());
    let cache = Arc::new(MemoryCache::default());

    let service = Arc::new(UrlService::new(
        repo.clone(),
        cache.clone(),
        generator,
        UrlServiceSettings {
            base_url: BASE_URL.to_string(),
            default_duration_hours: 24,
            write_back_policy,
        },
    ));

    let state = AppState::new(service.clone(), repo.clone(), cache.clone());

    TestContext {
        repo,
        cache,
        service,
        state,
    }
}

/// Record for [`InMemoryUrlRepository::seed`].
pub fn test_record(code: &str, url: &str, expired_at: DateTime<Utc>) -> UrlRecord {
    UrlRecord::new(
        0,
        code.to_string(),
        url.to_string(),
        false,
        Utc::now(),
        expired_at,
    )
}

pub fn live_record(code: &str, url: &str) -> UrlRecord {
    test_record(code, url, Utc::now() + Duration::hours(1))
}

/// Generator that returns the same code on every call.
pub struct ConstantCodeGenerator(pub String);

impl CodeGenerator for ConstantCodeGenerator {
    fn generate(&self) -> String {
        self.0.clone()
    }
}

/// Generator that replays a fixed list of codes, then repeats the last one.
pub struct ScriptedCodeGenerator {
    codes: Mutex<Vec<String>>,
}

impl ScriptedCodeGenerator {
    pub fn new(codes: &[&str]) -> Self {
        let mut codes: Vec<String> = codes.iter().map(|c| c.to_string()).collect();
        codes.reverse();
        Self {
            codes: Mutex::new(codes),
        }
    }
}

impl CodeGenerator for ScriptedCodeGenerator {
    fn generate(&self) -> String {
        let mut codes = self.codes.lock().unwrap();
        if codes.len() > 1 {
            codes.pop().unwrap()
        } else {
            codes.last().cloned().unwrap()
        }
    }
}

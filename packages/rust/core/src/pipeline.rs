//! End-to-end pipeline: seeds → frontier → URL store → bulk fetch →
//! cleaning → guide store → in-memory knowledge base.
//!
//! Each stage is sequential and best-effort: per-page failures are
//! logged and skipped, and only the final store write can fail an
//! operation.

use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use repairkb_cleaning::{clean_lines, strip_ui_blocks};
use repairkb_crawler::{CrawlOutcome, Crawler, Fetcher, Pacer, extract_page};
use repairkb_shared::{AppConfig, CleanDocument, CrawlPolicy, Result, StructuredDocument};
use repairkb_storage::{GuideStore, UrlStore};

use crate::parser::structure_document;

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for long-running pipeline stages.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before each page fetch during ingest.
    fn page_fetched(&self, url: &str, current: usize, total: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn page_fetched(&self, _url: &str, _current: usize, _total: usize) {}
}

// ---------------------------------------------------------------------------
// Discovery (frontier → URL store)
// ---------------------------------------------------------------------------

/// Result of a frontier run plus the URL-store merge.
#[derive(Debug)]
pub struct DiscoverResult {
    /// The frontier run summary.
    pub outcome: CrawlOutcome,
    /// URLs newly appended to the store (absent from prior runs).
    pub new_urls: usize,
}

/// Run the frontier over every configured seed, then merge the saved set
/// into the URL store, appending only genuinely new URLs.
#[instrument(skip_all)]
pub async fn discover(
    config: &AppConfig,
    progress: &dyn ProgressReporter,
) -> Result<DiscoverResult> {
    progress.phase("Crawling seed paths");

    let policy = CrawlPolicy::from(config);
    let crawler = Crawler::new(policy, &config.fetch.crawl_config())?;
    let outcome = crawler.run().await;

    progress.phase("Merging discovered URLs");
    let store = UrlStore::new(config.storage.url_path());
    let new_urls = store.append_new(&outcome.saved)?;

    info!(
        saved = outcome.saved.len(),
        new_urls, "discovery merged into URL store"
    );

    Ok(DiscoverResult { outcome, new_urls })
}

// ---------------------------------------------------------------------------
// Ingest (URL store → guide store)
// ---------------------------------------------------------------------------

/// Window of the URL store to ingest, merged from config and CLI flags.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Index of the first URL to fetch.
    pub start: usize,
    /// Maximum number of URLs to fetch.
    pub limit: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            start: 0,
            limit: 50,
        }
    }
}

/// Summary of one ingest run.
#[derive(Debug)]
pub struct IngestResult {
    /// URLs attempted in this window.
    pub attempted: usize,
    /// Pages that survived cleaning and length checks.
    pub ingested: usize,
    /// Pages dropped for being too short after cleaning.
    pub skipped_short: usize,
    /// Fetch failures (URL, error message).
    pub errors: Vec<(String, String)>,
    /// Documents actually new to the guide store.
    pub stored_new: usize,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

/// Fetch a window of stored URLs, clean each page through both filter
/// passes, and merge the survivors into the guide store.
#[instrument(skip_all, fields(start = opts.start, limit = opts.limit))]
pub async fn ingest(
    config: &AppConfig,
    opts: &IngestOptions,
    progress: &dyn ProgressReporter,
) -> Result<IngestResult> {
    let started = Instant::now();

    progress.phase("Loading URL store");
    let url_store = UrlStore::new(config.storage.url_path());
    let urls = url_store.load();

    let window: Vec<String> = urls
        .into_iter()
        .skip(opts.start)
        .take(opts.limit)
        .collect();

    if window.is_empty() {
        warn!("URL store window is empty; run a crawl first");
        return Ok(IngestResult {
            attempted: 0,
            ingested: 0,
            skipped_short: 0,
            errors: Vec::new(),
            stored_new: 0,
            elapsed: started.elapsed(),
        });
    }

    info!(count = window.len(), start = opts.start, "starting ingest");
    progress.phase("Fetching guide pages");

    let fetcher = Fetcher::new(&config.fetch.content_config())?;
    let mut pacer = Pacer::new(
        config.crawl.request_delay_ms,
        config.crawl.long_rest_every,
        config.crawl.long_rest_ms,
    );

    let total = window.len();
    let mut documents = Vec::new();
    let mut errors = Vec::new();
    let mut skipped_short = 0;

    for (i, url) in window.iter().enumerate() {
        progress.page_fetched(url, i + 1, total);

        let fetch_result = fetcher.fetch(url).await;
        pacer.pause().await;

        let body = match fetch_result {
            Ok(body) => body,
            Err(e) => {
                warn!(%url, error = %e, "fetch failed, skipping page");
                errors.push((url.clone(), e.to_string()));
                continue;
            }
        };

        match clean_page(url, &body, config) {
            Some(doc) => {
                debug!(%url, title = %doc.title, chars = doc.content.chars().count(), "page cleaned");
                documents.push(doc);
            }
            None => {
                debug!(%url, "content too short after cleaning, skipping");
                skipped_short += 1;
            }
        }
    }

    progress.phase("Merging into guide store");
    let ingested = documents.len();
    let store = GuideStore::new(config.storage.guide_path());
    let stored_new = store.merge_and_save(documents)?;

    let result = IngestResult {
        attempted: total,
        ingested,
        skipped_short,
        errors,
        stored_new,
        elapsed: started.elapsed(),
    };

    info!(
        attempted = result.attempted,
        ingested = result.ingested,
        skipped_short = result.skipped_short,
        errors = result.errors.len(),
        stored_new = result.stored_new,
        "ingest complete"
    );

    Ok(result)
}

/// Extract, clean, and length-check one fetched page. Returns `None`
/// when the page is too short to keep at either threshold.
fn clean_page(url: &str, body: &str, config: &AppConfig) -> Option<CleanDocument> {
    let page = extract_page(body);

    let cleaned = clean_lines(&page.lines).join("\n");
    if cleaned.chars().count() < config.cleaning.min_content_len {
        return None;
    }

    // Second, narrower pass over the assembled content.
    let content = strip_ui_blocks(&cleaned);
    if content.chars().count() <= config.cleaning.min_final_len {
        return None;
    }

    Some(CleanDocument {
        url: url.to_string(),
        title: page.title,
        content,
    })
}

// ---------------------------------------------------------------------------
// Knowledge base loading
// ---------------------------------------------------------------------------

/// Load the guide store and structure every document long enough to be
/// worth parsing. A missing or damaged store yields an empty knowledge
/// base (the stores already warn), never an error.
pub fn load_knowledge_base(config: &AppConfig) -> Vec<StructuredDocument> {
    let store = GuideStore::new(config.storage.guide_path());
    let raw = store.load();
    let total = raw.len();

    let knowledge_base: Vec<StructuredDocument> = raw
        .iter()
        .filter(|doc| doc.content.trim().chars().count() > config.cleaning.min_structure_len)
        .map(structure_document)
        .collect();

    info!(
        documents = knowledge_base.len(),
        skipped = total - knowledge_base.len(),
        "knowledge base loaded"
    );

    knowledge_base
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn scratch_config(tag: &str) -> AppConfig {
        let dir = std::env::temp_dir().join(format!(
            "repairkb-pipeline-{tag}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).expect("create scratch dir");

        let mut config = AppConfig::default();
        config.storage.data_dir = dir.to_string_lossy().to_string();
        config.crawl.request_delay_ms = 0;
        config.crawl.long_rest_ms = 0;
        config
    }

    fn cleanup(config: &AppConfig) {
        let _ = std::fs::remove_dir_all(PathBuf::from(&config.storage.data_dir));
    }

    fn guide_page_html() -> String {
        let body = "本指南介绍如何为这款手机更换电池，包含完整的拆解顺序和组装提示，适合具备基础动手能力的读者。"
            .repeat(4);
        format!(
            "<html><body><article>\
             <h1 class=\"pagetitle\">电池更换指南</h1>\
             <p>{body}</p>\
             <p>步骤 1: 关闭电源并用热风枪加热后盖边缘使胶软化。</p>\
             <p>步骤 2: 用吸盘和撬棒分离后盖，断开电池排线。</p>\
             <p>编辑</p>\
             </article></body></html>"
        )
    }

    #[tokio::test]
    async fn discover_then_ingest_builds_guide_store() {
        let server = MockServer::start().await;
        let mut config = scratch_config("e2e");
        config.crawl.base_domain = server.uri();
        config.crawl.seeds = vec!["/Device/X".into()];

        let device_x = r#"<html><body>
            <a href="/Guide/999">guide</a>
            <a href="/Device/Y">device</a>
        </body></html>"#;
        let device_y = "<html><body><p>leaf</p></body></html>";

        Mock::given(method("GET"))
            .and(path("/Device/X"))
            .respond_with(ResponseTemplate::new(200).set_body_string(device_x))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/Device/Y"))
            .respond_with(ResponseTemplate::new(200).set_body_string(device_y))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/Guide/999"))
            .respond_with(ResponseTemplate::new(200).set_body_string(guide_page_html()))
            .mount(&server)
            .await;

        // Discovery fills the URL store.
        let discovered = discover(&config, &SilentProgress).await.unwrap();
        assert_eq!(discovered.new_urls, 1);
        assert_eq!(
            discovered.outcome.saved,
            vec![format!("{}/Guide/999?lang=zh", server.uri())]
        );

        // Re-running discovery appends nothing new.
        let rerun = discover(&config, &SilentProgress).await.unwrap();
        assert_eq!(rerun.new_urls, 0);

        // Ingest fetches the saved guide and persists the cleaned page.
        let ingested = ingest(&config, &IngestOptions::default(), &SilentProgress)
            .await
            .unwrap();
        assert_eq!(ingested.attempted, 1);
        assert_eq!(ingested.ingested, 1);
        assert_eq!(ingested.stored_new, 1);
        assert!(ingested.errors.is_empty());

        // A second ingest of the same window adds nothing (merge dedup).
        let again = ingest(&config, &IngestOptions::default(), &SilentProgress)
            .await
            .unwrap();
        assert_eq!(again.stored_new, 0);

        // The loaded knowledge base is structured and queryable.
        let kb = load_knowledge_base(&config);
        assert_eq!(kb.len(), 1);
        assert_eq!(kb[0].title, "电池更换指南");
        assert_eq!(kb[0].steps.len(), 2);
        assert!(kb[0].parts.contains(&"电池".to_string()));
        // The chrome line never reaches the store.
        assert!(!kb[0].raw_content.contains("编辑"));

        cleanup(&config);
    }

    #[tokio::test]
    async fn ingest_skips_short_pages_and_fetch_failures() {
        let server = MockServer::start().await;
        let mut config = scratch_config("skips");
        config.crawl.base_domain = server.uri();

        // Seed the URL store directly.
        let url_store = UrlStore::new(config.storage.url_path());
        url_store
            .append_new(&[
                format!("{}/Guide/1?lang=zh", server.uri()),
                format!("{}/Guide/2?lang=zh", server.uri()),
                format!("{}/Guide/3?lang=zh", server.uri()),
            ])
            .unwrap();

        Mock::given(method("GET"))
            .and(path("/Guide/1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body><p>太短</p></body></html>"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/Guide/2"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/Guide/3"))
            .respond_with(ResponseTemplate::new(200).set_body_string(guide_page_html()))
            .mount(&server)
            .await;

        let result = ingest(&config, &IngestOptions::default(), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(result.attempted, 3);
        assert_eq!(result.ingested, 1);
        assert_eq!(result.skipped_short, 1);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].0.contains("/Guide/2"));
        assert_eq!(result.stored_new, 1);

        cleanup(&config);
    }

    #[tokio::test]
    async fn ingest_window_respects_start_and_limit() {
        let server = MockServer::start().await;
        let mut config = scratch_config("window");
        config.crawl.base_domain = server.uri();

        let url_store = UrlStore::new(config.storage.url_path());
        let urls: Vec<String> = (1..=4)
            .map(|i| format!("{}/Guide/{i}?lang=zh", server.uri()))
            .collect();
        url_store.append_new(&urls).unwrap();

        // Only the windowed pages are mocked; fetching any other URL
        // would register as an error.
        for i in 2..=3 {
            Mock::given(method("GET"))
                .and(path(format!("/Guide/{i}")))
                .respond_with(ResponseTemplate::new(200).set_body_string(guide_page_html()))
                .expect(1)
                .mount(&server)
                .await;
        }

        let opts = IngestOptions { start: 1, limit: 2 };
        let result = ingest(&config, &opts, &SilentProgress).await.unwrap();

        assert_eq!(result.attempted, 2);
        assert!(result.errors.is_empty());

        cleanup(&config);
    }

    #[test]
    fn load_knowledge_base_tolerates_missing_store() {
        let config = scratch_config("missing-kb");
        let kb = load_knowledge_base(&config);
        assert!(kb.is_empty());
        cleanup(&config);
    }

    #[test]
    fn load_knowledge_base_skips_short_documents() {
        let config = scratch_config("short-kb");
        let store = GuideStore::new(config.storage.guide_path());
        store
            .merge_and_save(vec![
                CleanDocument {
                    url: "https://a.example/Guide/1".into(),
                    title: "too short".into(),
                    content: "一句话".into(),
                },
                CleanDocument {
                    url: "https://a.example/Guide/2".into(),
                    title: "long enough".into(),
                    content: "步骤 1: 这是一段足够长的维修说明，覆盖了电池更换的完整流程，\
                              包括断开排线、取出旧电池以及安装新电池后的测试。"
                        .into(),
                },
            ])
            .unwrap();

        let kb = load_knowledge_base(&config);
        assert_eq!(kb.len(), 1);
        assert_eq!(kb[0].title, "long enough");
        cleanup(&config);
    }
}

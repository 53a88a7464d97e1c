//! Depth-first site frontier over a prefix allow-list.
//!
//! The crawler walks the link graph reachable from the configured seed
//! paths, classifying every discovered link as savable, crawlable, or
//! ignored. Savable links are collected (not recursed); crawlable links
//! are fetched and scanned for more links. Traversal uses an explicit
//! work-list stack and an instance-owned visited set: construct, run
//! once, read the outcome.

use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use repairkb_shared::{CrawlPolicy, FetchConfig, Result};

use crate::fetch::{Fetcher, Pacer};

/// Savable pages end in a numeric page identifier.
static PAGE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\d+$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Link classification
// ---------------------------------------------------------------------------

/// What the frontier does with a discovered link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkClass {
    /// Content-bearing page: normalized and collected, not recursed.
    Savable,
    /// Worth fetching and scanning for further links, not storing.
    Crawlable,
    /// Off-site, excluded, or outside the prefix allow-list.
    Ignored,
}

/// Applies the policy's prefix allow-lists and exclusion keywords to
/// candidate hrefs.
pub struct LinkClassifier {
    base_domain: String,
    lang: String,
    crawl_prefixes: Vec<String>,
    save_prefixes: Vec<String>,
    excluded_keywords: Vec<String>,
}

impl LinkClassifier {
    /// Build a classifier from the crawl policy.
    pub fn new(policy: &CrawlPolicy) -> Self {
        Self {
            base_domain: policy.base_domain.clone(),
            lang: policy.lang.clone(),
            crawl_prefixes: policy.crawl_prefixes.clone(),
            save_prefixes: policy.save_prefixes.clone(),
            excluded_keywords: policy.excluded_keywords.clone(),
        }
    }

    /// True when the href contains any exclusion keyword.
    pub fn is_excluded(&self, href: &str) -> bool {
        self.excluded_keywords
            .iter()
            .any(|kw| href.contains(kw.as_str()))
    }

    fn is_crawlable(&self, href: &str) -> bool {
        href.starts_with('/')
            && self
                .crawl_prefixes
                .iter()
                .any(|prefix| href.starts_with(prefix.as_str()))
            && !self.is_excluded(href)
    }

    fn is_savable(&self, href: &str) -> bool {
        self.save_prefixes
            .iter()
            .any(|prefix| href.starts_with(prefix.as_str()))
            && !self.is_excluded(href)
            && PAGE_ID_RE.is_match(href)
    }

    /// Classify one candidate href.
    pub fn classify(&self, href: &str) -> LinkClass {
        if !self.is_crawlable(href) {
            return LinkClass::Ignored;
        }
        if self.is_savable(href) {
            LinkClass::Savable
        } else {
            LinkClass::Crawlable
        }
    }

    /// Absolute URL for a savable href, with the language parameter
    /// appended when none is present.
    pub fn normalize_save_url(&self, href: &str) -> String {
        let mut url = format!("{}{}", self.base_domain, href);
        if !url.contains("lang=") {
            url.push_str(&format!("?lang={}", self.lang));
        }
        url
    }
}

// ---------------------------------------------------------------------------
// Crawler
// ---------------------------------------------------------------------------

/// Summary of one completed frontier run.
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Deduplicated, normalized savable URLs, sorted.
    pub saved: Vec<String>,
    /// Every URL fetched (or attempted) during the run, sorted.
    pub visited: Vec<String>,
    /// Fetch failures encountered (URL, error message). Failures never
    /// abort the run.
    pub errors: Vec<(String, String)>,
}

/// Sequential depth-first crawler. One instance owns the visited and
/// saved sets for exactly one run.
pub struct Crawler {
    policy: CrawlPolicy,
    classifier: LinkClassifier,
    fetcher: Fetcher,
    pacer: Pacer,
    visited: HashSet<String>,
    saved: BTreeSet<String>,
}

impl Crawler {
    /// Create a crawler for one run.
    pub fn new(policy: CrawlPolicy, fetch: &FetchConfig) -> Result<Self> {
        let classifier = LinkClassifier::new(&policy);
        let fetcher = Fetcher::new(fetch)?;
        let pacer = Pacer::new(
            policy.request_delay_ms,
            policy.long_rest_every,
            policy.long_rest_ms,
        );

        Ok(Self {
            policy,
            classifier,
            fetcher,
            pacer,
            visited: HashSet::new(),
            saved: BTreeSet::new(),
        })
    }

    /// Traverse the link graph from every seed and return the outcome.
    pub async fn run(mut self) -> CrawlOutcome {
        let seeds = self.policy.seeds.clone();
        info!(
            base = %self.policy.base_domain,
            seeds = seeds.len(),
            "starting frontier crawl"
        );

        let mut errors = Vec::new();
        for seed in &seeds {
            self.crawl_from(seed, &mut errors).await;
        }

        let mut visited: Vec<String> = self.visited.into_iter().collect();
        visited.sort();
        let saved: Vec<String> = self.saved.into_iter().collect();

        info!(
            saved = saved.len(),
            visited = visited.len(),
            errors = errors.len(),
            "frontier crawl complete"
        );

        CrawlOutcome {
            saved,
            visited,
            errors,
        }
    }

    /// Depth-first traversal from one seed path over an explicit stack.
    /// Links are pushed in reverse so pop order matches the order they
    /// appear on each page.
    async fn crawl_from(&mut self, seed: &str, errors: &mut Vec<(String, String)>) {
        let mut stack: Vec<String> = vec![seed.to_string()];

        while let Some(path) = stack.pop() {
            if self.classifier.is_excluded(&path) {
                debug!(%path, "excluded path, skipping");
                continue;
            }

            let url = format!("{}{}", self.policy.base_domain, path);
            if !self.visited.insert(url.clone()) {
                continue;
            }

            debug!(%url, frontier = stack.len(), "visiting");
            let fetch_result = self.fetcher.fetch(&url).await;
            self.pacer.pause().await;

            let body = match fetch_result {
                Ok(body) => body,
                Err(e) => {
                    warn!(%url, error = %e, "fetch failed, continuing crawl");
                    errors.push((url, e.to_string()));
                    continue;
                }
            };

            let mut discovered = Vec::new();
            for href in extract_hrefs(&body) {
                match self.classifier.classify(&href) {
                    LinkClass::Savable => {
                        self.saved.insert(self.classifier.normalize_save_url(&href));
                    }
                    LinkClass::Crawlable => discovered.push(href),
                    LinkClass::Ignored => {}
                }
            }

            for href in discovered.into_iter().rev() {
                stack.push(href);
            }
        }
    }
}

/// Candidate hrefs from a page, fragment stripped and trimmed.
fn extract_hrefs(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let link_sel = Selector::parse("a[href]").expect("valid selector");

    doc.select(&link_sel)
        .filter_map(|el| el.value().attr("href"))
        .map(|href| {
            href.split('#')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string()
        })
        .collect()
}

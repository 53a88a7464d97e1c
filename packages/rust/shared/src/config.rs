//! Application configuration for repairkb.
//!
//! User config lives at `~/.repairkb/repairkb.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RepairKbError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "repairkb.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".repairkb";

// ---------------------------------------------------------------------------
// Config structs (matching repairkb.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Crawl frontier settings.
    #[serde(default)]
    pub crawl: CrawlSection,

    /// HTTP fetch settings.
    #[serde(default)]
    pub fetch: FetchSection,

    /// Content cleaning thresholds.
    #[serde(default)]
    pub cleaning: CleaningSection,

    /// Retrieval settings.
    #[serde(default)]
    pub retrieval: RetrievalSection,

    /// Store locations.
    #[serde(default)]
    pub storage: StorageSection,
}

/// `[crawl]` section: seeds, allow-lists, and request pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSection {
    /// Base domain all site-relative links resolve against.
    #[serde(default = "default_base_domain")]
    pub base_domain: String,

    /// Path-prefix seeds the traversal starts from.
    #[serde(default = "default_seeds")]
    pub seeds: Vec<String>,

    /// Prefixes a link must carry to be fetched and scanned for more links.
    #[serde(default = "default_crawl_prefixes")]
    pub crawl_prefixes: Vec<String>,

    /// Narrower prefixes a link must carry to be saved as content-bearing.
    #[serde(default = "default_save_prefixes")]
    pub save_prefixes: Vec<String>,

    /// Substrings that disqualify a link from both crawling and saving.
    #[serde(default = "default_excluded_keywords")]
    pub excluded_keywords: Vec<String>,

    /// Language code appended to saved URLs lacking a `lang=` parameter.
    #[serde(default = "default_lang")]
    pub lang: String,

    /// Delay between ordinary requests, in milliseconds.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Take the longer rest after every Nth request (0 disables).
    #[serde(default = "default_long_rest_every")]
    pub long_rest_every: u32,

    /// The longer rest, in milliseconds.
    #[serde(default = "default_long_rest_ms")]
    pub long_rest_ms: u64,
}

impl Default for CrawlSection {
    fn default() -> Self {
        Self {
            base_domain: default_base_domain(),
            seeds: default_seeds(),
            crawl_prefixes: default_crawl_prefixes(),
            save_prefixes: default_save_prefixes(),
            excluded_keywords: default_excluded_keywords(),
            lang: default_lang(),
            request_delay_ms: default_request_delay_ms(),
            long_rest_every: default_long_rest_every(),
            long_rest_ms: default_long_rest_ms(),
        }
    }
}

fn default_base_domain() -> String {
    "https://zh.ifixit.com".into()
}
fn default_seeds() -> Vec<String> {
    vec!["/Device/Huawei_P".into()]
}
fn default_crawl_prefixes() -> Vec<String> {
    vec!["/Device/".into(), "/Guide/".into(), "/Wiki/".into()]
}
fn default_save_prefixes() -> Vec<String> {
    vec!["/Guide/".into(), "/Wiki/".into()]
}
fn default_excluded_keywords() -> Vec<String> {
    vec![
        "/edit/".into(),
        "/translate/".into(),
        "/history/".into(),
        "/Edit/".into(),
        "/Translate/".into(),
        "/History/".into(),
    ]
}
fn default_lang() -> String {
    "zh".into()
}
fn default_request_delay_ms() -> u64 {
    500
}
fn default_long_rest_every() -> u32 {
    5
}
fn default_long_rest_ms() -> u64 {
    2000
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSection {
    /// Per-request timeout during frontier traversal, in seconds.
    #[serde(default = "default_crawl_timeout_secs")]
    pub crawl_timeout_secs: u64,

    /// Per-request timeout during bulk content fetching, in seconds.
    #[serde(default = "default_content_timeout_secs")]
    pub content_timeout_secs: u64,

    /// Skip TLS certificate validation. The target mirror serves a
    /// misconfigured chain, so this defaults to on.
    #[serde(default = "default_true")]
    pub accept_invalid_certs: bool,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            crawl_timeout_secs: default_crawl_timeout_secs(),
            content_timeout_secs: default_content_timeout_secs(),
            accept_invalid_certs: default_true(),
        }
    }
}

impl FetchSection {
    /// Fetch settings for frontier traversal requests.
    pub fn crawl_config(&self) -> FetchConfig {
        FetchConfig {
            timeout_secs: self.crawl_timeout_secs,
            accept_invalid_certs: self.accept_invalid_certs,
        }
    }

    /// Fetch settings for bulk content requests.
    pub fn content_config(&self) -> FetchConfig {
        FetchConfig {
            timeout_secs: self.content_timeout_secs,
            accept_invalid_certs: self.accept_invalid_certs,
        }
    }
}

fn default_crawl_timeout_secs() -> u64 {
    10
}
fn default_content_timeout_secs() -> u64 {
    15
}
fn default_true() -> bool {
    true
}

/// `[cleaning]` section: minimum content lengths, in characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningSection {
    /// Pages whose cleaned text is shorter than this are dropped outright.
    #[serde(default = "default_min_content_len")]
    pub min_content_len: usize,

    /// Pages shorter than this after the UI-block pass are not persisted.
    #[serde(default = "default_min_final_len")]
    pub min_final_len: usize,

    /// Stored documents shorter than this are not structured at load time.
    #[serde(default = "default_min_structure_len")]
    pub min_structure_len: usize,
}

impl Default for CleaningSection {
    fn default() -> Self {
        Self {
            min_content_len: default_min_content_len(),
            min_final_len: default_min_final_len(),
            min_structure_len: default_min_structure_len(),
        }
    }
}

fn default_min_content_len() -> usize {
    100
}
fn default_min_final_len() -> usize {
    200
}
fn default_min_structure_len() -> usize {
    50
}

/// `[retrieval]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalSection {
    /// Number of ranked documents returned per query.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalSection {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    3
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSection {
    /// Directory holding both stores. Relative paths resolve against the
    /// working directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Newline-delimited saved-URL file inside `data_dir`.
    #[serde(default = "default_url_file")]
    pub url_file: String,

    /// JSON guide store inside `data_dir`.
    #[serde(default = "default_guide_file")]
    pub guide_file: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            url_file: default_url_file(),
            guide_file: default_guide_file(),
        }
    }
}

impl StorageSection {
    /// Full path to the URL store.
    pub fn url_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.url_file)
    }

    /// Full path to the guide store.
    pub fn guide_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.guide_file)
    }
}

fn default_data_dir() -> String {
    "data".into()
}
fn default_url_file() -> String {
    "urls.txt".into()
}
fn default_guide_file() -> String {
    "guides.json".into()
}

// ---------------------------------------------------------------------------
// Runtime crawl policy (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime crawl policy. One frontier run is parameterized entirely by
/// this value, so site variants differ only in configuration.
#[derive(Debug, Clone)]
pub struct CrawlPolicy {
    /// Base domain all site-relative links resolve against.
    pub base_domain: String,
    /// Path-prefix seeds the traversal starts from.
    pub seeds: Vec<String>,
    /// Prefix allow-list for links worth fetching.
    pub crawl_prefixes: Vec<String>,
    /// Prefix allow-list for links worth saving.
    pub save_prefixes: Vec<String>,
    /// Substrings that disqualify a link entirely.
    pub excluded_keywords: Vec<String>,
    /// Language code appended to saved URLs without one.
    pub lang: String,
    /// Delay between ordinary requests, in milliseconds.
    pub request_delay_ms: u64,
    /// Take the longer rest after every Nth request (0 disables).
    pub long_rest_every: u32,
    /// The longer rest, in milliseconds.
    pub long_rest_ms: u64,
}

impl From<&AppConfig> for CrawlPolicy {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_domain: config.crawl.base_domain.clone(),
            seeds: config.crawl.seeds.clone(),
            crawl_prefixes: config.crawl.crawl_prefixes.clone(),
            save_prefixes: config.crawl.save_prefixes.clone(),
            excluded_keywords: config.crawl.excluded_keywords.clone(),
            lang: config.crawl.lang.clone(),
            request_delay_ms: config.crawl.request_delay_ms,
            long_rest_every: config.crawl.long_rest_every,
            long_rest_ms: config.crawl.long_rest_ms,
        }
    }
}

/// Runtime fetch settings for one `Fetcher`.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-request timeout, in seconds.
    pub timeout_secs: u64,
    /// Skip TLS certificate validation.
    pub accept_invalid_certs: bool,
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.repairkb/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| RepairKbError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.repairkb/repairkb.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| RepairKbError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| RepairKbError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| RepairKbError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| RepairKbError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| RepairKbError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

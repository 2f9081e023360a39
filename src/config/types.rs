use serde::Deserialize;

/// Main configuration structure for komitana
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub harvest: HarvestConfig,
    pub http: HttpConfig,
    pub source: SourceConfig,
    pub remote: RemoteConfig,
    pub output: OutputConfig,
}

/// Which frontier strategy a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HarvestMode {
    /// Continue from the checkpoint over a contiguous index range
    Batch,
    /// Scan the catalog for comics with more chapters than we have stored
    Rescan,
}

/// Harvest behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    /// Frontier mode for this run
    pub mode: HarvestMode,

    /// Number of comics processed per run in batch mode
    #[serde(rename = "batch-size")]
    pub batch_size: usize,

    /// Maximum number of comics examined per run in rescan mode
    #[serde(rename = "max-scan")]
    pub max_scan: usize,

    /// Maximum number of comics processed concurrently
    #[serde(rename = "comic-workers")]
    pub comic_workers: usize,

    /// Maximum number of chapters fetched concurrently within one comic
    #[serde(rename = "chapter-workers")]
    pub chapter_workers: usize,

    /// Courtesy delay after each comic completes (milliseconds)
    #[serde(rename = "comic-delay-ms")]
    pub comic_delay_ms: u64,

    /// Courtesy delay after each chapter fetch (milliseconds)
    #[serde(rename = "chapter-delay-ms")]
    pub chapter_delay_ms: u64,
}

/// HTTP client and retry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Maximum attempts for every network operation
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Lower bound of the randomized rate-limit backoff (milliseconds)
    #[serde(rename = "backoff-min-ms")]
    pub backoff_min_ms: u64,

    /// Upper bound of the randomized rate-limit backoff (milliseconds)
    #[serde(rename = "backoff-max-ms")]
    pub backoff_max_ms: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

/// Source site selection and listing pagination
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Which site extractor to use ("komikindo" or "komikcast")
    pub site: String,

    /// Listing URL pattern with a `{page}` placeholder, used by the
    /// catalog builder
    #[serde(rename = "listing-url")]
    pub listing_url: String,

    /// Page limit for the catalog builder (0 = walk until empty)
    #[serde(rename = "max-listing-pages")]
    pub max_listing_pages: usize,
}

/// Remote object store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Whether uploads go to the remote store; when false, documents are
    /// written under `output.store-dir` instead
    pub enabled: bool,

    /// Project endpoint, e.g. "https://xyz.supabase.co"
    #[serde(default)]
    pub endpoint: String,

    /// Storage bucket name
    #[serde(default)]
    pub bucket: String,

    /// API key; may be left empty and supplied via KOMITANA_API_KEY
    #[serde(default, rename = "api-key")]
    pub api_key: String,
}

/// Local file paths
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Seed catalog JSON (the crawl seed list)
    #[serde(rename = "catalog-path")]
    pub catalog_path: String,

    /// Accumulated run results JSON, rewritten after every completed comic
    #[serde(rename = "results-path")]
    pub results_path: String,

    /// Checkpoint file recording resumable progress
    #[serde(rename = "checkpoint-path")]
    pub checkpoint_path: String,

    /// Root directory of the local store used when remote upload is disabled
    #[serde(rename = "store-dir")]
    pub store_dir: String,
}

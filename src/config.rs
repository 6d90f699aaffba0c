//! YAML configuration for a pipeline run.
//!
//! The only required key is `feeds`. Everything else has a default, so a
//! minimal file looks like:
//!
//! ```yaml
//! feeds:
//!   - https://feeds.npr.org/1001/rss.xml
//!   - https://www.theguardian.com/world/rss
//! ```
//!
//! Optional sections tune fetching, toggle outputs, and declare wordcloud
//! styles:
//!
//! ```yaml
//! fetch:
//!   timeout_secs: 15
//!   concurrency: 4
//! output:
//!   csv: true
//!   report: true
//! wordclouds:
//!   - name: us_flag_wordcloud
//!     mask: Flag.jpg
//!     recolor_from_mask: true
//! ```

use crate::error::ConfigError;
use crate::outputs::wordcloud::{MAX_MASK_SIDE, colors};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Default path of the configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "feeds.yaml";

/// A fully loaded and validated configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Ordered list of feed URLs. `None` only before validation.
    #[serde(default)]
    feeds: Option<Vec<String>>,

    #[serde(default)]
    pub fetch: FetchSettings,

    #[serde(default)]
    pub output: OutputSettings,

    #[serde(default = "default_wordclouds")]
    pub wordclouds: Vec<WordcloudStyle>,
}

/// Network settings shared by the feed reader and the article fetcher.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum number of articles downloaded at once. `1` is strictly sequential.
    pub concurrency: usize,
    pub user_agent: String,
    /// Proxy URL applied to every request, e.g. `http://127.0.0.1:3128`.
    pub proxy: Option<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            concurrency: 4,
            user_agent: format!(
                "news_wordcloud/{} (+rust; {})",
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS
            ),
            proxy: None,
        }
    }
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Which archival outputs to write.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputSettings {
    pub csv: bool,
    pub report: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            csv: true,
            report: true,
        }
    }
}

/// Image format of a rendered wordcloud.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Svg,
    Png,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Svg => "svg",
            ImageFormat::Png => "png",
        }
    }
}

/// One wordcloud to render per run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WordcloudStyle {
    /// File name prefix; the date stamp and extension are appended.
    pub name: String,
    /// Image whose non-white pixels define where words may be placed.
    pub mask: Option<PathBuf>,
    /// Take word colors from the mask image instead of the colormap.
    pub recolor_from_mask: bool,
    pub colormap: Option<String>,
    /// A color name, `#rrggbb`, or `transparent`.
    pub background: String,
    /// Seed for the layout and color choices. Random when unset.
    pub random_state: Option<u64>,
    /// Canvas size. Ignored when a mask is set.
    pub width: u32,
    pub height: u32,
    pub max_words: usize,
    pub min_font_size: u32,
    pub max_font_size: Option<u32>,
    pub relative_scaling: f32,
    /// Fraction of words laid out horizontally.
    pub prefer_horizontal: f32,
    pub margin: u32,
    /// Use the built-in English stopword list.
    pub default_stopwords: bool,
    /// Extra words to leave out of this wordcloud.
    pub stopwords: Vec<String>,
    pub format: ImageFormat,
    /// TrueType/OpenType font, required for PNG output.
    pub font: Option<PathBuf>,
}

impl Default for WordcloudStyle {
    fn default() -> Self {
        Self {
            name: "original_wordcloud".to_string(),
            mask: None,
            recolor_from_mask: false,
            colormap: None,
            background: "white".to_string(),
            random_state: None,
            width: 800,
            height: 400,
            max_words: 200,
            min_font_size: 4,
            max_font_size: None,
            relative_scaling: 0.5,
            prefer_horizontal: 0.9,
            margin: 2,
            default_stopwords: true,
            stopwords: Vec::new(),
            format: ImageFormat::Svg,
            font: None,
        }
    }
}

impl WordcloudStyle {
    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidStyle {
            style: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if self.mask.is_none() && (self.width == 0 || self.height == 0) {
            return Err(invalid("width and height must be positive"));
        }
        if self.mask.is_none() && (self.width > MAX_MASK_SIDE || self.height > MAX_MASK_SIDE) {
            return Err(invalid(&format!(
                "width and height must not exceed {MAX_MASK_SIDE}"
            )));
        }
        if self.max_words == 0 {
            return Err(invalid("max_words must be positive"));
        }
        if self.min_font_size == 0 {
            return Err(invalid("min_font_size must be positive"));
        }
        if let Some(max) = self.max_font_size {
            if max < self.min_font_size {
                return Err(invalid("max_font_size is smaller than min_font_size"));
            }
        }
        if !(0.0..=1.0).contains(&self.relative_scaling) {
            return Err(invalid("relative_scaling must be within 0..=1"));
        }
        if !(0.0..=1.0).contains(&self.prefer_horizontal) {
            return Err(invalid("prefer_horizontal must be within 0..=1"));
        }
        if self.recolor_from_mask && self.mask.is_none() {
            return Err(invalid("recolor_from_mask requires a mask"));
        }
        if let Some(name) = &self.colormap {
            if colors::Colormap::by_name(name).is_none() {
                return Err(invalid(&format!("unknown colormap '{name}'")));
            }
        }
        if colors::parse_background(&self.background).is_none() {
            return Err(invalid(&format!(
                "unknown background color '{}'",
                self.background
            )));
        }
        if self.format == ImageFormat::Png && self.font.is_none() {
            return Err(invalid("png output requires a `font` path"));
        }
        Ok(())
    }
}

fn default_wordclouds() -> Vec<WordcloudStyle> {
    vec![WordcloudStyle::default()]
}

impl Config {
    /// Build a config in code, mostly for tests and embedding.
    pub fn new(feeds: Vec<String>) -> Self {
        Self {
            feeds: Some(feeds),
            fetch: FetchSettings::default(),
            output: OutputSettings::default(),
            wordclouds: default_wordclouds(),
        }
    }

    /// The configured feed URLs in file order.
    pub fn feeds(&self) -> &[String] {
        self.feeds.as_deref().unwrap_or_default()
    }

    /// Parse and validate a YAML document. `path` is only used in errors.
    pub fn from_yaml(yaml: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feeds.is_none() {
            return Err(ConfigError::MissingFeeds);
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::InvalidFetch(
                "timeout_secs must be positive".to_string(),
            ));
        }
        if self.fetch.concurrency == 0 {
            return Err(ConfigError::InvalidFetch(
                "concurrency must be positive".to_string(),
            ));
        }
        for style in &self.wordclouds {
            style.validate()?;
        }
        Ok(())
    }
}

/// Load and validate the configuration file at `path`.
#[instrument(level = "info", fields(path = %path.display()))]
pub async fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let yaml = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let config = Config::from_yaml(&yaml, path)?;
    info!(
        feeds = config.feeds().len(),
        wordclouds = config.wordclouds.len(),
        "Loaded configuration"
    );
    debug!(feeds = ?config.feeds(), "Configured feeds");
    Ok(config)
}

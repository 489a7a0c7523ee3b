//! Remote URL ingestion through a JSON content proxy.
//!
//! The proxy (`{base}/get?url=...`) wraps the target response in an envelope
//! carrying the body and the target's status. Target errors are reported in
//! that envelope rather than as proxy HTTP errors.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use contentsynth_shared::{AppConfig, Result, SourceContent, SynthError};

use crate::extract::{ArticleExtractor, ReadabilityExtractor, body_text};
use crate::file::NOTEBOOK_LABEL;
use crate::notebook::flatten_notebook;

/// User-Agent string for proxy requests.
const USER_AGENT: &str = concat!("contentsynth/", env!("CARGO_PKG_VERSION"));

/// Label for non-HTML remote content.
pub const REMOTE_TEXT_LABEL: &str = "Remote Text File";

/// Label for HTML pages when no host name is available.
pub const WEBPAGE_LABEL: &str = "Webpage";

/// Envelope returned by the content proxy.
#[derive(Debug, Deserialize)]
struct ProxyEnvelope {
    #[serde(default)]
    contents: Option<String>,
    #[serde(default)]
    status: ProxyStatus,
}

#[derive(Debug, Default, Deserialize)]
struct ProxyStatus {
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    http_code: Option<u16>,
}

/// Fetches public URLs through the content proxy and turns them into
/// [`SourceContent`].
pub struct ContentFetcher {
    client: Client,
    proxy_base: Url,
    extractor: Box<dyn ArticleExtractor>,
}

impl ContentFetcher {
    /// Build a fetcher for the given proxy base URL.
    ///
    /// A base with a path (`https://host/relay`) keeps it: requests go to
    /// `https://host/relay/get`.
    pub fn new(proxy_base: &str) -> Result<Self> {
        let mut proxy_base = Url::parse(proxy_base)
            .map_err(|e| SynthError::config(format!("invalid proxy base URL {proxy_base:?}: {e}")))?;
        if !proxy_base.path().ends_with('/') {
            let path = format!("{}/", proxy_base.path());
            proxy_base.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SynthError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            proxy_base,
            extractor: Box::new(ReadabilityExtractor),
        })
    }

    /// Build a fetcher from the `[proxy]` section of the config.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(&config.proxy.base_url)
    }

    /// Replace the main-content extractor.
    pub fn with_extractor(mut self, extractor: Box<dyn ArticleExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Fetch `url` through the proxy and classify the result.
    #[instrument(skip(self), fields(extractor = self.extractor.name()))]
    pub async fn fetch_from_url(&self, url: &str) -> Result<SourceContent> {
        let target = Url::parse(url.trim())
            .map_err(|e| SynthError::parse(format!("invalid URL {url:?}: {e}")))?;
        let path = target.path().to_ascii_lowercase();

        if path.ends_with(".pdf") {
            return Err(SynthError::UnsupportedFormat(
                "Fetching remote PDF files via URL is not supported. \
                 Please download the PDF and upload it directly."
                    .to_string(),
            ));
        }

        let envelope = self.fetch_envelope(&target).await?;

        if let Some(code) = envelope.status.http_code.filter(|c| *c >= 400) {
            warn!(code, "target returned an error status");
            return Err(target_status_error(code));
        }

        let contents = match envelope.contents {
            Some(c) if !c.is_empty() => c,
            _ => {
                return Err(SynthError::EmptyContent(
                    "The URL was fetched successfully, but the response contained no content."
                        .to_string(),
                ));
            }
        };

        let is_html = envelope
            .status
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("html"));

        let source = if path.ends_with(".ipynb") {
            SourceContent {
                content: flatten_notebook(&contents),
                label: NOTEBOOK_LABEL.to_string(),
            }
        } else if is_html {
            self.extract_page(&contents, &target)
        } else {
            SourceContent {
                content: contents,
                label: REMOTE_TEXT_LABEL.to_string(),
            }
        };

        if source.content.trim().is_empty() {
            return Err(SynthError::EmptyContent(
                "Could not extract meaningful content from the URL. \
                 The page might be empty or require JavaScript to render."
                    .to_string(),
            ));
        }

        info!(label = %source.label, chars = source.content.len(), "remote content fetched");
        Ok(source)
    }

    async fn fetch_envelope(&self, target: &Url) -> Result<ProxyEnvelope> {
        let mut proxy_url = self
            .proxy_base
            .join("get")
            .map_err(|e| SynthError::config(format!("invalid proxy base URL: {e}")))?;
        proxy_url
            .query_pairs_mut()
            .append_pair("url", target.as_str());

        debug!(%proxy_url, "requesting via proxy");

        let response = self.client.get(proxy_url).send().await.map_err(|e| {
            warn!(error = %e, "proxy request failed");
            SynthError::Network(
                "A network error occurred. Please check your internet connection \
                 and if the proxy is accessible."
                    .to_string(),
            )
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SynthError::Network(format!(
                "The content proxy returned a bad response (Status: {}).",
                status.as_u16()
            )));
        }

        response
            .json::<ProxyEnvelope>()
            .await
            .map_err(|e| SynthError::parse(format!("malformed proxy response: {e}")))
    }

    /// Run the extractor on an HTML page, falling back to the body text.
    fn extract_page(&self, html: &str, target: &Url) -> SourceContent {
        let host = target.host_str().map(str::to_string);

        let (content, site_name) = match self.extractor.extract(html, target) {
            Ok(article) => (article.text, article.site_name),
            Err(e) => {
                debug!(error = %e, "extraction failed, using body text");
                (body_text(html), None)
            }
        };

        let label = match site_name.or(host) {
            Some(name) => format!("Webpage Article ({name})"),
            None => WEBPAGE_LABEL.to_string(),
        };

        SourceContent { content, label }
    }
}

/// Map a target status code (>= 400) to a user-facing error.
fn target_status_error(code: u16) -> SynthError {
    let message = match code {
        404 => "Content not found at the source URL (Error 404). \
                Please check if the URL is correct."
            .to_string(),
        401 | 403 => format!(
            "Access denied to the source URL (Error {code}). \
             The resource may be private or require a login."
        ),
        c if c >= 500 => format!(
            "The remote server for the content encountered an error (Error {code}). \
             Please try again later."
        ),
        _ => format!(
            "Failed to fetch content from the source URL (Error: {code}). \
             The URL may be invalid or blocked."
        ),
    };
    SynthError::remote(code, message)
}

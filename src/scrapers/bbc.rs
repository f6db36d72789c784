//! BBC Technology listing scraper.
//!
//! This module fetches the [BBC Technology](https://www.bbc.com/news/technology)
//! listing page and turns each article card into an [`Article`].
//!
//! # Container Selection
//!
//! Cards are located with `div[data-testid="edinburgh-card"]`. Older page
//! layouts do not carry the test id, so when nothing matches the class
//! selector `div.ssrcss-1f3bvyz-Stack` is tried instead.
//!
//! # Field Extraction
//!
//! Within a card the first `h2` is the title, the first `a[href]` is the link
//! (resolved against the base URL) and the first `p` is the summary. Missing
//! pieces fall back to [`NO_TITLE`], [`NO_LINK`] and [`NO_SUMMARY`]. The date
//! is always the day the transform runs, never a date found in the markup.
//!
//! Title and summary text is whitespace-normalised: each text node is trimmed
//! and the non-empty ones are joined with a single space, so
//! `First <span>story</span>` reads `First story` (not `Firststory`).

use crate::models::{Article, DEFAULT_SOURCE, NO_LINK, NO_SUMMARY, NO_TITLE};
use crate::scrapers::Fetch;
use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Desktop browser user agent sent with the listing request.
pub const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) ",
    "AppleWebKit/537.36 (KHTML, like Gecko) ",
    "Chrome/91.0.4472.124 Safari/537.36"
);

/// Path of the listing page relative to the base URL.
pub const TECH_PATH: &str = "/news/technology";

/// Upper bound on the whole listing request.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

static CARD_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"div[data-testid="edinburgh-card"]"#).expect("valid card selector")
});
static STACK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.ssrcss-1f3bvyz-Stack").expect("valid stack selector"));
static HEADING_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h2").expect("valid heading selector"));
static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid anchor selector"));
static PARAGRAPH_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("valid paragraph selector"));

/// HTTP client settings for the listing request: browser user agent and timeout.
pub fn client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(FETCH_TIMEOUT)
}

/// Fetches the listing page with a single GET.
#[derive(Debug)]
pub struct BbcExtractor {
    client: reqwest::Client,
    url: Url,
}

impl BbcExtractor {
    /// Build an extractor for `{base_url}/news/technology`.
    ///
    /// # Errors
    ///
    /// Fails if the listing URL cannot be derived from `base_url` or the HTTP
    /// client cannot be built (e.g. TLS backend initialisation).
    pub fn new(base_url: &Url) -> Result<Self, Box<dyn Error>> {
        Self::with_builder(base_url, client_builder())
    }

    /// Build from a caller-adjusted [`client_builder`].
    pub fn with_builder(
        base_url: &Url,
        builder: reqwest::ClientBuilder,
    ) -> Result<Self, Box<dyn Error>> {
        let url = base_url.join(TECH_PATH)?;
        let client = builder.build()?;
        Ok(Self { client, url })
    }

    /// The URL this extractor requests.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl Fetch for BbcExtractor {
    /// GET the listing page and return its body on any 2xx status.
    ///
    /// Transport errors, timeouts and non-2xx statuses are logged and
    /// reported as `None`. There are no retries.
    #[instrument(level = "info", skip_all, fields(url = %self.url))]
    async fn extract(&self) -> Option<String> {
        info!("Extracting BBC Technology listing");

        let response = match self.client.get(self.url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, timeout = e.is_timeout(), "Listing request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            error!(%status, "Listing request returned a non-2xx status");
            return None;
        }

        match response.text().await {
            Ok(body) => {
                info!(bytes = body.len(), "Fetched listing page");
                Some(body)
            }
            Err(e) => {
                error!(error = %e, "Failed reading listing body");
                None
            }
        }
    }
}

/// Turns listing markup into articles.
#[derive(Debug, Clone)]
pub struct Transformer {
    base_url: Url,
    source: String,
    limit: Option<usize>,
}

impl Transformer {
    /// Transformer resolving links against `base_url`, with no container limit.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            source: DEFAULT_SOURCE.to_string(),
            limit: None,
        }
    }

    /// Keep only the first `limit` containers. `None` keeps all of them.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Transform using today's local date.
    pub fn transform(&self, markup: &str) -> Vec<Article> {
        self.transform_on(markup, Local::now().date_naive())
    }

    /// Transform, stamping every article with `date`.
    ///
    /// A container whose link cannot be resolved is logged and skipped; the
    /// rest of the page is still processed. Output follows document order.
    #[instrument(level = "info", skip_all, fields(bytes = markup.len(), %date))]
    pub fn transform_on(&self, markup: &str, date: NaiveDate) -> Vec<Article> {
        let document = Html::parse_document(markup);

        let mut selector = "edinburgh-card";
        let mut containers: Vec<ElementRef<'_>> = document.select(&CARD_SELECTOR).collect();
        if containers.is_empty() {
            selector = "stack-class";
            containers = document.select(&STACK_SELECTOR).collect();
        }
        let found = containers.len();
        if let Some(limit) = self.limit {
            containers.truncate(limit);
        }

        let date = date.format("%Y-%m-%d").to_string();
        let mut articles = Vec::with_capacity(containers.len());
        for (index, container) in containers.into_iter().enumerate() {
            match self.parse_container(container, &date) {
                Ok(article) => {
                    debug!(
                        index,
                        title = %article.title(),
                        link = %article.link(),
                        "Parsed container"
                    );
                    articles.push(article);
                }
                Err(e) => {
                    warn!(index, error = %e, "Skipping container that failed to parse");
                }
            }
        }

        info!(
            found,
            count = articles.len(),
            selector,
            "Transformed listing page"
        );
        articles
    }

    fn parse_container(
        &self,
        container: ElementRef<'_>,
        date: &str,
    ) -> Result<Article, Box<dyn Error>> {
        let title = container
            .select(&HEADING_SELECTOR)
            .next()
            .map(element_text)
            .unwrap_or_else(|| NO_TITLE.to_string());

        let link = match container
            .select(&ANCHOR_SELECTOR)
            .next()
            .and_then(|anchor| anchor.value().attr("href"))
        {
            Some(href) => self.base_url.join(href)?.to_string(),
            None => NO_LINK.to_string(),
        };

        let summary = container
            .select(&PARAGRAPH_SELECTOR)
            .next()
            .map(element_text)
            .unwrap_or_else(|| NO_SUMMARY.to_string());

        Ok(Article::new(title, summary, link, date).with_source(self.source.clone()))
    }
}

/// Trimmed text nodes of `element`, joined by single spaces.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    const LISTING: &str = r#"
        <html><body>
          <div data-testid="edinburgh-card">
            <a href="/news/articles/c1"><h2>First  <span>story</span></h2></a>
            <p>First summary</p>
          </div>
          <div data-testid="edinburgh-card">
            <a href="https://www.bbc.co.uk/news/articles/c2"><h2>Second story</h2></a>
            <p>Second summary</p>
          </div>
          <div class="ssrcss-1f3bvyz-Stack">
            <a href="/news/articles/ignored"><h2>Not a card</h2></a>
          </div>
        </body></html>
    "#;

    fn transformer() -> Transformer {
        Transformer::new(Url::parse("https://www.bbc.com").unwrap())
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 6).unwrap()
    }

    #[test]
    fn test_transform_primary_selector() {
        let articles = transformer().transform_on(LISTING, day());

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title(), "First story");
        assert_eq!(articles[0].summary(), "First summary");
        assert_eq!(articles[0].link(), "https://www.bbc.com/news/articles/c1");
        assert_eq!(articles[0].date(), "2025-05-06");
        assert_eq!(articles[0].source(), "BBC Technology");
        assert_eq!(articles[1].link(), "https://www.bbc.co.uk/news/articles/c2");
    }

    #[test]
    fn test_transform_falls_back_to_stack_class() {
        let html = r#"
            <div class="ssrcss-1f3bvyz-Stack other">
              <h2>Fallback title</h2><a href="/news/articles/f1">read</a><p>Fallback summary</p>
            </div>
            <div class="unrelated"><h2>Ignored</h2></div>
        "#;
        let articles = transformer().transform_on(html, day());

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title(), "Fallback title");
        assert_eq!(articles[0].link(), "https://www.bbc.com/news/articles/f1");
    }

    #[test]
    fn test_transform_empty_container_uses_placeholders() {
        let html = r#"<div data-testid="edinburgh-card"><span>nothing useful</span></div>"#;
        let articles = transformer().transform_on(html, day());

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title(), NO_TITLE);
        assert_eq!(articles[0].summary(), NO_SUMMARY);
        assert_eq!(articles[0].link(), NO_LINK);
    }

    #[test]
    fn test_transform_ignores_anchor_without_href() {
        let html = r#"
            <div data-testid="edinburgh-card">
              <a name="top">anchor</a><a href="/news/articles/c9"><h2>Title</h2></a>
            </div>
        "#;
        let articles = transformer().transform_on(html, day());
        assert_eq!(articles[0].link(), "https://www.bbc.com/news/articles/c9");
    }

    #[test]
    fn test_transform_skips_unresolvable_link() {
        let html = r#"
            <div data-testid="edinburgh-card"><a href="http://[bad"><h2>Broken</h2></a></div>
            <div data-testid="edinburgh-card"><a href="/news/articles/ok"><h2>Fine</h2></a></div>
        "#;
        let articles = transformer().transform_on(html, day());

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title(), "Fine");
    }

    #[test]
    fn test_transform_limit_keeps_leading_containers() {
        let articles = transformer().with_limit(Some(1)).transform_on(LISTING, day());
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title(), "First story");
    }

    #[test]
    fn test_transform_no_containers() {
        let articles = transformer().transform_on("<html><body><p>empty</p></body></html>", day());
        assert!(articles.is_empty());
    }

    #[test]
    fn test_extractor_url() {
        let extractor = BbcExtractor::new(&Url::parse("https://www.bbc.com").unwrap()).unwrap();
        assert_eq!(extractor.url().as_str(), "https://www.bbc.com/news/technology");
    }

    /// Serve one canned HTTP response on a loopback port, handing back the raw request.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (Url, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let _ = tx.send(String::from_utf8_lossy(&request).into_owned());

            let response = format!(
                "{status_line}\r\n\
                 Content-Type: text/html; charset=utf-8\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        (Url::parse(&format!("http://{addr}")).unwrap(), rx)
    }

    fn loopback_extractor(base: &Url) -> BbcExtractor {
        BbcExtractor::with_builder(base, client_builder().no_proxy()).unwrap()
    }

    #[tokio::test]
    async fn test_extract_returns_body_and_sends_user_agent() {
        let (base, request) = serve_once("HTTP/1.1 200 OK", "<html>listing</html>").await;
        let extractor = loopback_extractor(&base);

        let body = extractor.extract().await;
        assert_eq!(body.as_deref(), Some("<html>listing</html>"));

        let request = request.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /news/technology http/1.1"));
        assert!(request.contains("user-agent: mozilla/5.0 (windows nt 10.0; win64; x64)"));
    }

    #[tokio::test]
    async fn test_extract_non_success_status_is_none() {
        let (base, _request) = serve_once("HTTP/1.1 404 Not Found", "missing").await;
        let extractor = loopback_extractor(&base);
        assert!(extractor.extract().await.is_none());
    }

    #[tokio::test]
    async fn test_extract_redirect_status_without_location_is_none() {
        let (base, _request) =
            serve_once("HTTP/1.1 300 Multiple Choices", "<html>choose</html>").await;
        let extractor = loopback_extractor(&base);
        assert!(extractor.extract().await.is_none());
    }

    #[test]
    fn test_element_text_joins_nodes_with_single_space() {
        let html = Html::parse_fragment("<h2>  First  <span>story</span>\n </h2>");
        let heading = html.select(&HEADING_SELECTOR).next().unwrap();
        assert_eq!(element_text(heading), "First story");
    }

    #[tokio::test]
    async fn test_extract_connection_refused_is_none() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let extractor = loopback_extractor(&Url::parse(&format!("http://{addr}")).unwrap());
        assert!(extractor.extract().await.is_none());
    }
}

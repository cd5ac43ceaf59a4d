//! Document store
//!
//! A [`Document`] is the markup of the last retrieved (or injected) page
//! together with the URL it came from. The URL is the base for resolving
//! relative links. Markup is parsed on demand for each query, which keeps
//! the document `Send` so a session can live inside a spawned task.

mod links;

pub use links::Link;

use scraper::Html;
use url::Url;

/// A retrieved or injected HTML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    url: Url,
    source: String,
}

impl Document {
    /// Creates a document from raw markup and its base URL
    pub fn new(url: Url, source: impl Into<String>) -> Self {
        Self {
            url,
            source: source.into(),
        }
    }

    /// The base URL used for relative-link resolution
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The raw markup
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parses the markup for downstream DOM queries
    pub fn html(&self) -> Html {
        Html::parse_document(&self.source)
    }

    /// Resolves `href` against the document URL
    ///
    /// # Example
    ///
    /// ```
    /// use sumi_navigator::Document;
    /// use url::Url;
    ///
    /// let doc = Document::new(Url::parse("https://example.com/a/b").unwrap(), "");
    /// assert_eq!(doc.resolve("c.png").unwrap().as_str(), "https://example.com/a/c.png");
    /// ```
    pub fn resolve(&self, href: &str) -> Result<Url, url::ParseError> {
        self.url.join(href)
    }

    /// The trimmed `<title>` text, if present and non-empty
    pub fn title(&self) -> Option<String> {
        links::extract_title(&self.html())
    }

    /// All followable links, resolved to absolute http(s) URLs
    pub fn links(&self) -> Vec<Link> {
        links::extract_links(&self.html(), &self.url)
    }

    /// Finds the link a click on `title_or_text` would follow
    pub fn find_link(&self, title_or_text: &str) -> Option<Link> {
        links::find_link(&self.html(), &self.url, title_or_text)
    }
}

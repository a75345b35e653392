//! Conversion of HTML pages and PDF files into Markdown documents.

use std::sync::LazyLock;

use scraper::{Html, Node, Selector};

use super::SourceError;
use crate::retrieval::scoring::collapse_whitespace;

/// Elements whose text never reaches a document.
pub const EXCLUDED_ELEMENTS: &[&str] = &["script", "style", "nav", "aside", "footer"];

static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("body selector is valid"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("title selector is valid"));

/// Readable parts of an HTML page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// Trimmed text of the first `<title>`, if non-blank
    pub title: Option<String>,
    /// Body text with excluded elements dropped and whitespace collapsed
    pub body: String,
}

pub fn extract_page_text(html: &str) -> PageText {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty());

    let mut raw = String::new();
    if let Some(body) = document.select(&BODY).next() {
        for node in body.descendants() {
            let Node::Text(text) = node.value() else {
                continue;
            };
            let excluded = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| EXCLUDED_ELEMENTS.contains(&el.name()))
            });
            if !excluded {
                raw.push_str(text);
            }
        }
    }

    PageText {
        title,
        body: collapse_whitespace(&raw),
    }
}

/// `# <title or url>` document for a fetched web page.
pub fn web_page_document(html: &str, final_url: &str) -> String {
    let page = extract_page_text(html);
    let title = page.title.as_deref().unwrap_or(final_url);
    format!("# {title}\n\nSource: {final_url}\n\n{}", page.body)
}

/// `# Medical Content:` document for a local HTML file.
pub fn local_html_document(html: &str, absolute_path: &str) -> String {
    let page = extract_page_text(html);
    let title = page.title.as_deref().unwrap_or(absolute_path);
    format!(
        "# Medical Content: {title}\n\nSource: {absolute_path}\n\n{}",
        page.body
    )
}

pub fn pdf_document(text: &str, label: &str) -> String {
    format!("# Medical PDF: {label}\n\n{text}")
}

pub fn other_file_document(bytes: &[u8], absolute_path: &str) -> String {
    format!(
        "# Medical File: {absolute_path}\n\n{}",
        String::from_utf8_lossy(bytes)
    )
}

pub fn inline_text_document(text: &str) -> String {
    format!("# Patient FAQ Text\n\n{text}")
}

/// Extract the text layer of a PDF. Blocking; run it off the async runtime.
pub fn pdf_text(bytes: &[u8]) -> Result<String, SourceError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| SourceError::PdfParse {
        message: e.to_string(),
    })
}

/// [`pdf_text`] on the blocking pool. A panic inside the extractor is a parse failure.
pub async fn pdf_text_blocking(bytes: Vec<u8>) -> Result<String, SourceError> {
    tokio::task::spawn_blocking(move || pdf_text(&bytes))
        .await
        .map_err(|e| SourceError::PdfParse {
            message: format!("extractor aborted: {e}"),
        })?
}

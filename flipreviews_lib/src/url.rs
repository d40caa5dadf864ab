//! Resolving a product-page URL to its reviews listing.

use flipreviews_dom::PageSession;
use url::Url;

use crate::error::CrawlError;

const REVIEWS_SEGMENT: &str = "/product-reviews/";
const PRODUCT_MARKERS: [&str; 2] = ["/p/", "/dp/"];

/// Maps a product URL to its reviews-listing URL by path manipulation alone.
///
/// A URL already pointing at a reviews listing passes through unchanged; a
/// URL with a product marker has its trailing identifier spliced into the
/// reviews path. Anything else needs link discovery ([`resolve`]).
pub fn normalize(product_url: &str) -> Option<String> {
    if product_url.contains(REVIEWS_SEGMENT) {
        return Some(product_url.to_string());
    }

    for marker in PRODUCT_MARKERS {
        if let Some((base, rest)) = product_url.split_once(marker) {
            let id = rest.split('?').next().unwrap_or(rest);
            if !id.is_empty() {
                return Some(format!("{base}{REVIEWS_SEGMENT}{id}"));
            }
        }
    }

    None
}

/// Resolves the reviews-listing URL, loading the product page and scanning
/// its hyperlinks when path rules are not enough.
///
/// A link qualifies when its visible text mentions reviews or its target
/// path contains the reviews segment; the first qualifying link with a
/// target wins. Fails with [`CrawlError::UrlResolution`] when nothing
/// qualifies.
pub async fn resolve(
    session: &mut dyn PageSession,
    product_url: &str,
) -> Result<String, CrawlError> {
    if let Some(found) = normalize(product_url) {
        return Ok(found);
    }

    tracing::info!(url = product_url, "no product marker, scanning page links");
    session.load_page(product_url).await?;

    for link in session.query_elements("a")? {
        let text_hit = link.text.to_lowercase().contains("reviews");
        let href_hit = link
            .href
            .as_deref()
            .is_some_and(|href| href.contains("product-reviews"));
        if text_hit || href_hit {
            if let Some(href) = link.href {
                return Ok(absolutize(product_url, &href));
            }
        }
    }

    Err(CrawlError::UrlResolution {
        url: product_url.to_string(),
    })
}

/// Joins a possibly relative link target against the page it came from.
fn absolutize(page_url: &str, href: &str) -> String {
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    Url::parse(page_url)
        .ok()
        .and_then(|base| base.join(href).ok())
        .map(|joined| joined.to_string())
        .unwrap_or_else(|| href.to_string())
}

/// Appends the page-number query parameter to a reviews URL.
pub fn page_url(reviews_url: &str, page: u32) -> String {
    if reviews_url.contains('?') {
        format!("{reviews_url}&page={page}")
    } else {
        format!("{reviews_url}?page={page}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reviews_url_passes_through() {
        let url = "https://www.flipkart.com/x/product-reviews/ABC?pid=1";
        assert_eq!(normalize(url), Some(url.to_string()));
    }

    #[test]
    fn product_marker_is_spliced() {
        assert_eq!(
            normalize("https://site/x/p/ABC123?y=1"),
            Some("https://site/x/product-reviews/ABC123".to_string())
        );
    }

    #[test]
    fn dp_marker_is_spliced() {
        assert_eq!(
            normalize("https://site/item/dp/XYZ9"),
            Some("https://site/item/product-reviews/XYZ9".to_string())
        );
    }

    #[test]
    fn unrecognized_shape_is_none() {
        assert_eq!(normalize("https://site/some/other/page"), None);
    }

    #[test]
    fn empty_identifier_is_none() {
        assert_eq!(normalize("https://site/x/p/?y=1"), None);
    }

    #[test]
    fn page_parameter_appends_with_question_mark() {
        assert_eq!(page_url("https://site/r/product-reviews/A", 2), "https://site/r/product-reviews/A?page=2");
    }

    #[test]
    fn page_parameter_appends_with_ampersand() {
        assert_eq!(
            page_url("https://site/r/product-reviews/A?pid=1", 3),
            "https://site/r/product-reviews/A?pid=1&page=3"
        );
    }

    #[test]
    fn relative_links_are_absolutized() {
        assert_eq!(
            absolutize("https://site/page", "/product-reviews/A"),
            "https://site/product-reviews/A"
        );
        assert_eq!(
            absolutize("https://site/page", "https://other/product-reviews/B"),
            "https://other/product-reviews/B"
        );
    }
}

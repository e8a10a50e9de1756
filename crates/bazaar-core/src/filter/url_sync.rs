//! Keeps the free-text search in the page URL.
//!
//! Only the search text is persisted in the URL; the other filters live in
//! the list controller.

use url::Url;

/// Query parameter holding the search text.
pub const SEARCH_PARAM: &str = "q";

/// Read the search text from a URL. Blank values count as absent.
pub fn search_from_url(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(name, _)| name == SEARCH_PARAM)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Write the search text into a URL, leaving other parameters in place.
///
/// `None` or blank text removes the parameter.
pub fn write_search_to_url(url: &mut Url, search: Option<&str>) {
    let search = search.map(str::trim).filter(|s| !s.is_empty());

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| name != SEARCH_PARAM)
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    if let Some(search) = search {
        pairs.push((SEARCH_PARAM.to_string(), search.to_string()));
    }

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
}

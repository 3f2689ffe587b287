//! Collection metadata and page links.

use std::collections::BTreeMap;

use content_sources_core::{FilterData, Links, PaginationData, ResponseMetadata};

/// Build the `meta` and `links` blocks of a list response.
///
/// Each link is the request path plus a query of `limit`, `offset` and every
/// non-empty filter, sorted by key.
pub fn collection_metadata(
    path: &str,
    page: PaginationData,
    filters: &FilterData,
    total: i64,
) -> (ResponseMetadata, Links) {
    let meta = ResponseMetadata {
        count: total,
        limit: page.limit,
        offset: page.offset,
    };

    let link = |offset: i64| page_link(path, page.limit, offset, filters);

    let links = Links {
        first: link(0),
        last: link(last_offset(total, page.limit)),
        next: page
            .offset
            .checked_add(page.limit)
            .filter(|next| *next < total)
            .map(&link),
        prev: (page.offset - page.limit >= 0).then(|| link(page.offset - page.limit)),
    };

    (meta, links)
}

fn last_offset(total: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    if total > 0 && total % limit == 0 {
        total - limit
    } else {
        total - total % limit
    }
}

fn page_link(path: &str, limit: i64, offset: i64, filters: &FilterData) -> String {
    let limit = limit.to_string();
    let offset = offset.to_string();

    let mut params: BTreeMap<&str, &str> = filters.query_pairs().into_iter().collect();
    params.insert("limit", &limit);
    params.insert("offset", &offset);

    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();

    // Links are rendered human-readable; fall back to the encoded form.
    let query = urlencoding::decode(&encoded)
        .map(|q| q.into_owned())
        .unwrap_or(encoded);

    format!("{path}?{query}")
}

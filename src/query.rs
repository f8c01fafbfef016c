//! Search URL construction.
//!
//! The endpoint expects a flat query string:
//!
//! ```text
//! from=0&size=1000&sort=2&title_only=0&domain=1&modified%2Cformat=yyyy-MM-dd&
//! type=1&bloc=4&modified%2Cfrom=2020-01-01&modified%2Cto=2020-11-01&query=
//! ```
//!
//! `type` and `bloc` are left out entirely when no filter is set. The comma in
//! the `modified,*` keys is sent percent-encoded, exactly as the site's own
//! search page does.

use crate::models::QueryParameters;

/// Fixed directive telling the endpoint how `modified,from`/`modified,to` are formatted.
const DATE_FORMAT_PAIR: &str = "modified%2Cformat=yyyy-MM-dd";

const ISO_DATE: &str = "%Y-%m-%d";

/// Build the request URL for `params` against `endpoint`.
///
/// Pure string construction: no I/O and no failure modes. Only the free-text
/// query is percent-encoded; every other value is numeric or an ISO date.
pub fn build_url(endpoint: &str, params: &QueryParameters) -> String {
    let mut pairs = vec![
        format!("from={}", params.offset),
        format!("size={}", params.size),
        format!("sort={}", params.sort.as_param()),
        format!("title_only={}", u8::from(params.title_only)),
        format!("domain={}", params.domain),
        DATE_FORMAT_PAIR.to_string(),
    ];
    if let Some(material_type) = params.material_type {
        pairs.push(format!("type={material_type}"));
    }
    if let Some(bloc) = params.bloc {
        pairs.push(format!("bloc={bloc}"));
    }
    pairs.push(format!(
        "modified%2Cfrom={}",
        params.date_from.format(ISO_DATE)
    ));
    pairs.push(format!("modified%2Cto={}", params.date_to.format(ISO_DATE)));
    pairs.push(format!("query={}", urlencoding::encode(&params.query)));

    format!("{}?{}", endpoint.trim_end_matches('?'), pairs.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SortMode;
    use chrono::NaiveDate;

    const ENDPOINT: &str = "https://lenta.ru/search/v2/process";

    fn params(material_type: u32, bloc: u32) -> QueryParameters {
        QueryParameters {
            query: String::new(),
            offset: 0,
            size: 1000,
            sort: SortMode::Date,
            title_only: false,
            domain: 1,
            material_type: QueryParameters::filter(material_type),
            bloc: QueryParameters::filter(bloc),
            date_from: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            date_to: NaiveDate::from_ymd_opt(2020, 11, 1).unwrap(),
        }
    }

    #[test]
    fn test_build_url_full() {
        let url = build_url(ENDPOINT, &params(1, 4));
        assert_eq!(
            url,
            "https://lenta.ru/search/v2/process?from=0&size=1000&sort=2&title_only=0&domain=1&\
             modified%2Cformat=yyyy-MM-dd&type=1&bloc=4&modified%2Cfrom=2020-01-01&\
             modified%2Cto=2020-11-01&query="
        );
    }

    #[test]
    fn test_zero_filters_are_omitted() {
        let url = build_url(ENDPOINT, &params(0, 0));
        assert!(!url.contains("type="));
        assert!(!url.contains("bloc="));
        assert!(url.contains("yyyy-MM-dd&modified%2Cfrom=2020-01-01"));
    }

    #[test]
    fn test_nonzero_filters_appear_once() {
        let url = build_url(ENDPOINT, &params(7, 0));
        assert_eq!(url.matches("type=7").count(), 1);
        assert!(!url.contains("bloc="));

        let url = build_url(ENDPOINT, &params(0, 12));
        assert_eq!(url.matches("bloc=12").count(), 1);
        assert!(!url.contains("type="));
    }

    #[test]
    fn test_query_text_is_encoded() {
        let mut p = params(0, 0);
        p.query = "курс рубля".to_string();
        p.title_only = true;
        p.sort = SortMode::Relevance;

        let url = build_url(ENDPOINT, &p);
        assert!(url.ends_with("query=%D0%BA%D1%83%D1%80%D1%81%20%D1%80%D1%83%D0%B1%D0%BB%D1%8F"));
        assert!(url.contains("sort=1&title_only=1&"));
    }

    #[test]
    fn test_endpoint_trailing_question_mark() {
        let url = build_url("http://localhost/search?", &params(0, 0));
        assert!(url.starts_with("http://localhost/search?from=0&"));
    }
}

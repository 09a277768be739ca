//! The `Link` response header, as used for offset/limit pagination.
//!
//! ```text
//! Link: <http://api/letters?offset=0&limit=10>; rel="first",
//!       <http://api/letters?offset=20&limit=10>; rel="last"
//! ```
//!
//! Only the `limit` and `offset` query parameters of each target are read.
//! Values are coerced leniently by dropping every non-digit character, so
//! `10px` reads as `10`. A relation whose target lacks a parameter reports it
//! as unknown (`None`), never as zero.
//!
//! ```
//! use jsonld_client::protocol::{relations, LinkHeader};
//!
//! let link = LinkHeader::parse(
//!     r#"<http://api/letters?offset=0&limit=10>; rel="first",<http://api/letters?offset=20&limit=10>; rel="last""#,
//! );
//! assert_eq!(link.offset(relations::LAST), Some(20));
//! assert_eq!(link.limit(relations::FIRST), Some(10));
//! assert_eq!(link.offset(relations::NEXT), None);
//! ```

use crate::protocol::params;
use std::collections::BTreeMap;

/// Pagination parameters extracted from one link target.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkRelation {
    pub url: String,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Parsed `Link` header, keyed by relation name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkHeader {
    relations: BTreeMap<String, LinkRelation>,
}

impl LinkHeader {
    /// Parse a header value. Never fails: unreadable links simply carry no
    /// parameters.
    pub fn parse(value: &str) -> Self {
        let relations = value
            .split(',')
            .map(|link| (relation_name(link), parse_relation(link)))
            .collect();
        LinkHeader { relations }
    }

    pub fn relation(&self, rel: &str) -> Option<&LinkRelation> {
        self.relations.get(rel)
    }

    pub fn offset(&self, rel: &str) -> Option<u64> {
        self.relation(rel).and_then(|r| r.offset)
    }

    pub fn limit(&self, rel: &str) -> Option<u64> {
        self.relation(rel).and_then(|r| r.limit)
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

fn relation_name(link: &str) -> String {
    match link.find("rel=") {
        Some(pos) => link[pos + 4..]
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .trim_matches('"')
            .to_string(),
        None => String::new(),
    }
}

fn parse_relation(link: &str) -> LinkRelation {
    let target = link
        .split_once('<')
        .and_then(|(_, rest)| rest.split_once('>'))
        .map(|(url, _)| url)
        .unwrap_or(link)
        .trim();

    let mut relation = LinkRelation {
        url: target.to_string(),
        ..Default::default()
    };

    let Some((_, query)) = target.split_once('?') else {
        return relation;
    };
    let query = query.split('#').next().unwrap_or_default();

    for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match name.as_ref() {
            params::LIMIT => relation.limit = lenient_number(&value),
            params::OFFSET => relation.offset = lenient_number(&value),
            _ => {}
        }
    }
    relation
}

/// Keep only the digits; an empty remainder reads as `0`.
fn lenient_number(value: &str) -> Option<u64> {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Some(0);
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::relations;

    #[test]
    fn test_parse_random_garbage() {
        let link = LinkHeader::parse("test,t,s,s,s,,");
        assert_eq!(link.offset(relations::LAST), None);
        assert_eq!(link.limit(relations::LAST), None);
    }

    #[test]
    fn test_parse_broken_offset_keeps_limit() {
        let link = LinkHeader::parse(
            r#"<http://publishing.local/api/v1/books?type=Academic&type=Academicoffset=1800&limit=100>; rel="last",<http://publishing.local/api/v1/books?type=Academic&type=Academicoffset=100&limit=100>; rel="next",<http://publishing.local/api/v1/books?type=Academic&type=Academicoffset=0&limit=100>; rel="first""#,
        );
        assert_eq!(link.offset(relations::LAST), None);
        assert_eq!(link.limit(relations::LAST), Some(100));
    }

    #[test]
    fn test_parse_good() {
        let link = LinkHeader::parse(
            r#"<http://publishing.local/api/v1/books?type=Academic&offset=0&limit=100>; rel="first",<http://publishing.local/api/v1/books?type=Academic&offset=1800&limit=100>; rel="last",<http://publishing.local/api/v1/books?type=Academic&offset=100&limit=100>; rel="next""#,
        );
        assert_eq!(link.offset(relations::LAST), Some(1800));
        assert_eq!(link.limit(relations::LAST), Some(100));
        assert_eq!(link.offset(relations::NEXT), Some(100));
        assert_eq!(link.offset(relations::FIRST), Some(0));
        assert_eq!(link.offset(relations::PREV), None);
    }

    #[test]
    fn test_lenient_values() {
        let link = LinkHeader::parse(r#"<http://api/x?limit=10px&offset=abc>; rel="last""#);
        assert_eq!(link.limit(relations::LAST), Some(10));
        assert_eq!(link.offset(relations::LAST), Some(0));
    }

    #[test]
    fn test_whitespace_around_links() {
        let link = LinkHeader::parse(
            r#" <http://api/x?offset=0&limit=5>; rel="first" , <http://api/x?offset=45&limit=5>; rel="last" "#,
        );
        assert_eq!(link.offset(relations::LAST), Some(45));
        assert_eq!(
            link.relation(relations::FIRST).map(|r| r.url.as_str()),
            Some("http://api/x?offset=0&limit=5")
        );
    }

    #[test]
    fn test_relation_without_query() {
        let link = LinkHeader::parse(r#"<http://api/x>; rel="last""#);
        assert!(link.relation(relations::LAST).is_some());
        assert_eq!(link.offset(relations::LAST), None);
    }
}

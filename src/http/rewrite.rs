//! Request and response rewriting for proxy forwarding.
//!
//! # Responsibilities
//! - Slash-aware joining of URL segments
//! - Strip hop-by-hop headers in both directions
//! - Maintain the X-Forwarded-For chain
//! - Copy upstream response headers verbatim
//!
//! # Design Decisions
//! - The hop-by-hop set is the fixed list from RFC 2616 section 13.5.1;
//!   headers named by a Connection header are not additionally stripped
//! - X-Forwarded-For collapses existing values into one comma-joined value,
//!   matching how downstream proxies conventionally emit the chain

use std::net::IpAddr;

use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// Header recording the chain of client addresses a request passed through.
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Headers meaningful only for a single transport connection. Must not
/// cross the proxy in either direction.
const HOP_BY_HOP_HEADERS: [HeaderName; 8] = [
    HeaderName::from_static("connection"),
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-authenticate"),
    HeaderName::from_static("proxy-authorization"),
    HeaderName::from_static("te"),
    HeaderName::from_static("trailers"),
    HeaderName::from_static("transfer-encoding"),
    HeaderName::from_static("upgrade"),
];

/// Join two URL segments with exactly one slash at the boundary.
pub fn join_path(url: &str, path: &str) -> String {
    let url_ends_with_slash = url.ends_with('/');
    let path_begins_with_slash = path.starts_with('/');

    match (url_ends_with_slash, path_begins_with_slash) {
        (true, true) => format!("{}{}", url, &path[1..]),
        (false, false) => format!("{}/{}", url, path),
        _ => format!("{}{}", url, path),
    }
}

/// Remove all hop-by-hop headers in place.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in &HOP_BY_HOP_HEADERS {
        headers.remove(name);
    }
}

/// Append `client_ip` to the X-Forwarded-For chain.
///
/// Existing values are combined with ", " and the new address appended;
/// absent the header, the value is just the address.
pub fn append_forwarded_for(headers: &mut HeaderMap, client_ip: IpAddr) {
    let chain = headers
        .get_all(&X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join(", ");

    let value = if chain.is_empty() {
        client_ip.to_string()
    } else {
        format!("{}, {}", chain, client_ip)
    };

    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(&X_FORWARDED_FOR, value);
    }
}

/// Copy every header from `src` into `dst`, preserving multi-value headers
/// and the order of values within a name.
pub fn copy_headers(dst: &mut HeaderMap, src: &HeaderMap) {
    for (name, value) in src {
        dst.append(name.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn join_path_inserts_missing_slash() {
        assert_eq!(join_path("http://a.com", "search"), "http://a.com/search");
    }

    #[test]
    fn join_path_keeps_single_slash() {
        assert_eq!(join_path("http://a.com/", "search"), "http://a.com/search");
        assert_eq!(join_path("http://a.com", "/search"), "http://a.com/search");
    }

    #[test]
    fn join_path_drops_doubled_slash() {
        assert_eq!(join_path("http://a.com/", "/search"), "http://a.com/search");
    }

    #[test]
    fn strip_removes_connection_and_leaves_others() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, "keep-alive".parse().unwrap());
        headers.insert(header::CONTENT_TYPE, "text/plain".parse().unwrap());
        headers.insert("keep-alive", "timeout=5".parse().unwrap());
        headers.insert("proxy-authorization", "Basic xyz".parse().unwrap());

        strip_hop_by_hop(&mut headers);

        assert!(headers.get(header::CONNECTION).is_none());
        assert!(headers.get("keep-alive").is_none());
        assert!(headers.get("proxy-authorization").is_none());
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "text/plain");
    }

    #[test]
    fn strip_removes_transfer_encoding_and_upgrade() {
        let mut headers = HeaderMap::new();
        headers.insert(header::TRANSFER_ENCODING, "chunked".parse().unwrap());
        headers.insert(header::UPGRADE, "websocket".parse().unwrap());
        headers.insert(header::TE, "trailers".parse().unwrap());
        headers.insert("trailers", "Expires".parse().unwrap());

        strip_hop_by_hop(&mut headers);
        assert!(headers.is_empty());
    }

    #[test]
    fn forwarded_for_set_when_absent() {
        let mut headers = HeaderMap::new();
        append_forwarded_for(&mut headers, "1.2.3.4".parse().unwrap());
        assert_eq!(headers.get(&X_FORWARDED_FOR).unwrap(), "1.2.3.4");
    }

    #[test]
    fn forwarded_for_appends_to_chain() {
        let mut headers = HeaderMap::new();
        append_forwarded_for(&mut headers, "1.2.3.4".parse().unwrap());
        append_forwarded_for(&mut headers, "5.6.7.8".parse().unwrap());
        assert_eq!(headers.get(&X_FORWARDED_FOR).unwrap(), "1.2.3.4, 5.6.7.8");
        assert_eq!(headers.get_all(&X_FORWARDED_FOR).iter().count(), 1);
    }

    #[test]
    fn forwarded_for_collapses_multiple_values() {
        let mut headers = HeaderMap::new();
        headers.append(&X_FORWARDED_FOR, "10.0.0.1".parse().unwrap());
        headers.append(&X_FORWARDED_FOR, "10.0.0.2".parse().unwrap());

        append_forwarded_for(&mut headers, "5.6.7.8".parse().unwrap());

        assert_eq!(
            headers.get(&X_FORWARDED_FOR).unwrap(),
            "10.0.0.1, 10.0.0.2, 5.6.7.8"
        );
    }

    #[test]
    fn copy_headers_preserves_multiple_values() {
        let mut src = HeaderMap::new();
        src.append(header::SET_COOKIE, "a=1".parse().unwrap());
        src.append(header::SET_COOKIE, "b=2".parse().unwrap());
        src.insert(header::CONTENT_TYPE, "text/html".parse().unwrap());

        let mut dst = HeaderMap::new();
        copy_headers(&mut dst, &src);

        let cookies: Vec<_> = dst
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(cookies, ["a=1", "b=2"]);
        assert_eq!(dst.get(header::CONTENT_TYPE).unwrap(), "text/html");
    }
}

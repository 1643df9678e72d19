// HMAC-SHA512 request signing.
//
// The server recomputes the signature from the same `Date` header, method,
// path+query, and header subset, so every detail here (trimming, ordering,
// second-level timestamp precision) is part of the authentication contract.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, SubsecRound, Utc};
use hmac::{Hmac, Mac};
use reqwest::header::HeaderMap;
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Headers that factor into the signature, in signing order.
pub const SIGNED_HEADERS: [&str; 6] = [
    "content-type",
    "content-md5",
    "nep-application-key",
    "nep-correlation-id",
    "nep-organization",
    "nep-service-version",
];

/// Format used for the `Date` header: `ddd, DD MMM YYYY HH:mm:ss GMT`.
pub const DATE_HEADER_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Render a timestamp as the `Date` header value.
pub fn date_header(timestamp: DateTime<Utc>) -> String {
    timestamp.format(DATE_HEADER_FORMAT).to_string()
}

/// Compute the `Authorization` signature for a request.
///
/// `path_and_query` is what follows the authority, leading slash included
/// (`/site/sites?pageNumber=0`). Header names are matched case-insensitively;
/// headers outside [`SIGNED_HEADERS`] are ignored.
pub fn sign_request(
    secret_key: &str,
    timestamp: DateTime<Utc>,
    method: &str,
    path_and_query: &str,
    headers: &HeaderMap,
) -> String {
    let mut mac = HmacSha512::new_from_slice(signing_key(secret_key, timestamp).as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(signing_payload(method, path_and_query, headers).as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Secret key concatenated with the ISO-8601 timestamp, milliseconds zeroed.
fn signing_key(secret_key: &str, timestamp: DateTime<Utc>) -> String {
    let truncated = timestamp.trunc_subsecs(0);
    format!("{secret_key}{}", truncated.format("%Y-%m-%dT%H:%M:%S%.3fZ"))
}

fn signing_payload(method: &str, path_and_query: &str, headers: &HeaderMap) -> String {
    let values = SIGNED_HEADERS.iter().filter_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
    });

    std::iter::once(method.trim())
        .chain(std::iter::once(path_and_query.trim()))
        .chain(values)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use reqwest::header::HeaderValue;

    use super::*;

    fn at(millis: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9)
            .single()
            .map(|t| t + chrono::Duration::milliseconds(i64::from(millis)))
            .expect("valid timestamp")
    }

    fn headers() -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert("content-type", HeaderValue::from_static("application/json"));
        h.insert("nep-application-key", HeaderValue::from_static("app-key"));
        h.insert("nep-correlation-id", HeaderValue::from_static("corr-1"));
        h.insert("nep-organization", HeaderValue::from_static("org-1"));
        h
    }

    #[test]
    fn signing_key_truncates_to_whole_seconds() {
        assert_eq!(signing_key("s3cret", at(987)), "s3cret2024-03-05T14:07:09.000Z");
    }

    #[test]
    fn payload_orders_and_trims_present_headers() {
        let mut h = headers();
        h.insert("nep-organization", HeaderValue::from_static("  org-1  "));
        let payload = signing_payload("GET", "/site/sites?pageNumber=0", &h);
        assert_eq!(
            payload,
            "GET\n/site/sites?pageNumber=0\napplication/json\napp-key\ncorr-1\norg-1"
        );
    }

    #[test]
    fn date_header_is_rfc1123_gmt() {
        assert_eq!(date_header(at(0)), "Tue, 05 Mar 2024 14:07:09 GMT");
    }

    #[test]
    fn signature_is_deterministic_within_a_second() {
        let a = sign_request("secret", at(10), "POST", "/site/sites", &headers());
        let b = sign_request("secret", at(990), "POST", "/site/sites", &headers());
        assert_eq!(a, b);
    }

    #[test]
    fn signature_changes_with_signed_header() {
        let base = sign_request("secret", at(0), "GET", "/x", &headers());
        for name in ["content-type", "nep-application-key", "nep-correlation-id", "nep-organization"] {
            let mut h = headers();
            h.insert(name, HeaderValue::from_static("changed"));
            assert_ne!(base, sign_request("secret", at(0), "GET", "/x", &h), "{name}");
        }
        let mut h = headers();
        h.insert("nep-service-version", HeaderValue::from_static("2:2"));
        assert_ne!(base, sign_request("secret", at(0), "GET", "/x", &h));
    }

    #[test]
    fn unsigned_headers_do_not_affect_signature() {
        let base = sign_request("secret", at(0), "GET", "/x", &headers());
        let mut h = headers();
        h.insert("accept", HeaderValue::from_static("application/json"));
        h.insert("date", HeaderValue::from_static("Tue, 05 Mar 2024 14:07:09 GMT"));
        h.insert("x-anything", HeaderValue::from_static("whatever"));
        assert_eq!(base, sign_request("secret", at(0), "GET", "/x", &h));
    }

    #[test]
    fn signature_is_base64_sha512() {
        let sig = sign_request("secret", at(0), "GET", "/x", &HeaderMap::new());
        let raw = STANDARD.decode(&sig).expect("valid base64");
        assert_eq!(raw.len(), 64);
    }
}

//! Small helpers for token handling and header parsing.

use axum::http::{
    header::{AUTHORIZATION, COOKIE},
    HeaderMap,
};
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

use super::error::Result;

/// What the `Authorization` header says, if anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BearerHeader<'a> {
    /// No header, or an empty one.
    Absent,
    /// A header that is not `Bearer <token>`.
    Malformed,
    Token(&'a str),
}

/// Create a new session token for the auth cookie.
/// The raw value is only returned to set the cookie; the backend stores a hash.
pub(crate) fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

/// Hash a session token so raw values never touch the backend.
pub(crate) fn hash_session_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    Base64UrlUnpadded::encode_string(&digest)
}

/// Compare two secrets through their digests so the comparison time does not
/// depend on how many leading bytes match.
pub(crate) fn secrets_match(presented: &str, expected: &str) -> bool {
    Sha256::digest(presented.as_bytes()) == Sha256::digest(expected.as_bytes())
}

pub(crate) fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let key = parts.next()?.trim();
            let val = parts.next()?.trim();
            (key == name && !val.is_empty()).then(|| val.to_string())
        })
}

pub(crate) fn bearer_header(headers: &HeaderMap) -> BearerHeader<'_> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return BearerHeader::Absent;
    };
    let Ok(value) = value.to_str() else {
        return BearerHeader::Malformed;
    };
    if value.is_empty() {
        return BearerHeader::Absent;
    }

    // Exactly `Bearer <token>`; no extra or trailing whitespace.
    match value.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() && !token.contains(char::is_whitespace) => {
            BearerHeader::Token(token)
        }
        _ => BearerHeader::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn generate_session_token_is_32_bytes() -> anyhow::Result<()> {
        let token = generate_session_token()?;
        let decoded = Base64UrlUnpadded::decode_vec(&token)
            .map_err(|err| anyhow::anyhow!("invalid base64: {err}"))?;
        assert_eq!(decoded.len(), 32);
        assert_ne!(token, generate_session_token()?);
        Ok(())
    }

    #[test]
    fn hash_session_token_stable() {
        let first = hash_session_token("token");
        let second = hash_session_token("token");
        let different = hash_session_token("other");
        assert_eq!(first, second);
        assert_ne!(first, different);
        assert!(!first.contains("token"));
    }

    #[test]
    fn secrets_match_only_on_equality() {
        assert!(secrets_match("s3cret", "s3cret"));
        assert!(!secrets_match("s3cret", "s3cre"));
        assert!(!secrets_match("", "s3cret"));
    }

    #[test]
    fn extract_cookie_finds_named_pair() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; _auth=abc ; x=1"));
        assert_eq!(extract_cookie(&headers, "_auth"), Some("abc".to_string()));
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }

    #[test]
    fn extract_cookie_searches_every_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(COOKIE, HeaderValue::from_static("_auth=abc"));
        assert_eq!(extract_cookie(&headers, "_auth"), Some("abc".to_string()));
    }

    #[test]
    fn extract_cookie_ignores_empty_value() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("_auth="));
        assert_eq!(extract_cookie(&headers, "_auth"), None);
    }

    #[test]
    fn bearer_header_variants() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_header(&headers), BearerHeader::Absent);

        headers.insert(AUTHORIZATION, HeaderValue::from_static(""));
        assert_eq!(bearer_header(&headers), BearerHeader::Absent);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_header(&headers), BearerHeader::Token("abc"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer"));
        assert_eq!(bearer_header(&headers), BearerHeader::Malformed);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert_eq!(bearer_header(&headers), BearerHeader::Malformed);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_header(&headers), BearerHeader::Malformed);
    }

    #[test]
    fn bearer_header_is_read_verbatim() {
        let mut headers = HeaderMap::new();
        for value in ["Bearer  abc", "Bearer abc ", "bearer abc", "Bearer\tabc", "Bearer a bc"] {
            headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
            assert_eq!(bearer_header(&headers), BearerHeader::Malformed, "{value:?}");
        }
    }
}

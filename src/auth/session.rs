//! Session cookie naming, parsing and `Set-Cookie` construction.
//!
//! Cookie format: `<name>=<jwt>; HttpOnly; SameSite=Lax; Path=/; Max-Age=<secs>[; Secure]`
//!
//! When cookies are transport-secure the name carries the `__Secure-` prefix,
//! which browsers only accept together with the `Secure` attribute. A session
//! written in development mode is therefore never read back in production
//! mode and vice versa.

use anyhow::{Context, Result};
use axum::http::{header, HeaderMap, HeaderValue};

/// Base cookie name for the session token.
pub const SESSION_COOKIE_NAME: &str = "session-token";

/// Cookie name for the session token when cookies require transport security.
pub const SECURE_SESSION_COOKIE_NAME: &str = "__Secure-session-token";

/// Cookie name to read/write for the given security mode.
pub fn session_cookie_name(secure_cookie: bool) -> &'static str {
    if secure_cookie {
        SECURE_SESSION_COOKIE_NAME
    } else {
        SESSION_COOKIE_NAME
    }
}

/// Build the `Set-Cookie` header value carrying a session token.
pub fn build_session_cookie(
    token: &str,
    max_age_secs: u64,
    secure_cookie: bool,
) -> Result<HeaderValue> {
    let secure_flag = if secure_cookie { "; Secure" } else { "" };
    let cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
        session_cookie_name(secure_cookie),
        token,
        max_age_secs,
        secure_flag
    );
    HeaderValue::from_str(&cookie).context("Session cookie is not a valid header value")
}

/// Extract a cookie value by name from a single `Cookie` header value.
pub fn extract_cookie(cookie_header: &str, name: &str) -> Option<String> {
    cookie_header.split(';').find_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        let value = value.trim();
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

/// Extract the session token from all `Cookie` headers of a request.
pub fn session_token_from_headers(headers: &HeaderMap, secure_cookie: bool) -> Option<String> {
    let name = session_cookie_name(secure_cookie);
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|raw| extract_cookie(raw, name))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_name_by_security_mode() {
        assert_eq!(session_cookie_name(false), "session-token");
        assert_eq!(session_cookie_name(true), "__Secure-session-token");
    }

    #[test]
    fn test_build_session_cookie_no_secure() {
        let cookie = build_session_cookie("tok.en.value", 604800, false).unwrap();
        let s = cookie.to_str().unwrap();
        assert!(s.starts_with("session-token=tok.en.value;"));
        assert!(s.contains("HttpOnly"));
        assert!(s.contains("SameSite=Lax"));
        assert!(s.contains("Path=/"));
        assert!(s.contains("Max-Age=604800"));
        assert!(!s.contains("Secure"), "No Secure flag in development mode");
    }

    #[test]
    fn test_build_session_cookie_with_secure() {
        let cookie = build_session_cookie("tok", 60, true).unwrap();
        let s = cookie.to_str().unwrap();
        assert!(s.starts_with("__Secure-session-token=tok;"));
        assert!(s.ends_with("; Secure"));
    }

    #[test]
    fn test_build_session_cookie_rejects_control_chars() {
        assert!(build_session_cookie("bad\nvalue", 60, false).is_err());
    }

    #[test]
    fn test_extract_cookie() {
        assert_eq!(
            extract_cookie("session-token=abc123", "session-token"),
            Some("abc123".to_string())
        );
        assert_eq!(
            extract_cookie("theme=dark; session-token=def456; other=val", "session-token"),
            Some("def456".to_string())
        );
        assert_eq!(extract_cookie("theme=dark; other=val", "session-token"), None);
        assert_eq!(extract_cookie("session-token=", "session-token"), None);
        // Prefix of another cookie name must not match
        assert_eq!(
            extract_cookie("__Secure-session-token=xyz", "session-token"),
            None
        );
    }

    #[test]
    fn test_session_token_from_multiple_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(
            header::COOKIE,
            HeaderValue::from_static("__Secure-session-token=sec; session-token=plain"),
        );

        assert_eq!(
            session_token_from_headers(&headers, true),
            Some("sec".to_string())
        );
        assert_eq!(
            session_token_from_headers(&headers, false),
            Some("plain".to_string())
        );
        assert_eq!(session_token_from_headers(&HeaderMap::new(), false), None);
    }
}

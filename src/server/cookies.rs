//! Cookie parsing and `Set-Cookie` formatting

use axum::http::{header, HeaderMap};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

/// Name of the cookie carrying the admin session token
pub const SESSION_COOKIE: &str = "claypress_session";

/// Bytes not allowed in a cookie value
const COOKIE_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b',')
    .add(b';')
    .add(b'\\');

/// All cookies sent with a request, values decoded
pub fn request_cookies(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let value = percent_decode_str(value.trim()).decode_utf8().ok()?;
            Some((name.trim().to_string(), value.into_owned()))
        })
        .collect()
}

/// One cookie by name
pub fn cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    request_cookies(headers)
        .into_iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value)
}

/// `Set-Cookie` value; `max_age` of zero expires the cookie
pub fn set_cookie(name: &str, value: &str, max_age: Option<u64>, http_only: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; SameSite=Lax",
        name,
        utf8_percent_encode(value, COOKIE_VALUE)
    );
    if let Some(max_age) = max_age {
        cookie.push_str(&format!("; Max-Age={}", max_age));
    }
    if http_only {
        cookie.push_str("; HttpOnly");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; claypress_session=abc-123"),
        );
        headers.append(header::COOKIE, HeaderValue::from_static("pw=a%3Bb"));

        assert_eq!(cookie(&headers, SESSION_COOKIE).as_deref(), Some("abc-123"));
        assert_eq!(cookie(&headers, "pw").as_deref(), Some("a;b"));
        assert_eq!(cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_set_cookie_encodes_value() {
        assert_eq!(
            set_cookie("pw", "a;b c", None, false),
            "pw=a%3Bb%20c; Path=/; SameSite=Lax"
        );
        assert_eq!(
            set_cookie(SESSION_COOKIE, "", Some(0), true),
            "claypress_session=; Path=/; SameSite=Lax; Max-Age=0; HttpOnly"
        );
    }
}

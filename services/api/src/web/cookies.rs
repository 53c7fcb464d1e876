//! services/api/src/web/cookies.rs
//!
//! Reading and writing the role session cookies.

use axum::http::{header, HeaderMap};
use school_portal_core::Role;

const EPOCH: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Returns the non-empty value of cookie `name`, searching every `Cookie` header.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name && !value.is_empty()).then_some(value)
        })
}

/// The first of `roles` whose session cookie is present, with its token.
pub fn find_session_cookie<'a>(headers: &'a HeaderMap, roles: &[Role]) -> Option<(Role, &'a str)> {
    roles
        .iter()
        .find_map(|role| read_cookie(headers, role.cookie_name()).map(|token| (*role, token)))
}

/// A `Set-Cookie` value that removes the session cookie of `role`.
pub fn clear_cookie(role: Role, secure: bool) -> String {
    let mut cookie = format!(
        "{}=; Path=/; Expires={}; Max-Age=0; HttpOnly; SameSite=Strict",
        role.cookie_name(),
        EPOCH
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(values: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for v in values {
            headers.append(header::COOKIE, HeaderValue::from_str(v).unwrap());
        }
        headers
    }

    #[test]
    fn reads_cookies_across_headers() {
        let h = headers(&["theme=dark; owner_token=abc.def", "admin_token=xyz"]);
        assert_eq!(read_cookie(&h, "owner_token"), Some("abc.def"));
        assert_eq!(read_cookie(&h, "admin_token"), Some("xyz"));
        assert_eq!(read_cookie(&h, "teacher_token"), None);
    }

    #[test]
    fn empty_and_prefixed_names_do_not_match() {
        let h = headers(&["owner_token=; xowner_token=nope"]);
        assert_eq!(read_cookie(&h, "owner_token"), None);
    }

    #[test]
    fn owner_cookie_wins_when_both_are_present() {
        let h = headers(&["admin_token=a; owner_token=o"]);
        assert_eq!(
            find_session_cookie(&h, &[Role::Owner, Role::Admin]),
            Some((Role::Owner, "o"))
        );
    }

    #[test]
    fn clearing_cookie_expires_in_the_past() {
        let dev = clear_cookie(Role::Owner, false);
        assert!(dev.starts_with("owner_token=;"));
        assert!(dev.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
        assert!(dev.contains("HttpOnly"));
        assert!(dev.contains("SameSite=Strict"));
        assert!(!dev.contains("Secure"));
        assert!(clear_cookie(Role::Admin, true).ends_with("; Secure"));
    }
}

use time::format_description::well_known::Rfc3339;
use url::Url;

use crate::token::TokenRecord;

/// Landing page with the login link.
pub(super) fn login_page(login_url: &Url, denied: bool) -> String {
    let notice = if denied {
        "<p>Sign-in was cancelled or denied. You can try again.</p>\n"
    } else {
        ""
    };
    format!(
        "<!doctype html>\n<html>\n<head><title>Sign in</title></head>\n<body>\n\
         <h1>Welcome</h1>\n{notice}<p><a href=\"{}\">Sign in</a></p>\n</body>\n</html>\n",
        escape(login_url.as_str())
    )
}

/// Protected example page.
pub(super) fn home_page(token: &TokenRecord) -> String {
    let expires = token
        .expires_at()
        .format(&Rfc3339)
        .unwrap_or_else(|_| token.expires_at().to_string());
    format!(
        "<!doctype html>\n<html>\n<head><title>Home</title></head>\n<body>\n\
         <h1>You are signed in</h1>\n<p>{} token valid until {}.</p>\n\
         <p><a href=\"/logout\">Sign out</a></p>\n</body>\n</html>\n",
        escape(token.token_type()),
        escape(&expires)
    )
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

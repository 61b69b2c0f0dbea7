use url::Url;

use crate::error::{ViewError, ViewResult};

/// Strip fragment, path and trailing slashes: `http://host:3000/x/#y` -> `http://host:3000`.
pub fn normalize_base_url(url: &str) -> String {
    let mut url = url.trim().to_string();
    if let Some(idx) = url.find('#') {
        url.truncate(idx);
    }
    if let Some(scheme_end) = url.find("://") {
        let rest = &url[scheme_end + 3..];
        if let Some(slash) = rest.find('/') {
            url.truncate(scheme_end + 3 + slash);
        }
    } else if let Some(slash) = url.find('/') {
        url.truncate(slash);
    }
    url.trim_end_matches('/').to_string()
}

fn parse_base(base: &str) -> ViewResult<Url> {
    let base = normalize_base_url(base);
    if base.is_empty() {
        return Err(ViewError::InvalidConfig("base url is empty".to_string()));
    }
    let with_scheme = if base.contains("://") {
        base
    } else {
        format!("http://{base}")
    };
    Url::parse(&with_scheme)
        .map_err(|e| ViewError::InvalidConfig(format!("invalid base url {with_scheme:?}: {e}")))
}

fn with_scheme_and_path(mut url: Url, scheme: &str, path: &str) -> ViewResult<String> {
    url.set_scheme(scheme).map_err(|_| {
        ViewError::InvalidConfig(format!("cannot switch {url} to {scheme}"))
    })?;
    url.set_path(path);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.to_string())
}

/// `ws(s)://host[:port]<path>` for any http(s) or ws(s) base.
pub fn socket_url(base: &str, path: &str) -> ViewResult<String> {
    let url = parse_base(base)?;
    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => {
            return Err(ViewError::InvalidConfig(format!(
                "unsupported scheme {other:?}"
            )));
        }
    };
    with_scheme_and_path(url, scheme, path)
}

/// `http(s)://host[:port]<path>` for any http(s) or ws(s) base.
pub fn http_url(base: &str, path: &str) -> ViewResult<String> {
    let url = parse_base(base)?;
    let scheme = match url.scheme() {
        "https" | "wss" => "https",
        "http" | "ws" => "http",
        other => {
            return Err(ViewError::InvalidConfig(format!(
                "unsupported scheme {other:?}"
            )));
        }
    };
    with_scheme_and_path(url, scheme, path)
}

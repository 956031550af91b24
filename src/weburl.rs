use url::form_urlencoded::byte_serialize;
use url::Url;

/// Placeholder icon used when a link has no usable URL to derive a
/// favicon from. Kept as a data URI so rendering never needs network.
pub const DEFAULT_FAVICON: &str = "data:image/svg+xml;utf8,<svg xmlns='http://www.w3.org/2000/svg' width='64' height='64' viewBox='0 0 64 64'><rect width='64' height='64' rx='16' fill='%23e5e2dc'/><path d='M18 20h28v24H18z' fill='%231c1b1a'/><path d='M22 24h20v4H22zM22 30h20v4H22zM22 36h14v4H22z' fill='%23f5f4f0'/></svg>";

const FAVICON_SERVICE: &str = "https://www.google.com/s2/favicons?sz=64&domain_url=";

/// Lowercase hostname with a leading `www.` stripped, or empty when
/// the value does not parse as an absolute URL with a host.
pub fn extract_domain(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(parsed) => parsed
            .host_str()
            .map(|host| host.strip_prefix("www.").unwrap_or(host).to_string())
            .unwrap_or_default(),
        Err(_) => String::new(),
    }
}

/// Third-party favicon lookup URL keyed by the link's full URL.
pub fn favicon_proxy(raw: &str) -> String {
    let encoded: String = byte_serialize(raw.as_bytes()).collect();
    format!("{FAVICON_SERVICE}{encoded}")
}

/// Icon for a link: the favicon service when a URL exists, otherwise
/// the built-in placeholder.
pub fn icon_for(raw: &str) -> String {
    if raw.is_empty() {
        DEFAULT_FAVICON.to_string()
    } else {
        favicon_proxy(raw)
    }
}

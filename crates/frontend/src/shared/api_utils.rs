//! Location of the REST API.
//!
//! By default the API is expected on port 3000 of the host that served the
//! page. Setting `api_base_url` in localStorage (e.g. from the dev tools
//! console) points the app at another server without a rebuild.

/// Port the API listens on, next to the host serving the frontend
const API_PORT: u16 = 3000;

/// localStorage key holding an explicit API base URL
const API_BASE_OVERRIDE_KEY: &str = "api_base_url";

/// Base URL for API requests, without a trailing slash.
///
/// Returns an empty string outside a browser window, which turns every
/// request into a relative one.
pub fn api_base() -> String {
    let Some(window) = web_sys::window() else {
        return String::new();
    };

    if let Some(base) = configured_base(&window) {
        return base;
    }

    let location = window.location();
    let protocol = location.protocol().unwrap_or_else(|_| "http:".to_string());
    let hostname = location
        .hostname()
        .unwrap_or_else(|_| "127.0.0.1".to_string());
    format!("{}//{}:{}", protocol, hostname, API_PORT)
}

fn configured_base(window: &web_sys::Window) -> Option<String> {
    let stored = window
        .local_storage()
        .ok()??
        .get_item(API_BASE_OVERRIDE_KEY)
        .ok()??;
    normalize_base(&stored)
}

/// Trim whitespace and trailing slashes; blank values are ignored
fn normalize_base(value: &str) -> Option<String> {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

//! Client identification for the `x-elastic-client-meta` header.

use std::sync::OnceLock;

use regex::Regex;

/// Service key for this client in the meta header.
pub const SERVICE_KEY: &str = "es";

/// Header carrying the client identification token.
pub const CLIENT_META_HEADER: &str = "x-elastic-client-meta";

fn meta_version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d+\.\d+\.\d+)\.?([a-z0-9.-]+)?$").expect("meta version pattern is valid")
    })
}

/// Compact a version for the meta header.
///
/// Pre-release versions (`8.3.0.pre`, `8.3.0-alpha1`) become `8.3.0p`;
/// anything else is returned unchanged.
pub fn client_meta_version(version: &str) -> String {
    match meta_version_regex().captures(version) {
        Some(caps) if caps.get(2).is_some() => format!("{}p", &caps[1]),
        _ => version.to_string(),
    }
}

/// `(service key, meta version)` of this crate.
pub fn service_version() -> (&'static str, String) {
    (SERVICE_KEY, client_meta_version(env!("CARGO_PKG_VERSION")))
}

/// Value for [`CLIENT_META_HEADER`], e.g. `es=8.3.0`.
pub fn client_meta_header_value() -> String {
    let (key, version) = service_version();
    format!("{}={}", key, version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pre_release_word_becomes_p() {
        assert_eq!(client_meta_version("8.3.0.pre"), "8.3.0p");
        assert_eq!(client_meta_version("8.3.0-alpha1"), "8.3.0p");
        assert_eq!(client_meta_version("8.3.0.beta.2"), "8.3.0p");
    }

    #[test]
    fn test_release_unchanged() {
        assert_eq!(client_meta_version("8.3.0"), "8.3.0");
        assert_eq!(client_meta_version("10.21.300"), "10.21.300");
    }

    #[test]
    fn test_non_matching_input_unchanged() {
        assert_eq!(client_meta_version("8.3"), "8.3");
        assert_eq!(client_meta_version("8.3.0-RC1"), "8.3.0-RC1");
        assert_eq!(client_meta_version(""), "");
    }

    #[test]
    fn test_service_version_uses_crate_version() {
        let (key, version) = service_version();
        assert_eq!(key, "es");
        assert_eq!(version, client_meta_version(env!("CARGO_PKG_VERSION")));
        assert_eq!(client_meta_header_value(), format!("es={}", version));
    }
}

/// Scheme token used in identifiers handed to and returned from callers.
pub const LOGICAL_SCHEME: &str = "webdav";

/// Scheme the HTTP transport requires.
pub const TRANSPORT_SCHEME: &str = "http";

/// Rewrite a logical `webdav://` identifier into an `http://` URL.
///
/// Anything not starting with the logical scheme (including the empty string)
/// is returned unchanged.
pub fn to_transport_scheme(uri: &str) -> String {
    swap_scheme(uri, LOGICAL_SCHEME, TRANSPORT_SCHEME)
}

/// Rewrite an `http://` URL into the logical `webdav://` form.
///
/// Anything not starting with the transport scheme (including the empty string)
/// is returned unchanged.
pub fn to_logical_scheme(uri: &str) -> String {
    swap_scheme(uri, TRANSPORT_SCHEME, LOGICAL_SCHEME)
}

fn swap_scheme(uri: &str, from: &str, to: &str) -> String {
    match uri.strip_prefix(from).and_then(|rest| rest.strip_prefix("://")) {
        Some(rest) => format!("{}://{}", to, rest),
        None => uri.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_transport_scheme() {
        assert_eq!(
            to_transport_scheme("webdav://my.server/hello/world"),
            "http://my.server/hello/world"
        );
    }

    #[test]
    fn test_to_logical_scheme() {
        assert_eq!(
            to_logical_scheme("http://my.server/hello/"),
            "webdav://my.server/hello/"
        );
    }

    #[test]
    fn test_empty_is_identity() {
        assert_eq!(to_transport_scheme(""), "");
        assert_eq!(to_logical_scheme(""), "");
    }

    #[test]
    fn test_only_prefix_is_rewritten() {
        assert_eq!(
            to_transport_scheme("webdav://host/webdav://nested"),
            "http://host/webdav://nested"
        );
        assert_eq!(
            to_logical_scheme("http://host/http://nested"),
            "webdav://host/http://nested"
        );
    }

    #[test]
    fn test_other_schemes_untouched() {
        assert_eq!(to_transport_scheme("webdavs://host/a"), "webdavs://host/a");
        assert_eq!(to_logical_scheme("https://host/a"), "https://host/a");
        assert_eq!(to_logical_scheme("relative/path"), "relative/path");
    }

    #[test]
    fn test_round_trip() {
        for uri in [
            "webdav://my.server/",
            "webdav://my.server/hello/mother/",
            "webdav://my.server/hello/file",
            "",
        ] {
            assert_eq!(to_logical_scheme(&to_transport_scheme(uri)), uri);
        }
    }
}

//! Route matching module
//!
//! Matches a request path against a route's pattern, capturing the tail of prefix routes.

/// Path pattern of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPattern {
    /// Matches this path only
    Exact(&'static str),
    /// Matches any path that starts with this prefix and has something after it.
    /// The remainder is captured as the route parameter.
    Prefix(&'static str),
}

/// Match `path` against `pattern`
///
/// Returns the captured tail for prefix patterns and an empty string for exact ones.
pub fn match_path<'p>(pattern: PathPattern, path: &'p str) -> Option<&'p str> {
    match pattern {
        PathPattern::Exact(exact) => (path == exact).then_some(""),
        PathPattern::Prefix(prefix) => path.strip_prefix(prefix).filter(|tail| !tail.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_path_exact() {
        let pattern = PathPattern::Exact("/pictures");
        assert_eq!(match_path(pattern, "/pictures"), Some(""));
        assert_eq!(match_path(pattern, "/pictures/"), None);
        assert_eq!(match_path(pattern, "/pictures/cat.jpg"), None);
    }

    #[test]
    fn test_match_path_prefix_captures_tail() {
        let pattern = PathPattern::Prefix("/pictures/");
        assert_eq!(match_path(pattern, "/pictures/cat.jpg"), Some("cat.jpg"));
        assert_eq!(
            match_path(pattern, "/pictures/thumbs/cat.jpg"),
            Some("thumbs/cat.jpg")
        );
        assert_eq!(match_path(pattern, "/pictures/"), None);
        assert_eq!(match_path(pattern, "/picturesque"), None);
    }
}

//! URL fragment utilities for the in-memory router.
//!
//! Routers hand the shell a "hash" fragment rather than a full URL. These
//! helpers normalize fragments and match them against route patterns with
//! `:param` and `*splat` segments. Pattern matching beyond that is the host
//! router's business.

/// Strips a leading `#` and surrounding whitespace from a fragment.
///
/// # Examples
///
/// ```
/// use pageshell::infrastructure::normalize_fragment;
///
/// assert_eq!(normalize_fragment("#/inbox"), "/inbox");
/// assert_eq!(normalize_fragment(" settings "), "settings");
/// assert_eq!(normalize_fragment("#"), "");
/// ```
#[must_use]
pub fn normalize_fragment(fragment: &str) -> String {
    let trimmed = fragment.trim();
    trimmed.strip_prefix('#').unwrap_or(trimmed).to_string()
}

/// Matches `fragment` against `pattern`, returning the captured arguments.
///
/// Segments are separated by `/`. A `:name` segment captures exactly one
/// segment and a `*name` segment captures the remainder of the fragment
/// (possibly empty). Any other segment must match literally.
///
/// # Returns
///
/// `Some(args)` in capture order when the fragment matches, `None` otherwise.
///
/// # Examples
///
/// ```
/// use pageshell::infrastructure::match_pattern;
///
/// assert_eq!(match_pattern("users/:id", "users/42"), Some(vec!["42".to_string()]));
/// assert_eq!(match_pattern("files/*path", "files/a/b.txt"), Some(vec!["a/b.txt".to_string()]));
/// assert_eq!(match_pattern("/a", "/a"), Some(vec![]));
/// assert_eq!(match_pattern("/a", "/b"), None);
/// ```
#[must_use]
pub fn match_pattern(pattern: &str, fragment: &str) -> Option<Vec<String>> {
    let pattern = normalize_fragment(pattern);
    let fragment = normalize_fragment(fragment);

    let mut args = Vec::new();
    let mut remaining = fragment.split('/');

    for segment in pattern.split('/') {
        if segment.starts_with('*') {
            let rest: Vec<&str> = remaining.by_ref().collect();
            args.push(rest.join("/"));
            return Some(args);
        }

        let candidate = remaining.next()?;
        if segment.starts_with(':') {
            if candidate.is_empty() {
                return None;
            }
            args.push(candidate.to_string());
        } else if segment != candidate {
            return None;
        }
    }

    if remaining.next().is_some() {
        return None;
    }

    Some(args)
}

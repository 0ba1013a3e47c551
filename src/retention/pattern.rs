//! Filename glob matching.
//!
//! The sweeper selects directory entries the way a shell glob such as
//! `dir/*.log` does: `*`, `?`, bracket classes and backslash escapes, with the
//! usual rule that a wildcard never matches a leading `.` (hidden entries).
//! Matching works on the raw encoded bytes of the name, so non-UTF-8 file
//! names are handled without lossy conversion.

use std::ffi::OsStr;

/// The pattern both retention passes care about.
pub const LOG_PATTERN: &str = "*.log";

/// A compiled filename glob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobPattern {
    pattern: String,
}

impl GlobPattern {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
        }
    }

    /// The pattern as originally given.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Tests a single path component against the pattern.
    pub fn matches(&self, name: &OsStr) -> bool {
        let name = name.as_encoded_bytes();

        if name.first() == Some(&b'.') && !self.pattern.starts_with('.') {
            return false;
        }

        match_bytes(self.pattern.as_bytes(), name)
    }
}

impl Default for GlobPattern {
    fn default() -> Self {
        Self::new(LOG_PATTERN)
    }
}

/// Greedy match with single-star backtracking.
///
/// Every non-`*` element consumes exactly one byte, so on a mismatch it is
/// enough to retry from the most recent `*` with one more byte swallowed.
/// Runs in `O(pattern * text)` however many stars the pattern holds.
fn match_bytes(pattern: &[u8], text: &[u8]) -> bool {
    let (mut p, mut t) = (0, 0);
    // Pattern index after the last `*`, and the text index it resumes at
    let mut star: Option<(usize, usize)> = None;

    while p < pattern.len() || t < text.len() {
        if p < pattern.len() {
            if pattern[p] == b'*' {
                star = Some((p + 1, t));
                p += 1;
                continue;
            }
            if let Some(&c) = text.get(t) {
                if let Some(width) = match_one(&pattern[p..], c) {
                    p += width;
                    t += 1;
                    continue;
                }
            }
        }

        match star {
            Some((resume, from)) if from < text.len() => {
                star = Some((resume, from + 1));
                p = resume;
                t = from + 1;
            }
            _ => return false,
        }
    }

    true
}

/// Matches one byte against the element at the head of `pattern`, returning
/// how many pattern bytes the element spans.
fn match_one(pattern: &[u8], c: u8) -> Option<usize> {
    match pattern {
        [b'?', ..] => Some(1),
        [b'[', class @ ..] => match match_class(class, c) {
            Some((matched, after)) => matched.then(|| pattern.len() - after.len()),
            // Unterminated class: treat '[' literally.
            None => (c == b'[').then_some(1),
        },
        [b'\\', escaped, ..] => (*escaped == c).then_some(2),
        [literal, ..] => (*literal == c).then_some(1),
        [] => None,
    }
}

/// Matches `c` against a bracket class whose body starts at `class` (just
/// after the opening `[`). Returns whether it matched and the pattern
/// remaining after the closing `]`, or `None` if the class is unterminated.
fn match_class(class: &[u8], c: u8) -> Option<(bool, &[u8])> {
    let (negate, mut body) = match class.first() {
        Some(b'!') | Some(b'^') => (true, &class[1..]),
        _ => (false, class),
    };

    let mut matched = false;
    let mut first = true;

    loop {
        match body {
            [] => return None,
            // A ']' right after the opening bracket is a literal member.
            [b']', rest @ ..] if !first => return Some((matched != negate, rest)),
            [lo, b'-', hi, rest @ ..] if *hi != b']' => {
                if (*lo..=*hi).contains(&c) {
                    matched = true;
                }
                body = rest;
            }
            [member, rest @ ..] => {
                if *member == c {
                    matched = true;
                }
                body = rest;
            }
        }
        first = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(pattern: &str, name: &str) -> bool {
        GlobPattern::new(pattern).matches(OsStr::new(name))
    }

    #[test]
    fn test_log_suffix() {
        assert!(m("*.log", "a.log"));
        assert!(m("*.log", "fatal-errors-2024-01-01-abc123.log"));
        assert!(m("*.log", "archive.log"));
        assert!(!m("*.log", "a.log.gz"));
        assert!(!m("*.log", "a.txt"));
        assert!(!m("*.log", "log"));
        assert!(!m("*.log", "a.LOG"));
    }

    #[test]
    fn test_hidden_names_not_matched_by_wildcard() {
        assert!(!m("*.log", ".hidden.log"));
        assert!(!m("*.log", ".log"));
        assert!(m(".*.log", ".hidden.log"));
    }

    #[test]
    fn test_question_mark_and_classes() {
        assert!(m("h?llo", "hello"));
        assert!(!m("h?llo", "hllo"));
        assert!(m("h[ae]llo", "hallo"));
        assert!(!m("h[ae]llo", "hillo"));
        assert!(m("file-[0-9].log", "file-7.log"));
        assert!(!m("file-[!0-9].log", "file-7.log"));
        assert!(m("file-[^0-9].log", "file-x.log"));
        assert!(m("[]]x", "]x"));
    }

    #[test]
    fn test_unterminated_class_is_literal() {
        assert!(m("a[b", "a[b"));
        assert!(!m("a[b", "ab"));
    }

    #[test]
    fn test_escape() {
        assert!(m(r"\*.log", "*.log"));
        assert!(!m(r"\*.log", "a.log"));
    }

    #[test]
    fn test_stars_backtrack() {
        assert!(m("*a*b*.log", "xaybz.log"));
        assert!(m("**.log", "a.log"));
        assert!(m("*", "anything"));
        assert!(!m("*a*b", "ba"));
        assert!(m("*[0-9]*.log", "app-2024.log"));
    }

    #[test]
    fn test_many_stars_stay_fast() {
        let name = "a".repeat(64);
        let pattern = format!("{}b", "*a".repeat(24));
        let start = std::time::Instant::now();
        assert!(!m(&pattern, &name));
        assert!(start.elapsed() < std::time::Duration::from_secs(1));
    }

    #[test]
    fn test_default_is_log_pattern() {
        assert_eq!(GlobPattern::default().as_str(), LOG_PATTERN);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names() {
        use std::os::unix::ffi::OsStrExt;

        let pattern = GlobPattern::default();
        assert!(pattern.matches(OsStr::from_bytes(b"caf\xe9.log")));
        assert!(!pattern.matches(OsStr::from_bytes(b"caf\xe9.txt")));
    }
}

//-
// Copyright (c) 2026, The Pigeonhole Developers
//
// This file is part of Pigeonhole.
//
// Pigeonhole is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Pigeonhole is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without  even the implied  warranty of MERCHANTABILITY  or FITNESS
// FOR  A PARTICULAR  PURPOSE.  See the  GNU General  Public  License for  more
// details.
//
// You should have received a copy of the GNU General Public License along with
// Pigeonhole. If not, see <http://www.gnu.org/licenses/>.

/// Given a raw mailbox path, emit the parts that comprise the actual path.
///
/// This accounts for the path delimiter, empty segments, and the required
/// case-insensitivity of the root `inbox` mailbox.
///
/// It does not check for name safety.
pub fn parse_mailbox_path(
    path: &str,
    delimiter: char,
) -> impl Iterator<Item = &str> + '_ {
    path.split(delimiter)
        .filter(|s| !s.is_empty())
        .enumerate()
        .map(|(ix, s)| {
            if 0 == ix && "inbox".eq_ignore_ascii_case(s) {
                "INBOX"
            } else {
                s
            }
        })
}

/// Normalise `path` into the canonical form under which mailboxes are
/// stored.
pub fn normalise_mailbox_name(path: &str, delimiter: char) -> String {
    let mut ret = String::with_capacity(path.len());
    for (ix, part) in parse_mailbox_path(path, delimiter).enumerate() {
        if ix > 0 {
            ret.push(delimiter);
        }
        ret.push_str(part);
    }
    ret
}

/// Return whether `name` may be used to create a mailbox.
///
/// Names must be non-empty after normalisation and may not contain the IMAP
/// wildcard characters, since those could never be matched literally by
/// `LIST`.
pub fn is_safe_mailbox_name(name: &str, delimiter: char) -> bool {
    !normalise_mailbox_name(name, delimiter).is_empty()
        && !name.contains(|c| '%' == c || '*' == c || c < ' ')
}

/// Return the names of every ancestor of `name`, outermost first.
pub fn ancestors(name: &str, delimiter: char) -> Vec<&str> {
    name.match_indices(delimiter)
        .map(|(ix, _)| &name[..ix])
        .filter(|s| !s.is_empty())
        .collect()
}

/// Creates a predicate which identifies which normalised mailbox names match
/// any element of `patterns`, with pattern matching performed as per RFC 3501.
///
/// Each pattern is first normalised by `parse_mailbox_path`.
///
/// This design means that any `LIST` operation needs to fetch all mailboxes
/// and then narrow it down. The semantics of `*`, particularly the fact that
/// it's permitted in the _middle_ of the path, preclude filtering while
/// walking the hierarchy in any sane way.
pub fn mailbox_path_matcher<'a>(
    patterns: impl IntoIterator<Item = &'a str>,
    delimiter: char,
) -> impl Fn(&str) -> bool + 'a {
    let delim_rx = regex::escape(&delimiter.to_string());

    let mut rx = "^(".to_owned();
    for (pattern_ix, pattern) in patterns.into_iter().enumerate() {
        if pattern_ix > 0 {
            rx.push('|');
        }

        for (part_ix, part) in parse_mailbox_path(pattern, delimiter).enumerate()
        {
            if part_ix > 0 {
                rx.push_str(&delim_rx);
            }

            let mut start = 0;
            for end in part
                .match_indices(|c| '%' == c || '*' == c)
                .map(|(ix, _)| ix)
                .chain(part.len()..=part.len())
            {
                let chunk = &part[start..end];
                start = (end + 1).min(part.len());

                rx.push_str(&regex::escape(chunk));
                match part.get(end..end + 1) {
                    Some("*") => rx.push_str(".*"),
                    Some("%") => {
                        rx.push_str("[^");
                        rx.push_str(&delim_rx);
                        rx.push_str("]*");
                    }
                    _ => (),
                }
            }
        }
    }
    rx.push_str(")$");

    let rx = regex::Regex::new(&rx).expect("Built invalid regex?");
    move |s| rx.is_match(s)
}

#[cfg(test)]
mod test {
    use std::iter;

    use super::*;

    #[test]
    fn test_parse_mailbox_path() {
        fn p(p: &'static str) -> Vec<&'static str> {
            parse_mailbox_path(p, '/').collect()
        }

        assert_eq!(vec!["INBOX"], p("inbox"));
        assert_eq!(vec!["INBOX", "foo"], p("Inbox/foo"));
        assert_eq!(vec!["bar"], p("/bar"));
        assert_eq!(vec!["bar"], p("bar/"));
        assert_eq!(vec!["foo", "bar"], p("foo//bar"));
        assert_eq!(vec!["foo", "InBoX"], p("foo/InBoX"));

        assert_eq!(
            vec!["INBOX", "a/b"],
            parse_mailbox_path("inbox.a/b", '.').collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_normalise_and_safety() {
        assert_eq!("INBOX/Sent", normalise_mailbox_name("inbox//Sent/", '/'));
        assert_eq!("", normalise_mailbox_name("///", '/'));
        assert!(is_safe_mailbox_name("Archive/2020", '/'));
        assert!(!is_safe_mailbox_name("", '/'));
        assert!(!is_safe_mailbox_name("/", '/'));
        assert!(!is_safe_mailbox_name("foo*", '/'));
        assert!(!is_safe_mailbox_name("foo%bar", '/'));
    }

    #[test]
    fn test_ancestors() {
        assert!(ancestors("foo", '/').is_empty());
        assert_eq!(vec!["a", "a/b"], ancestors("a/b/c", '/'));
        assert_eq!(vec!["a"], ancestors("a.b", '.'));
    }

    #[test]
    fn test_mailbox_patterns() {
        fn matches(pat: &str, mb: &str) -> bool {
            mailbox_path_matcher(iter::once(pat), '/')(mb)
        }

        assert!(matches("*", "INBOX"));
        assert!(matches("%", "INBOX"));

        assert!(matches("INB*X", "INBOX"));
        assert!(matches("INB*X", "INB/BOX"));
        assert!(!matches("INB*X", "INBOX/plugh"));
        assert!(!matches("INB*X", "foo/INBOX"));
        assert!(matches("INB%X", "INBOX"));
        assert!(!matches("INB%X", "INB/BOX"));
        assert!(!matches("INB%X", "INBOX/plugh"));

        assert!(matches("INB*", "INBOX"));
        assert!(matches("INB*", "INBOX/plugh"));
        assert!(matches("INB%", "INBOX"));
        assert!(!matches("INB%", "INBOX/plugh"));
        assert!(!matches("INB%", "foo/INBOX"));

        assert!(matches("foo/bar", "foo/bar"));
        assert!(!matches("foo/bar", "foo/bar/baz"));
        assert!(!matches("foo/*", "foo"));
        assert!(matches("foo/*", "foo/bar/baz"));
        assert!(matches("foo/%", "foo/bar"));
        assert!(!matches("foo/%", "foo/bar/baz"));

        assert!(matches("inbox", "INBOX"));
    }

    #[test]
    fn test_mailbox_patterns_dot_delimiter() {
        fn matches(pat: &str, mb: &str) -> bool {
            mailbox_path_matcher(iter::once(pat), '.')(mb)
        }

        assert!(matches("foo.%", "foo.bar"));
        assert!(!matches("foo.%", "foo.bar.baz"));
        assert!(matches("foo.*", "foo.bar.baz"));
        // The dot must not act as a regex wildcard
        assert!(!matches("foo.bar", "fooxbar"));
    }
}

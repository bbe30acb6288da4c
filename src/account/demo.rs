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


//! Loading of demo data into a `MemoryStore`.
//!
//! The data directory contains one directory per mailbox; nested directories
//! are child mailboxes. Each regular file in a mailbox directory is one
//! message, taken in file name order, and consists of:
//!
//! - A line of space-separated flags. `\Recent` marks the message as not yet
//!   seen by any session.
//! - A line holding the internal date as a UNIX timestamp.
//! - The raw message.
//!
//! A file named `.readonly` marks the mailbox read-only. Other files whose
//! names start with `.` are ignored.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::prelude::*;
use log::{info, warn};

use super::memory::MemoryStore;
use super::model::*;
use super::store::*;
use crate::support::error::Error;

/// Create a `MemoryStore` populated from the demo data directory at `root`.
pub fn load_demo_data(
    root: &Path,
    delimiter: char,
    log_prefix: String,
) -> Result<MemoryStore, Error> {
    let store = MemoryStore::new(delimiter, log_prefix.clone());
    load_dir(&store, root, None, &log_prefix)?;
    Ok(store)
}

fn load_dir(
    store: &MemoryStore,
    dir: &Path,
    parent: Option<&str>,
    log_prefix: &str,
) -> Result<(), Error> {
    let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        if !entry.file_type()?.is_dir() {
            continue;
        }

        let file_name = entry.file_name();
        let file_name = match file_name.to_str() {
            Some(n) if !n.starts_with('.') => n.to_owned(),
            _ => {
                warn!(
                    "{} Ignoring demo directory {}",
                    log_prefix,
                    entry.path().display()
                );
                continue;
            }
        };

        let name = match parent {
            Some(parent) => format!("{}{}{}", parent, store.delimiter(), file_name),
            None => file_name,
        };
        let mailbox = store.get_mailbox(&name, true)?;
        let count = load_messages(&mailbox, &entry.path())?;
        if entry.path().join(".readonly").is_file() {
            store.set_read_only(mailbox.name(), true)?;
        }
        info!(
            "{} Loaded {} messages into {}",
            log_prefix,
            count,
            mailbox.name()
        );

        load_dir(store, &entry.path(), Some(mailbox.name()), log_prefix)?;
    }

    Ok(())
}

fn load_messages(mailbox: &impl Mailbox, dir: &Path) -> Result<usize, Error> {
    let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.file_name());

    let mut count = 0;
    for entry in entries {
        if !entry.file_type()?.is_file()
            || entry.file_name().to_string_lossy().starts_with('.')
        {
            continue;
        }

        let (message, recent) = parse_message_file(&fs::read(entry.path())?)
            .map_err(|e| {
                Error::Storage(
                    format!("{}: {}", entry.path().display(), e).into(),
                )
            })?;
        mailbox.add(message, recent)?;
        count += 1;
    }

    Ok(count)
}

fn parse_message_file(raw: &[u8]) -> Result<(NewMessage, bool), String> {
    let mut lines = raw.splitn(3, |&b| b'\n' == b);
    let flags_line = lines.next().unwrap_or(&[]);
    let date_line = lines.next().ok_or("missing internal date line")?;
    let data = lines.next().unwrap_or(&[]);

    let mut permanent_flags = FlagSet::new();
    let mut recent = false;
    for flag in String::from_utf8_lossy(flags_line).split_whitespace() {
        match flag.parse::<Flag>() {
            Ok(Flag::Recent) => recent = true,
            Ok(flag) => {
                permanent_flags.insert(flag);
            }
            Err(e) => return Err(format!("bad flag {:?}: {}", flag, e)),
        }
    }

    let timestamp = String::from_utf8_lossy(date_line)
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("bad internal date: {}", e))?;
    let internal_date = Utc
        .timestamp_opt(timestamp, 0)
        .single()
        .ok_or("internal date out of range")?;

    Ok((
        NewMessage {
            data: Arc::new(data.to_vec()),
            permanent_flags,
            internal_date,
        },
        recent,
    ))
}

#[cfg(test)]
mod test {
    use tempfile::TempDir;

    use super::*;

    fn write(root: &Path, path: &str, content: &str) {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn load_demo_tree() {
        let root = TempDir::new().unwrap();
        write(
            root.path(),
            "INBOX/01",
            "\\Seen \\Recent\n1577836800\nSubject: hello\r\n\r\nhi\r\n",
        );
        write(root.path(), "INBOX/02", "\n1577836900\nSubject: two\r\n\r\n");
        write(root.path(), "Lists/rust/01", "$Junk\n1577836800\nbody");
        write(root.path(), "Lists/rust/.readonly", "");
        write(root.path(), "Lists/.hidden", "ignored");

        let store =
            load_demo_data(root.path(), '/', "demo".to_owned()).unwrap();
        assert_eq!(
            vec!["INBOX", "Lists", "Lists/rust"],
            store.list_mailboxes().unwrap()
        );

        let inbox = store.get_mailbox("INBOX", false).unwrap();
        assert_eq!(1, inbox.uid_validity());
        let messages: Vec<_> = inbox.messages().unwrap().collect();
        assert_eq!(2, messages.len());
        assert!(messages[0].recent);
        assert!(messages[0].permanent_flags.contains(&Flag::Seen));
        assert!(!messages[0].permanent_flags.contains(&Flag::Recent));
        assert_eq!(
            Utc.ymd(2020, 1, 1).and_hms(0, 0, 0),
            messages[0].internal_date
        );
        assert!(messages[0].data.starts_with(b"Subject: hello"));
        assert!(!messages[1].recent);

        let rust = store.get_mailbox("Lists/rust", false).unwrap();
        assert!(rust.read_only());
        assert!(!store.get_mailbox("Lists", false).unwrap().read_only());
        assert_eq!(1, rust.messages().unwrap().count());
    }

    #[test]
    fn reject_bad_message_file() {
        let root = TempDir::new().unwrap();
        write(root.path(), "INBOX/01", "\\Bogus\n0\n");
        assert_matches!(
            Err(Error::Storage(_)),
            load_demo_data(root.path(), '/', "demo".to_owned())
        );

        let root = TempDir::new().unwrap();
        write(root.path(), "INBOX/01", "\\Seen\nyesterday\n");
        assert_matches!(
            Err(Error::Storage(_)),
            load_demo_data(root.path(), '/', "demo".to_owned())
        );
    }
}

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


//! A complete `MailboxStore` held entirely in memory.
//!
//! This backs the tests and the demo binary. The mailbox table is guarded by
//! one lock and the contents of each mailbox by another, and every method
//! holds the relevant lock for its whole duration, so each call is atomic
//! from the perspective of the session engine.
//!
//! Handles resolve to the mailbox's data at the time of resolution. After a
//! rename or deletion, old handles keep working against the detached data
//! but the old name no longer resolves, which is how selected views notice.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering::SeqCst};
use std::sync::{Arc, Mutex};

use log::info;

use super::model::*;
use super::notify::ChangeSignal;
use super::selected::SelectionRegistry;
use super::store::*;
use crate::support::error::Error;
use crate::support::mailbox_paths::*;

#[derive(Debug)]
struct Contents {
    messages: BTreeMap<Uid, StoredMessage>,
    next_uid: Option<Uid>,
}

#[derive(Debug)]
struct MailboxData {
    uid_validity: u32,
    read_only: AtomicBool,
    contents: Mutex<Contents>,
    signal: ChangeSignal,
    selected: SelectionRegistry,
}

impl MailboxData {
    fn new(uid_validity: u32) -> Arc<Self> {
        Arc::new(MailboxData {
            uid_validity,
            read_only: AtomicBool::new(false),
            contents: Mutex::new(Contents {
                messages: BTreeMap::new(),
                next_uid: Some(Uid::MIN),
            }),
            signal: ChangeSignal::new(),
            selected: SelectionRegistry::new(),
        })
    }
}

#[derive(Debug)]
struct Hierarchy {
    mailboxes: BTreeMap<String, Arc<MailboxData>>,
    subscribed: BTreeSet<String>,
    next_uid_validity: u32,
}

impl Hierarchy {
    fn create(&mut self, name: String) -> Arc<MailboxData> {
        let data = MailboxData::new(self.next_uid_validity);
        self.next_uid_validity = self.next_uid_validity.wrapping_add(1).max(1);
        self.mailboxes.insert(name, Arc::clone(&data));
        data
    }
}

/// An account whose mailboxes live only in memory.
#[derive(Debug)]
pub struct MemoryStore {
    delimiter: char,
    log_prefix: String,
    hierarchy: Mutex<Hierarchy>,
}

impl MemoryStore {
    /// Create a store containing only an empty `INBOX`, with UID validity 1.
    pub fn new(delimiter: char, log_prefix: String) -> Self {
        let mut hierarchy = Hierarchy {
            mailboxes: BTreeMap::new(),
            subscribed: BTreeSet::new(),
            next_uid_validity: 1,
        };
        hierarchy.create("INBOX".to_owned());

        MemoryStore {
            delimiter,
            log_prefix,
            hierarchy: Mutex::new(hierarchy),
        }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    fn normalise(&self, name: &str) -> String {
        normalise_mailbox_name(name, self.delimiter)
    }

    fn check_name(&self, name: &str) -> Result<String, Error> {
        if is_safe_mailbox_name(name, self.delimiter) {
            Ok(self.normalise(name))
        } else {
            Err(Error::UnsafeName)
        }
    }

    /// Mark the mailbox called `name` as read-only or writable.
    pub fn set_read_only(&self, name: &str, read_only: bool) -> Result<(), Error> {
        let hierarchy = self.hierarchy.lock().unwrap();
        let data = hierarchy
            .mailboxes
            .get(&self.normalise(name))
            .ok_or(Error::NxMailbox)?;
        data.read_only.store(read_only, SeqCst);
        Ok(())
    }
}

impl MailboxStore for MemoryStore {
    type Mailbox = MemoryMailbox;

    fn get_mailbox(
        &self,
        name: &str,
        try_create: bool,
    ) -> Result<MemoryMailbox, Error> {
        let name = self.normalise(name);
        let mut hierarchy = self.hierarchy.lock().unwrap();
        let data = match hierarchy.mailboxes.get(&name) {
            Some(data) => Arc::clone(data),
            None if try_create => {
                let name = self.check_name(&name)?;
                info!("{} Auto-creating mailbox {}", self.log_prefix, name);
                hierarchy.create(name.clone())
            }
            None => return Err(Error::NxMailbox),
        };

        Ok(MemoryMailbox { name, data })
    }

    fn add_mailbox(&self, name: &str) -> Result<MemoryMailbox, Error> {
        let name = self.check_name(name)?;
        let mut hierarchy = self.hierarchy.lock().unwrap();
        if hierarchy.mailboxes.contains_key(&name) {
            return Err(Error::MailboxExists);
        }

        let data = hierarchy.create(name.clone());
        info!(
            "{} Created mailbox {} with UID validity {}",
            self.log_prefix, name, data.uid_validity
        );
        Ok(MemoryMailbox { name, data })
    }

    fn remove_mailbox(&self, name: &str) -> Result<(), Error> {
        let name = self.normalise(name);
        if "INBOX" == name {
            return Err(Error::BadOperationOnInbox);
        }

        let data = self
            .hierarchy
            .lock()
            .unwrap()
            .mailboxes
            .remove(&name)
            .ok_or(Error::NxMailbox)?;
        info!("{} Deleted mailbox {}", self.log_prefix, name);
        data.signal.notify_all();
        Ok(())
    }

    fn rename_mailbox(&self, before: &str, after: &str) -> Result<(), Error> {
        let before = self.normalise(before);
        let after = self.check_name(after)?;
        let mut hierarchy = self.hierarchy.lock().unwrap();

        if !hierarchy.mailboxes.contains_key(&before) {
            return Err(Error::NxMailbox);
        }

        if "INBOX" == before {
            // Renaming INBOX moves its messages to a new mailbox and leaves
            // INBOX itself in place, but empty.
            if hierarchy.mailboxes.contains_key(&after) {
                return Err(Error::MailboxExists);
            }

            let inbox = Arc::clone(&hierarchy.mailboxes["INBOX"]);
            let moved = hierarchy.create(after.clone());
            {
                let mut src = inbox.contents.lock().unwrap();
                let mut dst = moved.contents.lock().unwrap();
                dst.messages = std::mem::replace(&mut src.messages, BTreeMap::new());
                dst.next_uid = src.next_uid;
            }
            inbox.signal.notify_all();
            info!(
                "{} Moved contents of INBOX into {}",
                self.log_prefix, after
            );
            return Ok(());
        }

        let child_prefix = format!("{}{}", before, self.delimiter);
        let moving: Vec<String> = hierarchy
            .mailboxes
            .keys()
            .filter(|n| **n == before || n.starts_with(&child_prefix))
            .cloned()
            .collect();
        let renamed: Vec<String> = moving
            .iter()
            .map(|n| format!("{}{}", after, &n[before.len()..]))
            .collect();

        if renamed.iter().any(|n| {
            hierarchy.mailboxes.contains_key(n) && !moving.contains(n)
        }) {
            return Err(Error::MailboxExists);
        }

        let datas: Vec<Arc<MailboxData>> = moving
            .iter()
            .filter_map(|n| hierarchy.mailboxes.remove(n))
            .collect();
        for (name, data) in renamed.into_iter().zip(datas) {
            data.selected.clear();
            data.signal.notify_all();
            hierarchy.mailboxes.insert(name, data);
        }

        info!(
            "{} Renamed {} to {} ({} mailboxes)",
            self.log_prefix,
            before,
            after,
            moving.len()
        );
        Ok(())
    }

    fn list_mailboxes(&self) -> Result<Vec<String>, Error> {
        Ok(self
            .hierarchy
            .lock()
            .unwrap()
            .mailboxes
            .keys()
            .cloned()
            .collect())
    }

    fn list_subscribed(&self) -> Result<Vec<String>, Error> {
        Ok(self
            .hierarchy
            .lock()
            .unwrap()
            .subscribed
            .iter()
            .cloned()
            .collect())
    }

    fn set_subscribed(
        &self,
        name: &str,
        subscribed: bool,
    ) -> Result<(), Error> {
        let name = self.check_name(name)?;
        let mut hierarchy = self.hierarchy.lock().unwrap();
        if subscribed {
            hierarchy.subscribed.insert(name);
        } else {
            hierarchy.subscribed.remove(&name);
        }
        Ok(())
    }
}

/// A handle on one mailbox of a `MemoryStore`.
#[derive(Debug, Clone)]
pub struct MemoryMailbox {
    name: String,
    data: Arc<MailboxData>,
}

impl Mailbox for MemoryMailbox {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_only(&self) -> bool {
        self.data.read_only.load(SeqCst)
    }

    fn uid_validity(&self) -> u32 {
        self.data.uid_validity
    }

    fn next_uid(&self) -> Uid {
        self.data
            .contents
            .lock()
            .unwrap()
            .next_uid
            .unwrap_or(Uid::MAX)
    }

    fn change_signal(&self) -> &ChangeSignal {
        &self.data.signal
    }

    fn selected_set(&self) -> &SelectionRegistry {
        &self.data.selected
    }

    fn messages<'a>(
        &'a self,
    ) -> Result<Box<dyn Iterator<Item = StoredMessage> + 'a>, Error> {
        let messages: Vec<StoredMessage> = self
            .data
            .contents
            .lock()
            .unwrap()
            .messages
            .values()
            .cloned()
            .collect();
        Ok(Box::new(messages.into_iter()))
    }

    fn get(&self, uid: Uid) -> Result<Option<StoredMessage>, Error> {
        Ok(self
            .data
            .contents
            .lock()
            .unwrap()
            .messages
            .get(&uid)
            .cloned())
    }

    fn add(&self, message: NewMessage, recent: bool) -> Result<Uid, Error> {
        let mut contents = self.data.contents.lock().unwrap();
        let uid = contents.next_uid.ok_or(Error::MailboxFull)?;
        contents.next_uid = uid.next();
        contents.messages.insert(
            uid,
            StoredMessage {
                uid,
                permanent_flags: message.permanent_flags,
                recent,
                internal_date: message.internal_date,
                data: message.data,
            },
        );
        Ok(uid)
    }

    fn delete(&self, uid: Uid) -> Result<bool, Error> {
        Ok(self
            .data
            .contents
            .lock()
            .unwrap()
            .messages
            .remove(&uid)
            .is_some())
    }

    fn claim_recent(&self) -> Result<Vec<Uid>, Error> {
        let mut contents = self.data.contents.lock().unwrap();
        let mut claimed = Vec::new();
        for message in contents.messages.values_mut() {
            if message.recent {
                message.recent = false;
                claimed.push(message.uid);
            }
        }
        Ok(claimed)
    }

    fn save_flags(&self, messages: &[StoredMessage]) -> Result<(), Error> {
        let mut contents = self.data.contents.lock().unwrap();
        for message in messages {
            if let Some(existing) = contents.messages.get_mut(&message.uid) {
                existing.permanent_flags = message.permanent_flags.clone();
                existing.recent = message.recent;
            }
        }
        Ok(())
    }
}

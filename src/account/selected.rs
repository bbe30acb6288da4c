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


//! Per-session views of selected mailboxes.
//!
//! A `SelectedView` is owned exclusively by the session that selected the
//! mailbox. The only part of it any other session may touch is its
//! `ViewShared`, which holds the session-local flags (chiefly `\Recent`) and
//! is what the mailbox's `SelectionRegistry` refers to. This is what allows
//! an `APPEND` or `COPY` performed by one session to hand the recency of the
//! new message to a different session that has the destination selected,
//! without that session's membership state being touched concurrently.
//!
//! The registry only holds weak references, so a view which is dropped
//! simply disappears from it.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering::SeqCst};
use std::sync::{Arc, Mutex, Weak};

use log::{debug, info};

use super::model::*;

static SELECTION_SERNO: AtomicU64 = AtomicU64::new(0);

/// Flags which exist only within one session, keyed by UID.
#[derive(Clone, Debug, Default)]
pub struct SessionFlags {
    flags: BTreeMap<Uid, FlagSet>,
}

impl SessionFlags {
    /// Return the session flags on `uid`.
    pub fn get(&self, uid: Uid) -> FlagSet {
        self.flags.get(&uid).cloned().unwrap_or_default()
    }

    /// Mark `uid` as recent within this session.
    pub fn add_recent(&mut self, uid: Uid) {
        self.flags.entry(uid).or_default().insert(Flag::Recent);
    }

    pub fn is_recent(&self, uid: Uid) -> bool {
        self.flags
            .get(&uid)
            .map_or(false, |f| f.contains(&Flag::Recent))
    }

    /// Apply `op` with `given` to the session flags of `uid`.
    ///
    /// `\Recent` is never altered by this call, whatever `given` and `op`
    /// say.
    pub fn update(&mut self, uid: Uid, op: FlagOp, given: &FlagSet) {
        let mut given = given.clone();
        given.remove(&Flag::Recent);

        let current = self.flags.remove(&uid).unwrap_or_default();
        let recent = current.contains(&Flag::Recent);
        let mut new = op.apply(&current, &given);
        if recent {
            new.insert(Flag::Recent);
        } else {
            new.remove(&Flag::Recent);
        }

        if !new.is_empty() {
            self.flags.insert(uid, new);
        }
    }

    /// Return every UID which is recent in this session.
    pub fn recent_uids(&self) -> BTreeSet<Uid> {
        self.flags
            .iter()
            .filter(|&(_, f)| f.contains(&Flag::Recent))
            .map(|(&uid, _)| uid)
            .collect()
    }

    /// Iterate over every UID with session flags, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (Uid, &FlagSet)> + '_ {
        self.flags.iter().map(|(&uid, flags)| (uid, flags))
    }

    fn retain(&mut self, mut keep: impl FnMut(Uid) -> bool) {
        let dead: Vec<Uid> =
            self.flags.keys().copied().filter(|&uid| !keep(uid)).collect();
        for uid in dead {
            self.flags.remove(&uid);
        }
    }
}

/// The part of a `SelectedView` that other sessions can reach through the
/// mailbox's `SelectionRegistry`.
#[derive(Debug)]
pub struct ViewShared {
    serial: u64,
    name: String,
    read_only: bool,
    session_flags: Mutex<SessionFlags>,
}

impl ViewShared {
    /// The name of the mailbox as it was when the view selected it.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    /// Claim the recency of `uid` for this view's session.
    pub fn add_recent(&self, uid: Uid) {
        self.session_flags.lock().unwrap().add_recent(uid);
    }

    /// Run `f` against the session flags of this view.
    pub fn with_session_flags<R>(
        &self,
        f: impl FnOnce(&mut SessionFlags) -> R,
    ) -> R {
        f(&mut self.session_flags.lock().unwrap())
    }
}

/// Tracks which views currently have a mailbox selected.
#[derive(Debug, Default)]
pub struct SelectionRegistry {
    views: Mutex<Vec<Weak<ViewShared>>>,
}

impl SelectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `view` has selected the owning mailbox.
    pub fn register(&self, view: &SelectedView) {
        let mut views = self.views.lock().unwrap();
        views.retain(|v| v.strong_count() > 0);
        views.push(Arc::downgrade(&view.shared));
    }

    /// Return the writable view which most recently selected the mailbox
    /// under `name` and is still alive, if there is one.
    ///
    /// Views which selected the mailbox under a name it no longer has are
    /// never returned.
    pub fn any_selected(&self, name: &str) -> Option<Arc<ViewShared>> {
        let mut views = self.views.lock().unwrap();
        views.retain(|v| v.strong_count() > 0);
        views
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|v| !v.read_only && v.name == name)
            .max_by_key(|v| v.serial)
    }

    /// Forget every registered view.
    ///
    /// Used when the mailbox is renamed, since the views which selected it
    /// refer to it by its old name.
    pub fn clear(&self) {
        self.views.lock().unwrap().clear();
    }

    /// Forget views which have since been dropped.
    pub fn prune(&self) {
        self.views.lock().unwrap().retain(|v| v.strong_count() > 0);
    }

    /// Return the number of registered views, including dead ones not yet
    /// pruned.
    pub fn len(&self) -> usize {
        self.views.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        0 == self.len()
    }
}

/// What the client was last told about the view.
#[derive(Clone, Debug, Default)]
struct Reported {
    uid_validity: u32,
    uids: Vec<Uid>,
    flags: BTreeMap<Uid, FlagSet>,
    recent: usize,
}

/// One session's view of its selected mailbox.
///
/// The view's membership is the UIDs as of the last synchronisation, and the
/// sequence number of a message is its position among them. Only the
/// owning session mutates the membership; the session flags may
/// additionally be updated through the selection registry.
#[derive(Debug)]
pub struct SelectedView {
    name: String,
    uid_validity: u32,
    messages: BTreeMap<Uid, FlagSet>,
    deleted: bool,
    shared: Arc<ViewShared>,
    reported: Reported,
    log_prefix: String,
}

impl SelectedView {
    pub fn new(
        name: String,
        read_only: bool,
        uid_validity: u32,
        log_prefix: &str,
    ) -> Self {
        let log_prefix = format!("{}:{}", log_prefix, name);
        let shared = Arc::new(ViewShared {
            serial: SELECTION_SERNO.fetch_add(1, SeqCst),
            name: name.clone(),
            read_only,
            session_flags: Mutex::new(SessionFlags::default()),
        });
        SelectedView {
            name,
            uid_validity,
            messages: BTreeMap::new(),
            deleted: false,
            shared,
            reported: Reported {
                uid_validity,
                ..Reported::default()
            },
            log_prefix,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn read_only(&self) -> bool {
        self.shared.read_only
    }

    pub fn uid_validity(&self) -> u32 {
        self.uid_validity
    }

    /// Whether the selected mailbox has been found to no longer exist.
    ///
    /// This is terminal.
    pub fn deleted(&self) -> bool {
        self.deleted
    }

    pub fn log_prefix(&self) -> &str {
        &self.log_prefix
    }

    /// The number of messages in the view.
    pub fn exists(&self) -> usize {
        self.messages.len()
    }

    /// The greatest UID in the view.
    pub fn max_uid(&self) -> Option<Uid> {
        self.messages.keys().next_back().copied()
    }

    /// The handle through which other sessions reach this view.
    pub fn shared(&self) -> &Arc<ViewShared> {
        &self.shared
    }

    pub fn mark_deleted(&mut self) {
        if !self.deleted {
            info!("{} Selected mailbox no longer exists", self.log_prefix);
            self.deleted = true;
        }
    }

    /// Merge the current state of the mailbox into this view.
    ///
    /// `messages` must be every message currently in the mailbox with its
    /// permanent flags. Session flags are kept for every UID that is still
    /// present, and for any UID greater than the last one streamed, since
    /// such a UID may have been claimed after the stream was taken.
    ///
    /// Does nothing if the view has been deleted.
    pub fn reconcile(
        &mut self,
        uid_validity: u32,
        messages: impl IntoIterator<Item = (Uid, FlagSet)>,
    ) {
        if self.deleted {
            return;
        }

        if uid_validity != self.uid_validity {
            info!(
                "{} UID validity changed from {} to {}",
                self.log_prefix, self.uid_validity, uid_validity
            );
        }

        self.uid_validity = uid_validity;
        self.messages = messages.into_iter().collect();

        let max_uid = self.max_uid();
        let messages = &self.messages;
        self.shared.with_session_flags(|sf| {
            sf.retain(|uid| {
                messages.contains_key(&uid) || Some(uid) > max_uid
            })
        });
    }

    /// Return the sequence number of `uid`, if it is in the view.
    pub fn seqnum(&self, uid: Uid) -> Option<Seqnum> {
        if !self.messages.contains_key(&uid) {
            return None;
        }

        Some(Seqnum::from_index(self.messages.range(..uid).count()))
    }

    /// Return the UID at `seqnum`, if it is in the view.
    pub fn uid(&self, seqnum: Seqnum) -> Option<Uid> {
        self.messages.keys().nth(seqnum.to_index()).copied()
    }

    /// Resolve `set` against the bounds of this view, returning every
    /// matching message in ascending order.
    pub fn iter_set<'a>(
        &'a self,
        set: &SequenceSet,
    ) -> impl Iterator<Item = (Seqnum, Uid)> + 'a {
        let uids: Option<SeqRange<Uid>> = if set.is_uid() {
            Some(set.resolve(self.max_uid().map_or(0, u32::from)))
        } else {
            None
        };
        let seqnums: Option<SeqRange<Seqnum>> = if set.is_uid() {
            None
        } else {
            Some(set.resolve(self.messages.len() as u32))
        };

        self.messages
            .keys()
            .copied()
            .enumerate()
            .map(|(ix, uid)| (Seqnum::from_index(ix), uid))
            .filter(move |&(seqnum, uid)| {
                uids.as_ref().map_or(true, |r| r.contains(uid))
                    && seqnums.as_ref().map_or(true, |r| r.contains(seqnum))
            })
    }

    /// Return the flags on `uid` as this session sees them, i.e., its
    /// permanent flags as of the last sync plus the session flags.
    pub fn flags(&self, uid: Uid) -> FlagSet {
        let mut flags = self.messages.get(&uid).cloned().unwrap_or_default();
        flags.extend(self.shared.with_session_flags(|sf| sf.get(uid)));
        flags
    }

    /// Return the session flags of every message, for search evaluation.
    pub fn session_flags(&self) -> SessionFlags {
        self.shared.with_session_flags(|sf| sf.clone())
    }

    /// Return the number of messages in the view recent in this session.
    pub fn recent_count(&self) -> usize {
        let recent = self.shared.with_session_flags(|sf| sf.recent_uids());
        recent
            .into_iter()
            .filter(|uid| self.messages.contains_key(uid))
            .count()
    }

    /// Record that the client now knows the current state of the view.
    ///
    /// This is used after `SELECT`, whose response carries the full state.
    pub fn mark_reported(&mut self) {
        let flags: BTreeMap<Uid, FlagSet> = self
            .messages
            .keys()
            .map(|&uid| (uid, self.flags(uid)))
            .collect();
        let recent = self.recent_count();
        self.reported = Reported {
            uid_validity: self.uid_validity,
            uids: self.messages.keys().copied().collect(),
            flags,
            recent,
        };
    }

    /// Compute the untagged updates the client needs to learn about since
    /// the last report, and consider them reported.
    pub fn take_changes(&mut self) -> PollResponse {
        if self.deleted {
            return PollResponse {
                bye: Some(ByeReason::MailboxDeleted),
                ..PollResponse::default()
            };
        }

        if self.uid_validity != self.reported.uid_validity {
            return PollResponse {
                bye: Some(ByeReason::UidValidityChanged(self.uid_validity)),
                ..PollResponse::default()
            };
        }

        let mut response = PollResponse::default();
        for (ix, &uid) in self.reported.uids.iter().enumerate() {
            if !self.messages.contains_key(&uid) {
                response.expunge.push((Seqnum::from_index(ix), uid));
            }
        }

        let known: BTreeSet<Uid> =
            self.reported.uids.iter().copied().collect();
        let mut new_messages = false;
        for &uid in self.messages.keys() {
            if !known.contains(&uid) {
                new_messages = true;
                continue;
            }

            let flags = self.flags(uid);
            if self.reported.flags.get(&uid) != Some(&flags) {
                response.fetch.push(uid);
            }
        }

        if new_messages {
            response.exists = Some(self.messages.len());
        }

        let recent = self.recent_count();
        if new_messages || recent != self.reported.recent {
            response.recent = Some(recent);
        }

        if !response.is_empty() {
            debug!(
                "{} Reporting {} expunged, {} new, {} flag changes",
                self.log_prefix,
                response.expunge.len(),
                self.messages.len() + response.expunge.len()
                    - self.reported.uids.len(),
                response.fetch.len()
            );
        }

        self.mark_reported();
        response
    }
}

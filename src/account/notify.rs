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


//! Support for waiting on changes to a mailbox, i.e., blocking until the wait
//! is cancelled or some other session modifies the mailbox. This is used for
//! the IDLE extension and the `CHECK` wait, but does not alone implement
//! either.
//!
//! Notifications are one-shot. A waiter registers a listener, which is a
//! single-slot channel, with the mailbox's `ChangeSignal`. Firing the signal
//! sends a wakeup to every registered listener and then forgets all of them.
//! Nothing latches: a listener registered after a notification does not see
//! it. A listener dropped before any notification unregisters itself.
//!
//! To avoid races, waiting needs to follow this procedure:
//!
//! ```ignore
//! loop {
//!   let listener = mailbox.change_signal().listen();
//!   session.check(...)?;
//!   send_poll_results(view.take_changes());
//!   listener.wait(...);
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};

#[derive(Debug, Default)]
struct Listeners {
    next_id: u64,
    senders: BTreeMap<u64, Sender<()>>,
}

/// A broadcast point which wakes every session waiting on a mailbox.
#[derive(Debug, Default)]
pub struct ChangeSignal {
    listeners: Arc<Mutex<Listeners>>,
}

impl ChangeSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new listener which will be awoken by the next call to
    /// `notify_all()`.
    pub fn listen(&self) -> ChangeListener {
        let (tx, rx) = channel::bounded(1);
        let mut listeners = self.listeners.lock().unwrap();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.senders.insert(id, tx);

        ChangeListener {
            rx,
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Wake up every listener currently registered, then reset the signal.
    pub fn notify_all(&self) {
        let listeners = std::mem::replace(
            &mut self.listeners.lock().unwrap().senders,
            BTreeMap::new(),
        );
        for listener in listeners.into_iter().map(|(_, tx)| tx) {
            // If the listener was dropped, nobody is waiting any more
            let _ = listener.try_send(());
        }
    }

    /// Return the number of listeners that have not yet been notified.
    pub fn pending(&self) -> usize {
        self.listeners.lock().unwrap().senders.len()
    }
}

/// A handle that can be used to wait until a `ChangeSignal` fires.
#[derive(Debug)]
pub struct ChangeListener {
    rx: Receiver<()>,
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Drop for ChangeListener {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.lock().unwrap().senders.remove(&self.id);
        }
    }
}

impl ChangeListener {
    /// The underlying channel, for use in `crossbeam::select!`.
    ///
    /// The channel becomes ready when the signal fires, and also disconnects
    /// if the signal itself is dropped.
    pub fn receiver(&self) -> &Receiver<()> {
        &self.rx
    }

    /// Block until the signal fires or `timeout` elapses. Returns whether the
    /// signal fired.
    pub fn wait(self, timeout: Duration) -> bool {
        self.rx.recv_timeout(timeout).is_ok()
    }
}

/// Why a wait for updates ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WakeReason {
    /// The caller's own cancellation event fired.
    Cancelled,
    /// Another session changed the mailbox.
    Changed,
    /// Neither happened within the poll ceiling.
    Timeout,
}

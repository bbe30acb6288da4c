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


use std::sync::Arc;
use std::time::Duration;

use crate::account::store::MailboxStore;
use crate::support::error::Error;
use crate::support::system_config::SessionConfig;

/// The mailbox operations of one connected client.
///
/// A `Session` holds nothing about any mailbox. The state of the client's
/// selected mailbox lives in the `SelectedView` the client passes to each
/// operation.
pub struct Session<S> {
    pub(super) store: Arc<S>,
    pub(super) config: SessionConfig,
    pub(super) poll_ceiling: Duration,
    pub(super) log_prefix: String,
}

impl<S: MailboxStore> Session<S> {
    pub fn new(store: Arc<S>, config: SessionConfig, log_prefix: String) -> Self {
        let poll_ceiling = config.idle_poll_interval();
        Session {
            store,
            config,
            poll_ceiling,
            log_prefix,
        }
    }

    /// The hierarchy delimiter for mailbox names.
    pub fn delimiter(&self) -> char {
        self.config.delimiter
    }

    pub fn log_prefix(&self) -> &str {
        &self.log_prefix
    }

    /// Override the longest time to wait for a change notification.
    pub fn set_poll_ceiling(&mut self, ceiling: Duration) {
        self.poll_ceiling = ceiling;
    }

    /// Resolve an `APPEND` or `COPY` destination.
    pub(super) fn get_destination(
        &self,
        name: &str,
    ) -> Result<S::Mailbox, Error> {
        match self
            .store
            .get_mailbox(name, self.config.auto_create_destinations)
        {
            Err(Error::NxMailbox) => Err(Error::NxMailboxTryCreate),
            r => r,
        }
    }
}

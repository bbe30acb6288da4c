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


use crossbeam::channel::{self, Receiver};
use log::debug;

use super::defs::*;
use crate::account::notify::WakeReason;
use crate::account::store::{Mailbox, MailboxStore};

impl<S: MailboxStore> Session<S> {
    /// Block until `wait_on` becomes ready, `mailbox` is changed by some
    /// session, or the poll ceiling elapses, whichever happens first.
    ///
    /// A disconnected `wait_on` counts as cancellation.
    ///
    /// Waking says nothing about what, if anything, changed. The caller must
    /// synchronise its view afterwards regardless of the reason.
    pub(super) fn wait_for_updates(
        &self,
        mailbox: &S::Mailbox,
        wait_on: &Receiver<()>,
    ) -> WakeReason {
        let listener = mailbox.change_signal().listen();
        let ceiling = channel::after(self.poll_ceiling);

        let reason = crossbeam::select! {
            recv(wait_on) -> _ => WakeReason::Cancelled,
            recv(listener.receiver()) -> _ => WakeReason::Changed,
            recv(ceiling) -> _ => WakeReason::Timeout,
        };

        debug!(
            "{}:{} Woke from wait: {:?}",
            self.log_prefix,
            mailbox.name(),
            reason
        );
        reason
    }
}

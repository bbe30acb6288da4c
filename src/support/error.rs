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

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Mailbox does not exist")]
    NxMailbox,
    #[error("Destination mailbox does not exist")]
    NxMailboxTryCreate,
    #[error("Mailbox already exists")]
    MailboxExists,
    #[error("Mailbox is read-only")]
    MailboxReadOnly,
    #[error("Operation not allowed on INBOX")]
    BadOperationOnInbox,
    #[error("Unsafe key or mailbox name")]
    UnsafeName,
    #[error("Non-existent system flag")]
    NxFlag,
    #[error("Mailbox has no more UIDs to assign")]
    MailboxFull,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Return whether this error indicates the target mailbox is gone.
    pub fn is_not_found(&self) -> bool {
        matches!(*self, Error::NxMailbox | Error::NxMailboxTryCreate)
    }
}

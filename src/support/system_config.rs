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

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The system-wide configuration for Pigeonhole.
///
/// This is stored in a file named `pigeonhole.toml` under the configuration
/// root.
#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct SystemConfig {
    /// Options controlling the behaviour of every session.
    #[serde(default)]
    pub session: SessionConfig,

    /// Configuration for the in-memory demo store.
    #[serde(default)]
    pub demo: DemoConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// The hierarchy delimiter used in mailbox names.
    pub delimiter: char,

    /// The longest time, in seconds, a session waits for a change
    /// notification before polling the mailbox again anyway.
    ///
    /// This is what lets an idling session notice mail delivered by some
    /// other process that does not fire change notifications.
    pub idle_poll_seconds: u64,

    /// If true, `APPEND` and `COPY` create a missing destination mailbox.
    ///
    /// When false, those commands fail with `NxMailboxTryCreate` so the
    /// client can be told to create the mailbox itself.
    pub auto_create_destinations: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            delimiter: '/',
            idle_poll_seconds: 10,
            auto_create_destinations: false,
        }
    }
}

impl SessionConfig {
    pub fn idle_poll_interval(&self) -> Duration {
        Duration::from_secs(self.idle_poll_seconds)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Directory to load demo mailboxes from when none is given on the
    /// command line.
    pub data: Option<PathBuf>,
}

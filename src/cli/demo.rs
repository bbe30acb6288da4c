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


use crate::account::memory::MemoryStore;
use crate::account::model::*;
use crate::account::session::Session;
use crate::support::error::Error;

pub(super) fn list(
    session: &Session<MemoryStore>,
    pattern: &str,
    subscribed: bool,
) -> Result<(), Error> {
    let command = if subscribed { "LSUB" } else { "LIST" };
    for response in session.list_mailboxes("", pattern, subscribed, None)? {
        let attributes: Vec<&str> =
            response.attributes.iter().map(|a| a.name()).collect();
        println!(
            "* {} ({}) \"{}\" {}",
            command,
            attributes.join(" "),
            response.delimiter,
            response.name
        );
    }
    Ok(())
}

fn flag_list(flags: &FlagSet) -> String {
    flags
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

pub(super) fn show(
    session: &Session<MemoryStore>,
    mailbox: &str,
    examine: bool,
) -> Result<(), Error> {
    let (snapshot, mut view) = session.select_mailbox(mailbox, examine)?;

    let mut all_flags = snapshot.permanent_flags.clone();
    all_flags.extend(snapshot.session_flags.iter().cloned());
    println!("* FLAGS ({})", flag_list(&all_flags));
    println!(
        "* OK [PERMANENTFLAGS ({})]",
        flag_list(&snapshot.permanent_flags)
    );
    println!("* {} EXISTS", snapshot.exists);
    println!("* {} RECENT", snapshot.recent);
    if let Some(first_unseen) = snapshot.first_unseen {
        println!("* OK [UNSEEN {}]", first_unseen.0);
    }
    println!("* OK [UIDVALIDITY {}]", snapshot.uid_validity);
    println!("* OK [UIDNEXT {}]", snapshot.next_uid);
    println!(
        "* OK [{}] {}",
        if snapshot.read_only {
            "READ-ONLY"
        } else {
            "READ-WRITE"
        },
        snapshot.name
    );

    let fetched = session.fetch_messages(
        &mut view,
        &SequenceSet::all(false),
        &[FetchAttribute::Flags, FetchAttribute::Rfc822Size],
    )?;
    for (seqnum, message) in fetched {
        println!(
            "* {} FETCH (UID {} FLAGS ({}) RFC822.SIZE {})",
            seqnum.0,
            message.uid,
            flag_list(&view.flags(message.uid)),
            message.size()
        );
    }

    Ok(())
}

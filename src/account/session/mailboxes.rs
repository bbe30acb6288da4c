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


use std::collections::BTreeMap;

use log::info;

use super::defs::*;
use crate::account::model::*;
use crate::account::selected::SelectedView;
use crate::account::store::{Mailbox, MailboxStore};
use crate::support::error::Error;
use crate::support::mailbox_paths::*;

#[derive(Clone, Copy, Debug, Default)]
struct TreeNode {
    selectable: bool,
    has_children: bool,
}

/// Build the full hierarchy implied by `names`, including ancestors which
/// do not themselves exist.
fn build_tree<'a>(
    names: impl IntoIterator<Item = &'a str>,
    delimiter: char,
) -> BTreeMap<String, TreeNode> {
    let mut tree = BTreeMap::<String, TreeNode>::new();
    for name in names {
        let name = normalise_mailbox_name(name, delimiter);
        if name.is_empty() {
            continue;
        }

        for ancestor in ancestors(&name, delimiter) {
            tree.entry(ancestor.to_owned()).or_default().has_children = true;
        }
        tree.entry(name).or_default().selectable = true;
    }
    tree
}

impl<S: MailboxStore> Session<S> {
    /// The `LIST` and `LSUB` commands.
    ///
    /// `pattern` is interpreted relative to `reference` with the RFC 3501
    /// `*` and `%` wildcards. An empty `pattern` returns only the hierarchy
    /// delimiter.
    ///
    /// With `subscribed`, only subscribed mailboxes are listed, and
    /// unsubscribed ancestors appear as `\Noselect`.
    pub fn list_mailboxes(
        &self,
        reference: &str,
        pattern: &str,
        subscribed: bool,
        view: Option<&mut SelectedView>,
    ) -> Result<Vec<ListResponse>, Error> {
        let delimiter = self.delimiter();
        let responses = if pattern.is_empty() {
            vec![ListResponse {
                name: String::new(),
                delimiter,
                attributes: vec![MailboxAttribute::Noselect],
            }]
        } else {
            let listed = if subscribed {
                self.store.list_subscribed()
            } else {
                self.store.list_mailboxes().map(|mut names| {
                    names.push("INBOX".to_owned());
                    names
                })
            };
            let names = match listed {
                Err(e) if e.is_not_found() => Vec::new(),
                r => r?,
            };

            let pattern = format!("{}{}", reference, pattern);
            let matcher = mailbox_path_matcher(Some(pattern.as_str()), delimiter);

            build_tree(names.iter().map(String::as_str), delimiter)
                .into_iter()
                .filter(|&(ref name, _)| matcher(name.as_str()))
                .map(|(name, node)| {
                    let mut attributes = Vec::new();
                    if !node.selectable {
                        attributes.push(MailboxAttribute::Noselect);
                    }
                    if subscribed {
                        if node.selectable {
                            attributes.push(MailboxAttribute::Subscribed);
                        }
                    } else if node.has_children {
                        attributes.push(MailboxAttribute::HasChildren);
                    } else {
                        attributes.push(MailboxAttribute::HasNoChildren);
                    }

                    ListResponse {
                        name,
                        delimiter,
                        attributes,
                    }
                })
                .collect()
        };

        self.load_updates(view, None)?;
        Ok(responses)
    }

    /// The `STATUS` command.
    ///
    /// The recent count is that of messages not yet seen by any session.
    pub fn get_mailbox(
        &self,
        name: &str,
        view: Option<&mut SelectedView>,
    ) -> Result<MailboxSnapshot, Error> {
        let mailbox = self.store.get_mailbox(name, false)?;
        let snapshot = mailbox.snapshot()?;
        self.load_updates(view, Some(&mailbox))?;
        Ok(snapshot)
    }

    /// The `CREATE` command.
    pub fn create_mailbox(
        &self,
        name: &str,
        view: Option<&mut SelectedView>,
    ) -> Result<(), Error> {
        let mailbox = self.store.add_mailbox(name)?;
        info!("{} Created {}", self.log_prefix, mailbox.name());
        self.load_updates(view, None)
    }

    /// The `DELETE` command.
    ///
    /// Sessions which have the mailbox selected discover the deletion the
    /// next time their views are synchronised.
    pub fn delete_mailbox(
        &self,
        name: &str,
        view: Option<&mut SelectedView>,
    ) -> Result<(), Error> {
        self.store.remove_mailbox(name)?;
        info!("{} Deleted {}", self.log_prefix, name);
        self.load_updates(view, None)
    }

    /// The `RENAME` command.
    ///
    /// Sessions with a renamed mailbox selected see it as deleted.
    pub fn rename_mailbox(
        &self,
        before: &str,
        after: &str,
        view: Option<&mut SelectedView>,
    ) -> Result<(), Error> {
        self.store.rename_mailbox(before, after)?;
        info!("{} Renamed {} to {}", self.log_prefix, before, after);
        self.load_updates(view, None)
    }

    /// The `SUBSCRIBE` command.
    pub fn subscribe(
        &self,
        name: &str,
        view: Option<&mut SelectedView>,
    ) -> Result<(), Error> {
        self.store.set_subscribed(name, true)?;
        self.load_updates(view, None)
    }

    /// The `UNSUBSCRIBE` command.
    pub fn unsubscribe(
        &self,
        name: &str,
        view: Option<&mut SelectedView>,
    ) -> Result<(), Error> {
        self.store.set_subscribed(name, false)?;
        self.load_updates(view, None)
    }
}

#[cfg(test)]
mod test {
    use super::super::test_prelude::*;

    fn list(
        session: &Session<MemoryStore>,
        reference: &str,
        pattern: &str,
    ) -> Vec<String> {
        session
            .list_mailboxes(reference, pattern, false, None)
            .unwrap()
            .into_iter()
            .map(|r| {
                let attrs: Vec<String> =
                    r.attributes.iter().map(|a| a.to_string()).collect();
                format!("{} ({})", r.name, attrs.join(" "))
            })
            .collect()
    }

    #[test]
    fn list_tree() {
        let setup = set_up();
        let session = setup.session("s");
        session.create_mailbox("Archive/2019", None).unwrap();
        session.create_mailbox("Archive/2020", None).unwrap();
        session.create_mailbox("Sent", None).unwrap();
        session.create_mailbox("Lists/rust/users", None).unwrap();

        assert_eq!(
            vec![
                "Archive (\\Noselect \\HasChildren)",
                "Archive/2019 (\\HasNoChildren)",
                "Archive/2020 (\\HasNoChildren)",
                "INBOX (\\HasNoChildren)",
                "Lists (\\Noselect \\HasChildren)",
                "Lists/rust (\\Noselect \\HasChildren)",
                "Lists/rust/users (\\HasNoChildren)",
                "Sent (\\HasNoChildren)",
            ],
            list(&session, "", "*")
        );

        assert_eq!(
            vec![
                "Archive (\\Noselect \\HasChildren)",
                "INBOX (\\HasNoChildren)",
                "Lists (\\Noselect \\HasChildren)",
                "Sent (\\HasNoChildren)",
            ],
            list(&session, "", "%")
        );

        assert_eq!(
            vec![
                "Archive/2019 (\\HasNoChildren)",
                "Archive/2020 (\\HasNoChildren)",
            ],
            list(&session, "Archive/", "%")
        );

        assert_eq!(vec!["INBOX (\\HasNoChildren)"], list(&session, "", "inbox"));
        assert!(list(&session, "", "nothing").is_empty());
        assert_eq!(vec![" (\\Noselect)"], list(&session, "foo", ""));
    }

    #[test]
    fn lsub_uses_subscriptions() {
        let setup = set_up();
        let session = setup.session("s");
        session.create_mailbox("Work", None).unwrap();
        session.subscribe("Work/Reports", None).unwrap();
        session.subscribe("Sent", None).unwrap();
        session.subscribe("Gone", None).unwrap();
        session.unsubscribe("Gone", None).unwrap();

        let listed: Vec<(String, Vec<MailboxAttribute>)> = session
            .list_mailboxes("", "*", true, None)
            .unwrap()
            .into_iter()
            .map(|r| (r.name, r.attributes))
            .collect();
        assert_eq!(
            vec![
                ("Sent".to_owned(), vec![MailboxAttribute::Subscribed]),
                ("Work".to_owned(), vec![MailboxAttribute::Noselect]),
                (
                    "Work/Reports".to_owned(),
                    vec![MailboxAttribute::Subscribed]
                ),
            ],
            listed
        );
    }

    #[test]
    fn create_delete_rename() {
        let setup = set_up();
        let session = setup.session("s");
        session.create_mailbox("Foo", None).unwrap();
        assert_matches!(
            Err(Error::MailboxExists),
            session.create_mailbox("Foo", None)
        );
        assert_matches!(
            Err(Error::UnsafeName),
            session.create_mailbox("Foo%", None)
        );
        assert_matches!(
            Err(Error::BadOperationOnInbox),
            session.delete_mailbox("Inbox", None)
        );

        session.rename_mailbox("Foo", "Bar", None).unwrap();
        assert_matches!(Err(Error::NxMailbox), session.get_mailbox("Foo", None));
        session.get_mailbox("Bar", None).unwrap();

        session.delete_mailbox("Bar", None).unwrap();
        assert_matches!(
            Err(Error::NxMailbox),
            session.delete_mailbox("Bar", None)
        );
    }

    #[test]
    fn rename_of_selected_mailbox_deletes_view() {
        let setup = set_up();
        let session = setup.session("s");
        session.create_mailbox("Foo", None).unwrap();
        let (_, mut view) = session.select_mailbox("Foo", false).unwrap();

        session.rename_mailbox("Foo", "Bar", Some(&mut view)).unwrap();
        assert!(view.deleted());
    }

    #[test]
    fn rename_inbox_keeps_empty_inbox() {
        let setup = set_up();
        let session = setup.session("s");
        simple_append(&session, "INBOX", None);
        simple_append(&session, "INBOX", None);
        let (_, mut view) = session.select_mailbox("INBOX", false).unwrap();

        session.rename_mailbox("INBOX", "Saved", Some(&mut view)).unwrap();
        assert!(!view.deleted());
        assert_eq!(0, view.exists());
        assert_eq!(2, view.take_changes().expunge.len());

        let status = session.get_mailbox("Saved", None).unwrap();
        assert_eq!(2, status.exists);
        assert_eq!(Uid::u(3), status.next_uid);
    }

    #[test]
    fn status_reports_global_recency() {
        let setup = set_up();
        let session = setup.session("s");
        let uid = simple_append(&session, "INBOX", None);
        session
            .append_messages(
                "INBOX",
                vec![AppendItem {
                    flags: vec![Flag::Seen],
                    ..AppendItem::default()
                }],
                None,
            )
            .unwrap();

        let status = session.get_mailbox("INBOX", None).unwrap();
        assert_eq!(2, status.exists);
        assert_eq!(2, status.recent);
        assert_eq!(1, status.unseen);
        assert_eq!(Some(Seqnum::u(1)), status.first_unseen);
        assert_eq!(uid.saturating_next().saturating_next(), status.next_uid);

        session.select_mailbox("INBOX", false).unwrap();
        assert_eq!(0, session.get_mailbox("INBOX", None).unwrap().recent);
    }
}

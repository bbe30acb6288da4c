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


use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use structopt::StructOpt;

use crate::account::demo::load_demo_data;
use crate::account::memory::MemoryStore;
use crate::account::session::Session;
use crate::support::error::Error;
use crate::support::sysexits::*;
use crate::support::system_config::SystemConfig;

#[derive(StructOpt)]
#[structopt(max_term_width = 80)]
enum Command {
    /// List mailboxes in the demo data.
    List(ListSubcommand),
    /// Select a mailbox in the demo data and show its contents.
    Show(ShowSubcommand),
}

#[derive(StructOpt, Default)]
struct CommonOptions {
    /// The directory containing `pigeonhole.toml` and `logging.toml`
    /// [default: current directory]
    #[structopt(long, parse(from_os_str))]
    root: Option<PathBuf>,

    /// The demo data directory. Overrides `demo.data` in the configuration.
    #[structopt(long, parse(from_os_str))]
    demo_data: Option<PathBuf>,
}

#[derive(StructOpt)]
struct ListSubcommand {
    #[structopt(flatten)]
    common: CommonOptions,

    /// Only list subscribed mailboxes, like `LSUB`.
    #[structopt(long)]
    subscribed: bool,

    /// The mailbox pattern, with `*` and `%` wildcards.
    #[structopt(default_value = "*")]
    pattern: String,
}

#[derive(StructOpt)]
struct ShowSubcommand {
    #[structopt(flatten)]
    common: CommonOptions,

    /// Open the mailbox read-only, like `EXAMINE`.
    #[structopt(long)]
    examine: bool,

    /// The mailbox to show.
    mailbox: String,
}

pub fn main() {
    // Clap exits with status 1 instead of EX_USAGE if we use the more concise
    // API
    let cmd = Command::from_clap(&match Command::clap().get_matches_safe() {
        Ok(matches) => matches,
        Err(
            e @ clap::Error {
                kind: clap::ErrorKind::HelpDisplayed,
                ..
            },
        )
        | Err(
            e @ clap::Error {
                kind: clap::ErrorKind::VersionDisplayed,
                ..
            },
        ) => {
            println!("{}", e.message);
            return;
        }
        Err(e) => {
            eprintln!("{}", e.message);
            EX_USAGE.exit()
        }
    });

    let common = match cmd {
        Command::List(ref c) => &c.common,
        Command::Show(ref c) => &c.common,
    };
    let session = open_session(common);

    let result = match cmd {
        Command::List(ref c) => {
            super::demo::list(&session, &c.pattern, c.subscribed)
        }
        Command::Show(ref c) => {
            super::demo::show(&session, &c.mailbox, c.examine)
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        match e {
            Error::NxMailbox => EX_NOINPUT.exit(),
            Error::Io(_) | Error::Storage(_) => EX_SOFTWARE.exit(),
            _ => EX_DATAERR.exit(),
        }
    }
}

fn open_session(common: &CommonOptions) -> Session<MemoryStore> {
    let root = common.root.clone().unwrap_or_else(|| PathBuf::from("."));

    let system_config_path = root.join("pigeonhole.toml");
    let system_config: SystemConfig = if system_config_path.is_file() {
        let raw = match fs::read(&system_config_path) {
            Ok(raw) => raw,
            Err(e) => {
                eprintln!(
                    "Error reading '{}': {}",
                    system_config_path.display(),
                    e
                );
                EX_CONFIG.exit()
            }
        };

        match toml::from_slice(&raw) {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Error in config file at '{}': {}",
                    system_config_path.display(),
                    e
                );
                EX_CONFIG.exit()
            }
        }
    } else {
        SystemConfig::default()
    };

    let log_config_file = root.join("logging.toml");
    if log_config_file.is_file() {
        if let Err(e) = log4rs::init_file(
            &log_config_file,
            log4rs::file::Deserializers::new(),
        ) {
            eprintln!(
                "Error in logging config at '{}': {}",
                log_config_file.display(),
                e
            );
            EX_CONFIG.exit()
        }
    } else {
        crate::init_simple_log();
    }

    let demo_data = match common
        .demo_data
        .clone()
        .or_else(|| system_config.demo.data.clone())
    {
        Some(path) => path,
        None => {
            eprintln!(
                "No demo data; pass --demo-data or set demo.data in \
                 pigeonhole.toml"
            );
            EX_USAGE.exit()
        }
    };

    let store = match load_demo_data(
        &demo_data,
        system_config.session.delimiter,
        "demo".to_owned(),
    ) {
        Ok(store) => store,
        Err(e @ Error::Io(_)) => {
            eprintln!("Error reading '{}': {}", demo_data.display(), e);
            EX_NOINPUT.exit()
        }
        Err(e) => {
            eprintln!("Bad demo data in '{}': {}", demo_data.display(), e);
            EX_DATAERR.exit()
        }
    };

    Session::new(Arc::new(store), system_config.session, "cli".to_owned())
}

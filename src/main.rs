// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use moneysheet::config::Settings;
use moneysheet::session::Session;
use moneysheet::{cli, commands, utils};

fn main() -> Result<()> {
    utils::init_tracing();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let settings = Settings::load()?;
    let user = matches.get_one::<String>("user").map(String::as_str);
    let store = settings.open_store()?;
    let mut session = Session::from_settings(store, &settings, user)?;

    match matches.subcommand() {
        Some(("books", _)) => commands::books::handle(session.books())?,
        Some(("report", sub)) => commands::reports::handle(&mut session, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&mut session, sub)?,
        Some(("invest", sub)) => commands::portfolio::handle(&mut session, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&mut session, sub)?,
        Some(("commit", sub)) => commands::importer::handle(&mut session, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(&mut session, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, arg, crate_version, value_parser};

fn book_arg(default: Option<&'static str>) -> Arg {
    let a = Arg::new("book")
        .long("book")
        .short('b')
        .value_name("BOOK")
        .help("Book id (see `moneysheet books`)");
    match default {
        Some(d) => a.default_value(d),
        None => a.required(true),
    }
}

fn pin_arg() -> Arg {
    Arg::new("pin")
        .long("pin")
        .value_name("PIN")
        .required(true)
        .help("PIN required for any write")
}

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

pub fn build_cli() -> Command {
    Command::new("moneysheet")
        .version(crate_version!())
        .about("Spreadsheet-backed personal spending and investment ledger")
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .value_name("NAME")
                .help("Identity to act as; the demo identity sees anonymized data"),
        )
        .subcommand(Command::new("books").about("List the configured books"))
        .subcommand(json_args(
            Command::new("report")
                .about("Current month totals, monthly series and category pivot")
                .arg(book_arg(None))
                .arg(
                    arg!(--recurrent <LIST> "Recurrent values to keep, e.g. true,false")
                        .default_value("true,false"),
                )
                .arg(arg!(--include <LIST> "Include values to keep, e.g. true").default_value("true"))
                .arg(arg!(--month <YYYY_MM> "Month treated as current (default: today)")),
        ))
        .subcommand(
            Command::new("tx")
                .about("Transactions of a spending book")
                .subcommand(json_args(
                    Command::new("list")
                        .about("List transactions, most recent first")
                        .arg(book_arg(None))
                        .arg(arg!(--month <YYYY_MM> "Only this month"))
                        .arg(arg!(--category <CATEGORY> "Only this category"))
                        .arg(arg!(--limit <N> "Max rows").value_parser(value_parser!(usize))),
                ))
                .subcommand(
                    Command::new("add")
                        .about("Append one transaction")
                        .arg(book_arg(None))
                        .arg(arg!(--date <DATE> "YYYY-MM-DD").required(true))
                        .arg(arg!(--amount <AMOUNT> "Signed amount").required(true).allow_hyphen_values(true))
                        .arg(arg!(--category <CATEGORY>).required(true))
                        .arg(arg!(--description <TEXT>))
                        .arg(arg!(--recurrent <BOOL>).default_value("true"))
                        .arg(arg!(--include <BOOL>).default_value("true"))
                        .arg(pin_arg()),
                ),
        )
        .subcommand(
            Command::new("invest")
                .about("Investment positions")
                .subcommand(json_args(
                    Command::new("list")
                        .about("Positions with earnings, ROI and annualized return")
                        .arg(book_arg(Some("investments")))
                        .arg(
                            Arg::new("active")
                                .long("active")
                                .action(ArgAction::SetTrue)
                                .help("Only open positions"),
                        ),
                ))
                .subcommand(json_args(
                    Command::new("summary")
                        .about("Totals per investment type")
                        .arg(book_arg(Some("investments"))),
                ))
                .subcommand(
                    Command::new("add")
                        .about("Open a new position")
                        .arg(book_arg(Some("investments")))
                        .arg(arg!(--name <NAME>).required(true))
                        .arg(arg!(--platform <PLATFORM>).required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .value_name("TYPE")
                                .required(true),
                        )
                        .arg(arg!(--"opening-date" <DATE>).required(true))
                        .arg(arg!(--amount <AMOUNT>).required(true))
                        .arg(arg!(--comments <TEXT>))
                        .arg(pin_arg()),
                )
                .subcommand(
                    Command::new("close")
                        .about("Close an open position")
                        .arg(book_arg(Some("investments")))
                        .arg(arg!(--name <NAME>).required(true))
                        .arg(arg!(--date <DATE>).required(true))
                        .arg(arg!(--amount <AMOUNT>).required(true))
                        .arg(pin_arg()),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Write the selected book to a file for editing")
                .arg(book_arg(None))
                .arg(arg!(--format <FORMAT> "csv or json").default_value("csv"))
                .arg(arg!(--out <PATH>).required(true)),
        )
        .subcommand(
            Command::new("commit")
                .about("Replace a book with an edited CSV file")
                .arg(book_arg(None))
                .arg(arg!(--path <PATH>).required(true))
                .arg(pin_arg()),
        )
        .subcommand(
            Command::new("doctor")
                .about("Report data-quality issues in a book")
                .arg(book_arg(None)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn negative_amounts_are_accepted() {
        let m = build_cli()
            .try_get_matches_from([
                "moneysheet", "tx", "add", "--book", "colombia", "--date", "2024-01-05",
                "--amount", "-50", "--category", "Salidas", "--pin", "1",
            ])
            .unwrap();
        let (_, tx) = m.subcommand().unwrap();
        let (_, add) = tx.subcommand().unwrap();
        assert_eq!(add.get_one::<String>("amount").unwrap(), "-50");
        assert_eq!(add.get_one::<String>("recurrent").unwrap(), "true");
    }
}

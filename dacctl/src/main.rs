mod setup_committee;

use clap::Command;
use std::process;

fn main() {
    env_logger::init();

    let matches = Command::new("dacctl")
        .version(env!("CARGO_PKG_VERSION"))
        .about(
            "Provisioning utilities for a data availability committee. \
            Operations that mutate on-chain state run once and exit.",
        )
        .subcommand_required(true)
        .subcommand(setup_committee::cli_app())
        .get_matches();

    let result = match matches.subcommand() {
        Some((setup_committee::CMD, matches)) => setup_committee::cli_run(matches),
        _ => Err("No subcommand supplied. See --help.".to_string()),
    };

    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

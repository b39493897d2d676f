use crate::saml::Format;
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;

pub const ARG_FORMAT: &str = "format";
pub const ARG_OUTPUT: &str = "output";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub format: Format,
    /// `None` writes to stdout.
    pub path: Option<PathBuf>,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        Self {
            format: matches
                .get_one::<Format>(ARG_FORMAT)
                .copied()
                .unwrap_or_default(),
            path: matches.get_one::<PathBuf>(ARG_OUTPUT).cloned(),
        }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_FORMAT)
                .short('f')
                .long(ARG_FORMAT)
                .help("Output format: json, php (saml20-idp-remote.php)")
                .env("IDP_METADATA_FORMAT")
                .default_value("json")
                .value_parser(|s: &str| s.parse::<Format>()),
        )
        .arg(
            Arg::new(ARG_OUTPUT)
                .short('o')
                .long(ARG_OUTPUT)
                .help("Write to this file instead of stdout")
                .env("IDP_METADATA_OUTPUT")
                .value_parser(clap::value_parser!(PathBuf)),
        )
}

use clap::{
    Arg, ArgAction, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

/// Pure clap command definitions with zero business logic
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new(env!("CARGO_PKG_NAME"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("inputfile")
                .env("ZONECERT_INPUTFILE")
                .help("zone file to read")
                .long("inputfile")
                .short('i')
                .value_name("FILE")
                .required(true),
        )
        .arg(
            Arg::new("domain")
                .env("ZONECERT_DOMAIN")
                .help("zone origin, appended to every owner name")
                .long("domain")
                .short('d')
                .required(true),
        )
        .arg(
            Arg::new("output")
                .default_value("output/domains.csv")
                .env("ZONECERT_OUTPUT")
                .help("report file, parent directory is created when missing")
                .long("output")
                .short('o')
                .value_name("PATH"),
        )
        .arg(
            Arg::new("format")
                .default_value("csv")
                .env("ZONECERT_FORMAT")
                .help("report format")
                .long("format")
                .short('f')
                .value_parser(["csv", "json"]),
        )
        .arg(
            Arg::new("header")
                .action(ArgAction::SetTrue)
                .env("ZONECERT_HEADER")
                .help("write a header row (csv only)")
                .long("header"),
        )
        .arg(
            Arg::new("port")
                .default_value("443")
                .env("ZONECERT_PORT")
                .help("TLS port probed on every hostname")
                .long("port")
                .short('p')
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("timeout")
                .default_value("3")
                .env("ZONECERT_TIMEOUT")
                .help("seconds allowed for connect and handshake")
                .long("timeout")
                .short('t')
                .value_parser(clap::value_parser!(u16).range(1..)),
        )
        .arg(
            Arg::new("verify")
                .action(ArgAction::SetTrue)
                .env("ZONECERT_VERIFY")
                .help("validate certificates against the webpki roots")
                .long("verify")
                .long_help(
                    "Validate every certificate chain and hostname against the\n\
                    Mozilla root set bundled from webpki-roots.\n\n\
                    Off by default: the inventory records whatever certificate is\n\
                    served, including expired and self-signed ones. With --verify\n\
                    an untrusted certificate is reported as a connection error.",
                ),
        )
        .arg(
            Arg::new("check-origin")
                .action(ArgAction::SetTrue)
                .env("ZONECERT_CHECK_ORIGIN")
                .help("require SOA and NS records at the zone origin")
                .long("check-origin"),
        )
        .arg(
            Arg::new("metrics-file")
                .env("ZONECERT_METRICS_FILE")
                .help("write prometheus metrics to this file after the run")
                .long("metrics-file")
                .long_help(
                    "Write metrics in the prometheus text format once the run\n\
                    completes, for the node_exporter textfile collector.\n\n\
                    Example: /var/lib/node_exporter/textfile/zonecert.prom",
                )
                .value_name("PATH"),
        )
        .arg(
            Arg::new("no-progress")
                .action(ArgAction::SetTrue)
                .env("ZONECERT_NO_PROGRESS")
                .help("hide the progress bar")
                .long("no-progress"),
        )
        .arg(
            Arg::new("verbosity")
                .action(ArgAction::Count)
                .help("increase verbosity, -vv for trace")
                .long("verbose")
                .short('v'),
        )
}

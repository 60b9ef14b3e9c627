mod cmd;

use {
    clap::{arg, ArgMatches, Command},
    cmd::Error as ExecutionError,
    snafu::prelude::*,
    std::{env, path::PathBuf, process},
    tracing::debug,
    tracing_subscriber::EnvFilter,
};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("the `TABULA_DATADIR` environment variable is unset, you can pass an argument with `-d` to config"))]
    NoDataDirectory,

    #[snafu(display("{}", source))]
    ExecuteCommand {
        #[snafu(backtrace)]
        source: ExecutionError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

const TABULA_DATADIR: &str = "TABULA_DATADIR";

const CREATE_DATABASE: &str = "create-db";
const DROP_DATABASE: &str = "drop-db";
const CREATE_TABLE: &str = "create-table";
const DROP_TABLE: &str = "drop-table";
const CREATE_INDEX: &str = "create-index";
const DROP_INDEX: &str = "drop-index";
const SHOW_TABLES: &str = "show-tables";
const DESC_TABLE: &str = "desc";

fn cli() -> Command {
    let pkg_name = env!("CARGO_PKG_NAME");

    Command::new(pkg_name)
        .bin_name(pkg_name)
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .subcommand_required(true)
        .arg(arg!(-d --"data-dir" <PATH> "data directory").global(true))
        .subcommand(
            Command::new(CREATE_DATABASE)
                .about("create a database")
                .arg(arg!(<DATABASE> "database name")),
        )
        .subcommand(
            Command::new(DROP_DATABASE)
                .about("drop a database with all its tables")
                .arg(arg!(<DATABASE> "database name")),
        )
        .subcommand(
            Command::new(CREATE_TABLE)
                .about("create a table")
                .arg(arg!(<DATABASE> "database name"))
                .arg(arg!(<TABLE> "table name"))
                .arg(arg!(<COLUMN>... "columns as name:type[:length]")),
        )
        .subcommand(
            Command::new(DROP_TABLE)
                .about("drop a table with its indexes")
                .arg(arg!(<DATABASE> "database name"))
                .arg(arg!(<TABLE> "table name")),
        )
        .subcommand(
            Command::new(CREATE_INDEX)
                .about("create an index, key columns in order")
                .arg(arg!(<DATABASE> "database name"))
                .arg(arg!(<TABLE> "table name"))
                .arg(arg!(<COLUMN>... "key columns")),
        )
        .subcommand(
            Command::new(DROP_INDEX)
                .about("drop an index")
                .arg(arg!(<DATABASE> "database name"))
                .arg(arg!(<TABLE> "table name"))
                .arg(arg!(<COLUMN>... "key columns")),
        )
        .subcommand(
            Command::new(SHOW_TABLES)
                .about("list the tables of a database")
                .arg(arg!(<DATABASE> "database name")),
        )
        .subcommand(
            Command::new(DESC_TABLE)
                .about("describe the columns of a table")
                .arg(arg!(<DATABASE> "database name"))
                .arg(arg!(<TABLE> "table name")),
        )
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = try_main() {
        eprintln!("{}", err);
        process::exit(2);
    }
}

fn try_main() -> Result<()> {
    let matches = cli().get_matches();
    let (name, sub_matches) = match matches.subcommand() {
        Some(subcommand) => subcommand,
        None => unreachable!(),
    };

    let data_dir = match sub_matches.get_one::<String>("data-dir") {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(env::var(TABULA_DATADIR).map_err(|_| Error::NoDataDirectory)?),
    };
    let data_dir = data_dir.as_path();
    debug!(command = name, data_dir = %data_dir.display(), "running");

    let database = arg(sub_matches, "DATABASE");
    let executed = match name {
        CREATE_DATABASE => cmd::create_database(data_dir, database),
        DROP_DATABASE => cmd::drop_database(data_dir, database),
        CREATE_TABLE => cmd::create_table(
            data_dir,
            database,
            arg(sub_matches, "TABLE"),
            &args(sub_matches, "COLUMN"),
        ),
        DROP_TABLE => cmd::drop_table(data_dir, database, arg(sub_matches, "TABLE")),
        CREATE_INDEX => cmd::create_index(
            data_dir,
            database,
            arg(sub_matches, "TABLE"),
            &args(sub_matches, "COLUMN"),
        ),
        DROP_INDEX => cmd::drop_index(
            data_dir,
            database,
            arg(sub_matches, "TABLE"),
            &args(sub_matches, "COLUMN"),
        ),
        SHOW_TABLES => cmd::show_tables(data_dir, database).map(|out| println!("{}", out)),
        DESC_TABLE => cmd::desc_table(data_dir, database, arg(sub_matches, "TABLE"))
            .map(|out| println!("{}", out)),
        _ => unreachable!(),
    };

    executed.context(ExecuteCommandSnafu)
}

/// Required arguments are enforced by clap before we get here.
fn arg<'a>(matches: &'a ArgMatches, id: &str) -> &'a str {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .unwrap_or_default()
}

fn args<'a>(matches: &'a ArgMatches, id: &str) -> Vec<&'a str> {
    matches
        .get_many::<String>(id)
        .map(|values| values.map(String::as_str).collect())
        .unwrap_or_default()
}

use std::{
    env,
    error::Error,
    io::{self, Write},
    path::PathBuf,
    process,
};

use chrono::{Local, NaiveDate};
use tracing_subscriber::filter::LevelFilter;

use registration::{
    config::{self, Config},
    form::FormError,
    logger,
    services::{
        cookies::CookieJar,
        graphql::GraphQlClient,
        navigation::{NavigationState, Navigator},
    },
    Field, Message, Phase, Screen, VERSION,
};

/// Environment variable holding the `Cookie` header when `--cookie` is not given.
const COOKIE_ENV: &str = "REGISTRATION_COOKIE";

fn print_help_exit(code: i32) -> ! {
    eprintln!(
        r#"
register version {VERSION}

Usage: register [OPTIONS]

Finalize an account from the registration token found in the given cookies.

Options:
    --conf <PATH>              Path of the configuration file
    --cookie <HEADER>          Cookie header holding the registration token (or ${COOKIE_ENV})
    --first-name <NAME>        Replace the first name given by the identity provider
    --last-name <NAME>         Replace the last name given by the identity provider
    --display-name <NAME>      Display name
    --dob <YYYY-MM-DD>         Date of birth, defaults to today
    -v, --version              Display register version
    -h, --help                 Print help
        "#
    );
    process::exit(code);
}

#[derive(Debug, Default, PartialEq)]
struct Args {
    conf: Option<PathBuf>,
    cookie: Option<String>,
    edits: Vec<Message>,
}

fn parse_args(args: Vec<String>) -> Result<Args, Box<dyn Error>> {
    if args.len() > 1 && (args[1] == "--version" || args[1] == "-v") {
        eprintln!("{}", VERSION);
        process::exit(0);
    }

    if args.len() > 1 && (args[1] == "--help" || args[1] == "-h") {
        print_help_exit(0);
    }

    let mut res = Args::default();
    let mut iter = args.into_iter().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = || {
            iter.next()
                .ok_or_else(|| format!("missing arg to {}", arg))
        };
        match arg.as_str() {
            "--conf" => res.conf = Some(PathBuf::from(value()?)),
            "--cookie" => res.cookie = Some(value()?),
            "--first-name" => res.edits.push(Message::FirstNameEdited(value()?)),
            "--last-name" => res.edits.push(Message::LastNameEdited(value()?)),
            "--display-name" => res.edits.push(Message::DisplayNameEdited(value()?)),
            "--dob" => {
                let dob = NaiveDate::parse_from_str(&value()?, "%Y-%m-%d")?;
                // The form would keep today's date instead.
                if dob > Local::now().date_naive() {
                    return Err(FormError::FutureDate(dob).into());
                }
                res.edits.push(Message::DateOfBirthEdited(dob));
            }
            other => return Err(format!("unknown argument {}", other).into()),
        }
    }

    Ok(res)
}

/// Prints where the user is sent to.
struct PrintNavigator;

impl Navigator for PrintNavigator {
    fn navigate(&mut self, path: &str, state: Option<NavigationState>) {
        match state.map(|s| serde_json::to_string(&s)) {
            Some(Ok(state)) => println!("{} {}", path, state),
            _ => println!("{}", path),
        }
    }
}

fn main() {
    let args = parse_args(env::args().collect()).unwrap_or_else(|e| {
        eprintln!("{}", e);
        print_help_exit(1);
    });

    let conf_path = match args.conf {
        Some(path) => path,
        None => config::default_config_path().unwrap_or_else(|e| {
            eprintln!("{}", e);
            process::exit(1);
        }),
    };
    let config = Config::from_file(&conf_path).unwrap_or_else(|e| {
        eprintln!("Error parsing config {}: {}", conf_path.display(), e);
        process::exit(1);
    });

    let log_level = match logger::parse_log_level() {
        Ok(Some(level)) => level,
        Ok(None) => config.log_level().unwrap_or(LevelFilter::INFO),
        Err(e) => {
            eprintln!("Invalid LOG_LEVEL: {}", e);
            process::exit(1);
        }
    };
    logger::setup_logger(log_level, config.log_file.as_deref()).unwrap_or_else(|e| {
        eprintln!("Error setting up logger: {}", e);
        process::exit(1);
    });

    let cookie = args
        .cookie
        .or_else(|| env::var(COOKIE_ENV).ok())
        .unwrap_or_default();
    let cookies = CookieJar::parse(&cookie);

    let mut screen = Screen::start(
        &config.session_settings(),
        &cookies,
        PrintNavigator,
        Local::now().date_naive(),
    );
    if let Screen::NoToken(denial) = &screen {
        tracing::error!("{}", denial);
        eprintln!("{}", screen.placeholder().unwrap_or_default());
        process::exit(1);
    }
    let Some(session) = screen.session_mut() else {
        process::exit(1);
    };

    for edit in args.edits {
        session.update(edit);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            tracing::error!("Error starting runtime: {}", e);
            process::exit(1);
        });
    let backend = GraphQlClient::new(config.graphql_url.clone());
    let phase = runtime.block_on(session.submit(&backend)).clone();

    let code = match phase {
        Phase::Success(id) => {
            tracing::info!("Account {} registered", id);
            0
        }
        Phase::Failure { error, .. } => {
            for field in Field::ALL {
                let message = session.field_error(field);
                if !message.is_empty() {
                    eprintln!("{}: {}", field.label(), message);
                }
            }
            tracing::error!("{}", error);
            1
        }
        Phase::Idle | Phase::Loading => 1,
    };

    // Make sure the navigation was written before leaving.
    if let Err(e) = io::stdout().flush() {
        tracing::error!("Flushing stdout: {}", e);
    }
    process::exit(code);
}

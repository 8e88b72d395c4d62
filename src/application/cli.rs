use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Api;
use crate::domain::models::AuthState;
use crate::domain::models::Event;
use crate::domain::models::IdentityProvider;
use crate::domain::services::SessionManager;
use crate::infrastructure::api::http::HttpApi;
use crate::infrastructure::auth::google::GoogleAuth;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

fn hotkeys_text() -> String {
    let header = Paint::new("HOTKEYS:").underline().bold().to_string();
    let lines = vec![
        "  - Enter: Add the typed task, or start sign-in when signed out.",
        "  - Up/Down: Move the task selection.",
        "  - Tab: Cycle the filter between all, active, and completed.",
        "  - Ctrl+T: Toggle the selected task.",
        "  - Ctrl+X: Delete the selected task.",
        "  - Ctrl+R: Refresh the list from the server.",
        "  - Ctrl+O: Sign out.",
        "  - Ctrl+C: Quit.",
    ]
    .join("\n");

    return format!("{header}\n{lines}");
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if !config_file_path.parent().unwrap().exists() {
        fs::create_dir_all(config_file_path.parent().unwrap()).await?;
    }

    let mut file = fs::File::create(config_file_path.clone()).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    let config_path_display = config_file_path.as_os_str().to_str().unwrap();
    println!("Created default config file at {config_path_display}");
    return Ok(());
}

/// Runs the device sign-in flow without the full screen UI. The verification
/// prompt is printed as soon as Google hands it over, while polling continues
/// until the user approves or the code expires.
async fn auth_login() -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if let Event::LoginPrompt(prompt) = event {
                println!(
                    "Open {url} in a browser and enter the code {code}",
                    url = prompt.verification_url,
                    code = prompt.user_code
                );
            }
        }
    });

    let provider_token = GoogleAuth::default().obtain_access_token(&event_tx).await;
    drop(event_tx);
    let _ = printer.await;

    let exchange = HttpApi::default()
        .exchange_google_token(&provider_token?)
        .await?;

    let mut session = SessionManager::default();
    session
        .activate(exchange.access, exchange.user.clone())
        .await?;

    println!(
        "Signed in as {name} <{email}>",
        name = exchange.user.name,
        email = exchange.user.email
    );
    return Ok(());
}

async fn auth_logout() -> Result<()> {
    let mut session = SessionManager::default();
    session.restore().await?;
    session.logout().await?;
    println!("Signed out");
    return Ok(());
}

async fn auth_status() -> Result<()> {
    let mut session = SessionManager::default();
    match session.restore().await? {
        AuthState::Authenticated => {
            let profile = session.profile().unwrap();
            println!(
                "Signed in as {name} <{email}>",
                name = profile.name,
                email = profile.email
            );
        }
        _ => {
            println!("Not signed in");
        }
    }

    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_auth() -> Command {
    return Command::new("auth")
        .about("Manage the signed-in Google account.")
        .arg_required_else_help(true)
        .subcommand(Command::new("login").about("Sign in with Google without starting the UI."))
        .subcommand(Command::new("logout").about("Sign out and clear the stored credential."))
        .subcommand(Command::new("status").about("Print the signed-in account, if any."));
}

pub fn build() -> Command {
    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    return Command::new("chores")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(hotkeys_text())
        .arg_required_else_help(false)
        .subcommand(subcommand_auth())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(Command::new("manpages").about("Generates manpages and outputs to stdout."))
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("CHORES_CONFIG_FILE")
                .num_args(1)
                .help(format!(
                    "Path to configuration file [default: {}]",
                    Config::default(ConfigKey::ConfigFile)
                ))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::ApiURL.to_string())
                .short('u')
                .long(ConfigKey::ApiURL.to_string())
                .env("CHORES_API_URL")
                .num_args(1)
                .help(format!(
                    "Base URL of the task server API. [default: {}]",
                    Config::default(ConfigKey::ApiURL)
                ))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::DataDir.to_string())
                .long(ConfigKey::DataDir.to_string())
                .env("CHORES_DATA_DIR")
                .num_args(1)
                .help("Directory where the session credential and profile are stored. Defaults to the platform data directory.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::GoogleAuthURL.to_string())
                .long(ConfigKey::GoogleAuthURL.to_string())
                .env("CHORES_GOOGLE_AUTH_URL")
                .num_args(1)
                .help(format!(
                    "Base URL of Google's OAuth device authorization endpoints. [default: {}]",
                    Config::default(ConfigKey::GoogleAuthURL)
                ))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::GoogleClientId.to_string())
                .long(ConfigKey::GoogleClientId.to_string())
                .env("CHORES_GOOGLE_CLIENT_ID")
                .num_args(1)
                .help(format!(
                    "OAuth client ID used for the Google device sign-in flow. [default: {}]",
                    Config::default(ConfigKey::GoogleClientId)
                ))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::GoogleUserinfoURL.to_string())
                .long(ConfigKey::GoogleUserinfoURL.to_string())
                .env("CHORES_GOOGLE_USERINFO_URL")
                .num_args(1)
                .help(format!(
                    "URL of Google's OpenID userinfo endpoint. [default: {}]",
                    Config::default(ConfigKey::GoogleUserinfoURL)
                ))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::RequestTimeout.to_string())
                .long(ConfigKey::RequestTimeout.to_string())
                .env("CHORES_REQUEST_TIMEOUT")
                .num_args(1)
                .help(format!(
                    "Timeout in milliseconds for task server requests. [default: {}]",
                    Config::default(ConfigKey::RequestTimeout)
                ))
                .global(true),
        );
}

pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("auth", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            match subcmd_matches.subcommand() {
                Some(("login", _)) => {
                    auth_login().await?;
                }
                Some(("logout", _)) => {
                    auth_logout().await?;
                }
                Some(("status", _)) => {
                    auth_status().await?;
                }
                _ => {
                    subcommand_auth().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        Some(("manpages", _)) => {
            clap_mangen::Man::new(build()).render(&mut io::stdout())?;
            return Ok(false);
        }
        _ => {
            Config::load(build(), vec![&matches]).await?;
        }
    }

    return Ok(true);
}

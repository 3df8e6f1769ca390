#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::io;
use std::path;
use std::process;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Result;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use owo_colors::OwoColorize;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Document;
use crate::domain::models::Position;
use crate::domain::models::Selection;
use crate::domain::services::CommandRunner;
use crate::domain::services::CommandService;
use crate::domain::services::CommandSet;
use crate::domain::services::RunReport;
use crate::domain::services::RunnerSettings;
use crate::infrastructure::backends::openai::OpenAI;
use crate::infrastructure::documents::TextDocument;
use crate::infrastructure::input::terminal::TerminalInput;

const CANCELLED_EXIT_CODE: i32 = 130;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

fn format_commands(commands: &CommandSet) -> String {
    return commands
        .commands
        .iter()
        .map(|command| {
            let mut res = format!("- {}: {}", command.id, command.name);
            if let Some(icon) = &command.icon {
                res = format!("{res} ({icon})");
            }
            return res;
        })
        .collect::<Vec<String>>()
        .join("\n");
}

fn print_notices(commands: &CommandSet) {
    for notice in &commands.notices {
        eprintln!("{}", notice.yellow());
    }
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
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
        .arg_required_else_help(true)
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

fn subcommand_commands() -> Command {
    return Command::new("commands")
        .about("Lists the built-in and custom commands available to run.");
}

fn subcommand_run() -> Command {
    return Command::new("run")
        .about("Runs a command against a file and streams the answer into it.")
        .arg(
            Arg::new("command-id")
                .help("ID of the command to run. See `scrivener commands`.")
                .required(true),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .help("File to run the command against. It is created if it does not exist.")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new("cursor")
                .long("cursor")
                .help("Zero-indexed cursor position as LINE:COLUMN. [default: end of the file]")
                .num_args(1)
                .value_parser(value_parser!(Position)),
        )
        .arg(
            Arg::new("selection")
                .short('s')
                .long("selection")
                .help("Zero-indexed selection as LINE:COLUMN-LINE:COLUMN. Can be repeated.")
                .action(ArgAction::Append)
                .value_parser(value_parser!(Selection)),
        )
        .arg(
            Arg::new("stdout")
                .long("stdout")
                .help("Print the updated document instead of saving it.")
                .num_args(0),
        );
}

fn arg_model() -> Arg {
    return Arg::new(ConfigKey::Model.to_string())
        .short('m')
        .long(ConfigKey::Model.to_string())
        .env("SCRIVENER_MODEL")
        .num_args(1)
        .help(format!(
            "Model used for completions. [default: {}]",
            Config::default(ConfigKey::Model)
        ))
        .global(true);
}

pub fn build() -> Command {
    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    return Command::new("scrivener")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(true)
        .subcommand(subcommand_run())
        .subcommand(subcommand_commands())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .arg(arg_model())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("SCRIVENER_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::OpenAiURL.to_string())
                .long(ConfigKey::OpenAiURL.to_string())
                .env("SCRIVENER_OPENAI_URL")
                .num_args(1)
                .help(format!("Chat completions endpoint. Can be swapped to any OpenAI compatible server. [default: {}]", Config::default(ConfigKey::OpenAiURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::OpenAiToken.to_string())
                .long(ConfigKey::OpenAiToken.to_string())
                .env("SCRIVENER_OPENAI_TOKEN")
                .num_args(1)
                .help("OpenAI API token.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::OpenAiOrganization.to_string())
                .long(ConfigKey::OpenAiOrganization.to_string())
                .env("SCRIVENER_OPENAI_ORGANIZATION")
                .num_args(1)
                .help("OpenAI organization sent along with every request.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::ResponseFormat.to_string())
                .long(ConfigKey::ResponseFormat.to_string())
                .env("SCRIVENER_RESPONSE_FORMAT")
                .num_args(1)
                .help(format!("Where answers are placed. {{{{RESPONSE}}}} marks the answer and {{{{NEWLINE}}}} breaks a line that has content. [default: {}]", Config::default(ConfigKey::ResponseFormat)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::CustomCommands.to_string())
                .long(ConfigKey::CustomCommands.to_string())
                .env("SCRIVENER_CUSTOM_COMMANDS")
                .num_args(1)
                .help("JSON list of custom commands. A command sharing an id with a built-in replaces it.")
                .global(true),
        );
}

/// Loads the file, applies the requested cursor and selections, then runs the
/// command until the stream ends or Ctrl-C is pressed.
#[allow(clippy::implicit_return)]
async fn run_command(matches: &ArgMatches) -> Result<()> {
    let commands = CommandService::load(&Config::get(ConfigKey::CustomCommands));
    print_notices(&commands);

    let command_id = matches
        .get_one::<String>("command-id")
        .ok_or_else(|| return anyhow!("A command id is required"))?;
    let command = commands
        .find(command_id)
        .ok_or_else(|| {
            return anyhow!(
                "Unknown command '{command_id}'. Available commands:\n{}",
                format_commands(&commands)
            );
        })?
        .clone();

    let file = matches
        .get_one::<String>("file")
        .ok_or_else(|| return anyhow!("A file is required"))?;
    let file_path = path::PathBuf::from(file);

    let mut document = if file_path.exists() {
        TextDocument::open(&file_path).await?
    } else {
        TextDocument::new("")
    };

    match matches.get_one::<Position>("cursor") {
        Some(cursor) => document.set_cursor(*cursor),
        None => {
            let last_line = document.line_count().saturating_sub(1);
            let end = document.line(last_line).chars().count();
            document.set_cursor(Position::new(last_line, end));
        }
    }

    if let Some(selections) = matches.get_many::<Selection>("selection") {
        document.set_selections(selections.copied().collect());
    }

    let mut runner = CommandRunner::new(
        Box::<OpenAI>::default(),
        RunnerSettings::from_config(),
    );
    let input = TerminalInput::default();

    let report: Option<RunReport> = tokio::select! {
        res = runner.run(&command, &mut document, &file_path, &input) => Some(res?),
        _ = tokio::signal::ctrl_c() => None,
    };
    drop(runner);

    if matches.get_flag("stdout") {
        print!("{}", document.value());
    } else {
        document.save(&file_path).await?;
    }

    if let Some(code) = report_outcome(report) {
        // An open terminal prompt keeps its blocking thread parked on stdin,
        // which the runtime would wait on during shutdown.
        process::exit(code);
    }

    return Ok(());
}

/// Prints what the run left for the user. Returns the exit code to leave with
/// immediately when the run was cancelled.
fn report_outcome(report: Option<RunReport>) -> Option<i32> {
    let Some(report) = report else {
        eprintln!("{}", "Cancelled. Text received so far was kept.".yellow());
        return Some(CANCELLED_EXIT_CODE);
    };

    for err in &report.errors {
        eprintln!("{}", err.red());
    }
    tracing::debug!(cursor = %report.cursor, length = report.response.len(), "Command finished");

    return None;
}

#[allow(clippy::implicit_return)]
pub async fn parse() -> Result<()> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("run", subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
            run_command(subcmd_matches).await?;
        }
        Some(("commands", subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
            let commands = CommandService::load(&Config::get(ConfigKey::CustomCommands));
            print_notices(&commands);
            println!("{}", format_commands(&commands));
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
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
            }
            _ => {
                subcommand_config().print_long_help()?;
            }
        },
        _ => {
            build().print_long_help()?;
        }
    }

    return Ok(());
}

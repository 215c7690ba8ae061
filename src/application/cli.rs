#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::io;
use std::path;

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
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use crate::application::repl::help_text;
use crate::configuration::Config;
use crate::configuration::ConfigKey;

/// What the user asked the binary to do once configuration is loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Task {
    ListDocuments,
    UploadDocuments(Vec<path::PathBuf>),
    DeleteDocument(String),
    DocumentContent(String),
    Ask {
        question: String,
        document_id: Option<String>,
    },
    Chat,
    Health,
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
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

fn arg_id(help: &'static str) -> Arg {
    return Arg::new("id").help(help).num_args(1).required(true);
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
        .subcommand(Command::new("create").about(
            "Saves the default config file to the configuration file path. \
             This command will fail if the file exists already.",
        ))
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout."),
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file."),
        );
}

fn subcommand_documents() -> Command {
    return Command::new("documents")
        .about("Manage the document library.")
        .arg_required_else_help(true)
        .subcommand(Command::new("list").about("List all uploaded documents."))
        .subcommand(
            Command::new("upload")
                .about("Upload one or more documents. Supported types are PDF, DOCX, TXT and CSV.")
                .arg(
                    Arg::new("files")
                        .help("Paths of the files to upload.")
                        .num_args(1..)
                        .value_parser(value_parser!(path::PathBuf))
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a document by ID.")
                .arg(arg_id("Document ID")),
        )
        .subcommand(
            Command::new("content")
                .about("Print the extracted text of a document.")
                .arg(arg_id("Document ID")),
        );
}

fn subcommand_ask() -> Command {
    return Command::new("ask")
        .about("Ask a question about your documents.")
        .arg(
            Arg::new("question")
                .help("The question to ask.")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new("document")
                .short('d')
                .long("document")
                .help("Only search the document with this ID.")
                .num_args(1),
        );
}

fn subcommand_chat() -> Command {
    return Command::new("chat")
        .about("Start an interactive chat with the assistant.")
        .arg(
            Arg::new(ConfigKey::SessionID.to_string())
                .short('i')
                .long(ConfigKey::SessionID.to_string())
                .env("SOLVEX_SESSION_ID")
                .num_args(1)
                .help("Continue an existing chat session by loading its history first."),
        );
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") {
                return Paint::new(format!("CHAT {line}"))
                    .underline()
                    .bold()
                    .to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    return Command::new("solvex")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(true)
        .subcommand(subcommand_ask())
        .subcommand(subcommand_chat())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_documents())
        .subcommand(
            Command::new("health").about("Check whether the API server and its services are up."),
        )
        .arg(
            Arg::new(ConfigKey::ApiURL.to_string())
                .long(ConfigKey::ApiURL.to_string())
                .env("SOLVEX_API_URL")
                .num_args(1)
                .help(format!(
                    "Base URL of the SolveX API server. [default: {}]",
                    Config::default(ConfigKey::ApiURL)
                ))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("SOLVEX_CONFIG_FILE")
                .num_args(1)
                .help(format!(
                    "Path to configuration file [default: {}]",
                    Config::default(ConfigKey::ConfigFile)
                ))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::MaxUploadBytes.to_string())
                .long(ConfigKey::MaxUploadBytes.to_string())
                .env("SOLVEX_MAX_UPLOAD_BYTES")
                .num_args(1)
                .help(format!(
                    "Largest file size in bytes accepted for upload. [default: {}]",
                    Config::default(ConfigKey::MaxUploadBytes)
                ))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::RequestTimeout.to_string())
                .long(ConfigKey::RequestTimeout.to_string())
                .env("SOLVEX_REQUEST_TIMEOUT")
                .num_args(1)
                .help(format!(
                    "Time to wait in milliseconds before a request to the API server times out. \
                     [default: {}]",
                    Config::default(ConfigKey::RequestTimeout)
                ))
                .global(true),
        );
}

fn one_arg(matches: &ArgMatches, name: &str) -> Result<String> {
    if let Some(val) = matches.get_one::<String>(name) {
        return Ok(val.to_string());
    }

    bail!(format!("Missing argument '{name}'"));
}

fn documents_task(matches: &ArgMatches) -> Result<Option<Task>> {
    match matches.subcommand() {
        Some(("list", _)) => {
            return Ok(Some(Task::ListDocuments));
        }
        Some(("upload", upload_matches)) => {
            let files = upload_matches
                .get_many::<path::PathBuf>("files")
                .map(|files| return files.cloned().collect::<Vec<path::PathBuf>>())
                .unwrap_or_default();
            return Ok(Some(Task::UploadDocuments(files)));
        }
        Some(("delete", delete_matches)) => {
            return Ok(Some(Task::DeleteDocument(one_arg(delete_matches, "id")?)));
        }
        Some(("content", content_matches)) => {
            return Ok(Some(Task::DocumentContent(one_arg(content_matches, "id")?)));
        }
        _ => {
            subcommand_documents().print_long_help()?;
            return Ok(None);
        }
    }
}

/// Resolves the command line into a task, loading configuration on the way.
/// Returns `None` when the command was fully handled here.
pub async fn parse_from(args: Vec<String>) -> Result<Option<Task>> {
    let matches = build().try_get_matches_from(args)?;

    match matches.subcommand() {
        Some(("ask", subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
            return Ok(Some(Task::Ask {
                question: one_arg(subcmd_matches, "question")?,
                document_id: subcmd_matches
                    .get_one::<String>("document")
                    .map(|id| return id.to_string()),
            }));
        }
        Some(("chat", subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
            return Ok(Some(Task::Chat));
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(None);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(None);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(None);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(None);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(None);
            }
        },
        Some(("documents", subcmd_matches)) => {
            let selected = subcmd_matches
                .subcommand()
                .map(|(_, selected)| return selected);
            match selected {
                Some(selected) => Config::load(vec![&matches, subcmd_matches, selected]).await?,
                None => Config::load(vec![&matches, subcmd_matches]).await?,
            }
            return documents_task(subcmd_matches);
        }
        Some(("health", subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
            return Ok(Some(Task::Health));
        }
        _ => {
            build().print_long_help()?;
            return Ok(None);
        }
    }
}

pub async fn parse() -> Result<Option<Task>> {
    match parse_from(std::env::args().collect()).await {
        Ok(task) => return Ok(task),
        Err(err) => {
            // Help and version output are reported by clap as errors.
            if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
                clap_err.exit();
            }
            return Err(err);
        }
    }
}

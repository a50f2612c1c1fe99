//! Command line parsing

use std::collections::HashMap;
use std::path::PathBuf;

use crate::errors::DashboardError;
use crate::http::ReferenceKind;
use crate::views::project_list::StatusFilter;

/// Collect `--key=value` pairs; bare `--flag`s map to `"true"`
pub fn parse_args<I>(args: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = String>,
{
    let mut cli_args = HashMap::new();
    for arg in args {
        if let Some((key, value)) = arg.split_once('=') {
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }
    cli_args
}

/// Credentials given on the command line for a connection test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionArgs {
    pub host: String,
    pub port: Option<String>,
    pub username: String,
    pub password: Option<String>,
    pub key_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceAction {
    List,
    Get(String),
    Add(String),
    Rename { id: String, name: String },
    Remove(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Version,
    Help,
    List {
        search: String,
        filter: StatusFilter,
    },
    Show(String),
    Deploy(String),
    History(String),
    Create {
        file: PathBuf,
    },
    Edit {
        id: String,
        file: PathBuf,
    },
    Delete(String),
    TestConnection(ConnectionArgs),
    Reference {
        kind: ReferenceKind,
        action: ReferenceAction,
    },
    /// Show step validity of a project file, optionally saving it as a draft
    Wizard {
        file: PathBuf,
        save_draft: bool,
    },
    Drafts,
    Draft(String),
    DeleteDraft(String),
}

impl Command {
    pub fn from_args(args: &HashMap<String, String>) -> Result<Self, DashboardError> {
        if args.contains_key("version") {
            return Ok(Command::Version);
        }
        if args.contains_key("help") {
            return Ok(Command::Help);
        }

        if let Some(id) = value(args, "deploy")? {
            return Ok(Command::Deploy(id));
        }
        if let Some(id) = value(args, "history")? {
            return Ok(Command::History(id));
        }
        if args.contains_key("create") {
            return Ok(Command::Create {
                file: required(args, "file")?.into(),
            });
        }
        if let Some(id) = value(args, "edit")? {
            return Ok(Command::Edit {
                id,
                file: required(args, "file")?.into(),
            });
        }
        if let Some(id) = value(args, "delete")? {
            return Ok(Command::Delete(id));
        }
        if args.contains_key("test-connection") {
            return Ok(Command::TestConnection(ConnectionArgs {
                host: required(args, "host")?,
                port: optional(args, "port"),
                username: required(args, "username")?,
                password: optional(args, "password"),
                key_file: optional(args, "key-file").map(PathBuf::from),
            }));
        }
        for kind in [
            ReferenceKind::Tools,
            ReferenceKind::ProjectTypes,
            ReferenceKind::Organizations,
        ] {
            if args.contains_key(kind.path().trim_start_matches('/')) {
                return Ok(Command::Reference {
                    kind,
                    action: reference_action(args)?,
                });
            }
        }
        if let Some(file) = value(args, "wizard")? {
            return Ok(Command::Wizard {
                file: file.into(),
                save_draft: args.contains_key("save-draft"),
            });
        }
        if args.contains_key("drafts") {
            return Ok(Command::Drafts);
        }
        if let Some(id) = value(args, "draft")? {
            return Ok(Command::Draft(id));
        }
        if let Some(id) = value(args, "delete-draft")? {
            return Ok(Command::DeleteDraft(id));
        }
        if let Some(id) = value(args, "show")? {
            return Ok(Command::Show(id));
        }

        // Listing is the dashboard's home page
        let filter = optional(args, "filter")
            .map(|f| f.parse::<StatusFilter>())
            .transpose()
            .map_err(DashboardError::ValidationError)?
            .unwrap_or_default();
        Ok(Command::List {
            search: optional(args, "search").unwrap_or_default(),
            filter,
        })
    }

    /// Commands that follow a live session need the realtime worker
    pub fn needs_realtime(&self) -> bool {
        matches!(self, Command::Deploy(_) | Command::TestConnection(_))
    }
}

fn reference_action(args: &HashMap<String, String>) -> Result<ReferenceAction, DashboardError> {
    if let Some(id) = value(args, "get")? {
        return Ok(ReferenceAction::Get(id));
    }
    if let Some(name) = value(args, "add")? {
        return Ok(ReferenceAction::Add(name));
    }
    if let Some(id) = value(args, "rename")? {
        return Ok(ReferenceAction::Rename {
            id,
            name: required(args, "name")?,
        });
    }
    if let Some(id) = value(args, "remove")? {
        return Ok(ReferenceAction::Remove(id));
    }
    Ok(ReferenceAction::List)
}

fn optional(args: &HashMap<String, String>, key: &str) -> Option<String> {
    args.get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A `--key=value` option whose value is mandatory when the key is present
fn value(args: &HashMap<String, String>, key: &str) -> Result<Option<String>, DashboardError> {
    match args.get(key).map(|v| v.trim()) {
        None => Ok(None),
        Some("") | Some("true") => Err(DashboardError::ValidationError(format!(
            "--{} needs a value: --{}=<value>",
            key, key
        ))),
        Some(v) => Ok(Some(v.to_string())),
    }
}

fn required(args: &HashMap<String, String>, key: &str) -> Result<String, DashboardError> {
    value(args, key)?.ok_or_else(|| {
        DashboardError::ValidationError(format!("Missing required option --{}=<value>", key))
    })
}

pub const USAGE: &str = "\
Usage: shipdeck [--config=<settings.json>] <command>

Commands:
  --list [--search=<text>] [--filter=all|active|failed]   list projects (default)
  --show=<id>                                              project details and history
  --deploy=<id>                                            deploy and follow the logs
  --history=<id>                                           deployment history
  --create --file=<project.json>                           create a project
  --edit=<id> --file=<project.json>                        update fields of a project
  --delete=<id>                                            delete a project
  --test-connection --host=<host> --username=<user> [--port=<port>]
                    [--password=<password> | --key-file=<path>]
  --tools | --project-types | --organizations
        [--get=<id> | --add=<name> | --rename=<id> --name=<name> | --remove=<id>]
  --wizard=<project.json> [--save-draft]                   show wizard step validity
  --drafts | --draft=<id> | --delete-draft=<id>            manage saved drafts
  --version";

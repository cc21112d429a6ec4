use std::path::PathBuf;

use snafu::{OptionExt, Snafu};

use crate::resources::NodeId;

pub const HELP: &str = "\
ls                   list the current folder
pwd                  show the breadcrumb
tree                 show the whole tree
cd <id> | .. | /     change folder
open <id>            open a folder, file or link
mkdir <name>         create a folder            (admin)
upload <path>        upload a file              (admin)
link <url> <name>    add a web link             (admin)
rename <id> <name>   rename an entry            (admin)
rm <id>              delete an entry            (admin)
login <secret>       switch to admin
logout               switch to student
whoami               show the current role
quit                 end the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CdTarget {
    Root,
    Up,
    Folder(NodeId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Pwd,
    Tree,
    Cd(CdTarget),
    Open { id: NodeId },
    Mkdir { name: String },
    Upload { path: PathBuf },
    Link { url: String, name: String },
    Rename { id: NodeId, name: String },
    Remove { id: NodeId },
    Login { secret: String },
    Logout,
    WhoAmI,
    Help,
    Quit,
}

impl Command {
    /// Parses one session line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb {
            "ls" => Command::List,
            "pwd" => Command::Pwd,
            "tree" => Command::Tree,
            "cd" => Command::Cd(match rest {
                "" | "/" => CdTarget::Root,
                ".." => CdTarget::Up,
                raw => CdTarget::Folder(parse_id(raw)?),
            }),
            "open" => Command::Open {
                id: parse_id(required("open", "id", rest)?)?,
            },
            "mkdir" => Command::Mkdir {
                name: required("mkdir", "name", rest)?.to_string(),
            },
            "upload" => Command::Upload {
                path: PathBuf::from(required("upload", "path", rest)?),
            },
            "link" => {
                let (url, name) = split_pair("link", "name", required("link", "url", rest)?)?;
                Command::Link {
                    url: url.to_string(),
                    name: name.to_string(),
                }
            }
            "rename" => {
                let (id, name) = split_pair("rename", "name", required("rename", "id", rest)?)?;
                Command::Rename {
                    id: parse_id(id)?,
                    name: name.to_string(),
                }
            }
            "rm" => Command::Remove {
                id: parse_id(required("rm", "id", rest)?)?,
            },
            "login" => Command::Login {
                secret: rest.to_string(),
            },
            "logout" => Command::Logout,
            "whoami" => Command::WhoAmI,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return UnknownCommandSnafu { name: other }.fail(),
        };

        Ok(Some(command))
    }

    /// Whether the command changes the tree and therefore needs the admin role.
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Command::Mkdir { .. }
                | Command::Upload { .. }
                | Command::Link { .. }
                | Command::Rename { .. }
                | Command::Remove { .. }
        )
    }
}

fn required<'a>(
    command: &'static str,
    argument: &'static str,
    rest: &'a str,
) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        MissingArgumentSnafu { command, argument }.fail()
    } else {
        Ok(rest)
    }
}

fn split_pair<'a>(
    command: &'static str,
    second: &'static str,
    rest: &'a str,
) -> Result<(&'a str, &'a str), CommandError> {
    rest.split_once(char::is_whitespace)
        .map(|(first, tail)| (first, tail.trim()))
        .filter(|(_, tail)| !tail.is_empty())
        .context(MissingArgumentSnafu {
            command,
            argument: second,
        })
}

fn parse_id(raw: &str) -> Result<NodeId, CommandError> {
    raw.parse::<NodeId>().ok().context(InvalidIdSnafu { raw })
}

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum CommandError {
    #[snafu(display("Unknown command '{}', try 'help'", name))]
    UnknownCommand { name: String },
    #[snafu(display("'{}' needs a {}", command, argument))]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[snafu(display("'{}' is not a node id", raw))]
    InvalidId { raw: String },
}

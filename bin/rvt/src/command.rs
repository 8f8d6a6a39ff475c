use rvt_app::{
    Message, ValidationError, validation::parse_confidence, workflow::auth::AuthMode,
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}', type `help` for the list")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("'{0}' is not a topic id")]
    InvalidId(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

pub const HELP: &str = "\
Commands:
  login <email> <password>
  register <email> <password> <confirm>
  switch login|register
  go queue|topics|syllabus|stats
  text <syllabus text>      subject [name]
  parse                     commit
  revise <topic-id> [1-5]
  mode <name>
  logout    reload    quit";

/// What one input line asks for
#[derive(Debug)]
pub enum Command {
    Blank,
    Help,
    Send(Message),
}

/// Turn one input line into a command for the shell
pub fn parse(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (name, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    let args: Vec<&str> = rest.split_whitespace().collect();

    let message = match name {
        "" => return Ok(Command::Blank),
        "help" => return Ok(Command::Help),
        "login" => match args.as_slice() {
            [email, password] => Message::Login {
                email: (*email).to_string(),
                password: (*password).to_string(),
            },
            _ => return Err(CommandError::Usage("login <email> <password>")),
        },
        "register" => match args.as_slice() {
            [email, password, confirm] => Message::Register {
                email: (*email).to_string(),
                password: (*password).to_string(),
                confirm: (*confirm).to_string(),
            },
            _ => return Err(CommandError::Usage("register <email> <password> <confirm>")),
        },
        "switch" => match rest {
            "login" => Message::SwitchAuthMode(AuthMode::Login),
            "register" => Message::SwitchAuthMode(AuthMode::Register),
            _ => return Err(CommandError::Usage("switch login|register")),
        },
        "go" if !rest.is_empty() => Message::Navigate(rest.to_string()),
        "go" => return Err(CommandError::Usage("go queue|topics|syllabus|stats")),
        "text" => Message::SetSyllabusText(rest.to_string()),
        "subject" => Message::SetSyllabusSubject(Some(rest.to_string()).filter(|s| !s.is_empty())),
        "parse" => Message::ParseSyllabus,
        "commit" => Message::CommitSyllabus,
        "revise" => match args.as_slice() {
            [id, confidence @ ..] if confidence.len() <= 1 => Message::Revise {
                topic_id: Uuid::parse_str(id)
                    .map_err(|_| CommandError::InvalidId((*id).to_string()))?,
                confidence: parse_confidence(confidence.first().copied())?,
            },
            _ => return Err(CommandError::Usage("revise <topic-id> [1-5]")),
        },
        "mode" if !rest.is_empty() => Message::SelectMode(rest.to_string()),
        "mode" => return Err(CommandError::Usage("mode <name>")),
        "logout" => Message::Logout,
        "reload" => Message::Reload,
        "quit" | "exit" => Message::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Command::Send(message))
}

use std::num::ParseIntError;
use std::str::FromStr;

use tasksync_core::TaskId;
use thiserror::Error;

pub const USAGE: &str = "\
commands:
  login EMAIL PASSWORD     sign in
  register EMAIL PASSWORD  create an account and sign in
  logout                   sign out
  ls                       list tasks
  edit ID                  load a task into the composer
  title TEXT...            set the composer title
  new                      reset the composer to create mode
  submit                   create or update from the composer
  rm ID                    delete a task
  whoami                   show session and composer state
  help                     show this message
  quit                     exit";

/// One console line, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { email: String, password: String },
    Register { email: String, password: String },
    Logout,
    Ls,
    Edit(TaskId),
    Title(String),
    New,
    Submit,
    Rm(TaskId),
    Whoami,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty line")]
    Empty,
    #[error("cannot parse line: {0}")]
    Syntax(String),
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("invalid task id '{value}': {source}")]
    InvalidId {
        value: String,
        source: ParseIntError,
    },
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words = shell_words::split(line).map_err(|err| ParseError::Syntax(err.to_string()))?;
        let Some((name, args)) = words.split_first() else {
            return Err(ParseError::Empty);
        };

        match (name.as_str(), args) {
            ("login", [email, password]) => Ok(Self::Login {
                email: email.clone(),
                password: password.clone(),
            }),
            ("login", _) => Err(ParseError::Usage("login EMAIL PASSWORD")),
            ("register", [email, password]) => Ok(Self::Register {
                email: email.clone(),
                password: password.clone(),
            }),
            ("register", _) => Err(ParseError::Usage("register EMAIL PASSWORD")),
            ("logout", []) => Ok(Self::Logout),
            ("ls", []) => Ok(Self::Ls),
            ("edit", [id]) => parse_id(id).map(Self::Edit),
            ("edit", _) => Err(ParseError::Usage("edit ID")),
            ("title", []) => Err(ParseError::Usage("title TEXT...")),
            ("title", words) => Ok(Self::Title(words.join(" "))),
            ("new", []) => Ok(Self::New),
            ("submit", []) => Ok(Self::Submit),
            ("rm", [id]) => parse_id(id).map(Self::Rm),
            ("rm", _) => Err(ParseError::Usage("rm ID")),
            ("whoami", []) => Ok(Self::Whoami),
            ("help" | "?", _) => Ok(Self::Help),
            ("quit" | "exit", _) => Ok(Self::Quit),
            ("logout" | "ls" | "new" | "submit" | "whoami", _) => {
                Err(ParseError::Usage("takes no arguments"))
            }
            (other, _) => Err(ParseError::Unknown(other.to_owned())),
        }
    }
}

fn parse_id(value: &str) -> Result<TaskId, ParseError> {
    value.parse().map_err(|source| ParseError::InvalidId {
        value: value.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Command, ParseError> {
        line.parse()
    }

    #[test]
    fn parses_login_with_quoted_password() {
        assert_eq!(
            parse(r#"login ann@example.com "pass word""#),
            Ok(Command::Login {
                email: "ann@example.com".into(),
                password: "pass word".into(),
            })
        );
    }

    #[test]
    fn title_joins_remaining_words() {
        assert_eq!(parse("title buy  oat milk"), Ok(Command::Title("buy oat milk".into())));
        assert_eq!(parse("title 'buy  oat'"), Ok(Command::Title("buy  oat".into())));
    }

    #[test]
    fn ids_are_numeric() {
        assert_eq!(parse("edit 7"), Ok(Command::Edit(TaskId(7))));
        assert_eq!(parse("rm 12"), Ok(Command::Rm(TaskId(12))));
        assert!(matches!(parse("rm seven"), Err(ParseError::InvalidId { .. })));
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert_eq!(parse("frobnicate"), Err(ParseError::Unknown("frobnicate".into())));
        assert!(matches!(parse("title \"unterminated"), Err(ParseError::Syntax(_))));
    }

    #[test]
    fn arity_is_checked() {
        assert_eq!(parse("login only-email"), Err(ParseError::Usage("login EMAIL PASSWORD")));
        assert_eq!(parse("edit"), Err(ParseError::Usage("edit ID")));
        assert_eq!(parse("ls now"), Err(ParseError::Usage("takes no arguments")));
    }

    #[test]
    fn bare_commands() {
        assert_eq!(parse("ls"), Ok(Command::Ls));
        assert_eq!(parse("new"), Ok(Command::New));
        assert_eq!(parse("submit"), Ok(Command::Submit));
        assert_eq!(parse("logout"), Ok(Command::Logout));
        assert_eq!(parse("whoami"), Ok(Command::Whoami));
        assert_eq!(parse("help"), Ok(Command::Help));
        assert_eq!(parse("quit"), Ok(Command::Quit));
    }
}

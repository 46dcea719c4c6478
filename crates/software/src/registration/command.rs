//! Parses the lines sent by the register-switch unit.
//!
//! A line is a verb followed by space-separated arguments:
//!
//! - `stop on 1,2 off 3` switches stops, in pairs of `on`/`off` and a comma-separated list of ids;
//! - `piston P1` selects a piston;
//! - `reeds on` or `reeds off` toggles the reed cutoff.
//!
//! Parsing is all-or-nothing, so a line that fails anywhere leaves the registration untouched.

use super::StopId;
use core::fmt;
use core::str::FromStr;

/// The two positions of a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    /// `on`
    On,
    /// `off`
    Off,
}

impl FromStr for Switch {
    type Err = CommandError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            _ => Err(CommandError::InvalidSwitch(token.to_owned())),
        }
    }
}

/// One parsed line from the register-switch unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Draws or retires stops, in the order given.
    Stops(Vec<(Switch, Vec<StopId>)>),
    /// Selects a piston by name.
    Piston(String),
    /// Enables or disables the reed cutoff.
    Reeds(Switch),
}

/// Why a line from the register-switch unit was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The line held no tokens.
    Empty,
    /// The first token isn't `stop`, `piston` or `reeds`.
    UnknownVerb(String),
    /// The verb was given the wrong number of arguments.
    ArgumentCount {
        /// The verb in question.
        verb: &'static str,
        /// How many arguments followed it.
        found: usize,
    },
    /// A stop id isn't an integer between 0 and 127.
    InvalidStop(String),
    /// A switch position isn't `on` or `off`.
    InvalidSwitch(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty command"),
            Self::UnknownVerb(verb) => write!(f, "unknown command `{verb}`"),
            Self::ArgumentCount { verb, found } => {
                write!(f, "`{verb}` cannot take {found} argument(s)")
            }
            Self::InvalidStop(stop) => write!(f, "invalid stop id `{stop}`"),
            Self::InvalidSwitch(switch) => {
                write!(f, "expected `on` or `off` but got `{switch}`")
            }
        }
    }
}

impl std::error::Error for CommandError {}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let verb = tokens.next().ok_or(CommandError::Empty)?;
        let arguments: Vec<&str> = tokens.collect();

        match verb {
            "stop" => {
                if arguments.is_empty() || arguments.len() % 2 != 0 {
                    return Err(CommandError::ArgumentCount {
                        verb: "stop",
                        found: arguments.len(),
                    });
                }
                arguments
                    .chunks_exact(2)
                    .map(|pair| -> Result<_, CommandError> {
                        Ok((pair[0].parse::<Switch>()?, parse_stops(pair[1])?))
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Self::Stops)
            }
            "piston" => match arguments.as_slice() {
                [name] => Ok(Self::Piston((*name).to_owned())),
                _ => Err(CommandError::ArgumentCount {
                    verb: "piston",
                    found: arguments.len(),
                }),
            },
            "reeds" => match arguments.as_slice() {
                [switch] => Ok(Self::Reeds(switch.parse()?)),
                _ => Err(CommandError::ArgumentCount {
                    verb: "reeds",
                    found: arguments.len(),
                }),
            },
            _ => Err(CommandError::UnknownVerb(verb.to_owned())),
        }
    }
}

fn parse_stops(list: &str) -> Result<Vec<StopId>, CommandError> {
    list.split(',')
        .map(|stop| {
            let digits = !stop.is_empty() && stop.bytes().all(|b| b.is_ascii_digit());
            match stop.parse::<StopId>() {
                Ok(id) if digits && id <= 127 => Ok(id),
                _ => Err(CommandError::InvalidStop(stop.to_owned())),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod valid {
        use super::*;

        #[test]
        fn stops() {
            assert_eq!(
                Ok(Command::Stops(vec![(Switch::On, vec![1, 2]), (Switch::Off, vec![3])])),
                "stop on 1,2 off 3".parse(),
                "Expected left but got right"
            );
        }

        #[test]
        fn piston() {
            assert_eq!(Ok(Command::Piston("P1".to_owned())), "piston P1".parse());
        }

        #[test]
        fn reeds() {
            assert_eq!(Ok(Command::Reeds(Switch::On)), "reeds on".parse());
            assert_eq!(Ok(Command::Reeds(Switch::Off)), "reeds off".parse());
        }

        #[test]
        fn surrounding_whitespace_is_ignored() {
            assert_eq!(Ok(Command::Reeds(Switch::Off)), "  reeds   off\n".parse());
        }

        #[test]
        fn highest_stop_id() {
            assert_eq!(
                Ok(Command::Stops(vec![(Switch::On, vec![0, 127])])),
                "stop on 0,127".parse()
            );
        }
    }

    mod malformed {
        use super::*;

        fn parse(line: &str) -> Result<Command, CommandError> {
            line.parse()
        }

        #[test]
        fn empty_line() {
            assert_eq!(Err(CommandError::Empty), parse(""));
            assert_eq!(Err(CommandError::Empty), parse("   \n"));
        }

        #[test]
        fn unknown_verb() {
            assert_eq!(Err(CommandError::UnknownVerb("coupler".to_owned())), parse("coupler on"));
        }

        #[test]
        fn odd_token_count() {
            assert_eq!(
                Err(CommandError::ArgumentCount { verb: "stop", found: 3 }),
                parse("stop on 1 off"),
                "Expected left but got right"
            );
            assert_eq!(
                Err(CommandError::ArgumentCount { verb: "stop", found: 0 }),
                parse("stop")
            );
        }

        #[test]
        fn wrong_argument_count() {
            assert_eq!(
                Err(CommandError::ArgumentCount { verb: "piston", found: 0 }),
                parse("piston")
            );
            assert_eq!(
                Err(CommandError::ArgumentCount { verb: "reeds", found: 2 }),
                parse("reeds on off")
            );
        }

        #[test]
        fn non_integer_stop() {
            assert_eq!(Err(CommandError::InvalidStop("two".to_owned())), parse("stop on 1,two"));
            assert_eq!(Err(CommandError::InvalidStop("-1".to_owned())), parse("stop off -1"));
            assert_eq!(Err(CommandError::InvalidStop("".to_owned())), parse("stop on 1,,2"));
        }

        #[test]
        fn signed_stop() {
            assert_eq!(Err(CommandError::InvalidStop("+3".to_owned())), parse("stop on +3"));
            assert_eq!(Err(CommandError::InvalidStop("+0".to_owned())), parse("stop off 1,+0"));
        }

        #[test]
        fn stop_out_of_range() {
            assert_eq!(Err(CommandError::InvalidStop("128".to_owned())), parse("stop on 128"));
            assert_eq!(Err(CommandError::InvalidStop("300".to_owned())), parse("stop on 300"));
        }

        #[test]
        fn unknown_switch() {
            assert_eq!(Err(CommandError::InvalidSwitch("maybe".to_owned())), parse("reeds maybe"));
            assert_eq!(
                Err(CommandError::InvalidSwitch("up".to_owned())),
                parse("stop on 1 up 2"),
                "A bad switch after a valid pair should fail the whole line"
            );
        }
    }

    #[test]
    fn errors_are_readable() {
        assert_eq!(
            "expected `on` or `off` but got `maybe`",
            CommandError::InvalidSwitch("maybe".to_owned()).to_string()
        );
        assert_eq!(
            "`stop` cannot take 3 argument(s)",
            CommandError::ArgumentCount { verb: "stop", found: 3 }.to_string()
        );
    }
}

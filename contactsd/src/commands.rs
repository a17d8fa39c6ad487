use crate::errors::command_error::CommandError;
use contactsd_telepathy::{Capabilities, PresenceState};

/// One line read from stdin.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add(String),
    Alias {
        id: String,
        alias: String,
    },
    Presence {
        id: String,
        status: String,
        message: String,
    },
    Capabilities {
        id: String,
        capabilities: Capabilities,
    },
    Avatar {
        id: String,
        token: String,
        file_name: Option<String>,
    },
    Subscription {
        id: String,
        state: PresenceState,
    },
    Publish {
        id: String,
        state: PresenceState,
        message: String,
    },
    Info {
        id: String,
        name: String,
        value: String,
    },
    Block {
        id: String,
        blocked: bool,
    },
    Remove(String),
    Nickname(String),
    Account,
    List,
}

pub fn parse(line: &str) -> Result<Command, CommandError> {
    let args: Vec<&str> = line.trim().split(' ').filter(|arg| !arg.is_empty()).collect();
    let Some(name) = args.first() else {
        return Err(CommandError::Empty);
    };

    let command = match *name {
        "ADD" => Command::Add(arg(&args, 1)?.to_string()),

        "ALIAS" => Command::Alias {
            id: arg(&args, 1)?.to_string(),
            alias: rest(&args, 2)?,
        },

        "PRS" => Command::Presence {
            id: arg(&args, 1)?.to_string(),
            status: arg(&args, 2)?.to_string(),
            message: rest(&args, 3).unwrap_or_default(),
        },

        "CAPS" => Command::Capabilities {
            id: arg(&args, 1)?.to_string(),
            capabilities: parse_capabilities(arg(&args, 2)?)?,
        },

        "AVT" => Command::Avatar {
            id: arg(&args, 1)?.to_string(),
            token: match arg(&args, 2)? {
                "-" => String::new(),
                token => token.to_string(),
            },
            file_name: args.get(3).map(|file_name| file_name.to_string()),
        },

        "SUB" => Command::Subscription {
            id: arg(&args, 1)?.to_string(),
            state: parse_state(name, arg(&args, 2)?)?,
        },

        "PUB" => Command::Publish {
            id: arg(&args, 1)?.to_string(),
            state: parse_state(name, arg(&args, 2)?)?,
            message: rest(&args, 3).unwrap_or_default(),
        },

        "INFO" => Command::Info {
            id: arg(&args, 1)?.to_string(),
            name: arg(&args, 2)?.to_string(),
            value: rest(&args, 3)?,
        },

        "BLK" => Command::Block {
            id: arg(&args, 1)?.to_string(),
            blocked: match arg(&args, 2)? {
                "1" => true,
                "0" => false,
                other => {
                    return Err(CommandError::InvalidArgument {
                        command: name.to_string(),
                        argument: other.to_string(),
                    });
                }
            },
        },

        "REM" => Command::Remove(arg(&args, 1)?.to_string()),
        "NICK" => Command::Nickname(rest(&args, 1)?),
        "ACC" => Command::Account,
        "LST" => Command::List,
        other => return Err(CommandError::UnknownCommand(other.to_string())),
    };

    Ok(command)
}

fn arg<'a>(args: &[&'a str], index: usize) -> Result<&'a str, CommandError> {
    args.get(index)
        .copied()
        .ok_or_else(|| CommandError::NotEnoughArguments(args.join(" ")))
}

fn rest(args: &[&str], index: usize) -> Result<String, CommandError> {
    match args.get(index..) {
        Some(rest) if !rest.is_empty() => Ok(rest.join(" ")),
        _ => Err(CommandError::NotEnoughArguments(args.join(" "))),
    }
}

fn parse_state(command: &str, state: &str) -> Result<PresenceState, CommandError> {
    match state {
        "no" => Ok(PresenceState::No),
        "ask" => Ok(PresenceState::Ask),
        "yes" => Ok(PresenceState::Yes),
        _ => Err(CommandError::InvalidArgument {
            command: command.to_string(),
            argument: state.to_string(),
        }),
    }
}

// "-" clears everything, otherwise a comma separated list
fn parse_capabilities(flags: &str) -> Result<Capabilities, CommandError> {
    let mut capabilities = Capabilities::default();
    if flags == "-" {
        return Ok(capabilities);
    }

    for flag in flags.split(',') {
        match flag {
            "text" => capabilities.text_chat = true,
            "audio" => capabilities.audio_calls = true,
            "video" => capabilities.video_calls = true,
            "file" => capabilities.file_transfer = true,
            _ => {
                return Err(CommandError::InvalidArgument {
                    command: "CAPS".to_string(),
                    argument: flag.to_string(),
                });
            }
        }
    }

    Ok(capabilities)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_keeps_spaces() {
        assert_eq!(
            parse("ALIAS bob@example.com Bob the Builder\r\n").unwrap(),
            Command::Alias {
                id: "bob@example.com".to_string(),
                alias: "Bob the Builder".to_string(),
            }
        );
    }

    #[test]
    fn presence_message_is_optional() {
        assert_eq!(
            parse("PRS bob@example.com away").unwrap(),
            Command::Presence {
                id: "bob@example.com".to_string(),
                status: "away".to_string(),
                message: String::new(),
            }
        );
    }

    #[test]
    fn capabilities_list() {
        let Command::Capabilities { capabilities, .. } =
            parse("CAPS bob@example.com text,file").unwrap()
        else {
            panic!("Expected CAPS");
        };

        assert!(capabilities.text_chat);
        assert!(capabilities.file_transfer);
        assert!(!capabilities.audio_calls);
        assert!(!capabilities.video_calls);
    }

    #[test]
    fn empty_avatar_token() {
        assert_eq!(
            parse("AVT bob@example.com -").unwrap(),
            Command::Avatar {
                id: "bob@example.com".to_string(),
                token: String::new(),
                file_name: None,
            }
        );
    }

    #[test]
    fn authorization_states() {
        assert_eq!(
            parse("PUB carol@example.com ask add me").unwrap(),
            Command::Publish {
                id: "carol@example.com".to_string(),
                state: PresenceState::Ask,
                message: "add me".to_string(),
            }
        );

        assert!(matches!(
            parse("SUB carol@example.com maybe"),
            Err(CommandError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn block_needs_flag() {
        assert!(matches!(
            parse("BLK eve@example.com"),
            Err(CommandError::NotEnoughArguments(_))
        ));
        assert!(matches!(
            parse("BLK eve@example.com yes"),
            Err(CommandError::InvalidArgument { .. })
        ));
        assert_eq!(
            parse("BLK eve@example.com 1").unwrap(),
            Command::Block {
                id: "eve@example.com".to_string(),
                blocked: true,
            }
        );
    }

    #[test]
    fn account_and_list_take_no_arguments() {
        assert_eq!(parse("ACC").unwrap(), Command::Account);
        assert_eq!(parse("LST\r\n").unwrap(), Command::List);
    }

    #[test]
    fn unknown_and_empty() {
        assert!(matches!(parse("   "), Err(CommandError::Empty)));
        assert!(matches!(
            parse("VER 1 MSNP11"),
            Err(CommandError::UnknownCommand(name)) if name == "VER"
        ));
    }
}

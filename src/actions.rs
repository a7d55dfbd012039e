/// Remote actions and operator commands
///
/// The hub exposes no command transport yet. Actions go through a
/// `CommandPort`; the only binding today is `UnwiredCommandPort`, which
/// reports the gap instead of pretending the device received anything.
use log::warn;

use crate::error::ActionError;

pub const HELP: &str = "Commands: sos | say <message> | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteAction {
    TriggerSos,
    /// Text to be spoken on the device
    SendVoiceMessage(String),
}

impl RemoteAction {
    pub fn name(&self) -> &'static str {
        match self {
            RemoteAction::TriggerSos => "TriggerSOS",
            RemoteAction::SendVoiceMessage(_) => "SendVoiceMessage",
        }
    }
}

pub trait CommandPort {
    fn dispatch(&self, action: &RemoteAction) -> Result<(), ActionError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UnwiredCommandPort;

impl CommandPort for UnwiredCommandPort {
    fn dispatch(&self, action: &RemoteAction) -> Result<(), ActionError> {
        Err(ActionError::NotWired(action.name()))
    }
}

/// A line of operator input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    Action(RemoteAction),
    Help,
    Quit,
    /// Nothing to do, e.g. a blank line or an empty voice message
    Ignore,
    Unknown(String),
}

pub fn parse_command(line: &str) -> OperatorCommand {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb.to_ascii_lowercase().as_str() {
        "" => OperatorCommand::Ignore,
        "sos" => OperatorCommand::Action(RemoteAction::TriggerSos),
        "say" | "voice" if rest.is_empty() => OperatorCommand::Ignore,
        "say" | "voice" => {
            OperatorCommand::Action(RemoteAction::SendVoiceMessage(rest.to_string()))
        }
        "help" | "?" => OperatorCommand::Help,
        "quit" | "exit" => OperatorCommand::Quit,
        _ => OperatorCommand::Unknown(line.to_string()),
    }
}

/// Dispatch an action and return the local confirmation shown to the operator
pub fn perform(port: &dyn CommandPort, action: &RemoteAction) -> String {
    let what = match action {
        RemoteAction::TriggerSos => "SOS triggered".to_string(),
        RemoteAction::SendVoiceMessage(text) => format!("Voice message \"{}\"", text),
    };

    match port.dispatch(action) {
        Ok(()) => format!("{}: sent to device", what),
        Err(e) => {
            warn!("{}", e);
            format!("{}: NOT delivered ({})", what, e)
        }
    }
}

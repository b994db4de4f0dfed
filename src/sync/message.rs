//! Wire messages.
//!
//! One message per line, fields separated by `;`:
//!
//! ```text
//! NAME;<name>
//! DECKCODE;<token>
//! CHARS;<id>,<id>,<id>
//! PLAY;<card id>;<acting slot>;<t0|t1|b>
//! EMOJI;<text>
//! ENDTURN
//! ```
//!
//! Free-text fields run to the end of the line. Line breaks inside a field
//! are written as spaces.

use std::borrow::Cow;
use std::fmt;

use thiserror::Error;

use crate::battle::Target;

/// A line that is not a valid message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("empty line")]
    Empty,
    #[error("unknown tag {0:?}")]
    UnknownTag(String),
    #[error("{tag} is missing its {field} field")]
    MissingField { tag: &'static str, field: &'static str },
    #[error("bad acting slot {0:?}")]
    BadActor(String),
    #[error("bad target {0:?}")]
    BadTarget(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncMessage {
    Name(String),
    /// Informational; play does not depend on it.
    DeckCode(String),
    Chars(Vec<String>),
    Play {
        card_id: String,
        actor: usize,
        target: Target,
    },
    /// Cosmetic.
    Emoji(String),
    EndTurn,
}

impl SyncMessage {
    /// The message as a newline-terminated line.
    #[must_use]
    pub fn encode(&self) -> String {
        format!("{self}\n")
    }

    /// Parse one line. A trailing `\n` or `\r\n` is ignored.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return Err(ProtocolError::Empty);
        }
        let (tag, rest) = match line.split_once(';') {
            Some((tag, rest)) => (tag, Some(rest)),
            None => (line, None),
        };

        match tag {
            "NAME" => Ok(SyncMessage::Name(required(rest, "NAME", "name")?.to_string())),
            "DECKCODE" => Ok(SyncMessage::DeckCode(required(rest, "DECKCODE", "token")?.to_string())),
            "EMOJI" => Ok(SyncMessage::Emoji(required(rest, "EMOJI", "text")?.to_string())),
            "CHARS" => {
                let ids = required(rest, "CHARS", "ids")?
                    .split(',')
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect();
                Ok(SyncMessage::Chars(ids))
            }
            "PLAY" => {
                let mut fields = required(rest, "PLAY", "card")?.splitn(3, ';');
                let card_id = fields.next().unwrap_or_default().to_string();
                let actor_raw = fields
                    .next()
                    .ok_or(ProtocolError::MissingField { tag: "PLAY", field: "actor" })?;
                let target_raw = fields
                    .next()
                    .ok_or(ProtocolError::MissingField { tag: "PLAY", field: "target" })?;

                let actor = actor_raw
                    .trim()
                    .parse()
                    .map_err(|_| ProtocolError::BadActor(actor_raw.to_string()))?;
                let target =
                    Target::from_wire(target_raw).ok_or_else(|| ProtocolError::BadTarget(target_raw.to_string()))?;
                Ok(SyncMessage::Play { card_id, actor, target })
            }
            "ENDTURN" => Ok(SyncMessage::EndTurn),
            other => Err(ProtocolError::UnknownTag(other.to_string())),
        }
    }
}

fn required<'a>(rest: Option<&'a str>, tag: &'static str, field: &'static str) -> Result<&'a str, ProtocolError> {
    rest.ok_or(ProtocolError::MissingField { tag, field })
}

/// Keep a field on one line.
fn single_line(text: &str) -> Cow<'_, str> {
    if text.contains(['\r', '\n']) {
        Cow::Owned(text.replace(['\r', '\n'], " "))
    } else {
        Cow::Borrowed(text)
    }
}

impl fmt::Display for SyncMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMessage::Name(name) => write!(f, "NAME;{}", single_line(name)),
            SyncMessage::DeckCode(token) => write!(f, "DECKCODE;{}", single_line(token)),
            SyncMessage::Chars(ids) => write!(f, "CHARS;{}", single_line(&ids.join(","))),
            SyncMessage::Play { card_id, actor, target } => {
                write!(f, "PLAY;{};{actor};{}", single_line(card_id), target.to_wire())
            }
            SyncMessage::Emoji(text) => write!(f, "EMOJI;{}", single_line(text)),
            SyncMessage::EndTurn => write!(f, "ENDTURN"),
        }
    }
}

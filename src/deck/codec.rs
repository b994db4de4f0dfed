//! Deck codes: checksummed base64 tokens.
//!
//! ## Format
//!
//! ```text
//! payload  = name ";" mode ";" char_ids ";" card_ids ";" limit ";"
//! checksum = first 4 hex digits of CRC-32(payload)
//! token    = base64(payload "|" checksum)
//! ```
//!
//! Ids are comma-joined. The format is frozen: old tokens must keep
//! decoding, so ids that no longer resolve are dropped instead of failing.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use thiserror::Error;

use super::identity::{Deck, DeckMode, DEFAULT_MAX_CARDS};
use crate::cards::ContentIndex;

const FIELD_SEPARATOR: char = ';';
const LIST_SEPARATOR: char = ',';
const CHECKSUM_SEPARATOR: char = '|';
const CHECKSUM_LEN: usize = 4;

/// Padded on encode; padding optional on decode so hand-trimmed tokens work.
const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Why a token could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeckCodeError {
    #[error("deck code checksum does not match its contents")]
    ChecksumMismatch,
    #[error("deck code is not a valid token: {0}")]
    MalformedToken(String),
    #[error("deck code has {found} fields, expected at least 4")]
    IncompleteFields { found: usize },
}

/// Encodes and decodes deck codes.
pub struct DeckCodec;

impl DeckCodec {
    /// Encode a deck into its token.
    #[must_use]
    pub fn encode(deck: &Deck) -> String {
        let payload = Self::payload(deck);
        let checksum = Self::checksum(&payload);
        let combined = format!("{payload}{CHECKSUM_SEPARATOR}{checksum}");
        TOKEN_ENGINE.encode(combined)
    }

    /// Decode a token, resolving ids against `index`.
    ///
    /// Ids the index does not know are dropped. An empty token yields an
    /// empty deck.
    pub fn decode(token: &str, index: &dyn ContentIndex) -> Result<Deck, DeckCodeError> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(Deck::default());
        }

        let payload = Self::verified_payload(token)?;
        let fields: Vec<&str> = payload.split(FIELD_SEPARATOR).collect();
        if fields.len() < 4 {
            return Err(DeckCodeError::IncompleteFields { found: fields.len() });
        }

        let character_ids = resolve_ids(fields[2], |id| index.find_character_by_id(id).is_some());
        let card_ids = resolve_ids(fields[3], |id| index.find_card_by_id(id).is_some());
        let max_cards = fields
            .get(4)
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_CARDS);

        Ok(Deck::from_parts(
            fields[0].to_string(),
            DeckMode::from_code(fields[1]),
            character_ids,
            card_ids,
            max_cards,
        ))
    }

    /// Check only the checksum, without resolving any ids.
    ///
    /// Pure: calling it repeatedly gives the same answer.
    #[must_use]
    pub fn is_valid(token: &str) -> bool {
        Self::verified_payload(token.trim()).is_ok()
    }

    /// CRC-32 of `payload`, as the first four lowercase hex digits.
    #[must_use]
    pub fn checksum(payload: &str) -> String {
        let crc = crc32fast::hash(payload.as_bytes());
        let mut hex = format!("{crc:08x}");
        hex.truncate(CHECKSUM_LEN);
        hex
    }

    fn payload(deck: &Deck) -> String {
        let mut payload = String::new();
        for field in [
            deck.name().to_string(),
            deck.mode().code().to_string(),
            deck.character_ids().join(","),
            deck.card_ids().join(","),
            deck.max_cards().to_string(),
        ] {
            payload.push_str(&field);
            payload.push(FIELD_SEPARATOR);
        }
        payload
    }

    fn verified_payload(token: &str) -> Result<String, DeckCodeError> {
        let bytes = TOKEN_ENGINE
            .decode(token)
            .map_err(|e| DeckCodeError::MalformedToken(e.to_string()))?;
        let text = String::from_utf8(bytes)
            .map_err(|_| DeckCodeError::MalformedToken("not UTF-8".to_string()))?;

        let (payload, checksum) = text
            .rsplit_once(CHECKSUM_SEPARATOR)
            .ok_or_else(|| DeckCodeError::MalformedToken("missing checksum separator".to_string()))?;

        if Self::checksum(payload) != checksum {
            return Err(DeckCodeError::ChecksumMismatch);
        }
        Ok(payload.to_string())
    }
}

fn resolve_ids(field: &str, known: impl Fn(&str) -> bool) -> Vec<String> {
    let mut ids = Vec::new();
    let mut pieces = field.split(LIST_SEPARATOR).filter(|p| !p.is_empty()).peekable();

    while let Some(piece) = pieces.next() {
        if known(piece) {
            ids.push(piece.to_string());
            continue;
        }
        // An id may itself contain the list separator.
        if let Some(next) = pieces.peek() {
            let joined = format!("{piece}{LIST_SEPARATOR}{next}");
            if known(&joined) {
                pieces.next();
                ids.push(joined);
                continue;
            }
        }
        log::debug!("deck code: dropping unknown id {piece:?}");
    }
    ids
}

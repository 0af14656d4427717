//! Typed strategic actions and the defensive parser for the
//! `ACTION: <kind>` wire convention used by the inference service.

use std::fmt;

/// Simple world-space position/direction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// A strategic decision, parsed into a sum type at the wire boundary so all
/// downstream code is exhaustively typed.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategicAction {
    Chat(String),
    Move(Vec3),
    /// Vote target, or "skip".
    Vote(String),
    Ability(String),
    Idle,
}

impl StrategicAction {
    /// Short human-readable summary for logs.
    pub fn summary(&self) -> String {
        match self {
            Self::Chat(text) => format!("chat: {}", text),
            Self::Move(to) => format!("move: {}", to),
            Self::Vote(target) => format!("vote: {}", target),
            Self::Ability(name) => format!("ability: {}", name),
            Self::Idle => "idle".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No `ACTION:` marker anywhere in the response.
    MissingAction,
    /// Recognized kind without a usable payload.
    MissingPayload(&'static str),
    /// `ACTION:` present but the kind is not one we know.
    UnknownKind(String),
    BadLocation(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAction => write!(f, "response carries no ACTION marker"),
            Self::MissingPayload(field) => write!(f, "missing {} payload line", field),
            Self::UnknownKind(kind) => write!(f, "unknown action kind '{}'", kind),
            Self::BadLocation(raw) => write!(f, "unparseable location '{}'", raw),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse a strategic response of the form:
///
/// ```text
/// ACTION: CHAT
/// MESSAGE: I was in the cafeteria the whole round.
/// ```
///
/// Parsing is case-insensitive and tolerant of surrounding prose. A chat
/// action missing its `MESSAGE:` line falls back to the text after the action
/// line; a vote without a `TARGET:` degrades to "skip". Everything else
/// malformed is an error for the caller to degrade to idle.
pub fn parse_strategic(response: &str) -> Result<StrategicAction, ParseError> {
    let kind = extract_after(response, "action:")
        .map(|k| k.to_lowercase())
        .ok_or(ParseError::MissingAction)?;

    match kind.as_str() {
        "chat" => {
            let message = extract_after(response, "message:")
                .filter(|m| !m.is_empty())
                .or_else(|| trailing_text(response, "action:"))
                .ok_or(ParseError::MissingPayload("MESSAGE"))?;
            Ok(StrategicAction::Chat(message))
        }
        "vote" => {
            let target =
                extract_after(response, "target:").unwrap_or_else(|| "skip".to_string());
            let target = if target.is_empty() { "skip".to_string() } else { target };
            Ok(StrategicAction::Vote(target))
        }
        "move" => {
            let raw = extract_after(response, "location:")
                .filter(|l| !l.is_empty())
                .ok_or(ParseError::MissingPayload("LOCATION"))?;
            parse_location(&raw).map(StrategicAction::Move)
        }
        "ability" => {
            let name = extract_after(response, "name:")
                .filter(|n| !n.is_empty())
                .ok_or(ParseError::MissingPayload("NAME"))?;
            Ok(StrategicAction::Ability(name))
        }
        "idle" => Ok(StrategicAction::Idle),
        other => Err(ParseError::UnknownKind(other.to_string())),
    }
}

/// Text between a case-insensitive marker and the end of its line. ASCII
/// lowercasing keeps byte offsets valid for slicing the original text.
fn extract_after(text: &str, marker: &str) -> Option<String> {
    let lower = text.to_ascii_lowercase();
    let start = lower.find(marker)? + marker.len();
    let rest = &text[start..];
    let end = rest.find('\n').unwrap_or(rest.len());
    Some(rest[..end].trim().to_string())
}

/// Everything after the line containing `marker`, for lenient chat fallback.
fn trailing_text(text: &str, marker: &str) -> Option<String> {
    let lower = text.to_ascii_lowercase();
    let start = lower.find(marker)?;
    let rest = &text[start..];
    let after_line = rest.find('\n')?;
    let tail = rest[after_line..].trim();
    if tail.is_empty() {
        None
    } else {
        Some(tail.to_string())
    }
}

fn parse_location(raw: &str) -> Result<Vec3, ParseError> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(ParseError::BadLocation(raw.to_string()));
    }
    let coord = |s: &str| {
        s.parse::<f64>()
            .map_err(|_| ParseError::BadLocation(raw.to_string()))
    };
    Ok(Vec3::new(coord(parts[0])?, coord(parts[1])?, coord(parts[2])?))
}

//! Game event envelope
//!
//! Hosted content posts `{"type": <kind>, ...fields}`. Decoding happens in
//! two steps: the `type` tag is read first, then recognised kinds are
//! decoded into their typed variant. Unknown kinds are kept as
//! [`GameEvent::Unrecognized`] rather than rejected.

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventError {
    #[error("Malformed event JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Event has no string `type` field")]
    MissingType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Achievement { achievement: String },
    LevelComplete { level: i64, score: i64 },
    GameOver { score: i64 },
    SoundEffect,
    Unrecognized { kind: String },
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum KnownEvent {
    Achievement {
        achievement: String,
    },
    LevelComplete {
        #[serde(deserialize_with = "lenient_int")]
        level: i64,
        #[serde(deserialize_with = "lenient_int")]
        score: i64,
    },
    GameOver {
        #[serde(deserialize_with = "lenient_int")]
        score: i64,
    },
    SoundEffect,
}

/// Integer field that also accepts floats and numeric strings, truncating
/// toward zero. Scripts often hand over computed or stringified numbers.
fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let truncated = |f: f64| f.is_finite().then(|| f.trunc() as i64);
    let parsed = match &value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncated)),
        Value::String(s) => {
            let s = s.trim();
            s.parse()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(truncated))
        }
        _ => None,
    };
    parsed.ok_or_else(|| de::Error::custom(format!("expected an integer, found {}", value)))
}

const KNOWN_KINDS: [&str; 4] = ["achievement", "levelComplete", "gameOver", "soundEffect"];

impl GameEvent {
    pub fn parse(json: &str) -> Result<Self, EventError> {
        let value: Value = serde_json::from_str(json)?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(EventError::MissingType)?
            .to_string();

        if !KNOWN_KINDS.contains(&kind.as_str()) {
            return Ok(GameEvent::Unrecognized { kind });
        }

        Ok(match serde_json::from_value::<KnownEvent>(value)? {
            KnownEvent::Achievement { achievement } => GameEvent::Achievement { achievement },
            KnownEvent::LevelComplete { level, score } => GameEvent::LevelComplete { level, score },
            KnownEvent::GameOver { score } => GameEvent::GameOver { score },
            KnownEvent::SoundEffect => GameEvent::SoundEffect,
        })
    }

    /// The envelope's `type` tag
    pub fn kind(&self) -> &str {
        match self {
            GameEvent::Achievement { .. } => "achievement",
            GameEvent::LevelComplete { .. } => "levelComplete",
            GameEvent::GameOver { .. } => "gameOver",
            GameEvent::SoundEffect => "soundEffect",
            GameEvent::Unrecognized { kind } => kind,
        }
    }
}

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 广告语气
///
/// 未识别的取值原样保留在 `Other` 中，由各个 step 自行决定如何处理。
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum Tone {
    #[default]
    Professional,
    Friendly,
    Funny,
    Energetic,
    Calm,
    Other(String),
}

impl Tone {
    pub fn as_str(&self) -> &str {
        match self {
            Tone::Professional => "professional",
            Tone::Friendly => "friendly",
            Tone::Funny => "funny",
            Tone::Energetic => "energetic",
            Tone::Calm => "calm",
            Tone::Other(raw) => raw.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Tone::Other(_))
    }
}

impl FromStr for Tone {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tone = match s.trim().to_lowercase().as_str() {
            "professional" => Tone::Professional,
            "friendly" => Tone::Friendly,
            "funny" => Tone::Funny,
            "energetic" => Tone::Energetic,
            "calm" => Tone::Calm,
            _ => Tone::Other(s.to_string()),
        };
        Ok(tone)
    }
}

impl From<String> for Tone {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(tone) => tone,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for Tone {
    fn from(value: &str) -> Self {
        Tone::from(value.to_string())
    }
}

impl From<Tone> for String {
    fn from(tone: Tone) -> Self {
        tone.as_str().to_string()
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tones_parse_case_insensitively() {
        assert_eq!(Tone::from("Funny"), Tone::Funny);
        assert_eq!(Tone::from(" calm "), Tone::Calm);
        assert!(Tone::from("energetic").is_known());
    }

    #[test]
    fn unknown_tone_passes_through_untouched() {
        let tone = Tone::from("Emotional");
        assert_eq!(tone, Tone::Other("Emotional".to_string()));
        assert_eq!(tone.as_str(), "Emotional");
        assert!(!tone.is_known());
    }

    #[test]
    fn tone_serializes_as_plain_string() {
        let value = serde_json::to_value(Tone::Friendly).unwrap();
        assert_eq!(value, serde_json::json!("friendly"));
        let parsed: Tone = serde_json::from_value(serde_json::json!("whimsical")).unwrap();
        assert_eq!(parsed, Tone::Other("whimsical".into()));
    }
}

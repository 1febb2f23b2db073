use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "2h")]
    H2,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
    #[serde(rename = "1w")]
    W1,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
            Timeframe::H2 => "2h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
            Timeframe::W1 => "1w",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Timeframe> {
        match s.trim().to_lowercase().as_str() {
            "15m" => Some(Timeframe::M15),
            "30m" => Some(Timeframe::M30),
            "1h" | "60m" => Some(Timeframe::H1),
            "2h" | "120m" => Some(Timeframe::H2),
            "4h" | "240m" => Some(Timeframe::H4),
            "1d" | "d" => Some(Timeframe::D1),
            "1w" | "w" => Some(Timeframe::W1),
            _ => None,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loose_parsing_accepts_aliases() {
        assert_eq!(Timeframe::from_str_loose("4H"), Some(Timeframe::H4));
        assert_eq!(Timeframe::from_str_loose("240m"), Some(Timeframe::H4));
        assert_eq!(Timeframe::from_str_loose(" 1d "), Some(Timeframe::D1));
        assert_eq!(Timeframe::from_str_loose("3h"), None);
    }

    #[test]
    fn serde_uses_interval_strings() {
        let json = serde_json::to_string(&Timeframe::M30).unwrap();
        assert_eq!(json, "\"30m\"");
        let tf: Timeframe = serde_json::from_str("\"1w\"").unwrap();
        assert_eq!(tf, Timeframe::W1);
    }
}

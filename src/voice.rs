use std::fmt;
use std::str::FromStr;

/// Prebuilt voices offered by the speech model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Voice {
    #[default]
    Puck,
    Charon,
    Fenrir,
    Kore,
    Zephyr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Voice {
    pub const ALL: [Voice; 5] = [
        Voice::Puck,
        Voice::Charon,
        Voice::Fenrir,
        Voice::Kore,
        Voice::Zephyr,
    ];

    /// Name sent to the API.
    pub fn name(&self) -> &'static str {
        match self {
            Voice::Puck => "Puck",
            Voice::Charon => "Charon",
            Voice::Fenrir => "Fenrir",
            Voice::Kore => "Kore",
            Voice::Zephyr => "Zephyr",
        }
    }

    pub fn gender(&self) -> Gender {
        match self {
            Voice::Puck | Voice::Charon | Voice::Fenrir => Gender::Male,
            Voice::Kore | Voice::Zephyr => Gender::Female,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Voice::Puck => "neutral",
            Voice::Charon => "deep",
            Voice::Fenrir => "intense",
            Voice::Kore => "soft",
            Voice::Zephyr => "clear",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => f.pad("male"),
            Gender::Female => f.pad("female"),
        }
    }
}

impl FromStr for Voice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Voice::ALL
            .into_iter()
            .find(|voice| voice.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<&str> = Voice::ALL.iter().map(Voice::name).collect();
                format!("unknown voice '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("kore".parse::<Voice>().unwrap(), Voice::Kore);
        assert_eq!(" ZEPHYR ".parse::<Voice>().unwrap(), Voice::Zephyr);
    }

    #[test]
    fn unknown_voice_lists_catalogue() {
        let err = "Aoede".parse::<Voice>().unwrap_err();
        assert!(err.contains("Puck, Charon, Fenrir, Kore, Zephyr"));
    }

    #[test]
    fn catalogue_details() {
        assert_eq!(Voice::default(), Voice::Puck);
        assert_eq!(Voice::Charon.gender(), Gender::Male);
        assert_eq!(Voice::Kore.gender(), Gender::Female);
        assert_eq!(Voice::Fenrir.description(), "intense");
        assert_eq!(Voice::Zephyr.to_string(), "Zephyr");
    }
}

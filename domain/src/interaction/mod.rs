//! Social interactions between members.
//!
//! An interaction is a one-shot verb aimed at another member
//! (`!hug @someone`). Verbs are grouped into categories for help output.
//!
//! # Examples
//!
//! ```
//! use denkeeper_domain::interaction::{InteractionCategory, InteractionVerb};
//!
//! let verb: InteractionVerb = "boop".parse().unwrap();
//! assert_eq!(verb.category(), InteractionCategory::Playful);
//! assert_eq!(verb.to_string(), "boop");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionCategory {
    Social,
    Playful,
    Expression,
    Mood,
}

impl fmt::Display for InteractionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InteractionCategory::Social => "social",
            InteractionCategory::Playful => "playful",
            InteractionCategory::Expression => "expression",
            InteractionCategory::Mood => "mood",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionVerb {
    // Social
    Hug,
    Snuggle,
    Nuzzle,
    Scritch,
    Groom,
    Cuddle,
    Headpat,
    Gift,
    // Playful
    Boop,
    Bap,
    Pat,
    Tail,
    Pounce,
    Howl,
    Nom,
    Chase,
    // Expressions
    Purr,
    Wag,
    Blep,
    Flop,
    Yip,
    Wiggle,
    // Moods
    Happy,
    Sleepy,
    Excited,
}

impl InteractionVerb {
    pub const ALL: [InteractionVerb; 25] = [
        InteractionVerb::Hug,
        InteractionVerb::Snuggle,
        InteractionVerb::Nuzzle,
        InteractionVerb::Scritch,
        InteractionVerb::Groom,
        InteractionVerb::Cuddle,
        InteractionVerb::Headpat,
        InteractionVerb::Gift,
        InteractionVerb::Boop,
        InteractionVerb::Bap,
        InteractionVerb::Pat,
        InteractionVerb::Tail,
        InteractionVerb::Pounce,
        InteractionVerb::Howl,
        InteractionVerb::Nom,
        InteractionVerb::Chase,
        InteractionVerb::Purr,
        InteractionVerb::Wag,
        InteractionVerb::Blep,
        InteractionVerb::Flop,
        InteractionVerb::Yip,
        InteractionVerb::Wiggle,
        InteractionVerb::Happy,
        InteractionVerb::Sleepy,
        InteractionVerb::Excited,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionVerb::Hug => "hug",
            InteractionVerb::Snuggle => "snuggle",
            InteractionVerb::Nuzzle => "nuzzle",
            InteractionVerb::Scritch => "scritch",
            InteractionVerb::Groom => "groom",
            InteractionVerb::Cuddle => "cuddle",
            InteractionVerb::Headpat => "headpat",
            InteractionVerb::Gift => "gift",
            InteractionVerb::Boop => "boop",
            InteractionVerb::Bap => "bap",
            InteractionVerb::Pat => "pat",
            InteractionVerb::Tail => "tail",
            InteractionVerb::Pounce => "pounce",
            InteractionVerb::Howl => "howl",
            InteractionVerb::Nom => "nom",
            InteractionVerb::Chase => "chase",
            InteractionVerb::Purr => "purr",
            InteractionVerb::Wag => "wag",
            InteractionVerb::Blep => "blep",
            InteractionVerb::Flop => "flop",
            InteractionVerb::Yip => "yip",
            InteractionVerb::Wiggle => "wiggle",
            InteractionVerb::Happy => "happy",
            InteractionVerb::Sleepy => "sleepy",
            InteractionVerb::Excited => "excited",
        }
    }

    pub fn category(&self) -> InteractionCategory {
        use InteractionVerb::*;
        match self {
            Hug | Snuggle | Nuzzle | Scritch | Groom | Cuddle | Headpat | Gift => {
                InteractionCategory::Social
            }
            Boop | Bap | Pat | Tail | Pounce | Howl | Nom | Chase => InteractionCategory::Playful,
            Purr | Wag | Blep | Flop | Yip | Wiggle => InteractionCategory::Expression,
            Happy | Sleepy | Excited => InteractionCategory::Mood,
        }
    }
}

impl fmt::Display for InteractionVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for InteractionVerb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim_start_matches('!').to_lowercase();
        Self::ALL
            .into_iter()
            .find(|verb| verb.as_str() == lower)
            .ok_or_else(|| format!("Invalid InteractionVerb: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_verb_parses_back() {
        for verb in InteractionVerb::ALL {
            assert_eq!(verb.as_str().parse::<InteractionVerb>(), Ok(verb));
        }
    }

    #[test]
    fn test_command_prefix_is_tolerated() {
        assert_eq!("!HUG".parse(), Ok(InteractionVerb::Hug));
        assert!("slap".parse::<InteractionVerb>().is_err());
    }

    #[test]
    fn test_categories() {
        assert_eq!(InteractionVerb::Gift.category(), InteractionCategory::Social);
        assert_eq!(InteractionVerb::Chase.category(), InteractionCategory::Playful);
        assert_eq!(InteractionVerb::Yip.category(), InteractionCategory::Expression);
        assert_eq!(InteractionVerb::Sleepy.category(), InteractionCategory::Mood);
    }
}

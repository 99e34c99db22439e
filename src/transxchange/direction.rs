use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Inbound => write!(f, "inbound"),
            Direction::Outbound => write!(f, "outbound"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid direction '{0}', expected inbound or outbound")]
pub struct DirectionParseError(String);

impl FromStr for Direction {
    type Err = DirectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inbound" => Ok(Direction::Inbound),
            "outbound" => Ok(Direction::Outbound),
            _ => Err(DirectionParseError(s.to_string())),
        }
    }
}

// DirectionTerms lists the words that identify each direction in the free-text
// direction descriptors of a timetable file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DirectionTerms {
    pub inbound: Vec<String>,
    pub outbound: Vec<String>,
}

impl Default for DirectionTerms {
    fn default() -> Self {
        DirectionTerms {
            inbound: vec![String::from("inbound"), String::from("oxford")],
            outbound: vec![String::from("outbound"), String::from("london")],
        }
    }
}

// DirectionClassifier does case-insensitive substring matching of direction
// descriptors against the configured terms.
#[derive(Debug, Clone)]
pub struct DirectionClassifier {
    inbound: Vec<String>,
    outbound: Vec<String>,
}

impl DirectionClassifier {
    pub fn new(terms: &DirectionTerms) -> Self {
        let lowercase = |terms: &[String]| {
            terms.iter()
                .map(|term| term.trim().to_lowercase())
                .filter(|term| !term.is_empty())
                .collect::<Vec<_>>()
        };
        DirectionClassifier {
            inbound: lowercase(&terms.inbound),
            outbound: lowercase(&terms.outbound),
        }
    }

    fn terms(&self, direction: Direction) -> &[String] {
        match direction {
            Direction::Inbound => &self.inbound,
            Direction::Outbound => &self.outbound,
        }
    }

    // matches reports whether the descriptor contains any of the terms for
    // `direction`. A descriptor may match both directions.
    pub fn matches(&self, text: &str, direction: Direction) -> bool {
        let text = text.to_lowercase();
        self.terms(direction).iter().any(|term| text.contains(term.as_str()))
    }

    // classify picks a single direction for the descriptor, preferring inbound
    // when both match. None means the descriptor is not recognised.
    pub fn classify(&self, text: &str) -> Option<Direction> {
        [Direction::Inbound, Direction::Outbound]
            .into_iter()
            .find(|direction| self.matches(text, *direction))
    }
}

impl Default for DirectionClassifier {
    fn default() -> Self {
        DirectionClassifier::new(&DirectionTerms::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_case_insensitively() {
        let classifier = DirectionClassifier::default();
        assert!(classifier.matches("INBOUND", Direction::Inbound));
        assert!(classifier.matches("Towards Oxford", Direction::Inbound));
        assert!(classifier.matches("to London Victoria", Direction::Outbound));
        assert!(!classifier.matches("clockwise", Direction::Outbound));
    }

    #[test]
    fn descriptor_naming_both_ends_matches_both_directions() {
        let classifier = DirectionClassifier::default();
        assert!(classifier.matches("Oxford - London", Direction::Inbound));
        assert!(classifier.matches("Oxford - London", Direction::Outbound));
        assert_eq!(classifier.classify("Oxford - London"), Some(Direction::Inbound));
    }

    #[test]
    fn classify_uses_configured_terms() {
        let classifier = DirectionClassifier::new(&DirectionTerms {
            inbound: vec![String::from(" Cambridge ")],
            outbound: vec![String::from("Bedford"), String::new()],
        });
        assert_eq!(classifier.classify("to cambridge"), Some(Direction::Inbound));
        assert_eq!(classifier.classify("to BEDFORD"), Some(Direction::Outbound));
        assert_eq!(classifier.classify("inbound"), None);
        assert_eq!(classifier.classify(""), None);
    }

    #[test]
    fn parses_direction_names() {
        assert_eq!("Inbound".parse::<Direction>().unwrap(), Direction::Inbound);
        assert_eq!(" outbound".parse::<Direction>().unwrap(), Direction::Outbound);
        assert!("sideways".parse::<Direction>().is_err());
    }
}

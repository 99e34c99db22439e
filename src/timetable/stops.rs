use std::fmt;

// Stop is a place a coach may call at. The name doubles as the location string
// handed to the directions service, so it should be geocodable as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Stop {
    pub name: String,
    // agency stop code (ATCO code) when the stop came from a TransXChange file
    pub code: Option<String>,
}

impl Stop {
    pub fn new(name: impl Into<String>) -> Self {
        Stop {
            name: name.into(),
            code: None,
        }
    }

    pub fn with_code(name: impl Into<String>, code: impl Into<String>) -> Self {
        Stop {
            name: name.into(),
            code: Some(code.into()),
        }
    }

    // location is the string used when asking for directions to or from this stop.
    pub fn location(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({})", self.name, code),
            None => write!(f, "{}", self.name),
        }
    }
}

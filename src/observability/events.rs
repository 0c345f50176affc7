//! Observable events
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events in careprog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,

    // Store
    /// Store file opened and checksum verified
    StoreOpened,
    /// Store file rewritten
    StoreFlushed,
    /// Store lookup or write failed
    StoreFailure,

    // Programs
    /// Validator finished a record
    ProgramValidated,
    /// Save refused because of field errors
    ProgramRejected,
    /// Program persisted
    ProgramSaved,
    /// Program retired
    ProgramRetired,
    /// Program unretired
    ProgramUnretired,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoreOpened => "STORE_OPENED",
            Event::StoreFlushed => "STORE_FLUSHED",
            Event::StoreFailure => "STORE_FAILURE",
            Event::ProgramValidated => "PROGRAM_VALIDATED",
            Event::ProgramRejected => "PROGRAM_REJECTED",
            Event::ProgramSaved => "PROGRAM_SAVED",
            Event::ProgramRetired => "PROGRAM_RETIRED",
            Event::ProgramUnretired => "PROGRAM_UNRETIRED",
        }
    }

    /// Default severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::ProgramValidated | Event::StoreFlushed => Severity::Trace,
            Event::ProgramRejected => Severity::Warn,
            Event::StoreFailure => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(Event::ProgramSaved.as_str(), "PROGRAM_SAVED");
        assert_eq!(Event::StoreOpened.to_string(), "STORE_OPENED");
    }

    #[test]
    fn test_event_severity() {
        assert_eq!(Event::ProgramValidated.severity(), Severity::Trace);
        assert_eq!(Event::ProgramRejected.severity(), Severity::Warn);
        assert_eq!(Event::StoreFailure.severity(), Severity::Error);
        assert_eq!(Event::ConfigLoaded.severity(), Severity::Info);
    }
}

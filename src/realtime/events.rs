//! Event kinds carried on the realtime stream.

use std::fmt;

/// Named events the Poster stream delivers to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A chat message arrived in one of the user's conversations.
    NewMessage,
    /// Another participant is typing.
    Typing,
    /// A new notification was created for the user.
    NewNotification,
}

impl EventKind {
    /// Wire name of the event.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NewMessage => "new_message",
            Self::Typing => "typing",
            Self::NewNotification => "new_notification",
        }
    }

    /// Parse a wire name. Unknown names yield `None` and are dropped by the
    /// dispatcher.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "new_message" => Some(Self::NewMessage),
            "typing" => Some(Self::Typing),
            "new_notification" => Some(Self::NewNotification),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_name_roundtrip() {
        for kind in [
            EventKind::NewMessage,
            EventKind::Typing,
            EventKind::NewNotification,
        ] {
            assert_eq!(EventKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        assert_eq!(EventKind::parse("presence"), None);
        assert_eq!(EventKind::parse(""), None);
    }
}

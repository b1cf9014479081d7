//! Status line state owned by the app loop

/// What the status line shows under the bar view
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Ready,
    Playing,
    Info(String),
    /// Shown in red until the next action replaces it
    Error(String),
}

impl Status {
    pub fn text(&self) -> &str {
        match self {
            Status::Ready => "ready - press space to start",
            Status::Playing => "playing",
            Status::Info(text) | Status::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }
}

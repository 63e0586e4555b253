#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Missing or invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A stored field value that no supported shape matches.
    #[error("Unreadable field value: {0}")]
    FieldValue(String),
}

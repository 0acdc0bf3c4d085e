#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("order not found: {0}")]
    NotFound(String),

    #[error("could not generate a free order id after {attempts} attempts")]
    IdSpaceExhausted { attempts: usize },
}

impl RegistryError {
    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::IdSpaceExhausted { .. } => "id_space_exhausted",
        }
    }
}

//! Catalog error types.

use thiserror::Error;

/// Errors raised by catalog operations and backends.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// Record does not exist.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// User input was rejected before reaching the backend.
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// Operation requires an administrator.
    #[error("Administrator access required to {action}")]
    Forbidden { action: String },

    /// The data store failed or is unreachable.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl CatalogError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn forbidden(action: impl Into<String>) -> Self {
        Self::Forbidden {
            action: action.into(),
        }
    }

    /// Message shown to visitors and admins. `Display` stays in English for logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { .. } => "Registro não encontrado".to_string(),
            Self::Validation { field, .. } => format!("Verifique o campo {}", field_label(field)),
            Self::Forbidden { .. } => "Apenas administradores podem fazer isso".to_string(),
            Self::Backend(_) => "Não foi possível salvar. Tente novamente.".to_string(),
        }
    }
}

fn field_label(field: &str) -> &str {
    match field {
        "youtube_url" => "link do YouTube",
        "email" => "e-mail",
        "srt_content" => "legendas",
        "author" => "nome",
        "content" => "comentário",
        "rating" => "avaliação",
        other => other,
    }
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

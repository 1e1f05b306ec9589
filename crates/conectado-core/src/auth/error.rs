use thiserror::Error;

use crate::api::ApiError;
use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Email and password are required")]
    MissingCredentials,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Unable to reach the authentication server: {0}")]
    NetworkUnavailable(String),

    #[error("Authentication server error: {0}")]
    ServerError(String),

    #[error("Invalid authentication response: {0}")]
    InvalidResponse(String),

    #[error("Failed to persist session: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Message shown to the user in the login notification
    pub fn user_message(&self) -> String {
        match self {
            AuthError::MissingCredentials => "Informe e-mail e senha".to_string(),
            AuthError::InvalidCredentials => "E-mail ou senha inválidos".to_string(),
            AuthError::NetworkUnavailable(_) => {
                "Não foi possível conectar ao servidor. Verifique sua conexão.".to_string()
            }
            AuthError::ServerError(_) => "Erro no servidor. Tente novamente mais tarde.".to_string(),
            AuthError::InvalidResponse(_) => "Resposta inesperada do servidor".to_string(),
            AuthError::Storage(_) => "Não foi possível salvar a sessão".to_string(),
        }
    }
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized | ApiError::AccessDenied(_) => AuthError::InvalidCredentials,
            ApiError::NetworkError(e) => AuthError::NetworkUnavailable(e.to_string()),
            ApiError::ServerError(body) => AuthError::ServerError(body),
            ApiError::RateLimited => AuthError::ServerError("too many login attempts".to_string()),
            ApiError::NotFound(body) => AuthError::InvalidResponse(format!("login endpoint not found: {}", body)),
            ApiError::InvalidResponse(msg) => AuthError::InvalidResponse(msg),
        }
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    InvalidProfile(#[from] rehearse_persona::ProfileError),
}

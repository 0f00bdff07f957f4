//! Errors surfaced by [`GameSession`](crate::GameSession) commands.
use echoes_core::{AbilityError, CharacterId, TransitionError};
use thiserror::Error;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("character {0} is not part of this session")]
    UnknownCharacter(CharacterId),

    #[error("character {0} is already part of this session")]
    DuplicateCharacter(CharacterId),

    #[error("no character ids left in this session")]
    IdsExhausted,

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Ability(#[from] AbilityError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("save slot '{0}' is empty")]
    EmptySlot(String),
}

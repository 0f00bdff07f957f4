//! Common error infrastructure for echoes-core.
//!
//! Timeline and class-kit operations report failures through typed enums defined
//! here. The boolean command surface on [`TimelineState`](crate::TimelineState)
//! is a thin wrapper over the `try_*` methods that return these errors.
//!
//! # Design Principles
//!
//! - **Type Safety**: Each subsystem has its own error type with specific variants
//! - **Severity Classification**: Errors are categorized for recovery strategies
//! - **No Panics**: A rejected command never mutates state

use crate::timeline::Timeline;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// Errors are classified by their recoverability and expected handling:
/// - **Recoverable**: Temporary conditions that may succeed later (energy regenerates, cooldowns expire)
/// - **Validation**: Invalid input that should be rejected without retry
/// - **Internal**: Unexpected state inconsistencies that require investigation
/// - **Fatal**: Unrecoverable errors indicating corrupted state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - can retry once the blocking condition clears.
    ///
    /// Examples: not enough energy, transition already in flight
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: transition to the current timeline, unknown combo sequence
    Validation,

    /// Internal error - unexpected state inconsistency.
    Internal,

    /// Fatal error - state corrupted, cannot continue.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all echoes-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Useful for log fields and assertions in tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Reasons a timeline transition request is rejected.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum TransitionError {
    #[error("a transition to {target} is already in progress")]
    AlreadyTransitioning { target: Timeline },

    #[error("already in {0}")]
    SameTimeline(Timeline),

    #[error("cannot transition into the {0} wildcard")]
    WildcardTarget(Timeline),

    #[error("not enough energy: need {required}, have {available}")]
    InsufficientEnergy { required: f32, available: f32 },
}

impl GameError for TransitionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::AlreadyTransitioning { .. } | Self::InsufficientEnergy { .. } => {
                ErrorSeverity::Recoverable
            }
            Self::SameTimeline(_) | Self::WildcardTarget(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyTransitioning { .. } => "TRANSITION_IN_PROGRESS",
            Self::SameTimeline(_) => "TRANSITION_SAME_TIMELINE",
            Self::WildcardTarget(_) => "TRANSITION_WILDCARD_TARGET",
            Self::InsufficientEnergy { .. } => "TRANSITION_INSUFFICIENT_ENERGY",
        }
    }
}

/// Reasons a class-kit command is rejected.
///
/// Kit commands never partially apply: when one of these is returned, no
/// resource was spent and no event was emitted.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum AbilityError {
    #[error("{resource} too low: need {required}, have {available}")]
    InsufficientResource {
        resource: &'static str,
        required: f32,
        available: f32,
    },

    #[error("{0} is already active")]
    AlreadyActive(&'static str),

    #[error("{0} is not active")]
    NotActive(&'static str),

    #[error("{ability} is on cooldown for {remaining:.2}s")]
    OnCooldown {
        ability: &'static str,
        remaining: f32,
    },

    #[error("{ability} requires the {required} timeline")]
    WrongTimeline {
        ability: &'static str,
        required: Timeline,
    },

    #[error("target is out of range ({distance:.1} > {range:.1})")]
    OutOfRange { distance: f32, range: f32 },

    #[error("{0} is not allowed in the current state")]
    NotAllowed(&'static str),

    #[error("combo buffer is full")]
    ComboFull,

    #[error("combo input does not match {0}")]
    ComboMismatch(&'static str),
}

impl AbilityError {
    pub(crate) fn energy(required: f32, available: f32) -> Self {
        Self::InsufficientResource {
            resource: "energy",
            required,
            available,
        }
    }
}

impl GameError for AbilityError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InsufficientResource { .. }
            | Self::AlreadyActive(_)
            | Self::OnCooldown { .. }
            | Self::WrongTimeline { .. }
            | Self::OutOfRange { .. }
            | Self::ComboFull => ErrorSeverity::Recoverable,
            Self::NotActive(_) | Self::NotAllowed(_) | Self::ComboMismatch(_) => {
                ErrorSeverity::Validation
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientResource { .. } => "ABILITY_INSUFFICIENT_RESOURCE",
            Self::AlreadyActive(_) => "ABILITY_ALREADY_ACTIVE",
            Self::NotActive(_) => "ABILITY_NOT_ACTIVE",
            Self::OnCooldown { .. } => "ABILITY_ON_COOLDOWN",
            Self::WrongTimeline { .. } => "ABILITY_WRONG_TIMELINE",
            Self::OutOfRange { .. } => "ABILITY_OUT_OF_RANGE",
            Self::NotAllowed(_) => "ABILITY_NOT_ALLOWED",
            Self::ComboFull => "ABILITY_COMBO_FULL",
            Self::ComboMismatch(_) => "ABILITY_COMBO_MISMATCH",
        }
    }
}

/// Problems found while validating a [`TimelineConfig`](crate::TimelineConfig).
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be a finite positive number, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("{field} must be a finite non-negative number, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("min_transition_energy ({cost}) exceeds max_energy ({max})")]
    CostExceedsCapacity { cost: f32, max: f32 },
}

impl GameError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotPositive { .. } => "CONFIG_NOT_POSITIVE",
            Self::Negative { .. } => "CONFIG_NEGATIVE",
            Self::CostExceedsCapacity { .. } => "CONFIG_COST_EXCEEDS_CAPACITY",
        }
    }
}

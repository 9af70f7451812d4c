//! Error types shared by every fallible operation of the crate.

/// Recoverable misuse reported by storage, lifecycle and event operations.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum EcsError {
	/// The operation mixes handles that belong to different worlds.
	#[error("entities belong to different worlds")]
	DifferentWorld,

	/// The target entity, component instance or subscription does not exist.
	#[error("entity or component instance does not exist")]
	InvalidEntity,

	/// The requested state is already in effect.
	#[error("requested state is already in effect")]
	InvalidState,

	/// The world was never created or has already been destroyed.
	#[error("world does not exist")]
	InvalidWorld,
}

/// Shorthand for results carrying an [EcsError].
pub type EcsResult<T = ()> = Result<T, EcsError>;

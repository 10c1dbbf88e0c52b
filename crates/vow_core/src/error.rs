//! Error types and payload bounds for promises.

/// Failures produced by the promise machinery itself.
///
/// User code rejects promises with its own reason type `E`. The library
/// needs to be able to reject with these variants too, so every reason type
/// must implement `From<PromiseError>`. `PromiseError` is a valid reason type
/// on its own: [`PromiseError::Rejected`] carries user-supplied reasons.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PromiseError {
    /// A promise was resolved with itself.
    #[error("a promise cannot be resolved with itself")]
    SelfResolution,

    /// The initializer passed to [`Promise::new`](crate::Promise::new) panicked.
    #[error("promise initializer panicked: {0}")]
    InitializerPanicked(String),

    /// A foreign thenable panicked while adopting its state.
    #[error("thenable panicked: {0}")]
    ThenablePanicked(String),

    /// An `on_fulfilled` or `on_rejected` callback panicked.
    #[error("promise callback panicked: {0}")]
    CallbackPanicked(String),

    /// The promise was dropped or its invoker stopped before it settled.
    #[error("promise was abandoned before it settled")]
    Abandoned,

    /// A user-supplied rejection reason.
    #[error("{0}")]
    Rejected(String),
}

impl PromiseError {
    /// Creates a user rejection reason.
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }
}

impl From<String> for PromiseError {
    fn from(reason: String) -> Self {
        Self::Rejected(reason)
    }
}

impl From<&str> for PromiseError {
    fn from(reason: &str) -> Self {
        Self::Rejected(reason.to_owned())
    }
}

/// A fulfillment value that can be stored in a promise.
///
/// Every observer receives its own clone of the settled value. Any type that
/// is `Clone + Send + 'static` automatically implements `Value`.
pub trait Value: Clone + Send + 'static {}

impl<T: Clone + Send + 'static> Value for T {}

/// A rejection reason that can be stored in a promise.
///
/// Automatically implemented for every [`Value`] that can express a
/// [`PromiseError`].
pub trait Reason: Value + From<PromiseError> {}

impl<E: Value + From<PromiseError>> Reason for E {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            PromiseError::SelfResolution.to_string(),
            "a promise cannot be resolved with itself"
        );
        assert_eq!(
            PromiseError::CallbackPanicked("boom".into()).to_string(),
            "promise callback panicked: boom"
        );
        assert_eq!(PromiseError::rejected("nope").to_string(), "nope");
    }

    #[test]
    fn user_reasons_convert() {
        assert_eq!(
            PromiseError::from("denied"),
            PromiseError::Rejected("denied".into())
        );
        assert_eq!(
            PromiseError::from(String::from("denied")),
            PromiseError::rejected("denied")
        );
    }
}

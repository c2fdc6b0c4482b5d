//! Explicit "capability not implemented" marker.

/// Outcome of an optional capability query.
///
/// Vendors implement capabilities unevenly. A provider answers with
/// `Supported(value)` when it can, and `Unsupported` when the feature does
/// not exist for that platform. Each consumer substitutes its documented
/// default through the helpers below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Support<T> {
    /// The provider implements the query.
    Supported(T),
    /// The provider has no implementation for the query.
    Unsupported,
}

impl<T> Support<T> {
    /// Returns true if the provider implements the query.
    pub fn is_supported(&self) -> bool {
        matches!(self, Support::Supported(_))
    }

    /// Converts into an `Option`, losing the distinction between a
    /// supported-but-empty answer and no answer.
    pub fn supported(self) -> Option<T> {
        match self {
            Support::Supported(value) => Some(value),
            Support::Unsupported => None,
        }
    }

    /// Returns the value, or `default` when unsupported.
    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Support::Supported(value) => value,
            Support::Unsupported => default,
        }
    }

    /// Returns the value, or computes a fallback when unsupported.
    pub fn unwrap_or_else<F: FnOnce() -> T>(self, fallback: F) -> T {
        match self {
            Support::Supported(value) => value,
            Support::Unsupported => fallback(),
        }
    }

    /// Maps the supported value.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Support<U> {
        match self {
            Support::Supported(value) => Support::Supported(f(value)),
            Support::Unsupported => Support::Unsupported,
        }
    }
}

impl<T: Default> Support<T> {
    /// Returns the value, or `T::default()` when unsupported.
    pub fn unwrap_or_default(self) -> T {
        self.unwrap_or_else(T::default)
    }
}

impl<T> Support<Option<T>> {
    /// Collapses "unsupported" and "no value" into `None`.
    pub fn flatten(self) -> Option<T> {
        self.supported().flatten()
    }
}

impl<T> From<Option<T>> for Support<T> {
    /// A missing value is treated as an unimplemented capability.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Support::Supported(value),
            None => Support::Unsupported,
        }
    }
}

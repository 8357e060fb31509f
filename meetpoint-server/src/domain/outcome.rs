//! Tagged results for stages that degrade instead of failing.

/// What a degradable stage produced.
///
/// Each variant carries a usable value, so the pipeline can always move on,
/// but callers and tests can still tell real data from substituted data.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T, E> {
    /// The provider returned usable data.
    Found(T),
    /// The provider answered but had nothing; `T` is the stand-in value.
    Fallback(T),
    /// The provider call failed; `fallback` is the stand-in value.
    Error { fallback: T, error: E },
}

impl<T, E> Outcome<T, E> {
    /// The carried value, real or substituted.
    pub fn value(&self) -> &T {
        match self {
            Outcome::Found(v) | Outcome::Fallback(v) => v,
            Outcome::Error { fallback, .. } => fallback,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Found(v) | Outcome::Fallback(v) => v,
            Outcome::Error { fallback, .. } => fallback,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Outcome::Found(_))
    }

    /// True for both `Fallback` and `Error`.
    pub fn is_degraded(&self) -> bool {
        !self.is_found()
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            Outcome::Error { error, .. } => Some(error),
            _ => None,
        }
    }
}

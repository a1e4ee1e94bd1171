use thiserror::Error;

/// Classified failures surfaced at API boundaries.
///
/// Conditions that are ignorable rather than erroneous (adding a body that is
/// already present, removing an unknown body or joint) are signalled by a
/// `false` return from the affected API instead, with no state mutation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A value passed to a setter or constructor is outside its valid range.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A constraint configuration that cannot be solved, detected at
    /// constraint initialization. The step that detects it is aborted before
    /// any body state is mutated by the offending constraint.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
}

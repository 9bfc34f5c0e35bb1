//! The one true error condition of the core: an instruction list whose string
//! pool has grown too large for its index to be representable as a parameter.

/// Failure of [`crate::instruction_list::InstructionList::add_string_parameter`].
///
/// Every other locally-recovered condition in this crate is a silent `bool`/`Option`
/// return or a `tracing::debug!`/`tracing::trace!` call; this is the sole exception.
#[derive(Debug, thiserror::Error)]
pub enum InstructionListError {
    /// The string pool already holds `Parameter::MAX` entries; the caller must treat
    /// this as a developer-visible assertion, not a runtime condition to route around.
    #[error("instruction list too complex: string pool index {index} exceeds representable range")]
    TooComplex {
        /// The pool index that could not be encoded.
        index: usize,
    },
}

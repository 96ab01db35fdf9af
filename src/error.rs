//! Errors reported while compiling a beacon message.

/// Reasons a message text could not be compiled.
///
/// Positions are 0-based character indices into the source text. When a directive
/// is cut short by the end of the text, the position is the text length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum EncodeError {
    /// The compiled message does not fit the destination buffer.
    #[error("output buffer too small (max. {capacity} bytes)")]
    BufferTooSmall {
        /// Size of the destination buffer, terminator included.
        capacity: usize,
    },
    /// `$P` was not followed by a digit `0-3`.
    #[error("error parsing power mode at position {position} (expecting 0-3)")]
    PowerMode {
        /// Offending character position.
        position: usize,
    },
    /// `$A` was not followed by a channel number `00-15`.
    #[error("error parsing analog channel number at position {position} (expecting 00-15)")]
    AnalogChannel {
        /// Offending character position.
        position: usize,
    },
    /// `$T` was not followed by a sensor number `0-7`.
    #[error("error parsing temperature sensor at position {position} (expecting 0-7)")]
    TemperatureChannel {
        /// Offending character position.
        position: usize,
    },
    /// `$+` or `$-` was not followed by a duration `1-9`.
    #[error("error parsing delay at position {position} (expecting 1-9)")]
    Delay {
        /// Offending character position.
        position: usize,
    },
    /// `$` was followed by an unknown directive letter.
    #[error("error parsing special code at position {position} (expecting P, A, T, + or -)")]
    Directive {
        /// Offending character position.
        position: usize,
    },
    /// A character without a Morse representation.
    #[error("can not encode character '{character}' at position {position}")]
    Unencodable {
        /// The character itself.
        character: char,
        /// Its position in the text.
        position: usize,
    },
}

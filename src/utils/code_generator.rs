//! Short code generation.
//!
//! Codes are drawn from the operating system CSPRNG so that live short links
//! cannot be predicted or enumerated from previously issued codes.

use crate::error::AppError;

/// Characters allowed in a generated short code.
pub const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random bytes at or above this value are discarded.
///
/// 248 is the largest multiple of 62 that fits in a byte; keeping only bytes
/// below it makes `byte % 62` uniform over the alphabet.
const ACCEPT_BELOW: u8 = 248;

/// Generates a random short code of `length` characters.
///
/// Every character is drawn uniformly from [`ALPHABET`] using `getrandom`.
///
/// # Errors
///
/// Returns [`AppError::RandomSource`] if the system random number generator
/// is unavailable. Callers should treat this as fatal for the operation.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code(6)?;
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code(length: usize) -> Result<String, AppError> {
    let mut code = String::with_capacity(length);
    let mut buffer = [0u8; 64];

    while code.len() < length {
        getrandom::fill(&mut buffer).map_err(|e| AppError::RandomSource(e.to_string()))?;

        let missing = length - code.len();
        code.extend(
            buffer
                .iter()
                .filter(|&&byte| byte < ACCEPT_BELOW)
                .take(missing)
                .map(|&byte| ALPHABET[(byte % 62) as usize] as char),
        );
    }

    Ok(code)
}

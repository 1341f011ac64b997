//! Short code generation.
//!
//! Codes are sampled uniformly from a configurable alphabet. The default
//! alphabet drops characters that are easy to confuse when read aloud or
//! typed (`0`/`O`, `1`/`l`/`I`), leaving 57 symbols. At the default length of
//! 7 that is about 1.9e12 codes, which keeps birthday collisions rare well
//! into the tens of millions of links.
//!
//! The generator is pure. Uniqueness is enforced by the store's unique
//! constraint at insert time; see
//! [`crate::application::services::LinkService::shorten`] for the bounded
//! retry loop.

use rand::Rng;
use thiserror::Error;

/// Alphanumeric alphabet without visually ambiguous characters.
pub const DEFAULT_ALPHABET: &str = "ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789";

pub const DEFAULT_CODE_LENGTH: usize = 7;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Codes must fit the `links.short_code` column.
pub const MAX_CODE_LENGTH: usize = 16;

pub const MIN_CODE_LENGTH: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeneratorConfigError {
    #[error("code length must be between 4 and 16, got {0}")]
    Length(usize),

    #[error("alphabet must contain at least 2 symbols")]
    AlphabetTooSmall,

    #[error("alphabet may only contain ASCII letters and digits, found {0:?}")]
    NonAlphanumeric(char),

    #[error("alphabet contains {0:?} more than once")]
    DuplicateSymbol(char),

    #[error("max attempts must be at least 1")]
    NoAttempts,
}

/// Produces candidate short codes of a fixed length.
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    alphabet: Vec<u8>,
    length: usize,
    max_attempts: u32,
}

impl CodeGenerator {
    /// Builds a generator after validating its parameters.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorConfigError`] if the length is outside
    /// `MIN_CODE_LENGTH..=MAX_CODE_LENGTH`, the alphabet has fewer than two
    /// symbols, contains non-alphanumeric or repeated symbols, or
    /// `max_attempts` is zero.
    pub fn new(
        alphabet: &str,
        length: usize,
        max_attempts: u32,
    ) -> Result<Self, GeneratorConfigError> {
        if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&length) {
            return Err(GeneratorConfigError::Length(length));
        }
        if max_attempts == 0 {
            return Err(GeneratorConfigError::NoAttempts);
        }

        let mut symbols: Vec<u8> = Vec::with_capacity(alphabet.len());
        for c in alphabet.chars() {
            if !c.is_ascii_alphanumeric() {
                return Err(GeneratorConfigError::NonAlphanumeric(c));
            }
            if symbols.contains(&(c as u8)) {
                return Err(GeneratorConfigError::DuplicateSymbol(c));
            }
            symbols.push(c as u8);
        }
        if symbols.len() < 2 {
            return Err(GeneratorConfigError::AlphabetTooSmall);
        }

        Ok(Self {
            alphabet: symbols,
            length,
            max_attempts,
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Total number of distinct codes this generator can produce.
    pub fn keyspace(&self) -> f64 {
        (self.alphabet.len() as f64).powi(self.length as i32)
    }

    /// Generates a candidate code for `original_url`.
    ///
    /// Codes are random rather than derived from the URL, so each call for the
    /// same URL yields an independent candidate.
    pub fn generate(&self, _original_url: &str) -> String {
        self.generate_with(&mut rand::rng())
    }

    /// Generates a candidate code from the given random source.
    pub fn generate_with<R: Rng>(&self, rng: &mut R) -> String {
        (0..self.length)
            .map(|_| {
                let idx = rng.random_range(0..self.alphabet.len());
                self.alphabet[idx] as char
            })
            .collect()
    }

    /// Returns true if `code` could have been produced by this generator.
    pub fn is_well_formed(&self, code: &str) -> bool {
        code.len() == self.length && code.bytes().all(|b| self.alphabet.contains(&b))
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self {
            alphabet: DEFAULT_ALPHABET.as_bytes().to_vec(),
            length: DEFAULT_CODE_LENGTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

// SPDX-License-Identifier: Apache-2.0

//! Token estimation for chat conversations.
//!
//! Follows the usual chat accounting approximation: every message costs a
//! fixed overhead plus the encoded length of each of its fields, a `name`
//! field costs one extra token, and the reply is primed with a fixed overhead.
//! The result is used for admission decisions, not billing.

use tiktoken_rs::CoreBPE;

use crate::error::AutodescError;
use crate::prompt::Conversation;

/// Overhead added for every message.
pub const TOKENS_PER_MESSAGE: u32 = 3;

/// Extra cost of a message carrying a `name` field.
pub const TOKENS_PER_NAME: u32 = 1;

/// Overhead added once per conversation for the reply primer.
pub const TOKENS_PER_REPLY: u32 = 3;

/// Name of the default encoding.
pub const CL100K_BASE: &str = "cl100k_base";

/// Counts tokens in a piece of text.
pub trait Tokenizer: Send + Sync {
    /// Name of the encoding (e.g. `cl100k_base`).
    fn encoding_name(&self) -> &str;

    /// Number of tokens `text` encodes to.
    fn count(&self, text: &str) -> usize;
}

/// The `cl100k_base` byte-pair encoding.
pub struct Cl100kTokenizer {
    bpe: CoreBPE,
}

impl Cl100kTokenizer {
    /// Loads the encoding tables.
    pub fn new() -> Result<Self, AutodescError> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| AutodescError::Tokenizer {
            message: format!("failed to load {CL100K_BASE}: {e}"),
        })?;
        Ok(Self { bpe })
    }
}

impl std::fmt::Debug for Cl100kTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cl100kTokenizer").finish_non_exhaustive()
    }
}

impl Tokenizer for Cl100kTokenizer {
    fn encoding_name(&self) -> &str {
        CL100K_BASE
    }

    fn count(&self, text: &str) -> usize {
        // Special-token text is counted as ordinary text.
        self.bpe.encode_ordinary(text).len()
    }
}

/// Estimates the prompt cost of a conversation.
#[derive(Debug)]
pub struct TokenEstimator<T = Cl100kTokenizer> {
    tokenizer: T,
}

impl TokenEstimator<Cl100kTokenizer> {
    /// Estimator using `cl100k_base`.
    pub fn cl100k() -> Result<Self, AutodescError> {
        Ok(Self::new(Cl100kTokenizer::new()?))
    }
}

impl<T: Tokenizer> TokenEstimator<T> {
    /// Estimator over an arbitrary tokenizer.
    #[must_use]
    pub fn new(tokenizer: T) -> Self {
        Self { tokenizer }
    }

    /// Underlying tokenizer.
    #[must_use]
    pub fn tokenizer(&self) -> &T {
        &self.tokenizer
    }

    /// Estimated prompt tokens for `conversation`. Saturates at `u32::MAX`.
    #[must_use]
    pub fn estimate(&self, conversation: &Conversation) -> u32 {
        let mut total = 0_u32;
        for message in conversation.messages() {
            total = total.saturating_add(TOKENS_PER_MESSAGE);
            total = total.saturating_add(self.count(message.role.as_str()));
            total = total.saturating_add(self.count(&message.content));
            if let Some(name) = &message.name {
                total = total
                    .saturating_add(self.count(name))
                    .saturating_add(TOKENS_PER_NAME);
            }
        }
        total.saturating_add(TOKENS_PER_REPLY)
    }

    fn count(&self, text: &str) -> u32 {
        u32::try_from(self.tokenizer.count(text)).unwrap_or(u32::MAX)
    }
}

// SPDX-License-Identifier: Apache-2.0

//! Response allowance expansion.
//!
//! Whatever the selected model leaves over after the prompt and the base
//! response reservation is partly granted to the response. The remaining
//! share stays unused as a margin for estimation error.

use super::selector::Selection;
use crate::error::AutodescError;

/// Share of the leftover headroom granted to the response.
pub const DEFAULT_HEADROOM_FACTOR: f64 = 0.8;

/// Returns `base_response_tokens + floor(leftover * factor)`, or `None` when
/// the prompt and base reservation do not fit in `context_window`.
///
/// `factor` is clamped to `[0, 1]`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn expand(
    base_response_tokens: u32,
    context_window: u32,
    prompt_tokens: u32,
    factor: f64,
) -> Option<u32> {
    let leftover = context_window
        .checked_sub(prompt_tokens)?
        .checked_sub(base_response_tokens)?;
    let factor = if factor.is_nan() {
        0.0
    } else {
        factor.clamp(0.0, 1.0)
    };
    let granted = (f64::from(leftover) * factor).floor() as u32;
    Some(base_response_tokens + granted.min(leftover))
}

/// Base response reservation plus the share of headroom to grant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseBudget {
    /// Tokens always reserved for the response.
    pub base_tokens: u32,
    /// Share of leftover headroom added on top.
    pub headroom_factor: f64,
}

impl ResponseBudget {
    /// Creates a budget, validating the factor.
    pub fn new(base_tokens: u32, headroom_factor: f64) -> Result<Self, AutodescError> {
        if !(0.0..=1.0).contains(&headroom_factor) {
            return Err(AutodescError::Config {
                message: format!("headroom factor must be within [0, 1], got {headroom_factor}"),
            });
        }
        Ok(Self {
            base_tokens,
            headroom_factor,
        })
    }

    /// Response allowance for the selected model.
    pub fn expand_for(&self, selection: &Selection) -> Result<u32, AutodescError> {
        expand(
            self.base_tokens,
            selection.context_window,
            selection.prompt_tokens,
            self.headroom_factor,
        )
        .ok_or_else(|| AutodescError::BudgetExhausted {
            model: selection.model.clone(),
            context_window: selection.context_window,
            prompt_tokens: selection.prompt_tokens,
            response_tokens: self.base_tokens,
        })
    }
}

impl Default for ResponseBudget {
    fn default() -> Self {
        Self {
            base_tokens: 500,
            headroom_factor: DEFAULT_HEADROOM_FACTOR,
        }
    }
}

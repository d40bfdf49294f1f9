// SPDX-License-Identifier: Apache-2.0

//! Token budgeting: estimate the prompt, pick the cheapest model that fits,
//! then size the response allowance.

pub mod expander;
pub mod selector;
pub mod tokens;

pub use expander::{DEFAULT_HEADROOM_FACTOR, ResponseBudget, expand};
pub use selector::{ModelCatalog, Selection, select_model};
pub use tokens::{Cl100kTokenizer, TokenEstimator, Tokenizer};

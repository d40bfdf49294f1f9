// SPDX-License-Identifier: Apache-2.0

//! Prompt construction.
//!
//! Fragments are markdown documents reduced to plain text and concatenated in
//! a fixed order; the title sentence is filled with the pull request title,
//! and the result is wrapped in a few-shot [`Conversation`].

pub mod assembler;
pub mod conversation;
pub mod fragment;
pub mod template;

pub use assembler::{TITLE_SLOT, combine, combine_with_title, render_title, substitute_title};
pub use conversation::{Conversation, Message, Role};
pub use fragment::{Fragment, FragmentLibrary, FragmentSource};
pub use template::PromptTemplate;

//! Noise classification for crawled repair-guide text.
//!
//! Two distinct passes run at different pipeline stages:
//! - [`noise`] — line-level boilerplate classification applied while a
//!   page's extracted lines are first assembled ([`is_noise`],
//!   [`clean_lines`])
//! - [`blocks`] — a narrower UI-control filter applied to the assembled
//!   content just before persistence ([`is_ui_block`], [`strip_ui_blocks`])
//!
//! The passes are intentionally not unified; their rule sets overlap only
//! partially and they see the text at different stages.

pub mod blocks;
pub mod noise;

pub use blocks::{is_ui_block, strip_ui_blocks};
pub use noise::{clean_lines, is_noise};

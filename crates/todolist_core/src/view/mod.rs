//! View-side state driven by the synchronizer.
//!
//! # Responsibility
//! - Model the displayed list and the render-layer seam.
//!
//! # Invariants
//! - The list only ever changes through a complete rebuild from committed
//!   store contents, or through per-entry UI state such as description toggles.

pub mod list_view;
pub mod render;

//! Use-case services.
//!
//! # Responsibility
//! - Keep the displayed list synchronized with committed store state.
//! - Keep render/form layers decoupled from storage details.

pub mod form;
pub mod startup;
pub mod todo_list;

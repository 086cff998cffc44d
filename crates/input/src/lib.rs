//! Keyboard and mouse input mapped to demo actions.
//!
//! This crate knows nothing about the windowing library. The desktop app
//! translates its key codes into [`Key`] and forwards cursor positions to
//! [`MouseLook`].

pub mod action;
pub mod mouse;

pub use action::{Action, Key, action_for_key};
pub use mouse::MouseLook;

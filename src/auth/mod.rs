//! Authentication subsystem — guest sessions behind two trait seams
//!
//! Provides:
//! - Sign-in / introspection traits (`provider` submodule)
//! - Session token encoding/decoding (`jwt` submodule)
//! - Session cookie helpers (`session` submodule)
//! - Default seam implementations (`introspect`, `sign_in` submodules)

pub mod introspect;
pub mod jwt;
pub mod provider;
pub mod session;
pub mod sign_in;

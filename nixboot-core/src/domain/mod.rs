//! Core domain types
//!
//! This module contains the values the bootstrap pipeline passes from stage
//! to stage. They are deliberately free of process and terminal I/O so the
//! derivations on them (transport URLs, registration links, target lookup)
//! can be tested directly.

pub mod credential;
pub mod layout;
pub mod repository;
pub mod target;

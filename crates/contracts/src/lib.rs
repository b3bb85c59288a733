//! Shared data model and UI-agnostic engines for the plant operations console.
//!
//! `shared` holds the grid and form controllers the pages are built on,
//! `domain` holds the procurement, planning and inspection records.

pub mod domain;
pub mod shared;

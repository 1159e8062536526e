// src/nav/mod.rs
//! Navigation state: the merged fix record and its shared store

pub mod data;
pub mod store;

pub use data::NavigationFix;
pub use store::{FieldUpdate, FixUpdate, NavStore};

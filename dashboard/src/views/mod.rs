//! Text views rendered to the terminal.
//!
//! Renderers are pure: they build a `String` from a snapshot and leave
//! printing to the caller.

pub mod badges;
pub mod header;
pub mod history;
pub mod notify;
pub mod pages;
pub mod project_list;
pub mod terminal;
pub mod wizard;

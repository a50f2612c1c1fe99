//! Local settings and form drafts

pub mod drafts;
pub mod layout;
pub mod settings;

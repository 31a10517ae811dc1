//! Binders attaching behaviour to form markup

pub mod dynamic;
pub mod submission;
pub mod upload;
pub mod validation;

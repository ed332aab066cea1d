//! Gantry application services over store collaborators.

pub mod clock;
pub mod context;
pub mod domain;
pub mod fixtures;
pub mod settings;
pub mod stores;

#[cfg(test)]
mod test;

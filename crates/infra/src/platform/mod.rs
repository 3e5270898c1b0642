//! Desktop platform adapters

pub mod navigator;

pub use navigator::SystemNavigator;

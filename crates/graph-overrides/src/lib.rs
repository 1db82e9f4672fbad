pub mod captions;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod menu;
pub mod naming;
pub mod path;
pub mod store;
pub mod ui;

pub use error::{Error, Result};

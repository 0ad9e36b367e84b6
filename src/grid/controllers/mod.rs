//! # Controllers Module
//!
//! The application controller wiring input, view model, sync queue and views.

pub mod app_controller;

pub use app_controller::AppController;

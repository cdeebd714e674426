//! Multi-screen authoring wizard

pub mod controller;
pub mod screen;

pub use controller::WizardController;
pub use screen::Screen;

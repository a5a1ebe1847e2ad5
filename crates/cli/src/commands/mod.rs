pub mod analyze;
pub mod history;
pub mod recommendations;
pub mod templates;

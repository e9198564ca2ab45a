pub mod app;
pub mod export_modal;

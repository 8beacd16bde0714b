pub mod export;
mod export_ui;

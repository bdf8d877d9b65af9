pub mod manager;

pub use manager::BrowserManager;

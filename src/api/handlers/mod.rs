pub mod health;
pub mod recording;
pub mod script;

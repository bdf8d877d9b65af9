pub mod debounce;
pub mod locator;
pub mod recorder;

pub use debounce::ActionDebouncer;
pub use recorder::SessionRecorder;

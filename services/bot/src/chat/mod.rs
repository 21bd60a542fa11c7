pub mod login;
pub mod messages;
pub mod navigation;
pub mod protocol;
pub mod router;
pub mod state;

// Re-export the main dispatch entry point to make it easily accessible
// to the binary that runs the gateway loop.
pub use router::handle;

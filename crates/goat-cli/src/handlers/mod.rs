pub mod backlog;
pub mod drag;
pub mod grid;
pub mod session;
pub mod sync;

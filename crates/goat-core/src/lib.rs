pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod result;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AppConfig;
pub use error::GoatError;
pub use logging::{DebugLog, LogEntry, Loggable};
pub use result::GoatResult;

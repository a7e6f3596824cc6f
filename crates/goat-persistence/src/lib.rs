pub mod conflict;
pub mod local_data;
pub mod serialization;
pub mod store;
pub mod sync;
pub mod traits;

pub use conflict::*;
pub use local_data::*;
pub use serialization::*;
pub use store::*;
pub use sync::*;
pub use traits::*;

pub mod audit;
pub mod config;
pub mod error;
pub mod io;
pub mod lock;
pub mod migrate;
pub mod normalize;
pub mod paths;
pub mod report;
pub mod seed;
pub mod store;
pub mod transform;

pub use error::{CapnormError, Result};
pub use normalize::{is_canonical, normalize};

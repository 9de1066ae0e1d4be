pub mod config;
pub mod errors;
pub mod fields;
pub mod fingerprint;
pub mod flags;
pub mod header;
pub mod speed;
pub mod traits;
pub mod utils;
pub mod validation;

pub use config::*;
pub use errors::*;
pub use fields::*;
pub use flags::*;
pub use header::*;
pub use speed::*;
pub use traits::*;
pub use utils::is_psid_file;
pub use validation::*;

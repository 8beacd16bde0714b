pub mod error;
pub mod mubi;
pub mod retry;
pub mod traits;

pub use error::FetchError;
pub use mubi::{ClientOptions, MubiClient};
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use traits::ListSource;

//! modemstat - line statistics from a Technicolor TGiiNet-1 modem.
//!
//! The modem's web interface authenticates with SRP-6a over plain HTTP,
//! using a vendor-specific multiplier constant and a CSRF token bound to
//! the login exchange. This crate implements that handshake, retrieves
//! the broadband stats page and extracts the line metrics:
//! - **srp**: SRP-6a client math with the device `k` override
//! - **fetcher**: CSRF retrieval, handshake driver, authenticated page GET
//! - **stats**: metric extraction from the page and the output mapping
//! - **config**: TOML connection settings
//!
//! # Example (conceptual)
//! ```ignore
//! let config = Config::load_from_file("modemstat.toml")?;
//! let mut fetcher = Fetcher::new(&config)?;
//! let page = fetcher.fetch()?;
//! let stats = parse_stats(&page)?;
//! println!("{}", stats.to_plain());
//! ```

pub mod config;
pub mod error;
pub mod fetcher;
pub mod srp;
pub mod stats;

pub use config::Config;
pub use error::{AuthError, ExtractionError, FetchError};
pub use fetcher::Fetcher;
pub use stats::{parse_stats, ModemStats};

//! Password analysis: offline strength scoring and breach lookup.
//!
//! The strength scorer is a pure function; the breach client performs a
//! k-anonymity range query against the Have I Been Pwned corpus and
//! degrades to "not compromised" on any transport failure. Neither is
//! invoked from the login path.
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//! use password_guardian::security::{PwnedClient, PwnedConfig, strength};
//!
//! #[tokio::main]
//! async fn main() {
//!     let class = strength("Chev@l-Rouge9");
//!     println!("Strength: {}", class.as_str());
//!
//!     let client = PwnedClient::new(PwnedConfig::default());
//!     let (compromised, count) = client.check("Chev@l-Rouge9", Duration::from_secs(3)).await;
//!     if compromised {
//!         println!("Seen {count} times in known breaches");
//!     }
//! }
//! ```

pub mod pwned;
pub mod strength;

pub use pwned::{PwnedClient, PwnedConfig};
pub use strength::{PasswordStrength, strength};

//! Fixed-size byte storage for secret and public data.
//!
//! [Secret] keeps its bytes on the heap and guarantees that the memory is
//! overwritten with zeroes before it is released, so dropping a value is
//! enough to dispose of key material. [Public] is the plain counterpart for
//! data that may be known to the world, such as public keys and nonces.
//!
//! ```rust
//! use shs1_secret_memory::Secret;
//!
//! let key: Secret<32> = Secret::random();
//! assert_eq!(format!("{key:?}"), "<SECRET>");
//! ```

pub mod debug;

mod public;
pub use crate::public::Public;

mod secret;
pub use crate::secret::Secret;

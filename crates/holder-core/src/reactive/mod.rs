//! # Reactive values
//!
//! [`Dynamic<T>`] holds a value that is replaced wholesale and versioned on
//! every replacement. Readers either clone the current value or poll a
//! [`Subscription`] for changes. Only std primitives are used, so the same
//! type serves sync code, tests and any async runtime.
//!
//! ```rust,ignore
//! let status = Dynamic::new(CertificateExpirationStatus::Valid);
//! let mut sub = status.subscribe();
//!
//! status.set(CertificateExpirationStatus::Expired);
//! assert_eq!(sub.poll(), Some(CertificateExpirationStatus::Expired));
//! assert_eq!(sub.poll(), None);
//! ```

mod dynamic;

pub use dynamic::{Dynamic, Subscription};

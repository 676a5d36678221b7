//! # gwlist - thread-safe dynamic list
//!
//! A generic list of shared item handles for producer/consumer workflows.
//!
//! ## Design
//!
//! - Items are stored as `Arc<T>`; the list never inspects or frees them
//! - Each single operation is atomic, guarded by one internal mutex
//! - `lock` returns a [`ListGuard`] that makes a sequence of operations atomic
//! - Producers register and unregister explicitly; `consume` sleeps until an
//!   item is available or the last producer is gone
//! - Empty and not-found results are `None`; contract violations panic, with
//!   `try_*` variants returning [`ListError`] instead
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//! use gwlist::List;
//!
//! let list = Arc::new(List::new());
//!
//! // Producer: register before spawning so consumers cannot miss it
//! list.add_producer();
//! let producer = {
//!     let list = Arc::clone(&list);
//!     thread::spawn(move || {
//!         for i in 0..3 {
//!             list.produce(Arc::new(i));
//!         }
//!         list.remove_producer();
//!     })
//! };
//!
//! // Consumer: runs until the list is drained and no producers remain
//! let mut seen = Vec::new();
//! while let Some(item) = list.consume() {
//!     seen.push(*item);
//! }
//! assert_eq!(seen, vec![0, 1, 2]);
//! producer.join().unwrap();
//! ```
//!
//! Several operations can be grouped under one lock:
//!
//! ```
//! use std::sync::Arc;
//! use gwlist::List;
//!
//! let list = List::new();
//! let mut guard = list.lock();
//! if guard.is_empty() {
//!     guard.append(Arc::new("first"));
//! }
//! guard.unlock();
//! assert_eq!(list.len(), 1);
//! ```

#![warn(missing_docs)]

mod error;
mod guard;
mod list;
mod state;
pub mod trace;

pub use error::ListError;
pub use guard::ListGuard;
pub use list::List;

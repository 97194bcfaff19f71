//! Operational transformation over rich-text change scripts.
//!
//! A change script ([`Delta`]) is an ordered sequence of insert, delete, and
//! retain operations describing either a document (inserts only) or a change
//! between two documents. The algebra over scripts — [`Delta::compose`],
//! [`Delta::invert`], [`Delta::diff`], [`Delta::transform`] and
//! [`Delta::transform_position`] — is the reconciliation core a real-time
//! collaborative editor needs.
//!
//! Text carries optional attribute maps for inline formatting. Structured,
//! non-text content lives in *embeds*: JSON objects with a single top-level
//! key naming the embed type, each occupying one document position.
//! Registering an [`EmbedHandler`] teaches the algebra how concurrent
//! updates to an embed type compose, invert, and transform.
//!
//! ```
//! use delta_ot::Delta;
//!
//! let mut doc = Delta::new();
//! doc.insert("Hello World", None);
//!
//! let mut change = Delta::new();
//! change.retain(6usize, None).delete(5).insert("there", None);
//!
//! let mut expected = Delta::new();
//! expected.insert("Hello there", None);
//! assert_eq!(doc.compose(&change).unwrap(), expected);
//! ```

pub mod attributes;
pub mod delta;
pub mod embed;
pub mod error;
pub mod op;
pub mod op_iterator;

mod text_diff;

pub use attributes::AttributeMap;
pub use delta::{Delta, Line, Lines};
pub use embed::{find_handler, register_embed, unregister_embed, EmbedHandler};
pub use error::{DeltaError, DiffSide};
pub use op::{InsertValue, Op, RetainValue};
pub use op_iterator::{OpIterator, OpType};

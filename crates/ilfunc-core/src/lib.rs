//! Splice engine behind `ilfunc`.
//!
//! Methods tagged `[ILFunc("...")]` carry their real body as IL text in the
//! attribute argument. In ildasm output the argument shows up as a hex dump:
//!
//! ```text
//! .custom instance void [ILFunc]ILFunc.ILFuncAttribute::.ctor(string) = ( 01 00 05 6C 64 6E 75 6C 6C 00 00 )
//! ```
//!
//! The rewrite pass finds each such line, decodes the string, deletes the
//! attribute and replaces everything from `.maxstack` up to
//! `} // end of method` with the decoded IL. The whole pass either succeeds for
//! every marker or leaves the text alone.

pub mod blob;
pub mod edit;
pub mod error;
pub mod locate;
pub mod packed;
pub mod payload;
pub mod rewrite;
pub mod scan;

pub use blob::{extract_blob, render_hex, ByteBlob};
pub use edit::{Edit, EditList};
pub use error::{RewriteError, SpliceError};
pub use locate::{Marker, MarkerLocator, BODY_END, DEFAULT_ATTRIBUTE, STACK_DIRECTIVE};
pub use packed::{read_packed_len, PackedLen, MAX_PACKED_LEN};
pub use payload::{decode_payload, encode_payload, PROLOG};
pub use rewrite::{rewrite_il, Newline, Plan, RewriteOptions, Rewriter, Splice};

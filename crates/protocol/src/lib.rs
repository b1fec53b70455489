//! Wire protocol for the filedock service.
//!
//! # Wire format
//!
//! ```text
//! REQUEST (client -> server):   "put <name>" | "get <name>" | "list"
//!                               (no terminator, read as one buffer of <= 1024 bytes)
//! REPLY (server -> client):     "OK" | "Error: <reason>"      (put/get only)
//! DATA PHASE:                   [raw file bytes]["END_OF_FILE"]
//! LISTING PHASE:                LIST_BEGIN "\n" name ("\n" name)* "\n" LIST_END
//! PUT ACK (server -> client):   "File saved successfully on the server."
//! ```

pub mod constants;
pub mod error;
pub mod reply;
pub mod request;

pub use constants::{
    END_OF_STREAM_MARKER, LIST_BEGIN_MARKER, LIST_END_MARKER, MAX_REQUEST_LEN, PUT_ACK,
};
pub use error::ProtocolError;
pub use reply::Reply;
pub use request::{TransferRequest, Verb};

//! Cache Module
//!
//! Typed value storage under generated keys.

mod typed;
mod value;


// Re-export public types
pub use typed::{
    decode_float, decode_int, decode_str, Cache, StoreOperation, STORE_OPERATION,
};
pub use value::Value;

//! # Shared Types Crate
//!
//! Types shared by every co-simulation component crate.
//!
//! ## Contents
//!
//! - **Entities**: [`Time`], [`InterfaceHandle`], [`FederateId`], [`Complex`], [`NamedPoint`]
//! - **Data types**: the [`DataType`] catalogue and type-name cleanup
//! - **Values**: the closed [`Value`] sum type with its conversion lattice and
//!   change-distance function
//! - **Codec**: [`ValueEncoding`] for moving values through the Core as bytes
//! - **Errors**: [`FederateError`]

pub mod codec;
pub mod data_type;
pub mod entities;
pub mod errors;
pub mod value;

pub use codec::ValueEncoding;
pub use data_type::{clean_type_name, type_size, DataType};
pub use entities::*;
pub use errors::*;
pub use value::Value;

//! Domain layer for value exchange.

pub mod input_record;
pub mod multi_input;
pub mod publication_record;
pub mod state;
pub mod value_type;

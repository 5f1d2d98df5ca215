//! Export of the patient collection.

mod html;
mod records;

pub use html::*;
pub use records::*;

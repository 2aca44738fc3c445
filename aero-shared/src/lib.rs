pub mod pagination;
pub mod pii;
pub mod validate;

pub use pagination::{Page, PageQuery, PageRequest};
pub use pii::Masked;

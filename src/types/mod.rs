pub mod email;
pub mod money;
pub mod slug;
pub mod value_object;

pub use email::Email;
pub use money::Money;
pub use slug::Slug;
pub use value_object::{ValueObject, ValueObjectable};

mod value;

pub use value::{Object, Value, ValueType};

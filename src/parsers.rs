pub mod expander;
pub mod ll;
pub mod stack;

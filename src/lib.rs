pub mod clock;
pub mod config;
pub mod diagnostics;
pub mod encoder;
pub mod env;
pub mod error;
pub mod formatter;
pub mod init;
pub mod record;
pub mod value;

pub use encoder::JsonEncoder;
pub use formatter::Formatter;
pub use value::Value;

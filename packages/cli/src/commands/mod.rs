pub mod check;
pub mod compile;
pub mod init;

pub use check::{check, CheckArgs};
pub use compile::{compile, CompileArgs};
pub use init::{init, InitArgs};

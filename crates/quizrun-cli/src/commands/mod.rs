pub mod init;
pub mod list;
pub mod play;
pub mod validate;

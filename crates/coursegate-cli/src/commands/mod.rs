pub mod grade;
pub mod init;
pub mod order;
pub mod progress;
pub mod validate;

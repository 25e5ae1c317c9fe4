pub mod file_lock;
pub mod json_file;
pub mod layout;
pub mod persistence;

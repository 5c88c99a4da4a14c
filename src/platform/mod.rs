//! Platform-specific helpers.
//! Hides OS differences (Unix/Windows) behind a uniform API so the rest of
//! the crate stays platform-agnostic.

#[cfg(unix)]
mod common_unix;
mod temp;
#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod windows;

#[cfg(unix)]
pub use unix::{
    open_log_file_secure_append, set_dir_mode_0700, set_file_mode_0600, system_trash_dir,
    write_config_secure_new_0600,
};

#[cfg(not(unix))]
pub use windows::{
    open_log_file_secure_append, set_dir_mode_0700, set_file_mode_0600, system_trash_dir,
    write_config_secure_new_0600,
};

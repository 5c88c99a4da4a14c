//! Filesystem boundary: directory creation, byte copies, relocation.
//! Note and attachment bytes are copied verbatim; nothing here parses content.

mod atomic;
mod copy;
mod helpers;
mod io_copy;
mod mkdir;
mod relocate;
mod util;

pub use copy::safe_copy_and_rename;
pub use helpers::io_error_with_help_io;
pub use mkdir::ensure_dir;
pub use relocate::relocate;

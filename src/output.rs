//! Colored user-facing printing.
//! Colors are enabled only when the stream is a TTY; scripts get plain prefixes.

use owo_colors::OwoColorize;

fn stdout_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

fn stderr_tty() -> bool {
    atty::is(atty::Stream::Stderr)
}

pub fn print_info(msg: &str) {
    if stdout_tty() {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {msg}");
    }
}

pub fn print_warn(msg: &str) {
    if stderr_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {msg}");
    }
}

pub fn print_error(msg: &str) {
    if stderr_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {msg}");
    }
}

pub fn print_success(msg: &str) {
    if stdout_tty() {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {msg}");
    }
}

/// Print a plain line (no prefix) for primary outputs scripts may parse.
pub fn print_user(msg: &str) {
    println!("{msg}");
}

/// A progress line on stderr, dimmed on a TTY.
pub fn print_status(icon: &str, msg: &str) {
    if stderr_tty() {
        eprintln!("{} {}", format!("[{icon}]").dimmed(), msg);
    } else {
        eprintln!("[{icon}] {msg}");
    }
}

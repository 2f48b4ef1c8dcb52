//! User-facing console channel. File logging goes through `tracing`; these
//! helpers carry the colored progress lines the operator actually watches.

use crossterm::style::Stylize;

pub fn section(message: &str) {
    println!("\n{}", message.to_string().yellow());
}

pub fn info(message: &str) {
    println!("{message}");
}

pub fn success(message: &str) {
    println!("{}", message.to_string().green());
}

pub fn warn(message: &str) {
    println!("{}", message.to_string().yellow());
}

pub fn error(message: &str) {
    eprintln!("{}", message.to_string().red());
}

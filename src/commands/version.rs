//! Command: print version information.
use std::io::Write;

/// The build version: `PROVISION_VERSION` when set at build time, otherwise
/// the crate version.
#[must_use]
pub fn current() -> &'static str {
    option_env!("PROVISION_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Write `provision <version>` to `out`.
///
/// # Errors
///
/// Returns an error if `out` cannot be written.
pub fn run(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "provision {}", current())
}

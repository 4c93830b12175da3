//! Command: print the detected platform.
use anyhow::Result;
use std::io::Write;

use super::CommandSetup;
use crate::cli::GlobalOpts;
use crate::logging::Log;

/// Determine the platform (with confirmation unless `--yes`) and write it
/// to `out`.
///
/// # Errors
///
/// Returns an error if the platform cannot be determined or `out` cannot be
/// written.
pub fn run(global: &GlobalOpts, log: &dyn Log, out: &mut impl Write) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    writeln!(out, "{}", setup.host.platform)?;
    if let Some(release) = setup.host.release {
        log.debug(&format!("release {release}"));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::platform::Platform;
    use crate::tasks::test_helpers::RecordingLog;

    #[test]
    fn explicit_platform_is_written_to_output() {
        let dir = tempfile::tempdir().unwrap();
        let global = GlobalOpts {
            platform: Some(Platform::MacOs),
            yes: true,
            config: Some(dir.path().join("config.toml")),
            ..GlobalOpts::default()
        };
        let log = RecordingLog::default();
        let mut out = Vec::new();

        run(&global, &log, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "macos\n");
        assert_eq!(log.stages(), vec!["Detecting platform", "Loading configuration"]);
    }
}

//! Host platform detection and operator confirmation.
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::Result;

use crate::error::PlatformError;
use crate::exec::Executor;
use crate::logging::Log;
use crate::prompt::Prompter;

/// Operating system family the run targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Apple macOS (Homebrew).
    MacOs,
    /// Fedora Linux (dnf).
    Fedora,
    /// Arch Linux (pacman plus an AUR helper).
    Arch,
    /// No supported platform signal was found.
    Unknown,
}

impl Platform {
    /// Platforms offered by the selection menu, in menu order.
    pub const SELECTABLE: [Self; 3] = [Self::MacOs, Self::Fedora, Self::Arch];

    /// Human-readable name used in prompts and the summary.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MacOs => "macOS",
            Self::Fedora => "Fedora",
            Self::Arch => "Arch Linux",
            Self::Unknown => "unknown",
        }
    }

    /// Map a menu answer (`1`, `2` or `3`) to a platform.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::InvalidSelection`] for anything that is not
    /// the number of a listed entry.
    pub fn from_menu_choice(answer: &str) -> Result<Self, PlatformError> {
        answer
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| Self::SELECTABLE.get(i).copied())
            .ok_or_else(|| PlatformError::InvalidSelection(answer.trim().to_string()))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MacOs => write!(f, "macos"),
            Self::Fedora => write!(f, "fedora"),
            Self::Arch => write!(f, "arch"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for Platform {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "macos" | "darwin" | "mac" => Ok(Self::MacOs),
            "fedora" => Ok(Self::Fedora),
            "arch" | "archlinux" => Ok(Self::Arch),
            other => Err(PlatformError::Unsupported(other.to_string())),
        }
    }
}

/// The confirmed run target: platform plus distribution release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Host {
    /// Confirmed platform.
    pub platform: Platform,
    /// Distribution release number (`VERSION_ID`), when known.
    pub release: Option<u32>,
}

impl Host {
    /// Create a host, rejecting [`Platform::Unknown`].
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Unsupported`] if `platform` is unknown.
    pub fn new(platform: Platform, release: Option<u32>) -> Result<Self, PlatformError> {
        if platform == Platform::Unknown {
            return Err(PlatformError::Unsupported(platform.to_string()));
        }
        Ok(Self { platform, release })
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.release {
            Some(release) => write!(f, "{} {release}", self.platform.label()),
            None => write!(f, "{}", self.platform.label()),
        }
    }
}

/// Detect the platform from host signals.
///
/// Checks, in order: `uname -s` reporting `Darwin`, `<root>/etc/fedora-release`,
/// `<root>/etc/arch-release`. `root` is `/` outside tests.
#[must_use]
pub fn detect_signal(root: &Path, executor: &dyn Executor) -> Platform {
    if let Ok(result) = executor.run_unchecked("uname", &["-s"])
        && result.success
        && result.stdout.trim() == "Darwin"
    {
        return Platform::MacOs;
    }
    if root.join("etc/fedora-release").exists() {
        return Platform::Fedora;
    }
    if root.join("etc/arch-release").exists() {
        return Platform::Arch;
    }
    Platform::Unknown
}

/// Read the numeric `VERSION_ID` from `<root>/etc/os-release`.
///
/// Rolling distributions publish no `VERSION_ID` (or a non-numeric one), in
/// which case `None` is returned.
#[must_use]
pub fn detect_release(root: &Path) -> Option<u32> {
    let content = fs::read_to_string(root.join("etc/os-release")).ok()?;
    content.lines().find_map(|line| {
        line.strip_prefix("VERSION_ID=")
            .map(|v| v.trim().trim_matches('"').trim_matches('\''))
            .and_then(|v| v.parse().ok())
    })
}

/// Confirm a detected platform with the operator or fall back to the menu.
///
/// A detected platform is offered for yes/no confirmation. On "no", or when
/// nothing was detected, the numbered menu is shown and exactly one answer is
/// read.
///
/// # Errors
///
/// Returns [`PlatformError::InvalidSelection`] if the menu answer is not a
/// listed number, or any error from the prompter.
pub fn resolve(signal: Platform, prompter: &dyn Prompter, log: &dyn Log) -> Result<Platform> {
    if signal != Platform::Unknown {
        let question = format!("Detected {}. Is this correct?", signal.label());
        if prompter.confirm(&question, true)? {
            return Ok(signal);
        }
    } else {
        log.warn("could not detect the platform automatically");
    }

    for (i, platform) in Platform::SELECTABLE.iter().enumerate() {
        log.info(&format!("{}) {}", i + 1, platform.label()));
    }
    let answer = prompter.input("Select your platform")?;
    Ok(Platform::from_menu_choice(&answer)?)
}

/// Determine the run target.
///
/// An explicit platform bypasses detection and prompting. With `assume_yes`
/// the detected platform is accepted as-is and a missing signal is fatal.
///
/// # Errors
///
/// Returns [`PlatformError::DetectionFailed`] when nothing is detected under
/// `assume_yes`, [`PlatformError::InvalidSelection`] on a bad menu answer, or
/// [`PlatformError::Unsupported`] if the result is [`Platform::Unknown`].
pub fn determine(
    explicit: Option<Platform>,
    assume_yes: bool,
    root: &Path,
    executor: &dyn Executor,
    prompter: &dyn Prompter,
    log: &dyn Log,
) -> Result<Host> {
    let platform = match explicit {
        Some(platform) => platform,
        None => {
            let signal = detect_signal(root, executor);
            log.debug(&format!("platform signal: {signal}"));
            if assume_yes {
                if signal == Platform::Unknown {
                    return Err(PlatformError::DetectionFailed(
                        "no platform signal found; pass --platform".to_string(),
                    )
                    .into());
                }
                signal
            } else {
                resolve(signal, prompter, log)?
            }
        }
    };

    let release = match platform {
        Platform::MacOs | Platform::Unknown => None,
        Platform::Fedora | Platform::Arch => detect_release(root),
    };
    Ok(Host::new(platform, release)?)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::prompt::MockPrompter;
    use crate::resources::test_helpers::MockExecutor;
    use crate::tasks::test_helpers::RecordingLog;

    fn fedora_root(release: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("etc")).unwrap();
        fs::write(dir.path().join("etc/fedora-release"), "Fedora release").unwrap();
        fs::write(
            dir.path().join("etc/os-release"),
            format!("NAME=\"Fedora Linux\"\nVERSION_ID={release}\nID=fedora\n"),
        )
        .unwrap();
        dir
    }

    #[test]
    fn darwin_uname_wins_over_release_files() {
        let root = fedora_root("41");
        let executor = MockExecutor::ok("Darwin\n");
        assert_eq!(detect_signal(root.path(), &executor), Platform::MacOs);
    }

    #[test]
    fn fedora_release_file_detected() {
        let root = fedora_root("41");
        let executor = MockExecutor::ok("Linux\n");
        assert_eq!(detect_signal(root.path(), &executor), Platform::Fedora);
    }

    #[test]
    fn arch_release_file_detected() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("etc")).unwrap();
        fs::write(root.path().join("etc/arch-release"), "").unwrap();
        let executor = MockExecutor::ok("Linux\n");
        assert_eq!(detect_signal(root.path(), &executor), Platform::Arch);
    }

    #[test]
    fn no_signal_is_unknown() {
        let root = tempfile::tempdir().unwrap();
        let executor = MockExecutor::fail();
        assert_eq!(detect_signal(root.path(), &executor), Platform::Unknown);
    }

    #[test]
    fn release_parsed_from_os_release() {
        let root = fedora_root("\"42\"");
        assert_eq!(detect_release(root.path()), Some(42));
    }

    #[test]
    fn non_numeric_release_is_none() {
        let root = fedora_root("rolling");
        assert_eq!(detect_release(root.path()), None);
    }

    #[test]
    fn menu_choices_map_in_order() {
        assert_eq!(Platform::from_menu_choice("1").unwrap(), Platform::MacOs);
        assert_eq!(Platform::from_menu_choice(" 2 ").unwrap(), Platform::Fedora);
        assert_eq!(Platform::from_menu_choice("3").unwrap(), Platform::Arch);
    }

    #[test]
    fn out_of_range_or_garbage_menu_choice_is_invalid() {
        for answer in ["0", "4", "fedora", "", "-1"] {
            assert!(
                matches!(
                    Platform::from_menu_choice(answer),
                    Err(PlatformError::InvalidSelection(_))
                ),
                "{answer:?} should be rejected"
            );
        }
    }

    #[test]
    fn parse_platform_names() {
        assert_eq!("macOS".parse::<Platform>().unwrap(), Platform::MacOs);
        assert_eq!("fedora".parse::<Platform>().unwrap(), Platform::Fedora);
        assert_eq!("Arch".parse::<Platform>().unwrap(), Platform::Arch);
        assert!("windows".parse::<Platform>().is_err());
    }

    #[test]
    fn host_rejects_unknown() {
        assert_eq!(
            Host::new(Platform::Unknown, None),
            Err(PlatformError::Unsupported("unknown".to_string()))
        );
    }

    #[test]
    fn resolve_accepts_confirmed_signal_without_menu() {
        let mut prompter = MockPrompter::new();
        prompter.expect_confirm().times(1).returning(|_, _| Ok(true));
        prompter.expect_input().never();
        let log = RecordingLog::default();
        assert_eq!(
            resolve(Platform::Fedora, &prompter, &log).unwrap(),
            Platform::Fedora
        );
    }

    #[test]
    fn resolve_rejected_signal_falls_back_to_menu() {
        let mut prompter = MockPrompter::new();
        prompter.expect_confirm().times(1).returning(|_, _| Ok(false));
        prompter
            .expect_input()
            .times(1)
            .returning(|_| Ok("3".to_string()));
        let log = RecordingLog::default();
        assert_eq!(
            resolve(Platform::Fedora, &prompter, &log).unwrap(),
            Platform::Arch
        );
        assert!(log.infos().iter().any(|l| l == "1) macOS"));
    }

    #[test]
    fn resolve_invalid_menu_answer_is_fatal_after_one_read() {
        let mut prompter = MockPrompter::new();
        prompter.expect_confirm().never();
        prompter
            .expect_input()
            .times(1)
            .returning(|_| Ok("9".to_string()));
        let log = RecordingLog::default();
        let err = resolve(Platform::Unknown, &prompter, &log).unwrap_err();
        assert_eq!(
            err.downcast_ref::<PlatformError>(),
            Some(&PlatformError::InvalidSelection("9".to_string()))
        );
    }

    #[test]
    fn determine_explicit_platform_skips_detection() {
        let root = tempfile::tempdir().unwrap();
        let executor = MockExecutor::with_responses(vec![]);
        let mut prompter = MockPrompter::new();
        prompter.expect_confirm().never();
        let log = RecordingLog::default();
        let host = determine(
            Some(Platform::MacOs),
            false,
            root.path(),
            &executor,
            &prompter,
            &log,
        )
        .unwrap();
        assert_eq!(host.platform, Platform::MacOs);
        assert_eq!(executor.call_count(), 0);
    }

    #[test]
    fn determine_assume_yes_without_signal_fails() {
        let root = tempfile::tempdir().unwrap();
        let executor = MockExecutor::ok("Linux\n");
        let prompter = MockPrompter::new();
        let log = RecordingLog::default();
        let err = determine(None, true, root.path(), &executor, &prompter, &log).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PlatformError>(),
            Some(PlatformError::DetectionFailed(_))
        ));
    }

    #[test]
    fn determine_assume_yes_carries_fedora_release() {
        let root = fedora_root("41");
        let executor = MockExecutor::ok("Linux\n");
        let prompter = MockPrompter::new();
        let log = RecordingLog::default();
        let host = determine(None, true, root.path(), &executor, &prompter, &log).unwrap();
        assert_eq!(
            host,
            Host {
                platform: Platform::Fedora,
                release: Some(41)
            }
        );
    }
}

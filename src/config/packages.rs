//! Dotfile package selection.
use crate::platform::Platform;

/// Ordered dotfile packages: a common list plus per-platform extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageGroup {
    /// Packages linked on every platform.
    pub common: Vec<String>,
    /// Packages linked only when the host platform matches.
    pub platform_extras: Vec<(Platform, Vec<String>)>,
}

impl PackageGroup {
    /// The packages to link on `platform`, common ones first.
    #[must_use]
    pub fn for_platform(&self, platform: Platform) -> Vec<&str> {
        self.common
            .iter()
            .chain(
                self.platform_extras
                    .iter()
                    .filter(|(p, _)| *p == platform)
                    .flat_map(|(_, names)| names),
            )
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> PackageGroup {
        PackageGroup {
            common: vec!["git".into(), "nvim".into()],
            platform_extras: vec![
                (Platform::MacOs, vec!["aerospace".into()]),
                (Platform::Fedora, vec!["kitty".into()]),
                (Platform::Arch, vec!["kitty".into(), "hypr".into()]),
            ],
        }
    }

    #[test]
    fn platform_extras_only_on_matching_platform() {
        assert_eq!(
            group().for_platform(Platform::MacOs),
            vec!["git", "nvim", "aerospace"]
        );
        assert_eq!(
            group().for_platform(Platform::Arch),
            vec!["git", "nvim", "kitty", "hypr"]
        );
    }

    #[test]
    fn unknown_platform_gets_common_only() {
        assert_eq!(group().for_platform(Platform::Unknown), vec!["git", "nvim"]);
    }
}

//! The declared tool list.
use super::{ReleaseRange, Stage, Step, Tool};
use crate::platform::Platform::{Arch, Fedora, MacOs};
use crate::presence::Presence;

use super::PackageManager::{Aur, Brew, BrewCask, Dnf, Pacman};

/// First Fedora release whose repositories no longer carry lazygit.
const FEDORA_LAZYGIT_COPR_CUTOFF: u32 = 42;

const OH_MY_ZSH_INSTALLER: &str =
    "https://raw.githubusercontent.com/ohmyzsh/ohmyzsh/master/tools/install.sh";
const NVM_INSTALLER: &str = "https://raw.githubusercontent.com/nvm-sh/nvm/v0.40.1/install.sh";
const PYENV_INSTALLER: &str = "https://pyenv.run";
const RUSTUP_INSTALLER: &str = "https://sh.rustup.rs";
const STARSHIP_INSTALLER: &str = "https://starship.rs/install.sh";

/// A tool whose package has the same name on every platform.
fn native(name: &'static str, stage: Stage, presence: Presence) -> Tool {
    Tool::new(name, stage, presence)
        .on(MacOs, vec![Step::packages(Brew, &[name])])
        .on(Fedora, vec![Step::packages(Dnf, &[name])])
        .on(Arch, vec![Step::packages(Pacman, &[name])])
}

fn docker_service_steps() -> [Step; 3] {
    [
        Step::command("sudo", &["systemctl", "enable", "--now", "docker"]),
        Step::command("sudo", &["usermod", "-aG", "docker", "$USER"]),
        Step::Note("Log out and back in for the docker group membership to apply"),
    ]
}

/// Every tool, in install order.
#[must_use]
pub fn tools() -> Vec<Tool> {
    vec![
        // shell
        native("zsh", Stage::Shell, Presence::bin("zsh")),
        Tool::new("oh-my-zsh", Stage::Shell, Presence::dir(".oh-my-zsh")).everywhere(&[
            Step::script(
                OH_MY_ZSH_INSTALLER,
                "sh",
                &["--unattended", "--keep-zshrc"],
            ),
        ]),
        // core
        native("git", Stage::Core, Presence::bin("git")),
        native("curl", Stage::Core, Presence::bin("curl")),
        native("stow", Stage::Core, Presence::bin("stow")),
        native("ripgrep", Stage::Core, Presence::bin("rg")),
        Tool::new("fd", Stage::Core, Presence::bin("fd"))
            .on(MacOs, vec![Step::packages(Brew, &["fd"])])
            .on(
                Fedora,
                vec![
                    Step::packages(Dnf, &["fd-find"]),
                    Step::LinkAlias {
                        alias: "fd",
                        target: "fdfind",
                    },
                ],
            )
            .on(Arch, vec![Step::packages(Pacman, &["fd"])]),
        native("fzf", Stage::Core, Presence::bin("fzf")),
        native("bat", Stage::Core, Presence::bin("bat")),
        native("neovim", Stage::Core, Presence::bin("nvim")),
        native("tmux", Stage::Core, Presence::bin("tmux")),
        native("jq", Stage::Core, Presence::bin("jq")),
        // developer
        Tool::new("paru", Stage::Developer, Presence::any_bin(&["paru", "yay"]))
            .on(
                Arch,
                vec![
                    Step::packages(Pacman, &["base-devel", "git"]),
                    Step::BuildFromAur {
                        package: "paru-bin",
                    },
                ],
            )
            .only_on(&[Arch]),
        Tool::new("docker", Stage::Developer, Presence::bin("docker"))
            .on(
                MacOs,
                vec![
                    Step::packages(BrewCask, &["docker"]),
                    Step::Note("Open Docker.app once to finish the Docker Desktop setup"),
                ],
            )
            .on(
                Fedora,
                [
                    vec![Step::packages(Dnf, &["moby-engine", "docker-compose"])],
                    docker_service_steps().to_vec(),
                ]
                .concat(),
            )
            .on(
                Arch,
                [
                    vec![Step::packages(Pacman, &["docker", "docker-compose"])],
                    docker_service_steps().to_vec(),
                ]
                .concat(),
            ),
        Tool::new("lazygit", Stage::Developer, Presence::bin("lazygit"))
            .on(MacOs, vec![Step::packages(Brew, &["lazygit"])])
            .on_releases(
                Fedora,
                ReleaseRange::Below(FEDORA_LAZYGIT_COPR_CUTOFF),
                vec![
                    Step::command("sudo", &["dnf", "copr", "enable", "-y", "atim/lazygit"]),
                    Step::packages(Dnf, &["lazygit"]),
                ],
            )
            .on_releases(
                Fedora,
                ReleaseRange::AtLeast(FEDORA_LAZYGIT_COPR_CUTOFF),
                vec![Step::GithubRelease {
                    repo: "jesseduffield/lazygit",
                    asset: "lazygit_{version}_Linux_{arch}.tar.gz",
                    binary: "lazygit",
                }],
            )
            .on(Arch, vec![Step::packages(Pacman, &["lazygit"])]),
        // languages
        Tool::new("nvm", Stage::Languages, Presence::dir(".nvm")).everywhere(&[
            Step::script(NVM_INSTALLER, "bash", &[]),
            Step::Note("Run `nvm install --lts` in a new shell to install Node.js"),
        ]),
        Tool::new("pyenv", Stage::Languages, Presence::bin("pyenv").or_dir(".pyenv"))
            .on(MacOs, vec![Step::packages(Brew, &["pyenv"])])
            .on(Fedora, vec![Step::script(PYENV_INSTALLER, "bash", &[])])
            .on(Arch, vec![Step::packages(Pacman, &["pyenv"])]),
        Tool::new("rustup", Stage::Languages, Presence::bin("rustup").or_dir(".rustup")).everywhere(
            &[Step::script(
                RUSTUP_INSTALLER,
                "sh",
                &["-y", "--no-modify-path"],
            )],
        ),
        // credentials
        Tool::new(
            "git-credential-manager",
            Stage::Credentials,
            Presence::bin("git-credential-manager").or_dir(".dotnet/tools/git-credential-manager"),
        )
        .on(
            MacOs,
            vec![Step::packages(BrewCask, &["git-credential-manager"])],
        )
        .on(
            Fedora,
            vec![
                Step::packages(Dnf, &["dotnet-sdk-8.0"]),
                Step::command(
                    "dotnet",
                    &["tool", "install", "--global", "git-credential-manager"],
                ),
                Step::command("$HOME/.dotnet/tools/git-credential-manager", &["configure"]),
            ],
        )
        .on(
            Arch,
            vec![
                Step::packages(Aur, &["git-credential-manager-bin"]),
                Step::command("git-credential-manager", &["configure"]),
            ],
        ),
        // prompt
        Tool::new("starship", Stage::Prompt, Presence::bin("starship"))
            .on(MacOs, vec![Step::packages(Brew, &["starship"])])
            .on(
                Fedora,
                vec![Step::script(
                    STARSHIP_INSTALLER,
                    "sh",
                    &["-y", "-b", "$HOME/.local/bin"],
                )],
            )
            .on(Arch, vec![Step::packages(Pacman, &["starship"])]),
        native("zoxide", Stage::Prompt, Presence::bin("zoxide")),
    ]
}

/// Tools installed in `stage`, in install order.
#[must_use]
pub fn by_stage(stage: Stage) -> Vec<Tool> {
    tools().into_iter().filter(|t| t.stage == stage).collect()
}

/// Look up a tool by name.
#[must_use]
pub fn find(name: &str) -> Option<Tool> {
    tools().into_iter().find(|t| t.name == name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::platform::{Host, Platform};
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let tools = tools();
        let names: HashSet<_> = tools.iter().map(|t| t.name).collect();
        assert_eq!(names.len(), tools.len());
    }

    #[test]
    fn tools_are_grouped_in_stage_order() {
        let stages: Vec<Stage> = tools().iter().map(|t| t.stage).collect();
        let mut sorted = stages.clone();
        sorted.sort_by_key(|s| Stage::ALL.iter().position(|x| x == s));
        assert_eq!(stages, sorted);
    }

    #[test]
    fn every_applicable_tool_has_a_recipe_for_each_platform() {
        for tool in tools() {
            for platform in Platform::SELECTABLE {
                if !tool.applies_to(platform) {
                    continue;
                }
                let host = Host::new(platform, Some(41)).unwrap();
                assert!(
                    tool.recipe_for(&host).is_some(),
                    "{} has no recipe for {platform}",
                    tool.name
                );
            }
        }
    }

    #[test]
    fn fd_on_fedora_installs_fd_find_then_links() {
        let fd = find("fd").unwrap();
        let host = Host::new(Fedora, Some(41)).unwrap();
        let steps = &fd.recipe_for(&host).unwrap().steps;
        assert_eq!(steps[0], Step::packages(Dnf, &["fd-find"]));
        assert_eq!(
            steps[1],
            Step::LinkAlias {
                alias: "fd",
                target: "fdfind"
            }
        );
        assert_eq!(fd.presence.binaries, vec!["fd"]);
    }

    #[test]
    fn lazygit_on_fedora_switches_at_cutoff() {
        let lazygit = find("lazygit").unwrap();
        let old = Host::new(Fedora, Some(41)).unwrap();
        let new = Host::new(Fedora, Some(42)).unwrap();
        assert!(matches!(
            lazygit.recipe_for(&old).unwrap().steps[0],
            Step::Command { .. }
        ));
        assert!(matches!(
            lazygit.recipe_for(&new).unwrap().steps[0],
            Step::GithubRelease { .. }
        ));
    }

    #[test]
    fn aur_helper_precedes_aur_dependent_tools() {
        let tools = tools();
        let helper = tools.iter().position(|t| t.name == "paru").unwrap();
        for (i, tool) in tools.iter().enumerate() {
            let uses_aur = tool.recipes.iter().any(|r| {
                r.steps
                    .iter()
                    .any(|s| matches!(s, Step::Packages { manager: Aur, .. }))
            });
            if uses_aur {
                assert!(i > helper, "{} uses the AUR before paru", tool.name);
            }
        }
    }

    #[test]
    fn paru_only_on_arch() {
        let paru = find("paru").unwrap();
        assert!(paru.applies_to(Arch));
        assert!(!paru.applies_to(Fedora));
        assert!(!paru.applies_to(MacOs));
    }
}

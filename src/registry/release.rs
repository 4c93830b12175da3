//! GitHub release installs: latest tag lookup, download, checksum, extract.
use anyhow::{Context as _, Result};
use std::path::Path;

use crate::error::InstallError;
use crate::exec::Executor;
use crate::tasks::Context;

/// Name of the checksums file published alongside release assets.
const CHECKSUMS_FILE: &str = "checksums.txt";

/// Install `binary` from the latest release of `repo` into `~/.local/bin`.
///
/// # Errors
///
/// Returns [`InstallError::Download`] if the tag or asset cannot be fetched,
/// [`InstallError::Checksum`] if the asset does not match the published
/// digest, or an I/O error while extracting or installing.
pub fn install(ctx: &Context, repo: &str, asset: &str, binary: &str) -> Result<()> {
    let tag = latest_tag(repo, &*ctx.executor)?;
    let version = tag.trim_start_matches('v');
    let asset = asset
        .replace("{version}", version)
        .replace("{arch}", release_arch());
    ctx.log.info(&format!("downloading {asset} ({tag})"));

    let workdir = std::env::temp_dir().join(format!("provision-{binary}"));
    if workdir.exists() {
        std::fs::remove_dir_all(&workdir).context("removing previous download directory")?;
    }
    std::fs::create_dir_all(&workdir).context("creating download directory")?;

    let result = download_and_install(ctx, repo, &tag, &asset, binary, &workdir);
    std::fs::remove_dir_all(&workdir).ok();
    result
}

fn download_and_install(
    ctx: &Context,
    repo: &str,
    tag: &str,
    asset: &str,
    binary: &str,
    workdir: &Path,
) -> Result<()> {
    let archive = workdir.join(asset);
    let url = format!("https://github.com/{repo}/releases/download/{tag}/{asset}");
    ctx.executor
        .run("curl", &["-fsSL", "-o", &archive.to_string_lossy(), &url])
        .map_err(|e| InstallError::Download(format!("{url}: {e:#}")))?;

    if !verify_checksum(repo, tag, asset, &archive, &*ctx.executor)? {
        ctx.log
            .warn(&format!("no published checksum for {asset}; skipping verification"));
    }

    ctx.executor
        .run(
            "tar",
            &[
                "-xzf",
                &archive.to_string_lossy(),
                "-C",
                &workdir.to_string_lossy(),
                binary,
            ],
        )
        .with_context(|| format!("extracting {binary} from {asset}"))?;

    let dest = ctx.local_bin().join(binary);
    std::fs::create_dir_all(ctx.local_bin()).context("creating local bin directory")?;
    std::fs::copy(workdir.join(binary), &dest)
        .with_context(|| format!("installing {}", dest.display()))?;
    make_executable(&dest)?;
    ctx.log.info(&format!("installed {}", dest.display()));
    Ok(())
}

/// Fetch the latest release tag of `repo` from the GitHub API.
///
/// # Errors
///
/// Returns [`InstallError::Download`] if the API call fails or the response
/// has no tag.
pub fn latest_tag(repo: &str, executor: &dyn Executor) -> Result<String, InstallError> {
    let url = format!("https://api.github.com/repos/{repo}/releases/latest");
    let response = executor
        .run("curl", &["-fsSL", &url])
        .map_err(|e| InstallError::Download(format!("{url}: {e:#}")))?;
    parse_tag_name(&response.stdout)
        .ok_or_else(|| InstallError::Download(format!("{url}: response has no tag_name")))
}

/// Extract `tag_name` from a GitHub releases API response.
#[must_use]
pub fn parse_tag_name(json: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(json).ok()?;
    value
        .get("tag_name")?
        .as_str()
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
}

/// Find the digest for `asset` in a `sha256sum`-style checksums listing.
#[must_use]
pub fn expected_checksum(checksums: &str, asset: &str) -> Option<String> {
    checksums.lines().find_map(|line| {
        let mut parts = line.split_whitespace();
        let digest = parts.next()?;
        let name = parts.next()?.trim_start_matches('*');
        (name == asset).then(|| digest.to_ascii_lowercase())
    })
}

/// Verify `file` against the release's checksums file.
///
/// Returns `Ok(false)` when the release publishes no checksums file or no
/// entry for `asset`.
///
/// # Errors
///
/// Returns [`InstallError::Checksum`] on a digest mismatch.
pub fn verify_checksum(
    repo: &str,
    tag: &str,
    asset: &str,
    file: &Path,
    executor: &dyn Executor,
) -> Result<bool> {
    let url = format!("https://github.com/{repo}/releases/download/{tag}/{CHECKSUMS_FILE}");
    let listing = match executor.run_unchecked("curl", &["-fsSL", &url]) {
        Ok(r) if r.success => r.stdout,
        _ => return Ok(false),
    };
    let Some(expected) = expected_checksum(&listing, asset) else {
        return Ok(false);
    };

    let actual = compute_sha256(file)?;
    if expected != actual {
        return Err(InstallError::Checksum {
            asset: asset.to_string(),
            expected,
            actual,
        }
        .into());
    }
    Ok(true)
}

/// Compute the lowercase hex SHA-256 digest of the file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn compute_sha256(path: &Path) -> Result<String> {
    use sha2::{Digest, Sha256};
    use std::fmt::Write as _;

    let bytes = std::fs::read(path)
        .with_context(|| format!("reading {} for checksum verification", path.display()))?;
    let digest = Sha256::digest(&bytes);
    let mut hex = String::with_capacity(64);
    for b in &digest {
        write!(hex, "{b:02x}").unwrap_or(());
    }
    Ok(hex)
}

/// Architecture name used in release asset names.
fn release_arch() -> &'static str {
    match std::env::consts::ARCH {
        "aarch64" => "arm64",
        other => other,
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt as _;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .with_context(|| format!("setting permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

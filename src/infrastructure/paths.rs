//! Path helpers for the Zellij plugin sandbox.
//!
//! Inside the sandbox the host filesystem is reachable under `/host`, which
//! Zellij maps to the directory it was started from (usually `$HOME`).

use std::path::PathBuf;

/// Directory for the plugin's trace files:
/// `/host/.local/share/zellij/zerocost`.
#[must_use]
pub fn get_data_dir() -> PathBuf {
    PathBuf::from("/host/.local/share/zellij").join("zerocost")
}

/// Maps `~` and `~/…` to `/host` so user-supplied paths (like `theme_file`)
/// resolve inside the sandbox. Other paths pass through.
///
/// # Examples
///
/// ```
/// use zerocost::infrastructure::expand_tilde;
///
/// assert_eq!(expand_tilde("~/themes/dusk.toml"), "/host/themes/dusk.toml");
/// assert_eq!(expand_tilde("~"), "/host");
/// assert_eq!(expand_tilde("/etc/zerocost.toml"), "/etc/zerocost.toml");
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> String {
    let path = path.trim();
    match path.strip_prefix('~') {
        Some("") => "/host".to_string(),
        Some(rest) if rest.starts_with('/') => format!("/host{rest}"),
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_is_under_the_zellij_share_dir() {
        assert!(get_data_dir().ends_with(".local/share/zellij/zerocost"));
    }

    #[test]
    fn only_home_tildes_expand() {
        assert_eq!(expand_tilde(" ~/a.toml "), "/host/a.toml");
        assert_eq!(expand_tilde("~other/a.toml"), "~other/a.toml");
        assert_eq!(expand_tilde("themes/a.toml"), "themes/a.toml");
    }
}

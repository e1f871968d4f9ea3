//! Path resolution for config references.
//!
//! # Responsibilities
//! - Resolve `#import` references relative to the file that contains them
//! - Resolve the top-level config reference relative to the executable
//!
//! # Design Decisions
//! - URL bases use standard URL reference resolution (absolute,
//!   scheme-relative and path-relative references)
//! - Local joins are lexical: `.` and `..` are folded without touching disk

use std::path::{Component, Path, PathBuf};

use crate::error::ConfigError;
use crate::source::{is_http, SourceId};

/// Resolve `reference` against the source it was found in.
pub fn resolve(base: &SourceId, reference: &str) -> Result<SourceId, ConfigError> {
    match base {
        SourceId::Remote(url) => url
            .join(reference)
            .map(SourceId::Remote)
            .map_err(|cause| ConfigError::PathResolution {
                base: base.to_string(),
                reference: reference.to_string(),
                cause,
            }),
        SourceId::Local(path) => resolve_local(path, reference),
    }
}

/// Resolve the top-level config reference.
///
/// A reference starting with `./` is taken relative to the working
/// directory; anything else is resolved against the executable's location.
/// Returns `None` when no config is configured.
pub fn resolve_top_level(
    config_path: &str,
    executable: &Path,
) -> Result<Option<SourceId>, ConfigError> {
    if config_path.is_empty() {
        return Ok(None);
    }
    if config_path.starts_with("./") {
        return Ok(Some(SourceId::local(config_path)));
    }
    resolve_local(executable, config_path).map(Some)
}

fn resolve_local(base: &Path, reference: &str) -> Result<SourceId, ConfigError> {
    if reference.is_empty() || reference.starts_with('/') || is_http(reference) {
        return SourceId::parse(reference).map_err(|cause| ConfigError::PathResolution {
            base: base.display().to_string(),
            reference: reference.to_string(),
            cause,
        });
    }
    let dir = base.parent().unwrap_or_else(|| Path::new(""));
    Ok(SourceId::Local(normalize(&dir.join(reference))))
}

/// Fold `.` and `..` segments lexically.
fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(base: &str, reference: &str) -> String {
        resolve(&SourceId::local(base), reference).unwrap().to_string()
    }

    fn remote(base: &str, reference: &str) -> String {
        let base = SourceId::parse(base).unwrap();
        resolve(&base, reference).unwrap().to_string()
    }

    #[test]
    fn test_local_relative_joins_directory() {
        assert_eq!(local("/etc/app/main.ini", "extra.ini"), "/etc/app/extra.ini");
        assert_eq!(local("/etc/app/main.ini", "../shared/x.ini"), "/etc/shared/x.ini");
        assert_eq!(local("/etc/app/main.ini", "./sub/./y.ini"), "/etc/app/sub/y.ini");
        assert_eq!(local("main.ini", "other.ini"), "other.ini");
        assert_eq!(local("conf/main.ini", "../../up.ini"), "../up.ini");
    }

    #[test]
    fn test_local_absolute_and_url_unchanged() {
        assert_eq!(local("/etc/app/main.ini", "/opt/x.ini"), "/opt/x.ini");
        assert_eq!(
            local("/etc/app/main.ini", "https://cfg.example.com/a.ini"),
            "https://cfg.example.com/a.ini"
        );
        assert_eq!(local("/etc/app/main.ini", ""), "");
    }

    #[test]
    fn test_remote_reference_resolution() {
        assert_eq!(
            remote("http://cfg.example.com/app/main.ini", "extra.ini"),
            "http://cfg.example.com/app/extra.ini"
        );
        assert_eq!(
            remote("http://cfg.example.com/app/main.ini", "/root.ini"),
            "http://cfg.example.com/root.ini"
        );
        assert_eq!(
            remote("http://cfg.example.com/app/main.ini", "//other.example.com/b.ini"),
            "http://other.example.com/b.ini"
        );
        assert_eq!(
            remote("http://cfg.example.com/app/main.ini", "https://x.example.com/c.ini"),
            "https://x.example.com/c.ini"
        );
        assert_eq!(
            remote("http://cfg.example.com/app/main.ini", "../up.ini"),
            "http://cfg.example.com/up.ini"
        );
    }

    #[test]
    fn test_malformed_url_is_resolution_error() {
        let base = SourceId::parse("http://cfg.example.com/main.ini").unwrap();
        let err = resolve(&base, "http://[::1").unwrap_err();
        assert!(matches!(err, ConfigError::PathResolution { .. }));

        let err = resolve(&SourceId::local("/etc/a.ini"), "http://[::1").unwrap_err();
        assert!(matches!(err, ConfigError::PathResolution { .. }));
    }

    #[test]
    fn test_top_level_resolution() {
        let exe = Path::new("/usr/local/bin/app");
        assert_eq!(resolve_top_level("", exe).unwrap(), None);
        assert_eq!(
            resolve_top_level("./local.ini", exe).unwrap(),
            Some(SourceId::local("./local.ini"))
        );
        assert_eq!(
            resolve_top_level("app.ini", exe).unwrap(),
            Some(SourceId::local("/usr/local/bin/app.ini"))
        );
        assert_eq!(
            resolve_top_level("/etc/app.ini", exe).unwrap(),
            Some(SourceId::local("/etc/app.ini"))
        );
    }
}

use std::{env, iter::Peekable, path::PathBuf, str::Chars};

use crate::error::{PathError, PathResult};

/// Resolves a user-supplied path string into an absolute [`PathBuf`].
///
/// Expands `$VAR` and `${VAR}` from the environment and a leading `~` to the
/// home directory. Relative results are joined onto the current directory.
///
/// # Errors
///
/// * [`PathError::Empty`] if the path is empty
/// * [`PathError::CurrentDir`] if the current directory cannot be determined
/// * [`PathError::MissingEnvVar`] if a referenced variable is undefined
/// * [`PathError::UnclosedVariable`] for a `${` without its closing brace
///
/// # Example
///
/// ```
/// use pkgidx_utils::path::resolve_path;
///
/// let resolved = resolve_path("/srv/pkgidx/output").unwrap();
/// assert!(resolved.is_absolute());
/// ```
pub fn resolve_path(path: &str) -> PathResult<PathBuf> {
    let path = path.trim();
    if path.is_empty() {
        return Err(PathError::Empty);
    }

    let path_buf = PathBuf::from(expand_variables(path)?);
    if path_buf.is_absolute() {
        Ok(path_buf)
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(path_buf))
            .map_err(|err| PathError::CurrentDir { source: err })
    }
}

/// Returns `$HOME`, or `/` when it is unset.
pub fn home_dir() -> PathBuf {
    env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/"))
}

/// Returns `$XDG_CONFIG_HOME`, defaulting to `$HOME/.config`.
pub fn xdg_config_home() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config")
}

/// Returns `$XDG_DATA_HOME`, defaulting to `$HOME/.local/share`.
pub fn xdg_data_home() -> PathBuf {
    xdg_dir("XDG_DATA_HOME", ".local/share")
}

fn xdg_dir(var: &str, fallback: &str) -> PathBuf {
    env::var_os(var)
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(fallback))
}

fn expand_variables(path: &str) -> PathResult<String> {
    let mut result = String::with_capacity(path.len());
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '$' if chars.peek() == Some(&'{') => {
                chars.next();
                let name = consume_braced(&mut chars)?;
                push_env_var(&name, &mut result, path)?;
            }
            '$' => {
                let name = consume_var_name(&mut chars);
                if name.is_empty() {
                    result.push('$');
                } else {
                    push_env_var(&name, &mut result, path)?;
                }
            }
            '~' if result.is_empty() => result.push_str(&home_dir().to_string_lossy()),
            _ => result.push(c),
        }
    }

    Ok(result)
}

fn consume_braced(chars: &mut Peekable<Chars>) -> PathResult<String> {
    let mut name = String::new();
    for c in chars.by_ref() {
        if c == '}' {
            return Ok(name);
        }
        name.push(c);
    }

    Err(PathError::UnclosedVariable {
        input: format!("${{{name}"),
    })
}

fn consume_var_name(chars: &mut Peekable<Chars>) -> String {
    let mut name = String::new();
    while let Some(c) = chars.next_if(|c| c.is_alphanumeric() || *c == '_') {
        name.push(c);
    }
    name
}

fn push_env_var(name: &str, result: &mut String, original: &str) -> PathResult<()> {
    let value = match name {
        "HOME" => home_dir().to_string_lossy().into_owned(),
        "XDG_CONFIG_HOME" => xdg_config_home().to_string_lossy().into_owned(),
        "XDG_DATA_HOME" => xdg_data_home().to_string_lossy().into_owned(),
        _ => {
            env::var(name).map_err(|_| PathError::MissingEnvVar {
                var: name.into(),
                input: original.into(),
            })?
        }
    };
    result.push_str(&value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn test_resolve_absolute_path() {
        assert_eq!(
            resolve_path("/srv/pkgidx").unwrap(),
            PathBuf::from("/srv/pkgidx")
        );
    }

    #[test]
    fn test_resolve_relative_path() {
        let cwd = env::current_dir().unwrap();
        assert_eq!(resolve_path("output").unwrap(), cwd.join("output"));
    }

    #[test]
    fn test_resolve_empty_path() {
        assert!(matches!(resolve_path("   "), Err(PathError::Empty)));
    }

    #[test]
    #[serial]
    fn test_resolve_env_vars() {
        env::set_var("PKGIDX_TEST_ROOT", "/data/pkgidx");
        assert_eq!(
            resolve_path("$PKGIDX_TEST_ROOT/main").unwrap(),
            PathBuf::from("/data/pkgidx/main")
        );
        assert_eq!(
            resolve_path("${PKGIDX_TEST_ROOT}/main").unwrap(),
            PathBuf::from("/data/pkgidx/main")
        );
        env::remove_var("PKGIDX_TEST_ROOT");
    }

    #[test]
    #[serial]
    fn test_resolve_missing_env_var() {
        env::remove_var("PKGIDX_TEST_ABSENT");
        let err = resolve_path("$PKGIDX_TEST_ABSENT/x").unwrap_err();
        assert!(matches!(err, PathError::MissingEnvVar { ref var, .. } if var == "PKGIDX_TEST_ABSENT"));
    }

    #[test]
    fn test_resolve_unclosed_variable() {
        assert!(matches!(
            resolve_path("${HOME/x"),
            Err(PathError::UnclosedVariable { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_tilde_and_xdg_defaults() {
        let old_home = env::var_os("HOME");
        let old_config = env::var_os("XDG_CONFIG_HOME");
        env::set_var("HOME", "/home/tester");
        env::remove_var("XDG_CONFIG_HOME");

        assert_eq!(
            resolve_path("~/pkgidx").unwrap(),
            PathBuf::from("/home/tester/pkgidx")
        );
        assert_eq!(xdg_config_home(), PathBuf::from("/home/tester/.config"));

        env::set_var("XDG_CONFIG_HOME", "/etc/xdg");
        assert_eq!(xdg_config_home(), PathBuf::from("/etc/xdg"));

        match old_home {
            Some(v) => env::set_var("HOME", v),
            None => env::remove_var("HOME"),
        }
        match old_config {
            Some(v) => env::set_var("XDG_CONFIG_HOME", v),
            None => env::remove_var("XDG_CONFIG_HOME"),
        }
    }

    #[test]
    fn test_lone_dollar_is_literal() {
        assert_eq!(
            resolve_path("/tmp/$/x").unwrap(),
            PathBuf::from("/tmp/$/x")
        );
    }
}

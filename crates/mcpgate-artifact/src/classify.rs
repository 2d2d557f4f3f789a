// mcpgate-artifact/src/classify.rs
// ============================================================================
// Module: Launch Command Classification
// Description: Classifies a tokenized server launch command as npm, oci, or
//              local (non-pinnable).
// Purpose: The first step of artifact resolution (spec.md §4.5).
// Dependencies: none
// ============================================================================

/// The resolver's classification of a server launch command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchClassification {
    /// `npx`/`npm exec`-style launch, carrying the raw package spec token.
    Npm(String),
    /// `docker run`-style launch, carrying the raw image reference token.
    Oci(String),
    /// Anything else; not resolvable to a registry artifact.
    Local,
}

/// Classifies a tokenized launch command per spec.md §4.5.
///
/// Recognizes `npx <spec>` and `npm exec <spec>` / `npm x <spec>` for npm,
/// and `docker run ... <image>` for OCI. Everything else, including an
/// empty argv, classifies as [`LaunchClassification::Local`].
#[must_use]
pub fn classify(argv: &[String]) -> LaunchClassification {
    let Some(program) = argv.first() else {
        return LaunchClassification::Local;
    };

    match program.as_str() {
        "npx" => first_non_flag(&argv[1..])
            .map(LaunchClassification::Npm)
            .unwrap_or(LaunchClassification::Local),
        "npm" => {
            let rest = &argv[1..];
            if rest.first().is_some_and(|a| a == "exec" || a == "x") {
                first_non_flag(&rest[1..])
                    .map(LaunchClassification::Npm)
                    .unwrap_or(LaunchClassification::Local)
            } else {
                LaunchClassification::Local
            }
        }
        "docker" | "podman" => {
            let rest = &argv[1..];
            if rest.first().is_some_and(|a| a == "run") {
                first_non_flag(&rest[1..])
                    .map(LaunchClassification::Oci)
                    .unwrap_or(LaunchClassification::Local)
            } else {
                LaunchClassification::Local
            }
        }
        _ => LaunchClassification::Local,
    }
}

/// Returns the first token that does not look like a flag (does not start
/// with `-`). Docker flags that take a value (`-v`, `-e`, `--name`, ...) are
/// not modeled here; this is a best-effort heuristic over the common case
/// of a bare image reference following `run`.
fn first_non_flag(tokens: &[String]) -> Option<String> {
    tokens.iter().find(|t| !t.starts_with('-')).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn npx_classifies_as_npm() {
        assert_eq!(
            classify(&argv("npx -y @scope/server@1.2.3")),
            LaunchClassification::Npm("@scope/server@1.2.3".to_string())
        );
    }

    #[test]
    fn npm_exec_classifies_as_npm() {
        assert_eq!(
            classify(&argv("npm exec some-server")),
            LaunchClassification::Npm("some-server".to_string())
        );
    }

    #[test]
    fn docker_run_classifies_as_oci() {
        assert_eq!(
            classify(&argv("docker run --rm ghcr.io/example/server:latest")),
            LaunchClassification::Oci("ghcr.io/example/server:latest".to_string())
        );
    }

    #[test]
    fn anything_else_is_local() {
        assert_eq!(classify(&argv("python server.py")), LaunchClassification::Local);
        assert_eq!(classify(&[]), LaunchClassification::Local);
    }
}

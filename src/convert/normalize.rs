//! Command canonicalization for pattern equality.

/// Canonicalize a shell command for equality comparison.
///
/// Trims surrounding whitespace and collapses every run of whitespace,
/// line breaks included, to a single space. Two commands are the same
/// pattern iff their normalized forms are equal; there is no semantic
/// equivalence beyond that (`npm ci` and `npm install` stay distinct).
#[must_use]
pub fn normalize_command(command: &str) -> String {
    command.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace_runs() {
        assert_eq!(normalize_command("npm   install"), "npm install");
        assert_eq!(normalize_command("  npm install  "), "npm install");
        assert_eq!(normalize_command("npm\tinstall"), "npm install");
    }

    #[test]
    fn test_line_breaks_become_spaces() {
        assert_eq!(
            normalize_command("npm install\nnpm test"),
            "npm install npm test"
        );
        assert_eq!(
            normalize_command("npm \\\n  install"),
            normalize_command("npm \\ install")
        );
    }

    #[test]
    fn test_idempotent() {
        let once = normalize_command(" make   -j4\nall ");
        assert_eq!(normalize_command(&once), once);
    }

    #[test]
    fn test_distinct_commands_stay_distinct() {
        assert_ne!(normalize_command("npm ci"), normalize_command("npm install"));
    }
}

//! Line-oriented command scripts
//!
//! One command per line; blank lines and `#` comments are skipped. A `#`
//! starts a comment only at the start of a line or after whitespace, so
//! names may contain it.
//!
//! ```text
//! collapse 3
//! expand 3
//! reset-all 1        # -1 expands everything
//! toggle Engine:Self
//! all | scenario | test | error
//! ```

use logfilter_core::FilterCommand;

/// Script parse failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ScriptError {
    #[error("line {line}: unknown command '{word}'")]
    UnknownCommand { line: usize, word: String },

    #[error("line {line}: '{command}' expects {expected}")]
    BadArgument {
        line: usize,
        command: &'static str,
        expected: &'static str,
    },
}

/// Parse one script line; `Ok(None)` for blank or comment lines
pub(crate) fn parse_line(line_no: usize, line: &str) -> Result<Option<FilterCommand>, ScriptError> {
    let line = strip_comment(line).trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let bad = |command, expected| ScriptError::BadArgument {
        line: line_no,
        command,
        expected,
    };

    let command = match word {
        "collapse" => FilterCommand::Collapse {
            entry: rest.parse().map_err(|_| bad("collapse", "an entry index"))?,
        },
        "expand" => FilterCommand::Expand {
            entry: rest.parse().map_err(|_| bad("expand", "an entry index"))?,
        },
        "reset-all" => {
            let depth: i64 = rest.parse().map_err(|_| bad("reset-all", "a depth or -1"))?;
            FilterCommand::ResetAll {
                depth: depth_from_signed(depth).map_err(|()| bad("reset-all", "a depth or -1"))?,
            }
        }
        "toggle" => {
            let (entity, user) = rest
                .split_once(':')
                .ok_or_else(|| bad("toggle", "entity:user"))?;
            FilterCommand::toggle(entity, user)
        }
        "all" => FilterCommand::ToggleAll,
        "scenario" => FilterCommand::ToggleScenario,
        "test" => FilterCommand::ToggleTest,
        "error" => FilterCommand::ToggleErrorOverride,
        other => {
            return Err(ScriptError::UnknownCommand {
                line: line_no,
                word: other.to_string(),
            })
        }
    };
    Ok(Some(command))
}

fn strip_comment(line: &str) -> &str {
    let mut prev_is_space = true;
    for (at, c) in line.char_indices() {
        if c == '#' && prev_is_space {
            return &line[..at];
        }
        prev_is_space = c.is_whitespace();
    }
    line
}

/// Parse a whole script
pub(crate) fn parse_script(text: &str) -> Result<Vec<FilterCommand>, ScriptError> {
    let mut commands = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if let Some(command) = parse_line(i + 1, line)? {
            commands.push(command);
        }
    }
    Ok(commands)
}

/// `-1` means "expand everything"; other negatives are rejected
pub(crate) fn depth_from_signed(depth: i64) -> Result<Option<u32>, ()> {
    match depth {
        -1 => Ok(None),
        d => u32::try_from(d).map(Some).map_err(|_| ()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_every_command() {
        let script = "\
            # fold the first call\n\
            collapse 3\n\
            expand 3\n\
            reset-all -1\n\
            reset-all 2\n\
            toggle sockapi_test:TAPI Jumps\n\
            \n\
            all\n\
            scenario\n\
            test\n\
            error   # keep errors\n";

        let commands = parse_script(script).unwrap();
        assert_eq!(
            commands,
            vec![
                FilterCommand::Collapse { entry: 3 },
                FilterCommand::Expand { entry: 3 },
                FilterCommand::ResetAll { depth: None },
                FilterCommand::ResetAll { depth: Some(2) },
                FilterCommand::toggle("sockapi_test", "TAPI Jumps"),
                FilterCommand::ToggleAll,
                FilterCommand::ToggleScenario,
                FilterCommand::ToggleTest,
                FilterCommand::ToggleErrorOverride,
            ]
        );
    }

    #[test]
    fn rejects_unknown_command() {
        let err = parse_script("all\nfold 2\n").unwrap_err();
        assert_eq!(
            err,
            ScriptError::UnknownCommand {
                line: 2,
                word: "fold".to_string()
            }
        );
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(matches!(
            parse_line(1, "collapse x"),
            Err(ScriptError::BadArgument { command: "collapse", .. })
        ));
        assert!(matches!(
            parse_line(1, "reset-all -2"),
            Err(ScriptError::BadArgument { command: "reset-all", .. })
        ));
        assert!(matches!(
            parse_line(1, "toggle Engine"),
            Err(ScriptError::BadArgument { command: "toggle", .. })
        ));
    }

    #[test]
    fn hash_inside_names_is_kept() {
        assert_eq!(
            parse_line(1, "toggle A:#user").unwrap(),
            Some(FilterCommand::toggle("A", "#user"))
        );
        assert_eq!(
            parse_line(1, "toggle ent#1:X # trailing").unwrap(),
            Some(FilterCommand::toggle("ent#1", "X"))
        );
        assert_eq!(parse_line(1, "   # indented comment").unwrap(), None);
    }

    #[test]
    fn depth_conversion() {
        assert_eq!(depth_from_signed(-1), Ok(None));
        assert_eq!(depth_from_signed(0), Ok(Some(0)));
        assert_eq!(depth_from_signed(-5), Err(()));
    }
}

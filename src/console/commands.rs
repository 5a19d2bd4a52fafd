use crate::session::state::{Dialect, FieldEdit, Language, SqlMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Edit(FieldEdit),
    /// `:schema` without text; following lines are captured until `.`.
    BeginSchema,
    Generate,
    Stop,
    Clear,
    Copy,
    Show,
    Help,
    Quit,
    Invalid(String),
}

/// Line that terminates a multi-line schema capture.
pub const SCHEMA_TERMINATOR: &str = ".";

pub fn parse(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let Some(rest) = line.strip_prefix(':') else {
        return Some(Command::Invalid(line.to_string()));
    };

    let (name, argument) = match rest.split_once(char::is_whitespace) {
        Some((name, argument)) => (name, argument.trim()),
        None => (rest, ""),
    };

    let command = match (name.to_ascii_lowercase().as_str(), argument) {
        ("lang" | "language", value) => value
            .parse::<Language>()
            .map(|v| Command::Edit(FieldEdit::Language(v)))
            .unwrap_or_else(|e| Command::Invalid(e.to_string())),
        ("db" | "database", value) => value
            .parse::<Dialect>()
            .map(|v| Command::Edit(FieldEdit::Database(v)))
            .unwrap_or_else(|e| Command::Invalid(e.to_string())),
        ("mode", value) => value
            .parse::<SqlMode>()
            .map(|v| Command::Edit(FieldEdit::SqlMode(v)))
            .unwrap_or_else(|e| Command::Invalid(e.to_string())),
        ("schema", "") => Command::BeginSchema,
        ("schema", value) => Command::Edit(FieldEdit::Schema(value.to_string())),
        ("criteria", value) => Command::Edit(FieldEdit::Criteria(value.to_string())),
        ("generate" | "gen", "") => Command::Generate,
        ("stop", "") => Command::Stop,
        ("clear", "") => Command::Clear,
        ("copy", "") => Command::Copy,
        ("show", "") => Command::Show,
        ("help" | "?", "") => Command::Help,
        ("quit" | "exit" | "q", "") => Command::Quit,
        _ => Command::Invalid(line.to_string()),
    };

    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_field_edits() {
        assert_eq!(
            parse(":db sqlserver"),
            Some(Command::Edit(FieldEdit::Database(Dialect::Sqlserver)))
        );
        assert_eq!(
            parse(":criteria  users who signed up today "),
            Some(Command::Edit(FieldEdit::Criteria("users who signed up today".into())))
        );
        assert_eq!(
            parse(":mode WRITE"),
            Some(Command::Edit(FieldEdit::SqlMode(SqlMode::Write)))
        );
        assert_eq!(parse(":schema"), Some(Command::BeginSchema));
    }

    #[test]
    fn empty_lines_are_skipped_and_junk_is_invalid() {
        assert_eq!(parse("   "), None);
        assert!(matches!(parse("hello"), Some(Command::Invalid(_))));
        assert!(matches!(parse(":db oracle"), Some(Command::Invalid(_))));
        assert!(matches!(parse(":generate now"), Some(Command::Invalid(_))));
    }

    #[test]
    fn parses_lifecycle_commands() {
        assert_eq!(parse(":gen"), Some(Command::Generate));
        assert_eq!(parse(":stop"), Some(Command::Stop));
        assert_eq!(parse(":q"), Some(Command::Quit));
    }
}

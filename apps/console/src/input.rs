//! Parsing of lines typed at the console prompt.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput<'a> {
    Command(&'a str),
    RepeatLast,
    Clear,
    History,
    Quit,
    Empty,
}

impl<'a> ConsoleInput<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        match line.trim() {
            "" => Self::Empty,
            "!!" => Self::RepeatLast,
            ":clear" => Self::Clear,
            ":history" => Self::History,
            ":quit" | ":q" => Self::Quit,
            _ => Self::Command(line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_console_directives() {
        assert_eq!(ConsoleInput::parse("!!"), ConsoleInput::RepeatLast);
        assert_eq!(ConsoleInput::parse(" :clear "), ConsoleInput::Clear);
        assert_eq!(ConsoleInput::parse(":history"), ConsoleInput::History);
        assert_eq!(ConsoleInput::parse(":q"), ConsoleInput::Quit);
        assert_eq!(ConsoleInput::parse("   "), ConsoleInput::Empty);
    }

    #[test]
    fn commands_keep_inner_whitespace() {
        assert_eq!(
            ConsoleInput::parse("  ls   -l\r\n"),
            ConsoleInput::Command("  ls   -l")
        );
    }
}

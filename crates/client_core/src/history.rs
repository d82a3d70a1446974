/// Commands in submission order, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandHistory {
    entries: Vec<String>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&mut self, command: impl Into<String>) {
        self.entries.push(command.into());
    }

    pub fn last_or_none(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_history_has_no_last_entry() {
        let history = CommandHistory::new();
        assert_eq!(history.last_or_none(), None);
        assert!(history.is_empty());
    }

    #[test]
    fn last_entry_tracks_most_recent_submit() {
        let mut history = CommandHistory::new();
        for command in ["ls", "cd /tmp", "ls"] {
            history.submit(command);
            assert_eq!(history.last_or_none(), Some(command));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.iter().collect::<Vec<_>>(), vec!["ls", "cd /tmp", "ls"]);
    }
}

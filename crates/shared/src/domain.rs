use serde::{Deserialize, Serialize};

const TAG_INPUT: &str = "input";
const TAG_ERROR: &str = "error";
const TAG_WARN: &str = "warn";
const TAG_PROGRESS_DISPLAY: &str = "progress-display";

/// Classification attached to every line the server produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResultTag {
    Input,
    Error,
    Warn,
    /// Progress updates are tracked by the server but never shown as a line.
    ProgressDisplay,
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Input,
    Error,
    Warn,
    Plain,
}

impl ResultTag {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Input => TAG_INPUT,
            Self::Error => TAG_ERROR,
            Self::Warn => TAG_WARN,
            Self::ProgressDisplay => TAG_PROGRESS_DISPLAY,
            Self::Other(tag) => tag,
        }
    }

    pub fn is_rendered(&self) -> bool {
        !matches!(self, Self::ProgressDisplay)
    }

    pub fn line_style(&self) -> LineStyle {
        match self {
            Self::Input => LineStyle::Input,
            Self::Error => LineStyle::Error,
            Self::Warn => LineStyle::Warn,
            Self::ProgressDisplay | Self::Other(_) => LineStyle::Plain,
        }
    }
}

impl From<String> for ResultTag {
    fn from(value: String) -> Self {
        match value.as_str() {
            TAG_INPUT => Self::Input,
            TAG_ERROR => Self::Error,
            TAG_WARN => Self::Warn,
            TAG_PROGRESS_DISPLAY => Self::ProgressDisplay,
            _ => Self::Other(value),
        }
    }
}

impl From<ResultTag> for String {
    fn from(value: ResultTag) -> Self {
        match value {
            ResultTag::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

/// One entry of the `/v1/chamber` poll response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub tag: ResultTag,
    pub value: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

impl ResultEntry {
    pub fn new(tag: ResultTag, value: impl Into<String>) -> Self {
        Self {
            tag,
            value: value.into(),
            args: serde_json::Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tags_survive_a_wire_round_trip() {
        let entry: ResultEntry =
            serde_json::from_str(r#"{"tag":"message-em","value":"hi"}"#).expect("entry");
        assert_eq!(entry.tag, ResultTag::Other("message-em".into()));
        assert_eq!(entry.args, serde_json::Value::Null);

        let raw = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(raw["tag"], "message-em");
    }

    #[test]
    fn progress_display_is_the_only_hidden_tag() {
        let entries: Vec<ResultEntry> = serde_json::from_str(
            r#"[
                {"tag":"input","value":"ls"},
                {"tag":"progress-display","value":"50%","args":{"total":2}},
                {"tag":"warn","value":"slow"},
                {"tag":"error","value":"boom"}
            ]"#,
        )
        .expect("entries");

        let rendered: Vec<_> = entries
            .iter()
            .filter(|entry| entry.tag.is_rendered())
            .map(|entry| entry.tag.line_style())
            .collect();
        assert_eq!(
            rendered,
            vec![LineStyle::Input, LineStyle::Warn, LineStyle::Error]
        );
        assert_eq!(entries[1].args["total"], 2);
    }
}

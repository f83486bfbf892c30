use serde::{Deserialize, Serialize};
use serde_json::Value;
use wisp_types::{PreviewPayload, WispImage};

/// Serializable description of what an action does.
///
/// `kind` and `context` are defined by the plugin that created the action;
/// the host only stores them and hands them back to [`super::Plugin::execute`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCommand {
    pub kind: String,
    #[serde(default)]
    pub context: Value,
}

impl ActionCommand {
    #[must_use]
    pub fn new(kind: impl Into<String>, context: Value) -> Self {
        Self {
            kind: kind.into(),
            context,
        }
    }

    /// String field of the context object.
    #[must_use]
    pub fn context_str(&self, key: &str) -> Option<&str> {
        self.context.get(key).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultAction {
    pub name: String,
    pub is_default: bool,
    pub command: ActionCommand,
}

impl ResultAction {
    #[must_use]
    pub fn new(name: impl Into<String>, command: ActionCommand) -> Self {
        Self {
            name: name.into(),
            is_default: false,
            command,
        }
    }

    /// Mark as the action the UI runs on Enter.
    #[must_use]
    pub fn primary(mut self) -> Self {
        self.is_default = true;
        self
    }
}

/// One result as produced by a plugin, before it is published to the UI
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub title: String,
    pub sub_title: String,
    pub icon: WispImage,
    pub score: i64,
    pub preview: PreviewPayload,
    pub actions: Vec<ResultAction>,
}

impl QueryResult {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sub_title: String::new(),
            icon: WispImage::default(),
            score: 0,
            preview: PreviewPayload::default(),
            actions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_sub_title(mut self, sub_title: impl Into<String>) -> Self {
        self.sub_title = sub_title.into();
        self
    }

    #[must_use]
    pub fn with_icon(mut self, icon: WispImage) -> Self {
        self.icon = icon;
        self
    }

    #[must_use]
    pub fn with_score(mut self, score: i64) -> Self {
        self.score = score;
        self
    }

    #[must_use]
    pub fn with_action(mut self, action: ResultAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Ensure exactly one action is default when there are any: the first one
    /// marked default wins, otherwise the first action is promoted.
    pub fn normalize_default_action(&mut self) {
        let mut seen = false;
        for action in &mut self.actions {
            if action.is_default {
                if seen {
                    action.is_default = false;
                }
                seen = true;
            }
        }
        if !seen && let Some(first) = self.actions.first_mut() {
            first.is_default = true;
        }
    }
}

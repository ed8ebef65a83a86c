use serde::{Deserialize, Serialize};

/// A single button. `payload` is what the transport hands back when the
/// button is pressed and must stay within the transport's size limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    /// Button caption.
    pub label: String,
    /// Opaque callback payload.
    pub payload: String,
}

impl Control {
    /// Creates a control from a label and callback payload.
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

/// Buttons arranged in rows, as attached to one chat message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlLayout {
    /// Rows of controls, top to bottom.
    pub rows: Vec<Vec<Control>>,
}

impl ControlLayout {
    /// Creates an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row; empty rows are ignored.
    pub fn push_row(&mut self, row: Vec<Control>) {
        if !row.is_empty() {
            self.rows.push(row);
        }
    }

    /// All controls in reading order.
    pub fn controls(&self) -> impl Iterator<Item = &Control> {
        self.rows.iter().flatten()
    }

    /// Total number of controls.
    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Whether the layout has no controls.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First control with the given label.
    pub fn find_by_label(&self, label: &str) -> Option<&Control> {
        self.controls().find(|c| c.label == label)
    }
}

/// What the bot shows in response to one interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    /// Message text (Telegram legacy Markdown).
    pub text: String,
    /// Buttons attached to the message; `None` removes any existing ones.
    pub controls: Option<ControlLayout>,
    /// Short transient notice (shown as a toast for button presses).
    pub notice: Option<String>,
}

impl Reply {
    /// A full screen: text plus buttons.
    pub fn screen(text: impl Into<String>, controls: ControlLayout) -> Self {
        Self {
            text: text.into(),
            controls: Some(controls),
            notice: None,
        }
    }

    /// Plain text without buttons.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            controls: None,
            notice: None,
        }
    }

    /// Attaches a notice to this reply.
    pub fn with_notice(mut self, notice: impl Into<String>) -> Self {
        self.notice = Some(notice.into());
        self
    }
}

/// Escapes the characters that are special in Telegram's legacy Markdown
/// (`_`, `*`, `` ` ``, `[`) so they render literally.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Wraps `text` in a legacy-Markdown entity `marker` (`*`, `_`, `` ` `` or
/// ```` ``` ````).
///
/// Text inside an entity is taken literally, so no escaping happens there,
/// and it cannot contain the closing marker. Each occurrence of a one-char
/// marker in `text` closes the entity, is emitted escaped, and the entity
/// reopens after it: `q*` in bold becomes `*q*\*`. Empty pieces get no
/// entity at all.
pub fn emphasize(marker: &str, text: &str) -> String {
    let mut chars = marker.chars();
    let (Some(m), None) = (chars.next(), chars.next()) else {
        return format!("{marker}{text}{marker}");
    };
    text.split(m)
        .map(|part| {
            if part.is_empty() {
                String::new()
            } else {
                format!("{marker}{part}{marker}")
            }
        })
        .collect::<Vec<_>>()
        .join(&format!("\\{m}"))
}

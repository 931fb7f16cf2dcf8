//! Single-line text input used by the chat box and the login form.

/// An editable line of text. Editing happens at the end of the line only.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InputLine {
    text: String,
}

impl InputLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, c: char) {
        if !c.is_control() {
            self.text.push(c);
        }
    }

    pub fn pop(&mut self) {
        self.text.pop();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Width in terminal cells, used to place the cursor. Counts chars, which
    /// is exact for the ASCII digits this input mostly carries.
    pub fn width(&self) -> u16 {
        u16::try_from(self.text.chars().count()).unwrap_or(u16::MAX)
    }

    /// The text with every character replaced by `*`.
    pub fn masked(&self) -> String {
        "*".repeat(self.text.chars().count())
    }
}

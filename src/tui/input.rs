//! Single-line text input for image paths and limit edits.

/// What the input line is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    ImagePath,
    /// Editing the max of the metric at this index.
    EditMax(usize),
}

impl InputMode {
    pub fn prompt(self) -> &'static str {
        match self {
            Self::Normal => "",
            Self::ImagePath => "Image path: ",
            Self::EditMax(_) => "Daily limit: ",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LineInput {
    text: String,
}

impl LineInput {
    /// Replace the buffer.
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn push(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Take the buffer, leaving it empty.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.text)
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}

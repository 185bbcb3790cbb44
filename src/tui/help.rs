//! Help overlay — key reference grouped by panel.

/// One rendered row of the help overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpLine {
    pub text: String,
    pub is_header: bool,
}

impl HelpLine {
    fn header(title: &str) -> Self {
        Self {
            text: title.to_string(),
            is_header: true,
        }
    }

    fn key(keys: &str, description: &str) -> Self {
        Self {
            text: format!("  {keys:<13}{description}"),
            is_header: false,
        }
    }

    fn blank() -> Self {
        Self {
            text: String::new(),
            is_header: false,
        }
    }
}

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "MEAL PHOTO",
        &[
            ("u", "Upload an image (type its path, Enter)"),
            ("x", "Remove the image and its readings"),
        ],
    ),
    (
        "DAILY PROGRESS",
        &[
            ("a", "Add current readings to the daily total"),
            ("r", "Reset progress (totals back to 0)"),
            ("m", "Reset daily limits (when customized)"),
            ("Left/Right", "Select a metric"),
            ("e / Enter", "Edit the selected limit (digits only)"),
        ],
    ),
    (
        "GOALS",
        &[
            ("1", "Fit"),
            ("2", "Body-Builder"),
            ("3", "Gain Weight"),
            ("4", "Lose Weight"),
        ],
    ),
    (
        "GENERAL",
        &[
            ("?", "Toggle this help screen"),
            ("Up/Down", "Scroll help, or select a metric"),
            ("Esc", "Close overlay / cancel input"),
            ("q, Ctrl-C", "Quit"),
        ],
    ),
    (
        "TIPS",
        &[
            ("-", "Totals and limits are saved after every change"),
            ("-", "Readings stay visible after adding them"),
        ],
    ),
];

/// Overlay visibility and scroll position.
#[derive(Debug, Clone)]
pub struct HelpScreen {
    pub visible: bool,
    pub scroll_offset: usize,
    lines: Vec<HelpLine>,
}

impl HelpScreen {
    pub fn new() -> Self {
        let mut lines = Vec::new();
        for (i, (title, keys)) in SECTIONS.iter().enumerate() {
            if i > 0 {
                lines.push(HelpLine::blank());
            }
            lines.push(HelpLine::header(title));
            lines.extend(keys.iter().map(|(k, d)| HelpLine::key(k, d)));
        }
        Self {
            visible: false,
            scroll_offset: 0,
            lines,
        }
    }

    /// Opening always starts at the top.
    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        self.scroll_offset = 0;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    /// Scroll one line, stopping once the last `page` lines are in view.
    pub fn scroll_down(&mut self, page: usize) {
        let last = self.lines.len().saturating_sub(page);
        self.scroll_offset = (self.scroll_offset + 1).min(last);
    }

    pub fn lines(&self) -> &[HelpLine] {
        &self.lines
    }
}

impl Default for HelpScreen {
    fn default() -> Self {
        Self::new()
    }
}

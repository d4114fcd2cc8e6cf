use ratatui::style::Color;

/// Terminal colors for the page preview
#[derive(Debug, Clone)]
pub struct Theme {
    // Background colors
    pub bg0: Color,
    pub bg1: Color,
    pub bg2: Color,

    // Foreground colors
    pub fg0: Color,
    pub fg1: Color,
    pub grey1: Color,
    pub grey2: Color,

    /// Active nav link and the current section's gutter
    pub accent: Color,
    /// Navbar background once the page is scrolled
    pub scrolled: Color,
    pub warning: Color,

    /// Section backgrounds, cycled in document order
    pub sections: Vec<Color>,
}

impl Default for Theme {
    fn default() -> Self {
        // Gruvbox Material dark
        Self {
            bg0: Color::Rgb(0x28, 0x28, 0x28),
            bg1: Color::Rgb(0x32, 0x30, 0x2f),
            bg2: Color::Rgb(0x45, 0x40, 0x3d),
            fg0: Color::Rgb(0xd4, 0xbe, 0x98),
            fg1: Color::Rgb(0xdd, 0xc7, 0xa1),
            grey1: Color::Rgb(0x92, 0x83, 0x74),
            grey2: Color::Rgb(0xa8, 0x99, 0x84),
            accent: Color::Rgb(0xd8, 0xa6, 0x57),
            scrolled: Color::Rgb(0x50, 0x49, 0x45),
            warning: Color::Rgb(0xe7, 0x8a, 0x4e),
            sections: vec![
                Color::Rgb(0x28, 0x28, 0x28),
                Color::Rgb(0x2a, 0x2f, 0x2c),
                Color::Rgb(0x2f, 0x2b, 0x2e),
                Color::Rgb(0x2a, 0x2d, 0x33),
            ],
        }
    }
}

impl Theme {
    pub fn section_bg(&self, index: usize) -> Color {
        if self.sections.is_empty() {
            return self.bg0;
        }
        self.sections[index % self.sections.len()]
    }
}

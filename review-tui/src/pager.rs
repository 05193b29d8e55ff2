//! Page cursor of the document viewer.

/// Current page plus the typed page-number buffer.
///
/// Next/previous wrap at both ends. Typed numbers are 1-based; zero and
/// negative numbers count back from the end, numbers past the end go to the
/// first page and unparsable input keeps the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerState {
    page: usize,
    page_count: usize,
    input: String,
}

impl PagerState {
    pub fn new(page_count: usize) -> Self {
        Self {
            page: 0,
            page_count: page_count.max(1),
            input: String::new(),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn next(&mut self) {
        self.page = (self.page + 1) % self.page_count;
    }

    pub fn previous(&mut self) {
        self.page = (self.page + self.page_count - 1) % self.page_count;
    }

    /// Accepts digits, and a minus sign as the first character.
    pub fn push_char(&mut self, c: char) -> bool {
        let accepted = c.is_ascii_digit() || (c == '-' && self.input.is_empty());
        if accepted {
            self.input.push(c);
        }
        accepted
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Jump to the typed page number and clear the buffer.
    pub fn submit(&mut self) {
        let input = std::mem::take(&mut self.input);
        let Ok(number) = input.trim().parse::<i64>() else {
            return;
        };
        let count = self.page_count as i64;
        let index = number - 1;
        self.page = if index >= count {
            0
        } else {
            index.rem_euclid(count) as usize
        };
    }

    /// Text shown in the page-number field.
    pub fn label(&self) -> String {
        if self.input.is_empty() {
            format!("{}/{}", self.page + 1, self.page_count)
        } else {
            format!("{}_/{}", self.input, self.page_count)
        }
    }
}

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};

const RULE_WIDTH: usize = 20;

/// Renders the model's markdown reply into styled terminal text.
pub fn render_markdown(md: &str) -> Text<'static> {
    let mut renderer = Renderer::default();
    for event in Parser::new_ext(md, Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES) {
        renderer.event(event);
    }
    renderer.finish()
}

#[derive(Default)]
struct Renderer {
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    styles: Vec<Style>,
    /// One entry per open list: `None` for bullets, otherwise the next number.
    lists: Vec<Option<u64>>,
    marker: Option<String>,
    in_code: bool,
}

impl Renderer {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => self.text(&text),
            Event::Code(code) => {
                self.push(code.to_string(), Style::default().add_modifier(Modifier::REVERSED))
            }
            Event::SoftBreak if self.in_code => self.break_line(),
            Event::SoftBreak => self.push(" ".to_string(), self.style()),
            Event::HardBreak => self.end_line(),
            Event::Rule => {
                self.end_line();
                self.lines.push(Line::styled(
                    "─".repeat(RULE_WIDTH),
                    Style::default().add_modifier(Modifier::DIM),
                ));
                self.blank();
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.end_line();
                self.styles.push(heading_style(level));
            }
            Tag::Strong => self.nest(Modifier::BOLD),
            Tag::Emphasis => self.nest(Modifier::ITALIC),
            Tag::Strikethrough => self.nest(Modifier::CROSSED_OUT),
            Tag::BlockQuote(_) => self.nest(Modifier::DIM),
            Tag::CodeBlock(_) => {
                self.end_line();
                self.in_code = true;
                self.styles.push(Style::default().add_modifier(Modifier::DIM));
            }
            Tag::List(start) => self.lists.push(start.map(|n| n.max(1))),
            Tag::Item => {
                self.end_line();
                self.marker = Some(self.next_marker());
            }
            Tag::TableCell => self.push("│ ".to_string(), Style::default().add_modifier(Modifier::DIM)),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.end_line();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::Heading(_) => {
                self.end_line();
                self.blank();
                self.styles.pop();
            }
            TagEnd::CodeBlock => {
                self.end_line();
                self.blank();
                self.in_code = false;
                self.styles.pop();
            }
            TagEnd::Strong | TagEnd::Emphasis | TagEnd::Strikethrough | TagEnd::BlockQuote(_) => {
                self.styles.pop();
            }
            TagEnd::List(_) => {
                self.end_line();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::Item => {
                self.end_line();
                self.marker = None;
            }
            TagEnd::TableCell => self.push(" ".to_string(), Style::default()),
            TagEnd::TableHead | TagEnd::TableRow => self.end_line(),
            TagEnd::Table => {
                self.end_line();
                self.blank();
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        let style = self.style();
        if !self.in_code {
            self.push(text.to_string(), style);
            return;
        }
        for (idx, segment) in text.split('\n').enumerate() {
            if idx > 0 {
                self.break_line();
            }
            if !segment.is_empty() {
                self.push(segment.to_string(), style);
            }
        }
    }

    fn push(&mut self, content: String, style: Style) {
        if self.spans.is_empty()
            && let Some(marker) = self.marker.take()
        {
            self.spans.push(Span::raw(marker));
        }
        self.spans.push(Span::styled(content, style));
    }

    /// Ends the current line if it has content.
    fn end_line(&mut self) {
        if !self.spans.is_empty() {
            self.break_line();
        }
    }

    /// Ends the current line even when empty; code blocks keep their blank lines.
    fn break_line(&mut self) {
        self.lines.push(Line::from(std::mem::take(&mut self.spans)));
    }

    fn blank(&mut self) {
        if self.lines.last().is_some_and(|line| !line.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn nest(&mut self, modifier: Modifier) {
        self.styles.push(self.style().add_modifier(modifier));
    }

    fn next_marker(&mut self) -> String {
        let indent = "  ".repeat(self.lists.len().saturating_sub(1));
        match self.lists.last_mut() {
            Some(Some(n)) => {
                let marker = format!("{indent}{n}. ");
                *n += 1;
                marker
            }
            _ => format!("{indent}• "),
        }
    }

    fn finish(mut self) -> Text<'static> {
        self.end_line();
        while self.lines.last().is_some_and(|line| line.spans.is_empty()) {
            self.lines.pop();
        }
        Text::from(self.lines)
    }
}

fn heading_style(level: HeadingLevel) -> Style {
    let style = Style::default().add_modifier(Modifier::BOLD);
    match level {
        HeadingLevel::H1 | HeadingLevel::H2 | HeadingLevel::H3 => {
            style.add_modifier(Modifier::UNDERLINED)
        }
        _ => style,
    }
}

#[cfg(test)]
mod tests {
    use super::render_markdown;
    use proptest::prelude::*;
    use ratatui::style::Modifier;
    use ratatui::text::Line;

    fn flatten(line: &Line<'_>) -> String {
        line.spans
            .iter()
            .map(|span| span.content.to_string())
            .collect()
    }

    proptest! {
        #[test]
        fn any_reply_renders(content in "\\PC*") {
            render_markdown(&content);
        }
    }

    #[test]
    fn renders_heading_and_paragraph_without_trailing_blank() {
        let text = render_markdown("# Title\n\nBody");

        assert_eq!(text.lines.len(), 3);
        assert_eq!(text.lines[0].spans[0].content, "Title");
        assert!(text.lines[1].spans.is_empty());
        assert_eq!(text.lines[2].spans[0].content, "Body");
    }

    #[test]
    fn bold_and_italic_keep_their_text() {
        let text = render_markdown("**good** is said *guhd*");
        let line = &text.lines[0];
        assert_eq!(flatten(line), "good is said guhd");
        assert!(line.spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert!(line.spans[2].style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn code_blocks_keep_blank_lines() {
        let text = render_markdown("```\nsay it\n\nslowly\n```");
        let rendered: Vec<String> = text.lines.iter().map(flatten).collect();
        assert_eq!(rendered, vec!["say it", "", "slowly"]);
    }

    #[test]
    fn lists_get_markers() {
        let text = render_markdown("- fine\n- nice\n\n1. one\n2. two");
        let rendered: Vec<String> = text.lines.iter().map(flatten).collect();
        assert!(rendered.contains(&"• fine".to_string()));
        assert!(rendered.contains(&"• nice".to_string()));
        assert!(rendered.contains(&"1. one".to_string()));
        assert!(rendered.contains(&"2. two".to_string()));
    }
}

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

const DEFAULT_THEME: &str = "base16-ocean.dark";

pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    pub fn render(&self, content: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        let mut events = Vec::new();
        let mut code_block: Option<Option<String>> = None;
        let mut code_content = String::new();

        for event in Parser::new_ext(content, options) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let language = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split(|character: char| character.is_whitespace() || character == ',')
                            .next()
                            .filter(|language| !language.is_empty())
                            .map(String::from),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some(language);
                    code_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let language = code_block.take().flatten();
                    let highlighted = self.highlight(&code_content, language.as_deref());
                    events.push(Event::Html(CowStr::from(highlighted)));
                }
                Event::Text(text) if code_block.is_some() => code_content.push_str(&text),
                other => events.push(other),
            }
        }

        let mut html_output = String::with_capacity(content.len() * 3 / 2);
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    fn highlight(&self, code: &str, language: Option<&str>) -> String {
        let Some(language) = language else {
            return format!("<pre><code>{}</code></pre>\n", escape_html(code));
        };

        let theme = &self.theme_set.themes[DEFAULT_THEME];
        match self.syntax_set.find_syntax_by_token(language) {
            Some(syntax) => highlighted_html_for_string(code, &self.syntax_set, syntax, theme)
                .unwrap_or_else(|_| format!("<pre><code>{}</code></pre>\n", escape_html(code))),
            None => format!(
                "<pre><code class=\"language-{}\">{}</code></pre>\n",
                escape_html(language),
                escape_html(code)
            ),
        }
    }
}

pub(crate) fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markup() {
        let renderer = MarkdownRenderer::new();
        let output = renderer.render("# Hello\n\nThis is **bold**.");
        assert!(output.contains("<h1>Hello</h1>"));
        assert!(output.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_render_highlights_known_language() {
        let renderer = MarkdownRenderer::new();
        let output = renderer.render("```rust\nfn main() {}\n```");
        assert!(output.contains("<pre style="));
        assert!(output.contains("main"));
    }

    #[test]
    fn test_render_unknown_language_keeps_class() {
        let renderer = MarkdownRenderer::new();
        let output = renderer.render("```nosuchlang\n<tag>\n```");
        assert!(output.contains("class=\"language-nosuchlang\""));
        assert!(output.contains("&lt;tag&gt;"));
    }

    #[test]
    fn test_render_table_header_cells() {
        let renderer = MarkdownRenderer::new();
        let output = renderer.render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(output.contains("<th>a</th>"));
        assert!(output.contains("<td>1</td>"));
    }
}

/// Default article shell. `{lang}`, `{title}` and `{body}` are substituted.
pub const DEFAULT_SHELL: &str = r#"<!doctype html>
<html lang="{lang}">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{title}</title>
</head>
<body>
<article class="prose">
{body}
</article>
</body>
</html>
"#;

/// Textual HTML shell every converted article is wrapped in
#[derive(Debug, Clone)]
pub struct ShellTemplate {
    template: String,
    lang: String,
}

impl Default for ShellTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_SHELL.to_string(),
            lang: "de".to_string(),
        }
    }
}

impl ShellTemplate {
    /// Wrap a body fragment. The title is escaped, the body is inserted as-is.
    pub fn render(&self, title: &str, body: &str) -> String {
        let title = escape_html(title);
        let mut out = String::with_capacity(self.template.len() + title.len() + body.len());
        let mut rest = self.template.as_str();

        // Single pass so placeholder text inside the title or body is never expanded.
        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];
            let (value, len) = if tail.starts_with("{title}") {
                (title.as_str(), "{title}".len())
            } else if tail.starts_with("{body}") {
                (body, "{body}".len())
            } else if tail.starts_with("{lang}") {
                (self.lang.as_str(), "{lang}".len())
            } else {
                ("{", 1)
            };
            out.push_str(value);
            rest = &tail[len..];
        }
        out.push_str(rest);

        out
    }
}

/// Escape text for use in HTML content and quoted attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

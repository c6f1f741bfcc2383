/// Escapes text for use in HTML element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Builds an HTML document where interpolated values are always escaped.
///
/// Markup can only be written from `&'static str`, so user data never reaches
/// the output unescaped.
#[derive(Debug, Default)]
pub struct HtmlWriter {
    buf: String,
}

impl HtmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&mut self, markup: &'static str) -> &mut Self {
        self.buf.push_str(markup);
        self
    }

    pub fn text(&mut self, value: &str) -> &mut Self {
        self.buf.push_str(&escape_html(value));
        self
    }

    /// `<tag>value</tag>` with `value` escaped.
    pub fn element(&mut self, tag: &'static str, value: &str) -> &mut Self {
        self.buf.push('<');
        self.buf.push_str(tag);
        self.buf.push('>');
        self.text(value);
        self.buf.push_str("</");
        self.buf.push_str(tag);
        self.buf.push('>');
        self
    }

    /// An anchor opening in a new tab. Only http(s) targets become links;
    /// anything else is written as plain text.
    pub fn link(&mut self, href: &str, label: &str) -> &mut Self {
        if !is_web_url(href) {
            return self.text(href);
        }
        self.buf.push_str("<a href=\"");
        self.text(href);
        self.buf.push_str("\" target=\"_blank\" rel=\"noopener noreferrer\">");
        self.text(label);
        self.buf.push_str("</a>");
        self
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

fn is_web_url(href: &str) -> bool {
    let lower = href.trim_start().to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://")
}

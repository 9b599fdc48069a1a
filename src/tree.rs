//! Markdown tree builder.
//!
//! Sections and markers are first assembled into a small mutable tree of
//! element and text nodes; the tree then serializes itself to Markdown.
//! The serializer below is the single source of truth for the tag→syntax
//! mapping. Text passes through verbatim; escaping Markdown specials in
//! source text is out of scope.

/// A node in the intermediate Markdown tree.
#[derive(Debug, Clone)]
pub enum Node {
    /// An element with a tag name, attributes, and children.
    Element(Element),
    /// A literal text run.
    Text(String),
}

impl Node {
    /// Create a text node.
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(value.into())
    }

    /// Serialize this node (and its subtree) to Markdown.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        self.write(&mut out);
        out
    }

    fn write(&self, out: &mut String) {
        match self {
            Node::Element(el) => el.write(out),
            Node::Text(value) => out.push_str(value),
        }
    }
}

/// An element node: lowercased tag name, ordered attribute list, ordered
/// children.
#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Create an element with the given tag name. Tag names are normalized
    /// to lowercase.
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_lowercase(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// The (lowercased) tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Append an attribute. Duplicate names are kept; lookup is
    /// last-write-wins.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.push((name.into(), value.into()));
    }

    /// Look up an attribute value by name (last write wins).
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Append a child node.
    pub fn append_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Append a text child.
    pub fn append_text(&mut self, value: impl Into<String>) {
        self.children.push(Node::text(value));
    }

    /// Serialize this element and its children to Markdown.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        self.write(&mut out);
        out
    }

    fn write(&self, out: &mut String) {
        self.write_opening(out);
        for child in &self.children {
            child.write(out);
        }
        self.write_closing(out);
    }

    fn write_opening(&self, out: &mut String) {
        match self.tag.as_str() {
            "b" | "strong" => out.push_str("**"),
            "i" | "em" => out.push('*'),
            "h1" => out.push_str("# "),
            "h2" => out.push_str("## "),
            "h3" => out.push_str("### "),
            "h4" => out.push_str("#### "),
            "a" => out.push('['),
            "img" => out.push_str("!["),
            "li" => match self.attribute("position") {
                Some(position) => {
                    out.push_str(position);
                    out.push_str(". ");
                }
                None => out.push_str("* "),
            },
            "blockquote" => out.push_str("> "),
            // Any other tag is a bare container.
            _ => {}
        }
    }

    fn write_closing(&self, out: &mut String) {
        match self.tag.as_str() {
            "b" | "strong" => out.push_str("**"),
            "i" | "em" => out.push('*'),
            "a" => {
                out.push(']');
                if let Some(href) = self.attribute("href") {
                    out.push('(');
                    out.push_str(href);
                    out.push(')');
                }
            }
            "img" => {
                out.push(']');
                if let Some(src) = self.attribute("src") {
                    out.push('(');
                    out.push_str(src);
                    out.push(')');
                }
            }
            "li" | "p" | "h1" | "h2" | "h3" | "h4" | "blockquote" => out.push('\n'),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element_with_text(tag: &str, text: &str) -> Element {
        let mut el = Element::new(tag);
        el.append_text(text);
        el
    }

    #[test]
    fn test_text_passes_through_verbatim() {
        let node = Node::text("a *b* [c](d)");
        assert_eq!(node.to_markdown(), "a *b* [c](d)");
    }

    #[test]
    fn test_bold_and_italic() {
        assert_eq!(element_with_text("B", "hi").to_markdown(), "**hi**");
        assert_eq!(element_with_text("strong", "hi").to_markdown(), "**hi**");
        assert_eq!(element_with_text("i", "hi").to_markdown(), "*hi*");
        assert_eq!(element_with_text("em", "hi").to_markdown(), "*hi*");
    }

    #[test]
    fn test_headings() {
        assert_eq!(element_with_text("h1", "t").to_markdown(), "# t\n");
        assert_eq!(element_with_text("h2", "t").to_markdown(), "## t\n");
        assert_eq!(element_with_text("h3", "t").to_markdown(), "### t\n");
        assert_eq!(element_with_text("h4", "t").to_markdown(), "#### t\n");
    }

    #[test]
    fn test_paragraph_and_blockquote() {
        assert_eq!(element_with_text("p", "t").to_markdown(), "t\n");
        assert_eq!(element_with_text("blockquote", "t").to_markdown(), "> t\n");
    }

    #[test]
    fn test_link_with_and_without_href() {
        let mut a = element_with_text("a", "here");
        a.set_attribute("href", "http://example.com");
        assert_eq!(a.to_markdown(), "[here](http://example.com)");

        let a = element_with_text("a", "here");
        assert_eq!(a.to_markdown(), "[here]");
    }

    #[test]
    fn test_image_with_and_without_src() {
        let mut img = Element::new("img");
        img.set_attribute("src", "pic.gif");
        assert_eq!(img.to_markdown(), "![](pic.gif)");

        let img = Element::new("img");
        assert_eq!(img.to_markdown(), "![]");
    }

    #[test]
    fn test_list_items() {
        assert_eq!(element_with_text("li", "one").to_markdown(), "* one\n");

        let mut li = element_with_text("li", "one");
        li.set_attribute("position", "3");
        assert_eq!(li.to_markdown(), "3. one\n");
    }

    #[test]
    fn test_attribute_lookup_is_last_write_wins() {
        let mut a = element_with_text("a", "x");
        a.set_attribute("href", "http://first");
        a.set_attribute("href", "http://second");
        assert_eq!(a.attribute("href"), Some("http://second"));
        assert_eq!(a.to_markdown(), "[x](http://second)");
    }

    #[test]
    fn test_unknown_tag_is_bare_container() {
        assert_eq!(element_with_text("div", "t").to_markdown(), "t");
        assert_eq!(element_with_text("h5", "t").to_markdown(), "t");
    }

    #[test]
    fn test_nested_elements() {
        let mut b = Element::new("b");
        b.append_text("hello ");
        let mut i = element_with_text("i", "brave new ");
        i.append_text("");
        b.append_child(Node::Element(i));
        b.append_text("world");
        assert_eq!(b.to_markdown(), "**hello *brave new *world**");
    }
}

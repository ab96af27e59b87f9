//! Tolerant HTML tree for saved post captures.
//!
//! Scraped feed markup is not well-formed XML: void elements are never
//! closed, end tags get dropped, and entities like `&nbsp;` appear in text and
//! attributes. The tree is built from `quick-xml` events with all
//! well-formedness checks off and the following recovery rules:
//!
//! - void elements (`img`, `br`, `source`, ...) never take children
//! - an end tag closes back to the nearest open element of the same name;
//!   an end tag with no open counterpart is ignored
//! - `script`/`style`/`noscript`/`template` bodies are dropped before
//!   tokenizing, so markup inside script strings never reaches the tree
//! - a `&` that does not start a reference and a `<` that does not start a
//!   tag are plain text
//!
//! Nodes live in one arena in document order, so "first match" means
//! "lowest node id".

use super::ParseError;
use super::select::Selector;
use quick_xml::{
    Reader,
    escape::{resolve_predefined_entity, unescape},
    events::{BytesStart, Event},
};
use std::{borrow::Cow, ops::Range};

pub type NodeId = usize;

const ROOT: NodeId = 0;

/// Elements that cannot have content.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose body is raw text to a browser and never post content.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Longest `name` accepted in `&name;`.
const MAX_REFERENCE_LEN: usize = 32;

#[derive(Debug)]
enum NodeKind {
    Root,
    Element {
        name: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Parsed document.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Parse a document or fragment.
    pub fn parse(html: &str) -> Result<Self, ParseError> {
        let html = prepare(html);
        let mut reader = Reader::from_str(&html);
        reader.config_mut().trim_text(false);
        reader.config_mut().enable_all_checks(false);
        reader.config_mut().check_end_names = false;
        reader.config_mut().allow_unmatched_ends = true;
        reader.config_mut().allow_dangling_amp = true;

        let mut doc = Self {
            nodes: vec![Node {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
        };
        let mut stack: Vec<NodeId> = vec![ROOT];

        loop {
            let parent = stack.last().copied().unwrap_or(ROOT);
            match reader.read_event() {
                Ok(Event::Start(elem)) => {
                    let id = doc.push_element(parent, &elem);
                    if !is_void(doc.name_of(id)) {
                        stack.push(id);
                    }
                }
                Ok(Event::Empty(elem)) => {
                    doc.push_element(parent, &elem);
                }
                Ok(Event::End(elem)) => {
                    let name = lower_name(elem.name().as_ref());
                    doc.close(&mut stack, &name);
                }
                Ok(Event::Text(text)) => {
                    doc.push_text(parent, &String::from_utf8_lossy(&text));
                }
                Ok(Event::CData(text)) => {
                    doc.push_text(parent, &String::from_utf8_lossy(&text));
                }
                Ok(Event::GeneralRef(entity)) => {
                    let name = String::from_utf8_lossy(&entity);
                    doc.push_text(parent, &decode_entity(&name));
                }
                Ok(Event::Eof) => break,
                // comments, doctype, processing instructions
                Ok(_) => {}
                Err(err) => {
                    return Err(ParseError::Markup {
                        position: reader.buffer_position() as u64,
                        message: err.to_string(),
                    });
                }
            }
        }

        Ok(doc)
    }

    fn push_element(&mut self, parent: NodeId, elem: &BytesStart<'_>) -> NodeId {
        let name = lower_name(elem.name().as_ref());
        let attrs = elem
            .html_attributes()
            .flatten()
            .map(|attr| {
                let key = lower_name(attr.key.as_ref());
                let raw = String::from_utf8_lossy(&attr.value);
                (key, decode_attr(&raw))
            })
            .collect();
        self.push(parent, NodeKind::Element { name, attrs })
    }

    /// Append text, merging with a preceding text sibling (entity events
    /// split one DOM text node into several reader events).
    fn push_text(&mut self, parent: NodeId, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(&last) = self.nodes[parent].children.last()
            && let NodeKind::Text(existing) = &mut self.nodes[last].kind
        {
            existing.push_str(text);
            return;
        }
        self.push(parent, NodeKind::Text(text.to_owned()));
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    fn close(&self, stack: &mut Vec<NodeId>, name: &str) {
        if let Some(pos) = stack.iter().rposition(|&id| self.name_of(id) == name)
            && pos > 0
        {
            stack.truncate(pos);
        }
    }

    fn name_of(&self, id: NodeId) -> &str {
        match &self.nodes[id].kind {
            NodeKind::Element { name, .. } => name,
            _ => "",
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// All elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        (0..self.nodes.len())
            .filter(|&id| matches!(self.nodes[id].kind, NodeKind::Element { .. }))
            .map(|id| ElementRef { doc: self, id })
    }

    /// All elements matching `selector`, in document order.
    pub fn select_all<'a, 's>(
        &'a self,
        selector: &'s Selector,
    ) -> impl Iterator<Item = ElementRef<'a>> + use<'a, 's> {
        self.elements().filter(move |el| selector.matches(el))
    }

    /// First element matching `selector` in document order.
    pub fn select_first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.select_all(selector).next()
    }

    /// Concatenated text of the whole document.
    pub fn text_content(&self) -> String {
        self.text_nodes_under(ROOT).collect()
    }

    /// Text nodes below `id`, depth first, in document order.
    fn text_nodes_under(&self, id: NodeId) -> impl Iterator<Item = &str> {
        let mut pending: Vec<NodeId> = self.nodes[id].children.iter().rev().copied().collect();
        std::iter::from_fn(move || {
            while let Some(next) = pending.pop() {
                let node = &self.nodes[next];
                pending.extend(node.children.iter().rev());
                if let NodeKind::Text(text) = &node.kind {
                    return Some(text.as_str());
                }
            }
            None
        })
    }

    /// Text nodes of the whole document together with their parent element.
    pub fn text_nodes(&self) -> impl Iterator<Item = (ElementRef<'_>, &str)> {
        self.nodes.iter().filter_map(move |node| match (&node.kind, node.parent) {
            (NodeKind::Text(text), Some(parent)) if parent != ROOT => {
                Some((ElementRef { doc: self, id: parent }, text.as_str()))
            }
            _ => None,
        })
    }
}

/// Borrowed handle to one element of a [`Document`].
#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> ElementRef<'a> {
    /// Lowercased tag name.
    pub fn name(&self) -> &'a str {
        self.doc.name_of(self.id)
    }

    /// Attribute value (decoded), by lowercased name.
    pub fn attr(&self, key: &str) -> Option<&'a str> {
        match &self.doc.nodes[self.id].kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Nearest enclosing element.
    pub fn parent(&self) -> Option<ElementRef<'a>> {
        let parent = self.doc.nodes[self.id].parent?;
        matches!(self.doc.nodes[parent].kind, NodeKind::Element { .. })
            .then_some(ElementRef { doc: self.doc, id: parent })
    }

    /// Text nodes inside this element, in document order.
    pub fn text_nodes(&self) -> impl Iterator<Item = &'a str> + use<'a> {
        self.doc.text_nodes_under(self.id)
    }

    /// Concatenated descendant text (DOM `textContent`).
    pub fn text_content(&self) -> String {
        self.text_nodes().collect()
    }
}

// ============================================================================
// Input Cleanup
// ============================================================================

/// Rewrite `html` so the XML tokenizer reads it the way a browser would.
///
/// Raw-text element bodies are emptied, a stray `&` becomes `&amp;` and a
/// `<` that cannot open a tag becomes `&lt;`.
fn prepare(html: &str) -> Cow<'_, str> {
    let bytes = html.as_bytes();
    if !bytes.iter().any(|&b| b == b'&' || b == b'<') {
        return Cow::Borrowed(html);
    }

    let mut out = String::with_capacity(html.len());
    let mut copied = 0;
    let mut raw_body: Option<Range<usize>> = None;
    let mut i = 0;

    while i < bytes.len() {
        if let Some(body) = raw_body.take_if(|body| body.start == i) {
            out.push_str(&html[copied..i]);
            i = body.end;
            copied = i;
            continue;
        }
        match bytes[i] {
            b'&' if !starts_reference(&bytes[i + 1..]) => {
                out.push_str(&html[copied..i]);
                out.push_str("&amp;");
                copied = i + 1;
            }
            b'<' if !starts_markup(bytes.get(i + 1).copied()) => {
                out.push_str(&html[copied..i]);
                out.push_str("&lt;");
                copied = i + 1;
            }
            b'<' if raw_body.is_none() => raw_body = raw_text_body(html, i),
            _ => {}
        }
        i += 1;
    }

    out.push_str(&html[copied..]);
    Cow::Owned(out)
}

/// Whether the byte after `<` opens a tag, end tag, comment or declaration.
#[inline]
fn starts_markup(next: Option<u8>) -> bool {
    next.is_some_and(|b| b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?'))
}

/// Whether `rest` (the input after a `&`) is `name;`, `#123;` or `#x1F;`.
fn starts_reference(rest: &[u8]) -> bool {
    let Some(end) = rest
        .iter()
        .take(MAX_REFERENCE_LEN + 1)
        .position(|&b| b == b';')
    else {
        return false;
    };
    match &rest[..end] {
        [b'#', b'x' | b'X', hex @ ..] => !hex.is_empty() && hex.iter().all(u8::is_ascii_hexdigit),
        [b'#', dec @ ..] => !dec.is_empty() && dec.iter().all(u8::is_ascii_digit),
        [first, name @ ..] => {
            first.is_ascii_alphabetic() && name.iter().all(u8::is_ascii_alphanumeric)
        }
        [] => false,
    }
}

/// Body of the raw-text element whose start tag begins at `open`, up to its
/// end tag (or the end of input when it is never closed).
fn raw_text_body(html: &str, open: usize) -> Option<Range<usize>> {
    let bytes = html.as_bytes();
    let tag = &bytes[open + 1..];
    let name = RAW_TEXT_ELEMENTS.iter().find(|name| {
        tag.len() > name.len()
            && tag[..name.len()].eq_ignore_ascii_case(name.as_bytes())
            && matches!(tag[name.len()], b'>' | b'/' | b' ' | b'\t' | b'\n' | b'\r' | b'\x0c')
    })?;

    let gt = open + 1 + tag.iter().position(|&b| b == b'>')?;
    if bytes[gt - 1] == b'/' {
        return None;
    }

    let start = gt + 1;
    let close = format!("</{name}");
    let end = bytes[start..]
        .windows(close.len())
        .position(|w| w.eq_ignore_ascii_case(close.as_bytes()))
        .map_or(bytes.len(), |pos| start + pos);
    Some(start..end)
}

#[inline]
fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

#[inline]
fn lower_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

/// Resolve `&name;` given the bare name (`amp`, `#39`, `#x27`, `nbsp`).
///
/// Unknown names are kept verbatim so no text is lost.
fn decode_entity(name: &str) -> Cow<'static, str> {
    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse().ok(),
        };
        if let Some(ch) = value.and_then(char::from_u32) {
            return Cow::Owned(ch.to_string());
        }
    }
    match name {
        "nbsp" => Cow::Borrowed("\u{a0}"),
        _ => resolve_predefined_entity(name)
            .map(Cow::Borrowed)
            .unwrap_or_else(|| Cow::Owned(format!("&{name};"))),
    }
}

/// Decode entities inside an attribute value.
fn decode_attr(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_owned();
    }
    match unescape(raw) {
        Ok(value) => value.into_owned(),
        // HTML-only entities make the XML unescaper bail; fall back to the
        // ones that show up in scraped attributes.
        Err(_) => raw
            .replace("&nbsp;", "\u{a0}")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(s: &str) -> Selector {
        Selector::parse(s).unwrap()
    }

    #[test]
    fn test_parse_simple_tree() {
        let doc = Document::parse(r#"<div class="a b"><p>Hello <b>world</b></p></div>"#).unwrap();

        let div = doc.select_first(&sel("div")).unwrap();
        assert!(div.has_class("a"));
        assert!(div.has_class("b"));
        assert!(!div.has_class("c"));
        assert_eq!(div.text_content(), "Hello world");
    }

    #[test]
    fn test_void_elements_take_no_children() {
        let doc = Document::parse(r#"<div><img src="x.png"><p>after</p></div>"#).unwrap();

        let img = doc.select_first(&sel("img")).unwrap();
        assert_eq!(img.attr("src"), Some("x.png"));
        let p = doc.select_first(&sel("p")).unwrap();
        assert_eq!(p.parent().unwrap().name(), "div");
    }

    #[test]
    fn test_unclosed_and_stray_end_tags() {
        let doc = Document::parse("<div><span>one<p>two</div></em><p>three</p>").unwrap();

        let texts: Vec<_> = doc.select_all(&sel("p")).map(|p| p.text_content()).collect();
        assert_eq!(texts, vec!["two", "three"]);
        // second <p> is outside the div again
        let last = doc.select_all(&sel("p")).last().unwrap();
        assert!(last.parent().is_none());
    }

    #[test]
    fn test_entities_in_text_and_attributes() {
        let doc = Document::parse(
            r#"<a href="https://x.test/?a=1&amp;b=2" title="Tom&nbsp;Cat">Q&amp;A &#39;s&#x21;</a>"#,
        )
        .unwrap();

        let a = doc.select_first(&sel("a")).unwrap();
        assert_eq!(a.attr("href"), Some("https://x.test/?a=1&b=2"));
        assert_eq!(a.attr("title"), Some("Tom\u{a0}Cat"));
        assert_eq!(a.text_content(), "Q&A 's!");
        // merged into a single text node
        assert_eq!(a.text_nodes().count(), 1);
    }

    #[test]
    fn test_unknown_entity_kept() {
        let doc = Document::parse("<p>a &hellip; b</p>").unwrap();
        assert_eq!(doc.text_content(), "a &hellip; b");
    }

    #[test]
    fn test_script_and_style_text_dropped() {
        let doc = Document::parse("<div><style>.x{}</style><script>var a = 1;</script>kept</div>")
            .unwrap();
        assert_eq!(doc.text_content(), "kept");
    }

    #[test]
    fn test_markup_inside_script_strings() {
        let doc = Document::parse(
            r#"<html><body><script>var s = "</div>"; if (a < b && c) {}</script><div class="update-components-text">kept text</div></body></html>"#,
        )
        .unwrap();

        let div = doc.select_first(&sel("div.update-components-text")).unwrap();
        assert_eq!(div.text_content(), "kept text");
        assert_eq!(div.parent().unwrap().name(), "body");
        assert_eq!(doc.text_content(), "kept text");
    }

    #[test]
    fn test_unclosed_script_drops_rest() {
        let doc = Document::parse("<p>before</p><SCRIPT type=\"x\">var a = '<p>';").unwrap();
        assert_eq!(doc.text_content(), "before");
        assert!(doc.select_first(&sel("script")).is_some());
    }

    #[test]
    fn test_bare_ampersand_is_text() {
        let doc = Document::parse(
            r#"<div class="update-components-text"><span>Research & design work for a new client, R&D and Q &amp; A</span></div>"#,
        )
        .unwrap();
        assert_eq!(
            doc.text_content(),
            "Research & design work for a new client, R&D and Q & A"
        );
    }

    #[test]
    fn test_bare_ampersand_in_attribute() {
        let doc = Document::parse(r#"<a href="https://x.test/?a=1&b=2">link</a>"#).unwrap();
        let a = doc.select_first(&sel("a")).unwrap();
        assert_eq!(a.attr("href"), Some("https://x.test/?a=1&b=2"));
    }

    #[test]
    fn test_less_than_in_text() {
        let doc = Document::parse("<p>Latency went from 200ms to < 50ms after the rewrite, nice</p>")
            .unwrap();
        assert_eq!(
            doc.text_content(),
            "Latency went from 200ms to < 50ms after the rewrite, nice"
        );
    }

    #[test]
    fn test_prepare_leaves_clean_markup() {
        let html = "<p class=\"a\">x &amp; y &#39; &#x21;</p><!-- c --><br/>";
        assert!(matches!(prepare(html), Cow::Owned(ref s) if s == html));
        assert!(matches!(prepare("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn test_starts_reference() {
        assert!(starts_reference(b"amp; rest"));
        assert!(starts_reference(b"#39;"));
        assert!(starts_reference(b"#x1F;"));
        assert!(!starts_reference(b" design"));
        assert!(!starts_reference(b"D and"));
        assert!(!starts_reference(b"#;"));
        assert!(!starts_reference(b"#xZZ;"));
    }

    #[test]
    fn test_uppercase_tags_and_attributes() {
        let doc = Document::parse(r#"<VIDEO POSTER="p.jpg"></VIDEO>"#).unwrap();
        let video = doc.select_first(&sel("video[poster]")).unwrap();
        assert_eq!(video.attr("poster"), Some("p.jpg"));
    }

    #[test]
    fn test_text_nodes_with_parents() {
        let doc = Document::parse("<p>one</p><span>two</span>").unwrap();
        let pairs: Vec<_> = doc.text_nodes().map(|(el, t)| (el.name(), t)).collect();
        assert_eq!(pairs, vec![("p", "one"), ("span", "two")]);
    }

    #[test]
    fn test_decode_entity() {
        assert_eq!(decode_entity("amp"), "&");
        assert_eq!(decode_entity("#65"), "A");
        assert_eq!(decode_entity("#x41"), "A");
        assert_eq!(decode_entity("nbsp"), "\u{a0}");
        assert_eq!(decode_entity("bogus"), "&bogus;");
    }
}

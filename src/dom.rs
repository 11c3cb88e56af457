//! Headless document model.
//!
//! An arena of elements rooted at `<html>`, with the parts of the browser
//! document the site layer reads and writes: attributes, an ordered class
//! list, inline style, text-or-markup content, a layout box for
//! intersection and anchor offsets, the viewport scroll offset and the
//! current location.
//!
//! Pages are loaded from a JSON [`PageSnapshot`] and can be rendered back
//! to HTML with [`Document::to_html`].
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PageError;

/// Handle to an element of one [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// What an element holds besides its child elements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Content {
    #[default]
    Empty,
    /// Plain text, escaped when rendered
    Text(String),
    /// Markup inserted verbatim
    Markup(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    style: BTreeMap<String, String>,
    content: Content,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    top: f64,
    height: f64,
}

impl Element {
    fn new(tag: &str) -> Self {
        Element {
            tag: tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            classes: Vec::new(),
            style: BTreeMap::new(),
            content: Content::Empty,
            parent: None,
            children: Vec::new(),
            top: 0.0,
            height: 0.0,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        if name == "class" {
            self.classes = split_classes(value);
        } else {
            self.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        if name == "class" {
            self.classes.clear();
        } else {
            self.attributes.remove(name);
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Force the presence of `class`, like `classList.toggle(class, force)`.
    pub fn set_class(&mut self, class: &str, present: bool) {
        if present {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
    }

    /// Flip `class`; returns whether it is now present.
    pub fn toggle_class(&mut self, class: &str) -> bool {
        let present = !self.has_class(class);
        self.set_class(class, present);
        present
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.style.get(property).map(String::as_str)
    }

    pub fn set_style(&mut self, property: &str, value: &str) {
        self.style.insert(property.to_string(), value.to_string());
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Offset of the element's top edge from the document top, in px
    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

fn split_classes(value: &str) -> Vec<String> {
    let mut classes: Vec<String> = Vec::new();
    for class in value.split_whitespace() {
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }
    classes
}

/// Authored description of an element, as found in a page snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementSpec>,
}

impl ElementSpec {
    pub fn new(tag: &str) -> Self {
        ElementSpec {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn class(mut self, class: &str) -> Self {
        let entry = self.attrs.entry("class".to_string()).or_default();
        if !entry.is_empty() {
            entry.push(' ');
        }
        entry.push_str(class);
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn html(mut self, markup: &str) -> Self {
        self.html = Some(markup.to_string());
        self
    }

    pub fn layout(mut self, top: f64, height: f64) -> Self {
        self.top = top;
        self.height = height;
        self
    }

    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }
}

fn default_path() -> String {
    "/index.html".to_string()
}

fn default_viewport_height() -> f64 {
    800.0
}

/// Serialized form of a page: the body tree plus viewport state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,
    #[serde(default)]
    pub scroll_y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default)]
    pub body: Vec<ElementSpec>,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    root: NodeId,
    body: NodeId,
    location: String,
    scroll_y: f64,
    viewport_height: f64,
}

impl Document {
    /// An empty `<html><body></body></html>` document at `path`.
    pub fn new(path: &str) -> Self {
        let mut document = Document {
            nodes: vec![Element::new("html")],
            root: NodeId(0),
            body: NodeId(0),
            location: path.to_string(),
            scroll_y: 0.0,
            viewport_height: default_viewport_height(),
        };
        document.body = document.append(document.root, &ElementSpec::new("body"));
        document
    }

    pub fn from_snapshot(snapshot: &PageSnapshot) -> Self {
        let mut document = Document::new(&snapshot.path);
        document.viewport_height = snapshot.viewport_height;
        document.scroll_y = snapshot.scroll_y.max(0.0);
        if let Some(lang) = &snapshot.lang {
            document.set_lang(lang);
        }
        let body = document.body;
        for spec in &snapshot.body {
            document.append(body, spec);
        }
        document
    }

    pub fn from_json(json: &str) -> Result<Self, PageError> {
        let snapshot: PageSnapshot = serde_json::from_str(json)?;
        Ok(Document::from_snapshot(&snapshot))
    }

    pub fn from_file(path: &Path) -> Result<Self, PageError> {
        let json = fs::read_to_string(path).map_err(|source| PageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Document::from_json(&json)
    }

    /// Build `spec` (recursively) as the last child of `parent`.
    ///
    /// A `parent` that is not in this document leaves the new subtree
    /// detached.
    pub fn append(&mut self, parent: NodeId, spec: &ElementSpec) -> NodeId {
        let mut element = Element::new(&spec.tag);
        for (name, value) in &spec.attrs {
            element.set_attr(name, value);
        }
        element.content = match (&spec.html, &spec.text) {
            (Some(markup), _) => Content::Markup(markup.clone()),
            (None, Some(text)) => Content::Text(text.clone()),
            (None, None) => Content::Empty,
        };
        element.top = spec.top;
        element.height = spec.height;
        let id = NodeId(self.nodes.len());
        if let Some(parent_el) = self.nodes.get_mut(parent.0) {
            parent_el.children.push(id);
            element.parent = Some(parent);
        }
        self.nodes.push(element);

        for child in &spec.children {
            self.append(id, child);
        }
        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(id.0)
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id).and_then(|el| el.attr(name))
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(el) = self.get_mut(id) {
            el.set_attr(name, value);
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(el) = self.get_mut(id) {
            el.remove_attr(name);
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.get(id).is_some_and(|el| el.has_class(class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(el) = self.get_mut(id) {
            el.add_class(class);
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(el) = self.get_mut(id) {
            el.remove_class(class);
        }
    }

    pub fn set_class(&mut self, id: NodeId, class: &str, present: bool) {
        if let Some(el) = self.get_mut(id) {
            el.set_class(class, present);
        }
    }

    pub fn toggle_class(&mut self, id: NodeId, class: &str) -> bool {
        self.get_mut(id).is_some_and(|el| el.toggle_class(class))
    }

    pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.get(id).and_then(|el| el.style(property))
    }

    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        if let Some(el) = self.get_mut(id) {
            el.set_style(property, value);
        }
    }

    /// Replace everything inside `id` with plain text.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        self.replace_content(id, Content::Text(text.to_string()));
    }

    /// Replace everything inside `id` with markup, trusted verbatim.
    pub fn set_inner_html(&mut self, id: NodeId, markup: &str) {
        self.replace_content(id, Content::Markup(markup.to_string()));
    }

    fn replace_content(&mut self, id: NodeId, content: Content) {
        let Some(el) = self.nodes.get_mut(id.0) else {
            return;
        };
        el.content = content;
        let detached = std::mem::take(&mut el.children);
        for child in detached {
            if let Some(child) = self.nodes.get_mut(child.0) {
                child.parent = None;
            }
        }
    }

    /// Concatenated text of `id` and its descendants, markup tags removed.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(el) = self.get(id) else {
            return;
        };
        match &el.content {
            Content::Empty => {}
            Content::Text(text) => out.push_str(text),
            Content::Markup(markup) => out.push_str(&strip_tags(markup)),
        }
        for child in &el.children {
            self.collect_text(*child, out);
        }
    }

    /// Attached elements in document order, starting at the root.
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut out = vec![self.root];
        out.extend(self.descendants(self.root));
        out
    }

    /// Descendants of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.get(id) {
            Some(el) => el.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some(el) = self.get(next) {
                stack.extend(el.children.iter().rev().copied());
            }
        }
        out
    }

    /// `id` followed by its ancestors up to the root.
    pub fn ancestors_inclusive(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.get(id).map(|_| id);
        while let Some(node) = current {
            out.push(node);
            current = self.get(node).and_then(Element::parent);
        }
        out
    }

    /// Whether `node` is `ancestor` or lies inside it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors_inclusive(node).contains(&ancestor)
    }

    pub fn query<F>(&self, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&Element) -> bool,
    {
        self.query_within(self.root, predicate)
    }

    /// Descendants of `scope` matching `predicate`, in document order.
    pub fn query_within<F>(&self, scope: NodeId, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&Element) -> bool,
    {
        self.descendants(scope)
            .into_iter()
            .filter(|id| self.get(*id).is_some_and(&predicate))
            .collect()
    }

    pub fn query_class(&self, class: &str) -> Vec<NodeId> {
        self.query(|el| el.has_class(class))
    }

    pub fn query_first_class(&self, class: &str) -> Option<NodeId> {
        self.query_class(class).into_iter().next()
    }

    pub fn query_attr(&self, name: &str) -> Vec<NodeId> {
        self.query(|el| el.has_attr(name))
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.query(|el| el.id() == Some(id)).into_iter().next()
    }

    pub fn lang(&self) -> Option<&str> {
        self.attr(self.root, "lang")
    }

    pub fn set_lang(&mut self, lang: &str) {
        let root = self.root;
        self.set_attr(root, "lang", lang);
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    /// Scroll the window; negative offsets clamp to the top.
    pub fn set_scroll_y(&mut self, y: f64) {
        self.scroll_y = y.max(0.0);
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport_height = height.max(0.0);
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn set_location(&mut self, url: &str) {
        self.location = url.to_string();
    }

    /// Last path segment of the location, `index.html` when empty.
    pub fn current_page(&self) -> &str {
        let path = self.location.split(['?', '#']).next().unwrap_or_default();
        match path.rsplit('/').next() {
            Some(page) if !page.is_empty() => page,
            _ => "index.html",
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>\n");
        self.render(self.root, &mut out);
        out.push('\n');
        out
    }

    fn render(&self, id: NodeId, out: &mut String) {
        let Some(el) = self.get(id) else {
            return;
        };
        out.push('<');
        out.push_str(&el.tag);
        if !el.classes.is_empty() {
            push_attr(out, "class", &el.classes.join(" "));
        }
        for (name, value) in &el.attributes {
            push_attr(out, name, value);
        }
        if !el.style.is_empty() {
            let style: Vec<String> = el.style.iter().map(|(k, v)| format!("{k}: {v}")).collect();
            push_attr(out, "style", &style.join("; "));
        }
        out.push('>');
        if VOID_TAGS.contains(&el.tag.as_str()) {
            return;
        }
        match &el.content {
            Content::Empty => {}
            Content::Text(text) => out.push_str(&escape_text(text)),
            Content::Markup(markup) => out.push_str(markup),
        }
        for child in &el.children {
            self.render(*child, out);
        }
        out.push_str("</");
        out.push_str(&el.tag);
        out.push('>');
    }
}

const VOID_TAGS: [&str; 7] = ["area", "br", "hr", "img", "input", "link", "meta"];

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_attr(value));
    out.push('"');
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

fn strip_tags(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut in_tag = false;
    for c in markup.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

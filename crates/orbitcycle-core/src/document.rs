//! In-memory page document: the element tree page handlers read and write.
//!
//! This is the collaborator a host mirrors from its real DOM (or a test
//! builds by hand). It keeps only what the page logic touches: ids, classes,
//! data attributes, text, inline styles, and a minimal layout box
//! (`offset_top` / `height`) for scroll math.
//!
//! Every accessor is total: asking about a missing element returns `None`
//! or `false`, and mutating a missing element does nothing. Page handlers
//! rely on this to degrade to no-ops when the page lacks an element.

use std::collections::{BTreeMap, HashMap};

use slotmap::SlotMap;

use crate::id::ElementId;

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Vertical layout box of an element, in page pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayoutBox {
    /// Distance from the top of the page.
    pub offset_top: f64,
    /// Rendered height.
    pub height: f64,
}

/// The visible window onto the page.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_y: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_y: 0.0,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// A single element in the document.
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    id: Option<String>,
    /// Class list in insertion order, without duplicates.
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    /// Markup assigned wholesale (modal body). Replaces children.
    inner_html: Option<String>,
    pub layout: LayoutBox,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Element {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn style(&self, prop: &str) -> Option<&str> {
        self.styles.get(prop).map(String::as_str)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn inner_html(&self) -> Option<&str> {
        self.inner_html.as_deref()
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// The element tree, rooted at `body`.
#[derive(Debug, Clone)]
pub struct Document {
    elements: SlotMap<ElementId, Element>,
    body: ElementId,
    by_id: HashMap<String, ElementId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document containing only `body`.
    pub fn new() -> Self {
        let mut elements = SlotMap::with_key();
        let body = elements.insert(Element {
            tag: "body".to_string(),
            ..Default::default()
        });
        Self {
            elements,
            body,
            by_id: HashMap::new(),
        }
    }

    pub fn body(&self) -> ElementId {
        self.body
    }

    /// Number of elements, attached or not, including `body`.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, el: ElementId) -> Option<&Element> {
        self.elements.get(el)
    }

    pub fn exists(&self, el: ElementId) -> bool {
        self.elements.contains_key(el)
    }

    // -----------------------------------------------------------------------
    // Tree construction
    // -----------------------------------------------------------------------

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        self.elements.insert(Element {
            tag: tag.to_string(),
            ..Default::default()
        })
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent. Returns `false` if either element is missing or the
    /// move would create a cycle.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        if !self.exists(parent) || !self.exists(child) || self.contains(child, parent) {
            return false;
        }
        self.detach(child);
        if let Some(p) = self.elements.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.elements.get_mut(child) {
            c.parent = Some(parent);
        }
        true
    }

    /// Create an element and append it to `parent` in one step.
    pub fn append_new(&mut self, parent: ElementId, tag: &str) -> ElementId {
        let el = self.create_element(tag);
        self.append_child(parent, el);
        el
    }

    /// Remove an element and its whole subtree. `body` cannot be removed.
    pub fn remove(&mut self, el: ElementId) -> bool {
        if el == self.body || !self.exists(el) {
            return false;
        }
        self.detach(el);
        let mut stack = vec![el];
        while let Some(next) = stack.pop() {
            if let Some(removed) = self.elements.remove(next) {
                if let Some(id) = removed.id {
                    if self.by_id.get(&id) == Some(&next) {
                        self.by_id.remove(&id);
                    }
                }
                stack.extend(removed.children);
            }
        }
        true
    }

    /// Remove every child of `el`.
    pub fn clear_children(&mut self, el: ElementId) {
        let children = match self.elements.get(el) {
            Some(e) => e.children.clone(),
            None => return,
        };
        for child in children {
            self.remove(child);
        }
    }

    fn detach(&mut self, el: ElementId) {
        let parent = self.elements.get_mut(el).and_then(|e| e.parent.take());
        if let Some(p) = parent.and_then(|p| self.elements.get_mut(p)) {
            p.children.retain(|&c| c != el);
        }
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut cursor = Some(node);
        while let Some(el) = cursor {
            if el == ancestor {
                return true;
            }
            cursor = self.elements.get(el).and_then(|e| e.parent);
        }
        false
    }

    /// Whether the element is reachable from `body`.
    pub fn is_attached(&self, el: ElementId) -> bool {
        self.exists(el) && self.contains(self.body, el)
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Assign the element's `id`. Ids are unique; reassigning one moves it.
    pub fn set_id(&mut self, el: ElementId, id: &str) {
        let Some(element) = self.elements.get_mut(el) else {
            return;
        };
        if let Some(old) = element.id.replace(id.to_string()) {
            self.by_id.remove(&old);
        }
        if let Some(prev) = self.by_id.insert(id.to_string(), el) {
            if prev != el {
                if let Some(p) = self.elements.get_mut(prev) {
                    p.id = None;
                }
            }
        }
    }

    /// Find an attached element by id.
    pub fn get_element_by_id(&self, id: &str) -> Option<ElementId> {
        self.by_id
            .get(id)
            .copied()
            .filter(|&el| self.is_attached(el))
    }

    /// Attached elements in document order (depth-first, pre-order).
    pub fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(el) = stack.pop() {
            let Some(element) = self.elements.get(el) else {
                continue;
            };
            out.push(el);
            stack.extend(element.children.iter().rev());
        }
        out
    }

    /// Attached elements carrying `class`, in document order.
    pub fn query_class(&self, class: &str) -> Vec<ElementId> {
        self.descendants(self.body)
            .into_iter()
            .filter(|&el| self.has_class(el, class))
            .collect()
    }

    /// Attached elements with the given tag, in document order.
    pub fn query_tag(&self, tag: &str) -> Vec<ElementId> {
        self.descendants(self.body)
            .into_iter()
            .filter(|&el| self.elements.get(el).is_some_and(|e| e.tag == tag))
            .collect()
    }

    /// First descendant of `root` (excluding `root`) carrying `class`.
    pub fn find_in(&self, root: ElementId, class: &str) -> Option<ElementId> {
        self.descendants(root)
            .into_iter()
            .skip(1)
            .find(|&el| self.has_class(el, class))
    }

    /// Nearest inclusive ancestor carrying `class`.
    pub fn closest(&self, el: ElementId, class: &str) -> Option<ElementId> {
        let mut cursor = Some(el);
        while let Some(current) = cursor {
            let element = self.elements.get(current)?;
            if element.has_class(class) {
                return Some(current);
            }
            cursor = element.parent;
        }
        None
    }

    // -----------------------------------------------------------------------
    // Classes
    // -----------------------------------------------------------------------

    pub fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.elements.get(el).is_some_and(|e| e.has_class(class))
    }

    pub fn add_class(&mut self, el: ElementId, class: &str) {
        if let Some(e) = self.elements.get_mut(el) {
            if !e.has_class(class) {
                e.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, el: ElementId, class: &str) {
        if let Some(e) = self.elements.get_mut(el) {
            e.classes.retain(|c| c != class);
        }
    }

    /// Toggle a class. Returns whether the class is present afterwards.
    pub fn toggle_class(&mut self, el: ElementId, class: &str) -> bool {
        if self.has_class(el, class) {
            self.remove_class(el, class);
            false
        } else {
            self.add_class(el, class);
            self.exists(el)
        }
    }

    /// Replace the whole class list from a space-separated string.
    pub fn set_class_name(&mut self, el: ElementId, class_name: &str) {
        if let Some(e) = self.elements.get_mut(el) {
            e.classes.clear();
            for class in class_name.split_whitespace() {
                if !e.has_class(class) {
                    e.classes.push(class.to_string());
                }
            }
        }
    }

    /// The class list as a space-separated string.
    pub fn class_name(&self, el: ElementId) -> Option<String> {
        self.elements.get(el).map(|e| e.classes.join(" "))
    }

    // -----------------------------------------------------------------------
    // Attributes, text, styles
    // -----------------------------------------------------------------------

    pub fn attr(&self, el: ElementId, name: &str) -> Option<&str> {
        self.elements.get(el).and_then(|e| e.attr(name))
    }

    pub fn set_attr(&mut self, el: ElementId, name: &str, value: &str) {
        if let Some(e) = self.elements.get_mut(el) {
            e.attrs.insert(name.to_string(), value.to_string());
        }
    }

    pub fn text(&self, el: ElementId) -> Option<&str> {
        self.elements.get(el).map(Element::text)
    }

    pub fn set_text(&mut self, el: ElementId, text: &str) {
        if let Some(e) = self.elements.get_mut(el) {
            e.text = text.to_string();
        }
    }

    /// Text of the element with `id`, if present.
    pub fn text_of(&self, id: &str) -> Option<&str> {
        self.get_element_by_id(id).and_then(|el| self.text(el))
    }

    /// Set the text of the element with `id`. Missing ids are ignored.
    pub fn set_text_of(&mut self, id: &str, text: &str) {
        if let Some(el) = self.get_element_by_id(id) {
            self.set_text(el, text);
        }
    }

    pub fn inner_html(&self, el: ElementId) -> Option<&str> {
        self.elements.get(el).and_then(Element::inner_html)
    }

    /// Replace the element's content with markup. Existing children go away.
    pub fn set_inner_html(&mut self, el: ElementId, html: String) {
        if !self.exists(el) {
            return;
        }
        self.clear_children(el);
        if let Some(e) = self.elements.get_mut(el) {
            e.inner_html = Some(html);
        }
    }

    pub fn style(&self, el: ElementId, prop: &str) -> Option<&str> {
        self.elements.get(el).and_then(|e| e.style(prop))
    }

    pub fn set_style(&mut self, el: ElementId, prop: &str, value: &str) {
        if let Some(e) = self.elements.get_mut(el) {
            e.styles.insert(prop.to_string(), value.to_string());
        }
    }

    /// Remove an inline style (the `style.x = ''` idiom).
    pub fn clear_style(&mut self, el: ElementId, prop: &str) {
        if let Some(e) = self.elements.get_mut(el) {
            e.styles.remove(prop);
        }
    }

    // -----------------------------------------------------------------------
    // Layout
    // -----------------------------------------------------------------------

    pub fn layout(&self, el: ElementId) -> Option<LayoutBox> {
        self.elements.get(el).map(|e| e.layout)
    }

    pub fn set_layout(&mut self, el: ElementId, offset_top: f64, height: f64) {
        if let Some(e) = self.elements.get_mut(el) {
            e.layout = LayoutBox { offset_top, height };
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

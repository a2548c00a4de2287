//! A small view description, standing in for DOM markup.
//!
//! Presentation functions build [`View`] trees. [`View::to_text`] renders a
//! tree as indented markup; [`View::find_clickable`] locates the element a
//! user would click by its visible text.

use slicestore_connect::Callback;
use std::fmt::{self, Write as _};

/// One element with attributes, an optional click handler and children
#[derive(Clone, Debug)]
pub struct Element {
    /// Tag name, e.g. `li`
    pub tag: &'static str,
    /// Attributes in insertion order
    pub attrs: Vec<(&'static str, String)>,
    /// Click handler
    pub on_click: Option<Callback>,
    /// Child views
    pub children: Vec<View>,
}

/// Click handlers compare by identity.
impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        let handlers_match = match (&self.on_click, &other.on_click) {
            (Some(a), Some(b)) => a.ptr_eq(b),
            (None, None) => true,
            _ => false,
        };
        handlers_match
            && self.tag == other.tag
            && self.attrs == other.attrs
            && self.children == other.children
    }
}

/// A renderable description
#[derive(Clone, Debug, PartialEq)]
pub enum View {
    /// Plain text
    Text(String),
    /// An element
    Element(Element),
}

impl View {
    /// A text node
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// An empty element
    #[must_use]
    pub const fn element(tag: &'static str) -> Self {
        Self::Element(Element {
            tag,
            attrs: Vec::new(),
            on_click: None,
            children: Vec::new(),
        })
    }

    /// Add an attribute; no-op on text nodes
    #[must_use]
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        if let Self::Element(element) = &mut self {
            element.attrs.push((name, value.into()));
        }
        self
    }

    /// Set the click handler; no-op on text nodes
    #[must_use]
    pub fn on_click(mut self, callback: Callback) -> Self {
        if let Self::Element(element) = &mut self {
            element.on_click = Some(callback);
        }
        self
    }

    /// Append one child; no-op on text nodes
    #[must_use]
    pub fn child(mut self, child: View) -> Self {
        if let Self::Element(element) = &mut self {
            element.children.push(child);
        }
        self
    }

    /// Append several children; no-op on text nodes
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = View>) -> Self {
        if let Self::Element(element) = &mut self {
            element.children.extend(children);
        }
        self
    }

    /// Concatenated text of this view and its descendants
    #[must_use]
    pub fn text_content(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Element(element) => element.children.iter().map(Self::text_content).collect(),
        }
    }

    /// First element, depth first, that has a click handler and whose text
    /// is `label`
    #[must_use]
    pub fn find_clickable(&self, label: &str) -> Option<&Callback> {
        let Self::Element(element) = self else {
            return None;
        };
        if let Some(callback) = &element.on_click {
            if self.text_content() == label {
                return Some(callback);
            }
        }
        element
            .children
            .iter()
            .find_map(|child| child.find_clickable(label))
    }

    /// Indented markup, one node per line
    ///
    /// Elements whose only child is text stay on one line.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out, 0);
        out
    }

    fn write_text(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        match self {
            Self::Text(text) => {
                let _ = writeln!(out, "{indent}{text}");
            },
            Self::Element(element) => {
                let mut open = format!("<{}", element.tag);
                for (name, value) in &element.attrs {
                    let _ = write!(open, " {name}=\"{value}\"");
                }

                match element.children.as_slice() {
                    [] => {
                        let _ = writeln!(out, "{indent}{open} />");
                    },
                    [Self::Text(text)] => {
                        let _ = writeln!(out, "{indent}{open}>{text}</{}>", element.tag);
                    },
                    children => {
                        let _ = writeln!(out, "{indent}{open}>");
                        for child in children {
                            child.write_text(out, depth + 1);
                        }
                        let _ = writeln!(out, "{indent}</{}>", element.tag);
                    },
                }
            },
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_to_text() {
        let view = View::element("ul")
            .child(
                View::element("li")
                    .attr("style", "text-decoration: none")
                    .child(View::text("a")),
            )
            .child(View::element("input"));

        assert_eq!(
            view.to_text(),
            "<ul>\n  <li style=\"text-decoration: none\">a</li>\n  <input />\n</ul>\n"
        );
    }

    #[test]
    fn test_find_clickable_by_text() {
        let clicks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&clicks);
        let view = View::element("p")
            .child(View::element("span").child(View::text("All")))
            .child(
                View::element("a")
                    .on_click(Callback::new(move |_| {
                        counter.set(counter.get() + 1);
                        Ok(())
                    }))
                    .child(View::text("Active")),
            );

        assert!(view.find_clickable("All").is_none());
        view.find_clickable("Active")
            .unwrap()
            .call(serde_json::Value::Null)
            .unwrap();
        assert_eq!(clicks.get(), 1);
        assert_eq!(view.text_content(), "AllActive");
    }
}

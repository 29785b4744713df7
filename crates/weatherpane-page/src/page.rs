//! The document the renderer writes into.

use std::sync::Arc;

use parking_lot::Mutex;
use weatherpane_core::RenderError;

use crate::dom::{append, make, set_attrs, text_element, Element};

/// Page shared between the caller and the reveal task
pub type SharedPage = Arc<Mutex<Page>>;

const TITLE: &str = "Weather";

#[derive(Debug, Clone)]
pub struct Page {
    root: Element,
    container_class: String,
}

impl Page {
    /// `html > (head > title, body > div.{container_class})`
    pub fn new(container_class: &str) -> Self {
        let head = append(text_element("title", TITLE), make("head"));
        let container = set_attrs(&[("class", container_class)], make("div"));
        let body = append(container, make("body"));
        let root = append(body, append(head, make("html")));

        Self {
            root,
            container_class: container_class.to_string(),
        }
    }

    /// Page without the main container, for documents that lack one
    pub fn without_container(container_class: &str) -> Self {
        let head = append(text_element("title", TITLE), make("head"));
        let root = append(make("body"), append(head, make("html")));
        Self {
            root,
            container_class: container_class.to_string(),
        }
    }

    pub fn shared(self) -> SharedPage {
        Arc::new(Mutex::new(self))
    }

    pub fn container_class(&self) -> &str {
        &self.container_class
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn main_container(&self) -> Result<&Element, RenderError> {
        self.root
            .find_by_class(&self.container_class)
            .ok_or_else(|| RenderError::ContainerMissing(self.container_class.clone()))
    }

    pub fn main_container_mut(&mut self) -> Result<&mut Element, RenderError> {
        let class = self.container_class.clone();
        self.root
            .find_by_class_mut(&class)
            .ok_or(RenderError::ContainerMissing(class))
    }

    pub fn find_by_class(&self, class: &str) -> Option<&Element> {
        self.root.find_by_class(class)
    }

    pub fn to_html(&self) -> String {
        format!("<!DOCTYPE html>\n{}\n", self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Node;

    #[test]
    fn test_new_page_has_empty_container() {
        let page = Page::new("mainContainer");
        let container = page.main_container().unwrap();

        assert_eq!(container.tag(), "div");
        assert!(container.children().is_empty());
    }

    #[test]
    fn test_missing_container_is_reported() {
        let mut page = Page::without_container("mainContainer");
        match page.main_container_mut() {
            Err(RenderError::ContainerMissing(class)) => assert_eq!(class, "mainContainer"),
            other => panic!("expected missing container, got {other:?}"),
        }
    }

    #[test]
    fn test_to_html_includes_container() {
        let mut page = Page::new("mainContainer");
        page.main_container_mut()
            .unwrap()
            .push(Node::Element(text_element("h1", "hello")));

        assert_eq!(
            page.to_html(),
            "<!DOCTYPE html>\n<html><head><title>Weather</title></head>\
             <body><div class=\"mainContainer\"><h1>hello</h1></div></body></html>\n"
        );
    }
}

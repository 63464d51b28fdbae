//! In-memory element tree for exercising the linker without HTML parsing

use super::Document;

#[derive(Debug, Clone)]
pub struct MemoryElement {
    pub tag: String,
    pub text: String,
    pub attrs: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    pub elements: Vec<MemoryElement>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element and return its index
    pub fn push(&mut self, tag: &str, text: &str) -> usize {
        self.elements.push(MemoryElement {
            tag: tag.to_string(),
            text: text.to_string(),
            attrs: Vec::new(),
        });
        self.elements.len() - 1
    }

    pub fn id_of(&self, index: usize) -> Option<&str> {
        self.elements[index]
            .attrs
            .iter()
            .find(|(name, _)| name == "id")
            .map(|(_, value)| value.as_str())
    }
}

impl Document for MemoryDocument {
    type Node = usize;

    fn elements_by_tag_name(&self, tag: &str) -> Vec<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.tag.eq_ignore_ascii_case(tag))
            .map(|(i, _)| i)
            .collect()
    }

    fn inner_html(&self, node: usize) -> String {
        self.elements[node].text.clone()
    }

    fn text_content(&self, node: usize) -> String {
        self.elements[node].text.clone()
    }

    fn attribute(&self, node: usize, name: &str) -> Option<String> {
        self.elements[node]
            .attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    fn set_attribute(&mut self, node: usize, name: &str, value: &str) {
        let attrs = &mut self.elements[node].attrs;
        match attrs.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => attrs.push((name.to_string(), value.to_string())),
        }
    }
}

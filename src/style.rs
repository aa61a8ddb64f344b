use crate::graph::NodeId;

pub struct StyleRule {
    predicate: Box<dyn Fn(&NodeId) -> bool>,
    style: String,
}

impl StyleRule {
    pub fn new(predicate: impl Fn(&NodeId) -> bool + 'static, style: impl Into<String>) -> Self {
        Self {
            predicate: Box::new(predicate),
            style: style.into(),
        }
    }

    pub fn matches(&self, node: &NodeId) -> bool {
        (self.predicate)(node)
    }

    pub fn style(&self) -> &str {
        &self.style
    }
}

// Rules are checked in insertion order; the first match wins.
pub struct StyleSheet {
    rules: Vec<StyleRule>,
    default_style: String,
}

impl StyleSheet {
    pub fn new(default_style: impl Into<String>) -> Self {
        Self {
            rules: Vec::new(),
            default_style: default_style.into(),
        }
    }

    pub fn push(&mut self, rule: StyleRule) {
        self.rules.push(rule);
    }

    pub fn resolve(&self, node: &NodeId) -> &str {
        self.rules
            .iter()
            .find(|rule| rule.matches(node))
            .map(StyleRule::style)
            .unwrap_or(&self.default_style)
    }
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self::new("green")
    }
}

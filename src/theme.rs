use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    // Seeds the style sheet's default fill; rules override it per node.
    pub node_color: String,
    pub parentage_color: String,
    pub child_color: String,
    pub adoptive_color: String,
    pub text_color: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "Helvetica, Arial, sans-serif".to_string(),
            font_size: 8.0,
            background: "#FFFFFF".to_string(),
            node_color: "green".to_string(),
            parentage_color: "blue".to_string(),
            child_color: "blue".to_string(),
            adoptive_color: "cyan".to_string(),
            text_color: "#000000".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 12.0,
            background: "#FBFBF9".to_string(),
            node_color: "#7FB069".to_string(),
            parentage_color: "#8A97AD".to_string(),
            child_color: "#4A6FA5".to_string(),
            adoptive_color: "#4FB8C5".to_string(),
            text_color: "#1C2430".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

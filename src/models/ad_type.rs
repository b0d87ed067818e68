// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Advertisement categories.

/// A preset advertisement category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdCategory {
    /// Value sent to the backend
    pub value: &'static str,
    /// Label shown in the category picker
    pub label: &'static str,
}

/// Preset categories offered in the toolbar.
pub const AD_CATEGORIES: &[AdCategory] = &[
    AdCategory { value: "产品", label: "产品广告" },
    AdCategory { value: "服务", label: "服务广告" },
    AdCategory { value: "品牌", label: "品牌广告" },
    AdCategory { value: "零售", label: "零售广告" },
    AdCategory { value: "教育", label: "教育广告" },
    AdCategory { value: "医疗健康", label: "医疗健康广告" },
    AdCategory { value: "科技", label: "科技广告" },
];

/// Look up the display label of a preset category value.
pub fn category_label(value: &str) -> Option<&'static str> {
    AD_CATEGORIES
        .iter()
        .find(|category| category.value == value)
        .map(|category| category.label)
}

/// The user's category choice: a preset, free text, or both.
///
/// A preset takes precedence over the custom text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdTypeChoice {
    pub preset: Option<&'static str>,
    pub custom: String,
}

impl AdTypeChoice {
    /// The category to submit, if any is set.
    pub fn resolve(&self) -> Option<String> {
        if let Some(preset) = self.preset {
            return Some(preset.to_string());
        }
        let custom = self.custom.trim();
        (!custom.is_empty()).then(|| custom.to_string())
    }

    pub fn clear(&mut self) {
        self.preset = None;
        self.custom.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_wins_over_custom() {
        let choice = AdTypeChoice {
            preset: Some("产品"),
            custom: "饮料".to_string(),
        };
        assert_eq!(choice.resolve().as_deref(), Some("产品"));
    }

    #[test]
    fn test_custom_used_when_no_preset() {
        let choice = AdTypeChoice {
            preset: None,
            custom: "  饮料 ".to_string(),
        };
        assert_eq!(choice.resolve().as_deref(), Some("饮料"));
    }

    #[test]
    fn test_blank_choice_resolves_to_none() {
        let mut choice = AdTypeChoice {
            preset: Some("科技"),
            custom: "   ".to_string(),
        };
        choice.clear();
        assert_eq!(choice.resolve(), None);

        choice.custom = "   ".to_string();
        assert_eq!(choice.resolve(), None);
    }

    #[test]
    fn test_category_label() {
        assert_eq!(category_label("医疗健康"), Some("医疗健康广告"));
        assert_eq!(category_label("unknown"), None);
    }
}

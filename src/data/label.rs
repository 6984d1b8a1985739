use std::fmt;

use super::model::{FieldValue, FlowFrame};

// ---------------------------------------------------------------------------
// LabelClass – the 3-way simplified label
// ---------------------------------------------------------------------------

/// Simplified label class for a flow record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LabelClass {
    Normal,
    Botnet,
    BotnetSpam,
}

impl LabelClass {
    pub const ALL: [LabelClass; 3] = [
        LabelClass::Normal,
        LabelClass::Botnet,
        LabelClass::BotnetSpam,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LabelClass::Normal => "normal",
            LabelClass::Botnet => "botnet",
            LabelClass::BotnetSpam => "botnet_spam",
        }
    }
}

impl fmt::Display for LabelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// LabelPolicy – free-text label → LabelClass
// ---------------------------------------------------------------------------

/// Substring-based label simplification. Matching is case-insensitive and
/// evaluated in order: botnet+spam, botnet, then the default class. The
/// default swallows explicit background/normal labels AND anything
/// unrecognized; it is a named field here rather than baked in so callers
/// can route unmatched labels elsewhere.
#[derive(Debug, Clone, Copy)]
pub struct LabelPolicy {
    pub default_class: LabelClass,
}

impl Default for LabelPolicy {
    fn default() -> Self {
        LabelPolicy {
            default_class: LabelClass::Normal,
        }
    }
}

impl LabelPolicy {
    pub fn classify(&self, raw: &str) -> LabelClass {
        let lower = raw.to_lowercase();
        if lower.contains("botnet") {
            if lower.contains("spam") {
                return LabelClass::BotnetSpam;
            }
            return LabelClass::Botnet;
        }
        self.default_class
    }

    /// Rewrite the `Label` column of a frame in place to the simplified
    /// class text. Rows without a label fall to the default class.
    pub fn simplify_frame(&self, frame: &mut FlowFrame) {
        for row in &mut frame.rows {
            let class = match row.get("Label") {
                Some(value) => self.classify(&value.encoding_key()),
                None => self.default_class,
            };
            row.insert(
                "Label".to_string(),
                FieldValue::String(class.as_str().to_string()),
            );
        }
        if !frame.columns.iter().any(|c| c == "Label") {
            frame.columns.push("Label".to_string());
            frame.columns.sort();
        }
    }
}

use serde::{Deserialize, Serialize};

pub const DEFAULT_TARGET_DURATION_MINUTES: u32 = 30;

/// Remote-assigned flow identity. Present only once the flow has been saved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FlowId(String);

impl FlowId {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("flow id must be non-empty".to_string());
        }
        if trimmed
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
        {
            return Ok(Self(trimmed.to_string()));
        }
        Err("flow id must use only ASCII letters, digits, '-' or '_'".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FlowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for FlowId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error as _;
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(|err| D::Error::custom(format!("invalid flow id `{raw}`: {err}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
    #[default]
    Both,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Both => "both",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "both" => Ok(Self::Both),
            _ => Err("side must be one of: left, right, both".to_string()),
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FlowStyle {
    #[default]
    Vinyasa,
    Hatha,
    Yin,
    Power,
    Restorative,
}

impl FlowStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vinyasa => "vinyasa",
            Self::Hatha => "hatha",
            Self::Yin => "yin",
            Self::Power => "power",
            Self::Restorative => "restorative",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "vinyasa" => Ok(Self::Vinyasa),
            "hatha" => Ok(Self::Hatha),
            "yin" => Ok(Self::Yin),
            "power" => Ok(Self::Power),
            "restorative" => Ok(Self::Restorative),
            _ => Err(
                "style must be one of: vinyasa, hatha, yin, power, restorative".to_string(),
            ),
        }
    }
}

impl std::fmt::Display for FlowStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FlowLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl FlowLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Err("level must be one of: beginner, intermediate, advanced".to_string()),
        }
    }
}

impl std::fmt::Display for FlowLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One step of the sequence. `local_id` is unique within the editing session
/// only and never crosses the wire; the remaining source fields are the
/// catalog snapshot taken when the item was added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowItem {
    pub local_id: String,
    pub source_item_id: String,
    pub source_item_slug: String,
    pub source_item_name: String,
    pub source_item_image: Option<String>,
    pub duration_seconds: u32,
    pub side: Side,
    pub notes: String,
}

/// The aggregate being edited. Item order in `items` is the sole ordering
/// signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flow {
    pub id: Option<FlowId>,
    pub title: String,
    pub style: FlowStyle,
    pub level: FlowLevel,
    pub target_duration_minutes: u32,
    pub items: Vec<FlowItem>,
}

impl Default for Flow {
    fn default() -> Self {
        Self {
            id: None,
            title: String::new(),
            style: FlowStyle::default(),
            level: FlowLevel::default(),
            target_duration_minutes: DEFAULT_TARGET_DURATION_MINUTES,
            items: Vec::new(),
        }
    }
}

impl Flow {
    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }

    pub fn total_duration_seconds(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.duration_seconds))
            .sum()
    }

    pub fn item_index(&self, local_id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.local_id == local_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_id_rejects_empty_and_invalid_characters() {
        assert!(FlowId::parse("").is_err());
        assert!(FlowId::parse("  ").is_err());
        assert!(FlowId::parse("abc/123").is_err());
        assert_eq!(FlowId::parse(" flow-42 ").expect("id").as_str(), "flow-42");
    }

    #[test]
    fn total_duration_sums_items() {
        let mut flow = Flow::default();
        assert_eq!(flow.total_duration_seconds(), 0);
        for seconds in [30, 45, 60] {
            flow.items.push(FlowItem {
                local_id: format!("item-{seconds}"),
                source_item_id: "pose".to_string(),
                source_item_slug: "pose".to_string(),
                source_item_name: "Pose".to_string(),
                source_item_image: None,
                duration_seconds: seconds,
                side: Side::Both,
                notes: String::new(),
            });
        }
        assert_eq!(flow.total_duration_seconds(), 135);
    }

    #[test]
    fn enum_parse_round_trips() {
        assert_eq!(Side::parse("Left").expect("side"), Side::Left);
        assert_eq!(FlowStyle::parse("yin").expect("style"), FlowStyle::Yin);
        assert_eq!(
            FlowLevel::parse("ADVANCED").expect("level"),
            FlowLevel::Advanced
        );
        assert!(Side::parse("middle").is_err());
    }
}

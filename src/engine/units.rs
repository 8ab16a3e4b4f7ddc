//! Unit registry - material categories and the conversion constants between them

use serde::{Deserialize, Serialize};

use crate::engine::error::ValidationError;

/// Board-type units consumed by one skid
pub const SKID_BOARD_UNITS: u32 = 1;

/// Block-type units consumed by one skid
pub const SKID_BLOCK_UNITS: u32 = 3;

/// Saw kerf (cm) assumed when neither the part nor the config sets one
pub const DEFAULT_KERF_MARGIN: f64 = 0.5;

/// Raw material category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawCategory {
    Board,
    Post,
    Nail,
    Fiber,
}

impl std::fmt::Display for RawCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawCategory::Board => write!(f, "board"),
            RawCategory::Post => write!(f, "post"),
            RawCategory::Nail => write!(f, "nail"),
            RawCategory::Fiber => write!(f, "fiber"),
        }
    }
}

impl std::str::FromStr for RawCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "board" => Ok(RawCategory::Board),
            "post" => Ok(RawCategory::Post),
            "nail" => Ok(RawCategory::Nail),
            "fiber" => Ok(RawCategory::Fiber),
            _ => Err(format!(
                "Invalid raw category: {}. Use board, post, nail, or fiber",
                s
            )),
        }
    }
}

/// Composite part category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartCategory {
    BoardType,
    BlockType,
    SkidType,
}

impl PartCategory {
    /// Cut parts come from a single raw material; the skid is assembled
    pub fn is_cut(self) -> bool {
        !matches!(self, PartCategory::SkidType)
    }

    /// Whether a cut part of this category may be cut from the given raw material
    pub fn accepts_raw_parent(self, raw: RawCategory) -> bool {
        match self {
            PartCategory::BoardType => raw == RawCategory::Board,
            PartCategory::BlockType => matches!(raw, RawCategory::Post | RawCategory::Board),
            PartCategory::SkidType => false,
        }
    }

    /// Units of this part consumed by one skid, if it is a skid input
    pub fn skid_units(self) -> Option<u32> {
        match self {
            PartCategory::BoardType => Some(SKID_BOARD_UNITS),
            PartCategory::BlockType => Some(SKID_BLOCK_UNITS),
            PartCategory::SkidType => None,
        }
    }
}

impl std::fmt::Display for PartCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartCategory::BoardType => write!(f, "board_type"),
            PartCategory::BlockType => write!(f, "block_type"),
            PartCategory::SkidType => write!(f, "skid_type"),
        }
    }
}

impl std::str::FromStr for PartCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "board_type" | "boardtype" => Ok(PartCategory::BoardType),
            "block_type" | "blocktype" => Ok(PartCategory::BlockType),
            "skid_type" | "skidtype" => Ok(PartCategory::SkidType),
            _ => Err(format!(
                "Invalid part category: {}. Use board_type, block_type, or skid_type",
                s
            )),
        }
    }
}

/// Kind of item a prototype BOM line can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    BoardType,
    BlockType,
    Nail,
    Fiber,
}

impl ItemKind {
    /// Nails are the only fastener category
    pub fn is_fastener(self) -> bool {
        self == ItemKind::Nail
    }

    /// Raw category this kind references, if it references a raw material
    pub fn raw_category(self) -> Option<RawCategory> {
        match self {
            ItemKind::Nail => Some(RawCategory::Nail),
            ItemKind::Fiber => Some(RawCategory::Fiber),
            _ => None,
        }
    }

    /// Part category this kind references, if it references a composite part
    pub fn part_category(self) -> Option<PartCategory> {
        match self {
            ItemKind::BoardType => Some(PartCategory::BoardType),
            ItemKind::BlockType => Some(PartCategory::BlockType),
            _ => None,
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::BoardType => write!(f, "board_type"),
            ItemKind::BlockType => write!(f, "block_type"),
            ItemKind::Nail => write!(f, "nail"),
            ItemKind::Fiber => write!(f, "fiber"),
        }
    }
}

impl std::str::FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "board_type" | "boardtype" | "board" => Ok(ItemKind::BoardType),
            "block_type" | "blocktype" | "block" => Ok(ItemKind::BlockType),
            "nail" => Ok(ItemKind::Nail),
            "fiber" => Ok(ItemKind::Fiber),
            _ => Err(format!(
                "Invalid item kind: {}. Use board_type, block_type, nail, or fiber",
                s
            )),
        }
    }
}

/// What a parent reference resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentKind {
    Raw(RawCategory),
    Part(PartCategory),
}

impl std::fmt::Display for ParentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParentKind::Raw(c) => write!(f, "raw {}", c),
            ParentKind::Part(c) => write!(f, "{}", c),
        }
    }
}

/// Check that a composite part's parents have the shape its category requires
///
/// Cut parts need exactly one raw parent of a compatible category. A skid
/// needs exactly one board-type and one block-type parent. Every parent must
/// consume a positive number of units.
pub fn check_parent_structure(
    category: PartCategory,
    parents: &[(ParentKind, u32)],
) -> Result<(), ValidationError> {
    if let Some((kind, _)) = parents.iter().find(|(_, units)| *units == 0) {
        return Err(ValidationError::field(
            "parents",
            format!("units consumed from parent {} must be a positive integer", kind),
        ));
    }

    if category.is_cut() {
        return match parents {
            [(ParentKind::Raw(raw), _)] if category.accepts_raw_parent(*raw) => Ok(()),
            [(kind, _)] => Err(ValidationError::field(
                "parents",
                format!("a {} cannot be cut from {}", category, kind),
            )),
            _ => Err(ValidationError::field(
                "parents",
                format!(
                    "a {} needs exactly one raw material parent, got {}",
                    category,
                    parents.len()
                ),
            )),
        };
    }

    let boards = parents
        .iter()
        .filter(|(k, _)| *k == ParentKind::Part(PartCategory::BoardType))
        .count();
    let blocks = parents
        .iter()
        .filter(|(k, _)| *k == ParentKind::Part(PartCategory::BlockType))
        .count();

    if parents.len() != 2 || boards != 1 || blocks != 1 {
        return Err(ValidationError::field(
            "parents",
            "a skid_type needs exactly one board_type and one block_type parent",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skid_ratio_constants() {
        assert_eq!(PartCategory::BoardType.skid_units(), Some(1));
        assert_eq!(PartCategory::BlockType.skid_units(), Some(3));
        assert_eq!(PartCategory::SkidType.skid_units(), None);
    }

    #[test]
    fn test_category_parsing_accepts_dashes() {
        assert_eq!("board-type".parse::<PartCategory>().unwrap(), PartCategory::BoardType);
        assert_eq!("SKID_TYPE".parse::<PartCategory>().unwrap(), PartCategory::SkidType);
        assert!("pallet".parse::<PartCategory>().is_err());
        assert_eq!("block".parse::<ItemKind>().unwrap(), ItemKind::BlockType);
    }

    #[test]
    fn test_item_kind_targets() {
        assert_eq!(ItemKind::Nail.raw_category(), Some(RawCategory::Nail));
        assert_eq!(ItemKind::Nail.part_category(), None);
        assert_eq!(ItemKind::BlockType.part_category(), Some(PartCategory::BlockType));
        assert!(ItemKind::Nail.is_fastener());
        assert!(!ItemKind::Fiber.is_fastener());
    }

    #[test]
    fn test_cut_part_structure() {
        let board = ParentKind::Raw(RawCategory::Board);
        let post = ParentKind::Raw(RawCategory::Post);
        let nail = ParentKind::Raw(RawCategory::Nail);

        assert!(check_parent_structure(PartCategory::BoardType, &[(board, 1)]).is_ok());
        assert!(check_parent_structure(PartCategory::BlockType, &[(post, 1)]).is_ok());
        assert!(check_parent_structure(PartCategory::BoardType, &[(post, 1)]).is_err());
        assert!(check_parent_structure(PartCategory::BlockType, &[(nail, 1)]).is_err());
        assert!(check_parent_structure(PartCategory::BoardType, &[]).is_err());
        assert!(check_parent_structure(PartCategory::BoardType, &[(board, 1), (board, 1)]).is_err());
    }

    #[test]
    fn test_skid_structure() {
        let bt = ParentKind::Part(PartCategory::BoardType);
        let kt = ParentKind::Part(PartCategory::BlockType);

        assert!(check_parent_structure(PartCategory::SkidType, &[(bt, 1), (kt, 3)]).is_ok());
        assert!(check_parent_structure(PartCategory::SkidType, &[(bt, 1)]).is_err());
        assert!(check_parent_structure(PartCategory::SkidType, &[(bt, 1), (bt, 1)]).is_err());

        let err = check_parent_structure(PartCategory::SkidType, &[(bt, 1), (kt, 0)]).unwrap_err();
        assert!(err.message.contains("positive integer"));
    }
}

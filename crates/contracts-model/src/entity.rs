//! Record types extracted from the procurement workbook.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the key column shared by every entity sheet.
pub const RELEASE_LINK: &str = "_link_release";

/// Name of the entity-local identifier column before renaming.
pub const ENTITY_LINK: &str = "_link";

/// One record type (sheet) of the source workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    TenderItems,
    Buyer,
    Tender,
    Awards,
    Suppliers,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::TenderItems,
        EntityKind::Buyer,
        EntityKind::Tender,
        EntityKind::Awards,
        EntityKind::Suppliers,
    ];

    /// Auxiliary tables joined onto tender items, in join order.
    pub const JOIN_ORDER: [EntityKind; 4] = [
        EntityKind::Buyer,
        EntityKind::Tender,
        EntityKind::Awards,
        EntityKind::Suppliers,
    ];

    /// Sheet name in the workbook, also the CSV file stem.
    pub fn sheet_name(self) -> &'static str {
        match self {
            Self::TenderItems => "tender_items",
            Self::Buyer => "buyer",
            Self::Tender => "tender",
            Self::Awards => "awards",
            Self::Suppliers => "suppliers",
        }
    }

    /// Short name used when suffixing colliding columns after a join.
    pub fn short_name(self) -> &'static str {
        match self {
            Self::TenderItems => "item",
            Self::Buyer => "buyer",
            Self::Tender => "tender",
            Self::Awards => "award",
            Self::Suppliers => "supplier",
        }
    }

    /// Suffix appended to colliding columns from this table (`_item`, `_buyer`, ...).
    pub fn join_suffix(self) -> String {
        format!("_{}", self.short_name())
    }

    /// Entity whose sheet is named exactly `name`. The split CSV takes the
    /// sheet name verbatim, so no case folding happens here.
    pub fn from_sheet_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.sheet_name() == name)
    }

    pub fn csv_file_name(self) -> String {
        format!("{}.csv", self.sheet_name())
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sheet_name())
    }
}

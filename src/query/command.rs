//! The parsed, schema-validated query handed to the SQL generator.

use super::criteria::Criteria;
use crate::schema::DataTypeCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "Asc",
            SortDirection::Desc => "Desc",
        }
    }
}

/// One sort key; earlier items sort first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortItem {
    pub path: String,
    pub direction: SortDirection,
}

/// Row limiting requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Paging {
    #[default]
    None,
    Take(u64),
    SkipTake { skip: u64, take: Option<u64> },
    /// Zero-based page index
    Page { index: u64, size: u64 },
    /// At most one row
    First,
    /// At most two rows, so the caller can detect a second match
    Single,
}

/// Row window derived from [`Paging`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLimit {
    Unbounded,
    Take(u64),
    Window { skip: u64, take: Option<u64> },
}

impl Paging {
    /// Skip/page windows need a deterministic order; plain takes do not
    pub fn requires_sort(self) -> bool {
        matches!(self, Paging::SkipTake { .. } | Paging::Page { .. })
    }

    pub fn row_limit(self) -> RowLimit {
        match self {
            Paging::None => RowLimit::Unbounded,
            Paging::Take(n) => RowLimit::Take(n),
            Paging::First => RowLimit::Take(1),
            Paging::Single => RowLimit::Take(2),
            Paging::SkipTake { skip, take } => RowLimit::Window { skip, take },
            Paging::Page { index, size } => RowLimit::Window {
                skip: index.saturating_mul(size),
                take: Some(size),
            },
        }
    }
}

/// What the caller wants back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cardinality {
    #[default]
    Enumerate,
    Any,
    Count,
    First,
    Single,
}

/// Load another structure by the id stored in one of this structure's members
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeSpec {
    /// Member of the queried structure holding the referenced id
    pub owner_path: String,
    pub owner_data_type: DataTypeCode,
    /// Name of the included structure type
    pub included_structure: String,
    /// Where the caller assigns the included JSON on the result
    pub target_path: String,
}

/// Criteria, sorting, paging, includes and cardinality for one query
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryCommand {
    criteria: Option<Criteria>,
    sorting: Vec<SortItem>,
    paging: Paging,
    includes: Vec<IncludeSpec>,
    cardinality: Cardinality,
}

impl QueryCommand {
    pub fn new(
        criteria: Option<Criteria>,
        sorting: Vec<SortItem>,
        paging: Paging,
        includes: Vec<IncludeSpec>,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            criteria,
            sorting,
            paging,
            includes,
            cardinality,
        }
    }

    pub fn criteria(&self) -> Option<&Criteria> {
        self.criteria.as_ref()
    }

    pub fn sorting(&self) -> &[SortItem] {
        &self.sorting
    }

    pub fn paging(&self) -> Paging {
        self.paging
    }

    pub fn includes(&self) -> &[IncludeSpec] {
        &self.includes
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn has_criteria(&self) -> bool {
        self.criteria.is_some()
    }

    pub fn has_sorting(&self) -> bool {
        !self.sorting.is_empty()
    }
}

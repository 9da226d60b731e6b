//! Index storage naming and layout.
//!
//! Every structure type owns one structure table holding the serialized JSON plus
//! index storage holding one row per indexed value. Index storage comes in two
//! layouts:
//!
//! - **Narrow**: one table per data category (`<Name>Integers`, `<Name>Strings`, ...),
//!   each with a single `value` column
//! - **Shared**: one `<Name>Indexes` table with one nullable column per category

pub mod ddl;

use crate::schema::DataTypeCode;
use serde::{Deserialize, Serialize};

pub const STRUCTURE_ID: &str = "structure_id";
pub const MEMBER_PATH: &str = "member_path";
pub const VALUE: &str = "value";
pub const JSON: &str = "json";
pub const UNIQUE_VALUE: &str = "unique_value";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexStorageLayout {
    Shared,
    #[default]
    Narrow,
}

/// Column of the shared index table holding values of `data_type`
pub fn shared_value_column(data_type: DataTypeCode) -> &'static str {
    match data_type {
        DataTypeCode::Integer | DataTypeCode::UnsignedInteger => "integer_value",
        DataTypeCode::Fractal => "fractal_value",
        DataTypeCode::Boolean => "bool_value",
        DataTypeCode::DateTime => "date_value",
        DataTypeCode::Guid => "guid_value",
        DataTypeCode::String | DataTypeCode::Enum => "string_value",
        DataTypeCode::Text => "text_value",
    }
}

/// Suffix of the narrow index table holding values of `data_type`
pub fn narrow_table_suffix(data_type: DataTypeCode) -> &'static str {
    match data_type {
        DataTypeCode::Integer | DataTypeCode::UnsignedInteger => "Integers",
        DataTypeCode::Fractal => "Fractals",
        DataTypeCode::Boolean => "Booleans",
        DataTypeCode::DateTime => "Dates",
        DataTypeCode::Guid => "Guids",
        DataTypeCode::String | DataTypeCode::Enum => "Strings",
        DataTypeCode::Text => "Texts",
    }
}

/// Table and column names for one structure type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageNames {
    structure_name: String,
}

impl StorageNames {
    pub fn new(structure_name: &str) -> Self {
        Self {
            structure_name: structure_name.to_string(),
        }
    }

    pub fn structure_table(&self) -> String {
        format!("{}Structure", self.structure_name)
    }

    pub fn shared_index_table(&self) -> String {
        format!("{}Indexes", self.structure_name)
    }

    pub fn uniques_table(&self) -> String {
        format!("{}Uniques", self.structure_name)
    }

    /// Index table holding values of `data_type` under `layout`
    pub fn index_table(&self, layout: IndexStorageLayout, data_type: DataTypeCode) -> String {
        match layout {
            IndexStorageLayout::Narrow => {
                format!("{}{}", self.structure_name, narrow_table_suffix(data_type))
            }
            IndexStorageLayout::Shared => self.shared_index_table(),
        }
    }

    /// Column holding values of `data_type` under `layout`
    pub fn value_column(layout: IndexStorageLayout, data_type: DataTypeCode) -> &'static str {
        match layout {
            IndexStorageLayout::Narrow => VALUE,
            IndexStorageLayout::Shared => shared_value_column(data_type),
        }
    }
}

//! Tests for #[derive(Structure)]

#![allow(dead_code)]

use std::collections::HashMap;

use structura::schema::StructureTypeConfig;
use structura::{
    DataTypeCode, DeclaredType, StructuraError, Structure, StructureSchemaBuilder, StructureType,
    UniqueMode,
};

#[derive(Structure)]
struct Address {
    street: String,
    zip: i32,
}

enum Status {
    Active,
    Closed,
}

#[derive(Structure)]
#[structure_name = "Customer"]
struct CustomerDocument {
    #[structure_id]
    id: uuid::Uuid,
    name: String,
    #[unique]
    customer_no: i32,
    #[unique = "per_query"]
    batch_code: String,
    #[enumeration]
    status: Status,
    #[member_name = "Born"]
    date_of_birth: Option<chrono::NaiveDateTime>,
    tags: Vec<String>,
    scores: HashMap<String, f64>,
    delivery_address: Address,
    #[skip]
    cached_label: std::cell::Cell<u8>,
}

#[derive(Structure)]
struct TreeNode {
    value: i32,
    children: Vec<TreeNode>,
}

#[derive(Structure)]
struct Invoice {
    total: rust_decimal::Decimal,
    paid: bool,
}

#[test]
fn test_structure_name_attribute() {
    assert_eq!(CustomerDocument::structure_name(), "Customer");
    assert_eq!(CustomerDocument::describe().name(), "Customer");
    assert_eq!(Address::structure_name(), "Address");
}

#[test]
fn test_id_member_not_listed_as_member() {
    let description = CustomerDocument::describe();
    let id = description.id_member().unwrap();
    assert_eq!(id.name(), "Id");
    assert!(matches!(id.declared(), DeclaredType::Scalar(name) if name == "Uuid"));
    assert!(description.members().iter().all(|m| m.name() != "Id"));
}

#[test]
fn test_member_names_are_pascal_case() {
    let description = CustomerDocument::describe();
    let names: Vec<_> = description.members().iter().map(|m| m.name()).collect();
    assert_eq!(
        names,
        vec![
            "Name",
            "CustomerNo",
            "BatchCode",
            "Status",
            "Born",
            "Tags",
            "Scores",
            "DeliveryAddress"
        ]
    );
}

#[test]
fn test_unique_attributes() {
    let description = CustomerDocument::describe();
    let mode = |name: &str| {
        description
            .members()
            .iter()
            .find(|m| m.name() == name)
            .map(|m| m.unique_mode())
    };
    assert_eq!(mode("CustomerNo"), Some(UniqueMode::PerType));
    assert_eq!(mode("BatchCode"), Some(UniqueMode::PerQuery));
    assert_eq!(mode("Name"), Some(UniqueMode::None));
}

#[test]
fn test_schema_from_derived_description() {
    let schema = StructureSchemaBuilder::default()
        .build_for::<CustomerDocument>(None)
        .unwrap();

    assert_eq!(schema.id_member().unwrap().data_type, DataTypeCode::Guid);
    assert_eq!(
        schema.paths().collect::<Vec<_>>(),
        vec!["Id", "Name", "CustomerNo", "BatchCode", "Status", "Born", "Tags", "Scores"]
    );
    assert_eq!(schema.member("Status").unwrap().data_type, DataTypeCode::Enum);

    let born = schema.member("Born").unwrap();
    assert_eq!(born.data_type, DataTypeCode::DateTime);
    assert!(born.nullable);

    let tags = schema.member("Tags").unwrap();
    assert!(tags.multi_valued);
    assert_eq!(tags.data_type, DataTypeCode::String);

    assert_eq!(schema.member("Scores").unwrap().data_type, DataTypeCode::Fractal);
    assert_eq!(schema.unique_constraints().len(), 2);
}

#[test]
fn test_nested_structure_flattened_when_configured() {
    let mut config = StructureTypeConfig::new();
    config.include_nested_members(true);
    let schema = StructureSchemaBuilder::default()
        .build_for::<CustomerDocument>(Some(&config))
        .unwrap();

    assert_eq!(
        schema.member("DeliveryAddress.Zip").unwrap().data_type,
        DataTypeCode::Integer
    );
    assert!(schema.contains("DeliveryAddress.Street"));
}

#[test]
fn test_self_referential_type_hits_depth_limit() {
    let schema = StructureSchemaBuilder::default()
        .build_for::<TreeNode>(None)
        .unwrap();
    assert_eq!(schema.paths().collect::<Vec<_>>(), vec!["Value"]);

    let mut config = StructureTypeConfig::new();
    config.include_nested_members(true);
    let err = StructureSchemaBuilder::default()
        .with_max_nesting_depth(3)
        .build_for::<TreeNode>(Some(&config))
        .unwrap_err();
    assert!(matches!(err, StructuraError::SchemaConfig(_)));
}

#[test]
fn test_decimal_and_bool_members() {
    let schema = StructureSchemaBuilder::default()
        .build_for::<Invoice>(None)
        .unwrap();
    assert!(schema.id_member().is_none());
    assert_eq!(schema.member("Total").unwrap().data_type, DataTypeCode::Fractal);
    assert_eq!(schema.member("Paid").unwrap().data_type, DataTypeCode::Boolean);
}

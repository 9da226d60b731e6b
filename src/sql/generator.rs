//! Db Query Generator: query command + schema → parameterized SQL.
//!
//! # Shape of the generated SQL
//!
//! Every referenced member path gets a join alias (`mem0`, `mem1`, ...) onto its index
//! table, assigned in first-seen order over the criteria and then over sort-only
//! paths. The filtered, sorted id selection is a `group by` subquery (`rs`) whenever
//! any join is present, so multi-valued members never duplicate result rows:
//!
//! ```sql
//! select s.json from [DocStructure] s
//! inner join (select s.structure_id, min(mem0.value) mem0 from [DocStructure] s
//!     left join [DocIntegers] mem0 on mem0.structure_id = s.structure_id
//!         and mem0.member_path = 'Int1'
//!     where ((mem0.value >= @p0) and (mem0.value <= @p1))
//!     group by s.structure_id) rs on rs.structure_id = s.structure_id
//! order by mem0 Asc;
//! ```
//!
//! Literals are always parameters; only member paths, which are validated
//! identifiers, are inlined.

use super::dialect::{Dialect, DialectTemplates, PagingStyle, TakeStyle};
use super::sql_query::{SqlParameter, SqlQuery};
use crate::error::{StructuraError, StructuraResult};
use crate::query::command::{Cardinality, QueryCommand, RowLimit, SortItem};
use crate::query::criteria::{CaseFunction, Criteria, LogicalOp, NullCheckKind, StringOperator};
use crate::schema::{IndexableMember, StructureSchema};
use crate::storage::{IndexStorageLayout, StorageNames, JSON, MEMBER_PATH, STRUCTURE_ID};
use crate::value::QueryValue;

/// Generates SQL for one dialect and index storage layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbQueryGenerator {
    templates: DialectTemplates,
    layout: IndexStorageLayout,
}

impl Default for DbQueryGenerator {
    fn default() -> Self {
        Self::new(Dialect::default(), IndexStorageLayout::default())
    }
}

/// What the outer query projects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Projection {
    Json,
    Ids,
}

/// Join alias onto the index table of one member path
struct JoinAlias<'s> {
    alias: String,
    member: &'s IndexableMember,
    left: bool,
}

impl DbQueryGenerator {
    pub fn new(dialect: Dialect, layout: IndexStorageLayout) -> Self {
        Self::from_templates(dialect.templates(), layout)
    }

    pub fn from_templates(templates: DialectTemplates, layout: IndexStorageLayout) -> Self {
        Self { templates, layout }
    }

    pub fn templates(&self) -> &DialectTemplates {
        &self.templates
    }

    pub fn layout(&self) -> IndexStorageLayout {
        self.layout
    }

    /// SQL for the command's cardinality
    ///
    /// # Errors
    ///
    /// - `UnknownMemberPath` when the command references a path missing from `schema`
    /// - `PagingRequiresSort` for skip/page windows without a sort order
    /// - `UnsupportedOperator` when a string operator has no mapping in the dialect
    pub fn generate(
        &self,
        command: &QueryCommand,
        schema: &StructureSchema,
    ) -> StructuraResult<SqlQuery> {
        let projection = match command.cardinality() {
            Cardinality::Count | Cardinality::Any => None,
            Cardinality::Enumerate | Cardinality::First | Cardinality::Single => {
                Some(Projection::Json)
            }
        };
        self.render(command, schema, projection)
    }

    /// Id-only variant of [`generate`](Self::generate): structure ids in sort order,
    /// without payload or includes
    pub fn generate_ids(
        &self,
        command: &QueryCommand,
        schema: &StructureSchema,
    ) -> StructuraResult<SqlQuery> {
        self.render(command, schema, Some(Projection::Ids))
    }

    fn render(
        &self,
        command: &QueryCommand,
        schema: &StructureSchema,
        projection: Option<Projection>,
    ) -> StructuraResult<SqlQuery> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "generate_sql",
            structure = schema.name(),
            dialect = %self.templates.dialect
        )
        .entered();

        let mut generation = Generation::new(self, command, schema, projection.is_some())?;
        let sql = match (projection, command.cardinality()) {
            (Some(projection), _) => generation.select(projection)?,
            (None, Cardinality::Any) => generation.exists()?,
            (None, _) => generation.count()?,
        };

        log::debug!(
            "Generated {} query for '{}' with {} join(s) and {} parameter(s)",
            self.templates.dialect,
            schema.name(),
            generation.aliases.len(),
            generation.parameters.len()
        );
        Ok(SqlQuery::new(sql, generation.parameters))
    }
}

/// State of one SQL rendering
struct Generation<'g> {
    generator: &'g DbQueryGenerator,
    command: &'g QueryCommand,
    schema: &'g StructureSchema,
    names: StorageNames,
    aliases: Vec<(String, JoinAlias<'g>)>,
    /// Sort items that apply to this rendering; empty for count/exists
    sorting: &'g [SortItem],
    parameters: Vec<SqlParameter>,
}

impl<'g> Generation<'g> {
    fn new(
        generator: &'g DbQueryGenerator,
        command: &'g QueryCommand,
        schema: &'g StructureSchema,
        sorted: bool,
    ) -> StructuraResult<Self> {
        let sorting = if sorted { command.sorting() } else { &[] };
        if sorted && command.paging().requires_sort() && sorting.is_empty() {
            return Err(StructuraError::PagingRequiresSort {
                structure: schema.name().to_string(),
            });
        }

        let mut paths: Vec<&str> = command
            .criteria()
            .map(Criteria::paths)
            .unwrap_or_default();
        for item in sorting {
            if !paths.contains(&item.path.as_str()) {
                paths.push(&item.path);
            }
        }

        let aliases = paths
            .into_iter()
            .enumerate()
            .map(|(i, path)| {
                let member = schema
                    .member(path)
                    .ok_or_else(|| StructuraError::unknown_member(schema.name(), path))?;
                let left = match generator.layout {
                    IndexStorageLayout::Narrow => true,
                    IndexStorageLayout::Shared => command
                        .criteria()
                        .is_some_and(|c| c.has_null_check_on(path)),
                };
                Ok((
                    path.to_string(),
                    JoinAlias {
                        alias: format!("mem{i}"),
                        member,
                        left,
                    },
                ))
            })
            .collect::<StructuraResult<Vec<_>>>()?;

        Ok(Self {
            generator,
            command,
            schema,
            names: StorageNames::new(schema.name()),
            aliases,
            sorting,
            parameters: Vec::new(),
        })
    }

    fn templates(&self) -> &DialectTemplates {
        &self.generator.templates
    }

    fn push_parameter(&mut self, value: QueryValue) -> String {
        let name = self.templates().param_name(self.parameters.len());
        self.parameters.push(SqlParameter {
            name: name.clone(),
            value,
        });
        name
    }

    fn alias(&self, path: &str) -> StructuraResult<&JoinAlias<'g>> {
        self.aliases
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, alias)| alias)
            .ok_or_else(|| StructuraError::unknown_member(self.schema.name(), path))
    }

    /// `memN.value`, or the category column under the shared layout
    fn value_column(&self, path: &str) -> StructuraResult<String> {
        let alias = self.alias(path)?;
        Ok(format!(
            "{}.{}",
            alias.alias,
            StorageNames::value_column(self.generator.layout, alias.member.data_type)
        ))
    }

    fn cased_column(&self, path: &str, case: Option<CaseFunction>) -> StructuraResult<String> {
        let column = self.value_column(path)?;
        Ok(match case {
            Some(case) => format!("{}({column})", self.templates().case_function(case)),
            None => column,
        })
    }

    fn criteria_fragment(&mut self, criteria: &Criteria) -> StructuraResult<String> {
        match criteria {
            Criteria::Logical { op, children } => {
                if children.is_empty() {
                    return Ok(match op {
                        LogicalOp::And => "(1 = 1)".to_string(),
                        LogicalOp::Or => "(1 = 0)".to_string(),
                    });
                }
                let parts = children
                    .iter()
                    .map(|child| self.criteria_fragment(child))
                    .collect::<StructuraResult<Vec<_>>>()?;
                Ok(format!("({})", parts.join(&format!(" {} ", op.as_sql()))))
            }
            Criteria::Comparison {
                path,
                op,
                value,
                case,
            } => {
                let column = self.cased_column(path, *case)?;
                let parameter = self.push_parameter(value.clone());
                Ok(format!("({column} {} {parameter})", op.as_sql()))
            }
            Criteria::NullCheck { path, check } => {
                let column = self.value_column(path)?;
                Ok(match check {
                    NullCheckKind::IsNull => format!("({column} is null)"),
                    NullCheckKind::IsNotNull => format!("({column} is not null)"),
                })
            }
            Criteria::StringOp {
                path,
                op,
                literal,
                case,
                negated,
            } => {
                let operator = self
                    .templates()
                    .string_operator(*op, *negated)
                    .ok_or_else(|| StructuraError::UnsupportedOperator {
                        dialect: self.templates().dialect.to_string(),
                        operator: op.name().to_string(),
                    })?;
                let pattern = match op {
                    StringOperator::StartsWith => format!("{literal}%"),
                    StringOperator::EndsWith => format!("%{literal}"),
                    StringOperator::Contains => format!("%{literal}%"),
                    StringOperator::Like | StringOperator::Matches => literal.clone(),
                };
                let column = self.cased_column(path, *case)?;
                let parameter = self.push_parameter(QueryValue::from(pattern));
                Ok(format!("({column} {operator} {parameter})"))
            }
            Criteria::SetMembership {
                path,
                values,
                negated,
            } => {
                if values.is_empty() {
                    return Ok(if *negated { "(1 = 1)" } else { "(1 = 0)" }.to_string());
                }
                let column = self.value_column(path)?;
                let parameters = values
                    .iter()
                    .map(|v| self.push_parameter(v.clone()))
                    .collect::<Vec<_>>();
                let operator = if *negated { "not in" } else { "in" };
                Ok(format!("({column} {operator} ({}))", parameters.join(", ")))
            }
        }
    }

    fn where_clause(&mut self) -> StructuraResult<String> {
        let command = self.command;
        match command.criteria() {
            Some(criteria) => Ok(format!(" where {}", self.criteria_fragment(criteria)?)),
            None => Ok(String::new()),
        }
    }

    fn structure_table(&self) -> String {
        self.templates().quote(&self.names.structure_table())
    }

    fn joins(&self) -> String {
        self.aliases
            .iter()
            .map(|(path, alias)| {
                let table = self
                    .templates()
                    .quote(&self.names.index_table(self.generator.layout, alias.member.data_type));
                format!(
                    " {kind} join {table} {a} on {a}.{STRUCTURE_ID} = s.{STRUCTURE_ID} and {a}.{MEMBER_PATH} = '{path}'",
                    kind = if alias.left { "left" } else { "inner" },
                    a = alias.alias,
                    path = path.replace('\'', "''"),
                )
            })
            .collect()
    }

    fn sort_aggregates(&self) -> StructuraResult<Vec<(String, &'g SortItem)>> {
        let sorting = self.sorting;
        sorting
            .iter()
            .map(|item| Ok((format!("min({})", self.value_column(&item.path)?), item)))
            .collect()
    }

    /// The filtered id selection; grouped so multi-valued members yield one row per structure
    fn id_subquery(&mut self, row_number: bool) -> StructuraResult<String> {
        let mut select = format!("select s.{STRUCTURE_ID}");
        let aggregates = self.sort_aggregates()?;
        for (i, (aggregate, _)) in aggregates.iter().enumerate() {
            select.push_str(&format!(", {aggregate} mem{i}"));
        }
        if row_number {
            let order = aggregates
                .iter()
                .map(|(aggregate, item)| format!("{aggregate} {}", item.direction.as_sql()))
                .collect::<Vec<_>>()
                .join(", ");
            select.push_str(&format!(", row_number() over (order by {order}) rownum"));
        }
        let table = self.structure_table();
        let joins = self.joins();
        let where_clause = self.where_clause()?;
        Ok(format!(
            "{select} from {table} s{joins}{where_clause} group by s.{STRUCTURE_ID}"
        ))
    }

    fn select(&mut self, projection: Projection) -> StructuraResult<String> {
        let limit = self.command.paging().row_limit();
        let row_number = matches!(limit, RowLimit::Window { .. })
            && self.templates().paging == PagingStyle::RowNumber;
        let grouped = !self.aliases.is_empty();

        let subquery = if grouped {
            Some(self.id_subquery(row_number)?)
        } else {
            None
        };
        let where_clause = if grouped {
            String::new()
        } else {
            self.where_clause()?
        };

        let mut sql = String::from("select ");
        if let (RowLimit::Take(n), TakeStyle::Top) = (limit, self.templates().take) {
            let parameter = self.push_parameter(limit_value(n));
            sql.push_str(&format!("top({parameter}) "));
        }
        match projection {
            Projection::Json => sql.push_str(&format!("s.{JSON}")),
            Projection::Ids => sql.push_str(&format!("s.{STRUCTURE_ID}")),
        }
        let includes = if projection == Projection::Json {
            self.include_joins(&mut sql)?
        } else {
            String::new()
        };

        sql.push_str(&format!(" from {} s", self.structure_table()));
        if let Some(subquery) = subquery {
            sql.push_str(&format!(
                " inner join ({subquery}) rs on rs.{STRUCTURE_ID} = s.{STRUCTURE_ID}"
            ));
        }
        sql.push_str(&includes);
        sql.push_str(&where_clause);

        if row_number {
            if let RowLimit::Window { skip, take } = limit {
                let from = self.push_parameter(limit_value(skip.saturating_add(1)));
                match take {
                    Some(take) => {
                        let to = self.push_parameter(limit_value(skip.saturating_add(take)));
                        sql.push_str(&format!(" where rs.rownum between {from} and {to}"));
                    }
                    None => sql.push_str(&format!(" where rs.rownum >= {from}")),
                }
            }
        }

        if !self.sorting.is_empty() {
            let order = self
                .sorting
                .iter()
                .enumerate()
                .map(|(i, item)| format!("mem{i} {}", item.direction.as_sql()))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(&format!(" order by {order}"));
        }

        self.row_limit_suffix(&mut sql, limit, row_number);
        sql.push(';');
        Ok(sql)
    }

    fn row_limit_suffix(&mut self, sql: &mut String, limit: RowLimit, row_number: bool) {
        let paging = self.templates().paging;
        match limit {
            RowLimit::Unbounded => {}
            RowLimit::Take(n) => {
                if self.templates().take == TakeStyle::Limit {
                    let parameter = self.push_parameter(limit_value(n));
                    sql.push_str(&format!(" limit {parameter}"));
                }
            }
            RowLimit::Window { skip, take } => match paging {
                PagingStyle::RowNumber => debug_assert!(row_number),
                PagingStyle::OffsetFetch => {
                    let offset = self.push_parameter(limit_value(skip));
                    sql.push_str(&format!(" offset {offset} rows"));
                    if let Some(take) = take {
                        let fetch = self.push_parameter(limit_value(take));
                        sql.push_str(&format!(" fetch next {fetch} rows only"));
                    }
                }
                PagingStyle::LimitOffset => {
                    let limit = match (take, self.templates().unbounded_limit) {
                        (Some(take), _) => Some(self.push_parameter(limit_value(take))),
                        (None, Some(unbounded)) => Some(unbounded.to_string()),
                        (None, None) => None,
                    };
                    if let Some(limit) = limit {
                        sql.push_str(&format!(" limit {limit}"));
                    }
                    let offset = self.push_parameter(limit_value(skip));
                    sql.push_str(&format!(" offset {offset}"));
                }
            },
        }
    }

    /// Adds include projections to `select`, returns the include joins
    fn include_joins(&self, select: &mut String) -> StructuraResult<String> {
        let mut joins = String::new();
        for (i, include) in self.command.includes().iter().enumerate() {
            let owner = self
                .schema
                .member(&include.owner_path)
                .ok_or_else(|| StructuraError::unknown_member(self.schema.name(), &include.owner_path))?;
            let owner_table = self
                .templates()
                .quote(&self.names.index_table(self.generator.layout, owner.data_type));
            let owner_column = StorageNames::value_column(self.generator.layout, owner.data_type);
            let included_table = self
                .templates()
                .quote(&StorageNames::new(&include.included_structure).structure_table());

            select.push_str(&format!(", inc{i}.{JSON} inc{i}_json"));
            joins.push_str(&format!(
                " left join {owner_table} incm{i} on incm{i}.{STRUCTURE_ID} = s.{STRUCTURE_ID} and incm{i}.{MEMBER_PATH} = '{path}' \
                 left join {included_table} inc{i} on inc{i}.{STRUCTURE_ID} = incm{i}.{owner_column}",
                path = include.owner_path.replace('\'', "''"),
            ));
        }
        Ok(joins)
    }

    fn count(&mut self) -> StructuraResult<String> {
        if self.aliases.is_empty() {
            let where_clause = self.where_clause()?;
            return Ok(format!(
                "select count(*) from {} s{where_clause};",
                self.structure_table()
            ));
        }
        let subquery = self.id_subquery(false)?;
        Ok(format!("select count(*) from ({subquery}) rs;"))
    }

    fn exists(&mut self) -> StructuraResult<String> {
        let inner = if self.aliases.is_empty() {
            let where_clause = self.where_clause()?;
            format!(
                "select s.{STRUCTURE_ID} from {} s{where_clause}",
                self.structure_table()
            )
        } else {
            self.id_subquery(false)?
        };
        Ok(format!("select case when exists ({inner}) then 1 else 0 end;"))
    }
}

fn limit_value(n: u64) -> QueryValue {
    QueryValue::BigInt(i64::try_from(n).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::expr::member;
    use crate::query::QueryBuilder;
    use crate::schema::{DeclaredType, MemberDescription, StructureDescription, StructureSchemaBuilder};

    fn schema() -> StructureSchema {
        let description = StructureDescription::new("Doc")
            .member(MemberDescription::new("Int1", DeclaredType::scalar("i32")))
            .member(MemberDescription::new("String1", DeclaredType::scalar("String")))
            .member(MemberDescription::new(
                "Maybe",
                DeclaredType::nullable(DeclaredType::scalar("i32")),
            ))
            .member(MemberDescription::new(
                "Tags",
                DeclaredType::collection(DeclaredType::scalar("String")),
            ));
        StructureSchemaBuilder::default()
            .build(&description, None)
            .unwrap()
    }

    fn generate(dialect: Dialect, layout: IndexStorageLayout, builder: QueryBuilder) -> StructuraResult<SqlQuery> {
        let schema = schema();
        let command = builder.build(&schema)?;
        DbQueryGenerator::new(dialect, layout).generate(&command, &schema)
    }

    #[test]
    fn test_range_criteria() {
        let query = generate(
            Dialect::SqlServer2008,
            IndexStorageLayout::Narrow,
            QueryBuilder::new().filter(member("Int1").gte(40).and(member("Int1").lte(42))),
        )
        .unwrap();
        assert_eq!(
            query.sql(),
            "select s.json from [DocStructure] s inner join (select s.structure_id from [DocStructure] s \
             left join [DocIntegers] mem0 on mem0.structure_id = s.structure_id and mem0.member_path = 'Int1' \
             where ((mem0.value >= @p0) and (mem0.value <= @p1)) group by s.structure_id) rs \
             on rs.structure_id = s.structure_id;"
        );
        assert_eq!(query.parameter("@p0"), Some(&QueryValue::from(40)));
        assert_eq!(query.parameter("@p1"), Some(&QueryValue::from(42)));
    }

    #[test]
    fn test_no_criteria_no_sort_has_no_subquery() {
        let query = generate(Dialect::Postgres, IndexStorageLayout::Narrow, QueryBuilder::new()).unwrap();
        assert_eq!(query.sql(), "select s.json from \"DocStructure\" s;");
        assert!(query.parameters().is_empty());
    }

    #[test]
    fn test_shared_layout_inner_join_unless_null_check() {
        let query = generate(
            Dialect::SqlServer2012,
            IndexStorageLayout::Shared,
            QueryBuilder::new().filter(member("Int1").eq(1).and(member("Maybe").is_null())),
        )
        .unwrap();
        assert!(query.sql().contains(
            "inner join [DocIndexes] mem0 on mem0.structure_id = s.structure_id and mem0.member_path = 'Int1'"
        ));
        assert!(query.sql().contains(
            "left join [DocIndexes] mem1 on mem1.structure_id = s.structure_id and mem1.member_path = 'Maybe'"
        ));
        assert!(query
            .sql()
            .contains("where ((mem0.integer_value = @p0) and (mem1.integer_value is null))"));
    }

    #[test]
    fn test_take_uses_top_on_sql_server() {
        let query = generate(
            Dialect::SqlServer2008,
            IndexStorageLayout::Narrow,
            QueryBuilder::new().filter(member("Int1").eq(3)).take(5),
        )
        .unwrap();
        assert!(query.sql().starts_with("select top(@p1) s.json from [DocStructure] s"));
        assert_eq!(query.parameter("@p0"), Some(&QueryValue::from(3)));
        assert_eq!(query.parameter("@p1"), Some(&QueryValue::BigInt(5)));
    }

    #[test]
    fn test_take_uses_limit_on_postgres() {
        let query = generate(
            Dialect::Postgres,
            IndexStorageLayout::Narrow,
            QueryBuilder::new().filter(member("Int1").eq(3)).first(),
        )
        .unwrap();
        assert!(query.sql().ends_with("rs on rs.structure_id = s.structure_id limit $2;"));
        assert!(query.sql().contains("(mem0.value = $1)"));
        assert_eq!(query.parameters()[1].value, QueryValue::BigInt(1));
    }

    #[test]
    fn test_page_row_number_on_sql_server_2008() {
        let query = generate(
            Dialect::SqlServer2008,
            IndexStorageLayout::Narrow,
            QueryBuilder::new().order_by_asc(member("Int1")).page(1, 7),
        )
        .unwrap();
        assert_eq!(
            query.sql(),
            "select s.json from [DocStructure] s inner join (select s.structure_id, min(mem0.value) mem0, \
             row_number() over (order by min(mem0.value) Asc) rownum from [DocStructure] s \
             left join [DocIntegers] mem0 on mem0.structure_id = s.structure_id and mem0.member_path = 'Int1' \
             group by s.structure_id) rs on rs.structure_id = s.structure_id \
             where rs.rownum between @p0 and @p1 order by mem0 Asc;"
        );
        assert_eq!(query.parameter("@p0"), Some(&QueryValue::BigInt(8)));
        assert_eq!(query.parameter("@p1"), Some(&QueryValue::BigInt(14)));
    }

    #[test]
    fn test_skip_take_offset_fetch_on_sql_server_2012() {
        let query = generate(
            Dialect::SqlServer2012,
            IndexStorageLayout::Narrow,
            QueryBuilder::new().order_by_desc(member("String1")).skip(10).take(5),
        )
        .unwrap();
        assert!(query
            .sql()
            .ends_with("order by mem0 Desc offset @p0 rows fetch next @p1 rows only;"));
    }

    #[test]
    fn test_skip_without_take_on_sqlite() {
        let query = generate(
            Dialect::Sqlite,
            IndexStorageLayout::Narrow,
            QueryBuilder::new().order_by_asc(member("Int1")).skip(3),
        )
        .unwrap();
        assert!(query.sql().ends_with("order by mem0 Asc limit -1 offset @p0;"));
        assert_eq!(query.parameters().len(), 1);
    }

    #[test]
    fn test_paging_requires_sort() {
        let err = generate(
            Dialect::Postgres,
            IndexStorageLayout::Narrow,
            QueryBuilder::new().page(1, 7),
        )
        .unwrap_err();
        assert_eq!(
            err,
            StructuraError::PagingRequiresSort {
                structure: "Doc".to_string()
            }
        );
    }

    #[test]
    fn test_regex_unsupported_on_sql_server() {
        let err = generate(
            Dialect::SqlServer2008,
            IndexStorageLayout::Narrow,
            QueryBuilder::new().filter(member("String1").matches("^a")),
        )
        .unwrap_err();
        assert!(matches!(err, StructuraError::UnsupportedOperator { .. }));

        let query = generate(
            Dialect::Postgres,
            IndexStorageLayout::Narrow,
            QueryBuilder::new().filter(member("String1").matches("^a")),
        )
        .unwrap();
        assert!(query.sql().contains("(mem0.value ~ $1)"));
    }

    #[test]
    fn test_empty_set_membership() {
        let query = generate(
            Dialect::SqlServer2008,
            IndexStorageLayout::Narrow,
            QueryBuilder::new().filter(member("Int1").is_in(Vec::<i32>::new())),
        )
        .unwrap();
        assert!(query.sql().contains("where (1 = 0)"));

        let query = generate(
            Dialect::SqlServer2008,
            IndexStorageLayout::Narrow,
            QueryBuilder::new().filter(member("Int1").is_not_in(Vec::<i32>::new())),
        )
        .unwrap();
        assert!(query.sql().contains("where (1 = 1)"));
    }

    #[test]
    fn test_set_membership_parameters() {
        let query = generate(
            Dialect::SqlServer2008,
            IndexStorageLayout::Narrow,
            QueryBuilder::new().filter(member("Tags").is_in(["a", "b"])),
        )
        .unwrap();
        assert!(query.sql().contains("left join [DocStrings] mem0"));
        assert!(query.sql().contains("(mem0.value in (@p0, @p1))"));
    }

    #[test]
    fn test_case_function_wraps_column() {
        let query = generate(
            Dialect::Sqlite,
            IndexStorageLayout::Narrow,
            QueryBuilder::new().filter(member("String1").to_upper().starts_with("ab")),
        )
        .unwrap();
        assert!(query.sql().contains("(upper(mem0.value) like @p0)"));
        assert_eq!(query.parameter("@p0"), Some(&QueryValue::from("AB%")));
    }

    #[test]
    fn test_count_ignores_paging_and_sorting() {
        let query = generate(
            Dialect::SqlServer2008,
            IndexStorageLayout::Narrow,
            QueryBuilder::new()
                .filter(member("Int1").gt(1))
                .order_by_asc(member("String1"))
                .page(0, 10)
                .count(),
        )
        .unwrap();
        assert_eq!(
            query.sql(),
            "select count(*) from (select s.structure_id from [DocStructure] s \
             left join [DocIntegers] mem0 on mem0.structure_id = s.structure_id and mem0.member_path = 'Int1' \
             where (mem0.value > @p0) group by s.structure_id) rs;"
        );
        assert_eq!(query.parameters().len(), 1);
    }

    #[test]
    fn test_any_without_criteria() {
        let query = generate(Dialect::Postgres, IndexStorageLayout::Narrow, QueryBuilder::new().any()).unwrap();
        assert_eq!(
            query.sql(),
            "select case when exists (select s.structure_id from \"DocStructure\" s) then 1 else 0 end;"
        );
    }

    #[test]
    fn test_generate_ids() {
        let schema = schema();
        let command = QueryBuilder::new()
            .filter(member("Int1").eq(1))
            .order_by_asc(member("String1"))
            .build(&schema)
            .unwrap();
        let query = DbQueryGenerator::default().generate_ids(&command, &schema).unwrap();
        assert!(query.sql().starts_with("select s.structure_id from [DocStructure] s inner join (select s.structure_id, min(mem1.value) mem0 from"));
        assert!(query.sql().ends_with("order by mem0 Asc;"));
    }

    #[test]
    fn test_include_joins() {
        let description = StructureDescription::new("Order")
            .member(MemberDescription::new("CustomerId", DeclaredType::scalar("Uuid")));
        let schema = StructureSchemaBuilder::default().build(&description, None).unwrap();
        let command = QueryBuilder::new()
            .include("Customer", member("CustomerId"), "Customer")
            .build(&schema)
            .unwrap();
        let query = DbQueryGenerator::default().generate(&command, &schema).unwrap();
        assert_eq!(
            query.sql(),
            "select s.json, inc0.json inc0_json from [OrderStructure] s \
             left join [OrderGuids] incm0 on incm0.structure_id = s.structure_id and incm0.member_path = 'CustomerId' \
             left join [CustomerStructure] inc0 on inc0.structure_id = incm0.value;"
        );
    }

    #[test]
    fn test_generation_is_deterministic() {
        let build = || {
            generate(
                Dialect::SqlServer2008,
                IndexStorageLayout::Narrow,
                QueryBuilder::new()
                    .filter(member("String1").contains("x").or(member("Int1").lt(4)))
                    .order_by_desc(member("Int1")),
            )
            .unwrap()
        };
        assert_eq!(build(), build());
    }
}

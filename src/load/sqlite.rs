//! A thin wrapper over one SQLite connection: table lifecycle, ad-hoc schema changes,
//! row insertion and querying.
//!
//! Two query shapes coexist here:
//!
//! - [`Store::select`], [`Store::update`] and [`Store::delete`] splice caller-supplied SQL
//!   fragments straight into the statement. They are **not** injection-safe; never pass
//!   them untrusted text.
//! - [`Store::filter`] builds its WHERE clause from bound parameters and is safe for values.
//!
//! Table and column names are interpolated everywhere and must always be trusted.

use crate::SqlValue;
use crate::error::{EtlError, EtlResult, SchemaError};
use rusqlite::{Connection, Params, params_from_iter};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, error, trace, warn};

/// SQLite's default cap on bound parameters per statement.
const MAX_PARAMS: usize = 32_766;

/// Provide a SQL mapping for a row.
///
/// `sql_columns()` and `sql_map()` must line up one-to-one. Derive it with
/// [`opensea_etl::SqlMap`](crate::SqlMap) for structs with named fields.
pub trait SqlMap {
    fn sql_columns(&self) -> Vec<&str>;
    fn sql_map(&self) -> Vec<SqlValue>;
}

impl SqlMap for BTreeMap<String, SqlValue> {
    fn sql_columns(&self) -> Vec<&str> {
        self.keys().map(String::as_str).collect()
    }

    fn sql_map(&self) -> Vec<SqlValue> {
        self.values().cloned().collect()
    }
}

/// Conversion of a field into an owned SQLite value.
pub trait ToSqlValue {
    fn to_sql_value(&self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(&self) -> SqlValue {
        self.clone()
    }
}

impl ToSqlValue for String {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text((*self).to_string())
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Integer(*self)
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Real(*self)
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Integer(i64::from(*self))
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(&self) -> SqlValue {
        self.as_ref().map_or(SqlValue::Null, ToSqlValue::to_sql_value)
    }
}

/// JSON scalars map onto their SQLite counterparts; arrays and objects are stored as JSON text.
impl ToSqlValue for serde_json::Value {
    fn to_sql_value(&self) -> SqlValue {
        use serde_json::Value;
        match self {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => b.to_sql_value(),
            Value::Number(n) => match n.as_i64() {
                Some(i) => SqlValue::Integer(i),
                None => n.as_f64().map_or(SqlValue::Null, SqlValue::Real),
            },
            Value::String(s) => SqlValue::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => SqlValue::Text(self.to_string()),
        }
    }
}

/// One row of a query result, values in column order.
pub type Record = Vec<SqlValue>;

/// One line of `PRAGMA table_info`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub not_null: bool,
    pub default: Option<String>,
    /// 1-based position within the primary key, 0 if not part of it.
    pub primary_key: i64,
}

impl ColumnInfo {
    fn definition(&self, single_pk: bool) -> String {
        let mut def = format!("{} {}", self.name, self.data_type);
        if single_pk && self.primary_key > 0 {
            def.push_str(" PRIMARY KEY");
        }
        if self.not_null {
            def.push_str(" NOT NULL");
        }
        if let Some(default) = &self.default {
            def.push_str(" DEFAULT ");
            def.push_str(default);
        }
        def
    }
}

/// Clause fragments for [`Store::select`].
///
/// Every fragment is spliced into the statement verbatim.
#[derive(Debug, Clone, Default)]
pub struct Select<'a> {
    columns: Option<&'a str>,
    where_clause: Option<&'a str>,
    order_by: Option<&'a str>,
    limit: Option<u64>,
    distinct: bool,
}

impl<'a> Select<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Column list; `*` when unset.
    pub fn columns(mut self, columns: &'a str) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn where_clause(mut self, where_clause: &'a str) -> Self {
        self.where_clause = Some(where_clause);
        self
    }

    pub fn order_by(mut self, order_by: &'a str) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    fn to_sql(&self, table: &str) -> String {
        let mut query = vec!["SELECT".to_string()];
        if self.distinct {
            query.push("DISTINCT".to_string());
        }
        query.push(format!("{} FROM {table}", self.columns.unwrap_or("*")));

        if let Some(where_clause) = self.where_clause {
            query.push(format!("WHERE {where_clause}"));
        }
        if let Some(order_by) = self.order_by {
            query.push(format!("ORDER BY {order_by}"));
        }
        if let Some(limit) = self.limit {
            query.push(format!("LIMIT {limit}"));
        }
        query.join(" ")
    }
}

/// A value to match in [`Store::filter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Equality, or a LIKE match when the value is text containing `%`.
    Value(SqlValue),
    /// Membership: `column IN (...)`.
    List(Vec<SqlValue>),
}

impl<T: ToSqlValue> From<T> for Condition {
    fn from(value: T) -> Self {
        Condition::Value(value.to_sql_value())
    }
}

impl<T: ToSqlValue> From<Vec<T>> for Condition {
    fn from(values: Vec<T>) -> Self {
        Condition::List(values.iter().map(ToSqlValue::to_sql_value).collect())
    }
}

const WILDCARD: char = '%';

/// How the clauses of a [`Store::filter`] are joined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Operator {
    #[default]
    And,
    Or,
}

impl Operator {
    fn as_sql(self) -> &'static str {
        match self {
            Operator::And => " AND ",
            Operator::Or => " OR ",
        }
    }
}

/// Translate a LIKE pattern into the equivalent GLOB pattern, which SQLite always matches
/// case-sensitively.
fn like_to_glob(pattern: &str) -> String {
    let mut glob = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        match c {
            '%' => glob.push('*'),
            '_' => glob.push('?'),
            '*' | '?' | '[' => {
                glob.push('[');
                glob.push(c);
                glob.push(']');
            }
            c => glob.push(c),
        }
    }
    glob
}

/// Owns one SQLite connection for the life of a run.
///
/// The connection is released when the store is dropped, so early returns and `?` never leak
/// it; [`Store::close`] does the same but reports errors from the engine.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (creating if needed) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> EtlResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            error!(path = %path.display(), "Failed to open database: {e}");
            e
        })?;
        debug!(path = %path.display(), "database opened");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> EtlResult<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Release the connection, surfacing any error the engine reports while closing.
    pub fn close(self) -> EtlResult<()> {
        self.conn.close().map_err(|(_, e)| {
            error!("Failed to close database: {e}");
            EtlError::Store(e)
        })
    }

    /// Roll back an open transaction; does nothing in autocommit mode.
    pub fn rollback(&self) -> EtlResult<()> {
        if self.conn.is_autocommit() {
            trace!("no open transaction to roll back");
            return Ok(());
        }
        warn!("rolling back open transaction");
        self.execute("ROLLBACK", [])?;
        Ok(())
    }

    fn execute<P: Params>(&self, stmt: &str, params: P) -> EtlResult<usize> {
        trace!(stmt = %stmt, "executing");
        let changed = self.conn.execute(stmt, params).map_err(|e| {
            error!(stmt = %stmt, "{e}");
            e
        })?;
        Ok(changed)
    }

    fn query<P: Params>(&self, stmt: &str, params: P) -> EtlResult<Vec<Record>> {
        trace!(stmt = %stmt, "querying");
        let mut prepared = self.conn.prepare(stmt).map_err(|e| {
            error!(stmt = %stmt, "Failed to prepare: {e}");
            e
        })?;
        let width = prepared.column_count();
        let rows = prepared
            .query_map(params, |row| {
                (0..width)
                    .map(|i| row.get::<_, SqlValue>(i))
                    .collect::<rusqlite::Result<Record>>()
            })?
            .collect::<Result<Vec<Record>, _>>()?;
        Ok(rows)
    }

    // Database/Table Management

    /// `CREATE TABLE IF NOT EXISTS`; a second call with the same name changes nothing.
    pub fn create_table(&self, table: &str, schema: &str) -> EtlResult<()> {
        self.execute(&format!("CREATE TABLE IF NOT EXISTS {table} ({schema})"), [])?;
        debug!(table = %table, "table ready");
        Ok(())
    }

    /// `DROP TABLE IF EXISTS`.
    pub fn drop_table(&self, table: &str) -> EtlResult<()> {
        self.execute(&format!("DROP TABLE IF EXISTS {table}"), [])?;
        debug!(table = %table, "table dropped");
        Ok(())
    }

    pub fn table_exists(&self, table: &str) -> EtlResult<bool> {
        let exists = self
            .conn
            .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?
            .exists([table])?;
        Ok(exists)
    }

    pub fn columns(&self, table: &str) -> EtlResult<Vec<ColumnInfo>> {
        let mut stmt = self.conn.prepare(&format!("PRAGMA table_info({table})"))?;
        let columns = stmt
            .query_map([], |row| {
                Ok(ColumnInfo {
                    name: row.get(1)?,
                    data_type: row.get(2)?,
                    not_null: row.get(3)?,
                    default: row.get(4)?,
                    primary_key: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    fn existing_columns(&self, table: &str) -> EtlResult<Vec<ColumnInfo>> {
        let columns = self.columns(table)?;
        if columns.is_empty() {
            return Err(SchemaError::MissingTable(table.to_string()).into());
        }
        Ok(columns)
    }

    // Schema Management

    /// `ALTER TABLE ... ADD COLUMN`.
    ///
    /// Fails with [`SchemaError::DuplicateColumn`] if the column is already there; callers
    /// wanting an idempotent add match on that error and carry on.
    pub fn add_column(&self, table: &str, column: &str, data_type: &str) -> EtlResult<()> {
        let columns = self.existing_columns(table)?;
        if columns.iter().any(|c| c.name.eq_ignore_ascii_case(column)) {
            return Err(SchemaError::DuplicateColumn {
                table: table.to_string(),
                column: column.to_string(),
            }
            .into());
        }
        self.execute(&format!("ALTER TABLE {table} ADD COLUMN {column} {data_type}"), [])?;
        debug!(table = %table, column = %column, "column added");
        Ok(())
    }

    /// Drop `column` by rebuilding the table without it.
    ///
    /// See [`Store::rebuild`]: this is not atomic.
    pub fn remove_column(&self, table: &str, column: &str) -> EtlResult<()> {
        let columns = self.existing_columns(table)?;
        if !columns.iter().any(|c| c.name.eq_ignore_ascii_case(column)) {
            return Err(SchemaError::MissingColumn {
                table: table.to_string(),
                column: column.to_string(),
            }
            .into());
        }
        let kept: Vec<ColumnInfo> = columns
            .into_iter()
            .filter(|c| !c.name.eq_ignore_ascii_case(column))
            .collect();
        self.rebuild(table, &kept)
    }

    /// Change the declared type of `column` by rebuilding the table.
    ///
    /// See [`Store::rebuild`]: this is not atomic.
    pub fn change_column_type(&self, table: &str, column: &str, new_type: &str) -> EtlResult<()> {
        let mut columns = self.existing_columns(table)?;
        let Some(target) = columns
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(column))
        else {
            return Err(SchemaError::MissingColumn {
                table: table.to_string(),
                column: column.to_string(),
            }
            .into());
        };
        target.data_type = new_type.to_string();
        self.rebuild(table, &columns)
    }

    /// Copy `table` into a shadow table with the given columns, drop the original and rename
    /// the shadow into its place.
    ///
    /// Each step commits on its own. A failure part-way can leave `{table}_new` behind next
    /// to the original (or in place of it, if the drop went through); a leftover shadow makes
    /// the next rebuild fail at the first step.
    fn rebuild(&self, table: &str, columns: &[ColumnInfo]) -> EtlResult<()> {
        let shadow = format!("{table}_new");
        let pk: Vec<&str> = columns
            .iter()
            .filter(|c| c.primary_key > 0)
            .map(|c| c.name.as_str())
            .collect();

        let mut defs: Vec<String> = columns.iter().map(|c| c.definition(pk.len() == 1)).collect();
        if pk.len() > 1 {
            defs.push(format!("PRIMARY KEY ({})", pk.join(", ")));
        }
        let names = columns
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        debug!(table = %table, shadow = %shadow, "rebuilding table");
        self.execute(&format!("CREATE TABLE {shadow} ({})", defs.join(", ")), [])?;
        self.execute(
            &format!("INSERT INTO {shadow} ({names}) SELECT {names} FROM {table}"),
            [],
        )?;
        self.drop_table(table)?;
        self.execute(&format!("ALTER TABLE {shadow} RENAME TO {table}"), [])?;
        Ok(())
    }

    // Data Operations

    /// Insert `rows` with one multi-row `INSERT`, committing once every row is in.
    ///
    /// All rows must name the same columns in the same order. Batches too large for a single
    /// statement are split across several statements inside the same transaction.
    pub fn insert<R: SqlMap>(&mut self, table: &str, rows: &[R]) -> EtlResult<usize> {
        let Some(first) = rows.first() else {
            return Err(EtlError::InvalidRows("no rows to insert".to_string()));
        };
        let columns = first.sql_columns();
        if columns.is_empty() {
            return Err(EtlError::InvalidRows("rows have no columns".to_string()));
        }
        if let Some(i) = rows.iter().position(|row| row.sql_columns() != columns) {
            return Err(EtlError::InvalidRows(format!(
                "row {i} does not have the columns ({})",
                columns.join(", ")
            )));
        }

        let placeholders = format!("({})", vec!["?"; columns.len()].join(", "));
        let rows_per_stmt = (MAX_PARAMS / columns.len()).max(1);
        let prefix = format!("INSERT INTO {table} ({}) VALUES ", columns.join(", "));

        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        for chunk in rows.chunks(rows_per_stmt) {
            let stmt = format!("{prefix}{}", vec![placeholders.as_str(); chunk.len()].join(", "));
            let values = chunk.iter().flat_map(|row| row.sql_map());
            inserted += tx.execute(&stmt, params_from_iter(values)).map_err(|e| {
                error!(table = %table, rows = chunk.len(), "Failed to insert: {e}");
                e
            })?;
        }
        tx.commit()?;

        debug!(table = %table, rows = inserted, "rows inserted");
        Ok(inserted)
    }

    /// Single-row form of [`Store::insert`].
    pub fn insert_one<R: SqlMap>(&mut self, table: &str, row: &R) -> EtlResult<usize> {
        self.insert(table, std::slice::from_ref(row))
    }

    /// Run a `SELECT` assembled from raw fragments.
    ///
    /// # Injection
    ///
    /// The fragments in `select` are not escaped or bound.
    pub fn select(&self, table: &str, select: &Select<'_>) -> EtlResult<Vec<Record>> {
        self.query(&select.to_sql(table), [])
    }

    /// `UPDATE {table} SET {set} WHERE {where_clause}`.
    ///
    /// # Injection
    ///
    /// Both fragments are spliced in verbatim.
    pub fn update(&self, table: &str, set: &str, where_clause: &str) -> EtlResult<usize> {
        self.execute(&format!("UPDATE {table} SET {set} WHERE {where_clause}"), [])
    }

    /// `DELETE FROM {table} WHERE {where_clause}`.
    ///
    /// # Injection
    ///
    /// The fragment is spliced in verbatim.
    pub fn delete(&self, table: &str, where_clause: &str) -> EtlResult<usize> {
        self.execute(&format!("DELETE FROM {table} WHERE {where_clause}"), [])
    }

    // Filtering

    /// Select every row matching `conditions`, joined by `operator`.
    ///
    /// - a [`Condition::List`] becomes `column IN (...)`;
    /// - text containing `%` becomes a LIKE match: case-sensitive (via the equivalent GLOB)
    ///   when `case_sensitive`, otherwise `LOWER(column) LIKE LOWER(?)`;
    /// - anything else becomes `column = ?`.
    ///
    /// Values are bound as parameters. With no conditions every row is returned.
    pub fn filter<C>(
        &self,
        table: &str,
        conditions: &[(&str, C)],
        operator: Operator,
        case_sensitive: bool,
    ) -> EtlResult<Vec<Record>>
    where
        C: Into<Condition> + Clone,
    {
        let mut clauses = Vec::with_capacity(conditions.len());
        let mut params = Vec::new();

        for (column, condition) in conditions {
            let condition: Condition = condition.clone().into();
            match condition {
                Condition::List(values) => {
                    clauses.push(format!("{column} IN ({})", vec!["?"; values.len()].join(", ")));
                    params.extend(values);
                }
                Condition::Value(SqlValue::Text(pattern)) if pattern.contains(WILDCARD) => {
                    if case_sensitive {
                        clauses.push(format!("{column} GLOB ?"));
                        params.push(SqlValue::Text(like_to_glob(&pattern)));
                    } else {
                        clauses.push(format!("LOWER({column}) LIKE LOWER(?)"));
                        params.push(SqlValue::Text(pattern));
                    }
                }
                Condition::Value(value) => {
                    clauses.push(format!("{column} = ?"));
                    params.push(value);
                }
            }
        }

        let mut stmt = format!("SELECT * FROM {table}");
        if !clauses.is_empty() {
            stmt.push_str(" WHERE ");
            stmt.push_str(&clauses.join(operator.as_sql()));
        }
        self.query(&stmt, params_from_iter(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SCHEMA: &str = "id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, owner TEXT, score INTEGER";

    #[derive(Debug, Clone, crate::SqlMap)]
    struct Row {
        name: String,
        owner: Option<String>,
        score: i64,
    }

    fn row(name: &str, owner: &str, score: i64) -> Row {
        Row {
            name: name.to_string(),
            owner: Some(owner.to_string()),
            score,
        }
    }

    fn seeded() -> Store {
        let mut store = Store::open_in_memory().unwrap();
        store.create_table("t", SCHEMA).unwrap();
        store
            .insert(
                "t",
                &[
                    row("Alpha", "0xabc", 1),
                    row("beta", "0xdef", 2),
                    row("Gamma", "0x123", 3),
                    row("alphabet", "0xabc", 4),
                ],
            )
            .unwrap();
        store
    }

    fn text(s: &str) -> SqlValue {
        SqlValue::Text(s.to_string())
    }

    fn names(rows: &[Record]) -> Vec<SqlValue> {
        rows.iter().map(|r| r[1].clone()).collect()
    }

    #[test]
    fn test_create_table_is_idempotent() {
        let mut store = Store::open_in_memory().unwrap();
        store.create_table("t", SCHEMA).unwrap();
        store.insert_one("t", &row("Alpha", "0xabc", 1)).unwrap();
        store.create_table("t", SCHEMA).unwrap();

        assert!(store.table_exists("t").unwrap());
        let count = store.select("t", &Select::new().columns("COUNT(*)")).unwrap();
        assert_eq!(count, vec![vec![SqlValue::Integer(1)]]);
    }

    #[test]
    fn test_drop_table_is_idempotent() {
        let store = seeded();
        store.drop_table("t").unwrap();
        store.drop_table("t").unwrap();
        assert!(!store.table_exists("t").unwrap());
    }

    #[test]
    fn test_add_column_twice_is_a_schema_error() {
        let store = seeded();
        store.add_column("t", "instagram_username", "TEXT").unwrap();

        let err = store.add_column("t", "instagram_username", "TEXT").unwrap_err();
        assert!(matches!(
            err,
            EtlError::Schema(SchemaError::DuplicateColumn { ref column, .. }) if column == "instagram_username"
        ));
        assert_eq!(store.columns("t").unwrap().len(), 5);
    }

    #[test]
    fn test_add_column_to_missing_table() {
        let store = Store::open_in_memory().unwrap();
        let err = store.add_column("nope", "c", "TEXT").unwrap_err();
        assert!(matches!(err, EtlError::Schema(SchemaError::MissingTable(_))));
    }

    #[test]
    fn test_remove_column_keeps_rows_and_key() {
        let store = seeded();
        store.remove_column("t", "score").unwrap();

        let columns = store.columns("t").unwrap();
        let column_names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(column_names, vec!["id", "name", "owner"]);
        assert_eq!(columns[0].primary_key, 1);
        assert!(columns[1].not_null);

        let rows = store.select("t", &Select::new().order_by("id")).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], vec![SqlValue::Integer(1), text("Alpha"), text("0xabc")]);
        assert!(!store.table_exists("t_new").unwrap());
    }

    #[test]
    fn test_remove_missing_column() {
        let store = seeded();
        let err = store.remove_column("t", "nope").unwrap_err();
        assert!(matches!(err, EtlError::Schema(SchemaError::MissingColumn { .. })));
    }

    #[test]
    fn test_change_column_type_converts_values() {
        let store = seeded();
        store.change_column_type("t", "score", "TEXT").unwrap();

        let columns = store.columns("t").unwrap();
        assert_eq!(columns[3].data_type, "TEXT");

        let rows = store
            .select("t", &Select::new().columns("score").where_clause("name = 'beta'"))
            .unwrap();
        assert_eq!(rows, vec![vec![text("2")]]);
    }

    #[test]
    fn test_rebuild_fails_when_shadow_is_left_behind() {
        let store = seeded();
        store.create_table("t_new", "x TEXT").unwrap();

        assert!(matches!(
            store.remove_column("t", "score"),
            Err(EtlError::Store(_))
        ));
        // Original is untouched.
        assert_eq!(store.columns("t").unwrap().len(), 4);
    }

    #[test]
    fn test_insert_rejects_mismatched_columns() {
        let mut store = seeded();
        let mut a = BTreeMap::new();
        a.insert("name".to_string(), text("a"));
        let mut b = BTreeMap::new();
        b.insert("owner".to_string(), text("b"));

        let err = store.insert("t", &[a, b]).unwrap_err();
        assert!(matches!(err, EtlError::InvalidRows(_)));

        let none: &[Row] = &[];
        assert!(matches!(store.insert("t", none), Err(EtlError::InvalidRows(_))));
    }

    #[test]
    fn test_insert_engine_error_leaves_no_rows() {
        let mut store = Store::open_in_memory().unwrap();
        store.create_table("t", SCHEMA).unwrap();

        let mut ok = BTreeMap::new();
        ok.insert("name".to_string(), text("ok"));
        let mut bad = BTreeMap::new();
        bad.insert("name".to_string(), SqlValue::Null);

        assert!(matches!(store.insert("t", &[ok, bad]), Err(EtlError::Store(_))));
        let count = store.select("t", &Select::new().columns("COUNT(*)")).unwrap();
        assert_eq!(count[0][0], SqlValue::Integer(0));
        store.rollback().unwrap();
    }

    #[test]
    fn test_insert_large_batch_spans_statements() {
        let mut store = Store::open_in_memory().unwrap();
        store.create_table("t", SCHEMA).unwrap();

        let rows: Vec<Row> = (0..12_000).map(|i| row(&format!("n{i}"), "0x1", i)).collect();
        assert_eq!(store.insert("t", &rows).unwrap(), 12_000);

        let count = store.select("t", &Select::new().columns("COUNT(*)")).unwrap();
        assert_eq!(count[0][0], SqlValue::Integer(12_000));
    }

    #[test]
    fn test_select_clauses() {
        let store = seeded();

        let rows = store
            .select(
                "t",
                &Select::new()
                    .columns("owner")
                    .distinct()
                    .order_by("owner DESC")
                    .limit(2),
            )
            .unwrap();
        assert_eq!(rows, vec![vec![text("0xdef")], vec![text("0xabc")]]);

        let rows = store
            .select("t", &Select::new().columns("name, score").where_clause("score > 2").order_by("score"))
            .unwrap();
        assert_eq!(
            rows,
            vec![
                vec![text("Gamma"), SqlValue::Integer(3)],
                vec![text("alphabet"), SqlValue::Integer(4)],
            ]
        );
    }

    #[test]
    fn test_update_and_delete() {
        let store = seeded();

        assert_eq!(store.update("t", "score = score * 10", "owner = '0xabc'").unwrap(), 2);
        let rows = store
            .select("t", &Select::new().columns("SUM(score)"))
            .unwrap();
        assert_eq!(rows[0][0], SqlValue::Integer(10 + 2 + 3 + 40));

        assert_eq!(store.delete("t", "score >= 10").unwrap(), 2);
        let rows = store.select("t", &Select::new()).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_filter_in_list() {
        let store = seeded();
        let rows = store
            .filter("t", &[("owner", vec!["0xabc", "0xdef"])], Operator::And, true)
            .unwrap();
        assert_eq!(names(&rows), vec![text("Alpha"), text("beta"), text("alphabet")]);

        let or_rows = store
            .filter("t", &[("owner", "0xabc"), ("owner", "0xdef")], Operator::Or, true)
            .unwrap();
        assert_eq!(rows, or_rows);
    }

    #[test]
    fn test_filter_and_equality() {
        let store = seeded();
        let rows = store
            .filter::<Condition>(
                "t",
                &[("owner", "0xabc".into()), ("score", 4_i64.into())],
                Operator::And,
                true,
            )
            .unwrap();
        assert_eq!(names(&rows), vec![text("alphabet")]);
    }

    #[test]
    fn test_filter_like_case_sensitivity() {
        let store = seeded();

        let sensitive = store
            .filter("t", &[("name", "alpha%")], Operator::And, true)
            .unwrap();
        assert_eq!(names(&sensitive), vec![text("alphabet")]);

        let insensitive = store
            .filter("t", &[("name", "alpha%")], Operator::And, false)
            .unwrap();
        assert_eq!(names(&insensitive), vec![text("Alpha"), text("alphabet")]);

        let single = store
            .filter("t", &[("name", "_eta%")], Operator::And, true)
            .unwrap();
        assert_eq!(names(&single), vec![text("beta")]);
    }

    #[test]
    fn test_filter_values_are_bound() {
        let store = seeded();
        let rows = store
            .filter("t", &[("name", "x' OR '1'='1")], Operator::And, true)
            .unwrap();
        assert!(rows.is_empty());
        assert_eq!(store.select("t", &Select::new()).unwrap().len(), 4);
    }

    #[test]
    fn test_filter_without_conditions_returns_everything() {
        let store = seeded();
        let none: &[(&str, Condition)] = &[];
        assert_eq!(store.filter("t", none, Operator::And, true).unwrap().len(), 4);
    }

    #[test]
    fn test_like_to_glob() {
        assert_eq!(like_to_glob("0x%"), "0x*");
        assert_eq!(like_to_glob("a_c"), "a?c");
        assert_eq!(like_to_glob("*[?]%"), "[*][[][?]]*");
    }

    #[test]
    fn test_json_values_convert() {
        use serde_json::json;
        assert_eq!(json!(null).to_sql_value(), SqlValue::Null);
        assert_eq!(json!("a").to_sql_value(), text("a"));
        assert_eq!(json!(3).to_sql_value(), SqlValue::Integer(3));
        assert_eq!(json!(1.5).to_sql_value(), SqlValue::Real(1.5));
        assert_eq!(json!(true).to_sql_value(), SqlValue::Integer(1));
        assert_eq!(json!(["0x1"]).to_sql_value(), text("[\"0x1\"]"));
    }

    #[test]
    fn test_file_store_persists_after_close() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let mut store = Store::open(&path).unwrap();
        store.create_table("t", SCHEMA).unwrap();
        store.insert_one("t", &row("Alpha", "0xabc", 1)).unwrap();
        store.close().unwrap();

        let store = Store::open(&path).unwrap();
        let rows = store.select("t", &Select::new().columns("name")).unwrap();
        assert_eq!(rows, vec![vec![text("Alpha")]]);
    }
}

//! Dynamic WHERE-clause building shared by the list queries.

use janconnect_core::scope::RecordScope;
use janconnect_core::types::DbId;

/// Typed bind value for dynamically-built queries.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BindValue {
    BigInt(i64),
    Text(String),
    Bool(bool),
}

/// Accumulates AND-ed conditions and their positional binds.
pub(crate) struct WhereBuilder {
    conditions: Vec<String>,
    bind_values: Vec<BindValue>,
    bind_idx: u32,
}

impl WhereBuilder {
    pub(crate) fn new() -> Self {
        Self {
            conditions: Vec::new(),
            bind_values: Vec::new(),
            bind_idx: 1,
        }
    }

    /// Register a bind value and return its `$n` placeholder.
    pub(crate) fn param(&mut self, value: BindValue) -> String {
        let placeholder = format!("${}", self.bind_idx);
        self.bind_idx += 1;
        self.bind_values.push(value);
        placeholder
    }

    pub(crate) fn condition(&mut self, sql: String) {
        self.conditions.push(sql);
    }

    /// Apply a record scope. `agency_columns` are OR-ed for [`RecordScope::Agency`].
    pub(crate) fn scope(&mut self, scope: &RecordScope, state_column: &str, agency_columns: &[&str]) {
        match scope {
            RecordScope::All => {}
            RecordScope::State(state) => {
                let p = self.param(BindValue::Text(state.clone()));
                self.condition(format!("{state_column} = {p}"));
            }
            RecordScope::Agency(agency) => {
                let p = self.param(BindValue::BigInt(*agency));
                let parts: Vec<String> = agency_columns
                    .iter()
                    .map(|col| format!("{col} = {p}"))
                    .collect();
                self.condition(format!("({})", parts.join(" OR ")));
            }
            RecordScope::Nothing => self.condition("FALSE".to_string()),
        }
    }

    pub(crate) fn eq_text(&mut self, column: &str, value: Option<&str>) {
        if let Some(value) = value {
            let p = self.param(BindValue::Text(value.to_string()));
            self.condition(format!("{column} = {p}"));
        }
    }

    pub(crate) fn eq_id(&mut self, column: &str, value: Option<DbId>) {
        if let Some(value) = value {
            let p = self.param(BindValue::BigInt(value));
            self.condition(format!("{column} = {p}"));
        }
    }

    pub(crate) fn eq_bool(&mut self, column: &str, value: Option<bool>) {
        if let Some(value) = value {
            let p = self.param(BindValue::Bool(value));
            self.condition(format!("{column} = {p}"));
        }
    }

    /// Case-insensitive substring match.
    pub(crate) fn contains(&mut self, column: &str, needle: Option<&str>) {
        if let Some(needle) = needle {
            let p = self.param(BindValue::Text(format!("%{}%", escape_like(needle))));
            self.condition(format!("{column} ILIKE {p}"));
        }
    }

    /// Returns `(where_clause, bind_values, next_bind_index)`.
    /// The `where_clause` is empty if no filters are active, or starts with `WHERE `.
    pub(crate) fn finish(self) -> (String, Vec<BindValue>, u32) {
        let where_clause = if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        };
        (where_clause, self.bind_values, self.bind_idx)
    }
}

/// Escape `ILIKE` metacharacters so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
pub(crate) fn bind_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Bool(v) => q = q.bind(*v),
        }
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_builder_has_no_where_clause() {
        let (clause, binds, next) = WhereBuilder::new().finish();
        assert_eq!(clause, "");
        assert!(binds.is_empty());
        assert_eq!(next, 1);
    }

    #[test]
    fn agency_scope_reuses_one_placeholder() {
        let mut w = WhereBuilder::new();
        w.scope(
            &RecordScope::Agency(7),
            "state",
            &["implementing_agency_id", "executing_agency_id"],
        );
        let (clause, binds, next) = w.finish();
        assert_eq!(
            clause,
            "WHERE (implementing_agency_id = $1 OR executing_agency_id = $1)"
        );
        assert_eq!(binds, vec![BindValue::BigInt(7)]);
        assert_eq!(next, 2);
    }

    #[test]
    fn nothing_scope_renders_false() {
        let mut w = WhereBuilder::new();
        w.scope(&RecordScope::Nothing, "state", &["id"]);
        w.eq_bool("is_active", Some(true));
        let (clause, binds, _) = w.finish();
        assert_eq!(clause, "WHERE FALSE AND is_active = $1");
        assert_eq!(binds.len(), 1);
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        let mut w = WhereBuilder::new();
        w.contains("title", Some("50%_off"));
        let (_, binds, _) = w.finish();
        assert_eq!(binds, vec![BindValue::Text("%50\\%\\_off%".to_string())]);
    }
}

//! Backend-neutral bind values.

/// A value that can be bound to either backend.
#[derive(Clone, Debug, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    Text(String),
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Real(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&String> for SqlValue {
    fn from(v: &String) -> Self {
        SqlValue::Text(v.clone())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// Build a `Vec<SqlValue>` from heterogeneous arguments.
#[macro_export]
macro_rules! sql_params {
    ($($v:expr),* $(,)?) => {
        vec![$($crate::db::SqlValue::from($v)),*]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macro_converts_mixed_arguments() {
        let name = String::from("lamp");
        let missing: Option<&str> = None;
        let params = crate::sql_params![1i64, 2.5, true, "a", &name, missing, Some(3i64)];
        assert_eq!(
            params,
            vec![
                SqlValue::Int(1),
                SqlValue::Real(2.5),
                SqlValue::Bool(true),
                SqlValue::Text("a".into()),
                SqlValue::Text("lamp".into()),
                SqlValue::Null,
                SqlValue::Int(3),
            ]
        );
    }
}

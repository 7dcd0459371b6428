//! A [`QueryBuilder`] that records the calls made against it.
//!
//! Rendering shows the builder chain, e.g.
//! `where("a", 1).where(|q| q.or_where("b", 2).or_where("c", 3))`.

use serde::Serialize;
use serde_json::Value;

use crate::apply::QueryBuilder;
use crate::ast::Verb;

/// One recorded builder call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Call {
    /// A predicate method and its positional arguments.
    Method {
        method: &'static str,
        args: Vec<Value>,
    },
    /// `where` / `or_where` with a nested scope.
    Group {
        method: &'static str,
        calls: Vec<Call>,
    },
}

impl Call {
    pub fn method(&self) -> &'static str {
        match self {
            Call::Method { method, .. } | Call::Group { method, .. } => method,
        }
    }
}

impl std::fmt::Display for Call {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Call::Method { method, args } => {
                let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", method, args.join(", "))
            }
            Call::Group { method, calls } => {
                write!(f, "{}(|q| q.{})", method, Chain(calls))
            }
        }
    }
}

struct Chain<'a>(&'a [Call]);

impl std::fmt::Display for Chain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, call) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", call)?;
        }
        Ok(())
    }
}

/// Records builder calls instead of building a query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recorder {
    calls: Vec<Call>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn into_calls(self) -> Vec<Call> {
        self.calls
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    fn record(&mut self, method: &'static str, args: Vec<Value>) -> &mut Self {
        self.calls.push(Call::Method { method, args });
        self
    }

    fn compare(
        &mut self,
        verb: Verb,
        column: &str,
        operator: Option<&str>,
        value: &Value,
    ) -> &mut Self {
        let mut args = vec![Value::from(column)];
        if let Some(op) = operator {
            args.push(Value::from(op));
        }
        args.push(value.clone());
        self.record(verb.name(), args)
    }

    fn list(&mut self, verb: Verb, column: &str, values: &[Value]) -> &mut Self {
        self.record(verb.name(), vec![Value::from(column), Value::Array(values.to_vec())])
    }

    fn group<F>(&mut self, method: &'static str, scope: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        let mut inner = Recorder::new();
        scope(&mut inner);
        self.calls.push(Call::Group {
            method,
            calls: inner.calls,
        });
        self
    }
}

impl std::fmt::Display for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Chain(&self.calls))
    }
}

impl QueryBuilder for Recorder {
    fn where_(&mut self, column: &str, operator: Option<&str>, value: &Value) -> &mut Self {
        self.compare(Verb::Where, column, operator, value)
    }

    fn or_where(&mut self, column: &str, operator: Option<&str>, value: &Value) -> &mut Self {
        self.compare(Verb::OrWhere, column, operator, value)
    }

    fn where_not(&mut self, column: &str, operator: Option<&str>, value: &Value) -> &mut Self {
        self.compare(Verb::WhereNot, column, operator, value)
    }

    fn or_where_not(&mut self, column: &str, operator: Option<&str>, value: &Value) -> &mut Self {
        self.compare(Verb::OrWhereNot, column, operator, value)
    }

    fn where_in(&mut self, column: &str, values: &[Value]) -> &mut Self {
        self.list(Verb::WhereIn, column, values)
    }

    fn or_where_in(&mut self, column: &str, values: &[Value]) -> &mut Self {
        self.list(Verb::OrWhereIn, column, values)
    }

    fn where_not_in(&mut self, column: &str, values: &[Value]) -> &mut Self {
        self.list(Verb::WhereNotIn, column, values)
    }

    fn or_where_not_in(&mut self, column: &str, values: &[Value]) -> &mut Self {
        self.list(Verb::OrWhereNotIn, column, values)
    }

    fn where_null(&mut self, column: &str) -> &mut Self {
        self.record(Verb::WhereNull.name(), vec![Value::from(column)])
    }

    fn or_where_null(&mut self, column: &str) -> &mut Self {
        self.record(Verb::OrWhereNull.name(), vec![Value::from(column)])
    }

    fn where_not_null(&mut self, column: &str) -> &mut Self {
        self.record(Verb::WhereNotNull.name(), vec![Value::from(column)])
    }

    fn or_where_not_null(&mut self, column: &str) -> &mut Self {
        self.record(Verb::OrWhereNotNull.name(), vec![Value::from(column)])
    }

    fn having(&mut self, column: &str, operator: &str, value: &Value) -> &mut Self {
        self.record(
            "having",
            vec![Value::from(column), Value::from(operator), value.clone()],
        )
    }

    fn where_group<F>(&mut self, scope: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        self.group("where", scope)
    }

    fn or_where_group<F>(&mut self, scope: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        self.group("or_where", scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chaining() {
        let mut recorder = Recorder::new();
        recorder
            .where_("a", None, &json!(1))
            .or_where_in("b", &[json!("x")])
            .where_group(|q| {
                q.where_not("c", Some(">"), &json!(2)).or_where_null("d");
            });
        assert_eq!(recorder.calls().len(), 3);
        assert_eq!(recorder.calls()[2].method(), "where");
        assert_eq!(
            recorder.to_string(),
            r#"where("a", 1).or_where_in("b", ["x"]).where(|q| q.where_not("c", ">", 2).or_where_null("d"))"#
        );
    }

    #[test]
    fn test_calls_serialize() {
        let mut recorder = Recorder::new();
        recorder.or_where_group(|q| {
            q.having("count", ">=", &json!(2));
        });
        let json = serde_json::to_value(recorder.calls()).unwrap();
        assert_eq!(
            json,
            json!([{
                "method": "or_where",
                "calls": [{"method": "having", "args": ["count", ">=", 2]}]
            }])
        );
    }
}

use serde_json::Value;
use tracing::debug;
use webdesk_fabric::{paths, Payload, RequestDescriptor, RequestOutcome, ResponseMeta, Scalar};

use crate::connector::Connector;
use crate::query_url::QueryData;

/// Array of result rows in a list response
pub const OBJECTS_FIELD: &str = "objects";
/// Total row count in a list response
pub const OBJECT_COUNT_FIELD: &str = "object_count";
/// Number of result pages in a list response
pub const PAGE_COUNT_FIELD: &str = "page_count";

/// Joins the individual clauses of a condition string
pub const CONDITION_SEPARATOR: &str = "_a_";

/// Condition string (`cns`) plus its indexed values (`c0`, `c1`, ...)
///
/// Each clause reads `<attribute>-e-<index>`: the attribute equals the
/// value at that index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions {
    clauses: Vec<String>,
    values: Vec<Scalar>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality clause
    pub fn equals(mut self, attribute: &str, value: impl Into<Scalar>) -> Self {
        self.clauses
            .push(format!("{}-e-{}", attribute, self.values.len()));
        self.values.push(value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn cns(&self) -> String {
        self.clauses.join(CONDITION_SEPARATOR)
    }

    fn apply(&self, payload: &mut Payload) {
        if self.is_empty() {
            return;
        }
        payload.insert("cns", self.cns());
        for (index, value) in self.values.iter().enumerate() {
            payload.insert(format!("c{}", index), value.clone());
        }
    }
}

/// Saved query run by name
#[derive(Debug, Clone, PartialEq)]
pub struct NamedQuery {
    pub class_name: String,
    pub query: String,
    pub conditions: Conditions,
    pub page_size: Option<u32>,
    pub sort_by: Option<String>,
}

impl NamedQuery {
    pub fn new(class_name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            query: query.into(),
            conditions: Conditions::new(),
            page_size: None,
            sort_by: None,
        }
    }

    pub fn conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn sort_by(mut self, attribute: impl Into<String>) -> Self {
        self.sort_by = Some(attribute.into());
        self
    }

    fn to_payload(&self) -> Payload {
        let mut payload = Payload::new()
            .with("class_name", &self.class_name)
            .with("query", &self.query);
        self.conditions.apply(&mut payload);
        payload.insert_opt("page_size", self.page_size);
        payload.insert_opt("sort_by", self.sort_by.as_ref());
        payload
    }
}

/// Ad-hoc query naming the attributes to return
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleQuery {
    pub class_name: String,
    pub attributes: Vec<String>,
    pub conditions: Conditions,
    pub page_size: Option<u32>,
    pub sort_by: Option<String>,
}

impl ConsoleQuery {
    pub fn new<I, S>(class_name: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            class_name: class_name.into(),
            attributes: attributes.into_iter().map(Into::into).collect(),
            conditions: Conditions::new(),
            page_size: None,
            sort_by: None,
        }
    }

    pub fn conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn sort_by(mut self, attribute: impl Into<String>) -> Self {
        self.sort_by = Some(attribute.into());
        self
    }

    fn to_payload(&self) -> Payload {
        let mut payload = Payload::new()
            .with("class_name", &self.class_name)
            .with("attributes", self.attributes.join(","));
        self.conditions.apply(&mut payload);
        payload.insert_opt("page_size", self.page_size);
        payload.insert_opt("sort_by", self.sort_by.as_ref());
        payload
    }
}

/// Fix the row count of single-page list responses
///
/// The service reports `object_count` as 0 whenever everything fits on one
/// page; the real count is then the number of rows returned.
pub fn correct_single_page_count(body: &mut Value, _meta: &ResponseMeta) {
    if body.get(PAGE_COUNT_FIELD).and_then(Value::as_f64) != Some(1.0) {
        return;
    }
    let Some(rows) = body.get(OBJECTS_FIELD).and_then(Value::as_array).map(Vec::len) else {
        return;
    };
    if let Some(map) = body.as_object_mut() {
        map.insert(OBJECT_COUNT_FIELD.to_string(), Value::from(rows));
    }
}

/// Record queries against `/query/list.rails`
pub struct QueryApi<'a> {
    connector: &'a Connector,
}

impl<'a> QueryApi<'a> {
    pub(crate) fn new(connector: &'a Connector) -> Self {
        Self { connector }
    }

    /// Run a saved query
    pub async fn run_query(&self, query: &NamedQuery) -> RequestOutcome {
        self.list(query.to_payload()).await
    }

    /// Run an ad-hoc attribute query
    pub async fn run_console_query(&self, query: &ConsoleQuery) -> RequestOutcome {
        self.list(query.to_payload()).await
    }

    /// Re-run a query recovered by [`parse_query_url`](crate::parse_query_url)
    pub async fn run_parsed(&self, data: &QueryData) -> RequestOutcome {
        self.list(data.to_payload()).await
    }

    async fn list(&self, payload: Payload) -> RequestOutcome {
        debug!(
            "Listing {}",
            payload.get("class_name").map(ToString::to_string).unwrap_or_default()
        );
        let descriptor = RequestDescriptor::get(paths::QUERY_LIST)
            .payload(payload)
            .processor(correct_single_page_count);
        self.connector.execute(descriptor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_page_count_is_corrected() {
        let mut body = json!({"objects": [{}, {}, {}], "object_count": 0, "page_count": 1});
        correct_single_page_count(&mut body, &ResponseMeta::default());
        assert_eq!(body["object_count"], 3);
    }

    #[test]
    fn multi_page_count_is_left_alone() {
        let mut body = json!({"objects": [{}, {}], "object_count": 120, "page_count": 3});
        correct_single_page_count(&mut body, &ResponseMeta::default());
        assert_eq!(body["object_count"], 120);
    }

    #[test]
    fn bodies_without_rows_are_left_alone() {
        let mut body = json!({"page_count": 1});
        correct_single_page_count(&mut body, &ResponseMeta::default());
        assert_eq!(body, json!({"page_count": 1}));

        let mut body = json!("text");
        correct_single_page_count(&mut body, &ResponseMeta::default());
        assert_eq!(body, json!("text"));
    }

    #[test]
    fn conditions_render_indexed_clauses() {
        let conditions = Conditions::new()
            .equals("Status", "Open")
            .equals("Priority", 1u32);
        assert_eq!(conditions.cns(), "Status-e-0_a_Priority-e-1");

        let mut payload = Payload::new();
        conditions.apply(&mut payload);
        assert_eq!(payload.get("c0"), Some(&Scalar::from("Open")));
        assert_eq!(payload.get("c1"), Some(&Scalar::from(1u32)));
    }

    #[test]
    fn console_query_joins_attributes() {
        let payload = ConsoleQuery::new("Incident", ["Title", "Status"])
            .page_size(10)
            .to_payload();
        assert_eq!(payload.get("attributes"), Some(&Scalar::from("Title,Status")));
        assert_eq!(payload.get("page_size"), Some(&Scalar::from(10u32)));
        assert!(!payload.contains("cns"));
    }
}

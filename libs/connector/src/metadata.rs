//! Introspection of the service's metaschema
//!
//! Modules, classes and attributes are themselves records of the
//! `Metadata.*` classes, so every lookup here is an ordinary console query.
//! Result sets are capped at [`METADATA_PAGE_SIZE`] rows; no schema seen so
//! far comes close, and the list endpoint offers no cursor to page with.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use webdesk_fabric::{Error, Failure, RequestOutcome, ResponseMeta, Success};

use crate::connector::Connector;
use crate::query::{Conditions, ConsoleQuery, OBJECTS_FIELD};

pub const METADATA_PAGE_SIZE: u32 = 999;

const MODULE_CLASS: &str = "Metadata.ModuleType";
const CLASS_CLASS: &str = "Metadata.ClassType";
const ATTRIBUTE_CLASS: &str = "Metadata.AttributeType";

const MODULE_ATTRIBUTES: [&str; 3] = ["Guid", "Name", "Title"];

const CLASS_ATTRIBUTES: [&str; 9] = [
    "Guid",
    "Name",
    "Title",
    "ModuleType.Guid",
    "ModuleType.Name",
    "ModuleType.Title",
    "DatabaseTable",
    "SuperClassType.Name",
    "SuperClassType.ModuleType.Name",
];

const ATTRIBUTE_ATTRIBUTES: [&str; 8] = [
    "Guid",
    "Name",
    "Title",
    "DataType",
    "RelatedClassType.Guid",
    "IsName",
    "IsPrimaryKey",
    PARENT_CLASS_GUID,
];

/// Super class of the class an attribute row belongs to
const PARENT_CLASS_GUID: &str = "ClassType.SuperClassType.Guid";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleDescriptor {
    pub guid: String,
    pub name: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectDescriptor {
    pub guid: String,
    pub name: String,
    pub title: String,
    pub module_guid: String,
    pub module_name: String,
    pub module_title: String,
    pub database_table: String,
    /// `<module>.<class>` of the super class, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_class_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeDescriptor {
    pub guid: String,
    pub name: String,
    pub title: String,
    pub data_type: String,
    pub related_class_guid: String,
    pub is_name: bool,
    pub is_primary_key: bool,
}

/// How to find a class
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectLookup {
    /// Fully qualified `Module.Class`; a name without a dot matches the class name alone
    Name(String),
    Guid(String),
}

fn text(row: &Map<String, Value>, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn flag(row: &Map<String, Value>, key: &str) -> bool {
    match row.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64() == Some(1.0),
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true") || s == "1",
        _ => false,
    }
}

fn rows(data: &Value) -> Result<Vec<&Map<String, Value>>, Error> {
    data.get(OBJECTS_FIELD)
        .and_then(Value::as_array)
        .ok_or(Error::InvalidResponse)?
        .iter()
        .map(|row| row.as_object().ok_or(Error::InvalidResponse))
        .collect()
}

fn by_title<T>(items: &mut [T], title: impl Fn(&T) -> &str) {
    items.sort_by(|a, b| title(a).to_lowercase().cmp(&title(b).to_lowercase()));
}

impl ModuleDescriptor {
    fn from_row(row: &Map<String, Value>) -> Self {
        Self {
            guid: text(row, "Guid"),
            name: text(row, "Name"),
            title: text(row, "Title"),
        }
    }
}

impl ObjectDescriptor {
    fn from_row(row: &Map<String, Value>) -> Self {
        let super_module = text(row, "SuperClassType.ModuleType.Name");
        let super_class = text(row, "SuperClassType.Name");
        let parent_class_name = (!super_module.is_empty() && !super_class.is_empty())
            .then(|| format!("{}.{}", super_module, super_class));
        Self {
            guid: text(row, "Guid"),
            name: text(row, "Name"),
            title: text(row, "Title"),
            module_guid: text(row, "ModuleType.Guid"),
            module_name: text(row, "ModuleType.Name"),
            module_title: text(row, "ModuleType.Title"),
            database_table: text(row, "DatabaseTable"),
            parent_class_name,
        }
    }
}

impl AttributeDescriptor {
    fn from_row(row: &Map<String, Value>) -> Self {
        Self {
            guid: text(row, "Guid"),
            name: text(row, "Name"),
            title: text(row, "Title"),
            data_type: text(row, "DataType"),
            related_class_guid: text(row, "RelatedClassType.Guid"),
            is_name: flag(row, "IsName"),
            is_primary_key: flag(row, "IsPrimaryKey"),
        }
    }
}

/// Schema introspection
pub struct MetadataApi<'a> {
    connector: &'a Connector,
}

impl<'a> MetadataApi<'a> {
    pub(crate) fn new(connector: &'a Connector) -> Self {
        Self { connector }
    }

    async fn metadata_query(
        &self,
        class_name: &str,
        attributes: &[&str],
        conditions: Conditions,
    ) -> RequestOutcome {
        let query = ConsoleQuery::new(class_name, attributes.iter().copied())
            .conditions(conditions)
            .page_size(METADATA_PAGE_SIZE);
        self.connector.query().run_console_query(&query).await
    }

    /// All modules, sorted by title
    pub async fn get_modules(&self) -> RequestOutcome<Vec<ModuleDescriptor>> {
        self.metadata_query(MODULE_CLASS, &MODULE_ATTRIBUTES, Conditions::new())
            .await
            .try_map(|data| {
                let mut modules: Vec<_> = rows(&data)?
                    .into_iter()
                    .map(ModuleDescriptor::from_row)
                    .collect();
                by_title(&mut modules, |m| m.title.as_str());
                Ok(modules)
            })
    }

    /// Classes of one module, sorted by title
    pub async fn get_objects_for_module(
        &self,
        module_guid: &str,
    ) -> RequestOutcome<Vec<ObjectDescriptor>> {
        let conditions = Conditions::new().equals("ModuleType.Guid", module_guid);
        self.metadata_query(CLASS_CLASS, &CLASS_ATTRIBUTES, conditions)
            .await
            .try_map(|data| {
                let mut objects: Vec<_> = rows(&data)?
                    .into_iter()
                    .map(ObjectDescriptor::from_row)
                    .collect();
                by_title(&mut objects, |o| o.title.as_str());
                Ok(objects)
            })
    }

    /// One class, or `None` when nothing matches
    pub async fn get_object(
        &self,
        lookup: &ObjectLookup,
    ) -> RequestOutcome<Option<ObjectDescriptor>> {
        let conditions = match lookup {
            ObjectLookup::Guid(guid) => Conditions::new().equals("Guid", guid),
            ObjectLookup::Name(full_name) => match full_name.split_once('.') {
                Some((module, class)) => Conditions::new()
                    .equals("ModuleType.Name", module)
                    .equals("Name", class),
                None => Conditions::new().equals("Name", full_name),
            },
        };
        self.metadata_query(CLASS_CLASS, &CLASS_ATTRIBUTES, conditions)
            .await
            .try_map(|data| Ok(rows(&data)?.first().copied().map(ObjectDescriptor::from_row)))
    }

    /// Every attribute of a class including inherited ones
    ///
    /// Walks from the class up through its super classes, one query per
    /// level. A name already collected from a more derived class hides the
    /// ancestor's attribute of the same name. The result is sorted by title,
    /// ignoring case. The first failing level fails the whole lookup.
    pub async fn get_attributes_for_object(
        &self,
        class_guid: &str,
    ) -> RequestOutcome<Vec<AttributeDescriptor>> {
        let mut attributes: Vec<AttributeDescriptor> = Vec::new();
        let mut names: HashSet<String> = HashSet::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut logged_on = false;
        let mut logged_off = false;
        let mut last: Option<(ResponseMeta, u16)> = None;
        let mut current = Some(class_guid.to_string());

        while let Some(guid) = current.take() {
            if !visited.insert(guid.clone()) {
                warn!("Class hierarchy loops back to {}, stopping", guid);
                break;
            }

            let conditions = Conditions::new().equals("ClassType.Guid", guid.as_str());
            let outcome = self
                .metadata_query(ATTRIBUTE_CLASS, &ATTRIBUTE_ATTRIBUTES, conditions)
                .await;
            let success = match outcome.into_result() {
                Ok(success) => success,
                Err(mut failure) => {
                    failure.logged_on |= logged_on;
                    failure.logged_off |= logged_off;
                    return RequestOutcome::Failure(failure);
                }
            };
            logged_on |= success.logged_on;
            logged_off |= success.logged_off;

            let level = match rows(&success.data) {
                Ok(level) => level,
                Err(error) => {
                    return RequestOutcome::Failure(Failure {
                        status_code: success.status_code,
                        error,
                        logged_on,
                        logged_off,
                    })
                }
            };

            let mut parent = None;
            for row in &level {
                if parent.is_none() {
                    parent = Some(text(row, PARENT_CLASS_GUID)).filter(|g| !g.is_empty());
                }
                let attribute = AttributeDescriptor::from_row(row);
                if names.insert(attribute.name.clone()) {
                    attributes.push(attribute);
                }
            }
            debug!(
                "Class {}: {} attribute rows, parent {:?}",
                guid,
                level.len(),
                parent
            );

            current = parent;
            last = Some((success.meta, success.status_code));
        }

        by_title(&mut attributes, |a| a.title.as_str());
        let (meta, status_code) = last.unwrap_or_default();
        RequestOutcome::Success(Success {
            data: attributes,
            meta,
            status_code,
            logged_on,
            logged_off,
        })
    }
}

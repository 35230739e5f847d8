use webdesk_fabric::{paths, Payload, RequestDescriptor, RequestOutcome};

use crate::connector::Connector;

/// Record being created inside a collection of a process record
///
/// Notes, attachments and similar children of an incident or change are
/// created this way.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRecord {
    pub class_name: String,
    pub process_class_name: String,
    pub process_key: String,
    pub collection_name: String,
    pub values: Payload,
}

/// Single-record operations on `/object/*.rails`
pub struct RecordApi<'a> {
    connector: &'a Connector,
}

impl<'a> RecordApi<'a> {
    pub(crate) fn new(connector: &'a Connector) -> Self {
        Self { connector }
    }

    /// Fetch one record by key
    pub async fn open_record(&self, class_name: &str, key: &str) -> RequestOutcome {
        let payload = Payload::new()
            .with("class_name", class_name)
            .with("key", key);
        self.connector
            .execute(RequestDescriptor::get(paths::OBJECT_OPEN).payload(payload))
            .await
    }

    /// Create a record from attribute values
    pub async fn create_record(&self, class_name: &str, values: Payload) -> RequestOutcome {
        let mut payload = values;
        payload.insert("class_name", class_name);
        payload.insert("is_new", true);
        self.save(payload).await
    }

    /// Create a record in a collection of an existing process record
    pub async fn create_process_record(&self, record: ProcessRecord) -> RequestOutcome {
        let mut payload = record.values;
        payload.insert("class_name", record.class_name);
        payload.insert("is_new", true);
        payload.insert("process_class_name", record.process_class_name);
        payload.insert("process_key", record.process_key);
        payload.insert("collection_name", record.collection_name);
        self.save(payload).await
    }

    /// Overwrite attribute values of an existing record
    pub async fn update_record(&self, class_name: &str, key: &str, values: Payload) -> RequestOutcome {
        let mut payload = values;
        payload.insert("class_name", class_name);
        payload.insert("key", key);
        payload.insert("is_new", false);
        self.save(payload).await
    }

    pub async fn delete_record(&self, class_name: &str, key: &str) -> RequestOutcome {
        let payload = Payload::new()
            .with("class_name", class_name)
            .with("key", key);
        self.connector
            .execute(RequestDescriptor::post(paths::OBJECT_DELETE).payload(payload))
            .await
    }

    async fn save(&self, payload: Payload) -> RequestOutcome {
        self.connector
            .execute(RequestDescriptor::post(paths::OBJECT_SAVE).payload(payload))
            .await
    }
}

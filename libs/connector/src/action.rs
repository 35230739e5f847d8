use tracing::debug;
use webdesk_fabric::{paths, Payload, RequestDescriptor, RequestOutcome};

use crate::connector::Connector;

/// Kind of business action, sent as `function_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Action run against a collection of the record
    Collection,
    /// Action that saves attribute values while it runs
    Update,
    /// Action with no input window
    Windowless,
    /// Link or unlink a related record
    AttachDetach,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Update => "update",
            Self::Windowless => "windowless",
            Self::AttachDetach => "attach_detach",
        }
    }
}

/// Business actions through `/object/invokeFunction.rails`
pub struct ActionApi<'a> {
    connector: &'a Connector,
}

impl<'a> ActionApi<'a> {
    pub(crate) fn new(connector: &'a Connector) -> Self {
        Self { connector }
    }

    pub async fn collection_action(
        &self,
        class_name: &str,
        key: &str,
        collection_name: &str,
        function_name: &str,
        values: Payload,
    ) -> RequestOutcome {
        let mut payload = values;
        payload.insert("collection_name", collection_name);
        self.invoke(ActionKind::Collection, class_name, key, function_name, payload)
            .await
    }

    pub async fn update_action(
        &self,
        class_name: &str,
        key: &str,
        function_name: &str,
        values: Payload,
    ) -> RequestOutcome {
        self.invoke(ActionKind::Update, class_name, key, function_name, values)
            .await
    }

    pub async fn windowless_action(
        &self,
        class_name: &str,
        key: &str,
        function_name: &str,
    ) -> RequestOutcome {
        self.invoke(ActionKind::Windowless, class_name, key, function_name, Payload::new())
            .await
    }

    /// Attach (`attach = true`) or detach a related record in a collection
    pub async fn attach_detach_action(
        &self,
        class_name: &str,
        key: &str,
        collection_name: &str,
        related_key: &str,
        attach: bool,
    ) -> RequestOutcome {
        let payload = Payload::new()
            .with("collection_name", collection_name)
            .with("related_key", related_key)
            .with("attach", attach);
        let function_name = if attach { "Attach" } else { "Detach" };
        self.invoke(ActionKind::AttachDetach, class_name, key, function_name, payload)
            .await
    }

    async fn invoke(
        &self,
        kind: ActionKind,
        class_name: &str,
        key: &str,
        function_name: &str,
        values: Payload,
    ) -> RequestOutcome {
        debug!("Invoking {} action {} on {}", kind.as_str(), function_name, class_name);
        let mut payload = values;
        payload.insert("class_name", class_name);
        payload.insert("key", key);
        payload.insert("function_name", function_name);
        payload.insert("function_type", kind.as_str());
        self.connector
            .execute(RequestDescriptor::post(paths::OBJECT_INVOKE_FUNCTION).payload(payload))
            .await
    }
}

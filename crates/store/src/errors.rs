//! Permission denials and the bus that reports them.
//!
//! Every rule check that fails produces a [`PermissionError`] carrying the
//! path, operation, and (for writes) the data that was rejected. The error is
//! returned to the caller and also emitted on the process-wide [`ErrorBus`],
//! whose listener logs it and reports it to Sentry.

use serde_json::{Value, json};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::rules::{Actor, DocPath, Operation, authorize};

/// A request rejected by the access rules.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Missing or insufficient permissions: {operation} on {path} was denied by the access rules")]
pub struct PermissionError {
    pub path: String,
    pub operation: Operation,
    pub request_resource_data: Option<Value>,
}

impl PermissionError {
    #[must_use]
    pub fn new(path: &DocPath, operation: Operation, request_resource_data: Option<Value>) -> Self {
        Self {
            path: path.to_string(),
            operation,
            request_resource_data,
        }
    }

    /// Serializable context: `{"path", "operation", "requestResourceData"}`.
    #[must_use]
    pub fn to_context_object(&self) -> Value {
        let mut context = json!({
            "path": self.path,
            "operation": self.operation,
        });
        if let (Some(data), Some(map)) = (&self.request_resource_data, context.as_object_mut()) {
            map.insert("requestResourceData".to_owned(), data.clone());
        }
        context
    }
}

/// Broadcast channel for permission errors.
#[derive(Debug, Clone)]
pub struct ErrorBus {
    tx: broadcast::Sender<PermissionError>,
}

impl Default for ErrorBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorBus {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    /// Publish an error. Having no listeners is not an error.
    pub fn emit(&self, error: PermissionError) {
        let _ = self.tx.send(error);
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PermissionError> {
        self.tx.subscribe()
    }

    /// Check a rule, emitting and returning the error when it denies.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError`] if `actor` may not perform `operation`
    /// on `path`.
    pub fn check(
        &self,
        actor: &Actor,
        path: &DocPath,
        operation: Operation,
        request_resource_data: Option<Value>,
    ) -> Result<(), PermissionError> {
        if authorize(actor, path, operation) {
            return Ok(());
        }
        let error = PermissionError::new(path, operation, request_resource_data);
        self.emit(error.clone());
        Err(error)
    }
}

/// Spawn the task that logs every denial and reports it to Sentry.
pub fn spawn_permission_listener(bus: &ErrorBus) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(error) => report(&error),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "permission error listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn report(error: &PermissionError) {
    let context = error.to_context_object();
    tracing::warn!(
        path = %error.path,
        operation = %error.operation,
        context = %context,
        "Permission denied"
    );
    sentry::with_scope(
        |scope| {
            scope.set_tag("rule.operation", error.operation.as_str());
            scope.set_extra("security_rule", context.clone());
        },
        || sentry::capture_error(error),
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use afrah_core::{ProductId, UserId};

    #[test]
    fn test_context_object() {
        let error = PermissionError::new(
            &DocPath::Product(ProductId::new(4)),
            Operation::Update,
            Some(json!({"name": "Ajwa Dates"})),
        );
        let context = error.to_context_object();
        assert_eq!(context["path"], "products/4");
        assert_eq!(context["operation"], "update");
        assert_eq!(context["requestResourceData"]["name"], "Ajwa Dates");

        let bare = PermissionError::new(&DocPath::Orders, Operation::List, None);
        assert!(bare.to_context_object().get("requestResourceData").is_none());
    }

    #[tokio::test]
    async fn test_check_emits_on_denial() {
        let bus = ErrorBus::new();
        let mut rx = bus.subscribe();

        let user = Actor::User(UserId::new(1));
        assert!(bus.check(&user, &DocPath::Products, Operation::List, None).is_ok());
        let denied = bus
            .check(&user, &DocPath::Contacts, Operation::List, None)
            .unwrap_err();
        assert_eq!(denied.path, "contacts");

        let received = rx.recv().await.unwrap();
        assert_eq!(received.path, "contacts");
        assert_eq!(received.operation, Operation::List);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_every_subscriber_receives() {
        let bus = ErrorBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        bus.emit(PermissionError::new(&DocPath::Users, Operation::List, None));
        assert_eq!(first.recv().await.unwrap().path, "users");
        assert_eq!(second.recv().await.unwrap().path, "users");
    }

    #[tokio::test]
    async fn test_listener_stops_when_bus_dropped() {
        let bus = ErrorBus::new();
        let handle = spawn_permission_listener(&bus);
        bus.emit(PermissionError::new(&DocPath::Admins, Operation::List, None));
        drop(bus);
        handle.await.unwrap();
    }
}

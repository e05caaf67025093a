//! Dry-run recording.
//!
//! In dry-run mode mutating calls are routed to a [`DryRunRecorder`] instead of
//! the remote service. The caller renders the recorded plan once the batch
//! returns.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of a planned mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Upload,
    Delete,
    Trash,
    Move,
    Update,
    UpdatePermission,
    DeletePermission,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Delete => "delete",
            Self::Trash => "trash",
            Self::Move => "move",
            Self::Update => "update",
            Self::UpdatePermission => "update_permission",
            Self::DeletePermission => "delete_permission",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mutation that would have been performed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedOperation {
    pub kind: OperationKind,
    /// Remote identifier of the target (empty for uploads, which have none yet)
    pub resource_id: String,
    /// Display name of the target
    pub resource_name: String,
    /// Human-readable description
    pub description: String,
    /// Operation-specific parameters
    pub parameters: Map<String, Value>,
    /// When the operation was recorded
    pub recorded_at: DateTime<Utc>,
}

impl PlannedOperation {
    /// Create a planned operation stamped with the current time
    pub fn new(
        kind: OperationKind,
        resource_id: impl Into<String>,
        resource_name: impl Into<String>,
        description: impl Into<String>,
        parameters: Map<String, Value>,
    ) -> Self {
        Self {
            kind,
            resource_id: resource_id.into(),
            resource_name: resource_name.into(),
            description: description.into(),
            parameters,
            recorded_at: Utc::now(),
        }
    }
}

/// Sink for planned operations. Implementations must be thread-safe:
/// batch workers record concurrently.
pub trait DryRunRecorder: Send + Sync {
    /// Record a planned operation
    fn record(&self, op: PlannedOperation);

    /// All recorded operations, in recording order
    fn recorded_operations(&self) -> Vec<PlannedOperation>;

    /// Drop all recorded operations
    fn clear(&self);

    /// Number of recorded operations
    fn count(&self) -> usize {
        self.recorded_operations().len()
    }
}

/// In-memory recorder
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    operations: RwLock<Vec<PlannedOperation>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the summary of everything recorded so far
    pub fn summary(&self) -> DryRunSummary {
        DryRunSummary::new(self.recorded_operations(), Vec::new())
    }
}

impl DryRunRecorder for MemoryRecorder {
    fn record(&self, op: PlannedOperation) {
        log::debug!("dry-run: [{}] {}", op.kind, op.description);
        self.operations.write().push(op);
    }

    fn recorded_operations(&self) -> Vec<PlannedOperation> {
        self.operations.read().clone()
    }

    fn clear(&self) {
        self.operations.write().clear();
    }

    fn count(&self) -> usize {
        self.operations.read().len()
    }
}

/// Outcome of a dry run: the plan plus per-kind counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DryRunSummary {
    pub operations: Vec<PlannedOperation>,
    pub total_count: usize,
    pub by_kind: BTreeMap<OperationKind, usize>,
    pub warnings: Vec<String>,
}

impl DryRunSummary {
    pub fn new(operations: Vec<PlannedOperation>, warnings: Vec<String>) -> Self {
        let mut by_kind = BTreeMap::new();
        for op in &operations {
            *by_kind.entry(op.kind).or_insert(0) += 1;
        }

        Self {
            total_count: operations.len(),
            operations,
            by_kind,
            warnings,
        }
    }
}

fn params(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Record a planned upload of a local file
pub fn record_upload(recorder: &dyn DryRunRecorder, path: &str, name: &str) {
    recorder.record(PlannedOperation::new(
        OperationKind::Upload,
        "",
        name,
        format!("Upload: {}", path),
        params(json!({ "path": path, "name": name })),
    ));
}

/// Record a planned delete; trash unless `permanent`
pub fn record_delete(recorder: &dyn DryRunRecorder, id: &str, name: &str, permanent: bool) {
    let (kind, description) = if permanent {
        (OperationKind::Delete, format!("Permanently delete: {}", name))
    } else {
        (OperationKind::Trash, format!("Trash: {}", name))
    };

    recorder.record(PlannedOperation::new(
        kind,
        id,
        name,
        description,
        params(json!({ "permanent": permanent })),
    ));
}

/// Record a planned move to another parent folder
pub fn record_move(
    recorder: &dyn DryRunRecorder,
    id: &str,
    name: &str,
    target_parent_id: &str,
    target_parent_name: &str,
) {
    recorder.record(PlannedOperation::new(
        OperationKind::Move,
        id,
        name,
        format!("Move '{}' to '{}'", name, target_parent_name),
        params(json!({
            "target_parent_id": target_parent_id,
            "target_parent_name": target_parent_name,
        })),
    ));
}

/// Record a planned metadata update
pub fn record_update(
    recorder: &dyn DryRunRecorder,
    id: &str,
    name: &str,
    fields: Map<String, Value>,
) {
    recorder.record(PlannedOperation::new(
        OperationKind::Update,
        id,
        name,
        format!("Update '{}'", name),
        fields,
    ));
}

/// Record a planned permission role change
pub fn record_permission_update(
    recorder: &dyn DryRunRecorder,
    file_id: &str,
    file_name: &str,
    permission_id: &str,
    new_role: &str,
) {
    recorder.record(PlannedOperation::new(
        OperationKind::UpdatePermission,
        file_id,
        file_name,
        format!("Update permission on '{}' to role '{}'", file_name, new_role),
        params(json!({ "permission_id": permission_id, "new_role": new_role })),
    ));
}

/// Record a planned permission removal
pub fn record_permission_delete(
    recorder: &dyn DryRunRecorder,
    file_id: &str,
    file_name: &str,
    permission_id: &str,
) {
    recorder.record(PlannedOperation::new(
        OperationKind::DeletePermission,
        file_id,
        file_name,
        format!("Remove permission from '{}'", file_name),
        params(json!({ "permission_id": permission_id })),
    ));
}

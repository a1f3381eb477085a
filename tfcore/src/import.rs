//! Import helpers for simple resources.

use crate::context::Context;
use crate::resource::{ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource};
use crate::types::{AttributePath, Diagnostic, DynamicValue};

/// Sets the import ID on a single state attribute.
///
/// Useful for resources whose import ID maps directly to one attribute, e.g.
/// ID "fs-123" -> state.file_system_id = "fs-123". The subsequent refresh
/// fills in the rest of the state.
pub fn import_state_passthrough_id(
    _ctx: &Context,
    attr_path: AttributePath,
    request: &ImportResourceStateRequest,
    response: &mut ImportResourceStateResponse,
) {
    let mut state = DynamicValue::empty_object();

    if let Err(e) = state.set_string(&attr_path, request.id.clone()) {
        response.diagnostics.push(
            Diagnostic::error(
                format!("Failed to set import ID: {}", e),
                format!(
                    "Could not set attribute '{:?}' to value '{}'",
                    attr_path, request.id
                ),
            )
            .with_attribute(attr_path),
        );
        return;
    }

    response.imported_resources.push(ImportedResource {
        type_name: request.type_name.clone(),
        state,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_sets_id_attribute() {
        let ctx = Context::new();
        let request = ImportResourceStateRequest {
            type_name: "efs_file_system_backup_policy".to_string(),
            id: "fs-12345678".to_string(),
        };
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };

        import_state_passthrough_id(
            &ctx,
            AttributePath::new("file_system_id"),
            &request,
            &mut response,
        );

        assert!(response.diagnostics.is_empty());
        assert_eq!(response.imported_resources.len(), 1);
        let state = &response.imported_resources[0].state;
        assert_eq!(
            state
                .get_string(&AttributePath::new("file_system_id"))
                .unwrap(),
            "fs-12345678"
        );
    }
}

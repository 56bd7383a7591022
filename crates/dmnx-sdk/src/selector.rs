//! Target model selection

use crate::error::{Result, SdkError};
use dmnx_core::ir::CompiledModel;
use std::path::Path;

/// Pick the index of the target model.
///
/// 1. An explicit name must match exactly, with no fallback.
/// 2. Otherwise the main file's stem is matched case-insensitively.
/// 3. Otherwise a single loaded model is the target.
/// 4. Otherwise the first model in load order is used.
pub fn select_model(models: &[CompiledModel], explicit: Option<&str>, main: &Path) -> Result<usize> {
    if let Some(name) = explicit {
        return models
            .iter()
            .position(|m| m.name == name)
            .ok_or_else(|| SdkError::ModelNotFound(name.to_string()));
    }

    let stem = main
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if let Some(index) = models.iter().position(|m| m.name.eq_ignore_ascii_case(&stem)) {
        tracing::debug!("Selected model '{}' by file name", models[index].name);
        return Ok(index);
    }

    match models {
        [] => Err(SdkError::ModelNotFound(stem)),
        [only] => {
            tracing::debug!("Selected the only loaded model '{}'", only.name);
            Ok(0)
        }
        [first, ..] => {
            tracing::warn!(
                "No model named '{}' among {} loaded models, using '{}'",
                stem,
                models.len(),
                first.name
            );
            Ok(0)
        }
    }
}

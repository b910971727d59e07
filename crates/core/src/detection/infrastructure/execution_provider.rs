use std::path::Path;

use ort::execution_providers::ExecutionProviderDispatch;
use ort::session::Session;

/// Inference threads per model. Three models run back to back on every
/// display frame; more threads only contend with the UI and camera threads.
const INTRA_THREADS: usize = 2;

fn platform_providers() -> Vec<ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        Vec::new()
    }
}

/// Opens an ONNX model on the platform accelerator, or the CPU when none
/// is registered.
pub fn load_session(model_path: &Path) -> Result<Session, Box<dyn std::error::Error>> {
    let providers = platform_providers();
    log::debug!(
        "Loading {} with {} accelerator provider(s)",
        model_path.display(),
        providers.len()
    );
    let session = Session::builder()?
        .with_execution_providers(providers)?
        .with_intra_threads(INTRA_THREADS)?
        .commit_from_file(model_path)?;
    Ok(session)
}

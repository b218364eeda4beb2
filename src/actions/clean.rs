//! Remove a preset's build artifacts.

use crate::log::LogSink;

use super::ActionContext;

/// Delete the build directory if present. Always succeeds.
pub async fn clean(ctx: &ActionContext, preset: &str) -> i32 {
    ctx.sink
        .info(&format!("Cleaning build artifacts with preset: {preset}"));
    let build_dir = ctx.build_dir(preset);
    if ctx.remove_build_dir(&build_dir).await {
        ctx.sink
            .info(&format!("Removed build directory: {}", build_dir.display()));
    } else {
        ctx.sink.info(&format!(
            "No build directory to remove: {}",
            build_dir.display()
        ));
    }
    0
}

//! Configure and compile a preset.

use crate::log::LogSink;

use super::ActionContext;

/// Configure with CMake, then build with the configured generator.
pub async fn build(ctx: &ActionContext, preset: &str) -> i32 {
    ctx.sink
        .info(&format!("Building project with preset: {preset}"));
    ctx.configure_and_build(preset, None).await
}

//! Package a preset from a fresh build directory.

use crate::log::LogSink;

use super::ActionContext;

/// Target producing the installable packages.
const PACKAGE_TARGET: &str = "Package";

/// Wipe the build directory, configure, then build the package target.
pub async fn deploy(ctx: &ActionContext, preset: &str) -> i32 {
    ctx.sink
        .info(&format!("Deploying project with preset: {preset}"));
    let build_dir = ctx.build_dir(preset);
    if ctx.remove_build_dir(&build_dir).await {
        ctx.sink.info(&format!(
            "Removed existing build directory: {}",
            build_dir.display()
        ));
    }
    ctx.configure_and_build(preset, Some(PACKAGE_TARGET)).await
}

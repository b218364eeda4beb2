//! Publish the Docker image a preset's CI jobs run in.

use crate::docker::{runs_in_container, DockerImages, ImageLookup};
use crate::log::LogSink;

use super::ActionContext;

/// Build parameter receiving the image name.
pub const DOCKER_IMAGE_PARAMETER: &str = "docker_image";

/// Resolve the preset's image and publish it as the `docker_image`
/// parameter. An empty value means no container is needed on this host;
/// such hosts never read the image table.
#[allow(clippy::unused_async)]
pub async fn define_docker_image(ctx: &ActionContext, preset: &str) -> i32 {
    if !runs_in_container(&ctx.host_os) {
        log_not_needed(ctx, preset);
        return publish(ctx, preset, "");
    }

    let path = ctx.config.docker_images_path(&ctx.root);
    let table = match DockerImages::load(&path) {
        Ok(table) => table,
        Err(err) => {
            ctx.sink.error(&err.to_string());
            return 1;
        }
    };

    let image = match table.resolve_for_os(preset, &ctx.host_os) {
        ImageLookup::Image(image) => image,
        ImageLookup::NotNeeded => {
            log_not_needed(ctx, preset);
            String::new()
        }
        ImageLookup::NotFound => {
            ctx.sink
                .error(&format!("Docker image not found for preset: {preset}"));
            ctx.sink.info("Available presets are:");
            for name in table.presets() {
                ctx.sink.info(&format!(" - {name}"));
            }
            return 1;
        }
    };

    publish(ctx, preset, &image)
}

fn log_not_needed(ctx: &ActionContext, preset: &str) {
    ctx.sink.info(&format!(
        "No Docker image needed for preset '{preset}' on this platform."
    ));
}

fn publish(ctx: &ActionContext, preset: &str, image: &str) -> i32 {
    ctx.sink
        .info(&format!("Docker image for preset '{preset}': {image}"));
    ctx.sink.publish_parameter(DOCKER_IMAGE_PARAMETER, image);
    0
}

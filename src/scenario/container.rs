//! Container scenarios

use crate::client::Operation;
use crate::error::{Result, SanityError};
use crate::naming::Resolution;
use crate::scenario::{expect_not_found, ScenarioContext};
use log::debug;

/// A new container exposes an object count and lists no objects
pub async fn create_container(ctx: &mut ScenarioContext<'_>) -> Result<()> {
    let suffix = ctx.namer.suffix(Resolution::Seconds);
    let name = ctx.create_tracked_container(&suffix).await?;

    let listing = ctx.client.get_container(&name).await?;
    debug!("Getting {} container details from the object storage", name);

    if !listing.has_object_count() {
        return Err(SanityError::operation_failed(
            Operation::GetContainer.as_str(),
            name.as_str(),
            "There is no container header in response",
        ));
    }
    if !listing.is_empty() {
        return Err(SanityError::operation_failed(
            Operation::GetContainer.as_str(),
            name.as_str(),
            format!("The container is not empty ({} objects)", listing.objects.len()),
        ));
    }

    Ok(())
}

/// A deleted container can no longer be read
pub async fn delete_container(ctx: &mut ScenarioContext<'_>) -> Result<()> {
    let suffix = ctx.namer.suffix(Resolution::Seconds);
    let name = ctx.create_tracked_container(&suffix).await?;

    ctx.client.delete_container(&name).await.map_err(|e| {
        SanityError::operation_failed(
            Operation::DeleteContainer.as_str(),
            name.as_str(),
            format!("Container could not be deleted: {}", e),
        )
    })?;

    expect_not_found(
        ctx.client.get_container(&name).await,
        Operation::GetContainer,
        &name,
    )?;
    // Only a container confirmed gone leaves the manifest
    ctx.tracker.untrack_container(&name);
    Ok(())
}

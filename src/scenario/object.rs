//! Object scenarios

use crate::client::{ObjectRef, Operation};
use crate::error::{Result, SanityError};
use crate::fixtures::{Fixture, FixtureSource};
use crate::integrity::{verify_distinct, verify_equal, Digest};
use crate::naming::{self, Resolution};
use crate::scenario::{expect_not_found, ScenarioContext};
use log::debug;

/// Upload a text fixture, download it and compare digests
pub async fn text_object_round_trip(ctx: &mut ScenarioContext<'_>) -> Result<()> {
    let suffix = ctx.namer.suffix(Resolution::SubSecond);
    let container = ctx.create_tracked_container(&suffix).await?;
    let object_name = naming::text_object_name(&suffix);

    let source = FixtureSource::local(ctx.settings.text_fixture_path());
    let fixture = ctx.materialize_tracked(&source).await?;

    round_trip(ctx, &container, &fixture, &object_name).await?;
    Ok(())
}

/// A deleted object can no longer be downloaded
pub async fn delete_object(ctx: &mut ScenarioContext<'_>) -> Result<()> {
    let suffix = ctx.namer.suffix(Resolution::SubSecond);
    let container = ctx.create_tracked_container(&suffix).await?;
    let object_name = naming::text_object_name(&suffix);
    let resource = ObjectRef::new(container.as_str(), object_name.as_str()).to_string();

    let source = FixtureSource::local(ctx.settings.text_fixture_path());
    let fixture = ctx.materialize_tracked(&source).await?;
    ctx.upload_tracked(&container, &fixture, &object_name).await?;

    ctx.client
        .delete_object(&container, &object_name)
        .await
        .map_err(|e| {
            SanityError::operation_failed(
                Operation::DeleteObject.as_str(),
                resource.as_str(),
                format!("Object could not be deleted: {}", e),
            )
        })?;

    let result = ctx
        .client
        .get_object(&container, &object_name, &ctx.settings.resources_path)
        .await;
    if let Ok(path) = &result {
        ctx.tracker.track_local_file(path);
    }
    expect_not_found(result, Operation::GetObject, &resource)?;
    ctx.tracker.untrack_object(&container, &object_name);
    Ok(())
}

/// Round trip a big remote fixture, then check a second one differs
pub async fn big_object_round_trip(ctx: &mut ScenarioContext<'_>) -> Result<()> {
    let settings = ctx.settings;
    let first_url = required_url(settings.big_file_url_1.as_deref(), "big_file_url_1")?;
    let second_url = required_url(settings.big_file_url_2.as_deref(), "big_file_url_2")?;

    let suffix = ctx.namer.suffix(Resolution::SubSecond);
    let container = ctx.create_tracked_container(&suffix).await?;
    let object_name = naming::big_object_name(&suffix);

    let source = FixtureSource::remote(first_url, naming::big_fixture_file_name());
    let fixture = ctx.materialize_tracked(&source).await?;
    require_big(&fixture, settings.min_big_object_size)?;

    let downloaded = round_trip(ctx, &container, &fixture, &object_name).await?;

    // Control payload: must not match what was just downloaded
    let second_suffix = ctx.namer.suffix(Resolution::SubSecond);
    let source = FixtureSource::remote(
        second_url,
        naming::big_control_file_name(&second_suffix),
    );
    let control = ctx.materialize_tracked(&source).await?;

    verify_distinct(
        "The second file and the downloaded file are the same",
        &control.digest,
        &downloaded,
    )
}

/// Upload, download and compare; returns the digest of the downloaded copy
async fn round_trip(
    ctx: &mut ScenarioContext<'_>,
    container: &str,
    fixture: &Fixture,
    object_name: &str,
) -> Result<Digest> {
    ctx.upload_tracked(container, fixture, object_name).await?;

    let path = ctx.download_tracked(container, object_name).await?;
    let remote = Digest::of_file(&path).await?;

    let resource = ObjectRef::new(container, object_name).to_string();
    verify_equal(&resource, &fixture.digest, &remote)?;
    debug!("{} matches its source ({})", resource, remote);

    Ok(remote)
}

fn required_url<'a>(url: Option<&'a str>, key: &str) -> Result<&'a str> {
    url.ok_or_else(|| SanityError::config_error(format!("swift.{} is not configured", key)))
}

fn require_big(fixture: &Fixture, min_size: u64) -> Result<()> {
    if fixture.size <= min_size {
        return Err(SanityError::fixture(
            fixture.source.label(),
            format!(
                "payload is {}, big objects must exceed {}",
                fixture.size_string(),
                bytesize::ByteSize::b(min_size)
            ),
        ));
    }
    Ok(())
}

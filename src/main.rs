//! event-catalog demo driver.
//!
//! Restores the previous snapshot, adds sample events, exercises the
//! duplicate and capacity rules, cancels events with observers attached,
//! waits for every delivery, then saves the catalog back to disk.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing_subscriber::EnvFilter;

use event_catalog::config::CatalogConfig;
use event_catalog::domain::{
    Concert, Conference, DeliveryBatch, Event, EventDetails, EventRegistry, Observer, Participant,
    Speaker,
};
use event_catalog::persistence::JsonEventStore;
use event_catalog::service::CatalogService;
use event_catalog::sink::{StatusSink, TracingSink};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CatalogConfig::from_env();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    tracing::info!(file = %config.events_file.display(), "starting event-catalog");

    let service = CatalogService::new(
        Arc::new(EventRegistry::new()),
        JsonEventStore::new(&config.events_file),
        Arc::new(TracingSink) as Arc<dyn StatusSink>,
    )
    .with_delivery_delay(config.delivery_delay);

    // 1. Previous state
    let restored = service.restore_snapshot().await;
    tracing::info!(loaded = restored.loaded, added = restored.added, "snapshot restored");

    // 2. Sample events, including one duplicate attempt
    let (conference, concert) = sample_events()?;
    for event in [conference.clone(), concert, conference] {
        if let Err(e) = service.add_event(event).await {
            tracing::warn!(code = e.error_code(), "handled: {e}");
        }
    }

    // 3. Fill the conference past its capacity
    let people: Vec<Arc<Participant>> = [
        ("P001", "Raoul"),
        ("P002", "Pierre"),
        ("P003", "Rene"),
        ("P004", "Ossombe"),
        ("P005", "Tony"),
        ("P006", "Frank"),
    ]
    .into_iter()
    .map(|(id, name)| {
        Arc::new(Participant::new(
            id,
            name,
            format!("{}@example.com", name.to_lowercase()),
        ))
    })
    .collect();
    for person in &people {
        if let Err(e) = service
            .register_participant("C001", Participant::clone(person))
            .await
        {
            tracing::warn!(code = e.error_code(), "handled: {e}");
        }
    }

    // 4. Observers and cancellations
    let mut batch = DeliveryBatch::default();
    for (event_id, observer_ids) in [("C001", &[0_usize, 1][..]), ("P001", &[2][..])] {
        for observer in observer_ids.iter().filter_map(|i| people.get(*i)) {
            service
                .observe(event_id, Arc::clone(observer) as Arc<dyn Observer>)
                .await?;
        }
        batch.extend(service.cancel_event(event_id).await?);
    }

    tracing::info!(pending = batch.len(), "waiting for asynchronous notifications");
    let delivered = batch
        .wait_all()
        .await
        .iter()
        .filter(|r| r.is_delivered())
        .count();
    tracing::info!(delivered, "notifications complete");

    // 5. Summary and snapshot
    service.describe_all().await;
    service.save_snapshot().await?;

    tracing::info!("event-catalog finished");
    Ok(())
}

fn sample_events() -> anyhow::Result<(Event, Event)> {
    let at = |y, m, d, h| {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, 0, 0))
            .ok_or_else(|| anyhow::anyhow!("invalid sample date {y}-{m}-{d}"))
    };

    let conference = Conference::new(
        EventDetails::new("C001", "AI Future Summit", at(2025, 7, 10, 9)?, "Online", 5)?,
        "Future of AI",
        vec![
            Speaker::new("S001", "Dr. Chana", "AI Danger"),
            Speaker::new("S002", "Mr. Onana", "Quantum Computing"),
        ],
    );
    let concert = Concert::new(
        EventDetails::new("P001", "Summer Beats", at(2025, 8, 15, 20)?, "Olembe Stadium", 5000)?,
        "Beyonce",
        "POP",
    );
    Ok((conference.into(), concert.into()))
}

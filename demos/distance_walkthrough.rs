//! Distance Walkthrough
//!
//! This example walks one student through the start of the distance
//! measurements stage and resumes the session from the store.
//!
//! Key concepts:
//! - Configuration from defaults, `hubbleds.toml` and `CDS_*` variables
//! - Gated forward steps and example-galaxy auto-advance
//! - Save-on-change after the initial load
//! - Resuming a remounted session from stored state
//!
//! Run with: cargo run --example distance_walkthrough

use hubbleds::config::StoryConfig;
use hubbleds::core::{Dataset, GalaxyData, QuestionOracle};
use hubbleds::quiz::QuizLog;
use hubbleds::session::StageSession;
use hubbleds::stages::DistanceStage;
use hubbleds::sync::{MemoryStore, SyncEnv};
use std::sync::Arc;

fn example_galaxy() -> GalaxyData {
    GalaxyData {
        id: "1576".to_string(),
        name: "NGC 3198".to_string(),
        ra: 154.98,
        decl: 45.55,
        z: 0.00221,
        rest_wave: 6565.0,
        element: "H-α".to_string(),
        spectrum: Vec::new(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = StoryConfig {
        update_db: true,
        ..StoryConfig::load()?
    };
    hubbleds::telemetry::init(&config)?;

    println!("=== Distance Walkthrough ===\n");

    let store = Arc::new(MemoryStore::new());
    let quiz: Arc<dyn QuestionOracle> = Arc::new(QuizLog::new());
    let mut session = StageSession::<DistanceStage>::new(
        "student-1",
        &config,
        Arc::clone(&quiz),
        SyncEnv::new(store.clone()),
    )?;

    let outcome = session.mount().await?;
    println!("Mounted: {:?}", outcome);
    println!("Step: {}", session.machine().current_step());

    session.update(|m| m.transition_next()).await?;
    println!("Step: {}", session.machine().current_step());

    let step = session
        .update(|m| m.select_galaxy(Dataset::Example, example_galaxy()))
        .await?;
    println!("Selected example galaxy, now at {}", step);

    // The ruler must be clicked exactly once before ang_siz4 opens.
    session.update(|m| m.transition_next()).await?;
    session.update(|m| m.transition_next()).await?;
    let blocked = session.update(|m| m.transition_next()).await?;
    println!("Before using the ruler: {}", blocked);

    session.update(|m| m.ruler_clicked()).await?;
    let step = session.update(|m| m.transition_next()).await?;
    println!("After using the ruler: {}", step);

    let distance = session
        .update(|m| {
            m.update_angular_size(Dataset::Example, "1576", 420.0)?;
            m.update_distance(Dataset::Example, "1576", 420.0)
        })
        .await??;
    println!("Estimated distance: {:.1} Mpc", distance);

    println!("\n--- Remounting ---\n");

    let mut resumed =
        StageSession::<DistanceStage>::new("student-1", &config, quiz, SyncEnv::new(store))?;
    let outcome = resumed.mount().await?;
    println!("Mounted: {:?}", outcome);
    println!("Resumed at: {}", resumed.machine().current_step());

    for record in resumed.machine().data().measurements(Dataset::Example).iter() {
        println!(
            "  {} angular size {:?}, distance {:?}",
            record.galaxy_id, record.ang_size_value, record.est_dist_value
        );
    }

    Ok(())
}

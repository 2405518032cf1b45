//! Runs one phase-0 round with three participants and an in-process leader.
//!
//! ```sh
//! cargo run -p cr2-phase0 --example phase0_round
//! ```

use anyhow::{bail, Context};
use cr2_phase0::{InMemoryLeader, Participant, Phase0Config};

const CONFIG: &str = r#"
chain_length = 4
phase_tag = "phase0"
"#;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Phase0Config::from_toml_str(CONFIG).context("loading round config")?;
    let ctx = config.crypto_context()?;
    let mut leader = InMemoryLeader::new(ctx, config.phase_tag.clone());

    let mut participants = Vec::new();
    for i in 1..=3 {
        let mut p = Participant::new(format!("participant_{i}"), &ctx)?;
        leader.register(p.verifying_key());
        p.generate_commitments(config.chain_length)?;
        participants.push(p);
    }

    for p in &participants {
        let verdict = p.submit_commitment(&mut leader, &config.phase_tag)?;
        println!("{:<16} {}  {}", p.name(), p.address(), verdict);
    }

    let Some(root) = leader.commitment_root() else {
        bail!(
            "round incomplete: {} of {} commitments",
            leader.submission_count(),
            leader.participant_count()
        );
    };
    println!("commitment root  {root}");
    Ok(())
}

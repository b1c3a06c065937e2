use rand::SeedableRng;
use rand::rngs::StdRng;

use wheelspin_video::{
    DEFAULT_CEILING_BYTES, Participant, PhaseFrames, QualityOverride, RenderSettings, SpinError,
    SpinRequest, Tier, generate_spin,
};

fn participants(count: usize) -> Vec<Participant> {
    (0..count)
        .map(|i| {
            Participant::new(
                format!("{}", 1000 + i),
                format!("Player{}", i),
                (i as u64 % 7) + 1,
            )
        })
        .collect()
}

fn total_delay(bytes: &[u8]) -> (usize, u32) {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::Indexed);
    let mut decoder = options.read_info(bytes).unwrap();
    let mut frames = 0;
    let mut delay = 0u32;
    while let Some(frame) = decoder.read_next_frame().unwrap() {
        frames += 1;
        delay += frame.delay as u32;
    }
    (frames, delay)
}

#[test]
fn five_participant_tier_one_spin_fits() {
    let req = SpinRequest::new("Five Friends", participants(5));
    let outcome = generate_spin(&req, &mut StdRng::seed_from_u64(11), None).unwrap();
    let settings = outcome.settings.unwrap();
    assert_eq!(settings.canvas_size, 480);
    assert_eq!(settings.total_frames(), 140);

    let gif = outcome.animation.unwrap();
    assert!(gif.len() <= DEFAULT_CEILING_BYTES);
    let (frames, delay) = total_delay(&gif.bytes);
    assert_eq!(frames, gif.frames);
    // Merging duplicate frames keeps the running time.
    assert_eq!(delay, 140 * 4);
}

#[test]
fn forty_participants_use_the_smallest_tier() {
    let req = SpinRequest::new("Big Crowd", participants(40));
    let outcome = generate_spin(&req, &mut StdRng::seed_from_u64(4), None).unwrap();
    let settings = outcome.settings.unwrap();
    assert_eq!(settings.canvas_size, 320);
    assert_eq!(settings.total_frames(), 90);
    assert!(!settings.show_entry_counts);

    let gif = outcome.animation.unwrap();
    assert_eq!((gif.width, gif.height), (320, 320));
    assert_eq!(total_delay(&gif.bytes).1, 90 * 6);
}

#[test]
fn fewer_participants_never_encode_larger() {
    let mut fixed = RenderSettings::for_tier(Tier::Medium, 24);
    fixed.canvas_size = 200;
    fixed.wheel_radius = 80;
    fixed.hub_radius = 18;
    fixed.frames = PhaseFrames::new(4, 6, 8, 3, 4);
    fixed.particle_count = 12;

    let size_for = |count: usize| {
        let mut req = SpinRequest::new("Fixed", participants(count));
        req.quality = QualityOverride::Custom(fixed);
        let outcome = generate_spin(&req, &mut StdRng::seed_from_u64(21), None).unwrap();
        outcome.animation.unwrap().len()
    };
    assert!(size_for(2) <= size_for(24));
}

#[test]
fn empty_snapshot_renders_nothing() {
    let req = SpinRequest::new("Nobody", Vec::new());
    assert_eq!(
        generate_spin(&req, &mut StdRng::seed_from_u64(0), None).unwrap_err(),
        SpinError::NoParticipants
    );
}

#[test]
fn zero_entry_wheel_still_spins() {
    let mut req = SpinRequest::new("Free For All", vec![
        Participant::new("a", "A", 0),
        Participant::new("b", "B", 0),
        Participant::new("c", "C", 0),
    ]);
    req.quality = QualityOverride::Tier(Tier::Low);
    let outcome = generate_spin(&req, &mut StdRng::seed_from_u64(6), None).unwrap();
    assert_eq!(
        outcome.winner.selection,
        wheelspin_video::SelectionKind::ZeroEntriesFallback
    );
    assert!(outcome.animation.is_some());
}

//! End-to-end session scenarios across the library modules.

use rand::rngs::StdRng;
use rand::SeedableRng;

use zen_timer::audio::{read_wav, synthesize_bowl, write_bowl};
use zen_timer::cli::{Args, Invocation};
use zen_timer::params::{BowlConfig, OverlayStyle, SessionConfig};
use zen_timer::pidfile::{stop_running, PidFile, StopOutcome};
use zen_timer::rendering::save_frame;
use zen_timer::session::{RenderState, TickAction, Timeline};
use zen_timer::water::FloaterField;

#[test]
fn one_second_session_runs_to_exit() {
    let config = SessionConfig {
        duration_secs: 1.0,
        ..SessionConfig::default()
    };
    let mut timeline = Timeline::new(config.clone());

    let progress = |t: f64| RenderState::at(t, config.duration_secs).progress;
    assert_eq!(progress(0.0), 0.0);
    assert_eq!(progress(0.5), 0.5);
    assert_eq!(progress(1.0), 1.0);

    let script = [
        (0.0, TickAction::Continue),
        (0.5, TickAction::Continue),
        (1.0, TickAction::PlayBowl),
        (1.5, TickAction::Continue),
        (15.0, TickAction::BeginFade),
        (17.0, TickAction::Continue),
        (18.5, TickAction::Exit),
    ];
    for (t, expected) in script {
        assert_eq!(timeline.advance(t), expected, "at t={}", t);
    }
}

#[test]
fn argv_resolves_session_length() {
    let resolve = |argv: &[&str]| match Args::parse_lenient(argv).invocation() {
        Invocation::Run(config) => config.duration_secs,
        other => panic!("unexpected {:?}", other),
    };
    assert_eq!(resolve(&["zen-timer", "30"]), 1800.0);
    assert_eq!(resolve(&["zen-timer", "abc"]), 2700.0);
    assert_eq!(resolve(&["zen-timer", "30", "extra"]), 1800.0);
    assert_eq!(resolve(&["zen-timer", "--bogus"]), 2700.0);
}

#[test]
fn stop_without_running_timer() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = PidFile::new(dir.path().join("zen-timer.pid"));

    let outcome = stop_running(&pid_file, |_| panic!("no signal expected"));
    assert_eq!(outcome, StopOutcome::NotRunning);
    assert_eq!(outcome.message(), "zen-timer: not running");
}

#[test]
fn bowl_sound_survives_the_temp_file() {
    let config = BowlConfig::default();
    let samples = synthesize_bowl(&config);
    assert_eq!(samples.len(), 529_200);

    let dir = tempfile::tempdir().unwrap();
    let path = write_bowl(&config, &dir.path().join("zen-bowl.wav")).unwrap();
    let decoded = read_wav(&path).unwrap();

    assert_eq!(decoded.sample_rate, 44100);
    assert_eq!(decoded.samples.len(), samples.len());
    assert!(decoded.samples.iter().all(|s| (-1.0..1.0).contains(s)));
    assert_eq!(decoded.samples[4410], samples[4410] as f32 / 32768.0);
}

#[test]
fn snapshot_writes_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");
    let style = OverlayStyle::default();
    let floaters = FloaterField::new(style.floater_count, &mut StdRng::seed_from_u64(9));
    let state = RenderState::at(600.0, 2700.0);

    save_frame(&path, &state, &style, &floaters, 2.0).unwrap();

    let image = image::open(&path).unwrap().to_rgba8();
    assert_eq!(image.dimensions(), (328, 88));
    // Something visible in the middle of the bar
    assert!(image.get_pixel(100, 44).0[3] > 0);
}

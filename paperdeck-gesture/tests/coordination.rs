//! End-to-end coordination tests: reveal mutual exclusion, drag
//! arbitration, scroll auto-close, and unmount safety under paused
//! virtual time.

use std::sync::Arc;
use std::time::Duration;

use futures::stream;
use paperdeck_gesture::motion::FRAME_PERIOD;
use paperdeck_gesture::{CardId, GestureConfig, ReleaseDecision, ScrollSample, SwipeDeck};

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .compact()
        .try_init();
}

fn deck() -> SwipeDeck {
    init_tracing();
    SwipeDeck::new(GestureConfig::default())
}

/// Let spawned tasks observe `frames` animation frames of virtual time.
async fn run_frames(frames: u32) {
    for _ in 0..frames {
        tokio::time::advance(FRAME_PERIOD).await;
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn reveal_swaps_between_cards() {
    let deck = deck();
    let a = CardId::new(1);
    let b = CardId::new(2);
    let card_a = deck.mount(a);
    let card_b = deck.mount(b);

    deck.registry().request_reveal(a).await.unwrap();
    assert!(deck.is_revealed(a));
    assert_eq!(card_a.offset().value(), deck.config().open_offset());

    deck.registry().request_reveal(b).await.unwrap();
    assert!(!deck.is_revealed(a));
    assert!(deck.is_revealed(b));
    assert_eq!(card_a.offset().value(), 0.0);
    assert_eq!(card_b.offset().value(), deck.config().open_offset());
    assert!(!deck.is_animation_running());
}

#[tokio::test(start_paused = true)]
async fn swap_animations_run_concurrently() {
    let deck = deck();
    let a = CardId::new(1);
    let b = CardId::new(2);
    let card_a = deck.mount(a);
    let card_b = deck.mount(b);

    deck.registry().request_reveal(a).await.unwrap();

    let registry = Arc::clone(deck.registry());
    let swap = tokio::spawn(async move { registry.request_reveal(b).await });
    tokio::task::yield_now().await;
    run_frames(5).await;

    // Mid-transition: A is closing while B is opening, at the same time.
    assert!(deck.is_animation_running());
    let a_pos = card_a.offset().value();
    let b_pos = card_b.offset().value();
    assert!(a_pos > deck.config().open_offset() + 2.0, "A not closing: {a_pos}");
    assert!(b_pos < -2.0, "B not opening: {b_pos}");

    swap.await.unwrap().unwrap();
    assert!(deck.is_revealed(b));
    assert_eq!(card_a.offset().value(), 0.0);
    assert_eq!(card_b.offset().value(), deck.config().open_offset());
    assert!(!deck.is_animation_running());
}

#[tokio::test(start_paused = true)]
async fn drag_refused_while_transition_in_flight() {
    let deck = deck();
    let a = CardId::new(1);
    let b = CardId::new(2);
    let _card_a = deck.mount(a);
    let mut card_b = deck.mount(b);

    let registry = Arc::clone(deck.registry());
    let reveal = tokio::spawn(async move { registry.request_reveal(a).await });
    tokio::task::yield_now().await;
    run_frames(2).await;

    assert!(deck.is_animation_running());
    assert!(!card_b.drag_start());

    reveal.await.unwrap().unwrap();
    assert!(card_b.drag_start());
}

#[tokio::test(start_paused = true)]
async fn cancelled_transition_reconciles_to_none() {
    let deck = deck();
    let a = CardId::new(1);
    let _card_a = deck.mount(a);

    let registry = Arc::clone(deck.registry());
    let reveal = tokio::spawn(async move { registry.request_reveal(a).await });
    tokio::task::yield_now().await;
    run_frames(2).await;
    assert!(deck.is_animation_running());

    reveal.abort();
    let _ = reveal.await;

    // The dropped transition must not leave a phantom revealed card or
    // a stuck in-flight flag.
    assert!(!deck.is_revealed(a));
    assert!(!deck.is_animation_running());
}

#[tokio::test(start_paused = true)]
async fn unmount_clears_revealed_state() {
    let deck = deck();
    let a = CardId::new(1);
    let card_a = deck.mount(a);

    deck.registry().request_reveal(a).await.unwrap();
    assert!(deck.is_revealed(a));

    drop(card_a);
    assert!(!deck.is_revealed(a));
    assert_eq!(deck.registry().active(), None);
}

#[tokio::test(start_paused = true)]
async fn unmount_during_open_animation_stays_closed() {
    let deck = deck();
    let a = CardId::new(1);
    let card_a = deck.mount(a);

    let registry = Arc::clone(deck.registry());
    let reveal = tokio::spawn(async move { registry.request_reveal(a).await });
    tokio::task::yield_now().await;
    run_frames(2).await;

    drop(card_a);
    // The transition finishes, but its card is gone; the registry must
    // not resurrect the id.
    reveal.await.unwrap().unwrap();
    assert!(!deck.is_revealed(a));
    assert_eq!(deck.registry().active(), None);
}

#[tokio::test(start_paused = true)]
async fn drag_release_past_threshold_reveals() {
    let deck = deck();
    let a = CardId::new(1);
    let b = CardId::new(2);
    let mut card_a = deck.mount(a);
    let mut card_b = deck.mount(b);

    assert!(card_a.drag_start());
    // While A drags, B may not start and knows someone else owns input.
    assert!(!card_b.drag_start());
    assert!(deck.is_other_card_dragging(b));
    assert!(!deck.is_other_card_dragging(a));

    card_a.drag_by(-40.0);
    assert_eq!(card_a.offset().value(), -40.0);

    let decision = card_a.drag_end(0.0).await.unwrap();
    assert_eq!(decision, Some(ReleaseDecision::Revealed));
    assert!(deck.is_revealed(a));
    assert!(card_b.drag_start());
}

#[tokio::test(start_paused = true)]
async fn drag_release_before_threshold_settles() {
    let deck = deck();
    let a = CardId::new(1);
    let mut card_a = deck.mount(a);

    assert!(card_a.drag_start());
    card_a.drag_by(-15.0);
    let decision = card_a.drag_end(0.0).await.unwrap();
    assert_eq!(decision, Some(ReleaseDecision::Settled));
    assert!(!deck.is_revealed(a));
    assert_eq!(card_a.offset().value(), 0.0);
}

#[tokio::test(start_paused = true)]
async fn partial_drag_of_revealed_card_snaps_back_open() {
    let deck = deck();
    let a = CardId::new(1);
    let mut card_a = deck.mount(a);

    deck.registry().request_reveal(a).await.unwrap();
    card_a.sync_revealed(true).await;
    assert_eq!(card_a.offset().value(), deck.config().open_offset());

    // Nudge the open card partway closed, then let go short of the
    // close boundary. The release decides Revealed again and must
    // animate the card back to fully open, not leave it mid-travel.
    assert!(card_a.drag_start());
    card_a.drag_by(48.0);
    assert_eq!(card_a.offset().value(), -40.0);

    let decision = card_a.drag_end(0.0).await.unwrap();
    assert_eq!(decision, Some(ReleaseDecision::Revealed));
    assert!(deck.is_revealed(a));
    assert_eq!(card_a.offset().value(), deck.config().open_offset());
}

#[tokio::test(start_paused = true)]
async fn evicted_drag_release_decides_nothing() {
    let deck = deck();
    let a = CardId::new(1);
    let b = CardId::new(2);
    let _card_a = deck.mount(a);
    let mut card_b = deck.mount(b);

    assert!(card_b.drag_start());
    card_b.drag_by(-40.0);

    // A long-press reveal of A starts a transition, evicting B's drag
    // ownership mid-flight.
    let registry = Arc::clone(deck.registry());
    let reveal = tokio::spawn(async move { registry.request_reveal(a).await });
    tokio::task::yield_now().await;
    run_frames(2).await;

    // B's release arrives late; it must not decide from the stale
    // position and override the transition's result.
    let decision = card_b.drag_end(0.0).await.unwrap();
    assert_eq!(decision, None);
    assert!(!card_b.is_dragging());

    reveal.await.unwrap().unwrap();
    assert!(deck.is_revealed(a));
    assert!(!deck.is_revealed(b));

    // The host's reveal-state sync re-homes the abandoned offset.
    card_b.sync_revealed(false).await;
    assert_eq!(card_b.offset().value(), 0.0);
}

#[tokio::test(start_paused = true)]
async fn fling_reveals_from_short_travel() {
    let deck = deck();
    let a = CardId::new(1);
    let mut card_a = deck.mount(a);

    assert!(card_a.drag_start());
    card_a.drag_by(-8.0);
    let decision = card_a.drag_end(-600.0).await.unwrap();
    assert_eq!(decision, Some(ReleaseDecision::Revealed));
    assert!(deck.is_revealed(a));
}

#[tokio::test(start_paused = true)]
async fn long_press_reveals_even_while_other_card_drags() {
    let deck = deck();
    let a = CardId::new(1);
    let b = CardId::new(2);
    let mut card_a = deck.mount(a);
    let mut card_b = deck.mount(b);

    assert!(card_b.drag_start());
    // Long-press is a discrete action; it does not need drag ownership,
    // and the transition it starts evicts B's drag.
    card_a.long_press_reveal().await.unwrap();
    assert!(deck.is_revealed(a));
    assert!(!deck.is_other_card_dragging(a));
    // B's drag ownership was evicted; its further deltas are ignored.
    card_b.drag_by(-30.0);
    assert_eq!(card_b.offset().value(), 0.0);
}

#[tokio::test(start_paused = true)]
async fn second_pointer_auto_settles() {
    let deck = deck();
    let a = CardId::new(1);
    let mut card_a = deck.mount(a);

    assert!(card_a.drag_start());
    card_a.drag_by(-50.0);
    card_a.pointer_joined().await.unwrap();
    assert!(!card_a.is_dragging());
    assert_eq!(card_a.offset().value(), 0.0);
    assert!(!deck.is_revealed(a));
}

#[tokio::test(start_paused = true)]
async fn external_close_resyncs_gesture_baseline() {
    let deck = deck();
    let a = CardId::new(1);
    let mut card_a = deck.mount(a);

    deck.registry().request_reveal(a).await.unwrap();
    card_a.sync_revealed(true).await;

    // A scroll closes the card out from under the controller.
    deck.close_all().await.unwrap();
    card_a.sync_revealed(false).await;

    assert_eq!(card_a.offset().value(), 0.0);
    assert!(card_a.drag_start());
    card_a.drag_by(-10.0);
    // Baseline was reconciled: the drag starts from zero, not -88.
    assert_eq!(card_a.offset().value(), -10.0);
}

#[tokio::test(start_paused = true)]
async fn scroll_close_is_noop_with_nothing_revealed() {
    let deck = deck();
    let a = CardId::new(1);
    let _card_a = deck.mount(a);

    let samples = stream::iter(vec![
        ScrollSample { first_visible: 0, offset: 120.0 },
        ScrollSample { first_visible: 3, offset: 4.0 },
    ]);
    deck.drive_scroll(samples).await.unwrap();
    assert_eq!(deck.registry().active(), None);
}

#[tokio::test(start_paused = true)]
async fn fast_fling_samples_all_close_revealed_card() {
    let deck = deck();
    let a = CardId::new(1);
    let card_a = deck.mount(a);
    deck.registry().request_reveal(a).await.unwrap();

    // A fling delivers many samples at once; the crossing one must not
    // be skipped.
    let samples = stream::iter((0..20).map(|i| ScrollSample {
        first_visible: i / 4,
        offset: (i as f32) * 17.0,
    }));
    deck.drive_scroll(samples).await.unwrap();

    assert_eq!(deck.registry().active(), None);
    assert_eq!(card_a.offset().value(), 0.0);
}

#[tokio::test(start_paused = true)]
async fn set_revealed_animated_round_trip() {
    let deck = deck();
    let a = CardId::new(1);
    let card_a = deck.mount(a);

    deck.set_revealed_animated(a, true).await.unwrap();
    assert!(deck.is_revealed(a));
    assert_eq!(card_a.offset().value(), deck.config().open_offset());

    deck.set_revealed_animated(a, false).await.unwrap();
    assert!(!deck.is_revealed(a));
    assert_eq!(card_a.offset().value(), 0.0);

    // Closing an already-closed card is a no-op.
    deck.set_revealed_animated(a, false).await.unwrap();
    assert!(!deck.is_revealed(a));
}

#[tokio::test(start_paused = true)]
async fn reveal_unknown_card_is_an_error() {
    let deck = deck();
    let err = deck.registry().request_reveal(CardId::new(99)).await;
    assert!(err.is_err());
}

#[tokio::test(start_paused = true)]
async fn scroll_close_survives_sustained_slow_scroll() {
    let deck = deck();
    let a = CardId::new(1);
    let _card_a = deck.mount(a);
    deck.registry().request_reveal(a).await.unwrap();

    // Steps of 10 units: the first sample seeds the checkpoint and no
    // single step crosses the 50-unit threshold, but the displacement
    // from the checkpoint does.
    let samples = stream::iter((1..=7).map(|i| ScrollSample {
        first_visible: 0,
        offset: (i as f32) * 10.0,
    }));
    deck.drive_scroll(samples).await.unwrap();
    assert_eq!(deck.registry().active(), None);
}

// Keeps virtual-time helpers exercised even when individual tests
// tighten their frame counts.
#[tokio::test(start_paused = true)]
async fn run_frames_advances_time() {
    let before = tokio::time::Instant::now();
    run_frames(3).await;
    assert!(tokio::time::Instant::now() - before >= Duration::from_millis(48));
}

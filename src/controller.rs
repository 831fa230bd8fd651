use log::{debug, info};
use std::collections::HashSet;

use crate::config::StackConfig;
use crate::data::GiftManifest;
use crate::deck::{Advance, Deck};
use crate::gesture::{GestureTracker, Horizontal, Outcome, Release, SwipeDirection, Vector};
use crate::input::PointerSample;
use crate::presentation::{transform_for_depth, CardTransform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiftPhase {
    Closed,
    Opening,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PendingKind {
    Reveal,
    Settle(Release),
}

/// A state change waiting for its animation to finish. The host schedules
/// `commit(token)` after `delay_ms`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingCommit {
    pub token: u64,
    pub kind: PendingKind,
    pub delay_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Committed {
    Revealed,
    Advanced { consumed: usize, exhausted: bool },
    Returned,
    Stale,
}

/// How a single card should be drawn right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardPose {
    Hidden,
    Stacked(CardTransform),
    Dragging(Vector),
    Exiting(SwipeDirection),
    Returning,
}

/// Whole widget state: gift lid, deck, drag tracking and the deferred commit.
#[derive(Debug, Clone, PartialEq)]
pub struct StackController {
    config: StackConfig,
    deck: Deck,
    gesture: GestureTracker,
    gift: GiftPhase,
    pending: Option<PendingCommit>,
    next_token: u64,
    failed_images: HashSet<String>,
}

impl StackController {
    pub fn new(manifest: GiftManifest) -> Self {
        Self {
            gesture: GestureTracker::new(manifest.config.gesture),
            deck: Deck::new(manifest.cards),
            config: manifest.config,
            gift: GiftPhase::Closed,
            pending: None,
            next_token: 0,
            failed_images: HashSet::new(),
        }
    }

    /// Swaps in a freshly loaded manifest, dropping any in-flight card motion.
    pub fn replace_manifest(&mut self, manifest: GiftManifest) {
        self.gesture = GestureTracker::new(manifest.config.gesture);
        self.deck = Deck::new(manifest.cards);
        self.config = manifest.config;
        self.failed_images.clear();
        if matches!(
            self.pending,
            Some(PendingCommit {
                kind: PendingKind::Settle(_),
                ..
            })
        ) {
            self.pending = None;
        }
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn gesture(&self) -> &GestureTracker {
        &self.gesture
    }

    pub fn gift(&self) -> GiftPhase {
        self.gift
    }

    pub fn pending(&self) -> Option<PendingCommit> {
        self.pending
    }

    pub fn is_busy(&self) -> bool {
        !self.gesture.is_idle()
    }

    pub fn open_gift(&mut self) -> Option<PendingCommit> {
        if self.gift != GiftPhase::Closed {
            return None;
        }
        self.gift = GiftPhase::Opening;
        info!("gift opening");
        Some(self.schedule(PendingKind::Reveal, self.config.timing.gift_open_ms))
    }

    pub fn begin_drag(&mut self, card: usize, sample: PointerSample) -> bool {
        if self.gift != GiftPhase::Open {
            return false;
        }
        let top = (!self.deck.is_exhausted()).then(|| self.deck.cursor());
        self.gesture
            .on_start(card, top, sample.pointer_id, sample.position, sample.time_ms)
    }

    pub fn drag_to(&mut self, sample: PointerSample) -> bool {
        self.gesture
            .on_move(sample.pointer_id, sample.position, sample.time_ms)
    }

    pub fn end_drag(&mut self, sample: PointerSample) -> Option<Release> {
        let release = self
            .gesture
            .on_end(sample.pointer_id, sample.position, sample.time_ms)?;
        debug!(
            "card {} released at ({:.0}, {:.0}) v=({:.0}, {:.0}): {:?}",
            release.card,
            release.offset.x,
            release.offset.y,
            release.velocity.x,
            release.velocity.y,
            release.outcome
        );
        self.settle(release);
        Some(release)
    }

    pub fn cancel_drag(&mut self, pointer_id: i32) -> Option<Release> {
        let release = self.gesture.on_cancel(pointer_id)?;
        self.settle(release);
        Some(release)
    }

    /// Swipes the top card without a drag.
    pub fn swipe_top(&mut self, horizontal: Horizontal) -> Option<Release> {
        if self.gift != GiftPhase::Open || self.deck.is_exhausted() {
            return None;
        }
        let release = self
            .gesture
            .swipe(self.deck.cursor(), SwipeDirection::horizontal(horizontal))?;
        self.settle(release);
        Some(release)
    }

    /// True when a release should fire the celebration effects.
    pub fn celebrates(&self, release: &Release) -> bool {
        match release.outcome {
            Outcome::Swiped(direction) => self
                .config
                .effects
                .celebrate_on
                .allows(direction.horizontal),
            Outcome::Returned => false,
        }
    }

    /// Applies the pending change if `token` is still current.
    pub fn commit(&mut self, token: u64) -> Committed {
        let Some(pending) = self.pending else {
            return Committed::Stale;
        };
        if pending.token != token {
            return Committed::Stale;
        }
        self.pending = None;

        match pending.kind {
            PendingKind::Reveal => {
                self.gift = GiftPhase::Open;
                info!("gift opened with {} cards", self.deck.len());
                Committed::Revealed
            }
            PendingKind::Settle(release) => {
                self.gesture.finish();
                match release.outcome {
                    Outcome::Swiped(_) if release.card == self.deck.cursor() => {
                        match self.deck.advance() {
                            Advance::Advanced { consumed } => {
                                let exhausted = self.deck.is_exhausted();
                                if exhausted {
                                    info!("all {} cards viewed", self.deck.len());
                                }
                                Committed::Advanced {
                                    consumed,
                                    exhausted,
                                }
                            }
                            Advance::AlreadyExhausted => Committed::Returned,
                        }
                    }
                    _ => Committed::Returned,
                }
            }
        }
    }

    /// Restores every card. An in-flight swipe or drag is abandoned.
    pub fn reset(&mut self) {
        self.deck.reset();
        self.gesture.reset();
        if matches!(
            self.pending,
            Some(PendingCommit {
                kind: PendingKind::Settle(_),
                ..
            })
        ) {
            self.pending = None;
        }
        info!("deck reset");
    }

    pub fn mark_image_failed(&mut self, card_id: &str) -> bool {
        self.failed_images.insert(card_id.to_string())
    }

    pub fn image_failed(&self, card_id: &str) -> bool {
        self.failed_images.contains(card_id)
    }

    pub fn pose(&self, index: usize) -> CardPose {
        let depth = index as isize - self.deck.cursor() as isize;
        let Some(transform) = transform_for_depth(depth) else {
            return CardPose::Hidden;
        };
        if depth == 0 {
            if let Some(state) = self.gesture.dragging() {
                return CardPose::Dragging(state.offset());
            }
            if let Some(release) = self.gesture.settling() {
                return match release.outcome {
                    Outcome::Swiped(direction) => CardPose::Exiting(direction),
                    Outcome::Returned => CardPose::Returning,
                };
            }
        }
        CardPose::Stacked(transform)
    }

    fn settle(&mut self, release: Release) {
        let delay_ms = match release.outcome {
            Outcome::Swiped(_) => self.config.timing.exit_ms,
            Outcome::Returned => self.config.timing.return_ms,
        };
        self.schedule(PendingKind::Settle(release), delay_ms);
    }

    fn schedule(&mut self, kind: PendingKind, delay_ms: u32) -> PendingCommit {
        let pending = PendingCommit {
            token: self.next_token,
            kind,
            delay_ms,
        };
        self.next_token += 1;
        self.pending = Some(pending);
        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::default_manifest;
    use crate::deck::CardItem;
    use crate::effects::{swipe_celebration, EffectsLayer};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample(pointer_id: i32, x: f64, y: f64, time_ms: f64) -> PointerSample {
        PointerSample {
            pointer_id,
            position: Vector::new(x, y),
            time_ms,
        }
    }

    fn manifest_of(count: usize) -> GiftManifest {
        GiftManifest {
            cards: (0..count)
                .map(|i| CardItem::from_image(format!("c{i}"), format!("c{i}.png")))
                .collect(),
            config: StackConfig::default(),
        }
    }

    fn opened(count: usize) -> StackController {
        let mut controller = StackController::new(manifest_of(count));
        let pending = controller.open_gift().unwrap();
        assert_eq!(pending.delay_ms, 800);
        assert_eq!(controller.commit(pending.token), Committed::Revealed);
        controller
    }

    fn commit_pending(controller: &mut StackController) -> Committed {
        let token = controller.pending().unwrap().token;
        controller.commit(token)
    }

    fn drag_swipe(controller: &mut StackController, dx: f64) -> Option<Release> {
        let card = controller.deck().cursor();
        if !controller.begin_drag(card, sample(1, 0.0, 0.0, 0.0)) {
            return None;
        }
        controller.drag_to(sample(1, dx / 2.0, 0.0, 400.0));
        controller.drag_to(sample(1, dx, 0.0, 800.0));
        controller.end_drag(sample(1, dx, 0.0, 820.0))
    }

    #[test]
    fn closed_gift_ignores_cards() {
        let mut controller = StackController::new(manifest_of(3));
        assert!(!controller.begin_drag(0, sample(1, 0.0, 0.0, 0.0)));
        assert!(controller.swipe_top(Horizontal::Right).is_none());
        assert!(controller.open_gift().is_some());
        assert_eq!(controller.gift(), GiftPhase::Opening);
        assert!(controller.open_gift().is_none());
        assert!(!controller.begin_drag(0, sample(1, 0.0, 0.0, 0.0)));
    }

    #[test]
    fn n_swipes_exhaust_a_deck_of_n() {
        for count in 1..6 {
            let mut controller = opened(count);
            for i in 0..count {
                let release = drag_swipe(&mut controller, 150.0).unwrap();
                assert!(matches!(release.outcome, Outcome::Swiped(_)));
                assert_eq!(controller.pending().unwrap().delay_ms, 600);
                assert_eq!(
                    commit_pending(&mut controller),
                    Committed::Advanced {
                        consumed: i,
                        exhausted: i + 1 == count
                    }
                );
            }
            assert!(controller.deck().is_exhausted());
            assert!(controller.deck().top_card().is_none());
            assert!(drag_swipe(&mut controller, 150.0).is_none());
            assert!(controller.swipe_top(Horizontal::Left).is_none());
        }
    }

    #[test]
    fn short_drag_returns_without_advancing() {
        let mut controller = opened(3);
        let release = drag_swipe(&mut controller, 30.0).unwrap();
        assert_eq!(release.outcome, Outcome::Returned);
        assert_eq!(controller.pose(0), CardPose::Returning);
        assert_eq!(controller.pending().unwrap().delay_ms, 300);
        assert_eq!(commit_pending(&mut controller), Committed::Returned);
        assert_eq!(controller.deck().cursor(), 0);
        assert!(matches!(controller.pose(0), CardPose::Stacked(t) if t.interactive));
    }

    #[test]
    fn only_top_card_accepts_drag() {
        let mut controller = opened(4);
        let before = controller.clone();
        for card in 1..4 {
            assert!(!controller.begin_drag(card, sample(1, 0.0, 0.0, 0.0)));
        }
        assert_eq!(controller, before);
        assert!(controller.begin_drag(0, sample(1, 0.0, 0.0, 0.0)));
        controller.drag_to(sample(1, 20.0, 5.0, 10.0));
        assert_eq!(controller.pose(0), CardPose::Dragging(Vector::new(20.0, 5.0)));
        assert!(!controller.begin_drag(0, sample(2, 0.0, 0.0, 0.0)));
    }

    #[test]
    fn reset_wins_over_pending_swipe() {
        let mut controller = opened(3);
        drag_swipe(&mut controller, 150.0);
        commit_pending(&mut controller);
        drag_swipe(&mut controller, 150.0);
        let stale = controller.pending().unwrap().token;

        controller.reset();
        assert_eq!(controller.pending(), None);
        assert_eq!(controller.commit(stale), Committed::Stale);
        assert_eq!(controller.deck().cursor(), 0);
        assert!(controller.gesture().is_idle());
        for index in 0..3 {
            assert!(matches!(controller.pose(index), CardPose::Stacked(_)));
        }
        assert!(controller.begin_drag(0, sample(3, 0.0, 0.0, 0.0)));
    }

    #[test]
    fn reset_mid_drag_and_when_exhausted() {
        let mut controller = opened(2);
        controller.begin_drag(0, sample(1, 0.0, 0.0, 0.0));
        controller.drag_to(sample(1, 80.0, 0.0, 10.0));
        controller.reset();
        assert!(controller.gesture().is_idle());
        assert_eq!(controller.pose(0), CardPose::Stacked(transform_for_depth(0).unwrap()));

        for _ in 0..2 {
            controller.swipe_top(Horizontal::Right).unwrap();
            commit_pending(&mut controller);
        }
        assert!(controller.deck().is_exhausted());
        controller.reset();
        assert_eq!(controller.deck().remaining(), 2);
    }

    #[test]
    fn interrupted_drag_frees_the_controls() {
        let mut controller = opened(3);
        assert!(controller.begin_drag(0, sample(4, 0.0, 0.0, 0.0)));
        controller.drag_to(sample(4, 250.0, 0.0, 50.0));
        assert!(controller.is_busy());
        assert!(controller.swipe_top(Horizontal::Right).is_none());

        let release = controller.cancel_drag(4).unwrap();
        assert_eq!(release.outcome, Outcome::Returned);
        assert_eq!(controller.pose(0), CardPose::Returning);
        assert!(controller.end_drag(sample(4, 250.0, 0.0, 60.0)).is_none());
        assert!(controller.cancel_drag(4).is_none());

        assert_eq!(commit_pending(&mut controller), Committed::Returned);
        assert!(!controller.is_busy());
        assert_eq!(controller.deck().cursor(), 0);
        assert!(controller.swipe_top(Horizontal::Right).is_some());
    }

    #[test]
    fn capture_loss_after_release_is_ignored() {
        let mut controller = opened(2);
        let release = drag_swipe(&mut controller, 150.0).unwrap();
        assert!(matches!(release.outcome, Outcome::Swiped(_)));
        assert!(controller.cancel_drag(1).is_none());
        assert_eq!(
            commit_pending(&mut controller),
            Committed::Advanced {
                consumed: 0,
                exhausted: false
            }
        );
    }

    #[test]
    fn programmatic_swipe_waits_for_commit() {
        let mut controller = opened(3);
        let release = controller.swipe_top(Horizontal::Left).unwrap();
        assert_eq!(
            controller.pose(0),
            CardPose::Exiting(SwipeDirection::horizontal(Horizontal::Left))
        );
        assert!(!controller.celebrates(&release));
        assert!(controller.swipe_top(Horizontal::Right).is_none());
        assert!(controller.is_busy());
        commit_pending(&mut controller);
        let release = controller.swipe_top(Horizontal::Right).unwrap();
        assert!(controller.celebrates(&release));
        assert_eq!(controller.commit(999), Committed::Stale);
        assert_eq!(controller.deck().cursor(), 1);
    }

    #[test]
    fn rendered_cards_match_remaining() {
        let mut controller = opened(5);
        loop {
            let shown = (0..5)
                .filter(|&i| controller.pose(i) != CardPose::Hidden)
                .count();
            assert_eq!(shown, controller.deck().remaining());
            if controller.swipe_top(Horizontal::Right).is_none() {
                break;
            }
            commit_pending(&mut controller);
        }
        assert_eq!(controller.deck().remaining(), 0);
    }

    #[test]
    fn effects_never_touch_the_deck() {
        let mut controller = opened(4);
        drag_swipe(&mut controller, 150.0);
        let before = controller.clone();
        let mut rng = StdRng::seed_from_u64(42);
        let mut layer = EffectsLayer::new();
        for _ in 0..25 {
            for (particles, _) in
                swipe_celebration(&mut rng, &controller.config().effects, &controller.config().theme)
            {
                layer.spawn(particles);
            }
        }
        assert_eq!(controller, before);
        assert!(layer.particle_count() > 0);
    }

    #[test]
    fn failed_images_survive_reset() {
        let mut controller = opened(2);
        assert!(controller.mark_image_failed("c1"));
        assert!(!controller.mark_image_failed("c1"));
        controller.reset();
        assert!(controller.image_failed("c1"));
        assert!(!controller.image_failed("c0"));
        assert!(controller.begin_drag(0, sample(1, 0.0, 0.0, 0.0)));
    }

    #[test]
    fn manifest_reload_drops_motion_but_keeps_gift() {
        let mut controller = opened(2);
        controller.swipe_top(Horizontal::Right);
        controller.replace_manifest(default_manifest());
        assert_eq!(controller.gift(), GiftPhase::Open);
        assert_eq!(controller.pending(), None);
        assert_eq!(controller.deck().len(), 4);
        assert!(controller.gesture().is_idle());
    }
}

pub mod config;
pub mod controller;
pub mod data;
pub mod deck;
pub mod effects;
pub mod gesture;
pub mod input;
pub mod presentation;

use config::Theme;
use controller::{CardPose, Committed, GiftPhase, PendingCommit, StackController};
use data::{default_manifest, load_manifest};
use deck::CardItem;
use effects::{ambient_sparkle, confetti, swipe_celebration, EffectsLayer, Particle, ParticleKind};
use gesture::{Horizontal, Release};
use gloo_events::EventListener;
use gloo_timers::callback::{Interval, Timeout};
use input::{capture_pointer, command_for_key, release_pointer, Command, PointerSample};
use log::{debug, info, warn};
use presentation::{drag_style, exit_style, return_style, swipe_indicator};
use rand::thread_rng;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{window, KeyboardEvent};
use yew::prelude::*;

const MOUNT_ID: &str = "gift-stack";

/// Live particle layer plus the snapshot yew renders from.
#[derive(Clone)]
struct EffectsHandle {
    live: Rc<RefCell<EffectsLayer>>,
    view: UseStateHandle<EffectsLayer>,
}

impl EffectsHandle {
    fn spawn(&self, particles: Vec<Particle>, lifetime_ms: u32) {
        let Some(id) = self.live.borrow_mut().spawn(particles) else {
            return;
        };
        self.view.set(self.live.borrow().clone());
        let handle = self.clone();
        Timeout::new(lifetime_ms, move || handle.expire(id)).forget();
    }

    fn expire(&self, id: u64) {
        if self.live.borrow_mut().expire(id) {
            self.view.set(self.live.borrow().clone());
        }
    }
}

/// Owns the controller for the component. Every mutation goes through
/// `update` so the rendered snapshot never lags the live state.
#[derive(Clone)]
struct StackHandle {
    live: Rc<RefCell<StackController>>,
    view: UseStateHandle<StackController>,
    effects: EffectsHandle,
}

impl StackHandle {
    fn update<R>(&self, f: impl FnOnce(&mut StackController) -> R) -> R {
        let result = f(&mut self.live.borrow_mut());
        self.view.set(self.live.borrow().clone());
        result
    }

    fn run(&self, command: Command) {
        match command {
            Command::OpenGift => {
                if let Some(pending) = self.update(|stack| stack.open_gift()) {
                    self.schedule(pending);
                }
            }
            Command::Swipe(side) => {
                let release = self.update(|stack| stack.swipe_top(side));
                self.released(release);
            }
            Command::Reset => self.update(|stack| stack.reset()),
        }
    }

    fn released(&self, release: Option<Release>) {
        let Some(release) = release else {
            return;
        };
        let (celebrate, pending, config) = {
            let stack = self.live.borrow();
            (stack.celebrates(&release), stack.pending(), stack.config().clone())
        };
        if celebrate {
            let mut rng = thread_rng();
            for (particles, lifetime_ms) in swipe_celebration(&mut rng, &config.effects, &config.theme)
            {
                self.effects.spawn(particles, lifetime_ms);
            }
        }
        if let Some(pending) = pending {
            self.schedule(pending);
        }
    }

    fn schedule(&self, pending: PendingCommit) {
        let handle = self.clone();
        Timeout::new(pending.delay_ms, move || handle.commit(pending.token)).forget();
    }

    fn commit(&self, token: u64) {
        match self.update(|stack| stack.commit(token)) {
            Committed::Revealed => {
                let config = self.live.borrow().config().clone();
                let pieces = confetti(
                    &mut thread_rng(),
                    config.effects.gift_confetti_count,
                    &config.theme.confetti_colors,
                );
                self.effects.spawn(pieces, config.effects.confetti_lifetime_ms);
            }
            Committed::Stale => debug!("ignoring stale commit {}", token),
            Committed::Advanced { .. } | Committed::Returned => {}
        }
    }
}

#[function_component(App)]
fn app() -> Html {
    let live_stack = use_mut_ref(|| StackController::new(default_manifest()));
    let stack_view = {
        let live_stack = live_stack.clone();
        use_state(move || live_stack.borrow().clone())
    };
    let live_effects = use_mut_ref(EffectsLayer::new);
    let effects_view = use_state(EffectsLayer::new);

    let handle = StackHandle {
        live: live_stack,
        view: stack_view.clone(),
        effects: EffectsHandle {
            live: live_effects,
            view: effects_view.clone(),
        },
    };

    {
        let handle = handle.clone();
        use_effect_with_deps(
            move |_| {
                spawn_local(async move {
                    match load_manifest().await {
                        Ok(manifest) => {
                            info!("loaded {} cards from manifest", manifest.cards.len());
                            handle.update(|stack| stack.replace_manifest(manifest));
                        }
                        Err(err) => warn!("Falling back to built-in cards: {}", err),
                    }
                });
                || ()
            },
            (),
        );
    }

    {
        let handle = handle.clone();
        use_effect_with_deps(
            move |_| {
                let listener = window().map(|window| {
                    EventListener::new(&window, "keydown", move |event| {
                        let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                            return;
                        };
                        if event.repeat() {
                            return;
                        }
                        let gift_open = handle.live.borrow().gift() == GiftPhase::Open;
                        if let Some(command) = command_for_key(&event.key(), gift_open) {
                            event.prevent_default();
                            handle.run(command);
                        }
                    })
                });
                move || drop(listener)
            },
            (),
        );
    }

    {
        let effects = handle.effects.clone();
        use_effect_with_deps(
            move |ambient: &Option<(u32, u32)>| {
                let interval = ambient.map(|(every_ms, lifetime_ms)| {
                    Interval::new(every_ms, move || {
                        let sparkle = ambient_sparkle(&mut thread_rng(), lifetime_ms);
                        effects.spawn(vec![sparkle], lifetime_ms);
                    })
                });
                move || drop(interval)
            },
            stack_view.config().ambient_sparkle(),
        );
    }

    let stack = &*stack_view;
    let body = match stack.gift() {
        GiftPhase::Closed | GiftPhase::Opening => render_gift(stack.gift(), &handle),
        GiftPhase::Open => render_stack(stack, &effects_view, &handle),
    };

    html! {
        <div class="gift-stack-app">
            <div class="confetti-layer">
                { render_particles(&effects_view, ParticleKind::Confetti) }
            </div>
            <div class="sparkle-layer">
                { render_particles(&effects_view, ParticleKind::Sparkle) }
            </div>
            { body }
        </div>
    }
}

fn render_gift(phase: GiftPhase, handle: &StackHandle) -> Html {
    let on_open = {
        let handle = handle.clone();
        Callback::from(move |_: MouseEvent| handle.run(Command::OpenGift))
    };
    let opened = phase == GiftPhase::Opening;

    html! {
        <div class="gift-container"
            tabindex="0"
            role="button"
            aria-label="Click to open gift and reveal swipeable image cards"
            onclick={on_open}>
            <div class={classes!("gift-box", if opened { Some("gift-opened") } else { None })}>
                <div class="gift-lid"></div>
                <div class="gift-body"></div>
                <div class="gift-ribbon"></div>
            </div>
            <p class="gift-hint">{ "Click or press Enter to open" }</p>
        </div>
    }
}

fn render_stack(
    stack: &StackController,
    effects: &UseStateHandle<EffectsLayer>,
    handle: &StackHandle,
) -> Html {
    let deck = stack.deck();
    let busy = stack.is_busy();
    let config = stack.config();

    let progress = if deck.is_exhausted() {
        format!("{} of {} viewed", deck.len(), deck.len())
    } else {
        format!("Card {} of {}", deck.cursor() + 1, deck.len())
    };

    let on_reject = {
        let handle = handle.clone();
        Callback::from(move |_: MouseEvent| handle.run(Command::Swipe(Horizontal::Left)))
    };
    let on_like = {
        let handle = handle.clone();
        Callback::from(move |_: MouseEvent| handle.run(Command::Swipe(Horizontal::Right)))
    };
    let on_reset = {
        let handle = handle.clone();
        Callback::from(move |_: MouseEvent| handle.run(Command::Reset))
    };

    let empty_state = if deck.is_exhausted() {
        html! {
            <div class="empty-state show">
                <div class="empty-icon">{ "🎉" }</div>
                <h3>{ "All cards viewed!" }</h3>
                <p>{ "Click reset to see them again" }</p>
                <button class="reset-button" onclick={on_reset.clone()}>{ "Reset Cards" }</button>
            </div>
        }
    } else {
        html! {}
    };

    html! {
        <div class="stack-view">
            <p class="stack-progress">{ progress }</p>
            <div class="card-stack">
                { for deck.visible().map(|(index, _, card)| {
                    render_card(index, card, stack.pose(index), stack, &config.theme, handle)
                }) }
                { render_particles(effects, ParticleKind::Burst) }
                { empty_state }
            </div>
            <div class="stack-controls">
                <button class="control-button reject" aria-label="Pass"
                    disabled={busy || deck.is_exhausted()} onclick={on_reject}>{ "✕" }</button>
                <button class="control-button reset" aria-label="Reset cards"
                    onclick={on_reset}>{ "↻" }</button>
                <button class="control-button like" aria-label="Like"
                    disabled={busy || deck.is_exhausted()} onclick={on_like}>{ "♥" }</button>
            </div>
        </div>
    }
}

fn render_card(
    index: usize,
    card: &CardItem,
    pose: CardPose,
    stack: &StackController,
    theme: &Theme,
    handle: &StackHandle,
) -> Html {
    let timing = stack.config().timing;
    let (style, indicator) = match pose {
        CardPose::Hidden => return html! {},
        CardPose::Stacked(transform) => (transform.to_style(), None),
        CardPose::Dragging(offset) => (drag_style(offset), swipe_indicator(offset.x)),
        CardPose::Exiting(direction) => (exit_style(direction, timing.exit_ms), None),
        CardPose::Returning => (return_style(timing.return_ms), None),
    };

    let pointer_down = {
        let handle = handle.clone();
        Callback::from(move |event: PointerEvent| {
            event.prevent_default();
            let sample = PointerSample::from_event(&event);
            if handle.update(|stack| stack.begin_drag(index, sample)) {
                capture_pointer(&event);
            }
        })
    };

    let pointer_move = {
        let handle = handle.clone();
        Callback::from(move |event: PointerEvent| {
            if handle.live.borrow().gesture().dragging().is_none() {
                return;
            }
            event.prevent_default();
            let sample = PointerSample::from_event(&event);
            handle.update(|stack| stack.drag_to(sample));
        })
    };

    let pointer_up = {
        let handle = handle.clone();
        Callback::from(move |event: PointerEvent| {
            if handle.live.borrow().gesture().dragging().is_none() {
                return;
            }
            release_pointer(&event);
            let sample = PointerSample::from_event(&event);
            let release = handle.update(|stack| stack.end_drag(sample));
            handle.released(release);
        })
    };

    let pointer_cancel = {
        let handle = handle.clone();
        Callback::from(move |event: PointerEvent| {
            if handle.live.borrow().gesture().dragging().is_none() {
                return;
            }
            release_pointer(&event);
            let release = handle.update(|stack| stack.cancel_drag(event.pointer_id()));
            handle.released(release);
        })
    };

    let label = card
        .title
        .clone()
        .unwrap_or_else(|| format!("Card {}", index + 1));

    let visual = if stack.image_failed(&card.id) {
        html! {
            <div class="card-placeholder" style={format!("background: {};", theme.placeholder_for(index))}>
                <div class="placeholder-icon">{ "🎁" }</div>
                <div class="placeholder-title">{ "Image not found" }</div>
                <div class="placeholder-label">{ format!("Card {}", index + 1) }</div>
            </div>
        }
    } else {
        let on_error = {
            let handle = handle.clone();
            let id = card.id.clone();
            let image = card.image.clone();
            Callback::from(move |_: Event| {
                warn!("Image {} failed to load, showing placeholder", image);
                handle.update(|stack| stack.mark_image_failed(&id));
            })
        };
        html! {
            <img class="card-image" src={card.image.clone()} alt={label.clone()}
                draggable="false" onerror={on_error} />
        }
    };

    let text = if card.title.is_some() || card.subtitle.is_some() || card.description.is_some() {
        html! {
            <div class="card-text">
                if let Some(title) = &card.title { <h3 class="card-title">{ title }</h3> }
                if let Some(subtitle) = &card.subtitle { <p class="card-subtitle">{ subtitle }</p> }
                if let Some(description) = &card.description {
                    <p class="card-description">{ description }</p>
                }
            </div>
        }
    } else {
        html! {}
    };

    let indicator_style = |side: Horizontal| match indicator {
        Some((active, opacity)) if active == side => format!("opacity: {:.2};", opacity),
        _ => String::new(),
    };
    let indicator_class = |side: Horizontal| match indicator {
        Some((active, _)) if active == side => Some("active"),
        _ => None,
    };

    html! {
        <div key={card.id.clone()}
            class="stack-card"
            style={style}
            onpointerdown={pointer_down}
            onpointermove={pointer_move}
            onpointerup={pointer_up}
            onpointercancel={pointer_cancel.clone()}
            onlostpointercapture={pointer_cancel}>
            <div class="card-content">
                { visual }
                { text }
                <div class="card-overlay">
                    <div class={classes!("swipe-indicator", "left", indicator_class(Horizontal::Left))}
                        style={indicator_style(Horizontal::Left)}>{ "PASS" }</div>
                    <div class={classes!("swipe-indicator", "right", indicator_class(Horizontal::Right))}
                        style={indicator_style(Horizontal::Right)}>{ "LIKE" }</div>
                </div>
            </div>
        </div>
    }
}

fn render_particles(effects: &UseStateHandle<EffectsLayer>, kind: ParticleKind) -> Html {
    effects
        .batches()
        .iter()
        .flat_map(|batch| {
            batch
                .particles
                .iter()
                .enumerate()
                .filter(move |(_, particle)| particle.kind == kind)
                .map(move |(i, particle)| {
                    html! {
                        <div key={format!("{}-{}", batch.id, i)}
                            class={particle.kind.class()}
                            style={particle.style()}></div>
                    }
                })
        })
        .collect::<Html>()
}

#[wasm_bindgen(start)]
pub fn run_app() {
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
    let root = window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(MOUNT_ID));
    match root {
        Some(root) => {
            yew::Renderer::<App>::with_root(root).render();
        }
        None => {
            yew::Renderer::<App>::new().render();
        }
    }
}

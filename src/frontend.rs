use crate::config::{
    BrandConfig, CaseStudyConfig, ContactConfig, ContactCopy, GrowthConfig, HeroConfig,
    PricingTier, ServiceConfig, SiteConfig,
};
use crate::counter::{CounterAnimation, CounterState, FrameCallback, FrameScheduler};
use crate::format::group_thousands;
use crate::links::ContactLinks;
use crate::logging::{self, log_event};
use crate::scroll_spy::{
    observation_thresholds, ScrollSpy, VisibilityCallback, VisibilityObserver,
};
use crate::section::SectionId;
use js_sys::{Array, Date};
use log::Level;
use serde_json::json;
use std::{cell::RefCell, collections::HashMap, rc::Rc};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, Document, Element, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, Performance, Window,
};
use yew::prelude::*;

fn document() -> Option<Document> {
    window()?.document()
}

fn element_by_id(id: &str) -> Option<Element> {
    document()?.get_element_by_id(id)
}

fn visible_fraction(entry: &IntersectionObserverEntry) -> f64 {
    if entry.is_intersecting() {
        entry.intersection_ratio()
    } else {
        0.0
    }
}

type EntriesHandler = Closure<dyn FnMut(Array, IntersectionObserver)>;

/// One `IntersectionObserver` dispatching entries to per-element callbacks by id.
struct DomVisibilityObserver {
    observer: Option<IntersectionObserver>,
    callbacks: Rc<RefCell<HashMap<String, VisibilityCallback>>>,
    _handler: EntriesHandler,
}

impl DomVisibilityObserver {
    fn new(thresholds: &[f64]) -> Self {
        let callbacks: Rc<RefCell<HashMap<String, VisibilityCallback>>> = Rc::default();

        let handler: EntriesHandler = {
            let callbacks = Rc::clone(&callbacks);
            Closure::new(move |entries: Array, _observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let entry: IntersectionObserverEntry = entry.unchecked_into();
                    let id = entry.target().id();
                    let callback = callbacks.borrow().get(&id).cloned();
                    if let Some(callback) = callback {
                        callback(visible_fraction(&entry));
                    }
                }
            })
        };

        let ladder: Array = thresholds.iter().copied().map(JsValue::from_f64).collect();
        let init = IntersectionObserverInit::new();
        init.set_threshold(&ladder);

        let observer =
            IntersectionObserver::new_with_options(handler.as_ref().unchecked_ref(), &init).ok();
        if observer.is_none() {
            log_event(
                Level::Warn,
                "observer_unavailable",
                json!({ "capability": "IntersectionObserver" }),
            );
        }

        Self {
            observer,
            callbacks,
            _handler: handler,
        }
    }
}

impl VisibilityObserver for DomVisibilityObserver {
    fn watch(&mut self, id: &str, on_change: VisibilityCallback) -> bool {
        let Some(observer) = self.observer.as_ref() else {
            return false;
        };
        let Some(element) = element_by_id(id) else {
            return false;
        };

        self.callbacks.borrow_mut().insert(id.to_string(), on_change);
        observer.observe(&element);
        true
    }

    fn unwatch(&mut self, id: &str) {
        self.callbacks.borrow_mut().remove(id);
        if let (Some(observer), Some(element)) = (self.observer.as_ref(), element_by_id(id)) {
            observer.unobserve(&element);
        }
    }

    fn disconnect(&mut self) {
        self.callbacks.borrow_mut().clear();
        if let Some(observer) = self.observer.as_ref() {
            observer.disconnect();
        }
    }
}

/// `requestAnimationFrame` timed against `performance.now()`.
#[derive(Clone)]
struct AnimationFrameScheduler {
    window: Option<Window>,
    performance: Option<Performance>,
}

impl AnimationFrameScheduler {
    fn new() -> Self {
        let window = window();
        let performance = window.as_ref().and_then(Window::performance);
        Self {
            window,
            performance,
        }
    }
}

impl FrameScheduler for AnimationFrameScheduler {
    fn now(&self) -> f64 {
        self.performance
            .as_ref()
            .map(Performance::now)
            .unwrap_or(0.0)
    }

    fn schedule_next(&self, callback: FrameCallback) {
        let Some(window) = self.window.as_ref() else {
            return;
        };

        let frame = Closure::once_into_js(move |timestamp: f64| callback(timestamp));
        if window
            .request_animation_frame(frame.unchecked_ref())
            .is_err()
        {
            log_event(
                Level::Warn,
                "observer_unavailable",
                json!({ "capability": "requestAnimationFrame" }),
            );
        }
    }
}

#[derive(Properties, PartialEq)]
struct SiteHeaderProps {
    brand: BrandConfig,
    sections: Vec<SectionId>,
    active: SectionId,
}

#[function_component(SiteHeader)]
fn site_header(props: &SiteHeaderProps) -> Html {
    html! {
        <header class="site-header">
            <div class="site-header-inner">
                <div class="brand">
                    <img class="brand-logo" src={props.brand.logo.src.clone()} alt={props.brand.logo.alt.clone()} />
                    <div>
                        <div class="brand-name">{props.brand.name.clone()}</div>
                        <div class="brand-tagline muted">{props.brand.tagline.clone()}</div>
                    </div>
                </div>

                <div class="header-actions">
                    <nav class="site-nav" aria-label="Sections">
                        { for props.sections.iter().map(|section| {
                            let is_active = *section == props.active;
                            html! {
                                <a
                                    key={section.as_str()}
                                    href={section.anchor()}
                                    class={classes!("nav-link", is_active.then_some("is-active"))}
                                    aria-current={is_active.then_some("true")}
                                >
                                    {section.label()}
                                </a>
                            }
                        }) }
                    </nav>
                    <a class="button button-primary" href={SectionId::Contact.anchor()}>{"Get Free Audit"}</a>
                </div>
            </div>
        </header>
    }
}

#[derive(Properties, PartialEq)]
struct HeroProps {
    hero: HeroConfig,
}

#[function_component(Hero)]
fn hero(props: &HeroProps) -> Html {
    let hero = &props.hero;

    html! {
        <section id={SectionId::Home.as_str()} class="hero">
            <div class="hero-grid">
                <div class="hero-copy">
                    <p class="badge"><span class="dot" />{hero.badge.clone()}</p>
                    <h1>
                        {format!("{} ", hero.headline)}
                        <span class="accent">{hero.highlight.clone()}</span>
                    </h1>
                    <p class="hero-channels">{hero.channels.clone()}</p>
                    <div class="cta-row">
                        <a class="button button-primary" href={SectionId::Contact.anchor()}>{"Get Free Audit (24 hrs)"}</a>
                        <a class="button button-ghost" href={SectionId::Work.anchor()}>{"View Case Studies"}</a>
                    </div>
                    <div class="stat-row">
                        { for hero.stats.iter().map(|stat| html! {
                            <div key={stat.value.clone()} class="stat-tile">
                                <div class="stat-value">{stat.value.clone()}</div>
                                {stat.label.clone()}
                            </div>
                        }) }
                    </div>
                </div>

                <div class="card audit-card">
                    <div class="audit-card-head">
                        <div>
                            <div class="muted">{"Quick Audit Preview"}</div>
                            <div class="card-title">{"What you’ll receive"}</div>
                        </div>
                        <div class="pill">{"PDF Report"}</div>
                    </div>
                    <ul class="audit-items">
                        { for hero.audit_items.iter().map(|item| html! {
                            <li key={item.clone()}><span class="dot" /><span>{item.clone()}</span></li>
                        }) }
                    </ul>
                    <div class="results">
                        <div class="muted small">{"Typical results (30–60 days)"}</div>
                        <div class="stat-row">
                            { for hero.results.iter().map(|result| html! {
                                <div key={result.label.clone()} class="stat-tile">
                                    <div class="stat-value">{result.value.clone()}</div>
                                    <div class="muted small">{result.label.clone()}</div>
                                </div>
                            }) }
                        </div>
                    </div>
                    <div class="cta-row">
                        <a class="button button-primary" href={SectionId::Contact.anchor()}>{"Request Free Audit"}</a>
                        <a class="button button-ghost" href={SectionId::Pricing.anchor()}>{"View Pricing"}</a>
                    </div>
                </div>
            </div>
        </section>
    }
}

#[derive(Properties, PartialEq)]
struct ServicesProps {
    services: Vec<ServiceConfig>,
}

#[function_component(Services)]
fn services(props: &ServicesProps) -> Html {
    html! {
        <section id={SectionId::Services.as_str()} class="section-block">
            <div class="section-head">
                <div>
                    <h2>{"Services"}</h2>
                    <p class="muted">{"Simple, clean, and focused on leads."}</p>
                </div>
                <div class="muted small">{"Monthly plans • No long lock-in"}</div>
            </div>
            <div class="grid grid-3">
                { for props.services.iter().map(|service| html! {
                    <article key={service.title.clone()} class="card service-card">
                        <div class="service-head">
                            <span class="service-icon" aria-hidden="true">{service.icon.glyph()}</span>
                            <h3>{service.title.clone()}</h3>
                        </div>
                        <p class="muted">{service.description.clone()}</p>
                        <div class="included"><span class="dot" />{"Included in monthly plans"}</div>
                    </article>
                }) }
            </div>
        </section>
    }
}

#[derive(Properties, PartialEq)]
struct GrowthCardProps {
    growth: GrowthConfig,
}

#[function_component(GrowthCard)]
fn growth_card(props: &GrowthCardProps) -> Html {
    let counter = use_state(CounterState::default);
    let settings = props.growth.counter_settings();

    {
        let setter = counter.setter();
        let element_id = props.growth.element_id.clone();
        use_effect_with((), move |_| {
            let on_update: Rc<dyn Fn(CounterState)> = Rc::new(move |state| setter.set(state));
            let animation = CounterAnimation::start(
                DomVisibilityObserver::new(&[settings.trigger_threshold]),
                AnimationFrameScheduler::new(),
                &element_id,
                settings,
                on_update,
            );
            move || drop(animation)
        });
    }

    let progress = settings.progress();
    let bar_width = counter.bar_width_percent(&settings);
    let bar_style = format!(
        "width: {bar_width}%; transition: width {:.0}ms ease-out;",
        settings.duration_ms
    );

    html! {
        <div id={props.growth.element_id.clone()} class="card growth-card">
            <div class="growth-head">
                <div>
                    <div class="muted">{props.growth.caption.clone()}</div>
                    <div class="card-title">{props.growth.headline.clone()}</div>
                </div>
                <div class="growth-figures">
                    <span class="accent strong">{group_thousands(counter.displayed)}</span>
                    {format!(" / {} • ", group_thousands(settings.target))}
                    <span class="accent">{format!("{progress}%")}</span>
                </div>
            </div>
            <div class="progress-track">
                <div class="progress-bar" style={bar_style} />
            </div>
            <div class="grid grid-3">
                { for props.growth.stats.iter().map(|stat| html! {
                    <div key={stat.label.clone()} class="stat-tile">
                        <div class="muted small">{stat.label.clone()}</div>
                        <div class="stat-value">{stat.value.clone()}</div>
                    </div>
                }) }
            </div>
            <p class="muted small">{props.growth.note.clone()}</p>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct CaseStudyCardProps {
    case: CaseStudyConfig,
    growth: GrowthConfig,
}

#[function_component(CaseStudyCard)]
fn case_study_card(props: &CaseStudyCardProps) -> Html {
    let case = &props.case;

    html! {
        <article class={classes!("card", "case-card", case.wide.then_some("case-card-wide"))}>
            <div class="case-head">
                <div class="muted small">{case.category.clone()}</div>
                <div class="pill">{case.tag.clone()}</div>
            </div>
            <div class={classes!("case-images", (case.images.len() > 1).then_some("case-images-pair"))}>
                { for case.images.iter().map(|image| html! {
                    <img class="case-image" src={image.src.clone()} alt={image.alt.clone()} loading="lazy" />
                }) }
            </div>
            <h3>{case.title.clone()}</h3>
            <ul class="bullets">
                { for case.bullets.iter().map(|bullet| html! { <li key={bullet.clone()}>{bullet.clone()}</li> }) }
            </ul>
            if case.shows_growth {
                <GrowthCard growth={props.growth.clone()} />
            }
        </article>
    }
}

#[derive(Properties, PartialEq)]
struct WorkProps {
    case_studies: Vec<CaseStudyConfig>,
    growth: GrowthConfig,
}

#[function_component(Work)]
fn work(props: &WorkProps) -> Html {
    html! {
        <section id={SectionId::Work.as_str()} class="section-block">
            <h2>{"Case Studies"}</h2>
            <p class="muted">{"Real work I do for clients: GMB SEO, Instagram handling, and YouTube management."}</p>
            <div class="grid grid-2">
                { for props.case_studies.iter().map(|case| html! {
                    <CaseStudyCard key={case.title.clone()} case={case.clone()} growth={props.growth.clone()} />
                }) }
            </div>
        </section>
    }
}

#[derive(Properties, PartialEq)]
struct PricingProps {
    tiers: Vec<PricingTier>,
}

#[function_component(Pricing)]
fn pricing(props: &PricingProps) -> Html {
    html! {
        <section id={SectionId::Pricing.as_str()} class="section-block">
            <h2>{"Pricing"}</h2>
            <p class="muted">{"Start small. Scale fast."}</p>
            <div class="grid grid-3">
                { for props.tiers.iter().map(|tier| html! {
                    <article key={tier.name.clone()} class="card pricing-card">
                        <div class="muted">{tier.name.clone()}</div>
                        <div class="price">{tier.price.clone()}</div>
                        <ul class="features">
                            { for tier.features.iter().map(|feature| html! {
                                <li key={feature.clone()}><span class="dot" />{feature.clone()}</li>
                            }) }
                        </ul>
                        <a class="button button-primary button-block" href={SectionId::Contact.anchor()}>
                            {format!("Choose {}", tier.name)}
                        </a>
                    </article>
                }) }
            </div>
        </section>
    }
}

#[derive(Properties, PartialEq)]
struct ContactProps {
    contact: ContactConfig,
    copy: ContactCopy,
}

#[function_component(Contact)]
fn contact(props: &ContactProps) -> Html {
    let links = ContactLinks::from_contact(&props.contact);
    let copy = &props.copy;

    html! {
        <section id={SectionId::Contact.as_str()} class="section-block">
            <div class="card contact-panel">
                <div class="contact-grid">
                    <div>
                        <h2>{copy.heading.clone()}</h2>
                        <p class="muted">{copy.intro.clone()}</p>
                        <div class="grid grid-3 contact-actions">
                            <a class="button button-primary" href={links.whatsapp} target="_blank" rel="noreferrer">{"WhatsApp Now"}</a>
                            <a class="button button-ghost" href={links.email} target="_blank" rel="noreferrer">{"Email via Gmail"}</a>
                            <a class="button button-outline" href={links.calendar} target="_blank" rel="noreferrer">{"Schedule Strategy Call"}</a>
                        </div>
                        <p class="muted small">{copy.tip.clone()}</p>
                    </div>
                    <div class="contact-cards">
                        { for copy.cards.iter().map(|card| html! {
                            <div key={card.title.clone()} class="info-card">
                                <div class="strong">{card.title.clone()}</div>
                                <div class="muted">{card.body.clone()}</div>
                            </div>
                        }) }
                        <div class="info-card">
                            <div class="strong">{"What we need"}</div>
                            <ul class="bullets">
                                { for copy.requirements.iter().map(|item| html! { <li key={item.clone()}>{item.clone()}</li> }) }
                            </ul>
                        </div>
                    </div>
                </div>
            </div>
        </section>
    }
}

#[derive(Properties, PartialEq)]
struct AppProps {
    config: Rc<SiteConfig>,
}

#[function_component(App)]
fn app(props: &AppProps) -> Html {
    let config = &props.config;
    let active_section = use_state(SectionId::default);

    {
        let setter = active_section.setter();
        let sections = config.sections.clone();
        let threshold = config.section_threshold;
        use_effect_with((), move |_| {
            let on_active: Rc<dyn Fn(SectionId)> = Rc::new(move |section| setter.set(section));
            let spy = ScrollSpy::start(
                DomVisibilityObserver::new(&observation_thresholds(threshold)),
                &sections,
                threshold,
                on_active,
            );
            log_event(
                Level::Info,
                "site_mounted",
                json!({ "watched_sections": spy.watched().len() }),
            );
            move || drop(spy)
        });
    }

    let year = Date::new_0().get_full_year();

    html! {
        <div class="page-shell">
            <SiteHeader
                brand={config.brand.clone()}
                sections={config.sections.clone()}
                active={*active_section}
            />
            <main>
                <Hero hero={config.hero.clone()} />
                <Services services={config.services.clone()} />
                <Work case_studies={config.case_studies.clone()} growth={config.growth.clone()} />
                <Pricing tiers={config.pricing.clone()} />
                <Contact contact={config.contact.clone()} copy={config.contact_copy.clone()} />
            </main>
            <footer class="site-footer">
                {format!("© {year} {}. All rights reserved.", config.brand.owner)}
            </footer>
        </div>
    }
}

pub fn run() {
    let config = match SiteConfig::embedded() {
        Ok(config) => config,
        Err(error) => {
            logging::init(logging::LogLevel::Info);
            log::error!("{error}");
            return;
        }
    };
    logging::init(config.log_level);

    yew::Renderer::<App>::with_root_and_props(
        document()
            .and_then(|d| d.get_element_by_id("app"))
            .expect("missing #app mount point"),
        AppProps {
            config: Rc::new(config),
        },
    )
    .render();
}

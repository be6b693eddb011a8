use crate::counter::{
    CounterSettings, DEFAULT_DURATION_MS, DEFAULT_TRIGGER_THRESHOLD,
};
use crate::logging::LogLevel;
use crate::scroll_spy::DEFAULT_SECTION_THRESHOLD;
use crate::section::SectionId;
use serde::Deserialize;
use thiserror::Error;

const EMBEDDED_SITE_CONFIG: &str = include_str!("../config/site.json");

const SECTION_THRESHOLD_BOUNDS: (f64, f64) = (0.05, 1.0);
const TRIGGER_THRESHOLD_BOUNDS: (f64, f64) = (0.05, 1.0);
const DURATION_MS_BOUNDS: (f64, f64) = (0.0, 10_000.0);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("site config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("site config lists no sections")]
    NoSections,
    #[error("unknown section `{0}`")]
    UnknownSection(String),
    #[error("section `{0}` is listed twice")]
    DuplicateSection(String),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Stat {
    pub value: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Image {
    pub src: String,
    pub alt: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BrandConfig {
    pub name: String,
    pub tagline: String,
    pub logo: Image,
    pub owner: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct HeroConfig {
    pub badge: String,
    pub headline: String,
    pub highlight: String,
    pub channels: String,
    pub stats: Vec<Stat>,
    pub audit_items: Vec<String>,
    pub results: Vec<Stat>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceIcon {
    Megaphone,
    MapPin,
    LineChart,
    LayoutTemplate,
    Palette,
    Youtube,
    Camera,
    Radio,
}

impl ServiceIcon {
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Megaphone => "📣",
            Self::MapPin => "📍",
            Self::LineChart => "📈",
            Self::LayoutTemplate => "🗂",
            Self::Palette => "🎨",
            Self::Youtube => "▶",
            Self::Camera => "📷",
            Self::Radio => "📡",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ServiceConfig {
    pub title: String,
    pub description: String,
    pub icon: ServiceIcon,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CaseStudyConfig {
    pub category: String,
    pub tag: String,
    pub title: String,
    pub images: Vec<Image>,
    pub bullets: Vec<String>,
    #[serde(default)]
    pub wide: bool,
    /// Hosts the growth proof card below the bullets.
    #[serde(default)]
    pub shows_growth: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GrowthConfig {
    pub element_id: String,
    pub caption: String,
    pub headline: String,
    pub current: u64,
    pub target: u64,
    #[serde(default)]
    pub duration_ms: Option<f64>,
    #[serde(default)]
    pub trigger_threshold: Option<f64>,
    pub stats: Vec<Stat>,
    pub note: String,
}

impl GrowthConfig {
    pub fn counter_settings(&self) -> CounterSettings {
        CounterSettings {
            current: self.current,
            target: self.target,
            duration_ms: with_bounds(self.duration_ms, DEFAULT_DURATION_MS, DURATION_MS_BOUNDS),
            trigger_threshold: with_bounds(
                self.trigger_threshold,
                DEFAULT_TRIGGER_THRESHOLD,
                TRIGGER_THRESHOLD_BOUNDS,
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PricingTier {
    pub name: String,
    pub price: String,
    pub features: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ContactConfig {
    pub whatsapp_number: String,
    pub whatsapp_text: String,
    pub email: String,
    pub email_subject: String,
    pub email_body: String,
    pub calendar_url: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct InfoCard {
    pub title: String,
    pub body: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ContactCopy {
    pub heading: String,
    pub intro: String,
    pub tip: String,
    pub cards: Vec<InfoCard>,
    pub requirements: Vec<String>,
}

#[derive(Deserialize)]
struct RawScrollSpyConfig {
    #[serde(default)]
    threshold: Option<f64>,
}

#[derive(Deserialize)]
struct RawSiteConfig {
    brand: BrandConfig,
    #[serde(default)]
    log_level: LogLevel,
    scroll_spy: Option<RawScrollSpyConfig>,
    sections: Vec<String>,
    hero: HeroConfig,
    services: Vec<ServiceConfig>,
    case_studies: Vec<CaseStudyConfig>,
    growth: GrowthConfig,
    pricing: Vec<PricingTier>,
    contact: ContactConfig,
    contact_copy: ContactCopy,
}

/// Everything the page renders, resolved and bounds-checked.
#[derive(Clone, Debug, PartialEq)]
pub struct SiteConfig {
    pub brand: BrandConfig,
    pub log_level: LogLevel,
    pub section_threshold: f64,
    pub sections: Vec<SectionId>,
    pub hero: HeroConfig,
    pub services: Vec<ServiceConfig>,
    pub case_studies: Vec<CaseStudyConfig>,
    pub growth: GrowthConfig,
    pub pricing: Vec<PricingTier>,
    pub contact: ContactConfig,
    pub contact_copy: ContactCopy,
}

impl SiteConfig {
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_json(EMBEDDED_SITE_CONFIG)
    }

    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let raw: RawSiteConfig = serde_json::from_str(source)?;
        let sections = resolve_sections(&raw.sections)?;
        let section_threshold = with_bounds(
            raw.scroll_spy.and_then(|spy| spy.threshold),
            DEFAULT_SECTION_THRESHOLD,
            SECTION_THRESHOLD_BOUNDS,
        );

        Ok(Self {
            brand: raw.brand,
            log_level: raw.log_level,
            section_threshold,
            sections,
            hero: raw.hero,
            services: raw.services,
            case_studies: raw.case_studies,
            growth: raw.growth,
            pricing: raw.pricing,
            contact: raw.contact,
            contact_copy: raw.contact_copy,
        })
    }
}

fn resolve_sections(names: &[String]) -> Result<Vec<SectionId>, ConfigError> {
    if names.is_empty() {
        return Err(ConfigError::NoSections);
    }

    let mut sections = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim();
        let section = SectionId::from_str(name)
            .ok_or_else(|| ConfigError::UnknownSection(name.to_string()))?;
        if sections.contains(&section) {
            return Err(ConfigError::DuplicateSection(name.to_string()));
        }
        sections.push(section);
    }

    Ok(sections)
}

fn with_bounds(value: Option<f64>, default: f64, bounds: (f64, f64)) -> f64 {
    value
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn embedded_json() -> Value {
        serde_json::from_str(EMBEDDED_SITE_CONFIG).expect("embedded config is JSON")
    }

    fn parse(value: &Value) -> Result<SiteConfig, ConfigError> {
        SiteConfig::from_json(&value.to_string())
    }

    #[test]
    fn embedded_config_describes_the_page() {
        let config = SiteConfig::embedded().expect("embedded config parses");

        assert_eq!(config.sections, SectionId::ALL.to_vec());
        assert_eq!(config.section_threshold, 0.5);
        assert_eq!(config.services.len(), 8);
        assert_eq!(config.pricing.len(), 3);
        assert_eq!(config.case_studies.iter().filter(|case| case.shows_growth).count(), 1);

        let settings = config.growth.counter_settings();
        assert_eq!(settings.current, 29_437);
        assert_eq!(settings.target, 100_000);
        assert_eq!(settings.duration_ms, 1_200.0);
        assert_eq!(settings.trigger_threshold, 0.35);
    }

    #[test]
    fn out_of_bounds_tunables_fall_back_to_defaults() {
        let mut value = embedded_json();
        value["scroll_spy"] = json!({ "threshold": 3.0 });
        value["growth"]["duration_ms"] = json!(-5.0);
        value["growth"]["trigger_threshold"] = json!(0.0);

        let config = parse(&value).expect("config parses");
        let settings = config.growth.counter_settings();

        assert_eq!(config.section_threshold, DEFAULT_SECTION_THRESHOLD);
        assert_eq!(settings.duration_ms, DEFAULT_DURATION_MS);
        assert_eq!(settings.trigger_threshold, DEFAULT_TRIGGER_THRESHOLD);
    }

    #[test]
    fn in_bounds_tunables_are_kept() {
        let mut value = embedded_json();
        value["scroll_spy"] = json!({ "threshold": 0.6 });
        value["growth"]["duration_ms"] = json!(0.0);
        value["log_level"] = json!("debug");

        let config = parse(&value).expect("config parses");

        assert_eq!(config.section_threshold, 0.6);
        assert_eq!(config.growth.counter_settings().duration_ms, 0.0);
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn section_list_is_checked() {
        let mut value = embedded_json();
        value["sections"] = json!([]);
        assert!(matches!(parse(&value), Err(ConfigError::NoSections)));

        value["sections"] = json!(["home", "blog"]);
        assert!(matches!(parse(&value), Err(ConfigError::UnknownSection(name)) if name == "blog"));

        value["sections"] = json!(["home", "work", "home"]);
        assert!(matches!(parse(&value), Err(ConfigError::DuplicateSection(name)) if name == "home"));
    }

    #[test]
    fn malformed_json_is_reported() {
        let error = SiteConfig::from_json("{ not json").expect_err("must fail");
        assert!(matches!(error, ConfigError::Json(_)));
        assert!(error.to_string().starts_with("site config is not valid JSON"));
    }
}

/// One navigable region of the page. Variant order is document order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SectionId {
    #[default]
    Home,
    Services,
    Work,
    Pricing,
    Contact,
}

impl SectionId {
    pub const ALL: [SectionId; 5] = [
        Self::Home,
        Self::Services,
        Self::Work,
        Self::Pricing,
        Self::Contact,
    ];

    /// Element id of the section in the document.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Services => "services",
            Self::Work => "work",
            Self::Pricing => "pricing",
            Self::Contact => "contact",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "home" => Some(Self::Home),
            "services" => Some(Self::Services),
            "work" => Some(Self::Work),
            "pricing" => Some(Self::Pricing),
            "contact" => Some(Self::Contact),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Services => "Services",
            Self::Work => "Work",
            Self::Pricing => "Pricing",
            Self::Contact => "Contact",
        }
    }

    pub fn anchor(self) -> String {
        format!("#{}", self.as_str())
    }
}

use crate::config::ContactConfig;
use urlencoding::encode;

const WHATSAPP_BASE: &str = "https://wa.me";
const GMAIL_COMPOSE_BASE: &str = "https://mail.google.com/mail/";

/// Outbound contact targets rendered in the contact section.
#[derive(Clone, Debug, PartialEq)]
pub struct ContactLinks {
    pub whatsapp: String,
    pub email: String,
    pub calendar: String,
}

impl ContactLinks {
    pub fn from_contact(contact: &ContactConfig) -> Self {
        Self {
            whatsapp: whatsapp_link(&contact.whatsapp_number, &contact.whatsapp_text),
            email: gmail_compose_link(&contact.email, &contact.email_subject, &contact.email_body),
            calendar: contact.calendar_url.clone(),
        }
    }
}

/// `wa.me` deep link. Everything but the digits of `phone` is dropped.
pub fn whatsapp_link(phone: &str, text: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    format!("{WHATSAPP_BASE}/{digits}?text={}", encode(text))
}

pub fn gmail_compose_link(to: &str, subject: &str, body: &str) -> String {
    format!(
        "{GMAIL_COMPOSE_BASE}?view=cm&fs=1&to={}&su={}&body={}",
        encode(to.trim()),
        encode(subject),
        encode(body)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whatsapp_link_matches_published_link() {
        let link = whatsapp_link(
            "+91 87001 16436",
            "Hi VisionX, I want a free digital audit. Business Name: \nCity: \nInstagram Link: \nGoogle Link: ",
        );

        assert_eq!(
            link,
            "https://wa.me/918700116436?text=Hi%20VisionX%2C%20I%20want%20a%20free%20digital%20audit.%20Business%20Name%3A%20%0ACity%3A%20%0AInstagram%20Link%3A%20%0AGoogle%20Link%3A%20"
        );
    }

    #[test]
    fn gmail_link_encodes_subject_and_body() {
        let link = gmail_compose_link(
            "visionxmediasolution@gmail.com",
            "Free Digital Audit Request",
            "Hi VisionX,\n\nCity:",
        );

        assert_eq!(
            link,
            "https://mail.google.com/mail/?view=cm&fs=1&to=visionxmediasolution%40gmail.com&su=Free%20Digital%20Audit%20Request&body=Hi%20VisionX%2C%0A%0ACity%3A"
        );
    }

    #[test]
    fn gmail_recipient_cannot_break_the_query() {
        let link = gmail_compose_link(" audits+leads&co@example.com ", "Hi", "Body");

        assert_eq!(
            link,
            "https://mail.google.com/mail/?view=cm&fs=1&to=audits%2Bleads%26co%40example.com&su=Hi&body=Body"
        );
    }

    #[test]
    fn calendar_link_passes_through() {
        let contact = ContactConfig {
            whatsapp_number: "918700116436".to_string(),
            whatsapp_text: "Hi".to_string(),
            email: "team@example.com".to_string(),
            email_subject: "Audit".to_string(),
            email_body: "Hello".to_string(),
            calendar_url: "https://calendar.app.google/ekaRPseDvRD3yKoK9".to_string(),
        };

        let links = ContactLinks::from_contact(&contact);
        assert_eq!(links.calendar, "https://calendar.app.google/ekaRPseDvRD3yKoK9");
        assert_eq!(links.whatsapp, "https://wa.me/918700116436?text=Hi");
    }
}

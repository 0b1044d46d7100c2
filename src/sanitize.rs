use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error as StdError;
use url::Url;

use crate::models::chat::LeadInfo;

// Loose on purpose: this flags contact intent, it does not validate
// deliverability.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,}").unwrap()
});

static SCHEDULING_INTENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:schedule|book)\s+a\s+call\b|\bdiscovery\s+call\b").unwrap()
});

/// Strips scheduling-domain links out of model replies. The widget
/// renders its own call-to-action, so inline links are noise at best
/// and a styling hazard at worst.
#[derive(Clone, Debug)]
pub struct LinkScrubber {
    markdown_link: Regex,
    bare_url: Regex,
}

impl LinkScrubber {
    /// Builds a scrubber for the domain of the given scheduling URL.
    pub fn for_scheduling_url(scheduling_url: &str) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let url = Url::parse(scheduling_url)
            .map_err(|e| format!("Invalid scheduling URL '{}': {}", scheduling_url, e))?;
        let host = url.host_str()
            .ok_or_else(|| format!("Scheduling URL '{}' has no host", scheduling_url))?;
        Self::for_domain(host.trim_start_matches("www."))
    }

    pub fn for_domain(domain: &str) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let dom = regex::escape(domain);
        let markdown_link = Regex::new(
            &format!(r"(?i)\[[^\]]*\]\(\s*<?https?://(?:www\.)?{}[^)\s>]*>?\s*\)", dom)
        )?;
        let bare_url = Regex::new(
            &format!(r"(?i)https?://(?:www\.)?{}[^\s)\]>,]*", dom)
        )?;
        Ok(Self { markdown_link, bare_url })
    }

    /// Removes markdown links and bare URLs on the scheduling domain.
    /// Everything else, whitespace included, is left exactly as the
    /// model wrote it.
    pub fn scrub(&self, text: &str) -> String {
        let pass = self.markdown_link.replace_all(text, "");
        let pass = self.bare_url.replace_all(&pass, "");
        pass.into_owned()
    }
}

/// True when the text contains something shaped like an email address.
pub fn contains_email(text: &str) -> bool {
    EMAIL_RE.is_match(text)
}

/// Lead heuristic: fires on an email-looking string in the *raw* reply,
/// or a non-blank email in the caller-supplied record. False positives
/// (sample addresses) and negatives (odd phrasing) are accepted.
pub fn detect_lead(raw_reply: &str, lead: &LeadInfo) -> bool {
    contains_email(raw_reply) || lead.has_email()
}

/// True when an assistant message invites the visitor to get on a call,
/// which is what makes the widget show the scheduling link.
pub fn wants_scheduling_cta(text: &str) -> bool {
    SCHEDULING_INTENT_RE.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scrubber() -> LinkScrubber {
        LinkScrubber::for_domain("calendly.com").unwrap()
    }

    #[test]
    fn scrubs_markdown_links() {
        let out = scrubber().scrub(
            "Happy to chat! [Book here](https://calendly.com/acme-studio/intro-call) any time."
        );
        assert!(!out.to_lowercase().contains("calendly.com"));
        assert!(out.contains("Happy to chat!"));
        assert!(out.contains("any time."));
    }

    #[test]
    fn scrubs_bare_urls() {
        let out = scrubber().scrub("Use https://calendly.com/acme-studio/intro-call to pick a slot.");
        assert!(!out.to_lowercase().contains("calendly.com"));
        assert!(out.contains("to pick a slot."));
    }

    #[test]
    fn scrubbing_is_case_insensitive_and_handles_www() {
        let out = scrubber().scrub("See HTTPS://WWW.Calendly.COM/acme or [x](http://CALENDLY.com/y)");
        assert!(!out.to_lowercase().contains("calendly.com"));
    }

    #[test]
    fn leaves_other_links_alone() {
        let text = "Our work is at https://acme.example/portfolio, take a look.";
        assert_eq!(scrubber().scrub(text), text);
    }

    #[test]
    fn link_free_text_round_trips_byte_identical() {
        let text = "Happy to help!\n";
        assert_eq!(scrubber().scrub(text), text);

        let padded = "  two paragraphs.\n\nSecond one.  ";
        assert_eq!(scrubber().scrub(padded), padded);
    }

    #[test]
    fn for_scheduling_url_derives_the_domain() {
        let s = LinkScrubber::for_scheduling_url("https://www.calendly.com/acme-studio/intro-call")
            .unwrap();
        assert!(!s.scrub("go to https://calendly.com/acme-studio/intro-call now")
            .contains("calendly"));
    }

    #[test]
    fn email_pattern_matches_plausible_addresses() {
        assert!(contains_email("reach me at jane.doe+work@mail.example.co"));
        assert!(contains_email("A@B.COM"));
        assert!(!contains_email("no at-sign here, promise"));
        assert!(!contains_email("half@way"));
    }

    #[test]
    fn lead_detection_uses_reply_or_lead_record() {
        let empty = LeadInfo::default();
        assert!(detect_lead("write to sales@acme.example", &empty));
        assert!(!detect_lead("nothing to see", &empty));

        let lead = LeadInfo { email: Some("a@b.com".into()), ..Default::default() };
        assert!(detect_lead("nothing to see", &lead));
    }

    #[test]
    fn scheduling_intent_phrases() {
        assert!(wants_scheduling_cta("Would you like to schedule a call?"));
        assert!(wants_scheduling_cta("we can Book A Call this week"));
        assert!(wants_scheduling_cta("let's set up a discovery call"));
        assert!(!wants_scheduling_cta("I'll call you a taxi"));
    }
}

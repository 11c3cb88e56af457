//! Contact form: turns an enquiry into a `mailto:` link for the visitor's
//! own mail client. Nothing is sent over the network from here.
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::dom::{Document, NodeId};

pub const CONTACT_FORM_ID: &str = "contact-form";
pub const SUBMIT_FEEDBACK_LABEL: &str = "Opening email...";

/// Characters `encodeURIComponent` leaves alone besides ASCII letters and
/// digits.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_uri_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enquiry {
    pub name: String,
    pub email: String,
    pub service: String,
    pub message: String,
}

impl Enquiry {
    /// Read the named fields of `form`. Inputs and selects report their
    /// `value` attribute, textareas their text.
    pub fn from_form(doc: &Document, form: NodeId) -> Self {
        let mut enquiry = Enquiry::default();
        for field in doc.descendants(form) {
            let Some(el) = doc.get(field) else {
                continue;
            };
            let Some(name) = el.attr("name") else {
                continue;
            };
            let value = match el.attr("value") {
                Some(value) => value.to_string(),
                None if el.tag() == "textarea" => doc.text_content(field),
                None => String::new(),
            };
            match name {
                "name" => enquiry.name = value,
                "email" => enquiry.email = value,
                "service" => enquiry.service = value,
                "message" => enquiry.message = value,
                _ => {}
            }
        }
        enquiry
    }

    pub fn subject(&self) -> String {
        let service = if self.service.is_empty() { "General" } else { &self.service };
        format!("New enquiry: {service}")
    }

    pub fn body(&self) -> String {
        [
            format!("Name: {}", self.name),
            format!("Email: {}", self.email),
            format!("Service: {}", self.service),
            String::new(),
            "Message:".to_string(),
            self.message.clone(),
        ]
        .join("\n")
    }

    pub fn mailto_uri(&self, recipient: &str) -> String {
        format!(
            "mailto:{recipient}?subject={}&body={}",
            encode_uri_component(&self.subject()),
            encode_uri_component(&self.body())
        )
    }
}

/// The form's submit button, if it has one.
pub fn submit_button(doc: &Document, form: NodeId) -> Option<NodeId> {
    doc.query_within(form, |el| el.tag() == "button" && el.attr("type") == Some("submit"))
        .into_iter()
        .next()
}

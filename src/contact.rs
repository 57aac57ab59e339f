//! Contact form model: four required fields, keyboard focus, and start-button gating.

use crate::assistant::ContactDetails;

/// Input fields in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactField {
    FirstName,
    LastName,
    PhoneNumber,
    Email,
}

/// Kind of data a field holds; drives placeholder text and accepted characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Tel,
    Email,
}

impl ContactField {
    pub const ALL: [ContactField; 4] = [
        ContactField::FirstName,
        ContactField::LastName,
        ContactField::PhoneNumber,
        ContactField::Email,
    ];

    pub fn placeholder(self) -> &'static str {
        match self {
            ContactField::FirstName => "First Name",
            ContactField::LastName => "Last Name",
            ContactField::PhoneNumber => "Phone number",
            ContactField::Email => "Email address",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            ContactField::PhoneNumber => FieldKind::Tel,
            ContactField::Email => FieldKind::Email,
            ContactField::FirstName | ContactField::LastName => FieldKind::Text,
        }
    }

    fn index(self) -> usize {
        match self {
            ContactField::FirstName => 0,
            ContactField::LastName => 1,
            ContactField::PhoneNumber => 2,
            ContactField::Email => 3,
        }
    }
}

impl FieldKind {
    /// Control characters never make it into a field; tel fields keep to dialable glyphs.
    fn accepts(self, c: char) -> bool {
        if c.is_control() {
            return false;
        }
        match self {
            FieldKind::Tel => c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')' | '.'),
            FieldKind::Email => !c.is_whitespace(),
            FieldKind::Text => true,
        }
    }
}

/// Values typed into the contact form plus which field has focus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    values: [String; 4],
    focus: usize,
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, field: ContactField) -> &str {
        &self.values[field.index()]
    }

    pub fn set_value(&mut self, field: ContactField, value: impl Into<String>) {
        self.values[field.index()] = value.into();
    }

    pub fn focused(&self) -> ContactField {
        ContactField::ALL[self.focus]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % ContactField::ALL.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + ContactField::ALL.len() - 1) % ContactField::ALL.len();
    }

    pub fn set_focus(&mut self, field: ContactField) {
        self.focus = field.index();
    }

    /// Append a character to the focused field. Returns false if the field rejects it.
    pub fn push_char(&mut self, c: char) -> bool {
        let field = self.focused();
        if !field.kind().accepts(c) {
            return false;
        }
        self.values[self.focus].push(c);
        true
    }

    pub fn backspace(&mut self) {
        self.values[self.focus].pop();
    }

    pub fn clear_focused(&mut self) {
        self.values[self.focus].clear();
    }

    /// The start action is enabled only when every field has non-whitespace content.
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(|value| !value.trim().is_empty())
    }

    /// First field (in display order) that is still blank.
    pub fn first_missing(&self) -> Option<ContactField> {
        ContactField::ALL
            .into_iter()
            .find(|field| self.value(*field).trim().is_empty())
    }

    /// Trimmed snapshot handed to the service when a call starts.
    pub fn details(&self) -> ContactDetails {
        ContactDetails {
            first_name: self.value(ContactField::FirstName).trim().to_string(),
            last_name: self.value(ContactField::LastName).trim().to_string(),
            email: self.value(ContactField::Email).trim().to_string(),
            phone_number: self.value(ContactField::PhoneNumber).trim().to_string(),
        }
    }
}

use modelkit::attrs::{object, scalar};
use modelkit::{
    BoolValue, CONNECTOR_NAMESPACE, Document, Handler, Matchable, Model, Modifier, StringValue,
    TriStateList, Validator, match_list, validate,
};
use serde::{Deserialize, Serialize};

/// Outbound email: which connector delivers it, and the message templates
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Messaging {
    /// Connector name, or `Builtin` for the platform's own delivery
    pub connector: StringValue,
    pub templates: TriStateList<EmailTemplate>,
}

impl Model for Messaging {
    fn values(&self, h: &mut Handler) -> Document {
        let mut data = Document::new();
        if let Some(name) = self.connector.as_present()
            && let Some(reference) = h.resolve(CONNECTOR_NAMESPACE, name)
        {
            data.insert("connector".to_string(), reference.provider_value().into());
        }
        object::get_list(&self.templates, &mut data, "templates", h);
        data
    }

    // The response carries the connector id; the configured name is kept.
    fn set_values(&mut self, h: &mut Handler, data: &Document) {
        object::set_list(&mut self.templates, data, "templates", h);
    }

    fn validator(&self) -> Option<&dyn Validator> {
        Some(self)
    }
}

impl Validator for Messaging {
    fn validate(&self, h: &mut Handler) {
        validate::unique_items(h, "email template", &self.templates);

        let active: Vec<&str> = self
            .templates
            .as_present()
            .into_iter()
            .flatten()
            .filter(|t| t.active.as_present() == Some(&true))
            .map(|t| t.name.value_str())
            .collect();
        if active.len() > 1 {
            h.conflict(
                "More than one active email template",
                format!("Only one template may be active, found: {}", active.join(", ")),
            );
        }

        object::validate_list(&self.templates, h);
    }
}

impl Modifier for Messaging {
    fn match_identities(&mut self, prior: &Self) {
        let report = match_list(&mut self.templates, &prior.templates);
        log::debug!("email templates: {report:?}");
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmailTemplate {
    pub id: StringValue,
    pub name: StringValue,
    pub active: BoolValue,
    pub subject: StringValue,
    pub html_body: StringValue,
    pub plain_text_body: StringValue,
    pub use_plain_text_body: BoolValue,
}

impl Model for EmailTemplate {
    fn values(&self, _h: &mut Handler) -> Document {
        let mut data = Document::new();
        scalar::get(&self.id, &mut data, "id");
        scalar::get(&self.name, &mut data, "name");
        scalar::get(&self.active, &mut data, "active");
        scalar::get(&self.subject, &mut data, "subject");
        scalar::get(&self.html_body, &mut data, "htmlBody");
        scalar::get(&self.plain_text_body, &mut data, "plainTextBody");
        scalar::get(&self.use_plain_text_body, &mut data, "usePlainTextBody");
        data
    }

    fn set_values(&mut self, h: &mut Handler, data: &Document) {
        scalar::set(&mut self.id, data, "id", h);
        scalar::set(&mut self.name, data, "name", h);
        scalar::set(&mut self.active, data, "active", h);
        scalar::set(&mut self.subject, data, "subject", h);
        scalar::set(&mut self.html_body, data, "htmlBody", h);
        scalar::set(&mut self.plain_text_body, data, "plainTextBody", h);
        scalar::set(&mut self.use_plain_text_body, data, "usePlainTextBody", h);
    }

    fn validator(&self) -> Option<&dyn Validator> {
        Some(self)
    }
}

impl Validator for EmailTemplate {
    fn validate(&self, h: &mut Handler) {
        let context = format!("email template '{}'", self.name.value_str());
        if !self.name.is_present() {
            h.missing("Missing attribute 'name' in email template", "");
        }
        validate::requires(
            h,
            &context,
            "use_plain_text_body",
            self.use_plain_text_body.as_present() == Some(&true),
            "plain_text_body",
            self.plain_text_body.is_present(),
        );
    }
}

impl Matchable for EmailTemplate {
    fn name(&self) -> &StringValue {
        &self.name
    }

    fn id(&self) -> &StringValue {
        &self.id
    }

    fn set_id(&mut self, id: StringValue) {
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelkit::{BUILTIN_CONNECTOR, DiagnosticKind, KeyMinter, TriState};

    fn template(name: &str, active: bool) -> EmailTemplate {
        EmailTemplate {
            id: StringValue::Pending,
            name: name.into(),
            active: active.into(),
            subject: "Hello".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_builtin_connector_needs_no_declaration() {
        let mut h = Handler::with_minter(KeyMinter::new());
        let messaging = Messaging {
            connector: BUILTIN_CONNECTOR.into(),
            templates: TriState::Absent,
        };
        let data = modelkit::serialize(&messaging, &mut h).unwrap();
        assert_eq!(data["connector"], BUILTIN_CONNECTOR);
    }

    #[test]
    fn test_resolved_connector_carries_kind() {
        let mut h = Handler::with_minter(KeyMinter::new());
        h.refs.add(CONNECTOR_NAMESPACE, "smtp", "CI123", "Mailer");
        let messaging = Messaging {
            connector: "Mailer".into(),
            templates: TriState::Absent,
        };
        let data = messaging.values(&mut h);
        assert_eq!(data["connector"], "smtp:CI123");
    }

    #[test]
    fn test_unknown_connector_blocks() {
        let mut h = Handler::with_minter(KeyMinter::new());
        let messaging = Messaging {
            connector: "C2".into(),
            templates: TriState::Absent,
        };
        assert!(modelkit::serialize(&messaging, &mut h).is_err());
        assert_eq!(h.diags.count_of(DiagnosticKind::UnresolvableReference), 1);
    }

    #[test]
    fn test_single_active_template() {
        let mut h = Handler::new();
        let messaging = Messaging {
            connector: StringValue::Absent,
            templates: TriState::Present(vec![template("welcome", true), template("reset", true)]),
        };
        assert!(!modelkit::check(&messaging, &mut h));
        assert_eq!(h.diags.count_of(DiagnosticKind::ConflictingAttributes), 1);
    }

    #[test]
    fn test_plain_text_body_required() {
        let mut h = Handler::new();
        let messaging = Messaging {
            connector: StringValue::Absent,
            templates: TriState::Present(vec![EmailTemplate {
                use_plain_text_body: true.into(),
                ..template("welcome", true)
            }]),
        };
        modelkit::check(&messaging, &mut h);
        assert_eq!(h.diags.count_of(DiagnosticKind::MissingAttribute), 1);
    }

    #[test]
    fn test_pending_template_id_not_serialized() {
        let mut h = Handler::new();
        let data = template("welcome", false).values(&mut h);
        assert!(!data.contains_key("id"));
        assert_eq!(data["active"], false);
    }
}

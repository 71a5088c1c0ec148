use super::write_identity;
use modelkit::attrs::scalar;
use modelkit::{Collector, Document, Handler, Matchable, Model, StringValue, Validator};
use serde::{Deserialize, Serialize};

pub const NAMESPACE: &str = "jwt_template";

/// A named session token template
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JwtTemplate {
    pub id: StringValue,
    pub name: StringValue,
    pub description: StringValue,
    /// Claims template, as JSON text
    pub template: StringValue,
}

impl Model for JwtTemplate {
    fn values(&self, h: &mut Handler) -> Document {
        let mut data = Document::new();
        write_identity(h, &mut data, NAMESPACE, self.name.value_str());
        scalar::get(&self.name, &mut data, "name");
        scalar::get(&self.description, &mut data, "description");
        scalar::get(&self.template, &mut data, "template");
        data
    }

    fn set_values(&mut self, h: &mut Handler, data: &Document) {
        scalar::set(&mut self.id, data, "id", h);
        scalar::set(&mut self.name, data, "name", h);
        scalar::set(&mut self.description, data, "description", h);
        scalar::set_checked(&mut self.template, data, "template", h);
    }

    fn validator(&self) -> Option<&dyn Validator> {
        Some(self)
    }

    fn collector(&self) -> Option<&dyn Collector> {
        Some(self)
    }
}

impl Validator for JwtTemplate {
    fn validate(&self, h: &mut Handler) {
        if !self.name.is_present() {
            h.missing(
                "Missing attribute 'name' in JWT template",
                "Every JWT template needs a name",
            );
        }
        if let Some(template) = self.template.as_present()
            && let Err(err) = serde_json::from_str::<serde_json::Value>(template)
        {
            h.invalid(
                format!("Invalid template for JWT template '{}'", self.name.value_str()),
                format!("The template must be valid JSON: {err}"),
            );
        }
    }
}

impl Collector for JwtTemplate {
    fn collect_references(&self, h: &mut Handler) {
        if let Some(name) = self.name.as_present() {
            h.refs.add(NAMESPACE, "", self.id.value_str(), name);
        }
    }
}

impl Matchable for JwtTemplate {
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
    use modelkit::{DiagnosticKind, KeyMinter};

    #[test]
    fn test_new_template_serializes_deferred_id() {
        let mut h = Handler::with_minter(KeyMinter::new());
        let template = JwtTemplate {
            id: StringValue::Pending,
            name: "session".into(),
            template: r#"{"role": "{{user.role}}"}"#.into(),
            ..Default::default()
        };

        let data = modelkit::serialize(&template, &mut h).unwrap();
        assert_eq!(data["id"], "jwt_template::1");
        assert!(!data.contains_key("description"));
    }

    #[test]
    fn test_invalid_json_template() {
        let mut h = Handler::with_minter(KeyMinter::new());
        let template = JwtTemplate {
            name: "broken".into(),
            template: "{not json".into(),
            ..Default::default()
        };
        assert!(!modelkit::check(&template, &mut h));
        assert_eq!(h.diags.count_of(DiagnosticKind::InvalidValue), 1);
    }
}

//! The top-level project resource

use super::authorization::Authorization;
use super::connectors::Connectors;
use super::jwt::JwtTemplate;
use super::messaging::Messaging;
use super::settings::Settings;
use modelkit::attrs::{object, scalar, set};
use modelkit::{
    Collector, Document, Handler, Model, Modifier, StringValue, TriStateList, TriStateObject,
    TriStateSet, Validator, match_list, modify_object, preserve_prior, validate,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Project {
    /// Assigned by the remote system
    pub id: StringValue,
    pub name: StringValue,
    pub environment: StringValue,
    pub tags: TriStateSet<String>,
    pub settings: TriStateObject<Settings>,
    pub connectors: TriStateObject<Connectors>,
    pub authorization: TriStateObject<Authorization>,
    pub jwt_templates: TriStateList<JwtTemplate>,
    pub messaging: TriStateObject<Messaging>,
}

impl Project {
    /// Mark every server-assigned identifier the operator left unset as pending
    pub fn mark_computed(&mut self) {
        self.id.mark_pending();
        for item in self.identities_mut() {
            item.mark_pending();
        }
    }

    /// Entities whose identifier is only known after apply, as "kind 'name'"
    pub fn pending_identities(&self) -> Vec<String> {
        let mut pending = Vec::new();
        if self.id.is_pending() {
            pending.push(format!("project '{}'", self.name.value_str()));
        }
        let mut push = |kind: &str, id: &StringValue, name: &StringValue| {
            if id.is_pending() {
                pending.push(format!("{kind} '{}'", name.value_str()));
            }
        };
        if let Some(connectors) = self.connectors.as_present() {
            for c in connectors.http.as_present().into_iter().flatten() {
                push("http connector", &c.id, &c.name);
            }
            for c in connectors.smtp.as_present().into_iter().flatten() {
                push("smtp connector", &c.id, &c.name);
            }
        }
        if let Some(authorization) = self.authorization.as_present() {
            for p in authorization.permissions.as_present().into_iter().flatten() {
                push("permission", &p.id, &p.name);
            }
            for r in authorization.roles.as_present().into_iter().flatten() {
                push("role", &r.id, &r.name);
            }
        }
        for t in self.jwt_templates.as_present().into_iter().flatten() {
            push("jwt template", &t.id, &t.name);
        }
        if let Some(messaging) = self.messaging.as_present() {
            for t in messaging.templates.as_present().into_iter().flatten() {
                push("email template", &t.id, &t.name);
            }
        }
        pending
    }

    fn identities_mut(&mut self) -> Vec<&mut StringValue> {
        let mut ids = Vec::new();
        if let Some(connectors) = self.connectors.as_present_mut() {
            if let Some(http) = connectors.http.as_present_mut() {
                ids.extend(http.iter_mut().map(|c| &mut c.id));
            }
            if let Some(smtp) = connectors.smtp.as_present_mut() {
                ids.extend(smtp.iter_mut().map(|c| &mut c.id));
            }
        }
        if let Some(authorization) = self.authorization.as_present_mut() {
            if let Some(permissions) = authorization.permissions.as_present_mut() {
                ids.extend(permissions.iter_mut().map(|p| &mut p.id));
            }
            if let Some(roles) = authorization.roles.as_present_mut() {
                ids.extend(roles.iter_mut().map(|r| &mut r.id));
            }
        }
        if let Some(templates) = self.jwt_templates.as_present_mut() {
            ids.extend(templates.iter_mut().map(|t| &mut t.id));
        }
        if let Some(messaging) = self.messaging.as_present_mut()
            && let Some(templates) = messaging.templates.as_present_mut()
        {
            ids.extend(templates.iter_mut().map(|t| &mut t.id));
        }
        ids
    }
}

impl Model for Project {
    fn values(&self, h: &mut Handler) -> Document {
        let mut data = Document::new();
        scalar::get(&self.id, &mut data, "id");
        scalar::get(&self.name, &mut data, "name");
        scalar::get(&self.environment, &mut data, "environment");
        set::get(&self.tags, &mut data, "tags");
        object::get(&self.settings, &mut data, "settings", h);
        object::get(&self.connectors, &mut data, "connectors", h);
        object::get(&self.authorization, &mut data, "authorization", h);
        object::get_list(&self.jwt_templates, &mut data, "jwtTemplates", h);
        object::get(&self.messaging, &mut data, "messaging", h);
        data
    }

    fn set_values(&mut self, h: &mut Handler, data: &Document) {
        scalar::set(&mut self.id, data, "id", h);
        scalar::set_checked(&mut self.name, data, "name", h);
        scalar::set(&mut self.environment, data, "environment", h);
        set::set(&mut self.tags, data, "tags", h);
        object::set(&mut self.settings, data, "settings", h);
        object::set(&mut self.connectors, data, "connectors", h);
        object::set(&mut self.authorization, data, "authorization", h);
        object::set_list(&mut self.jwt_templates, data, "jwtTemplates", h);
        object::set(&mut self.messaging, data, "messaging", h);
    }

    fn validator(&self) -> Option<&dyn Validator> {
        Some(self)
    }

    fn collector(&self) -> Option<&dyn Collector> {
        Some(self)
    }
}

impl Validator for Project {
    fn validate(&self, h: &mut Handler) {
        if !self.name.is_present() {
            h.missing(
                "Missing attribute 'name' in project",
                "The project name identifies its stored state",
            );
        }
        if let Some(environment) = self.environment.as_present()
            && !matches!(environment.as_str(), "production" | "development")
        {
            h.invalid(
                "Invalid value for 'environment' in project",
                format!("Expected 'production' or 'development', got '{environment}'"),
            );
        }
        validate::unique_items(h, "JWT template", &self.jwt_templates);

        object::validate(&self.settings, h);
        object::validate(&self.connectors, h);
        object::validate(&self.authorization, h);
        object::validate_list(&self.jwt_templates, h);
        object::validate(&self.messaging, h);
    }
}

impl Collector for Project {
    fn collect_references(&self, h: &mut Handler) {
        object::collect(&self.connectors, h);
        object::collect(&self.authorization, h);
        object::collect_list(&self.jwt_templates, h);
    }
}

impl Modifier for Project {
    fn match_identities(&mut self, prior: &Self) {
        let report = match_list(&mut self.jwt_templates, &prior.jwt_templates);
        log::debug!("jwt templates: {report:?}");
    }

    fn modify(&mut self, h: &mut Handler, prior: &Self) {
        preserve_prior(&mut self.id, &prior.id);
        modify_object(h, &mut self.connectors, &prior.connectors);
        modify_object(h, &mut self.authorization, &prior.authorization);
        modify_object(h, &mut self.messaging, &prior.messaging);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::connectors::HttpConnector;
    use crate::models::messaging::EmailTemplate;
    use modelkit::{DiagnosticKind, Error, KeyMinter, TriState, modify_plan};
    use serde_json::json;

    fn sample() -> Project {
        serde_json::from_value(json!({
            "name": "shop",
            "environment": "production",
            "tags": ["web", "eu"],
            "settings": {
                "app_url": "https://shop.example.com",
                "user_jwt_template": "session",
            },
            "connectors": {
                "http": [{"name": "C1", "base_url": "https://hooks.example.com"}],
                "smtp": [{
                    "name": "Mailer",
                    "host": "smtp.example.com",
                    "sender_email": "shop@example.com",
                }],
            },
            "authorization": {
                "permissions": [{"name": "orders:read"}],
                "roles": [{"name": "support", "permissions": ["orders:read"]}],
            },
            "jwt_templates": [{"name": "session", "template": "{}"}],
            "messaging": {
                "connector": "Mailer",
                "templates": [{"name": "welcome", "active": true, "subject": "Hi"}],
            },
        }))
        .unwrap()
    }

    #[test]
    fn test_first_plan_uses_deferred_keys() {
        let mut project = sample();
        project.mark_computed();
        let mut h = Handler::with_minter(KeyMinter::new());

        let data = modelkit::serialize(&project, &mut h).unwrap();

        assert!(!data.contains_key("id"));
        assert_eq!(data["tags"], json!(["eu", "web"]));
        let smtp_key = data["connectors"]["smtp"][0]["id"].as_str().unwrap();
        assert!(smtp_key.starts_with("connector:smtp:"));
        assert_eq!(data["messaging"]["connector"], smtp_key);
        assert_eq!(
            data["settings"]["userTemplateId"],
            data["jwtTemplates"][0]["id"]
        );
        assert!(!h.diags.has_errors());
    }

    #[test]
    fn test_pending_identities_listed() {
        let mut project = sample();
        project.mark_computed();
        let pending = project.pending_identities();
        assert!(pending.contains(&"project 'shop'".to_string()));
        assert!(pending.contains(&"http connector 'C1'".to_string()));
        assert!(pending.contains(&"email template 'welcome'".to_string()));
        assert_eq!(pending.len(), 7);
    }

    #[test]
    fn test_plan_modification_stabilizes_ids() {
        let mut prior = sample();
        prior.id = "P1".into();
        if let Some(connectors) = prior.connectors.as_present_mut() {
            connectors.http = TriState::Present(vec![HttpConnector {
                id: "CN1".into(),
                name: "C1".into(),
                base_url: "https://hooks.example.com".into(),
                ..Default::default()
            }]);
        }
        if let Some(messaging) = prior.messaging.as_present_mut() {
            messaging.templates = TriState::Present(vec![EmailTemplate {
                id: "ET1".into(),
                name: "welcome".into(),
                ..Default::default()
            }]);
        }

        let mut proposed = sample();
        proposed.mark_computed();
        let mut h = Handler::with_minter(KeyMinter::new());
        assert!(modify_plan(&mut h, Some(&mut proposed), Some(&prior)));

        assert_eq!(proposed.id, StringValue::from("P1"));
        let pending = proposed.pending_identities();
        assert!(!pending.iter().any(|p| p.contains("'C1'")));
        assert!(!pending.iter().any(|p| p.contains("'welcome'")));

        let data = modelkit::serialize(&proposed, &mut h).unwrap();
        assert_eq!(data["id"], "P1");
        assert_eq!(data["connectors"]["http"][0]["id"], "CN1");
        assert_eq!(data["messaging"]["templates"][0]["id"], "ET1");
    }

    #[test]
    fn test_independent_violations_aggregate() {
        let mut project = sample();
        if let Some(connectors) = project.connectors.as_present_mut() {
            connectors.http = TriState::Present(vec![
                HttpConnector {
                    name: "Mailer".into(),
                    base_url: "https://a.example.com".into(),
                    ..Default::default()
                },
            ]);
        }
        if let Some(settings) = project.settings.as_present_mut() {
            settings.inactivity_enabled = true.into();
        }
        let mut h = Handler::with_minter(KeyMinter::new());

        let err = modelkit::serialize(&project, &mut h).unwrap_err();
        let Error::Blocked { errors } = err else {
            panic!("expected blocked error");
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(h.diags.count_of(DiagnosticKind::UniquenessViolation), 1);
        assert_eq!(h.diags.count_of(DiagnosticKind::MissingAttribute), 1);
    }

    #[test]
    fn test_populate_resolves_all_pending() {
        let mut project = sample();
        project.mark_computed();
        let mut h = Handler::with_minter(KeyMinter::new());
        let mut response = modelkit::serialize(&project, &mut h).unwrap();
        response.insert("id".into(), json!("P9"));

        modelkit::populate(&mut project, &mut h, &response);

        assert_eq!(project.id, StringValue::from("P9"));
        // ids the response did not carry collapse to the zero value
        let messaging = project.messaging.as_present().unwrap();
        let welcome = &messaging.templates.as_present().unwrap()[0];
        assert_eq!(welcome.id, StringValue::from(""));
        assert!(project.pending_identities().is_empty());
    }

    #[test]
    fn test_sparse_response_leaves_nothing_pending() {
        let mut project = sample();
        project.mark_computed();
        let mut h = Handler::with_minter(KeyMinter::new());
        let response = json!({"id": "P9", "name": "shop"});

        modelkit::populate(&mut project, &mut h, response.as_object().unwrap());

        assert_eq!(project.id, StringValue::from("P9"));
        assert!(project.pending_identities().is_empty());
        let connectors = project.connectors.as_present().unwrap();
        let http = &connectors.http.as_present().unwrap()[0];
        assert_eq!(http.base_url, StringValue::from("https://hooks.example.com"));
        let state = serde_json::to_value(&project).unwrap();
        assert_eq!(state["connectors"]["http"][0]["id"], json!(""));
    }

    #[test]
    fn test_state_round_trip_through_serde() {
        let mut project = sample();
        project.id = "P1".into();
        let json = serde_json::to_string(&project).unwrap();
        let restored: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, project);
    }
}

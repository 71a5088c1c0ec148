use super::jwt;
use modelkit::attrs::{list, scalar, set};
use modelkit::{
    BoolValue, Document, Handler, IntValue, Model, StringValue, TriStateList, TriStateSet,
    Validator, validate,
};
use serde::{Deserialize, Serialize};

/// Project-wide session and domain settings
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub app_url: StringValue,
    pub custom_domain: StringValue,
    pub approved_domains: TriStateSet<String>,
    /// Tried in order after sign-in
    pub redirect_urls: TriStateList<String>,
    /// Seconds
    pub session_token_expiration: IntValue,
    pub refresh_token_rotation: BoolValue,
    pub inactivity_enabled: BoolValue,
    /// Seconds
    pub inactivity_time: IntValue,
    /// Name of the JWT template applied to user sessions
    pub user_jwt_template: StringValue,
}

impl Model for Settings {
    fn values(&self, h: &mut Handler) -> Document {
        let mut data = Document::new();
        scalar::get(&self.app_url, &mut data, "appUrl");
        scalar::get(&self.custom_domain, &mut data, "customDomain");
        set::get(&self.approved_domains, &mut data, "approvedDomains");
        list::get(&self.redirect_urls, &mut data, "redirectUrls");
        scalar::get(&self.session_token_expiration, &mut data, "sessionTokenExpiration");
        scalar::get(&self.refresh_token_rotation, &mut data, "refreshTokenRotation");
        scalar::get(&self.inactivity_enabled, &mut data, "inactivityEnabled");
        scalar::get(&self.inactivity_time, &mut data, "inactivityTime");
        // may name a template managed outside this project
        if let Some(name) = self.user_jwt_template.as_present()
            && let Some(reference) = h.resolve_optional(jwt::NAMESPACE, name)
        {
            data.insert(
                "userTemplateId".to_string(),
                reference.reference_value().into(),
            );
        }
        data
    }

    fn set_values(&mut self, h: &mut Handler, data: &Document) {
        scalar::set(&mut self.app_url, data, "appUrl", h);
        scalar::set(&mut self.custom_domain, data, "customDomain", h);
        set::set(&mut self.approved_domains, data, "approvedDomains", h);
        list::set(&mut self.redirect_urls, data, "redirectUrls", h);
        scalar::set(&mut self.session_token_expiration, data, "sessionTokenExpiration", h);
        scalar::set(&mut self.refresh_token_rotation, data, "refreshTokenRotation", h);
        scalar::set(&mut self.inactivity_enabled, data, "inactivityEnabled", h);
        scalar::set(&mut self.inactivity_time, data, "inactivityTime", h);
    }

    fn validator(&self) -> Option<&dyn Validator> {
        Some(self)
    }
}

impl Validator for Settings {
    fn validate(&self, h: &mut Handler) {
        let enabled = self.inactivity_enabled.as_present().copied();
        validate::requires(
            h,
            "settings",
            "inactivity_enabled",
            enabled == Some(true),
            "inactivity_time",
            self.inactivity_time.is_present(),
        );
        validate::forbids(
            h,
            "settings",
            "inactivity_enabled",
            enabled == Some(false),
            "inactivity_time",
            self.inactivity_time.is_present(),
        );

        for (attribute, value) in [
            ("session_token_expiration", &self.session_token_expiration),
            ("inactivity_time", &self.inactivity_time),
        ] {
            if let Some(seconds) = value.as_present()
                && *seconds <= 0
            {
                h.invalid(
                    format!("Invalid value for '{attribute}' in settings"),
                    format!("Expected a positive number of seconds, got {seconds}"),
                );
            }
        }
    }
}

//! Outbound connectors
//!
//! Connectors are declared per kind but share one name space: other parts of
//! the project (messaging, for one) point at a connector by name without
//! saying which kind it is.

use super::write_identity;
use modelkit::attrs::{map, object, scalar, secret};
use modelkit::{
    BoolValue, CONNECTOR_NAMESPACE, Collector, Document, Handler, IntValue, Matchable, Model,
    Modifier, StringValue, TriStateList, TriStateMap, TriStateObject, TriStateSet, Validator,
    match_list, validate,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Connectors {
    pub http: TriStateList<HttpConnector>,
    pub smtp: TriStateList<SmtpConnector>,
}

impl Connectors {
    /// Every declared connector name, across kinds
    pub fn names(&self) -> Vec<&str> {
        let http = self.http.as_present().into_iter().flatten().map(|c| &c.name);
        let smtp = self.smtp.as_present().into_iter().flatten().map(|c| &c.name);
        http.chain(smtp)
            .filter_map(|name| name.as_present().map(String::as_str))
            .collect()
    }
}

impl Model for Connectors {
    fn values(&self, h: &mut Handler) -> Document {
        let mut data = Document::new();
        object::get_list(&self.http, &mut data, "http", h);
        object::get_list(&self.smtp, &mut data, "smtp", h);
        data
    }

    fn set_values(&mut self, h: &mut Handler, data: &Document) {
        object::set_list(&mut self.http, data, "http", h);
        object::set_list(&mut self.smtp, data, "smtp", h);
    }

    fn validator(&self) -> Option<&dyn Validator> {
        Some(self)
    }

    fn collector(&self) -> Option<&dyn Collector> {
        Some(self)
    }
}

impl Validator for Connectors {
    fn validate(&self, h: &mut Handler) {
        validate::unique_names(h, "connector", self.names());
        object::validate_list(&self.http, h);
        object::validate_list(&self.smtp, h);
    }
}

impl Collector for Connectors {
    fn collect_references(&self, h: &mut Handler) {
        object::collect_list(&self.http, h);
        object::collect_list(&self.smtp, h);
    }
}

impl Modifier for Connectors {
    fn match_identities(&mut self, prior: &Self) {
        let mut report = match_list(&mut self.http, &prior.http);
        report.merge(&match_list(&mut self.smtp, &prior.smtp));
        if report.total() > 0 {
            log::debug!("connectors: {report:?}");
        }
    }
}

// ============================================================================
// HTTP
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConnector {
    pub id: StringValue,
    pub name: StringValue,
    pub description: StringValue,
    pub base_url: StringValue,
    pub bearer_token: StringValue,
    pub basic_auth: TriStateObject<BasicAuth>,
    pub headers: TriStateMap<String>,
    /// Keys the remote system signs outgoing requests with; order is irrelevant
    pub signing_keys: TriStateSet<SigningKey>,
    pub insecure: BoolValue,
}

impl Model for HttpConnector {
    fn values(&self, h: &mut Handler) -> Document {
        let mut data = Document::new();
        write_identity(h, &mut data, CONNECTOR_NAMESPACE, self.name.value_str());
        scalar::get(&self.name, &mut data, "name");
        scalar::get(&self.description, &mut data, "description");
        scalar::get(&self.base_url, &mut data, "baseUrl");
        secret::get(&self.bearer_token, &mut data, "bearerToken");
        object::get(&self.basic_auth, &mut data, "basicAuth", h);
        map::get(&self.headers, &mut data, "headers");
        object::get_set(&self.signing_keys, &mut data, "signingKeys", h);
        scalar::get(&self.insecure, &mut data, "insecure");
        data
    }

    fn set_values(&mut self, h: &mut Handler, data: &Document) {
        scalar::set(&mut self.id, data, "id", h);
        scalar::set(&mut self.name, data, "name", h);
        scalar::set(&mut self.description, data, "description", h);
        scalar::set_checked(&mut self.base_url, data, "baseUrl", h);
        secret::set(&mut self.bearer_token);
        object::set(&mut self.basic_auth, data, "basicAuth", h);
        map::set(&mut self.headers, data, "headers", h);
        object::set_set(&mut self.signing_keys, data, "signingKeys", h);
        scalar::set(&mut self.insecure, data, "insecure", h);
    }

    fn validator(&self) -> Option<&dyn Validator> {
        Some(self)
    }

    fn collector(&self) -> Option<&dyn Collector> {
        Some(self)
    }
}

impl Validator for HttpConnector {
    fn validate(&self, h: &mut Handler) {
        let context = describe("HTTP connector", &self.name);
        require(h, &context, "name", self.name.is_present());
        require(h, &context, "base_url", self.base_url.is_present());
        validate::mutually_exclusive(
            h,
            &context,
            &[
                ("bearer_token", self.bearer_token.is_present()),
                ("basic_auth", self.basic_auth.is_present()),
            ],
        );
        if let Some(url) = self.base_url.as_present()
            && !(url.starts_with("https://") || url.starts_with("http://"))
        {
            h.invalid(
                format!("Invalid base_url in {context}"),
                format!("'{url}' is not an http(s) URL"),
            );
        }
        object::validate(&self.basic_auth, h);
        object::validate_list(&self.signing_keys, h);
    }
}

impl Collector for HttpConnector {
    fn collect_references(&self, h: &mut Handler) {
        if let Some(name) = self.name.as_present() {
            h.refs.add(CONNECTOR_NAMESPACE, "http", self.id.value_str(), name);
        }
    }
}

impl Matchable for HttpConnector {
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

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BasicAuth {
    pub username: StringValue,
    pub password: StringValue,
}

impl Model for BasicAuth {
    fn values(&self, _h: &mut Handler) -> Document {
        let mut data = Document::new();
        scalar::get(&self.username, &mut data, "username");
        secret::get(&self.password, &mut data, "password");
        data
    }

    fn set_values(&mut self, h: &mut Handler, data: &Document) {
        scalar::set(&mut self.username, data, "username", h);
        secret::set(&mut self.password);
    }

    fn validator(&self) -> Option<&dyn Validator> {
        Some(self)
    }
}

impl Validator for BasicAuth {
    fn validate(&self, h: &mut Handler) {
        require(h, "basic_auth", "username", self.username.is_present());
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SigningKey {
    pub key_id: StringValue,
    pub secret: StringValue,
}

impl Model for SigningKey {
    fn values(&self, _h: &mut Handler) -> Document {
        let mut data = Document::new();
        scalar::get(&self.key_id, &mut data, "keyId");
        secret::get(&self.secret, &mut data, "secret");
        data
    }

    fn set_values(&mut self, h: &mut Handler, data: &Document) {
        scalar::set(&mut self.key_id, data, "keyId", h);
        secret::set(&mut self.secret);
    }

    fn validator(&self) -> Option<&dyn Validator> {
        Some(self)
    }
}

impl Validator for SigningKey {
    fn validate(&self, h: &mut Handler) {
        require(h, "signing key", "key_id", self.key_id.is_present());
        require(h, "signing key", "secret", self.secret.is_present());
    }
}

// ============================================================================
// SMTP
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmtpConnector {
    pub id: StringValue,
    pub name: StringValue,
    pub description: StringValue,
    pub host: StringValue,
    pub port: IntValue,
    pub username: StringValue,
    pub password: StringValue,
    pub sender_email: StringValue,
    pub sender_name: StringValue,
}

impl Model for SmtpConnector {
    fn values(&self, h: &mut Handler) -> Document {
        let mut data = Document::new();
        write_identity(h, &mut data, CONNECTOR_NAMESPACE, self.name.value_str());
        scalar::get(&self.name, &mut data, "name");
        scalar::get(&self.description, &mut data, "description");
        scalar::get(&self.host, &mut data, "host");
        scalar::get(&self.port, &mut data, "port");
        scalar::get(&self.username, &mut data, "username");
        secret::get(&self.password, &mut data, "password");
        scalar::get(&self.sender_email, &mut data, "senderEmail");
        scalar::get(&self.sender_name, &mut data, "senderName");
        data
    }

    fn set_values(&mut self, h: &mut Handler, data: &Document) {
        scalar::set(&mut self.id, data, "id", h);
        scalar::set(&mut self.name, data, "name", h);
        scalar::set(&mut self.description, data, "description", h);
        scalar::set(&mut self.host, data, "host", h);
        scalar::set(&mut self.port, data, "port", h);
        scalar::set(&mut self.username, data, "username", h);
        secret::set(&mut self.password);
        scalar::set(&mut self.sender_email, data, "senderEmail", h);
        scalar::set(&mut self.sender_name, data, "senderName", h);
    }

    fn validator(&self) -> Option<&dyn Validator> {
        Some(self)
    }

    fn collector(&self) -> Option<&dyn Collector> {
        Some(self)
    }
}

impl Validator for SmtpConnector {
    fn validate(&self, h: &mut Handler) {
        let context = describe("SMTP connector", &self.name);
        require(h, &context, "name", self.name.is_present());
        require(h, &context, "host", self.host.is_present());
        require(h, &context, "sender_email", self.sender_email.is_present());
        validate::requires(
            h,
            &context,
            "username",
            self.username.is_present(),
            "password",
            self.password.is_present(),
        );
        if let Some(port) = self.port.as_present()
            && !(1..=65535).contains(port)
        {
            h.invalid(
                format!("Invalid port in {context}"),
                format!("{port} is not a valid TCP port"),
            );
        }
    }
}

impl Collector for SmtpConnector {
    fn collect_references(&self, h: &mut Handler) {
        if let Some(name) = self.name.as_present() {
            h.refs.add(CONNECTOR_NAMESPACE, "smtp", self.id.value_str(), name);
        }
    }
}

impl Matchable for SmtpConnector {
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

fn describe(kind: &str, name: &StringValue) -> String {
    match name.as_present() {
        Some(name) => format!("{kind} '{name}'"),
        None => kind.to_string(),
    }
}

fn require(h: &mut Handler, context: &str, attribute: &str, is_set: bool) {
    if !is_set {
        h.missing(format!("Missing attribute '{attribute}' in {context}"), "");
    }
}
